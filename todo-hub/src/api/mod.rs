//! HTTP routes: list pages, item add/delete forms, the about page and static
//! assets.

use crate::views::{self, ListView};
use axum::{
    extract::{rejection::FormRejection, Form, Path, Request, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use todo_hub_core::model::{is_default_list, DEFAULT_LIST};
use todo_hub_core::storage::TodoStore;
use todo_hub_core::{ListRoute, Loaded, Repository, StoreError};
use tower::{ServiceBuilder, ServiceExt};
use tower_http::{
    compression::CompressionLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, warn};
use uuid::Uuid;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub static_dir: PathBuf,
}

#[derive(Deserialize)]
struct NewItemForm {
    #[serde(rename = "newItem", default)]
    new_item: String,
    #[serde(default = "default_list")]
    list: String,
}

#[derive(Deserialize)]
struct DeleteForm {
    checkbox: String,
    #[serde(rename = "listName", default = "default_list")]
    list_name: String,
}

fn default_list() -> String {
    DEFAULT_LIST.to_string()
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Error surfaced to clients as a JSON `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Maps a store failure during `action` ("saving the item") to a response,
    /// logging it on the way.
    fn store(action: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |err| {
            if err.is_not_found() {
                warn!(error = %err, "not found while {action}");
                Self::new(StatusCode::NOT_FOUND, err.to_string())
            } else {
                error!(error = %err, "error {action}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("An error occurred while {action}"),
                )
            }
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        warn!(error = %rejection, "rejected form");
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// `302 Found` pointing at `location`.
fn redirect(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Canonical path of a list page.
fn list_location(name: &str) -> String {
    if is_default_list(name) {
        "/".to_string()
    } else {
        format!("/{}", urlencoding::encode(name))
    }
}

/// File in the public directory named by a single path segment, if one exists.
async fn static_asset(dir: &std::path::Path, segment: &str) -> Option<PathBuf> {
    if segment.is_empty()
        || segment.starts_with('.')
        || segment.contains(|c: char| c == '/' || c == '\\')
    {
        return None;
    }
    let path = dir.join(segment);
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => Some(path),
        _ => None,
    }
}

pub fn router(store: Arc<dyn TodoStore>, static_dir: impl Into<PathBuf>) -> Router {
    let static_dir = static_dir.into();
    let state = AppState {
        repo: Repository::new(store),
        static_dir: static_dir.clone(),
    };
    Router::new()
        .route("/", get(view_default).post(add_item))
        .route("/delete", post(delete_item))
        .route("/about", get(about))
        .route("/health", get(health))
        .route_service("/favicon.ico", ServeFile::new(static_dir.join("favicon.ico")))
        .route("/{list_name}", get(view_list))
        .fallback_service(ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

async fn view_default(State(state): State<AppState>) -> Result<Response, ApiError> {
    let loaded = state
        .repo
        .load_default()
        .await
        .map_err(ApiError::store("fetching items"))?;
    match loaded {
        Loaded::Found(items) => {
            Ok(views::render_list(&ListView::new(DEFAULT_LIST, &items)).into_response())
        }
        Loaded::Seeded => Ok(redirect(list_location(DEFAULT_LIST))),
    }
}

async fn add_item(
    State(state): State<AppState>,
    form: Result<Form<NewItemForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form?;
    state
        .repo
        .add_item(&form.list, form.new_item)
        .await
        .map_err(ApiError::store("saving the item"))?;
    Ok(redirect(list_location(&form.list)))
}

async fn delete_item(
    State(state): State<AppState>,
    form: Result<Form<DeleteForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form?;
    let id = Uuid::parse_str(form.checkbox.trim()).map_err(|_| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("invalid item id {:?}", form.checkbox),
        )
    })?;
    state
        .repo
        .delete_item(&form.list_name, id)
        .await
        .map_err(ApiError::store("deleting the item"))?;
    Ok(redirect(list_location(&form.list_name)))
}

async fn view_list(
    State(state): State<AppState>,
    Path(list_name): Path<String>,
    request: Request,
) -> Result<Response, ApiError> {
    // public files shadow list names, so `/robots.txt` is never a list
    if let Some(asset) = static_asset(&state.static_dir, &list_name).await {
        return Ok(match ServeFile::new(asset).oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        });
    }
    let name = match ListRoute::from_segment(&list_name) {
        ListRoute::Default => return Ok(redirect(list_location(DEFAULT_LIST))),
        ListRoute::Named(name) => name,
    };
    let loaded = state
        .repo
        .load_list(&name)
        .await
        .map_err(ApiError::store("fetching the list"))?;
    match loaded {
        Loaded::Found(list) => {
            Ok(views::render_list(&ListView::new(&list.name, &list.items)).into_response())
        }
        Loaded::Seeded => Ok(redirect(list_location(&name))),
    }
}

async fn about() -> Html<String> {
    views::render_about()
}

async fn health(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    state.repo.store().ping().await.map_err(|err| {
        error!(error = %err, "health check failed");
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
    })?;
    Ok("OK")
}

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use std::sync::Arc;
use todo_hub::api;
use todo_hub_core::model::{Item, List};
use todo_hub_core::storage::{MemoryStore, TodoStore};
use todo_hub_core::{Result, StoreError};
use tower::util::ServiceExt;
use uuid::Uuid;

const DEFAULT_NAMES: [&str; 3] = [
    "Welcome to your todo list.",
    "Hit + button to create a new item.",
    "<-- Hit this to delete an item.",
];

fn app(store: Arc<dyn TodoStore>) -> Router {
    api::router(store, "public")
}

fn memory() -> Arc<dyn TodoStore> {
    Arc::new(MemoryStore::new())
}

async fn get(app: &Router, uri: &str) -> Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn post_form(app: &Router, uri: &str, form: &str) -> Response {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

fn location(resp: &Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
}

async fn text(resp: Response) -> String {
    let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json(resp: Response) -> serde_json::Value {
    let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn first_visit_seeds_defaults_then_renders() {
    let store = memory();
    let app = app(store.clone());

    let resp = get(&app, "/").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let items = store.find_items().await.unwrap();
    let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, DEFAULT_NAMES);

    let resp = get(&app, "/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = text(resp).await;
    assert!(page.contains("<h1>Today</h1>"));
    assert!(page.contains("Welcome to your todo list."));
    assert!(page.contains("&lt;-- Hit this to delete an item."));
    assert_eq!(store.find_items().await.unwrap().len(), 3);
}

#[tokio::test]
async fn add_to_today_appends_exactly_one() {
    let store = memory();
    let app = app(store.clone());
    get(&app, "/").await;
    let before = store.find_items().await.unwrap();

    let resp = post_form(&app, "/", "newItem=Buy+milk&list=Today").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let after = store.find_items().await.unwrap();
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after[before.len()].name, "Buy milk");
}

#[tokio::test]
async fn add_without_list_field_targets_today() {
    let store = memory();
    let app = app(store.clone());

    let resp = post_form(&app, "/", "newItem=Call+mum").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    assert_eq!(store.find_items().await.unwrap()[0].name, "Call mum");
}

#[tokio::test]
async fn named_list_is_created_once_and_normalized() {
    let store = memory();
    let app = app(store.clone());

    let resp = get(&app, "/work").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/Work");

    let list = store.find_list("Work").await.unwrap().unwrap();
    let names: Vec<_> = list.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, DEFAULT_NAMES);

    let resp = get(&app, "/WORK").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = text(resp).await;
    assert!(page.contains("<h1>Work</h1>"));
    assert!(page.contains(r#"name="list" value="Work""#));

    // still the same document, not re-seeded
    assert_eq!(store.find_list("Work").await.unwrap(), Some(list));
    // the default list is untouched
    assert!(store.find_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_names_with_spaces_round_trip() {
    let store = memory();
    let app = app(store.clone());

    let resp = get(&app, "/home%20CHORES").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/Home%20chores");

    let resp = post_form(&app, "/", "newItem=Dishes&list=Home+chores").await;
    assert_eq!(location(&resp), "/Home%20chores");

    let resp = get(&app, location(&resp).to_string().as_str()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(text(resp).await.contains("Dishes"));
}

#[tokio::test]
async fn today_segment_redirects_home() {
    let store = memory();
    let app = app(store.clone());

    let resp = get(&app, "/today").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    assert!(store.find_list("Today").await.unwrap().is_none());
}

#[tokio::test]
async fn add_and_delete_in_named_list() {
    let store = memory();
    let app = app(store.clone());
    get(&app, "/work").await;

    let resp = post_form(&app, "/", "newItem=Write+report&list=Work").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/Work");

    let list = store.find_list("Work").await.unwrap().unwrap();
    assert_eq!(list.items.len(), 4);
    let added = list.items.last().unwrap().clone();
    assert_eq!(added.name, "Write report");

    let resp = post_form(
        &app,
        "/delete",
        &format!("checkbox={}&listName=Work", added.id),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/Work");

    let list = store.find_list("Work").await.unwrap().unwrap();
    assert_eq!(list.items.len(), 3);
    assert!(!list.items.contains(&added));
}

#[tokio::test]
async fn delete_from_today_removes_only_that_id() {
    let store = memory();
    let app = app(store.clone());
    post_form(&app, "/", "newItem=same&list=Today").await;
    post_form(&app, "/", "newItem=same&list=Today").await;
    let items = store.find_items().await.unwrap();

    let resp = post_form(
        &app,
        "/delete",
        &format!("checkbox={}&listName=Today", items[1].id),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    assert_eq!(store.find_items().await.unwrap(), vec![items[0].clone()]);
}

#[tokio::test]
async fn add_to_missing_list_is_not_found() {
    let store = memory();
    let app = app(store.clone());

    let resp = post_form(&app, "/", "newItem=Lost&list=Ghost").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = json(resp).await;
    assert_eq!(body["error"], "list \"Ghost\" not found");

    assert!(store.find_list("Ghost").await.unwrap().is_none());
    assert!(store.find_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_from_missing_list_is_not_found() {
    let app = app(memory());
    let resp = post_form(
        &app,
        "/delete",
        &format!("checkbox={}&listName=Ghost", Uuid::new_v4()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(json(resp).await["error"].is_string());
}

#[tokio::test]
async fn delete_unknown_item_is_not_found() {
    let app = app(memory());
    get(&app, "/").await;
    let id = Uuid::new_v4();
    let resp = post_form(&app, "/delete", &format!("checkbox={id}&listName=Today")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(resp).await["error"], format!("item {id} not found"));
}

#[tokio::test]
async fn delete_with_malformed_id_is_bad_request() {
    let app = app(memory());
    let resp = post_form(&app, "/delete", "checkbox=not-an-id&listName=Today").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json(resp).await["error"]
        .as_str()
        .unwrap()
        .contains("not-an-id"));
}

#[tokio::test]
async fn delete_without_checkbox_is_json_bad_request() {
    let store = memory();
    let app = app(store.clone());
    get(&app, "/").await;

    let resp = post_form(&app, "/delete", "listName=Today").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "application/json"
    );
    assert!(json(resp).await["error"]
        .as_str()
        .unwrap()
        .contains("checkbox"));
    assert_eq!(store.find_items().await.unwrap().len(), 3);
}

#[tokio::test]
async fn add_without_form_content_type_is_json_bad_request() {
    let store = memory();
    let app = app(store.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/")
        .body(Body::from("newItem=x&list=Today"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json(resp).await["error"].is_string());
    assert!(store.find_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn top_level_public_files_are_served_instead_of_lists() {
    let public = tempfile::tempdir().unwrap();
    std::fs::write(public.path().join("robots.txt"), "User-agent: *\n").unwrap();
    let store = memory();
    let app = api::router(store.clone(), public.path());

    let resp = get(&app, "/robots.txt").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(text(resp).await, "User-agent: *\n");
    assert!(store.find_list("Robots.txt").await.unwrap().is_none());

    // names without a matching file still address lists
    let resp = get(&app, "/sitemap.xml").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/Sitemap.xml");
}

#[tokio::test]
async fn item_markup_is_stored_verbatim_and_escaped() {
    let store = memory();
    let app = app(store.clone());

    post_form(
        &app,
        "/",
        "newItem=%3Cscript%3Ealert(1)%3C%2Fscript%3E&list=Today",
    )
    .await;
    assert_eq!(
        store.find_items().await.unwrap()[0].name,
        "<script>alert(1)</script>"
    );

    let page = text(get(&app, "/").await).await;
    assert!(!page.contains("<script>alert(1)</script>"));
    assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
}

#[tokio::test]
async fn about_page_renders() {
    let app = app(memory());
    let resp = get(&app, "/about").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert!(text(resp).await.contains("<h1>About</h1>"));
}

/// Store whose every operation fails, as with a lost connection.
struct BrokenStore;

fn broken() -> StoreError {
    serde_json::from_str::<serde_json::Value>("{").unwrap_err().into()
}

#[async_trait]
impl TodoStore for BrokenStore {
    async fn ping(&self) -> Result<()> {
        Err(broken())
    }
    async fn find_items(&self) -> Result<Vec<Item>> {
        Err(broken())
    }
    async fn insert_item(&self, _item: Item) -> Result<()> {
        Err(broken())
    }
    async fn seed_items(&self, _items: Vec<Item>) -> Result<bool> {
        Err(broken())
    }
    async fn delete_item(&self, _id: Uuid) -> Result<()> {
        Err(broken())
    }
    async fn find_list(&self, _name: &str) -> Result<Option<List>> {
        Err(broken())
    }
    async fn create_list(&self, _list: List) -> Result<()> {
        Err(broken())
    }
    async fn push_list_item(&self, _name: &str, _item: Item) -> Result<()> {
        Err(broken())
    }
    async fn pull_list_item(&self, _name: &str, _id: Uuid) -> Result<()> {
        Err(broken())
    }
}

#[tokio::test]
async fn store_failures_are_json_server_errors() {
    let app = app(Arc::new(BrokenStore));

    let resp = get(&app, "/").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json(resp).await["error"],
        "An error occurred while fetching items"
    );

    let resp = post_form(&app, "/", "newItem=x&list=Today").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json(resp).await["error"],
        "An error occurred while saving the item"
    );

    let resp = get(&app, "/work").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json(resp).await["error"],
        "An error occurred while fetching the list"
    );

    let resp = get(&app, "/health").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

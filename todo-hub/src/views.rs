//! Server-side HTML pages.
//!
//! Every value interpolated into markup goes through [`escape`].

use axum::response::Html;
use todo_hub_core::model::Item;
use uuid::Uuid;

/// One row handed to the "list" view.
#[derive(Clone, Debug)]
pub struct ListEntry<'a> {
    pub id: Uuid,
    pub name: &'a str,
}

impl<'a> From<&'a Item> for ListEntry<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            id: item.id,
            name: &item.name,
        }
    }
}

/// Data of the "list" view: `listTitle` and `newListItems`.
#[derive(Clone, Debug)]
pub struct ListView<'a> {
    pub list_title: &'a str,
    pub new_list_items: Vec<ListEntry<'a>>,
}

impl<'a> ListView<'a> {
    pub fn new(list_title: &'a str, items: &'a [Item]) -> Self {
        Self {
            list_title,
            new_list_items: items.iter().map(ListEntry::from).collect(),
        }
    }
}

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn header(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{}</title>
  <link rel="stylesheet" href="/css/styles.css">
</head>
<body>
"#,
        escape(title)
    )
}

const FOOTER: &str = r#"  <footer>
    <a href="/">Today</a> &middot; <a href="/about">About</a>
  </footer>
</body>
</html>
"#;

/// Renders the "list" view: heading, one delete form per item and the
/// add-item form.
pub fn render_list(view: &ListView<'_>) -> Html<String> {
    let title = escape(view.list_title);
    let mut page = header(view.list_title);

    page.push_str(&format!(
        "  <div class=\"box\" id=\"heading\">\n    <h1>{title}</h1>\n  </div>\n  <div class=\"box\">\n"
    ));
    for entry in &view.new_list_items {
        page.push_str(&format!(
            r#"    <form action="/delete" method="post">
      <div class="item">
        <input type="checkbox" name="checkbox" value="{id}" onchange="this.form.submit()">
        <p>{name}</p>
      </div>
      <input type="hidden" name="listName" value="{title}">
    </form>
"#,
            id = entry.id,
            name = escape(entry.name),
        ));
    }
    page.push_str(&format!(
        r#"    <form class="item" action="/" method="post">
      <input type="text" name="newItem" placeholder="New Item" autocomplete="off">
      <button type="submit" name="list" value="{title}">+</button>
    </form>
  </div>
"#
    ));

    page.push_str(FOOTER);
    Html(page)
}

/// Renders the static "about" view.
pub fn render_about() -> Html<String> {
    let mut page = header("About");
    page.push_str(
        r#"  <div class="box" id="heading">
    <h1>About</h1>
  </div>
  <div class="box about">
    <p>A small todo list. Visit any path such as <code>/work</code> to start a
    separate list, tick a checkbox to remove an item, and use the + button to
    add one.</p>
  </div>
"#,
    );
    page.push_str(FOOTER);
    Html(page)
}

use fragments_types::{Fragment, FragmentPage};

use super::{escape, field_error, fragment_card, input, layout, tag_list, HtmlPage};
use crate::auth::Viewer;
use crate::forms::{FieldErrors, FragmentForm};

/// Where the fragment form posts to.
#[derive(Debug, Clone, Copy)]
pub enum FormTarget {
    Add,
    Edit(i64),
}

pub fn list_page(viewer: &Viewer, page: &FragmentPage) -> HtmlPage {
    let cards = if page.items.is_empty() {
        "<p>No fragments yet.</p>".to_string()
    } else {
        page.items.iter().map(fragment_card).collect::<Vec<_>>().join("\n")
    };

    let mut pager = String::new();
    if page.has_prev() {
        pager.push_str(&format!(r#"<a href="/pages/{}">Newer</a> "#, page.page - 1));
    }
    pager.push_str(&format!(
        "<span>Page {} of {}</span>",
        page.page,
        page.total_pages().max(1)
    ));
    if page.has_next() {
        pager.push_str(&format!(r#" <a href="/pages/{}">Older</a>"#, page.page + 1));
    }

    let content = format!(
        r#"<h1>Fragments</h1>
{cards}
<div class="pager">{pager}</div>"#
    );
    layout(viewer, "Fragments", &content)
}

pub fn show_page(viewer: &Viewer, fragment: &Fragment) -> HtmlPage {
    let actions = if viewer.session.is_some() {
        format!(
            r#"<p class="actions"><a href="/edit/{id}">Edit</a> <a href="/delete/{id}">Delete</a></p>"#,
            id = fragment.id
        )
    } else {
        String::new()
    };
    let content = format!(
        r#"<article class="fragment full">
<h1>{title}</h1>
<p class="meta">{date} {tags}</p>
<div class="body">{text}</div>
</article>
{actions}"#,
        title = escape(&fragment.title),
        date = fragment.date,
        tags = tag_list(fragment),
        text = escape(&fragment.text),
    );
    layout(viewer, &fragment.title, &content)
}

pub fn dashboard_page(viewer: &Viewer, fragments: &[Fragment]) -> HtmlPage {
    let mut rows = String::new();
    for f in fragments {
        rows.push_str(&format!(
            r#"<tr><td>{id}</td><td><a href="/{id}">{title}</a></td><td>{date}</td><td>{tags}</td><td><a href="/edit/{id}">Edit</a> <a href="/delete/{id}">Delete</a></td></tr>
"#,
            id = f.id,
            title = escape(&f.title),
            date = f.date,
            tags = escape(&f.tags_display()),
        ));
    }
    if rows.is_empty() {
        rows = r#"<tr><td colspan="5">No fragments yet.</td></tr>"#.to_string();
    }

    let content = format!(
        r#"<h1>Dashboard</h1>
<p><a class="button" href="/add">Add fragment</a></p>
<table>
<thead><tr><th>ID</th><th>Title</th><th>Date</th><th>Tags</th><th></th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#
    );
    layout(viewer, "Dashboard", &content)
}

pub fn fragment_form_page(
    viewer: &Viewer,
    target: FormTarget,
    form: &FragmentForm,
    errors: &FieldErrors,
) -> HtmlPage {
    let (heading, action) = match target {
        FormTarget::Add => ("Add fragment".to_string(), "/add".to_string()),
        FormTarget::Edit(id) => ("Edit fragment".to_string(), format!("/edit/{}", id)),
    };
    let content = format!(
        r#"<h1>{heading}</h1>
<form method="post" action="{action}" class="stacked">
{title}
<label for="text">Text</label>
<textarea id="text" name="text" rows="10">{text}</textarea>
{text_error}
{tags}
{date}
<button type="submit">Save</button>
</form>"#,
        title = input("Title", "title", "text", &form.title, errors),
        text = escape(&form.text),
        text_error = field_error(errors, "text"),
        tags = input("Tags (comma separated)", "tags", "text", &form.tags, errors),
        date = input("Date", "date", "date", &form.date, errors),
    );
    layout(viewer, &heading, &content)
}

pub fn delete_page(viewer: &Viewer, fragment: &Fragment) -> HtmlPage {
    let content = format!(
        r#"<h1>Delete fragment</h1>
<p>Delete <strong>{title}</strong> from {date}? This cannot be undone.</p>
<form method="post" action="/delete/{id}">
<button type="submit" class="danger">Delete</button>
<a href="/dashboard">Cancel</a>
</form>"#,
        title = escape(&fragment.title),
        date = fragment.date,
        id = fragment.id,
    );
    layout(viewer, "Delete fragment", &content)
}

pub fn confirm_page(viewer: &Viewer, title: Option<&str>) -> HtmlPage {
    let message = match title {
        Some(title) => format!("Deleted <strong>{}</strong>.", escape(title)),
        None => "Fragment deleted.".to_string(),
    };
    let content = format!(
        r#"<h1>Deleted</h1>
<p>{message}</p>
<p><a href="/dashboard">Back to the dashboard</a></p>"#
    );
    layout(viewer, "Deleted", &content)
}

pub fn not_found_page(viewer: &Viewer) -> HtmlPage {
    layout(
        viewer,
        "Not found",
        r#"<h1>Not found</h1>
<p>There is nothing here. <a href="/fragments">Browse fragments</a></p>"#,
    )
}

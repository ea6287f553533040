use fragments_types::{Fragment, SearchParams};

use super::{escape, fragment_card, layout, HtmlPage};
use crate::auth::Viewer;

pub enum SearchOutcome {
    /// No category was selected.
    NotRun,
    Invalid(String),
    Results(Vec<Fragment>),
}

fn checked(flag: &Option<String>) -> &'static str {
    if flag.as_deref().is_some_and(|v| !v.is_empty()) {
        " checked"
    } else {
        ""
    }
}

fn value(field: &Option<String>) -> String {
    escape(field.as_deref().unwrap_or(""))
}

fn date_radio(params: &SearchParams, mode: &str) -> String {
    let checked = if params.date_mode.as_deref() == Some(mode) {
        " checked"
    } else {
        ""
    };
    format!(r#"<label><input type="radio" name="date-radio" value="{mode}"{checked}> {mode}</label>"#)
}

pub fn search_page(viewer: &Viewer, params: &SearchParams, outcome: &SearchOutcome) -> HtmlPage {
    let results = match outcome {
        SearchOutcome::NotRun => {
            "<p>Tick at least one of text, tags or date and fill it in.</p>".to_string()
        }
        SearchOutcome::Invalid(message) => {
            format!(r#"<p class="error">{}</p>"#, escape(message))
        }
        SearchOutcome::Results(fragments) if fragments.is_empty() => {
            "<p>No fragments matched.</p>".to_string()
        }
        SearchOutcome::Results(fragments) => format!(
            "<p>{} result(s)</p>\n{}",
            fragments.len(),
            fragments.iter().map(fragment_card).collect::<Vec<_>>().join("\n")
        ),
    };

    let content = format!(
        r#"<h1>Search</h1>
<form method="get" action="/pages/search" class="search">
<fieldset>
<label><input type="checkbox" name="searchText" value="on"{text_checked}> Text</label>
<input type="text" name="textQuery" value="{text_query}" placeholder="words in the text">
</fieldset>
<fieldset>
<label><input type="checkbox" name="searchTags" value="on"{tags_checked}> Tags</label>
<input type="text" name="tagsQuery" value="{tags_query}" placeholder="rust, notes">
<label><input type="checkbox" name="operator" value="and"{operator_checked}> match all tags</label>
</fieldset>
<fieldset>
<label><input type="checkbox" name="searchByDate" value="on"{date_checked}> Date</label>
<input type="text" name="dateQuery" value="{date_query}" placeholder="YYYY-MM-DD or YYYY-MM-DD, YYYY-MM-DD">
{on} {before} {after} {between}
</fieldset>
<button type="submit">Search</button>
</form>
<section class="results">
{results}
</section>"#,
        text_checked = checked(&params.search_text),
        text_query = value(&params.text_query),
        tags_checked = checked(&params.search_tags),
        tags_query = value(&params.tags_query),
        operator_checked = checked(&params.operator),
        date_checked = checked(&params.search_by_date),
        date_query = value(&params.date_query),
        on = date_radio(params, "on"),
        before = date_radio(params, "before"),
        after = date_radio(params, "after"),
        between = date_radio(params, "between"),
    );
    layout(viewer, "Search", &content)
}

//! Browsing and authoring fragments.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use fragments_types::FRAGMENTS_PER_PAGE;
use serde::Deserialize;

use super::{internal_error, not_found, AppState};
use crate::auth::{redirect_with_flash, FlashMessage, RequireAuth, Viewer};
use crate::error::StoreError;
use crate::forms::{FieldErrors, FragmentForm};
use crate::pages::{self, FormTarget, HtmlPage};

const DUPLICATE_DATE: &str = "There is already a fragment for this date.";

pub async fn home(viewer: Viewer) -> HtmlPage {
    pages::home_page(&viewer)
}

pub async fn first_page() -> Redirect {
    Redirect::to("/pages/1")
}

// GET /pages/:page
pub async fn list_page(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(page): Path<String>,
) -> Response {
    let page = match page.parse::<u32>() {
        Ok(page) if page >= 1 => page,
        _ => return not_found(&viewer),
    };

    match state.db.list_fragments_page(page, FRAGMENTS_PER_PAGE) {
        Ok(listing) if page > 1 && listing.items.is_empty() => not_found(&viewer),
        Ok(listing) => pages::list_page(&viewer, &listing).into_response(),
        Err(e) => internal_error(&viewer, "list fragments", e),
    }
}

// GET /:id
pub async fn show(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.parse::<i64>() else {
        return not_found(&viewer);
    };
    match state.db.get_fragment(id) {
        Ok(Some(fragment)) => pages::show_page(&viewer, &fragment).into_response(),
        Ok(None) => not_found(&viewer),
        Err(e) => internal_error(&viewer, "load fragment", e),
    }
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    RequireAuth(viewer): RequireAuth,
) -> Response {
    match state.db.list_fragments() {
        Ok(fragments) => pages::dashboard_page(&viewer, &fragments).into_response(),
        Err(e) => internal_error(&viewer, "list fragments", e),
    }
}

pub async fn add_form(RequireAuth(viewer): RequireAuth) -> HtmlPage {
    let today = chrono::Local::now().date_naive();
    pages::fragment_form_page(
        &viewer,
        FormTarget::Add,
        &FragmentForm::for_new(today),
        &FieldErrors::new(),
    )
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    RequireAuth(viewer): RequireAuth,
    Form(form): Form<FragmentForm>,
) -> Response {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => return rejected_form(&viewer, FormTarget::Add, &form, &errors),
    };

    match state.db.create_fragment(&draft) {
        Ok(fragment) => {
            log::info!(
                "{} added fragment {} for {}",
                author(&viewer),
                fragment.id,
                fragment.date
            );
            redirect_with_flash("/dashboard", FlashMessage::success("Fragment added"))
        }
        Err(StoreError::Conflict(_)) => duplicate_date(&viewer, FormTarget::Add, &form),
        Err(e) => internal_error(&viewer, "add fragment", e),
    }
}

pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    RequireAuth(viewer): RequireAuth,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.parse::<i64>() else {
        return not_found(&viewer);
    };
    match state.db.get_fragment(id) {
        Ok(Some(fragment)) => pages::fragment_form_page(
            &viewer,
            FormTarget::Edit(id),
            &FragmentForm::from_fragment(&fragment),
            &FieldErrors::new(),
        )
        .into_response(),
        Ok(None) => not_found(&viewer),
        Err(e) => internal_error(&viewer, "load fragment", e),
    }
}

pub async fn edit(
    State(state): State<Arc<AppState>>,
    RequireAuth(viewer): RequireAuth,
    Path(id): Path<String>,
    Form(form): Form<FragmentForm>,
) -> Response {
    let Ok(id) = id.parse::<i64>() else {
        return not_found(&viewer);
    };
    let target = FormTarget::Edit(id);
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => return rejected_form(&viewer, target, &form, &errors),
    };

    match state.db.update_fragment(id, &draft) {
        Ok(Some(fragment)) => {
            log::info!(
                "{} updated fragment {}",
                author(&viewer),
                fragment.id
            );
            redirect_with_flash("/dashboard", FlashMessage::success("Fragment updated"))
        }
        Ok(None) => not_found(&viewer),
        Err(StoreError::Conflict(_)) => duplicate_date(&viewer, target, &form),
        Err(e) => internal_error(&viewer, "update fragment", e),
    }
}

pub async fn delete_form(
    State(state): State<Arc<AppState>>,
    RequireAuth(viewer): RequireAuth,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.parse::<i64>() else {
        return not_found(&viewer);
    };
    match state.db.get_fragment(id) {
        Ok(Some(fragment)) => pages::delete_page(&viewer, &fragment).into_response(),
        Ok(None) => not_found(&viewer),
        Err(e) => internal_error(&viewer, "load fragment", e),
    }
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    RequireAuth(viewer): RequireAuth,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.parse::<i64>() else {
        return not_found(&viewer);
    };
    match state.db.delete_fragment(id) {
        Ok(Some(fragment)) => {
            log::info!(
                "{} deleted fragment {}",
                author(&viewer),
                fragment.id
            );
            Redirect::to(&format!(
                "/confirm?title={}",
                urlencoding::encode(&fragment.title)
            ))
            .into_response()
        }
        Ok(None) => not_found(&viewer),
        Err(e) => internal_error(&viewer, "delete fragment", e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfirmParams {
    title: Option<String>,
}

pub async fn confirm(
    RequireAuth(viewer): RequireAuth,
    Query(params): Query<ConfirmParams>,
) -> HtmlPage {
    pages::confirm_page(&viewer, params.title.as_deref())
}

fn author(viewer: &Viewer) -> String {
    match &viewer.session {
        Some(session) => format!("{} (user {})", session.username, session.user_id),
        None => "?".to_string(),
    }
}

fn rejected_form(
    viewer: &Viewer,
    target: FormTarget,
    form: &FragmentForm,
    errors: &FieldErrors,
) -> Response {
    pages::fragment_form_page(viewer, target, form, errors)
        .with_status(StatusCode::UNPROCESSABLE_ENTITY)
        .into_response()
}

fn duplicate_date(viewer: &Viewer, target: FormTarget, form: &FragmentForm) -> Response {
    let mut errors = FieldErrors::new();
    errors.insert("date", DUPLICATE_DATE.to_string());
    rejected_form(viewer, target, form, &errors)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use chrono::NaiveDate;
    use fragments_types::FragmentDraft;

    fn draft(title: &str, day: u32) -> FragmentDraft {
        FragmentDraft {
            title: title.to_string(),
            text: format!("text of {}", title),
            tags: "notes".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        }
    }

    async fn logged_in() -> (Arc<AppState>, String) {
        let state = test_state();
        add_user(&state, "writer", "pass");
        let cookie = login_cookie(&state, "writer", "pass").await;
        (state, cookie)
    }

    #[tokio::test]
    async fn test_protected_routes_redirect_guests_to_login() {
        let state = test_state();
        state.db.create_fragment(&draft("kept", 1)).unwrap();

        for uri in ["/dashboard", "/add", "/edit/1", "/delete/1", "/confirm"] {
            let response = send(&state, get_request(uri, None)).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(location(&response), "/login", "{}", uri);
            assert!(set_cookies(&response)
                .iter()
                .any(|c| c.starts_with("flash=warning%7CUnauthorized")));
        }
    }

    #[tokio::test]
    async fn test_guest_posts_change_nothing() {
        let state = test_state();
        state.db.create_fragment(&draft("kept", 1)).unwrap();

        let add = send(
            &state,
            post_form("/add", "title=Sneaky&text=x&tags=&date=2024-04-01"),
        )
        .await;
        assert_eq!(location(&add), "/login");

        let edit = send(
            &state,
            post_form("/edit/1", "title=Changed&text=x&tags=&date=2024-03-01"),
        )
        .await;
        assert_eq!(location(&edit), "/login");

        let delete = send(&state, post_form("/delete/1", "")).await;
        assert_eq!(location(&delete), "/login");

        let fragments = state.db.list_fragments().unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].title, "kept");
    }

    #[tokio::test]
    async fn test_add_edit_delete_flow() {
        let (state, cookie) = logged_in().await;

        let added = send(
            &state,
            post_form_with_cookie(
                "/add",
                "title=First+post&text=Hello&tags=Rust%2C++Web+&date=2024-05-06",
                Some(&cookie),
            ),
        )
        .await;
        assert_eq!(location(&added), "/dashboard");

        let fragment = state.db.list_fragments().unwrap().remove(0);
        assert_eq!(fragment.tags, vec!["rust", "web"]);

        let shown = send(&state, get_request(&format!("/{}", fragment.id), None)).await;
        assert_eq!(shown.status(), StatusCode::OK);
        assert!(body_text(shown).await.contains("First post"));

        let edited = send(
            &state,
            post_form_with_cookie(
                &format!("/edit/{}", fragment.id),
                "title=Renamed&text=Hello+again&tags=rust&date=2024-05-07",
                Some(&cookie),
            ),
        )
        .await;
        assert_eq!(location(&edited), "/dashboard");
        let updated = state.db.get_fragment(fragment.id).unwrap().unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.date, NaiveDate::from_ymd_opt(2024, 5, 7).unwrap());

        let deleted = send(
            &state,
            post_form_with_cookie(&format!("/delete/{}", fragment.id), "", Some(&cookie)),
        )
        .await;
        assert_eq!(location(&deleted), "/confirm?title=Renamed");

        let confirmed = send(&state, get_request("/confirm?title=Renamed", Some(&cookie))).await;
        assert!(body_text(confirmed).await.contains("Deleted <strong>Renamed</strong>."));

        let gone = send(&state, get_request(&format!("/{}", fragment.id), None)).await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
        let listing = body_text(send(&state, get_request("/pages/1", None)).await).await;
        assert!(!listing.contains("Renamed"));
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_and_duplicate_dates() {
        let (state, cookie) = logged_in().await;
        state.db.create_fragment(&draft("taken", 9)).unwrap();

        let invalid = send(
            &state,
            post_form_with_cookie("/add", "title=&text=x&tags=&date=soon", Some(&cookie)),
        )
        .await;
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(invalid).await;
        assert!(html.contains("This field is required."));
        assert!(html.contains("Enter a date as YYYY-MM-DD."));

        let duplicate = send(
            &state,
            post_form_with_cookie("/add", "title=Again&text=x&tags=&date=2024-03-09", Some(&cookie)),
        )
        .await;
        assert_eq!(duplicate.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(duplicate).await.contains(DUPLICATE_DATE));
        assert_eq!(state.db.count_fragments().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_show_unknown_id_is_not_found() {
        let state = test_state();
        for uri in ["/99", "/favicon.ico"] {
            let response = send(&state, get_request(uri, None)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_edit_and_delete_of_missing_fragment_are_not_found() {
        let (state, cookie) = logged_in().await;
        for uri in ["/edit/42", "/edit/abc", "/delete/42", "/delete/abc"] {
            let response = send(&state, get_request(uri, Some(&cookie))).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }

        let edit = send(
            &state,
            post_form_with_cookie("/edit/abc", "title=t&text=x&tags=&date=2024-01-01", Some(&cookie)),
        )
        .await;
        assert_eq!(edit.status(), StatusCode::NOT_FOUND);

        let delete = send(&state, post_form_with_cookie("/delete/abc", "", Some(&cookie))).await;
        assert_eq!(delete.status(), StatusCode::NOT_FOUND);
        assert_eq!(state.db.count_fragments().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pagination() {
        let state = test_state();
        for day in 1..=7 {
            state.db.create_fragment(&draft(&format!("entry {}", day), day)).unwrap();
        }

        let redirect = send(&state, get_request("/fragments", None)).await;
        assert_eq!(location(&redirect), "/pages/1");

        let first = body_text(send(&state, get_request("/pages/1", None)).await).await;
        assert!(first.contains("entry 7"));
        assert!(first.contains("entry 3"));
        assert!(!first.contains("entry 2"));

        let second = body_text(send(&state, get_request("/pages/2", None)).await).await;
        assert!(second.contains("entry 2"));
        assert!(second.contains("entry 1"));

        for uri in ["/pages/3", "/pages/0", "/pages/-1", "/pages/two"] {
            let response = send(&state, get_request(uri, None)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_empty_listing_first_page_renders() {
        let state = test_state();
        let response = send(&state, get_request("/pages/1", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("No fragments yet."));
    }
}

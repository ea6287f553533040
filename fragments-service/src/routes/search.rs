use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fragments_types::{SearchParams, SearchQuery};

use super::{internal_error, AppState};
use crate::auth::Viewer;
use crate::pages::{self, SearchOutcome};

// GET /pages/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = match SearchQuery::from_params(&params) {
        Ok(Some(query)) => query,
        Ok(None) => {
            return pages::search_page(&viewer, &params, &SearchOutcome::NotRun).into_response()
        }
        Err(e) => {
            log::debug!("Rejected search: {}", e);
            return pages::search_page(&viewer, &params, &SearchOutcome::Invalid(e.to_string()))
                .with_status(StatusCode::BAD_REQUEST)
                .into_response();
        }
    };

    match state.db.search_fragments(&query) {
        Ok(fragments) => {
            pages::search_page(&viewer, &params, &SearchOutcome::Results(fragments)).into_response()
        }
        Err(e) => internal_error(&viewer, "search fragments", e),
    }
}

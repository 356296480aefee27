use crate::config::Config;
use crate::list_state::ListController;
use crate::pagination::total_pages;
use crate::query::{PokedexSource, QueryError};
use crate::views::{
    ListOutcome, ListView, render_compare, render_detail, render_list, render_not_found,
    render_unavailable,
};
use axum::{
    Router, debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Highest national dex number the random route picks from.
pub const MAX_RANDOM_ID: u32 = 1025;

pub struct AppState {
    pub source: Arc<dyn PokedexSource>,
    pub config: Config,
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("not found")]
    NotFound,
    #[error("redirect to {0}")]
    Redirect(String),
    #[error("upstream failure: {0}")]
    Upstream(#[from] QueryError),
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        match self {
            RouteError::NotFound => (StatusCode::NOT_FOUND, Html(render_not_found())).into_response(),
            RouteError::Redirect(to) => Redirect::to(&to).into_response(),
            RouteError::Upstream(e) => {
                tracing::error!("Upstream request failed: {}", e);
                (StatusCode::BAD_GATEWAY, Html(render_unavailable())).into_response()
            }
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_handler))
        .route("/pokemon/{id}", get(detail_handler))
        .route("/compare", get(compare_handler))
        .route("/random", get(random_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn parse_id(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|id| *id >= 1)
}

#[debug_handler]
async fn list_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, RouteError> {
    let controller =
        ListController::from_params(&params, app_state.config.debounce()).map_err(|e| {
            tracing::debug!("Rejecting list parameters: {}", e);
            RouteError::Redirect("/".to_string())
        })?;

    // one snapshot per request; no stale response can reach it
    let page_size = app_state.config.pokemon.page_size;
    let query = controller.query(page_size);

    let outcome = match app_state.source.list_entries(&query).await {
        Ok(page) => {
            let pages = total_pages(page.total_count, page_size);
            if pages >= 1 && controller.state().page() > pages {
                let last = controller.with(|c| c.set_page(pages)).href();
                tracing::debug!("Page {} is past the last page {}", controller.state().page(), pages);
                return Err(RouteError::Redirect(last));
            }
            ListOutcome::Loaded(page)
        }
        Err(e) => {
            tracing::error!("Failed to fetch list page: {}", e);
            ListOutcome::Unavailable
        }
    };

    Ok(Html(render_list(&ListView {
        controller: &controller,
        outcome,
        page_size,
        debounce_ms: app_state.config.ui.debounce_ms,
    })))
}

#[debug_handler]
async fn detail_handler(
    State(app_state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, RouteError> {
    let id = parse_id(&raw_id).ok_or(RouteError::NotFound)?;
    match app_state.source.entry_detail(id).await? {
        Some(detail) => Ok(Html(render_detail(&detail))),
        None => {
            tracing::debug!("No Pokémon with ID {}", id);
            Err(RouteError::NotFound)
        }
    }
}

#[debug_handler]
async fn compare_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, RouteError> {
    let ids = params
        .get("p1")
        .and_then(|p| parse_id(p))
        .zip(params.get("p2").and_then(|p| parse_id(p)));
    let Some((p1, p2)) = ids else {
        tracing::debug!("Invalid compare parameters: {:?}", params);
        return Err(RouteError::Redirect("/".to_string()));
    };

    let (left, right) = tokio::join!(
        app_state.source.entry_detail(p1),
        app_state.source.entry_detail(p2)
    );
    match (left?, right?) {
        (Some(left), Some(right)) => Ok(Html(render_compare(&left.entry, &right.entry))),
        _ => Err(RouteError::NotFound),
    }
}

#[debug_handler]
async fn random_handler() -> Redirect {
    let id: u32 = rand::random_range(1..=MAX_RANDOM_ID);
    tracing::debug!("Random Pokémon ID: {}", id);
    Redirect::to(&format!("/pokemon/{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("25"), Some(25));
        assert_eq!(parse_id(" 7 "), Some(7));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-1"), None);
        assert_eq!(parse_id("abc"), None);
    }

    #[test]
    fn test_route_error_statuses() {
        assert_eq!(RouteError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            RouteError::Upstream(QueryError::MissingData)
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
        let redirect = RouteError::Redirect("/".to_string()).into_response();
        assert_eq!(redirect.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect.headers()["location"], "/");
    }
}

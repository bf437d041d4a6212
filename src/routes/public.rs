use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client.
/// The content pipeline is read-only marketing/learning material, so there is
/// no visibility gating here; the repository layer enforces slug sanitization
/// so no request can read outside the content directory.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load
        // balancer checks. Returns "ok" immediately.
        .route("/health", get(|| async { "ok" }))
        // GET /articles?tag=...&search=...&difficulty=...
        // The listing endpoint: metadata-only records, date-descending,
        // filterable and searchable.
        .route("/articles", get(handlers::get_articles))
        // GET /articles/{slug}
        // Single-article fetch: metadata plus the raw markdown body.
        .route("/articles/{slug}", get(handlers::get_article_details))
        // GET /articles/{slug}/rendered
        // The sanitized structural node tree for display, with a distinct
        // content-error outcome for malformed bodies.
        .route(
            "/articles/{slug}/rendered",
            get(handlers::get_rendered_article),
        )
}

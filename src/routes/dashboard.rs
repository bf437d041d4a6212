use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Dashboard Router Module
///
/// The `/dashboard` matcher prefix, with the role as the next path segment.
/// Requests only reach these handlers after the gatekeeper has resolved a valid
/// session whose role matches the segment; everything else was already
/// redirected (to the login page, or to the caller's actual dashboard).
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        // GET /dashboard/{role}
        // The role-specific dashboard view for the authenticated caller.
        .route("/dashboard/{role}", get(handlers::dashboard_home))
}

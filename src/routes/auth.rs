use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Auth Pages Router Module
///
/// The `/auth` matcher prefix. These pages must stay reachable without a
/// session (that is where one is obtained); the gatekeeper's only intervention
/// here is redirecting an already-authenticated caller with a resolved role to
/// their dashboard, so a signed-in user never sees the login form again.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        // GET /auth/login
        .route("/auth/login", get(handlers::login_page))
        // GET /auth/register
        .route("/auth/register", get(handlers::register_page))
}

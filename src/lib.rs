use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod cache;
pub mod config;
pub mod frontmatter;
pub mod gatekeeper;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod render;
pub mod repository;

// Module for routing segregation (Public content API, Auth pages, Dashboards).
pub mod routes;
use routes::{auth as auth_pages, dashboard, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use auth::{AuthState, SupabaseAuthProvider};
pub use cache::RoleCache;
pub use config::AppConfig;
pub use repository::{ArticleState, FsArticleStore};

/// ApiDoc
///
/// This struct auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application. It aggregates all API paths and data schemas that have been
/// decorated with the `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    // List all public handler functions here for documentation generation.
    paths(
        handlers::get_articles, handlers::get_article_details, handlers::get_rendered_article,
        handlers::login_page, handlers::register_page, handlers::dashboard_home,
    ),
    // List all models (schemas) used in the request/response bodies.
    components(
        schemas(
            models::ArticleRecord, models::ArticleDocument, models::Role,
            models::DashboardView, models::AuthPageView,
            handlers::RenderedArticle, handlers::ContentError,
            render::ArticleNode, render::InlineNode,
        )
    ),
    tags(
        (name = "learn-portal", description = "Education Portal API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**. This is the single, thread-safe,
/// and immutable container holding all essential application services and
/// configuration. The application state is shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Content Layer: Abstracts the article document store (filesystem-backed).
    pub articles: ArticleState,
    /// Auth Layer: Abstracts the external session/profile collaborator.
    pub auth: AuthState,
    /// Gatekeeper Cache: process-wide TTL cache of role lookups, injected
    /// explicitly so tests can substitute their own instance and clock.
    pub roles: Arc<RoleCache>,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow handlers to selectively pull components from the
// shared AppState. This is critical for dependency injection and keeping the
// component boundaries clean.

impl FromRef<AppState> for ArticleState {
    fn from_ref(app_state: &AppState) -> ArticleState {
        app_state.articles.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(app_state: &AppState) -> AuthState {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for Arc<RoleCache> {
    fn from_ref(app_state: &AppState) -> Arc<RoleCache> {
        app_state.roles.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public content API: no gatekeeping applied.
        .merge(public::public_routes())
        // Gatekept page routes: the two matcher prefixes (/auth, /dashboard)
        // share the gatekeeper middleware, which resolves the session and role
        // and applies the Redirect Policy before any handler runs.
        .merge(
            auth_pages::auth_routes()
                .merge(dashboard::dashboard_routes())
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    gatekeeper::gatekeeper_middleware,
                )),
        )
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: Generates a unique UUID for every
                // incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: Wraps the entire request/response
                // lifecycle in a tracing span correlated by the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: Ensures the generated x-request-id
                // header is returned to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Helper function used by `TraceLayer` to customize the tracing span creation.
/// It extracts the `x-request-id` header (if present) and includes it in the
/// structured logging metadata alongside the HTTP method and URI, so every log
/// line for a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}

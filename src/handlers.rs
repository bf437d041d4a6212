use crate::{
    AppState,
    models::{ArticleDocument, ArticleRecord, AuthPageView, DashboardView, ResolvedSession, Role},
    render::{self, ArticleNode},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Filter Structs ---

/// ArticleFilter
///
/// Defines the accepted query parameters for the article listing endpoint
/// (GET /articles). Used by Axum's Query extractor to safely bind HTTP query
/// parameters for filtering and search.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ArticleFilter {
    /// Optional exact-match filter on a single tag.
    pub tag: Option<String>,
    /// Optional case-insensitive search string over title/description/author.
    pub search: Option<String>,
    /// Optional difficulty label filter (e.g., "easy").
    pub difficulty: Option<String>,
}

// --- Response Schemas ---

/// RenderedArticle
///
/// Output schema of the rendered-article endpoint: the article metadata plus
/// the sanitized structural node tree the frontend maps onto its components.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RenderedArticle {
    pub metadata: ArticleRecord,
    pub nodes: Vec<ArticleNode>,
}

/// ContentError
///
/// Typed error body for content that exists but cannot be rendered. Kept
/// distinct from a bare 404 so the frontend can show a content-specific error
/// panel instead of its not-found view.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContentError {
    pub error: String,
}

// --- Content Pipeline Handlers ---

/// get_articles
///
/// [Public Route] Lists all articles (metadata only, never bodies), sorted by
/// date descending, with optional tag/search/difficulty filtering.
///
/// *Leniency*: documents with malformed metadata appear with defaulted fields;
/// unreadable documents are skipped at the repository layer. The listing itself
/// never fails.
#[utoipa::path(
    get,
    path = "/articles",
    params(ArticleFilter),
    responses((status = 200, description = "List filtered articles", body = [ArticleRecord]))
)]
pub async fn get_articles(
    State(state): State<AppState>,
    Query(filter): Query<ArticleFilter>,
) -> Json<Vec<ArticleRecord>> {
    let articles = state
        .articles
        .list_articles(filter.tag, filter.search, filter.difficulty)
        .await;
    Json(articles)
}

/// get_article_details
///
/// [Public Route] Retrieves a single article (metadata plus raw body) by slug.
/// A missing or unreadable document is an explicit 404, never a crash.
#[utoipa::path(
    get,
    path = "/articles/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Found", body = ArticleDocument),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_article_details(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ArticleDocument>, StatusCode> {
    match state.articles.get_article(&slug).await {
        Some(document) => Ok(Json(document)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// get_rendered_article
///
/// [Public Route] Retrieves a single article rendered to the sanitized node
/// tree. Distinguishes the two failure classes explicitly: a missing document
/// is 404; a document whose body cannot be parsed is 422 with a `ContentError`
/// body so the host page can show a graceful error panel.
#[utoipa::path(
    get,
    path = "/articles/{slug}/rendered",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Rendered", body = RenderedArticle),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Malformed content", body = ContentError)
    )
)]
pub async fn get_rendered_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    let Some(document) = state.articles.get_article(&slug).await else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match render::render_body(&document.body) {
        Ok(nodes) => Json(RenderedArticle {
            metadata: document.metadata,
            nodes,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!("render failed for article {}: {}", slug, e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ContentError {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

// --- Gatekept Page Handlers ---

/// login_page
///
/// [Auth Page Route] Canonical descriptor for the login page. The gatekeeper
/// redirects already-authenticated callers with a resolved role to their
/// dashboard before this handler runs.
#[utoipa::path(
    get,
    path = "/auth/login",
    responses((status = 200, description = "Login page", body = AuthPageView))
)]
pub async fn login_page() -> Json<AuthPageView> {
    Json(AuthPageView {
        page: "login".to_string(),
    })
}

/// register_page
///
/// [Auth Page Route] Canonical descriptor for the registration page.
#[utoipa::path(
    get,
    path = "/auth/register",
    responses((status = 200, description = "Register page", body = AuthPageView))
)]
pub async fn register_page() -> Json<AuthPageView> {
    Json(AuthPageView {
        page: "register".to_string(),
    })
}

/// dashboard_home
///
/// [Dashboard Route] The role dashboard view. The gatekeeper guarantees that
/// only a session whose resolved role matches the path segment reaches this
/// handler; the checks here are the second layer of Defense-in-Depth, mirroring
/// the middleware's decision rather than trusting it blindly.
#[utoipa::path(
    get,
    path = "/dashboard/{role}",
    params(("role" = String, Path, description = "Dashboard role segment")),
    responses(
        (status = 200, description = "Dashboard", body = DashboardView),
        (status = 403, description = "Wrong dashboard"),
        (status = 404, description = "Unknown role")
    )
)]
pub async fn dashboard_home(
    Extension(session): Extension<ResolvedSession>,
    Path(role): Path<String>,
) -> Result<Json<DashboardView>, StatusCode> {
    // An unknown role segment is not a dashboard at all.
    let role = Role::from_str(&role).map_err(|_| StatusCode::NOT_FOUND)?;

    if session.role != Some(role) {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(Json(DashboardView {
        role,
        user_id: session.user_id,
    }))
}

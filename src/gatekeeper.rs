use crate::AppState;
use crate::models::{ResolvedSession, Role};
use crate::policy::{self, AUTH_PREFIX, DASHBOARD_PREFIX, RouteDecision};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

/// gatekeeper_middleware
///
/// Intercepts every request to the auth-page and dashboard prefixes, resolves
/// the caller's session and role, and applies the Redirect Policy.
///
/// *Mechanism*: all I/O happens here — the Session Resolver call and the
/// cached role lookup — and the result is handed to the pure `policy::decide`
/// function. An `Allow` outcome forwards the request (with the resolved session
/// attached as an extension for downstream handlers); a `RedirectTo` outcome
/// short-circuits with a temporary redirect. The gatekeeper never raises
/// authorization errors: every outcome is a routing decision.
pub async fn gatekeeper_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    // Paths outside both matcher prefixes skip session resolution entirely;
    // the policy would allow them anyway.
    if !path.starts_with(AUTH_PREFIX) && !path.starts_with(DASHBOARD_PREFIX) {
        return next.run(request).await;
    }

    let resolved = resolve_caller(&state, request.headers()).await;

    match policy::decide(&path, resolved.as_ref()) {
        RouteDecision::Allow => {
            if let Some(session) = resolved {
                // Dashboard handlers read the session from extensions instead
                // of re-resolving it.
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
        RouteDecision::RedirectTo(target) => Redirect::temporary(&target).into_response(),
    }
}

/// resolve_caller
///
/// Builds the policy's input: the session identity from the auth collaborator,
/// plus the profile role (cache-first). `None` means no valid session exists.
async fn resolve_caller(state: &AppState, headers: &HeaderMap) -> Option<ResolvedSession> {
    let session = state.auth.resolve_session(headers).await?;
    let role = resolve_role(state, session.user_id).await;
    Some(ResolvedSession {
        user_id: session.user_id,
        role,
    })
}

/// resolve_role
///
/// Cache-first role resolution: an unexpired cache entry short-circuits the
/// external profile lookup; on a miss the provider is consulted and a resolved
/// role is cached for the TTL window. Only successful resolutions are cached,
/// so a user completing onboarding is picked up on the next request.
///
/// A provider *failure* is treated the same as an unresolvable profile (the
/// dashboard path then redirects to login); a fresh request retries naturally.
pub async fn resolve_role(state: &AppState, user_id: Uuid) -> Option<Role> {
    if let Some(role) = state.roles.get(&user_id) {
        return Some(role);
    }

    match state.auth.lookup_role(user_id).await {
        Ok(Some(role)) => {
            state.roles.put(user_id, role);
            Some(role)
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("role lookup for {} failed: {}", user_id, e);
            None
        }
    }
}

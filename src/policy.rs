use crate::models::{ResolvedSession, Role};

/// The two path prefixes the gatekeeper inspects. Everything else passes
/// through untouched.
pub const AUTH_PREFIX: &str = "/auth";
pub const DASHBOARD_PREFIX: &str = "/dashboard";

/// The login page unauthenticated dashboard traffic is sent to.
pub const LOGIN_PATH: &str = "/auth/login";

/// RouteDecision
///
/// The tagged outcome of the redirect policy. Keeping this a plain value (and
/// the policy a pure function) keeps all I/O — session and role lookup —
/// outside the decision logic, so the full state table is testable without a
/// server or an auth provider.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteDecision {
    /// Let the request through unchanged.
    Allow,
    /// Issue a redirect to the given path.
    RedirectTo(String),
}

/// decide
///
/// The Redirect Policy state table, a pure function of the request path and the
/// resolved session. The "states" are decision outcomes derived fresh per
/// request; nothing is persisted.
///
/// - Auth-page prefix, authenticated with a resolved role → redirect to that
///   role's dashboard (a signed-in user has no business on the login page).
/// - Auth-page prefix otherwise → allow (this includes an authenticated user
///   with no resolvable profile, who still needs the auth pages to finish
///   onboarding).
/// - Dashboard prefix, unauthenticated → redirect to the login page.
/// - Dashboard prefix, authenticated without a resolvable profile → redirect to
///   the login page (treated as an invalid session).
/// - Dashboard prefix, role differs from the path's role segment → redirect to
///   the actual role's dashboard.
/// - Dashboard prefix, role matches → allow.
/// - Any other path → allow; the policy does not apply.
pub fn decide(path: &str, session: Option<&ResolvedSession>) -> RouteDecision {
    if under_prefix(path, AUTH_PREFIX) {
        return match session {
            Some(ResolvedSession {
                role: Some(role), ..
            }) => RouteDecision::RedirectTo(dashboard_path(*role)),
            _ => RouteDecision::Allow,
        };
    }

    if under_prefix(path, DASHBOARD_PREFIX) {
        let Some(session) = session else {
            return RouteDecision::RedirectTo(LOGIN_PATH.to_string());
        };

        let Some(role) = session.role else {
            return RouteDecision::RedirectTo(LOGIN_PATH.to_string());
        };

        // The role segment immediately follows the prefix: /dashboard/{role}.
        // A missing or mismatched segment both route to the caller's own
        // dashboard.
        return match dashboard_segment(path) {
            Some(segment) if segment == role.as_str() => RouteDecision::Allow,
            _ => RouteDecision::RedirectTo(dashboard_path(role)),
        };
    }

    RouteDecision::Allow
}

/// dashboard_path
///
/// The canonical dashboard location for a role.
pub fn dashboard_path(role: Role) -> String {
    format!("{DASHBOARD_PREFIX}/{role}")
}

/// Prefix match on whole path segments: `/dashboard` and `/dashboard/...`
/// match, `/dashboards` does not.
fn under_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Extracts the role segment of a dashboard path, if present and non-empty.
fn dashboard_segment(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(DASHBOARD_PREFIX)?.strip_prefix('/')?;
    let segment = rest.split('/').next()?;
    (!segment.is_empty()).then_some(segment)
}

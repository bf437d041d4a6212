use learn_portal::models::{ResolvedSession, Role};
use learn_portal::policy::{RouteDecision, decide};
use uuid::Uuid;

// --- TEST UTILITIES ---

fn session(role: Option<Role>) -> ResolvedSession {
    ResolvedSession {
        user_id: Uuid::from_u128(7),
        role,
    }
}

fn redirect(path: &str) -> RouteDecision {
    RouteDecision::RedirectTo(path.to_string())
}

// --- Auth-Page Prefix ---

#[test]
fn test_auth_page_with_resolved_role_redirects_to_dashboard() {
    let s = session(Some(Role::Admin));
    assert_eq!(decide("/auth/login", Some(&s)), redirect("/dashboard/admin"));
}

#[test]
fn test_auth_page_unauthenticated_allows() {
    assert_eq!(decide("/auth/login", None), RouteDecision::Allow);
    assert_eq!(decide("/auth/register", None), RouteDecision::Allow);
}

#[test]
fn test_auth_page_with_unresolved_profile_allows() {
    // A signed-in user without a profile still needs the auth pages to finish
    // onboarding.
    let s = session(None);
    assert_eq!(decide("/auth/register", Some(&s)), RouteDecision::Allow);
}

// --- Dashboard Prefix ---

#[test]
fn test_dashboard_unauthenticated_redirects_to_login() {
    assert_eq!(decide("/dashboard/student", None), redirect("/auth/login"));
}

#[test]
fn test_dashboard_without_profile_redirects_to_login() {
    let s = session(None);
    assert_eq!(
        decide("/dashboard/student", Some(&s)),
        redirect("/auth/login")
    );
}

#[test]
fn test_dashboard_role_mismatch_redirects_to_actual_role() {
    let s = session(Some(Role::Student));
    assert_eq!(
        decide("/dashboard/teacher", Some(&s)),
        redirect("/dashboard/student")
    );
}

#[test]
fn test_dashboard_role_match_allows() {
    let s = session(Some(Role::Teacher));
    assert_eq!(decide("/dashboard/teacher", Some(&s)), RouteDecision::Allow);

    // Deeper paths under the matching role segment are also allowed.
    assert_eq!(
        decide("/dashboard/teacher/classes", Some(&s)),
        RouteDecision::Allow
    );
}

#[test]
fn test_dashboard_root_redirects_to_own_dashboard() {
    // No role segment at all: route the caller to their own dashboard.
    let s = session(Some(Role::Admin));
    assert_eq!(decide("/dashboard", Some(&s)), redirect("/dashboard/admin"));
    assert_eq!(decide("/dashboard/", Some(&s)), redirect("/dashboard/admin"));
}

#[test]
fn test_dashboard_unknown_segment_redirects_to_own_dashboard() {
    let s = session(Some(Role::Student));
    assert_eq!(
        decide("/dashboard/superuser", Some(&s)),
        redirect("/dashboard/student")
    );
}

// --- Paths Outside the Matcher ---

#[test]
fn test_unrelated_paths_always_allow() {
    let s = session(Some(Role::Student));
    assert_eq!(decide("/articles", None), RouteDecision::Allow);
    assert_eq!(decide("/articles", Some(&s)), RouteDecision::Allow);
    assert_eq!(decide("/", None), RouteDecision::Allow);
}

#[test]
fn test_prefix_match_is_segment_aware() {
    // `/dashboards` is not under the `/dashboard` prefix.
    assert_eq!(decide("/dashboards", None), RouteDecision::Allow);
    assert_eq!(decide("/authors", None), RouteDecision::Allow);
}

/// Router Module Index
///
/// Organizes the application's routing logic into access-segregated modules.
/// The content API is open to anonymous readers; the page routes under the two
/// gatekept prefixes (`/auth`, `/dashboard`) are wrapped in the gatekeeper
/// middleware at assembly time, so the routing decision is applied explicitly
/// at the module level rather than scattered through handlers.

/// Read-only content API, accessible to all users (anonymous included).
pub mod public;

/// Auth pages (`/auth/*`): reachable while unauthenticated; the gatekeeper
/// bounces signed-in users with a resolved role to their dashboard.
pub mod auth;

/// Role dashboards (`/dashboard/{role}`): the gatekeeper guarantees a valid
/// session whose role matches the path segment.
pub mod dashboard;

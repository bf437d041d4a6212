use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to the Content Store) ---

/// ArticleRecord
///
/// Represents one publishable document as exposed by the listing endpoint.
/// This is the metadata view of an article: the body is deliberately excluded
/// from listings and only materialized by the single-article fetch.
///
/// Field contract: every record exposed by the listing operation carries a
/// non-null `slug`, `title` (possibly empty string), and `tags` (possibly empty
/// list). String fields default to `""` and list fields to `[]` when the source
/// frontmatter omits them, so the JSON shape is stable for the frontend.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ArticleRecord {
    /// URL-safe stable identifier, derived from the source filename (sans `.md`).
    pub slug: String,
    pub title: String,
    pub description: String,
    pub author: String,
    /// ISO-ish date string as authored in the frontmatter. Used for sort
    /// ordering; invalid/missing values sort as oldest.
    pub date: String,
    pub tags: Vec<String>,
    /// Free-text label, e.g. "easy"/"medium"/"hard". Empty when unset.
    pub difficulty: String,
    /// Numeric-as-string reading time estimate (minutes). Empty when unset.
    pub reading_time: String,
    /// Secondary author names. Empty when unset.
    pub contributors: Vec<String>,
}

/// ArticleDocument
///
/// The full single-article fetch payload: parsed metadata plus the raw,
/// unrendered body text. The body is owned exclusively by the renderer at
/// render time; listings never carry it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ArticleDocument {
    pub metadata: ArticleRecord,
    pub body: String,
}

// --- Gatekeeper Schemas ---

/// Role
///
/// The closed set of user roles recognized by the portal. The role determines
/// which dashboard a session is routed to (`/dashboard/{role}`) and is resolved
/// by looking up the user's profile in the external auth collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// The lowercase wire/path representation, as used in dashboard path segments.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    /// Parses the lowercase role label. Anything outside the closed set is
    /// rejected, so an unknown profile role can never be routed to a dashboard.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// SessionContext
///
/// Per-request, ephemeral identity resolved by the Session Resolver. Present only
/// if the external auth collaborator validated the request's credentials; it is
/// constructed once per incoming request and discarded after the routing decision.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    /// Opaque user identifier, mapped to the auth provider's user id.
    pub user_id: Uuid,
}

/// ResolvedSession
///
/// The gatekeeper's full view of a caller once all I/O has completed: the
/// session identity plus the profile role, if one could be resolved. This is
/// the sole input (besides the path) to the pure Redirect Policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSession {
    pub user_id: Uuid,
    /// `None` when the user has no resolvable profile; the policy treats that
    /// as an invalid session on dashboard paths.
    pub role: Option<Role>,
}

// --- Page View Schemas (Output) ---

/// DashboardView
///
/// Output schema for the role dashboard pages (GET /dashboard/{role}).
/// The gatekeeper middleware guarantees the path role matches the session role
/// before this view is ever produced.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DashboardView {
    pub role: Role,
    /// The authenticated user this dashboard was rendered for.
    pub user_id: Uuid,
}

/// AuthPageView
///
/// Output schema for the unauthenticated auth pages (login/register). The pages
/// themselves are rendered client-side; this endpoint exists so the gatekeeper
/// has a concrete route to guard and the frontend a canonical page descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthPageView {
    pub page: String,
}

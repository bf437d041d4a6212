use crate::frontmatter::parse_document;
use crate::models::{ArticleDocument, ArticleRecord};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// ArticleStore Trait
///
/// Defines the abstract contract for all article retrieval operations. This is the
/// core of the Repository Abstraction pattern, allowing the handlers to interact
/// with the content layer without knowing the specific implementation
/// (filesystem, Mock, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn ArticleStore>`) safely shareable and usable across Axum's
/// asynchronous task boundaries.
///
/// The store is strictly read-only: the backing documents are owned by the
/// external content-authoring collaborator (a version-controlled directory),
/// and every call re-reads and re-parses. Callers needing caching must add it
/// explicitly.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    // Public listing with filtering and search. Bodies are never included.
    async fn list_articles(
        &self,
        tag: Option<String>,
        search: Option<String>,
        difficulty: Option<String>,
    ) -> Vec<ArticleRecord>;

    // Single-article fetch: metadata plus raw body, or None when no document
    // matches the slug (the explicit not-found outcome, never an error).
    async fn get_article(&self, slug: &str) -> Option<ArticleDocument>;
}

/// ArticleState
///
/// The concrete type used to share content-store access across the application state.
pub type ArticleState = Arc<dyn ArticleStore>;

/// FsArticleStore
///
/// The concrete implementation of the `ArticleStore` trait, backed by a directory
/// of markdown files. The slug of each article is its filename with the `.md`
/// extension stripped.
pub struct FsArticleStore {
    content_dir: PathBuf,
}

impl FsArticleStore {
    /// Creates a new store rooted at the configured content directory.
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
        }
    }

    /// enumerate_slugs
    ///
    /// Lists the slugs of all `.md` documents in the content directory, sorted
    /// by filename. Directory-enumeration order is OS-dependent, so the sort
    /// here pins the encounter order and makes listings deterministic across
    /// repeated calls against unchanged input (date ties retain this order).
    async fn enumerate_slugs(&self) -> Vec<String> {
        let mut dir = match tokio::fs::read_dir(&self.content_dir).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!("content dir {:?} unreadable: {:?}", self.content_dir, e);
                return vec![];
            }
        };

        let mut slugs = Vec::new();
        while let Ok(Some(entry)) = dir.next_entry().await {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(slug) = name.strip_suffix(".md") {
                slugs.push(slug.to_string());
            }
        }

        slugs.sort();
        slugs
    }
}

#[async_trait]
impl ArticleStore for FsArticleStore {
    /// list_articles
    ///
    /// Enumerates all backing documents, parses each, discards the bodies, and
    /// returns the records sorted by date descending (most recent first).
    /// Documents with unparsable dates sort as if dated at the epoch (oldest);
    /// the sort is stable, so date ties keep filename order.
    ///
    /// **Leniency**: a document that cannot be read is logged and skipped, so a
    /// single bad file degrades the listing rather than failing it.
    async fn list_articles(
        &self,
        tag: Option<String>,
        search: Option<String>,
        difficulty: Option<String>,
    ) -> Vec<ArticleRecord> {
        let mut records = Vec::new();

        for slug in self.enumerate_slugs().await {
            let path = self.content_dir.join(format!("{slug}.md"));
            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::error!("skipping unreadable article {:?}: {:?}", path, e);
                    continue;
                }
            };
            records.push(parse_document(&raw).metadata.into_record(slug));
        }

        if let Some(tag) = tag {
            records.retain(|r| r.tags.iter().any(|t| t == &tag));
        }

        if let Some(search) = search {
            // Case-insensitive search across title, description, and author.
            let needle = search.to_lowercase();
            records.retain(|r| {
                r.title.to_lowercase().contains(&needle)
                    || r.description.to_lowercase().contains(&needle)
                    || r.author.to_lowercase().contains(&needle)
            });
        }

        if let Some(difficulty) = difficulty {
            records.retain(|r| r.difficulty.eq_ignore_ascii_case(&difficulty));
        }

        // Vec::sort_by is stable: equal keys retain encounter (filename) order.
        records.sort_by(|a, b| date_sort_key(&b.date).cmp(&date_sort_key(&a.date)));
        records
    }

    /// get_article
    ///
    /// Locates the single backing document matching `slug` and returns its
    /// parsed metadata and raw body. Returns `None` when no document matches or
    /// the read fails, so the caller can render a not-found view without a crash.
    async fn get_article(&self, slug: &str) -> Option<ArticleDocument> {
        let slug = sanitize_slug(slug)?;
        let path = self.content_dir.join(format!("{slug}.md"));

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("article {:?} not readable: {:?}", path, e);
                return None;
            }
        };

        let parsed = parse_document(&raw);
        Some(ArticleDocument {
            metadata: parsed.metadata.into_record(slug),
            body: parsed.body,
        })
    }
}

/// sanitize_slug
///
/// Rejects slugs containing path navigation components so a crafted slug can
/// never escape the content directory. Valid slugs are plain filenames.
fn sanitize_slug(slug: &str) -> Option<&str> {
    if slug.is_empty()
        || slug.contains('/')
        || slug.contains('\\')
        || slug.contains("..")
        || Path::new(slug).file_name().is_none_or(|n| n != slug)
    {
        return None;
    }
    Some(slug)
}

/// date_sort_key
///
/// Maps a frontmatter date string to a unix timestamp for ordering. Accepts
/// RFC 3339 timestamps and bare `YYYY-MM-DD` dates; anything else keys at the
/// epoch so invalid/missing dates sort oldest.
pub fn date_sort_key(date: &str) -> i64 {
    let date = date.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return dt.timestamp();
    }

    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return d.and_time(NaiveTime::MIN).and_utc().timestamp();
    }

    0
}

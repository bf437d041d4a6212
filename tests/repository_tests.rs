use learn_portal::repository::{ArticleStore, FsArticleStore};
use std::fs;
use tempfile::TempDir;

// --- TEST UTILITIES ---

/// Creates a content directory populated with the given (filename, contents)
/// pairs, mirroring the version-controlled article store.
fn content_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents).expect("write fixture");
    }
    dir
}

fn article(title: &str, date: &str, extra: &str) -> String {
    format!("---\ntitle: {title}\ndate: \"{date}\"\n{extra}---\nBody of {title}.\n")
}

// --- Listing ---

#[tokio::test]
async fn test_listing_sorts_by_date_descending_with_invalid_dates_last() {
    let dir = content_dir(&[
        ("jan.md", &article("January", "2024-01-01", "")),
        ("jun.md", &article("June", "2024-06-01", "")),
        ("undated.md", &article("Undated", "not-a-date", "")),
    ]);
    let store = FsArticleStore::new(dir.path());

    let listing = store.list_articles(None, None, None).await;
    let titles: Vec<&str> = listing.iter().map(|r| r.title.as_str()).collect();

    assert_eq!(titles, vec!["June", "January", "Undated"]);
}

#[tokio::test]
async fn test_listing_is_idempotent() {
    let dir = content_dir(&[
        ("a.md", &article("A", "2024-03-01", "")),
        ("b.md", &article("B", "2024-05-01", "")),
        ("c.md", &article("C", "2024-04-01", "")),
    ]);
    let store = FsArticleStore::new(dir.path());

    let first = store.list_articles(None, None, None).await;
    let second = store.list_articles(None, None, None).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_date_ties_retain_filename_order() {
    // Same date everywhere: the stable sort must fall back to the
    // deterministic filename encounter order.
    let dir = content_dir(&[
        ("zebra.md", &article("Zebra", "2024-02-02", "")),
        ("apple.md", &article("Apple", "2024-02-02", "")),
        ("mango.md", &article("Mango", "2024-02-02", "")),
    ]);
    let store = FsArticleStore::new(dir.path());

    let listing = store.list_articles(None, None, None).await;
    let slugs: Vec<&str> = listing.iter().map(|r| r.slug.as_str()).collect();

    assert_eq!(slugs, vec!["apple", "mango", "zebra"]);
}

#[tokio::test]
async fn test_listing_excludes_bodies_and_non_markdown_files() {
    let dir = content_dir(&[
        ("real.md", &article("Real", "2024-01-01", "")),
        ("notes.txt", "not an article"),
    ]);
    let store = FsArticleStore::new(dir.path());

    let listing = store.list_articles(None, None, None).await;

    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].slug, "real");
}

#[tokio::test]
async fn test_listing_filters_by_tag_search_and_difficulty() {
    let dir = content_dir(&[
        (
            "rustintro.md",
            &article("Rust Intro", "2024-01-01", "tags: rust, beginners\ndifficulty: easy\n"),
        ),
        (
            "advanced.md",
            &article("Advanced Borrowing", "2024-02-01", "tags: rust\ndifficulty: hard\n"),
        ),
        (
            "pyintro.md",
            &article("Python Intro", "2024-03-01", "tags: python\ndifficulty: easy\n"),
        ),
    ]);
    let store = FsArticleStore::new(dir.path());

    let by_tag = store
        .list_articles(Some("rust".to_string()), None, None)
        .await;
    assert_eq!(by_tag.len(), 2);

    let by_search = store
        .list_articles(None, Some("intro".to_string()), None)
        .await;
    assert_eq!(by_search.len(), 2);

    let by_difficulty = store
        .list_articles(None, None, Some("easy".to_string()))
        .await;
    assert_eq!(by_difficulty.len(), 2);

    let combined = store
        .list_articles(Some("rust".to_string()), None, Some("easy".to_string()))
        .await;
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0].title, "Rust Intro");
}

#[tokio::test]
async fn test_listing_tolerates_malformed_documents() {
    // One document with broken frontmatter must not break the listing; it
    // appears with defaulted fields and sorts oldest (no parsable date).
    let dir = content_dir(&[
        ("good.md", &article("Good", "2024-06-01", "")),
        ("broken.md", "---\ntitle: [unclosed\n---\nbody"),
    ]);
    let store = FsArticleStore::new(dir.path());

    let listing = store.list_articles(None, None, None).await;

    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].title, "Good");
    assert_eq!(listing[1].title, "");
    assert_eq!(listing[1].slug, "broken");
}

#[tokio::test]
async fn test_missing_content_dir_yields_empty_listing() {
    let store = FsArticleStore::new("/definitely/not/a/real/dir");

    let listing = store.list_articles(None, None, None).await;

    assert!(listing.is_empty());
}

// --- Single-Article Fetch ---

#[tokio::test]
async fn test_get_article_returns_metadata_and_body() {
    let dir = content_dir(&[("guide.md", &article("Guide", "2024-01-15", ""))]);
    let store = FsArticleStore::new(dir.path());

    let doc = store.get_article("guide").await.expect("article");

    assert_eq!(doc.metadata.slug, "guide");
    assert_eq!(doc.metadata.title, "Guide");
    assert_eq!(doc.body, "Body of Guide.");
}

#[tokio::test]
async fn test_get_article_missing_slug_is_none() {
    let dir = content_dir(&[("present.md", &article("Present", "2024-01-01", ""))]);
    let store = FsArticleStore::new(dir.path());

    assert!(store.get_article("missing-slug").await.is_none());
}

#[tokio::test]
async fn test_get_article_rejects_path_traversal_slugs() {
    let dir = content_dir(&[("safe.md", &article("Safe", "2024-01-01", ""))]);
    let store = FsArticleStore::new(dir.path());

    assert!(store.get_article("../safe").await.is_none());
    assert!(store.get_article("a/b").await.is_none());
    assert!(store.get_article("").await.is_none());
}

use crate::error::Res;
use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Res<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub(crate) async fn read(path: &Path) -> Res<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Create a directory and its parents if they do not exist.
pub(crate) async fn make_dir(p: &Path) -> Res<()> {
    tokio::fs::create_dir_all(p)
        .await
        .with_context(|| format!("Unable to create directory at {}", p.to_string_lossy()))
}

pub(crate) async fn canonicalize(p: &Path) -> Res<PathBuf> {
    tokio::fs::canonicalize(p)
        .await
        .with_context(|| format!("Unable to canonicalize the path {}", p.to_string_lossy()))
}

pub(crate) async fn read_dir(p: &Path) -> Res<tokio::fs::ReadDir> {
    tokio::fs::read_dir(p)
        .await
        .with_context(|| format!("Unable to read directory {}", p.to_string_lossy()))
}

/// Generates a new random identity for a category, transaction or budget.
pub(crate) fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// The current time as an RFC 3339 string with microseconds. Used for `created_at` columns, which
/// sort lexically in time order.
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Returns "" when `count == 1` and `plural` otherwise.
pub(crate) fn plural(count: u64, plural: &'static str) -> &'static str {
    if count == 1 {
        ""
    } else {
        plural
    }
}

#[test]
fn test_now_sorts_lexically() {
    let a = now();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = now();
    assert!(a < b, "{a} should sort before {b}");
    assert!(a.ends_with('Z'));
}

#[test]
fn test_generate_id_is_unique() {
    assert_ne!(generate_id(), generate_id());
}

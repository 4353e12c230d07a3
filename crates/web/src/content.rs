//! Static content shipped alongside the binary.
//!
//! Content is loaded once at startup from the content directory:
//!
//! ```text
//! content/
//! └── sneak_peeks.json   - upcoming releases shown on the home page
//! ```
//!
//! A missing file means there is nothing to show; a malformed file is a
//! startup error so broken content never reaches readers.

use std::path::Path;
use std::sync::Arc;

use pageturn_core::PreviewItem;

/// File holding the sneak peek list.
pub const SNEAK_PEEKS_FILE: &str = "sneak_peeks.json";

/// Content store that holds all loaded content in memory.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    sneak_peeks: Arc<Vec<PreviewItem>>,
}

impl ContentStore {
    /// Load all content from the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if a content file exists but cannot be read or parsed.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let sneak_peeks = Self::load_sneak_peeks(&content_dir.join(SNEAK_PEEKS_FILE))?;
        Ok(Self::from_sneak_peeks(sneak_peeks))
    }

    /// Build a store from an in-memory sneak peek list.
    #[must_use]
    pub fn from_sneak_peeks(sneak_peeks: Vec<PreviewItem>) -> Self {
        Self {
            sneak_peeks: Arc::new(sneak_peeks),
        }
    }

    /// Upcoming releases, in file order.
    #[must_use]
    pub fn sneak_peeks(&self) -> &[PreviewItem] {
        &self.sneak_peeks
    }

    fn load_sneak_peeks(path: &Path) -> Result<Vec<PreviewItem>, ContentError> {
        if !path.exists() {
            tracing::warn!("Sneak peek file does not exist: {:?}", path);
            return Ok(Vec::new());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;
        let items: Vec<PreviewItem> = serde_json::from_str(&raw)
            .map_err(|e| ContentError::Parse(format!("{}: {e}", path.display())))?;

        tracing::info!(count = items.len(), "Loaded sneak peeks");
        Ok(items)
    }
}

/// Content loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("pageturn-content-{name}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = scratch_dir("missing");
        let store = ContentStore::load(&dir).unwrap();
        assert!(store.sneak_peeks().is_empty());
    }

    #[test]
    fn test_loads_in_file_order() {
        let dir = scratch_dir("ordered");
        std::fs::write(
            dir.join(SNEAK_PEEKS_FILE),
            r#"[
                {"id": "b", "title": "Second Light", "cover": "/static/covers/b.jpg",
                 "releaseDate": "2026-12-01", "description": "Coming soon."},
                {"id": "a", "title": "First Frost", "cover": "/static/covers/a.jpg",
                 "releaseDate": "2026-11-01", "description": "Coming sooner."}
            ]"#,
        )
        .unwrap();

        let store = ContentStore::load(&dir).unwrap();
        let ids: Vec<&str> = store.sneak_peeks().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = scratch_dir("malformed");
        std::fs::write(dir.join(SNEAK_PEEKS_FILE), "[{\"id\": 1}").unwrap();

        let err = ContentStore::load(&dir).unwrap_err();
        assert!(matches!(err, ContentError::Parse(_)));
    }
}

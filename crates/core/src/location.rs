//! Site-relative locations and fragment identifiers.
//!
//! Deep links have the shape `<path>[?<query>]#<elementId>`. Only the part
//! before `#` ever reaches the server; the fragment is resolved on arrival by
//! [`crate::anchor::DeferredAnchorScroll`].

use std::fmt;

/// A parsed site-relative location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl Location {
    /// Parse a location such as `/novels?page=2#chapter-4`.
    ///
    /// An empty path is normalized to `/`. Empty query and fragment parts are
    /// treated as absent.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (rest, fragment) = match raw.split_once('#') {
            Some((rest, fragment)) => (rest, non_empty(fragment)),
            None => (raw, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, non_empty(query)),
            None => (rest, None),
        };
        let path = if path.is_empty() { "/" } else { path };

        Self {
            path: path.to_string(),
            query,
            fragment,
        }
    }

    /// The path component.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The fragment identifier, without the leading `#`.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Path plus query, i.e. what a server sees of this location.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{query}", self.path),
            None => self.path.clone(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_and_query())?;
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Validate a post-login return target.
///
/// Only site-local absolute paths are accepted. Anything that a browser could
/// resolve to another origin (`//host`, `/\host`, absolute URLs) is rejected.
#[must_use]
pub fn safe_return_path(from: &str) -> Option<&str> {
    let local = from.starts_with('/')
        && !from.starts_with("//")
        && !from.contains('\\')
        && !from.chars().any(char::is_control);
    local.then_some(from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_location() {
        let loc = Location::parse("/novels?page=2#chapter-4");
        assert_eq!(loc.path(), "/novels");
        assert_eq!(loc.fragment(), Some("chapter-4"));
        assert_eq!(loc.path_and_query(), "/novels?page=2");
        assert_eq!(loc.to_string(), "/novels?page=2#chapter-4");
    }

    #[test]
    fn test_parse_fragment_only() {
        let loc = Location::parse("#announcements");
        assert_eq!(loc.path(), "/");
        assert_eq!(loc.fragment(), Some("announcements"));
    }

    #[test]
    fn test_empty_fragment_is_absent() {
        let loc = Location::parse("/settings#");
        assert_eq!(loc.fragment(), None);
        assert_eq!(loc.to_string(), "/settings");
    }

    #[test]
    fn test_safe_return_path_accepts_local_paths() {
        assert_eq!(safe_return_path("/settings"), Some("/settings"));
        assert_eq!(
            safe_return_path("/settings?tab=security"),
            Some("/settings?tab=security")
        );
    }

    #[test]
    fn test_safe_return_path_rejects_other_origins() {
        assert_eq!(safe_return_path("https://evil.example"), None);
        assert_eq!(safe_return_path("//evil.example/path"), None);
        assert_eq!(safe_return_path("/\\evil.example"), None);
        assert_eq!(safe_return_path("settings"), None);
        assert_eq!(safe_return_path(""), None);
    }
}

//! Listing sections: the fetch, filter, sort and render pattern.
//!
//! A section issues one read against a backend collection and renders the
//! rows as a carousel or grid. A section with no rows renders nothing at all,
//! header included. A failed read is logged and rendered exactly like an
//! empty one, but stays distinguishable through [`SectionLoad`].

use chrono::{DateTime, Utc};

use crate::types::{Announcement, Novel};

/// Read contract against the hosted backend:
/// `select * from <collection> where <flag> = true order by <order_by> desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionQuery {
    pub collection: &'static str,
    pub flag: Option<&'static str>,
    pub order_by: &'static str,
}

impl SectionQuery {
    pub const ANNOUNCEMENTS: Self = Self {
        collection: "announcements",
        flag: Some("is_active"),
        order_by: "created_at",
    };

    pub const NOVELS: Self = Self {
        collection: "novels",
        flag: Some("is_published"),
        order_by: "created_at",
    };
}

/// A row that can be listed in a section.
pub trait Listed {
    /// Creation timestamp used for newest-first ordering.
    fn created_at(&self) -> DateTime<Utc>;

    /// Whether the row's active/published flag is set.
    fn is_listed(&self) -> bool;
}

impl Listed for Announcement {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_listed(&self) -> bool {
        self.is_active
    }
}

impl Listed for Novel {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_listed(&self) -> bool {
        self.is_published
    }
}

/// Outcome of a section's read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionLoad<T> {
    /// At least one listed row, newest first.
    Loaded(Vec<T>),
    /// The read succeeded with nothing to list.
    Empty,
    /// The read failed; the message is for logs only.
    Failed(String),
}

impl<T: Listed> SectionLoad<T> {
    /// Shape the result of a backend read.
    ///
    /// Rows whose flag is unset are dropped even if the backend returned them,
    /// and the rest are ordered by descending creation time.
    pub fn from_read<E: std::fmt::Display>(result: Result<Vec<T>, E>) -> Self {
        match result {
            Ok(rows) => {
                let mut rows: Vec<T> = rows.into_iter().filter(Listed::is_listed).collect();
                if rows.is_empty() {
                    return Self::Empty;
                }
                rows.sort_by_key(|row| std::cmp::Reverse(row.created_at()));
                Self::Loaded(rows)
            }
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

impl<T> SectionLoad<T> {
    /// Number of rows that will be rendered.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Loaded(rows) => rows.len(),
            Self::Empty | Self::Failed(_) => 0,
        }
    }

    /// Whether nothing will be rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How a section lays out its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SectionLayout {
    /// Single horizontally scrollable row.
    #[default]
    Carousel,
    /// Wrapping grid.
    Grid,
}

impl SectionLayout {
    /// CSS modifier class for the layout.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Carousel => "section--carousel",
            Self::Grid => "section--grid",
        }
    }
}

/// Heading block shown above a section's items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    pub title: String,
    pub subtitle: Option<String>,
    /// Element id of the section, the target of `#fragment` deep links.
    pub anchor_id: String,
    pub see_all_href: Option<String>,
}

impl SectionHeader {
    #[must_use]
    pub fn new(title: impl Into<String>, anchor_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            anchor_id: anchor_id.into(),
            see_all_href: None,
        }
    }

    #[must_use]
    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    #[must_use]
    pub fn see_all(mut self, href: impl Into<String>) -> Self {
        self.see_all_href = Some(href.into());
        self
    }
}

/// A section ready to render. Only exists when there is something to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSection<T> {
    pub header: SectionHeader,
    pub layout: SectionLayout,
    pub items: Vec<T>,
}

impl<T> ListSection<T> {
    /// Build a section from a backend read; `None` when there are no rows.
    #[must_use]
    pub fn from_load(header: SectionHeader, layout: SectionLayout, load: SectionLoad<T>) -> Option<Self> {
        match load {
            SectionLoad::Loaded(items) => Some(Self {
                header,
                layout,
                items,
            }),
            SectionLoad::Empty => None,
            SectionLoad::Failed(error) => {
                tracing::warn!(
                    section = %header.anchor_id,
                    error = %error,
                    "Section read failed, hiding section"
                );
                None
            }
        }
    }

    /// Build a section from static content, kept in the given order.
    #[must_use]
    pub fn from_static(header: SectionHeader, layout: SectionLayout, items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self {
                header,
                layout,
                items,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::AnnouncementId;

    fn announcement(id: i64, hour: u32, is_active: bool) -> Announcement {
        Announcement {
            id: AnnouncementId::new(id),
            title: format!("Announcement {id}"),
            content: String::new(),
            is_active,
            created_at: Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap(),
        }
    }

    fn header() -> SectionHeader {
        SectionHeader::new("Announcements", "announcements")
    }

    #[test]
    fn test_rows_render_newest_first() {
        let (t1, t2, t3) = (announcement(1, 1, true), announcement(2, 2, true), announcement(3, 3, true));
        let load = SectionLoad::<Announcement>::from_read(Ok::<_, String>(vec![t1, t3, t2]));

        let section = ListSection::from_load(header(), SectionLayout::Carousel, load).unwrap();
        let ids: Vec<i64> = section.items.iter().map(|a| a.id.as_i64()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_inactive_rows_are_never_listed() {
        let load = SectionLoad::from_read(Ok::<_, String>(vec![
            announcement(1, 1, true),
            announcement(2, 2, false),
        ]));
        assert_eq!(load.len(), 1);

        let only_inactive = SectionLoad::from_read(Ok::<_, String>(vec![announcement(2, 2, false)]));
        assert_eq!(only_inactive, SectionLoad::Empty);
    }

    #[test]
    fn test_empty_and_failed_reads_both_hide_the_section() {
        let empty = SectionLoad::<Announcement>::from_read(Ok::<_, String>(Vec::new()));
        let failed = SectionLoad::<Announcement>::from_read(Err("connection refused"));

        assert_eq!(empty, SectionLoad::Empty);
        assert!(matches!(failed, SectionLoad::Failed(ref msg) if msg == "connection refused"));
        assert!(empty.is_empty());
        assert!(failed.is_empty());

        assert!(ListSection::from_load(header(), SectionLayout::Carousel, empty).is_none());
        assert!(ListSection::from_load(header(), SectionLayout::Carousel, failed).is_none());
    }

    #[test]
    fn test_static_section_keeps_given_order() {
        let section = ListSection::from_static(header(), SectionLayout::Grid, vec!["b", "a"]).unwrap();
        assert_eq!(section.items, vec!["b", "a"]);
        assert!(ListSection::<&str>::from_static(header(), SectionLayout::Grid, Vec::new()).is_none());
    }

    #[test]
    fn test_header_builder() {
        let header = SectionHeader::new("Latest novels", "latest")
            .subtitle("Fresh from our authors")
            .see_all("/novels");
        assert_eq!(header.subtitle.as_deref(), Some("Fresh from our authors"));
        assert_eq!(header.see_all_href.as_deref(), Some("/novels"));
        assert_eq!(SectionLayout::Grid.css_class(), "section--grid");
    }
}

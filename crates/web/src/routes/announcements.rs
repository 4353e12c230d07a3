//! Announcements listing route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use pageturn_core::{Announcement, ListSection, SectionHeader, SectionLayout, SectionLoad, SectionQuery};

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::Viewer;
use crate::state::AppState;

/// Announcements page template.
#[derive(Template, WebTemplate)]
#[template(path = "announcements.html")]
pub struct AnnouncementsTemplate {
    pub viewer: Option<Viewer>,
    pub section: Option<ListSection<Announcement>>,
}

/// Display every active announcement, newest first.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, auth: OptionalAuth) -> impl IntoResponse {
    let read = state
        .backend()
        .select_active::<Announcement>(SectionQuery::ANNOUNCEMENTS)
        .await;

    AnnouncementsTemplate {
        viewer: auth.viewer(),
        section: ListSection::from_load(
            SectionHeader::new("All announcements", "announcements"),
            SectionLayout::Grid,
            SectionLoad::from_read(read),
        ),
    }
}

//! Staff dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use pageturn_core::{Announcement, Novel, SectionLoad, SectionQuery};

use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::{CurrentUser, Viewer};
use crate::state::AppState;

/// Health of one listing as staff see it.
pub struct ListingStatus {
    pub label: &'static str,
    pub href: &'static str,
    pub summary: String,
    pub failed: bool,
}

impl ListingStatus {
    fn new<T>(label: &'static str, href: &'static str, load: &SectionLoad<T>) -> Self {
        let (summary, failed) = match load {
            SectionLoad::Loaded(rows) => (format!("{} listed", rows.len()), false),
            SectionLoad::Empty => ("Nothing listed; section hidden".to_string(), false),
            SectionLoad::Failed(_) => ("Backend read failed; section hidden".to_string(), true),
        };
        Self {
            label,
            href,
            summary,
            failed,
        }
    }
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub viewer: Option<Viewer>,
    pub user: CurrentUser,
    pub listings: Vec<ListingStatus>,
}

/// Display the staff dashboard.
///
/// Unlike reader pages, a failed read is reported here instead of being
/// folded into the empty state.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, RequireStaff(user): RequireStaff) -> impl IntoResponse {
    let backend = state.backend();
    let (announcements, novels) = tokio::join!(
        backend.select_active::<Announcement>(SectionQuery::ANNOUNCEMENTS),
        backend.select_active::<Novel>(SectionQuery::NOVELS),
    );

    let announcements = SectionLoad::from_read(announcements);
    let novels = SectionLoad::from_read(novels);

    DashboardTemplate {
        viewer: Some(Viewer::from(&user)),
        user,
        listings: vec![
            ListingStatus::new("Announcements", "/announcements", &announcements),
            ListingStatus::new("Latest novels", "/#latest-novels", &novels),
        ],
    }
}

//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use pageturn_core::{
    Announcement, ListSection, Novel, PreviewItem, SectionHeader, SectionLayout, SectionLoad,
    SectionQuery,
};

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::Viewer;
use crate::state::AppState;

/// Hero copy shown above the sections.
pub struct Hero {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub cta_label: &'static str,
    pub cta_href: &'static str,
}

const HERO: Hero = Hero {
    title: "Stories worth staying up for",
    subtitle: "Serialized novels from independent authors, updated every week.",
    cta_label: "Browse latest novels",
    cta_href: "/#latest-novels",
};

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub viewer: Option<Viewer>,
    pub hero: Hero,
    pub announcements: Option<ListSection<Announcement>>,
    pub novels: Option<ListSection<Novel>>,
    pub sneak_peeks: Option<ListSection<PreviewItem>>,
}

fn announcements_header() -> SectionHeader {
    SectionHeader::new("Announcements", "announcements")
        .subtitle("News from the Pageturn team")
        .see_all("/announcements")
}

fn novels_header() -> SectionHeader {
    SectionHeader::new("Latest Novels", "latest-novels").subtitle("Fresh from our authors")
}

fn sneak_peeks_header() -> SectionHeader {
    SectionHeader::new("Sneak Peeks", "sneak-peeks").subtitle("Coming soon to Pageturn")
}

/// Display the home page.
///
/// Both backend reads are issued together; each section appears only when
/// its read produced rows.
#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, auth: OptionalAuth) -> impl IntoResponse {
    let backend = state.backend();
    let (announcements, novels) = tokio::join!(
        backend.select_active::<Announcement>(SectionQuery::ANNOUNCEMENTS),
        backend.select_active::<Novel>(SectionQuery::NOVELS),
    );

    HomeTemplate {
        viewer: auth.viewer(),
        hero: HERO,
        announcements: ListSection::from_load(
            announcements_header(),
            SectionLayout::Carousel,
            SectionLoad::from_read(announcements),
        ),
        novels: ListSection::from_load(
            novels_header(),
            SectionLayout::Carousel,
            SectionLoad::from_read(novels),
        ),
        sneak_peeks: ListSection::from_static(
            sneak_peeks_header(),
            SectionLayout::Carousel,
            state.content().sneak_peeks().to_vec(),
        ),
    }
}

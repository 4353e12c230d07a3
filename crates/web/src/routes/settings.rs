//! Account settings route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::Query, response::IntoResponse};
use serde::Deserialize;

use pageturn_core::{SettingsTab, SettingsTabs};

use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Viewer};

/// Query parameters of the settings page.
#[derive(Debug, Deserialize)]
pub struct SettingsQuery {
    pub tab: Option<String>,
}

/// One entry of the tab bar.
pub struct TabLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// Settings page template.
#[derive(Template, WebTemplate)]
#[template(path = "settings/index.html")]
pub struct SettingsTemplate {
    pub viewer: Option<Viewer>,
    pub user: CurrentUser,
    pub tab_links: Vec<TabLink>,
    pub active_tab: SettingsTab,
}

/// Tab requested by the query string; unknown values select nothing.
fn requested_tab(query: &SettingsQuery) -> Option<SettingsTab> {
    query.tab.as_deref().and_then(|tab| tab.parse().ok())
}

fn tab_links(tabs: &SettingsTabs) -> Vec<TabLink> {
    SettingsTab::ALL
        .into_iter()
        .map(|tab| TabLink {
            label: tab.label(),
            href: format!("/settings?tab={tab}"),
            active: tabs.is_active(tab),
        })
        .collect()
}

/// Display the settings page with the requested tab.
pub async fn index(
    RequireAuth(user): RequireAuth,
    Query(query): Query<SettingsQuery>,
) -> impl IntoResponse {
    let mut tabs = SettingsTabs::default();
    if let Some(tab) = requested_tab(&query) {
        tabs.select(tab);
    }

    SettingsTemplate {
        viewer: Some(Viewer::from(&user)),
        user,
        tab_links: tab_links(&tabs),
        active_tab: tabs.active(),
    }
}

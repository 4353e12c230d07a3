//! Settings tab selection.

use serde::{Deserialize, Serialize};

/// The mutually exclusive settings sub-views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SettingsTab {
    #[default]
    Profile,
    Security,
}

impl SettingsTab {
    /// Every tab, in display order.
    pub const ALL: [Self; 2] = [Self::Profile, Self::Security];

    /// Query-string value of this tab.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Security => "security",
        }
    }

    /// Human-readable tab label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Security => "Security",
        }
    }
}

impl std::fmt::Display for SettingsTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SettingsTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "profile" => Ok(Self::Profile),
            "security" => Ok(Self::Security),
            _ => Err(format!("invalid settings tab: {s}")),
        }
    }
}

/// Single-selection controller over [`SettingsTab`].
///
/// Any tab can be selected from any other; selecting never touches state
/// owned by the sub-views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsTabs {
    active: SettingsTab,
}

impl SettingsTabs {
    /// Controller showing `active`.
    #[must_use]
    pub const fn with_active(active: SettingsTab) -> Self {
        Self { active }
    }

    /// The tab whose view is rendered.
    #[must_use]
    pub const fn active(&self) -> SettingsTab {
        self.active
    }

    /// Switch to `tab`.
    pub const fn select(&mut self, tab: SettingsTab) {
        self.active = tab;
    }

    /// Whether `tab` is the one being shown.
    #[must_use]
    pub fn is_active(&self, tab: SettingsTab) -> bool {
        self.active == tab
    }
}

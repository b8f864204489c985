//! Menu styling variants shared across theme packages.
//!
//! A package does not own its menu tokens. It names a [`MenuVariant`], and the
//! variant resolves to one of a small set of interned [`MenuTokens`] value
//! objects. Two packages requesting the same variant share the same static
//! token set, so a package can never mutate menu styling out from under
//! another package.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a precomputed menu token set.
///
/// Serialized as `"light"` / `"dark"` in package definitions. Packages that
/// omit the field default to [`MenuVariant::Light`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuVariant {
    #[default]
    Light,
    Dark,
}

impl MenuVariant {
    /// Resolves the variant to its shared token set.
    ///
    /// The same variant always returns the same `&'static` value, which is
    /// what makes structural sharing observable (and testable via pointer
    /// identity).
    pub fn tokens(self) -> &'static MenuTokens {
        match self {
            MenuVariant::Light => &LIGHT_MENU_TOKENS,
            MenuVariant::Dark => &DARK_MENU_TOKENS,
        }
    }

    /// Returns the opposite variant.
    pub fn toggled(self) -> Self {
        match self {
            MenuVariant::Light => MenuVariant::Dark,
            MenuVariant::Dark => MenuVariant::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MenuVariant::Light => "light",
            MenuVariant::Dark => "dark",
        }
    }
}

impl fmt::Display for MenuVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token set specific to navigation-menu rendering.
///
/// Instances are interned statics; consumers hold `&'static MenuTokens` and
/// never copies of their own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuTokens {
    // Sider chrome
    pub sider_bg: &'static str,
    pub sider_color: &'static str,
    pub trigger_bg: &'static str,
    pub trigger_color: &'static str,

    // Menu items
    pub item_bg: &'static str,
    pub item_selected_bg: &'static str,
    pub item_hover_bg: &'static str,
    pub item_color: &'static str,
    pub item_selected_color: &'static str,
    pub item_hover_color: &'static str,
    pub item_active_bg: &'static str,
    pub item_active_color: &'static str,
    pub item_disabled_color: &'static str,

    // Submenus
    pub sub_menu_item_bg: &'static str,
    pub group_title_color: &'static str,

    // Geometry
    pub icon_size: u16,
    pub collapsed_icon_size: u16,
    pub collapsed_width: u16,
}

static LIGHT_MENU_TOKENS: MenuTokens = MenuTokens {
    sider_bg: "#ffffff",
    sider_color: "#1f1f1f",
    trigger_bg: "#f5f5f5",
    trigger_color: "#1f1f1f",
    item_bg: "transparent",
    item_selected_bg: "#e6f7ff",
    item_hover_bg: "#f5f5f5",
    item_color: "#1f1f1f",
    item_selected_color: "#1890ff",
    item_hover_color: "#1890ff",
    item_active_bg: "#e6f7ff",
    item_active_color: "#1890ff",
    item_disabled_color: "#bfbfbf",
    sub_menu_item_bg: "transparent",
    group_title_color: "#595959",
    icon_size: 14,
    collapsed_icon_size: 16,
    collapsed_width: 80,
};

static DARK_MENU_TOKENS: MenuTokens = MenuTokens {
    sider_bg: "#001529",
    sider_color: "rgba(255, 255, 255, 0.95)",
    trigger_bg: "#002140",
    trigger_color: "#ffffff",
    item_bg: "transparent",
    item_selected_bg: "#1890ff",
    item_hover_bg: "rgba(24, 144, 255, 0.15)",
    item_color: "rgba(255, 255, 255, 0.95)",
    item_selected_color: "#ffffff",
    item_hover_color: "#ffffff",
    item_active_bg: "rgba(24, 144, 255, 0.25)",
    item_active_color: "#ffffff",
    item_disabled_color: "rgba(255, 255, 255, 0.4)",
    sub_menu_item_bg: "transparent",
    group_title_color: "rgba(255, 255, 255, 0.6)",
    icon_size: 14,
    collapsed_icon_size: 16,
    collapsed_width: 80,
};

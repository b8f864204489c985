//! Core data model for theme packages.
//!
//! A [`ThemePackage`] is the unit everything else operates on: metadata,
//! a structured design-token set, a named menu variant and optional
//! per-component overrides. Packages serialize to JSON (export/import) and
//! TOML (built-in sources) through the same serde shape, with camelCase keys
//! on the wire (`displayName`, `menuVariant`, `componentOverrides`).

use crate::menu::MenuVariant;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fixed set of package categories used for indexing and UI grouping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum PackageCategory {
    #[default]
    Light,
    Dark,
    Colorful,
    Minimal,
    Professional,
}

impl PackageCategory {
    pub const ALL: [PackageCategory; 5] = [
        PackageCategory::Light,
        PackageCategory::Dark,
        PackageCategory::Colorful,
        PackageCategory::Minimal,
        PackageCategory::Professional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PackageCategory::Light => "light",
            PackageCategory::Dark => "dark",
            PackageCategory::Colorful => "colorful",
            PackageCategory::Minimal => "minimal",
            PackageCategory::Professional => "professional",
        }
    }
}

impl fmt::Display for PackageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive metadata attached to every package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMeta {
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub category: PackageCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_dark: bool,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// Text color roles, nested under `tokens.colors.text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextColors {
    pub primary: String,
    pub secondary: String,
    pub disabled: String,
    pub inverse: String,
}

/// Color palette of a package.
///
/// Every field holds a raw color string (`#rrggbb`, `rgb()`, `rgba()`,
/// `hsl()`, `hsla()`); syntax is enforced by the validator, not the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorTokens {
    // === Brand ===
    pub primary: String,
    pub secondary: String,

    // === Layout ===
    pub background: String,
    pub surface: String,
    pub border: String,

    // === Text ===
    pub text: TextColors,

    // === Semantic ===
    pub success: String,
    pub warning: String,
    pub error: String,
    pub info: String,
}

impl ColorTokens {
    /// All color fields as `(path, value)` pairs, in declaration order.
    ///
    /// The path is the dotted field path used in validation messages and
    /// flattened token sets (e.g. `colors.text.primary`).
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("colors.primary", self.primary.as_str()),
            ("colors.secondary", self.secondary.as_str()),
            ("colors.background", self.background.as_str()),
            ("colors.surface", self.surface.as_str()),
            ("colors.border", self.border.as_str()),
            ("colors.text.primary", self.text.primary.as_str()),
            ("colors.text.secondary", self.text.secondary.as_str()),
            ("colors.text.disabled", self.text.disabled.as_str()),
            ("colors.text.inverse", self.text.inverse.as_str()),
            ("colors.success", self.success.as_str()),
            ("colors.warning", self.warning.as_str()),
            ("colors.error", self.error.as_str()),
            ("colors.info", self.info.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyTokens {
    pub font_family: String,
    /// Named size steps, values like `"14px"` / `"1rem"`.
    pub sizes: BTreeMap<String, String>,
    /// Named weight steps, integer values in `[100, 900]`.
    pub weights: BTreeMap<String, u16>,
    /// Named line-height steps, unitless multipliers.
    pub line_heights: BTreeMap<String, f64>,
}

/// Structured design-token set of a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    pub colors: ColorTokens,
    pub typography: TypographyTokens,
    pub spacing: BTreeMap<String, String>,
    pub radius: BTreeMap<String, String>,
    pub shadows: BTreeMap<String, String>,
}

impl TokenSet {
    /// Flattens the token set into dotted-path/value pairs for a
    /// style-applier (`colors.primary -> #1890ff`,
    /// `typography.sizes.md -> 14px`, ...). Numeric tokens are rendered as
    /// plain decimal strings.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut flat = BTreeMap::new();
        for (path, value) in self.colors.entries() {
            flat.insert(path.to_string(), value.to_string());
        }
        flat.insert(
            "typography.font_family".to_string(),
            self.typography.font_family.clone(),
        );
        for (name, value) in &self.typography.sizes {
            flat.insert(format!("typography.sizes.{name}"), value.clone());
        }
        for (name, value) in &self.typography.weights {
            flat.insert(format!("typography.weights.{name}"), value.to_string());
        }
        for (name, value) in &self.typography.line_heights {
            flat.insert(format!("typography.line_heights.{name}"), value.to_string());
        }
        for (name, value) in &self.spacing {
            flat.insert(format!("spacing.{name}"), value.clone());
        }
        for (name, value) in &self.radius {
            flat.insert(format!("radius.{name}"), value.clone());
        }
        for (name, value) in &self.shadows {
            flat.insert(format!("shadows.{name}"), value.clone());
        }
        flat
    }
}

impl Default for TokenSet {
    /// Baseline token set used for user-authored drafts.
    fn default() -> Self {
        TokenSet {
            colors: ColorTokens {
                primary: "#1890ff".to_string(),
                secondary: "#722ed1".to_string(),
                background: "#f5f5f5".to_string(),
                surface: "#ffffff".to_string(),
                border: "#d9d9d9".to_string(),
                text: TextColors {
                    primary: "#262626".to_string(),
                    secondary: "#595959".to_string(),
                    disabled: "#bfbfbf".to_string(),
                    inverse: "#ffffff".to_string(),
                },
                success: "#52c41a".to_string(),
                warning: "#faad14".to_string(),
                error: "#ff4d4f".to_string(),
                info: "#13c2c2".to_string(),
            },
            typography: TypographyTokens {
                font_family:
                    "-apple-system, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif"
                        .to_string(),
                sizes: string_map(&[("sm", "12px"), ("md", "14px"), ("lg", "16px"), ("xl", "20px")]),
                weights: [
                    ("regular".to_string(), 400),
                    ("medium".to_string(), 500),
                    ("semibold".to_string(), 600),
                    ("bold".to_string(), 700),
                ]
                .into_iter()
                .collect(),
                line_heights: [
                    ("sm".to_string(), 1.66),
                    ("md".to_string(), 1.57),
                    ("lg".to_string(), 1.5),
                ]
                .into_iter()
                .collect(),
            },
            spacing: string_map(&[("xs", "8px"), ("sm", "12px"), ("md", "16px"), ("lg", "24px")]),
            radius: string_map(&[("xs", "2px"), ("sm", "4px"), ("md", "6px"), ("lg", "8px")]),
            shadows: string_map(&[
                ("sm", "0 1px 2px rgba(0, 0, 0, 0.08)"),
                ("md", "0 2px 8px rgba(0, 0, 0, 0.12)"),
                ("lg", "0 4px 16px rgba(0, 0, 0, 0.16)"),
            ]),
        }
    }
}

fn string_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A single override value inside `componentOverrides`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl OverrideValue {
    /// Renders the value as the string a style-applier would consume.
    pub fn render(&self) -> String {
        match self {
            OverrideValue::Text(s) => s.clone(),
            OverrideValue::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            OverrideValue::Flag(b) => b.to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OverrideValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for OverrideValue {
    fn from(value: &str) -> Self {
        OverrideValue::Text(value.to_string())
    }
}

impl From<f64> for OverrideValue {
    fn from(value: f64) -> Self {
        OverrideValue::Number(value)
    }
}

/// Partial token overrides keyed by component family
/// (`Button`, `Card`, `Menu`, `Table`, `Modal`, ...), then by token name.
pub type ComponentOverrides = BTreeMap<String, BTreeMap<String, OverrideValue>>;

/// A complete theme package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePackage {
    /// Unique id; immutable once the package enters the registry.
    pub id: String,
    pub meta: PackageMeta,
    pub tokens: TokenSet,
    #[serde(default)]
    pub menu_variant: MenuVariant,
    #[serde(default)]
    pub component_overrides: ComponentOverrides,
}

impl ThemePackage {
    /// Starts a draft package seeded with the baseline token set.
    pub fn builder(id: impl Into<String>) -> PackageBuilder {
        PackageBuilder::new(id)
    }

    /// Lightweight record for listing UIs.
    pub fn summary(&self) -> PackageSummary {
        PackageSummary {
            id: self.id.clone(),
            display_name: self.meta.display_name.clone(),
            category: self.meta.category,
            is_dark: self.meta.is_dark,
            tags: self.meta.tags.clone(),
        }
    }

    /// Flattened token set with the overrides of one component family
    /// applied on top (override wins per key).
    ///
    /// With `component = None` only the base tokens are returned.
    pub fn resolve(&self, component: Option<&str>) -> BTreeMap<String, String> {
        let mut flat = self.tokens.flatten();
        if let Some(family) = component {
            if let Some(overrides) = self.component_overrides.get(family) {
                for (name, value) in overrides {
                    flat.insert(name.clone(), value.render());
                }
            }
        }
        flat
    }

    /// Shared menu token set selected by this package's variant.
    pub fn menu_tokens(&self) -> &'static crate::menu::MenuTokens {
        self.menu_variant.tokens()
    }
}

/// Listing record derived from a package; carries no token data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub id: String,
    pub display_name: String,
    pub category: PackageCategory,
    pub is_dark: bool,
    pub tags: Vec<String>,
}

/// Builder for user-authored draft packages.
///
/// Drafts start from [`TokenSet::default`] and stay outside the registry
/// until they pass validation and are registered through the manager.
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    package: ThemePackage,
}

impl PackageBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        PackageBuilder {
            package: ThemePackage {
                meta: PackageMeta {
                    display_name: id.clone(),
                    description: String::new(),
                    category: PackageCategory::Light,
                    tags: Vec::new(),
                    is_dark: false,
                    version: default_version(),
                },
                id,
                tokens: TokenSet::default(),
                menu_variant: MenuVariant::Light,
                component_overrides: BTreeMap::new(),
            },
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.package.meta.display_name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.package.meta.description = description.into();
        self
    }

    pub fn category(mut self, category: PackageCategory) -> Self {
        self.package.meta.category = category;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.package.meta.tags.push(tag.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.package.meta.version = version.into();
        self
    }

    pub fn dark(mut self, is_dark: bool) -> Self {
        self.package.meta.is_dark = is_dark;
        self
    }

    pub fn menu_variant(mut self, variant: MenuVariant) -> Self {
        self.package.menu_variant = variant;
        self
    }

    /// Overwrites the whole token set of the draft.
    pub fn tokens(mut self, tokens: TokenSet) -> Self {
        self.package.tokens = tokens;
        self
    }

    /// Adds one override for a component family.
    pub fn component_override(
        mut self,
        component: impl Into<String>,
        token: impl Into<String>,
        value: impl Into<OverrideValue>,
    ) -> Self {
        self.package
            .component_overrides
            .entry(component.into())
            .or_default()
            .insert(token.into(), value.into());
        self
    }

    pub fn build(self) -> ThemePackage {
        self.package
    }
}

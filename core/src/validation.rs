//! Structural validation of candidate theme packages.
//!
//! Validation never mutates and never stops at the first defect: every color
//! field, scale entry and override is checked so authors get the full defect
//! list in one pass. The outcome is a [`ValidationReport`]. Errors block
//! registration, warnings never do (unless the manager promotes them under
//! strict mode).

use crate::types::{ThemePackage, TokenSet};
use serde::Serialize;
use std::fmt;

/// Generic validation trait for composable validators.
pub trait Validator<T: ?Sized> {
    type Error;

    /// Validates the input and returns an error if validation fails.
    fn validate(&self, input: &T) -> Result<(), Self::Error>;
}

/// Outcome of validating a candidate package.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// A package is valid iff there are no errors. Warnings do not count.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Moves every warning into the error list (strict mode).
    pub fn promote_warnings(mut self) -> Self {
        self.errors.append(&mut self.warnings);
        self
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        )?;
        if !self.errors.is_empty() {
            write!(f, ": {}", self.errors.join("; "))?;
        }
        Ok(())
    }
}

/// Validator for package ids.
///
/// Ids are used as registry keys and in generated class names, so the
/// charset is deliberately narrow.
pub struct PackageIdValidator;

impl Validator<str> for PackageIdValidator {
    type Error = String;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        if input.is_empty() {
            return Err("id cannot be empty".to_string());
        }
        if input.len() > 64 {
            return Err("id too long (max 64 characters)".to_string());
        }
        if !input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(
                "id contains invalid characters (only alphanumeric, hyphens, and underscores allowed)"
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// Validator for package version strings.
///
/// Versions are informational, so a malformed one is reported as a warning
/// by [`PackageValidator`], never as an error.
pub struct VersionValidator;

impl Validator<str> for VersionValidator {
    type Error = String;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        let parts: Vec<&str> = input.split('.').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.parse::<u32>().is_err()) {
            return Err(format!("version '{input}' is not in x.y.z form"));
        }
        Ok(())
    }
}

/// Checks whether a value is a syntactically valid color.
///
/// Accepted syntaxes: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`,
/// `hsl()`, `hsla()`.
pub fn is_valid_color(value: &str) -> bool {
    let v = value.trim();
    if let Some(hex) = v.strip_prefix('#') {
        return matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }

    let lower = v.to_ascii_lowercase();
    for prefix in ["rgba(", "rgb(", "hsla(", "hsl("] {
        if let Some(rest) = lower.strip_prefix(prefix) {
            if let Some(args) = rest.strip_suffix(')') {
                return !args.trim().is_empty()
                    && args
                        .chars()
                        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | ',' | '.' | '%' | '/' | '-'));
            }
        }
    }
    false
}

/// Outcome of checking one dimension-scale entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleValueCheck {
    /// Numeric with a recognized unit.
    Ok,
    /// Numeric but unit-less; a resolver can default the unit.
    MissingUnit,
    /// Not numeric at all.
    Invalid,
}

/// Checks a size/spacing/radius entry: a number followed by `px`, `rem`
/// or `em`.
pub fn check_scale_value(value: &str) -> ScaleValueCheck {
    let v = value.trim();
    // "rem" must be tried before "em"
    for unit in ["px", "rem", "em"] {
        if let Some(number) = v.strip_suffix(unit) {
            return if number.trim().parse::<f64>().is_ok() {
                ScaleValueCheck::Ok
            } else {
                ScaleValueCheck::Invalid
            };
        }
    }
    if v.parse::<f64>().is_ok() {
        ScaleValueCheck::MissingUnit
    } else {
        ScaleValueCheck::Invalid
    }
}

/// Validator for complete theme packages.
pub struct PackageValidator;

impl PackageValidator {
    pub fn new() -> Self {
        PackageValidator
    }

    /// Validates every aspect of a candidate and collects the findings.
    pub fn validate(&self, package: &ThemePackage) -> ValidationReport {
        let mut report = ValidationReport::default();

        if let Err(reason) = PackageIdValidator.validate(package.id.as_str()) {
            report.error(format!("id: {reason}"));
        }

        self.validate_meta(package, &mut report);
        self.validate_tokens(&package.tokens, &mut report);
        self.validate_overrides(package, &mut report);

        report
    }

    fn validate_meta(&self, package: &ThemePackage, report: &mut ValidationReport) {
        let meta = &package.meta;
        if meta.display_name.trim().is_empty() {
            report.error("meta.displayName cannot be empty");
        }
        if meta.description.trim().is_empty() {
            report.warning("meta.description is empty");
        }
        for (index, tag) in meta.tags.iter().enumerate() {
            if tag.trim().is_empty() {
                report.error(format!("meta.tags[{index}] is empty"));
            }
        }
        if let Err(reason) = VersionValidator.validate(meta.version.as_str()) {
            report.warning(format!("meta.version: {reason}"));
        }
    }

    fn validate_tokens(&self, tokens: &TokenSet, report: &mut ValidationReport) {
        // Exhaustive over all color fields; every bad value gets its own
        // entry.
        for (path, value) in tokens.colors.entries() {
            if !is_valid_color(value) {
                report.error(format!("{path}: '{value}' is not a valid color"));
            }
        }

        if tokens.typography.font_family.trim().is_empty() {
            report.error("typography.fontFamily cannot be empty");
        }

        self.validate_scale("typography.sizes", &tokens.typography.sizes, report);
        self.validate_scale("spacing", &tokens.spacing, report);
        self.validate_scale("radius", &tokens.radius, report);

        for (name, weight) in &tokens.typography.weights {
            if !(100..=900).contains(weight) {
                report.error(format!(
                    "typography.weights.{name}: {weight} is out of range [100, 900]"
                ));
            }
        }

        for (name, height) in &tokens.typography.line_heights {
            if height.is_nan() || *height <= 0.0 {
                report.error(format!(
                    "typography.lineHeights.{name}: {height} must be a positive number"
                ));
            }
        }

        for (name, value) in &tokens.shadows {
            if value.trim().is_empty() {
                report.error(format!("shadows.{name}: value is empty"));
            } else if !value.trim().contains(char::is_whitespace) {
                // Single-length shadow; composite shadow strings are
                // accepted as-is.
                match check_scale_value(value) {
                    ScaleValueCheck::Ok => {}
                    ScaleValueCheck::MissingUnit => {
                        report.warning(format!("shadows.{name}: '{value}' has no unit"));
                    }
                    ScaleValueCheck::Invalid => {
                        report.error(format!("shadows.{name}: '{value}' is not a valid value"));
                    }
                }
            }
        }
    }

    fn validate_scale(
        &self,
        group: &str,
        scale: &std::collections::BTreeMap<String, String>,
        report: &mut ValidationReport,
    ) {
        for (name, value) in scale {
            match check_scale_value(value) {
                ScaleValueCheck::Ok => {}
                ScaleValueCheck::MissingUnit => {
                    report.warning(format!(
                        "{group}.{name}: '{value}' has no unit (expected px, rem or em)"
                    ));
                }
                ScaleValueCheck::Invalid => {
                    report.error(format!("{group}.{name}: '{value}' is not a valid dimension"));
                }
            }
        }
    }

    fn validate_overrides(&self, package: &ThemePackage, report: &mut ValidationReport) {
        for (family, overrides) in &package.component_overrides {
            if family.trim().is_empty() {
                report.error("componentOverrides contains an empty component name");
            }
            for (token, value) in overrides {
                if token.trim().is_empty() {
                    report.error(format!(
                        "componentOverrides.{family} contains an empty token name"
                    ));
                }
                if let Some(text) = value.as_text() {
                    if text.trim().is_empty() {
                        report.warning(format!(
                            "componentOverrides.{family}.{token}: value is empty"
                        ));
                    }
                }
            }
        }
    }
}

impl Default for PackageValidator {
    fn default() -> Self {
        Self::new()
    }
}

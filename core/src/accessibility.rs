//! WCAG contrast validation for theme packages.
//!
//! Pure and advisory: nothing here mutates a package. The checker computes
//! contrast ratios for the text/background token pairs relevant to body and
//! menu content and reports AA/AAA outcomes per pair, leaving it to the
//! caller which bar to enforce. [`suggest_adjustments`] proposes replacement
//! values for failing pairs without applying them.

use crate::types::ThemePackage;
use serde::Serialize;

/// Minimum contrast ratio for AA conformance, normal-size text.
pub const AA_NORMAL: f64 = 4.5;
/// Minimum contrast ratio for AA conformance, large text.
pub const AA_LARGE: f64 = 3.0;
/// Minimum contrast ratio for AAA conformance, normal-size text.
pub const AAA_NORMAL: f64 = 7.0;
/// Minimum contrast ratio for AAA conformance, large text.
pub const AAA_LARGE: f64 = 4.5;

/// One evaluated foreground/background pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastPair {
    pub label: String,
    pub foreground: String,
    pub background: String,
    pub ratio: f64,
    pub large_text: bool,
    pub passes_aa: bool,
    pub passes_aaa: bool,
}

/// Outcome of checking a whole package.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityReport {
    pub pairs: Vec<ContrastPair>,
    /// True when every evaluated pair passes AA at its size class.
    pub overall_pass: bool,
    /// Labels of pairs that could not be evaluated (unparseable colors,
    /// e.g. `transparent`).
    pub skipped: Vec<String>,
}

/// A proposed token change for a failing pair. Advisory only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAdjustment {
    pub token_path: String,
    pub current: String,
    pub suggested: String,
    pub reason: String,
}

fn srgb_to_linear(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG relative luminance of a color, 0.0 (black) to 1.0 (white).
///
/// Returns `None` when the color cannot be parsed.
pub fn relative_luminance(color: &str) -> Option<f64> {
    let (r, g, b) = parse_color(color)?;
    Some(0.2126 * srgb_to_linear(r) + 0.7152 * srgb_to_linear(g) + 0.0722 * srgb_to_linear(b))
}

/// WCAG contrast ratio between two colors, 1.0 to 21.0.
pub fn contrast_ratio(foreground: &str, background: &str) -> Option<f64> {
    let fg = relative_luminance(foreground)?;
    let bg = relative_luminance(background)?;
    let (lighter, darker) = if fg >= bg { (fg, bg) } else { (bg, fg) };
    Some((lighter + 0.05) / (darker + 0.05))
}

/// Black or white, whichever contrasts better with the given background.
pub fn optimal_text_color(background: &str) -> Option<&'static str> {
    let luminance = relative_luminance(background)?;
    Some(if luminance > 0.5 { "#000000" } else { "#ffffff" })
}

/// Evaluates the declared body/menu pairs of a package.
pub fn check_package(package: &ThemePackage) -> AccessibilityReport {
    let mut report = AccessibilityReport {
        overall_pass: true,
        ..Default::default()
    };

    for (label, foreground, background, large_text) in declared_pairs(package) {
        match contrast_ratio(&foreground, &background) {
            Some(ratio) => {
                let (aa, aaa) = if large_text {
                    (AA_LARGE, AAA_LARGE)
                } else {
                    (AA_NORMAL, AAA_NORMAL)
                };
                let passes_aa = ratio >= aa;
                if !passes_aa {
                    report.overall_pass = false;
                }
                report.pairs.push(ContrastPair {
                    label,
                    foreground,
                    background,
                    ratio,
                    large_text,
                    passes_aa,
                    passes_aaa: ratio >= aaa,
                });
            }
            None => report.skipped.push(label),
        }
    }

    report
}

/// Proposes replacement text colors for every failing normal-text pair
/// whose foreground is a package-owned token. Menu pairs resolve through
/// shared variant tokens and are reported but never adjusted here.
pub fn suggest_adjustments(package: &ThemePackage) -> Vec<TokenAdjustment> {
    let report = check_package(package);
    let mut adjustments: Vec<TokenAdjustment> = Vec::new();

    for pair in report.pairs.iter().filter(|p| !p.passes_aa) {
        let token_path = match pair.label.as_str() {
            "body text on background" | "heading text on background" => "colors.text.primary",
            "body text on surface" => "colors.text.primary",
            "secondary text on surface" => "colors.text.secondary",
            "inverse text on primary" => "colors.text.inverse",
            _ => continue,
        };
        if adjustments.iter().any(|a| a.token_path == token_path) {
            continue;
        }
        if let Some(suggested) = optimal_text_color(&pair.background) {
            if suggested != pair.foreground {
                adjustments.push(TokenAdjustment {
                    token_path: token_path.to_string(),
                    current: pair.foreground.clone(),
                    suggested: suggested.to_string(),
                    reason: format!(
                        "'{}' on '{}' has contrast ratio {:.2}, below the AA minimum",
                        pair.foreground, pair.background, pair.ratio
                    ),
                });
            }
        }
    }

    adjustments
}

fn declared_pairs(package: &ThemePackage) -> Vec<(String, String, String, bool)> {
    let colors = &package.tokens.colors;
    let menu = package.menu_tokens();
    vec![
        (
            "body text on background".to_string(),
            colors.text.primary.clone(),
            colors.background.clone(),
            false,
        ),
        (
            "body text on surface".to_string(),
            colors.text.primary.clone(),
            colors.surface.clone(),
            false,
        ),
        (
            "secondary text on surface".to_string(),
            colors.text.secondary.clone(),
            colors.surface.clone(),
            false,
        ),
        (
            // Button labels render at medium weight; evaluated as large text
            "inverse text on primary".to_string(),
            colors.text.inverse.clone(),
            colors.primary.clone(),
            true,
        ),
        (
            "heading text on background".to_string(),
            colors.text.primary.clone(),
            colors.background.clone(),
            true,
        ),
        (
            "menu item on sider".to_string(),
            menu.item_color.to_string(),
            menu.sider_bg.to_string(),
            false,
        ),
        (
            "selected menu item".to_string(),
            menu.item_selected_color.to_string(),
            menu.item_selected_bg.to_string(),
            false,
        ),
    ]
}

/// Parses a color into RGB. Alpha components are ignored; contrast math
/// assumes fully opaque rendering.
fn parse_color(value: &str) -> Option<(u8, u8, u8)> {
    let v = value.trim();
    if let Some(hex) = v.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = v.to_ascii_lowercase();
    for prefix in ["rgba(", "rgb("] {
        if let Some(rest) = lower.strip_prefix(prefix) {
            let args = parse_args(rest.strip_suffix(')')?)?;
            if args.len() < 3 {
                return None;
            }
            return Some((
                channel_from_arg(args[0])?,
                channel_from_arg(args[1])?,
                channel_from_arg(args[2])?,
            ));
        }
    }
    for prefix in ["hsla(", "hsl("] {
        if let Some(rest) = lower.strip_prefix(prefix) {
            let args = parse_args(rest.strip_suffix(')')?)?;
            if args.len() < 3 {
                return None;
            }
            return Some(hsl_to_rgb(args[0], args[1] / 100.0, args[2] / 100.0));
        }
    }
    None
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let expanded: String;
    let hex = match hex.len() {
        3 => {
            expanded = hex.chars().flat_map(|c| [c, c]).collect();
            expanded.as_str()
        }
        // 8 digits carries alpha in the last byte pair
        6 | 8 => hex,
        _ => return None,
    };
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Splits `24, 144, 255` / `24 144 255 / 0.5` style argument lists into
/// numbers; `%` suffixes are kept as plain numbers (0-100).
fn parse_args(args: &str) -> Option<Vec<f64>> {
    let mut values = Vec::new();
    for part in args.split(['/', ',', ' ']).filter(|p| !p.trim().is_empty()) {
        values.push(part.trim().trim_end_matches('%').parse::<f64>().ok()?);
    }
    Some(values)
}

fn channel_from_arg(value: f64) -> Option<u8> {
    if !(0.0..=255.0).contains(&value) {
        return None;
    }
    Some(value.round() as u8)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp.floor() as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    (
        ((r1 + m) * 255.0).round() as u8,
        ((g1 + m) * 255.0).round() as u8,
        ((b1 + m) * 255.0).round() as u8,
    )
}

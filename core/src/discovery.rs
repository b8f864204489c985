//! Compile-time discovery of the built-in theme packages.
//!
//! The TOML sources under `themes/` are embedded with `include_str!`, so a
//! missing or renamed file fails the build instead of surfacing at runtime.
//! Parsing still happens lazily because a source that no longer matches the
//! package schema must degrade to a logged error, not a panic.

use serde::Serialize;

use crate::error::PackageResult;
use crate::types::ThemePackage;

/// Embedded package sources in declaration order.
///
/// Order is part of the contract: `light` comes first so that discovery,
/// auto-load and the default fallback all agree on the same package.
pub const BUILT_IN_SOURCES: [(&str, &str); 3] = [
    ("light", include_str!("../themes/light.toml")),
    ("dark", include_str!("../themes/dark.toml")),
    ("high-contrast", include_str!("../themes/high-contrast.toml")),
];

/// Outcome of one discovery pass over the embedded sources.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryReport {
    /// Ids of every embedded source, parseable or not.
    pub available: Vec<String>,
    /// How many sources parsed into packages.
    pub parsed: usize,
    /// Ids of sources that failed to parse.
    pub failed: Vec<String>,
}

/// Ids of the embedded sources in declaration order.
pub fn builtin_ids() -> Vec<&'static str> {
    BUILT_IN_SOURCES.iter().map(|(id, _)| *id).collect()
}

/// Raw TOML for a built-in package, if one is registered under `id`.
pub fn builtin_source(id: &str) -> Option<&'static str> {
    BUILT_IN_SOURCES
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, source)| *source)
}

/// Parses the built-in package registered under `id`.
///
/// Returns `None` when no source carries that id, `Some(Err(..))` when the
/// source exists but does not deserialize.
pub fn parse_builtin(id: &str) -> Option<PackageResult<ThemePackage>> {
    builtin_source(id).map(|source| parse_source(id, source))
}

/// Parses every embedded source, skipping the ones that fail.
///
/// The returned packages follow [`BUILT_IN_SOURCES`] declaration order, which
/// keeps repeated discovery runs deterministic.
pub fn discover() -> Vec<ThemePackage> {
    let mut packages = Vec::with_capacity(BUILT_IN_SOURCES.len());
    for (id, source) in BUILT_IN_SOURCES {
        match parse_source(id, source) {
            Ok(package) => packages.push(package),
            Err(e) => log::error!("Skipping built-in package '{id}': {e}"),
        }
    }
    packages
}

/// Counts how the embedded sources fare without keeping the packages.
pub fn report() -> DiscoveryReport {
    let mut parsed = 0;
    let mut failed = Vec::new();
    for (id, source) in BUILT_IN_SOURCES {
        match parse_source(id, source) {
            Ok(_) => parsed += 1,
            Err(_) => failed.push(id.to_string()),
        }
    }
    DiscoveryReport {
        available: builtin_ids().iter().map(|id| id.to_string()).collect(),
        parsed,
        failed,
    }
}

fn parse_source(id: &str, source: &str) -> PackageResult<ThemePackage> {
    let mut package: ThemePackage = toml::from_str(source)?;
    if package.id != id {
        // The table key wins over whatever the source declares.
        log::warn!(
            "Built-in source '{id}' declares id '{declared}', normalizing",
            declared = package.id
        );
        package.id = id.to_string();
    }
    Ok(package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuVariant;
    use crate::types::OverrideValue;
    use crate::validation::PackageValidator;

    #[test]
    fn test_every_builtin_parses_and_validates_cleanly() {
        let validator = PackageValidator::new();
        for (id, _) in BUILT_IN_SOURCES {
            let package = parse_builtin(id)
                .unwrap_or_else(|| panic!("no source for '{id}'"))
                .unwrap_or_else(|e| panic!("source '{id}' failed to parse: {e}"));
            let report = validator.validate(&package);
            assert!(report.is_clean(), "'{id}' not clean: {report}");
        }
    }

    #[test]
    fn test_discover_preserves_declaration_order() {
        let ids: Vec<String> = discover().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["light", "dark", "high-contrast"]);
        // Deterministic across runs.
        let again: Vec<String> = discover().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, again);
    }

    #[test]
    fn test_builtin_source_lookup() {
        assert!(builtin_source("dark").is_some());
        assert!(builtin_source("sepia").is_none());
        assert!(parse_builtin("sepia").is_none());
    }

    #[test]
    fn test_report_counts_all_sources() {
        let report = report();
        assert_eq!(report.available, vec!["light", "dark", "high-contrast"]);
        assert_eq!(report.parsed, 3);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_builtin_menu_variants() {
        let packages = discover();
        assert_eq!(packages[0].menu_variant, MenuVariant::Light);
        assert_eq!(packages[1].menu_variant, MenuVariant::Dark);
        // High contrast pairs a light canvas with the dark sider.
        assert_eq!(packages[2].menu_variant, MenuVariant::Dark);
        assert!(!packages[2].meta.is_dark);
    }

    #[test]
    fn test_high_contrast_numeric_override() {
        let package = parse_builtin("high-contrast").unwrap().unwrap();
        let radius = package
            .component_overrides
            .get("Button")
            .and_then(|c| c.get("borderRadius"))
            .cloned();
        assert_eq!(radius, Some(OverrideValue::Number(0.0)));
    }
}

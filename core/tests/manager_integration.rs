use claims::*;
use std::sync::{Arc, Mutex};

use themepack::error::ThemePackageError;
use themepack::events::PackageEventKind;
use themepack::manager::ThemePackageManager;
use themepack::options::ThemeOptions;
use themepack::types::{PackageCategory, ThemePackage};

// Helper module for manager testing
mod manager_helpers {
    use super::*;

    /// Manager with auto-load disabled so tests control every registration
    pub fn fresh_manager() -> ThemePackageManager {
        ThemePackageManager::new(ThemeOptions {
            auto_load: Some(false),
            ..ThemeOptions::default()
        })
    }

    /// Manager in strict mode (warnings are errors, no fallback serving)
    pub fn strict_manager() -> ThemePackageManager {
        ThemePackageManager::new(ThemeOptions {
            auto_load: Some(false),
            strict_mode: Some(true),
            ..ThemeOptions::default()
        })
    }

    /// Minimal valid package on top of the baseline token set
    pub fn create_package(id: &str) -> ThemePackage {
        ThemePackage::builder(id)
            .display_name(format!("Package {id}"))
            .description(format!("Integration fixture for {id}"))
            .build()
    }

    /// Package whose primary color cannot pass validation
    pub fn create_invalid_package(id: &str) -> ThemePackage {
        let mut package = create_package(id);
        package.tokens.colors.primary = "not-a-color".to_string();
        package
    }
}

use manager_helpers::*;

// Integration tests for registration and the validation gate
mod registration_scenarios {
    use super::*;

    #[test]
    fn test_register_then_get_then_stats() {
        let mut manager = fresh_manager();
        let mut package = create_package("light");
        package.meta.category = PackageCategory::Light;
        assert_eq!(package.tokens.colors.primary, "#1890ff");

        let report = assert_ok!(manager.register_package(package));
        assert!(report.valid());

        let fetched = assert_some!(manager.get_package("light"));
        assert_eq!(fetched.id, "light");

        let stats = manager.get_stats();
        assert_eq!(stats.total_registered, 1);
        assert_eq!(stats.by_category.get(&PackageCategory::Light), Some(&1));
    }

    #[test]
    fn test_invalid_primary_color_is_rejected_with_field_reference() {
        let mut manager = fresh_manager();
        let err = assert_err!(manager.register_package(create_invalid_package("x")));

        let report = err.report().expect("validation error carries the report");
        let about_primary: Vec<&String> = report
            .errors
            .iter()
            .filter(|e| e.contains("colors.primary"))
            .collect();
        assert_eq!(about_primary.len(), 1);

        // Nothing was committed.
        assert_none!(manager.get_package("x"));
        assert_eq!(manager.get_stats().total_registered, 0);
    }

    #[test]
    fn test_register_is_all_or_nothing() {
        let mut manager = fresh_manager();
        manager.register_package(create_package("keeper")).unwrap();

        assert_err!(manager.register_package(create_invalid_package("keeper")));
        // The earlier registration survives a failed attempt on the same id.
        let kept = assert_some!(manager.get_package("keeper"));
        assert_eq!(kept.tokens.colors.primary, "#1890ff");
    }

    #[test]
    fn test_strict_mode_promotes_warnings_to_rejection() {
        let mut strict = strict_manager();
        let mut package = create_package("drafty");
        package.meta.description = String::new(); // warning in lax mode

        let err = assert_err!(strict.register_package(package.clone()));
        assert_matches!(err, ThemePackageError::Validation { .. });

        let mut lax = fresh_manager();
        let report = assert_ok!(lax.register_package(package));
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_registering_over_a_cached_builtin_takes_effect() {
        let mut manager = fresh_manager();
        // A bare load caches the compiled-in definition without registering it.
        assert_ok!(manager.load_package("dark"));
        assert_eq!(manager.get_stats().total_registered, 0);

        assert_ok!(manager.register_package(create_package("dark")));
        let served = assert_some!(manager.get_package("dark"));
        assert_eq!(served.meta.display_name, "Package dark");
    }
}

// Integration tests for clone and merge
mod composition_scenarios {
    use super::*;

    #[test]
    fn test_clone_survives_source_unregistration() {
        let mut manager = fresh_manager();
        manager.register_package(create_package("light")).unwrap();

        let copy = assert_ok!(manager.clone_package("light", "light-2"));
        assert_eq!(copy.meta.display_name, "Package light (Copy)");

        manager.unregister_package("light").unwrap();
        let survivor = assert_some!(manager.get_package("light-2"));
        assert_eq!(survivor.tokens.colors.primary, "#1890ff");
    }

    #[test]
    fn test_merge_override_wins_per_key() {
        let mut manager = fresh_manager();
        let base = create_package("lite");
        let mut overlay = create_package("darkish");
        overlay.tokens.colors.primary = "#003a8c".to_string();
        manager.register_package(base).unwrap();
        manager.register_package(overlay).unwrap();

        let mixed = assert_ok!(manager.merge_packages("lite", "darkish", "mixed"));
        assert_eq!(mixed.tokens.colors.primary, "#003a8c");
        // Non-overridden fields keep the base values.
        assert_eq!(mixed.tokens.colors.background, "#f5f5f5");
        assert_eq!(mixed.tokens.colors.text.primary, "#262626");
        assert_eq!(mixed.meta.display_name, "Package lite + Package darkish");

        // The merge is registered and independently addressable.
        assert_some!(manager.get_package("mixed"));
    }

    #[test]
    fn test_merge_unions_map_valued_groups() {
        let mut manager = fresh_manager();
        let mut base = create_package("base");
        base.tokens
            .spacing
            .insert("xxl".to_string(), "48px".to_string());
        let mut overlay = create_package("overlay");
        overlay
            .tokens
            .spacing
            .insert("md".to_string(), "20px".to_string());
        manager.register_package(base).unwrap();
        manager.register_package(overlay).unwrap();

        let merged = assert_ok!(manager.merge_packages("base", "overlay", "spaced"));
        // Base-only keys survive, shared keys take the overlay value.
        assert_eq!(merged.tokens.spacing.get("xxl"), Some(&"48px".to_string()));
        assert_eq!(merged.tokens.spacing.get("md"), Some(&"20px".to_string()));
    }

    #[test]
    fn test_merge_fails_atomically_when_a_source_is_missing() {
        let mut manager = fresh_manager();
        manager.register_package(create_package("base")).unwrap();

        let err = assert_err!(manager.merge_packages("base", "ghost", "mixed"));
        assert_matches!(err, ThemePackageError::NotFound { id } if id == "ghost");
        assert_none!(manager.get_package("mixed"));
    }

    #[test]
    fn test_clone_requires_a_registered_source() {
        let mut manager = fresh_manager();
        let err = assert_err!(manager.clone_package("ghost", "ghost-2"));
        assert_matches!(err, ThemePackageError::NotFound { .. });
    }
}

// Integration tests for loading, fallback and batches
mod loading_and_fallback {
    use super::*;

    #[test]
    fn test_unknown_id_serves_the_fallback_package() {
        let mut manager = ThemePackageManager::new(ThemeOptions::default());
        let served = assert_ok!(manager.load_package("does-not-exist"));
        assert_eq!(served.id, "light");
    }

    #[test]
    fn test_strict_mode_surfaces_not_found_instead_of_fallback() {
        let mut manager = strict_manager();
        let err = assert_err!(manager.load_package("does-not-exist"));
        assert_matches!(err, ThemePackageError::NotFound { .. });
    }

    #[test]
    fn test_load_all_packages_is_repeatable() {
        let mut manager = fresh_manager();

        let first = manager.load_all_packages();
        assert!(first.is_complete_success());
        assert_eq!(first.loaded, vec!["light", "dark", "high-contrast"]);
        assert_eq!(manager.get_stats().total_registered, 3);

        // A second pass replaces the earlier registrations in place.
        let second = manager.load_all_packages();
        assert!(second.is_complete_success());
        assert_eq!(manager.get_stats().total_registered, 3);
    }

    #[test]
    fn test_auto_load_refresh_drops_the_stale_cache_entry() {
        let mut manager = fresh_manager();
        manager.register_package(create_package("light")).unwrap();
        assert_eq!(
            manager.load_package("light").unwrap().meta.display_name,
            "Package light"
        );

        // Discovery replaces the custom definition; reads must follow the
        // registry, not the entry cached before the refresh.
        let result = manager.load_all_packages();
        assert!(result.is_complete_success());
        assert!(result.loaded.contains(&"light".to_string()));

        let served = assert_some!(manager.get_package("light"));
        assert_eq!(served.meta.display_name, "Light");
    }

    #[test]
    fn test_preload_collects_failures_without_aborting() {
        let mut manager = fresh_manager();
        let ids = vec![
            "light".to_string(),
            "ghost".to_string(),
            "dark".to_string(),
        ];

        let result = manager.preload_packages(&ids);
        assert_eq!(result.total_requested, 3);
        assert_eq!(result.loaded, vec!["light", "dark"]);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].0, "ghost");
        assert!(!result.is_complete_success());
    }

    #[test]
    fn test_reload_picks_up_a_replaced_definition() {
        let mut manager = fresh_manager();
        manager.register_package(create_package("mine")).unwrap();
        manager.load_package("mine").unwrap();

        // "Update" is unregister + re-register under the same id; reload
        // forces a validated fetch of the new definition.
        manager.unregister_package("mine").unwrap();
        let mut updated = create_package("mine");
        updated.meta.display_name = "Fresh Name".to_string();
        manager.register_package(updated).unwrap();

        let reloaded = assert_ok!(manager.reload_package("mine"));
        assert_eq!(reloaded.meta.display_name, "Fresh Name");
        assert_eq!(
            manager.get_package("mine").unwrap().meta.display_name,
            "Fresh Name"
        );
    }

    #[test]
    fn test_reload_all_clears_and_rewarms_the_cache() {
        let mut manager = fresh_manager();
        manager.register_package(create_package("one")).unwrap();
        manager.register_package(create_package("two")).unwrap();

        let result = manager.reload_all_packages();
        assert!(result.is_complete_success());
        assert_eq!(result.total_requested, 2);
        assert_eq!(manager.cache_status().size, 2);
    }
}

// Integration tests for the event surface
mod events_flow {
    use super::*;

    #[test]
    fn test_lifecycle_events_arrive_in_order() {
        let mut manager = fresh_manager();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        manager.subscribe(move |event| {
            if event.id == "mine" {
                sink.lock().unwrap().push(event.kind);
            }
        });

        manager.register_package(create_package("mine")).unwrap();
        manager.load_package("mine").unwrap();
        manager.set_theme("mine").unwrap();
        manager.unregister_package("mine").unwrap();

        let kinds = seen.lock().unwrap().clone();
        assert_eq!(
            kinds,
            vec![
                PackageEventKind::PackageValidated,
                PackageEventKind::PackageRegistered,
                PackageEventKind::PackageLoaded,
                PackageEventKind::PackageUpdated,
                PackageEventKind::PackageUnregistered,
            ]
        );
    }

    #[test]
    fn test_failed_strict_load_emits_an_error_event() {
        let mut manager = strict_manager();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        manager.subscribe(move |event| {
            sink.lock().unwrap().push((event.kind, event.id.clone()));
        });

        let _ = manager.load_package("ghost");

        let events = seen.lock().unwrap().clone();
        assert!(events.contains(&(PackageEventKind::Error, "ghost".to_string())));
    }
}

// Integration tests for the active theme selection
mod active_theme {
    use super::*;

    #[test]
    fn test_set_theme_makes_the_package_current() {
        let mut manager = fresh_manager();
        manager.register_package(create_package("mine")).unwrap();

        let active = assert_ok!(manager.set_theme("mine"));
        assert_eq!(active.id, "mine");
        assert_eq!(manager.current_theme_id(), Some("mine"));

        let current = assert_some!(manager.current_theme());
        assert_eq!(current.meta.display_name, "Package mine");
    }

    #[test]
    fn test_unregistering_the_active_theme_clears_the_selection() {
        let mut manager = fresh_manager();
        manager.register_package(create_package("mine")).unwrap();
        manager.set_theme("mine").unwrap();

        manager.unregister_package("mine").unwrap();
        assert_eq!(manager.current_theme_id(), None);
        assert_none!(manager.current_theme());
    }
}

// Integration tests for the accessibility surface
mod accessibility_checks {
    use super::*;

    #[test]
    fn test_low_contrast_body_pair_fails_aa() {
        let mut manager = fresh_manager();
        let mut gray = create_package("gray");
        gray.tokens.colors.text.primary = "#777777".to_string();
        gray.tokens.colors.background = "#888888".to_string();
        manager.register_package(gray).unwrap();

        let report = assert_some!(manager.check_accessibility("gray"));
        let body = report
            .pairs
            .iter()
            .find(|pair| pair.label == "body text on background")
            .expect("body pair is always declared");
        assert!(!body.passes_aa);
        assert!(body.ratio < 4.5);
        assert!(!report.overall_pass);
    }

    #[test]
    fn test_adjustments_point_at_the_failing_token() {
        let mut manager = fresh_manager();
        let mut gray = create_package("gray");
        gray.tokens.colors.text.primary = "#777777".to_string();
        gray.tokens.colors.background = "#888888".to_string();
        manager.register_package(gray).unwrap();

        let adjustments = assert_some!(manager.suggest_accessibility_adjustments("gray"));
        assert!(adjustments
            .iter()
            .any(|a| a.token_path == "colors.text.primary"));
    }

    #[test]
    fn test_check_on_unregistered_id_returns_none() {
        let manager = fresh_manager();
        assert_none!(manager.check_accessibility("ghost"));
    }
}

// Integration tests for stats, search and discovery
mod stats_and_search {
    use super::*;

    #[test]
    fn test_stats_aggregate_categories_and_tags() {
        let mut manager = fresh_manager();
        let mut one = create_package("one");
        one.meta.category = PackageCategory::Dark;
        one.meta.tags = vec!["night".to_string()];
        let mut two = create_package("two");
        two.meta.tags = vec!["night".to_string(), "blue".to_string()];
        manager.register_package(one).unwrap();
        manager.register_package(two).unwrap();
        manager.load_package("one").unwrap();

        let stats = manager.get_stats();
        assert_eq!(stats.total_registered, 2);
        assert_eq!(stats.total_cached, 1);
        assert_eq!(stats.by_category.get(&PackageCategory::Dark), Some(&1));
        assert_eq!(stats.by_tag.get("night"), Some(&2));
        assert_eq!(stats.by_tag.get("blue"), Some(&1));
    }

    #[test]
    fn test_search_and_listing_delegate_to_the_registry() {
        let mut manager = fresh_manager();
        manager.register_package(create_package("ocean")).unwrap();
        manager.register_package(create_package("forest")).unwrap();

        assert_eq!(manager.search_packages("ocean").len(), 1);
        assert_eq!(manager.get_all_packages().len(), 2);
        assert_eq!(manager.package_summaries().len(), 2);
        assert_eq!(
            manager.get_packages_by_category(PackageCategory::Light).len(),
            2
        );
    }

    #[test]
    fn test_discovery_report_names_every_builtin() {
        let manager = fresh_manager();
        let report = manager.discovery_report();
        assert_eq!(report.available, vec!["light", "dark", "high-contrast"]);
        assert_eq!(report.parsed, 3);
        assert!(report.failed.is_empty());
    }
}

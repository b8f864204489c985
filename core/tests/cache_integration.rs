use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::Duration;

use themepack::cache::PackageCache;
use themepack::events::PackageEventKind;
use themepack::manager::ThemePackageManager;
use themepack::options::ThemeOptions;
use themepack::types::ThemePackage;

// Helper module for cache testing
mod cache_helpers {
    use super::*;

    /// Create a package to stuff into the cache
    pub fn create_cached_package(id: &str) -> ThemePackage {
        ThemePackage::builder(id)
            .display_name(format!("Cached {id}"))
            .description("Cache fixture")
            .build()
    }

    /// Manager that skips auto-load so tests control the cache exactly
    pub fn manager_without_autoload() -> ThemePackageManager {
        ThemePackageManager::new(ThemeOptions {
            auto_load: Some(false),
            ..ThemeOptions::default()
        })
    }
}

use cache_helpers::*;

// Integration tests for basic cache behaviour
mod cache_basic_functionality {
    use super::*;

    #[test]
    fn test_set_then_get_returns_the_package() {
        let mut cache = PackageCache::new(Duration::from_secs(60));
        let package = create_cached_package("ocean");
        cache.set("ocean", package.clone(), None);

        assert_eq!(cache.get("ocean"), Some(package));
        assert_eq!(cache.get("unknown"), None);
    }

    #[test]
    fn test_invalidate_reports_whether_an_entry_existed() {
        let mut cache = PackageCache::new(Duration::from_secs(60));
        cache.set("ocean", create_cached_package("ocean"), None);

        assert!(cache.invalidate("ocean"));
        assert!(!cache.invalidate("ocean"));
        assert_eq!(cache.get("ocean"), None);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut cache = PackageCache::new(Duration::from_secs(60));
        cache.set("one", create_cached_package("one"), None);
        cache.set("two", create_cached_package("two"), None);

        cache.clear();
        assert_eq!(cache.status().size, 0);
        assert_eq!(cache.get("one"), None);
    }

    #[test]
    fn test_status_lists_entries_sorted_by_id() {
        let mut cache = PackageCache::new(Duration::from_secs(60));
        cache.set("zeta", create_cached_package("zeta"), None);
        cache.set("alpha", create_cached_package("alpha"), None);
        cache.set("mid", create_cached_package("mid"), Some(Duration::from_secs(5)));

        let status = cache.status();
        assert_eq!(status.size, 3);
        let ids: Vec<&str> = status.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);

        // Per-entry TTL overrides are visible in the snapshot.
        let mid = status.entries.iter().find(|e| e.id == "mid").unwrap();
        assert_eq!(mid.ttl, Duration::from_secs(5));
        let alpha = status.entries.iter().find(|e| e.id == "alpha").unwrap();
        assert_eq!(alpha.ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_cached_value_is_a_detached_clone() {
        let mut cache = PackageCache::new(Duration::from_secs(60));
        cache.set("ocean", create_cached_package("ocean"), None);

        let mut first = cache.get("ocean").unwrap();
        first.meta.display_name = "Mutated".to_string();

        let second = cache.get("ocean").unwrap();
        assert_eq!(second.meta.display_name, "Cached ocean");
    }
}

// Integration tests for TTL expiry
mod cache_expiry {
    use super::*;

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let mut cache = PackageCache::new(Duration::from_secs(60));
        cache.set("gone", create_cached_package("gone"), Some(Duration::ZERO));

        // age >= ttl holds from the very first read.
        assert_eq!(cache.get("gone"), None);
        assert_eq!(cache.status().size, 0);
    }

    #[test]
    fn test_entries_expire_after_their_ttl() {
        let mut cache = PackageCache::new(Duration::from_millis(15));
        cache.set("short", create_cached_package("short"), None);
        assert!(cache.get("short").is_some());

        sleep(Duration::from_millis(40));
        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.status().size, 0);
    }

    #[test]
    fn test_per_entry_ttl_overrides_the_default() {
        let mut cache = PackageCache::new(Duration::from_secs(60));
        cache.set("short", create_cached_package("short"), Some(Duration::from_millis(15)));
        cache.set("long", create_cached_package("long"), None);

        sleep(Duration::from_millis(40));
        assert_eq!(cache.get("short"), None);
        assert!(cache.get("long").is_some());
    }

    #[test]
    fn test_default_ttl_change_only_affects_new_entries() {
        let mut cache = PackageCache::new(Duration::from_millis(15));
        cache.set("old", create_cached_package("old"), None);

        cache.set_default_ttl(Duration::from_secs(60));
        cache.set("new", create_cached_package("new"), None);

        sleep(Duration::from_millis(40));
        assert_eq!(cache.get("old"), None);
        assert!(cache.get("new").is_some());
    }

    #[test]
    fn test_status_ages_grow_between_reads() {
        let mut cache = PackageCache::new(Duration::from_secs(60));
        cache.set("aging", create_cached_package("aging"), None);

        let first = cache.status().entries[0].age;
        sleep(Duration::from_millis(10));
        let second = cache.status().entries[0].age;
        assert!(second > first);
    }
}

// Integration tests for the manager's cache control surface
mod manager_cache_behavior {
    use super::*;

    #[test]
    fn test_load_populates_the_cache_and_unregister_invalidates() {
        let mut manager = manager_without_autoload();
        manager
            .register_package(create_cached_package("mine"))
            .unwrap();

        manager.load_package("mine").unwrap();
        assert_eq!(manager.cache_status().size, 1);

        manager.unregister_package("mine").unwrap();
        assert_eq!(manager.cache_status().size, 0);
    }

    #[test]
    fn test_clear_cache_keeps_registrations() {
        let mut manager = manager_without_autoload();
        manager
            .register_package(create_cached_package("mine"))
            .unwrap();
        manager.load_package("mine").unwrap();

        manager.clear_cache();
        assert_eq!(manager.cache_status().size, 0);
        assert!(manager.get_package("mine").is_some());
    }

    #[test]
    fn test_preload_warms_every_requested_id() {
        let mut manager = manager_without_autoload();
        let ids = vec!["light".to_string(), "dark".to_string()];

        let result = manager.preload_packages(&ids);
        assert!(result.is_complete_success());
        assert_eq!(manager.cache_status().size, 2);
    }

    #[test]
    fn test_cached_load_skips_the_loader() {
        let mut manager = manager_without_autoload();
        manager
            .register_package(create_cached_package("mine"))
            .unwrap();

        let loads = Arc::new(Mutex::new(0u32));
        let seen = Arc::clone(&loads);
        manager.subscribe(move |event| {
            if event.kind == PackageEventKind::PackageLoaded {
                *seen.lock().unwrap() += 1;
            }
        });

        manager.load_package("mine").unwrap();
        manager.load_package("mine").unwrap();

        // Only the first call reaches the loader; the second is a cache hit
        // and emits no load event.
        assert_eq!(*loads.lock().unwrap(), 1);
    }

    #[test]
    fn test_disabled_cache_never_stores() {
        let mut manager = ThemePackageManager::new(ThemeOptions {
            auto_load: Some(false),
            cache_enabled: Some(false),
            ..ThemeOptions::default()
        });

        manager.load_package("dark").unwrap();
        assert_eq!(manager.cache_status().size, 0);
    }
}

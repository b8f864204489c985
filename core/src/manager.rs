//! Manager façade over registry, loader, cache, validation and events.
//!
//! Everything the host application touches goes through
//! [`ThemePackageManager`]; registry, cache and loader are exported for
//! testing but are never mutated behind the manager's back. Read operations
//! degrade gracefully (`Option`/empty), mutating operations surface typed
//! errors and also emit an `error` event for observers.

use std::collections::BTreeMap;
use std::sync::Mutex;

use once_cell::sync::OnceCell;
use serde::Serialize;
use uuid::Uuid;

use crate::accessibility::{self, AccessibilityReport, TokenAdjustment};
use crate::cache::{CacheStatus, PackageCache};
use crate::compose;
use crate::discovery::{self, DiscoveryReport};
use crate::error::{PackageResult, ThemePackageError};
use crate::events::{EventBus, ListenerHandle, PackageEvent, PackageEventKind};
use crate::loader::{BatchLoadResult, PackageLoader};
use crate::options::ThemeOptions;
use crate::registry::{PackageRegistry, RegisterOutcome};
use crate::types::{PackageCategory, PackageSummary, ThemePackage};
use crate::validation::{PackageValidator, ValidationReport};

// Global manager instance, wrapped in Mutex for thread-safe hosts.
static GLOBAL_PACKAGE_MANAGER: OnceCell<Mutex<ThemePackageManager>> = OnceCell::new();

/// Top-level keys of the canonical wire shape; anything else on an imported
/// definition is tolerated with a warning.
const KNOWN_PACKAGE_KEYS: [&str; 5] = ["id", "meta", "tokens", "menuVariant", "componentOverrides"];

/// Outcome of importing a JSON definition.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// Id the package was registered under.
    pub id: String,
    pub report: ValidationReport,
    /// True when the declared id collided and a fresh one was assigned.
    pub renamed: bool,
}

/// Aggregate view over registry and cache.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageStats {
    pub total_registered: usize,
    pub total_cached: usize,
    pub by_category: BTreeMap<PackageCategory, usize>,
    pub by_tag: BTreeMap<String, usize>,
}

/// The single public entry point of the subsystem.
pub struct ThemePackageManager {
    registry: PackageRegistry,
    loader: PackageLoader,
    validator: PackageValidator,
    cache: PackageCache,
    options: ThemeOptions,
    events: EventBus,
    current: Option<String>,
}

impl ThemePackageManager {
    /// Creates a manager and, unless `autoLoad` is off, registers and caches
    /// every built-in package.
    pub fn new(options: ThemeOptions) -> Self {
        let cache = PackageCache::new(options.cache_timeout());
        let mut manager = ThemePackageManager {
            registry: PackageRegistry::new(),
            loader: PackageLoader::new(),
            validator: PackageValidator::new(),
            cache,
            options,
            events: EventBus::new(),
            current: None,
        };
        if manager.options.auto_load() {
            let result = manager.load_all_packages();
            log::info!("Auto-load finished: {}", result.summary());
        }
        manager
    }

    /// Initializes the process-wide manager. Call once at host startup.
    pub fn init_global(options: ThemeOptions) -> PackageResult<()> {
        let manager = ThemePackageManager::new(options);
        GLOBAL_PACKAGE_MANAGER
            .set(Mutex::new(manager))
            .map_err(|_| ThemePackageError::AlreadyInitialized)?;
        log::info!("Global theme package manager initialized");
        Ok(())
    }

    /// The process-wide manager instance.
    ///
    /// Panics when [`init_global`](Self::init_global) has not run; library
    /// code should construct its own instance instead.
    pub fn global() -> &'static Mutex<ThemePackageManager> {
        GLOBAL_PACKAGE_MANAGER.get().expect(
            "Theme package manager not initialized. Call ThemePackageManager::init_global() first.",
        )
    }

    // Validation

    /// Validates a candidate without touching any state. Strict mode
    /// promotes warnings to errors.
    pub fn validate_package(&self, package: &ThemePackage) -> ValidationReport {
        let report = self.validator.validate(package);
        if self.options.strict_mode() {
            report.promote_warnings()
        } else {
            report
        }
    }

    // Registration

    /// Validates and registers a package under its own id.
    ///
    /// Errors reject the candidate before the registry is touched; warnings
    /// ride along in the `Ok` report.
    pub fn register_package(&mut self, package: ThemePackage) -> PackageResult<ValidationReport> {
        let id = package.id.trim().to_string();
        let report = self.validate_package(&package);
        self.emit(PackageEventKind::PackageValidated, &id, report.to_string());

        if !report.valid() {
            log::error!("Rejecting package '{id}': {report}");
            let err = ThemePackageError::Validation { id: id.clone(), report };
            self.emit_error(&id, &err);
            return Err(err);
        }

        if let Err(e) = self.register_validated(package) {
            self.emit_error(&id, &e);
            return Err(e);
        }

        log::info!("Registered package '{id}'");
        self.emit(PackageEventKind::PackageRegistered, &id, "registered");
        Ok(report)
    }

    /// Removes a package from registry and cache.
    pub fn unregister_package(&mut self, id: &str) -> PackageResult<ThemePackage> {
        let id = id.trim();
        match self.registry.unregister(id) {
            Some(package) => {
                self.cache.invalidate(id);
                if self.current.as_deref() == Some(id) {
                    self.current = None;
                }
                log::info!("Unregistered package '{id}'");
                self.emit(PackageEventKind::PackageUnregistered, id, "unregistered");
                Ok(package)
            }
            None => {
                let err = ThemePackageError::not_found(id);
                self.emit_error(id, &err);
                Err(err)
            }
        }
    }

    // Loading

    /// Loads a package, consulting the cache first.
    ///
    /// When the load fails and strict mode is off, the configured fallback
    /// package is served instead; the returned package's id tells the caller
    /// which one actually arrived.
    pub fn load_package(&mut self, id: &str) -> PackageResult<ThemePackage> {
        let id = id.trim().to_string();
        match self.load_attempt(&id) {
            Ok(package) => Ok(package),
            Err(err) => {
                let fallback = self.options.fallback_package().to_string();
                if self.options.strict_mode() || fallback == id {
                    self.emit_error(&id, &err);
                    return Err(err);
                }
                log::warn!("Load of '{id}' failed ({err}), serving fallback '{fallback}'");
                match self.load_attempt(&fallback) {
                    Ok(package) => Ok(package),
                    Err(fallback_err) => {
                        log::error!("Fallback '{fallback}' failed as well: {fallback_err}");
                        self.emit_error(&id, &err);
                        Err(err)
                    }
                }
            }
        }
    }

    /// Warms the cache for the given ids. Failures are collected per id and
    /// never served from fallback.
    pub fn preload_packages(&mut self, ids: &[String]) -> BatchLoadResult {
        let mut result = BatchLoadResult::new(ids.len());
        for id in ids {
            let id = id.trim();
            match self.load_attempt(id) {
                Ok(package) => result.add_loaded(package.id),
                Err(e) => {
                    log::error!("Preload of '{id}' failed: {e}");
                    self.emit_error(id, &e);
                    result.add_failure(id, e);
                }
            }
        }
        log::info!("Preload finished: {}", result.summary());
        result
    }

    /// Discovers the built-in sources, registers each (replacing any earlier
    /// definition under the same id) and warms the cache. Best-effort: one
    /// broken package never blocks the rest.
    pub fn load_all_packages(&mut self) -> BatchLoadResult {
        let discovered = discovery::discover();
        let mut result = BatchLoadResult::new(discovered.len());

        for package in discovered {
            let id = package.id.clone();
            let report = self.validate_package(&package);
            if !report.valid() {
                let err = ThemePackageError::Validation { id: id.clone(), report };
                log::error!("Skipping built-in package '{id}': {err}");
                self.emit_error(&id, &err);
                result.add_failure(id, err);
                continue;
            }

            match self.registry.register(package, true) {
                Ok(RegisterOutcome::Inserted) => {
                    self.emit(PackageEventKind::PackageRegistered, &id, "auto-loaded");
                }
                Ok(RegisterOutcome::Replaced) => {
                    // The registry now holds the fresh definition; a surviving
                    // cache entry would keep serving the old one.
                    self.cache.invalidate(&id);
                    self.emit(PackageEventKind::PackageUpdated, &id, "auto-load refresh");
                }
                Err(e) => {
                    self.emit_error(&id, &e);
                    result.add_failure(id, e);
                    continue;
                }
            }

            match self.load_attempt(&id) {
                Ok(_) => result.add_loaded(id),
                Err(e) => {
                    self.emit_error(&id, &e);
                    result.add_failure(id, e);
                }
            }
        }

        log::info!("Built-in load finished: {}", result.summary());
        result
    }

    /// Drops the cache entry for `id` and loads fresh with validation forced
    /// on, so source edits surface immediately during development.
    pub fn reload_package(&mut self, id: &str) -> PackageResult<ThemePackage> {
        let id = id.trim().to_string();
        self.cache.invalidate(&id);
        match self.fetch_and_cache(&id, true) {
            Ok(package) => Ok(package),
            Err(e) => {
                self.emit_error(&id, &e);
                Err(e)
            }
        }
    }

    /// Clears the cache and reloads every registered package.
    pub fn reload_all_packages(&mut self) -> BatchLoadResult {
        self.cache.clear();
        let ids = self.registry.ids();
        let mut result = BatchLoadResult::new(ids.len());
        for id in ids {
            match self.fetch_and_cache(&id, true) {
                Ok(_) => result.add_loaded(id),
                Err(e) => {
                    log::error!("Reload of '{id}' failed: {e}");
                    self.emit_error(&id, &e);
                    result.add_failure(id, e);
                }
            }
        }
        log::info!("Reload finished: {}", result.summary());
        result
    }

    /// One load with no fallback: cache probe, then loader, then cache fill.
    fn load_attempt(&mut self, id: &str) -> PackageResult<ThemePackage> {
        if self.options.cache_enabled() {
            if let Some(package) = self.cache.get(id) {
                log::debug!("Cache hit for '{id}'");
                return Ok(package);
            }
        }
        self.fetch_and_cache(id, self.options.validate_on_load())
    }

    fn fetch_and_cache(&mut self, id: &str, validate: bool) -> PackageResult<ThemePackage> {
        let package = self
            .loader
            .load(id, &self.registry, validate, self.options.strict_mode())?;
        self.advise_on_contrast(&package);
        if self.options.cache_enabled() {
            self.cache.set(id, package.clone(), None);
        }
        self.emit(PackageEventKind::PackageLoaded, id, "loaded");
        Ok(package)
    }

    // Reads

    /// Cache-aware point read. Never loads, never falls back, never errors.
    pub fn get_package(&mut self, id: &str) -> Option<ThemePackage> {
        let id = id.trim();
        if self.options.cache_enabled() {
            if let Some(package) = self.cache.get(id) {
                return Some(package);
            }
        }
        self.registry.get(id).cloned()
    }

    pub fn get_all_packages(&self) -> Vec<ThemePackage> {
        self.registry.get_all()
    }

    pub fn package_summaries(&self) -> Vec<PackageSummary> {
        self.registry.summaries()
    }

    pub fn search_packages(&self, query: &str) -> Vec<ThemePackage> {
        self.registry.search(query)
    }

    pub fn get_packages_by_category(&self, category: PackageCategory) -> Vec<ThemePackage> {
        self.registry.by_category(category)
    }

    pub fn get_packages_by_tag(&self, tag: &str) -> Vec<ThemePackage> {
        self.registry.by_tag(tag)
    }

    pub fn get_stats(&mut self) -> PackageStats {
        PackageStats {
            total_registered: self.registry.len(),
            total_cached: self.cache.status().size,
            by_category: self.registry.category_counts(),
            by_tag: self.registry.tag_counts(),
        }
    }

    // Composition

    /// Registers a deep copy of `source_id` under `new_id`; the source is
    /// untouched.
    pub fn clone_package(&mut self, source_id: &str, new_id: &str) -> PackageResult<ThemePackage> {
        let source_id = source_id.trim();
        let new_id = new_id.trim();
        match self.clone_inner(source_id, new_id) {
            Ok(package) => Ok(package),
            Err(e) => {
                log::error!("Clone of '{source_id}' as '{new_id}' failed: {e}");
                self.emit_error(new_id, &e);
                Err(e)
            }
        }
    }

    fn clone_inner(&mut self, source_id: &str, new_id: &str) -> PackageResult<ThemePackage> {
        let source = self.require(source_id)?;
        let copy = compose::clone_package(&source, new_id);

        let report = self.validate_package(&copy);
        self.emit(PackageEventKind::PackageValidated, new_id, report.to_string());
        if !report.valid() {
            return Err(ThemePackageError::Validation {
                id: new_id.to_string(),
                report,
            });
        }

        self.register_validated(copy.clone())?;
        log::info!("Cloned '{source_id}' into '{new_id}'");
        self.emit(
            PackageEventKind::PackageRegistered,
            new_id,
            format!("cloned from '{source_id}'"),
        );
        Ok(copy)
    }

    /// Deep-merges `overlay_id`'s tokens and overrides onto a copy of
    /// `base_id` and registers the result under `new_id`. Atomic: nothing is
    /// registered unless the merged package validates.
    pub fn merge_packages(
        &mut self,
        base_id: &str,
        overlay_id: &str,
        new_id: &str,
    ) -> PackageResult<ThemePackage> {
        let base_id = base_id.trim();
        let overlay_id = overlay_id.trim();
        let new_id = new_id.trim();
        match self.merge_inner(base_id, overlay_id, new_id) {
            Ok(package) => Ok(package),
            Err(e) => {
                log::error!("Merge of '{overlay_id}' onto '{base_id}' failed: {e}");
                self.emit_error(new_id, &e);
                Err(e)
            }
        }
    }

    fn merge_inner(
        &mut self,
        base_id: &str,
        overlay_id: &str,
        new_id: &str,
    ) -> PackageResult<ThemePackage> {
        let base = self.require(base_id)?;
        let overlay = self.require(overlay_id)?;
        let merged = compose::merge_packages(&base, &overlay, new_id);

        let report = self.validate_package(&merged);
        self.emit(PackageEventKind::PackageValidated, new_id, report.to_string());
        if !report.valid() {
            return Err(ThemePackageError::MergeConflict {
                base: base_id.to_string(),
                overlay: overlay_id.to_string(),
                report,
            });
        }

        self.register_validated(merged.clone())?;
        log::info!("Merged '{overlay_id}' onto '{base_id}' as '{new_id}'");
        self.emit(
            PackageEventKind::PackageRegistered,
            new_id,
            format!("merged from '{base_id}' and '{overlay_id}'"),
        );
        Ok(merged)
    }

    // Export / import

    /// Serializes a registered package to pretty JSON.
    pub fn export_package(&self, id: &str) -> PackageResult<String> {
        let package = self.require(id.trim())?;
        Ok(serde_json::to_string_pretty(&package)?)
    }

    /// Imports a JSON definition produced by [`export_package`](Self::export_package)
    /// or authored externally.
    ///
    /// Unknown top-level keys become warnings; a legacy top-level `name`
    /// field is normalized into `meta.displayName` at this boundary. When the
    /// declared id is taken, the package is registered under a fresh derived
    /// id and `renamed` is set.
    pub fn import_package(&mut self, json: &str) -> PackageResult<ImportOutcome> {
        match self.import_inner(json) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                log::error!("Import failed: {e}");
                self.emit_error("import", &e);
                Err(e)
            }
        }
    }

    fn import_inner(&mut self, json: &str) -> PackageResult<ImportOutcome> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        let object = value
            .as_object_mut()
            .ok_or_else(|| ThemePackageError::import_format("top-level value must be an object"))?;

        let mut extra_warnings = Vec::new();

        // Definitions predating the canonical shape carried the display name
        // at top level.
        if let Some(legacy) = object.remove("name") {
            match legacy.as_str() {
                Some(name) => {
                    let meta = object
                        .entry("meta")
                        .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
                    if let Some(meta) = meta.as_object_mut() {
                        meta.entry("displayName")
                            .or_insert_with(|| serde_json::Value::String(name.to_string()));
                    }
                    extra_warnings
                        .push("legacy 'name' field normalized to meta.displayName".to_string());
                }
                None => extra_warnings.push("legacy 'name' field ignored (not a string)".to_string()),
            }
        }

        for key in object.keys() {
            if !KNOWN_PACKAGE_KEYS.contains(&key.as_str()) {
                extra_warnings.push(format!("unknown top-level key '{key}' ignored"));
            }
        }

        let mut package: ThemePackage = serde_json::from_value(value)?;
        package.id = package.id.trim().to_string();

        let mut report = self.validator.validate(&package);
        for warning in extra_warnings {
            report.warning(warning);
        }
        if self.options.strict_mode() {
            report = report.promote_warnings();
        }
        self.emit(PackageEventKind::PackageValidated, &package.id, report.to_string());
        if !report.valid() {
            return Err(ThemePackageError::Validation {
                id: package.id,
                report,
            });
        }

        let mut renamed = false;
        if self.registry.contains(&package.id) {
            let fresh = self.derive_import_id(&package.id);
            log::info!(
                "Import id '{declared}' is taken, registering as '{fresh}'",
                declared = package.id
            );
            package.id = fresh;
            renamed = true;
        }

        let id = package.id.clone();
        self.register_validated(package)?;
        log::info!("Imported package '{id}'");
        self.emit(
            PackageEventKind::PackageRegistered,
            &id,
            if renamed { "imported under a fresh id" } else { "imported" },
        );
        Ok(ImportOutcome { id, report, renamed })
    }

    // Active theme

    /// Loads `id` (fallback rules apply) and makes it the active theme.
    pub fn set_theme(&mut self, id: &str) -> PackageResult<ThemePackage> {
        let package = self.load_package(id)?;
        self.current = Some(package.id.clone());
        log::info!("Switched to theme: {}", package.meta.display_name);
        self.emit(PackageEventKind::PackageUpdated, &package.id, "active theme changed");
        Ok(package)
    }

    /// The active theme, if one was set and still resolves.
    pub fn current_theme(&mut self) -> Option<ThemePackage> {
        let id = self.current.clone()?;
        self.get_package(&id)
    }

    pub fn current_theme_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    // Accessibility

    /// Contrast report for a registered package. `None` when unregistered.
    pub fn check_accessibility(&self, id: &str) -> Option<AccessibilityReport> {
        self.registry.get(id.trim()).map(accessibility::check_package)
    }

    /// Suggested token swaps for failing contrast pairs; nothing is applied.
    pub fn suggest_accessibility_adjustments(&self, id: &str) -> Option<Vec<TokenAdjustment>> {
        self.registry
            .get(id.trim())
            .map(accessibility::suggest_adjustments)
    }

    // Cache control

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_status(&mut self) -> CacheStatus {
        self.cache.status()
    }

    // Options

    pub fn options(&self) -> &ThemeOptions {
        &self.options
    }

    /// Applies the `Some` fields of `patch` on top of the current options.
    ///
    /// Disabling the cache clears it; a new timeout applies to entries
    /// cached from now on.
    pub fn update_options(&mut self, patch: ThemeOptions) {
        self.options.merge_from(patch);
        self.cache.set_default_ttl(self.options.cache_timeout());
        if !self.options.cache_enabled() {
            self.cache.clear();
        }
        log::info!(
            "Options updated: cache {cache}, validate-on-load {validate}, strict {strict}",
            cache = self.options.cache_enabled(),
            validate = self.options.validate_on_load(),
            strict = self.options.strict_mode()
        );
    }

    // Discovery and events

    pub fn discovery_report(&self) -> DiscoveryReport {
        discovery::report()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&PackageEvent) + Send + 'static) -> ListenerHandle {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        self.events.unsubscribe(handle)
    }

    // Internals

    fn require(&self, id: &str) -> PackageResult<ThemePackage> {
        self.registry
            .get(id)
            .cloned()
            .ok_or_else(|| ThemePackageError::not_found(id))
    }

    /// Registry insert for a freshly validated package. Any cache entry under
    /// the same id (a built-in loaded before registration) would shadow the
    /// new definition, so it is dropped.
    fn register_validated(&mut self, package: ThemePackage) -> PackageResult<()> {
        let id = package.id.clone();
        self.registry.register(package, false)?;
        self.cache.invalidate(&id);
        Ok(())
    }

    /// Accessibility findings never block anything; they land in the log.
    fn advise_on_contrast(&self, package: &ThemePackage) {
        let report = accessibility::check_package(package);
        if !report.overall_pass {
            let failing: Vec<&str> = report
                .pairs
                .iter()
                .filter(|pair| !pair.passes_aa)
                .map(|pair| pair.label.as_str())
                .collect();
            log::warn!(
                "Package '{id}' has contrast pairs below AA: {pairs}",
                id = package.id,
                pairs = failing.join(", ")
            );
        }
    }

    fn derive_import_id(&self, base: &str) -> String {
        // Keep derived ids within the 64-char id limit so later loads
        // revalidate cleanly.
        let stem: String = base.chars().take(55).collect();
        loop {
            let suffix = Uuid::new_v4().simple().to_string();
            let candidate = format!("{stem}-{}", &suffix[..8]);
            if !self.registry.contains(&candidate) {
                return candidate;
            }
        }
    }

    fn emit(&self, kind: PackageEventKind, id: &str, detail: impl Into<String>) {
        self.events.emit(&PackageEvent::new(kind, id, detail));
    }

    fn emit_error(&self, id: &str, error: &ThemePackageError) {
        self.emit(PackageEventKind::Error, id, error.to_string());
    }
}

impl Default for ThemePackageManager {
    fn default() -> Self {
        ThemePackageManager::new(ThemeOptions::default())
    }
}

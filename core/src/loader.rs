//! Package loading with registry-first resolution.
//!
//! A load resolves the id against the registry, then against the embedded
//! built-in sources. The resolved package is re-validated on every load so
//! a package that was mutated or imported under older rules cannot sneak
//! stale defects past the gate.

use crate::discovery;
use crate::error::{PackageResult, ThemePackageError};
use crate::registry::PackageRegistry;
use crate::types::ThemePackage;
use crate::validation::PackageValidator;

/// Outcome of a batch load.
///
/// Batches never abort: every requested id ends up either in `loaded` or in
/// `failures`, and `total_requested` always equals the sum of both.
#[derive(Debug, Clone, Default)]
pub struct BatchLoadResult {
    pub total_requested: usize,
    pub loaded: Vec<String>,
    pub failures: Vec<(String, ThemePackageError)>,
}

impl BatchLoadResult {
    pub fn new(total_requested: usize) -> Self {
        BatchLoadResult {
            total_requested,
            ..Default::default()
        }
    }

    pub fn add_loaded(&mut self, id: impl Into<String>) {
        self.loaded.push(id.into());
    }

    pub fn add_failure(&mut self, id: impl Into<String>, error: ThemePackageError) {
        self.failures.push((id.into(), error));
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty() && self.loaded.len() == self.total_requested
    }

    pub fn summary(&self) -> String {
        format!(
            "{loaded} loaded, {failed} failed out of {total}",
            loaded = self.loaded.len(),
            failed = self.failures.len(),
            total = self.total_requested
        )
    }
}

/// Resolves and validates packages by id.
pub struct PackageLoader {
    validator: PackageValidator,
}

impl PackageLoader {
    pub fn new() -> Self {
        PackageLoader {
            validator: PackageValidator::new(),
        }
    }

    /// Loads one package.
    ///
    /// `validate` re-runs the validator on the resolved package even when it
    /// was already validated at registration; `strict` additionally promotes
    /// warnings to errors. Ids are trimmed before resolution.
    pub fn load(
        &self,
        id: &str,
        registry: &PackageRegistry,
        validate: bool,
        strict: bool,
    ) -> PackageResult<ThemePackage> {
        let id = id.trim();
        let package = self.resolve(id, registry)?;

        if validate {
            let mut report = self.validator.validate(&package);
            if strict {
                report = report.promote_warnings();
            }
            if !report.valid() {
                return Err(ThemePackageError::Validation {
                    id: id.to_string(),
                    report,
                });
            }
            if !report.is_clean() {
                log::warn!("Package '{id}' loaded with warnings: {report}");
            }
        }

        log::debug!("Loaded package '{id}'");
        Ok(package)
    }

    /// Attempts every id in order; failures never abort the batch.
    pub fn load_all(
        &self,
        ids: &[String],
        registry: &PackageRegistry,
        validate: bool,
        strict: bool,
    ) -> BatchLoadResult {
        let mut result = BatchLoadResult::new(ids.len());
        for id in ids {
            match self.load(id, registry, validate, strict) {
                Ok(package) => result.add_loaded(package.id),
                Err(e) => {
                    log::error!("Failed to load package '{id}': {e}");
                    result.add_failure(id.trim(), e);
                }
            }
        }
        if !result.is_complete_success() {
            log::warn!("Batch load incomplete: {}", result.summary());
        }
        result
    }

    fn resolve(&self, id: &str, registry: &PackageRegistry) -> PackageResult<ThemePackage> {
        if let Some(package) = registry.get(id) {
            return Ok(package.clone());
        }
        match discovery::parse_builtin(id) {
            Some(parsed) => parsed,
            None => Err(ThemePackageError::not_found(id)),
        }
    }
}

impl Default for PackageLoader {
    fn default() -> Self {
        PackageLoader::new()
    }
}

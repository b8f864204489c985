//! Error types for theme package operations.

use crate::validation::ValidationReport;
use thiserror::Error;

/// Errors surfaced by the manager façade and its components.
///
/// Read operations (`get_package`, searches, cache probes) never produce
/// these; they degrade to `None`/empty instead. Mutating operations and
/// loads surface them so defects in calling code show up immediately.
#[derive(Debug, Clone, Error)]
pub enum ThemePackageError {
    /// A candidate package failed validation.
    ///
    /// Carries the full report so callers can show every defect in one
    /// pass instead of fixing errors one at a time.
    #[error("validation failed for package '{id}': {report}")]
    Validation { id: String, report: ValidationReport },

    /// Register was called without replace intent for an id that is
    /// already present.
    #[error("package id '{id}' is already registered")]
    DuplicateId { id: String },

    /// A mutating operation referenced an id that is not registered.
    #[error("package '{id}' is not registered")]
    NotFound { id: String },

    /// A merge produced a package that fails validation; nothing was
    /// registered.
    #[error("merging '{overlay}' onto '{base}' produced an invalid package: {report}")]
    MergeConflict {
        base: String,
        overlay: String,
        report: ValidationReport,
    },

    /// An imported definition could not be parsed into the package shape.
    #[error("malformed package definition: {reason}")]
    ImportFormat { reason: String },

    /// `init_global` was called a second time.
    #[error("global theme package manager is already initialized")]
    AlreadyInitialized,
}

impl ThemePackageError {
    pub fn not_found(id: impl Into<String>) -> Self {
        ThemePackageError::NotFound { id: id.into() }
    }

    pub fn duplicate_id(id: impl Into<String>) -> Self {
        ThemePackageError::DuplicateId { id: id.into() }
    }

    pub fn import_format(reason: impl Into<String>) -> Self {
        ThemePackageError::ImportFormat {
            reason: reason.into(),
        }
    }

    /// Validation report attached to the error, if any.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            ThemePackageError::Validation { report, .. }
            | ThemePackageError::MergeConflict { report, .. } => Some(report),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ThemePackageError {
    fn from(error: serde_json::Error) -> Self {
        ThemePackageError::ImportFormat {
            reason: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for ThemePackageError {
    fn from(error: toml::de::Error) -> Self {
        ThemePackageError::ImportFormat {
            reason: error.to_string(),
        }
    }
}

/// Result alias used across the crate.
pub type PackageResult<T> = Result<T, ThemePackageError>;

//! # Themepack Core
//!
//! Runtime management of swappable UI theme packages. This library provides
//! a registry of validated packages, loading from compiled-in sources, TTL
//! caching, composition (clone/merge/export/import), WCAG contrast checking
//! and the manager façade host applications talk to.
//!
//! ## Modules
//!
//! - [`accessibility`] - WCAG contrast math and advisory reports
//! - [`cache`] - TTL-bounded package cache with lazy expiry
//! - [`compose`] - Deep clone and merge of packages
//! - [`discovery`] - Compile-time discovery of built-in packages
//! - [`error`] - Error taxonomy shared by every operation
//! - [`events`] - Lifecycle events and the listener registry
//! - [`loader`] - Registry-first package resolution
//! - [`manager`] - The façade consumed by host applications
//! - [`menu`] - Shared menu variant token sets
//! - [`options`] - Runtime configuration with defaulted accessors
//! - [`registry`] - Indexed in-memory package store
//! - [`types`] - The `ThemePackage` data model
//! - [`validation`] - Structural validation of candidate packages

pub mod accessibility;
pub mod cache;
pub mod compose;
pub mod discovery;
pub mod error;
pub mod events;
pub mod loader;
pub mod manager;
pub mod menu;
pub mod options;
pub mod registry;
pub mod types;
pub mod validation;

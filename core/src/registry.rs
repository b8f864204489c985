//! In-memory package store with category/tag indexes.
//!
//! The registry is a pure data structure: no I/O, no validation, no events.
//! Callers (in practice the manager) validate before registering and emit
//! notifications themselves. Every query returns cloned snapshots, so a
//! result sequence is never affected by later registry mutation.

use crate::error::{PackageResult, ThemePackageError};
use crate::types::{PackageCategory, PackageSummary, ThemePackage};
use std::collections::HashMap;

/// How a successful `register` call changed the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Inserted,
    Replaced,
}

/// Indexed store of registered theme packages.
///
/// Iteration order of [`get_all`](Self::get_all) is insertion order;
/// replacing a package keeps its original position, so UI listings stay
/// stable across re-registration.
#[derive(Debug, Default)]
pub struct PackageRegistry {
    packages: HashMap<String, ThemePackage>,
    order: Vec<String>,
    by_category: HashMap<PackageCategory, Vec<String>>,
    by_tag: HashMap<String, Vec<String>>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a package.
    ///
    /// Without `replace`, a colliding id is rejected with
    /// [`ThemePackageError::DuplicateId`] and the registry is untouched.
    pub fn register(
        &mut self,
        package: ThemePackage,
        replace: bool,
    ) -> PackageResult<RegisterOutcome> {
        let id = package.id.clone();
        let existing = self.packages.contains_key(&id);
        if existing && !replace {
            return Err(ThemePackageError::duplicate_id(id));
        }

        if existing {
            self.drop_from_indexes(&id);
        } else {
            self.order.push(id.clone());
        }

        self.index(&package);
        self.packages.insert(id, package);

        Ok(if existing {
            RegisterOutcome::Replaced
        } else {
            RegisterOutcome::Inserted
        })
    }

    /// Removes a package and all its index entries.
    ///
    /// Absent ids are a no-op so callers can unregister idempotently.
    pub fn unregister(&mut self, id: &str) -> Option<ThemePackage> {
        let package = self.packages.remove(id)?;
        self.drop_from_indexes(id);
        self.order.retain(|entry| entry != id);
        Some(package)
    }

    pub fn get(&self, id: &str) -> Option<&ThemePackage> {
        self.packages.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.packages.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Registered ids in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.order.clone()
    }

    /// All packages in insertion order, cloned.
    pub fn get_all(&self) -> Vec<ThemePackage> {
        self.order
            .iter()
            .filter_map(|id| self.packages.get(id))
            .cloned()
            .collect()
    }

    /// Listing records in insertion order.
    pub fn summaries(&self) -> Vec<PackageSummary> {
        self.order
            .iter()
            .filter_map(|id| self.packages.get(id))
            .map(ThemePackage::summary)
            .collect()
    }

    pub fn by_category(&self, category: PackageCategory) -> Vec<ThemePackage> {
        self.collect_ids(self.by_category.get(&category))
    }

    /// Packages carrying the exact tag (registration order).
    pub fn by_tag(&self, tag: &str) -> Vec<ThemePackage> {
        self.collect_ids(self.by_tag.get(tag))
    }

    /// Case-insensitive substring search over id, display name, description
    /// and tags. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<ThemePackage> {
        let needle = query.to_lowercase();
        self.order
            .iter()
            .filter_map(|id| self.packages.get(id))
            .filter(|pkg| {
                pkg.id.to_lowercase().contains(&needle)
                    || pkg.meta.display_name.to_lowercase().contains(&needle)
                    || pkg.meta.description.to_lowercase().contains(&needle)
                    || pkg
                        .meta
                        .tags
                        .iter()
                        .any(|tag| tag.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    /// Count of registered packages per category (only categories in use).
    pub fn category_counts(&self) -> std::collections::BTreeMap<PackageCategory, usize> {
        self.by_category
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(category, ids)| (*category, ids.len()))
            .collect()
    }

    /// Count of registered packages per tag.
    pub fn tag_counts(&self) -> std::collections::BTreeMap<String, usize> {
        self.by_tag
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(tag, ids)| (tag.clone(), ids.len()))
            .collect()
    }

    fn collect_ids(&self, ids: Option<&Vec<String>>) -> Vec<ThemePackage> {
        ids.map(|ids| {
            ids.iter()
                .filter_map(|id| self.packages.get(id))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
    }

    fn index(&mut self, package: &ThemePackage) {
        self.by_category
            .entry(package.meta.category)
            .or_default()
            .push(package.id.clone());
        for tag in &package.meta.tags {
            self.by_tag
                .entry(tag.clone())
                .or_default()
                .push(package.id.clone());
        }
    }

    fn drop_from_indexes(&mut self, id: &str) {
        for ids in self.by_category.values_mut() {
            ids.retain(|entry| entry != id);
        }
        for ids in self.by_tag.values_mut() {
            ids.retain(|entry| entry != id);
        }
    }
}

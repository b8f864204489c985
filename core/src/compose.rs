//! Pure package composition: deep clone and deep merge.
//!
//! Both operations build a brand-new package and never touch their inputs.
//! Merging the same two packages twice must give structurally identical
//! results, which the ordered token maps guarantee.

use crate::types::{ComponentOverrides, ThemePackage, TokenSet};
use std::collections::BTreeMap;

/// Deep copy of `source` under a new id.
///
/// The copy shares nothing with the source; its display name gains a
/// `" (Copy)"` suffix so listings distinguish the two.
pub fn clone_package(source: &ThemePackage, new_id: impl Into<String>) -> ThemePackage {
    let mut copy = source.clone();
    copy.id = new_id.into();
    copy.meta.display_name = format!("{} (Copy)", source.meta.display_name);
    copy
}

/// Deep merge of `overlay`'s tokens and component overrides onto a copy of
/// `base`, registered-to-be under `new_id`.
///
/// Override wins key-by-key; map-valued token groups merge recursively, so
/// keys present only in `base` survive. Metadata and menu variant come from
/// `base`, with a composed display name (`"Base + Overlay"`).
pub fn merge_packages(
    base: &ThemePackage,
    overlay: &ThemePackage,
    new_id: impl Into<String>,
) -> ThemePackage {
    ThemePackage {
        id: new_id.into(),
        meta: {
            let mut meta = base.meta.clone();
            meta.display_name = format!(
                "{} + {}",
                base.meta.display_name, overlay.meta.display_name
            );
            meta
        },
        tokens: merge_tokens(&base.tokens, &overlay.tokens),
        menu_variant: base.menu_variant,
        component_overrides: merge_overrides(&base.component_overrides, &overlay.component_overrides),
    }
}

/// Token-set merge: scalar groups take the overlay value, map groups union
/// with overlay precedence.
pub fn merge_tokens(base: &TokenSet, overlay: &TokenSet) -> TokenSet {
    TokenSet {
        colors: overlay.colors.clone(),
        typography: crate::types::TypographyTokens {
            font_family: overlay.typography.font_family.clone(),
            sizes: merge_map(&base.typography.sizes, &overlay.typography.sizes),
            weights: merge_map(&base.typography.weights, &overlay.typography.weights),
            line_heights: merge_map(
                &base.typography.line_heights,
                &overlay.typography.line_heights,
            ),
        },
        spacing: merge_map(&base.spacing, &overlay.spacing),
        radius: merge_map(&base.radius, &overlay.radius),
        shadows: merge_map(&base.shadows, &overlay.shadows),
    }
}

/// Component-override merge, recursive per family.
pub fn merge_overrides(base: &ComponentOverrides, overlay: &ComponentOverrides) -> ComponentOverrides {
    let mut merged = base.clone();
    for (family, overrides) in overlay {
        let entry = merged.entry(family.clone()).or_default();
        for (token, value) in overrides {
            entry.insert(token.clone(), value.clone());
        }
    }
    merged
}

fn merge_map<V: Clone>(
    base: &BTreeMap<String, V>,
    overlay: &BTreeMap<String, V>,
) -> BTreeMap<String, V> {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

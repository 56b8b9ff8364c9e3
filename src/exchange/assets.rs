//! Asset-reference rewriting for import id-remapping.
//!
//! Style, code, script and icon fields may embed references to
//! category-scoped binary assets in the form `@@ASSETS@@/{categoryId}/...`.
//! When an import resolves a category to a different id than the document
//! carried, every embedded reference to the old id must be rewritten.
//!
//! Bulk rewriting uses a two-pass marker-and-sweep: each remapped reference
//! is first rewritten to a marked form, then all markers are stripped. A
//! naive one-shot replace would chain substitutions when several categories
//! are remapped in the same pass (e.g. the map `{1 → 2, 2 → 3}` must not
//! turn `/1/` into `/3/`).

use crate::catalog::EntityId;
use std::collections::HashMap;

/// Base marker for category-scoped asset references.
pub const ASSET_BASE: &str = "@@ASSETS@@";

/// Legacy base marker, accepted on import for compatibility.
pub const LEGACY_ASSET_BASE: &str = "@@C4L_ASSETS@@";

const REWRITE_MARK: &str = "bulk:";

/// Rewrites the legacy asset base to the current one.
pub fn normalize_legacy_base(subject: &str) -> String {
    subject.replace(
        &format!("{LEGACY_ASSET_BASE}/"),
        &format!("{ASSET_BASE}/"),
    )
}

/// Rewrites every reference to one category id. Single remap, no marker
/// needed.
pub fn rewrite_asset_ids(old: EntityId, new: EntityId, subject: &str) -> String {
    subject.replace(
        &format!("{ASSET_BASE}/{old}/"),
        &format!("{ASSET_BASE}/{new}/"),
    )
}

fn rewrite_marked(old: EntityId, new: EntityId, subject: &str) -> String {
    subject.replace(
        &format!("{ASSET_BASE}/{old}/"),
        &format!("{ASSET_BASE}/{REWRITE_MARK}{new}/"),
    )
}

fn sweep_marks(subject: &str) -> String {
    subject.replace(
        &format!("{ASSET_BASE}/{REWRITE_MARK}"),
        &format!("{ASSET_BASE}/"),
    )
}

/// Rewrites references for a whole category map in one pass, after
/// normalizing the legacy base. Marker-and-sweep keeps chained remaps from
/// double-rewriting; the map's iteration order is irrelevant.
pub fn rewrite_asset_ids_bulk(map: &HashMap<EntityId, EntityId>, subject: &str) -> String {
    let mut out = normalize_legacy_base(subject);
    for (old, new) in map {
        out = rewrite_marked(*old, *new, &out);
    }
    sweep_marks(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_rewrite_changes_only_the_old_id() {
        let css = "background: url('@@ASSETS@@/3/bg.png'); url('@@ASSETS@@/30/x.png')";
        let out = rewrite_asset_ids(3, 7, css);
        assert!(out.contains("@@ASSETS@@/7/bg.png"));
        // "/30/" must not match "/3/".
        assert!(out.contains("@@ASSETS@@/30/x.png"));
    }

    #[test]
    fn bulk_rewrite_does_not_chain_substitutions() {
        let css = "url('@@ASSETS@@/1/a.png') url('@@ASSETS@@/2/b.png')";
        let map = HashMap::from([(1, 2), (2, 3)]);
        let out = rewrite_asset_ids_bulk(&map, css);
        assert!(out.contains("@@ASSETS@@/2/a.png"));
        assert!(out.contains("@@ASSETS@@/3/b.png"));
        assert!(!out.contains(REWRITE_MARK));
    }

    #[test]
    fn bulk_rewrite_handles_swapped_ids() {
        let css = "@@ASSETS@@/1/a.png @@ASSETS@@/2/b.png";
        let map = HashMap::from([(1, 2), (2, 1)]);
        let out = rewrite_asset_ids_bulk(&map, css);
        assert!(out.contains("@@ASSETS@@/2/a.png"));
        assert!(out.contains("@@ASSETS@@/1/b.png"));
    }

    #[test]
    fn legacy_base_is_normalized_before_remapping() {
        let css = "url('@@C4L_ASSETS@@/4/old.png')";
        let map = HashMap::from([(4, 9)]);
        assert_eq!(
            rewrite_asset_ids_bulk(&map, css),
            "url('@@ASSETS@@/9/old.png')"
        );
    }

    #[test]
    fn untouched_subject_passes_through() {
        let css = ".quote { color: red; }";
        assert_eq!(rewrite_asset_ids_bulk(&HashMap::new(), css), css);
    }
}

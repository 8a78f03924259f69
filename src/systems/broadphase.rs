//! Broad-phase rebuild system.
//!
//! Rebuilds the [`AabbTree`](crate::resources::spatialtree::AabbTree) from
//! every enabled body's bounds, once per substep, after integration has
//! moved the bodies. When `use_tree` is off the tree is cleared and the
//! narrow phase falls back to brute-force pairwise candidates.

use bevy_ecs::prelude::*;

use crate::components::body::Body;
use crate::resources::config::PhysicsConfig;
use crate::resources::spatialtree::{AabbTree, TreeEntry};

/// Rebuild the spatial tree from current body bounds.
pub fn rebuild_spatial_tree(
    query: Query<(Entity, &Body)>,
    config: Res<PhysicsConfig>,
    mut tree: ResMut<AabbTree>,
) {
    if !config.use_tree {
        if !tree.is_empty() {
            tree.rebuild(Vec::new(), config.max_entries);
        }
        return;
    }

    let mut entries: Vec<TreeEntry> = Vec::with_capacity(query.iter().len());
    for (entity, body) in query.iter() {
        if !body.enabled {
            continue;
        }
        let (min, max) = body.bounds();
        entries.push(TreeEntry {
            entity,
            id: body.id,
            min,
            max,
        });
    }
    tree.rebuild(entries, config.max_entries);
}

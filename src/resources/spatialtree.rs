//! Broad-phase AABB tree resource.
//!
//! A bounding-volume hierarchy over the bounds of every enabled body,
//! rebuilt once per substep (bodies move every step, so caching entries
//! across steps would serve stale bounds). Build is O(n log n) by recursive
//! median split on the longest axis; queries descend only the branches whose
//! boxes overlap the probe, then scan leaves linearly. Leaves hold at most
//! `max_entries` entries.

use bevy_ecs::prelude::{Entity, Resource};
use glam::Vec2;
use smallvec::SmallVec;

use crate::components::body::BodyId;

/// A body's bounds as recorded at rebuild time.
#[derive(Debug, Clone, Copy)]
pub struct TreeEntry {
    pub entity: Entity,
    pub id: BodyId,
    pub min: Vec2,
    pub max: Vec2,
}

impl TreeEntry {
    fn overlaps(&self, min: Vec2, max: Vec2) -> bool {
        self.min.x < max.x && self.max.x > min.x && self.min.y < max.y && self.max.y > min.y
    }
}

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Leaf { start: usize, count: usize },
    Branch { left: usize, right: usize },
}

#[derive(Debug, Clone, Copy)]
struct Node {
    min: Vec2,
    max: Vec2,
    kind: NodeKind,
}

/// Rebuildable bounding-volume tree over body bounds.
#[derive(Resource, Debug, Default)]
pub struct AabbTree {
    entries: Vec<TreeEntry>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl AabbTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear and bulk-insert the given entries.
    ///
    /// `max_entries` is the leaf subdivision threshold; nodes at or below it
    /// are scanned linearly by `query`.
    pub fn rebuild(&mut self, entries: Vec<TreeEntry>, max_entries: usize) {
        self.nodes.clear();
        self.entries = entries;
        self.root = if self.entries.is_empty() {
            None
        } else {
            let count = self.entries.len();
            Some(self.build(0, count, max_entries.max(1)))
        };
    }

    fn build(&mut self, start: usize, end: usize, max_entries: usize) -> usize {
        let mut min = self.entries[start].min;
        let mut max = self.entries[start].max;
        for entry in &self.entries[start + 1..end] {
            min = min.min(entry.min);
            max = max.max(entry.max);
        }

        if end - start <= max_entries {
            self.nodes.push(Node {
                min,
                max,
                kind: NodeKind::Leaf {
                    start,
                    count: end - start,
                },
            });
            return self.nodes.len() - 1;
        }

        // Median split on the longest axis. Ties on the center key fall back
        // to the body id so rebuilds of the same scene are identical.
        let extent = max - min;
        let slice = &mut self.entries[start..end];
        if extent.x >= extent.y {
            slice.sort_unstable_by(|a, b| {
                (a.min.x + a.max.x)
                    .total_cmp(&(b.min.x + b.max.x))
                    .then(a.id.cmp(&b.id))
            });
        } else {
            slice.sort_unstable_by(|a, b| {
                (a.min.y + a.max.y)
                    .total_cmp(&(b.min.y + b.max.y))
                    .then(a.id.cmp(&b.id))
            });
        }

        let mid = (start + end) / 2;
        let left = self.build(start, mid, max_entries);
        let right = self.build(mid, end, max_entries);
        self.nodes.push(Node {
            min,
            max,
            kind: NodeKind::Branch { left, right },
        });
        self.nodes.len() - 1
    }

    /// Append every entry whose box overlaps `[min, max]` to `out`.
    ///
    /// Touching (edge-flush) boxes are not reported, matching the body
    /// overlap test. An empty tree appends nothing.
    pub fn query(&self, min: Vec2, max: Vec2, out: &mut Vec<TreeEntry>) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack: SmallVec<[usize; 32]> = SmallVec::new();
        stack.push(root);
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if node.min.x >= max.x || node.max.x <= min.x || node.min.y >= max.y || node.max.y <= min.y
            {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, count } => {
                    for entry in &self.entries[start..start + count] {
                        if entry.overlaps(min, max) {
                            out.push(*entry);
                        }
                    }
                }
                NodeKind::Branch { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
    }
}

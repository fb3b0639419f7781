//! Octree broad phase
//!
//! Indexes bounding volumes by their world-space [`Bounds`]. Each indexed
//! volume is keyed by `(body handle, volume slot)`, so a body with several
//! volumes is indexed several times while queries still report its handle
//! once.
//!
//! # Layout
//!
//! Nodes live in an arena (`Vec<Node>`) and refer to each other by index. The
//! partition root is a cube that doubles along the needed axes whenever a
//! volume falls outside it; the old root becomes one octant of the new one.
//! A node that holds more than `leaf_capacity` entries splits into eight
//! children and pushes down every entry that fits entirely inside one child.
//! Entries straddling a split plane stay at the parent, so no volume is ever
//! stored twice.
//!
//! Child index is `4 * x + 2 * y + z`, where each bit is 1 for the upper half
//! of that axis.
//!
//! # Reported bounds
//!
//! [`Octree::bounds`] is the exact union of every volume inserted since the
//! last [`Octree::clear`]. It only grows; removals do not shrink it. Re-indexing
//! a moved volume merges its new bounds too, so the union covers every
//! position an indexed volume has ever had, not only the current members. The
//! cubic partition region is an internal detail and usually larger.
//!
//! # Identity
//!
//! An entry is keyed by the volume's owner and slot. The handle passed to
//! [`Octree::add_body`] must match the volume's owner; volumes attached
//! through [`crate::physics::body::Body::add_volume`] always do. Standalone
//! volumes get their identity from [`BoundingVolume::with_body`] and
//! [`BoundingVolume::with_slot`].

use std::collections::{BTreeSet, HashMap};

use glam::{BVec3, Vec3, Vec4};
use tracing::{trace, warn};

use super::handle::BodyHandle;
use super::volume::{Bounds, BoundingVolume};
use crate::config::OctreeConfig;

/// Upper limit on root doublings for a single insertion.
const MAX_GROW_STEPS: usize = 64;

/// Identity of one indexed volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VolumeKey {
    /// Owning body
    pub body: BodyHandle,
    /// Slot of the volume inside the body
    pub slot: u32,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    key: VolumeKey,
    bounds: Bounds,
}

#[derive(Debug)]
struct Node {
    region: Bounds,
    children: Option<[usize; 8]>,
    entries: Vec<Entry>,
}

impl Node {
    fn leaf(region: Bounds) -> Self {
        Self {
            region,
            children: None,
            entries: Vec::new(),
        }
    }
}

/// Region of octant `index` of `region`.
fn octant_region(region: &Bounds, index: usize) -> Bounds {
    let mid = region.center();
    let upper = BVec3::new(index & 4 != 0, index & 2 != 0, index & 1 != 0);
    Bounds {
        min: Vec3::select(upper, mid, region.min),
        max: Vec3::select(upper, region.max, mid),
    }
}

/// Spatial index over bounding volumes.
#[derive(Debug)]
pub struct Octree {
    config: OctreeConfig,
    nodes: Vec<Node>,
    root: Option<usize>,
    /// Node currently holding each indexed volume
    locations: HashMap<VolumeKey, usize>,
    bounds: Option<Bounds>,
}

impl Default for Octree {
    fn default() -> Self {
        Self::new(OctreeConfig::default())
    }
}

impl Octree {
    /// Creates an empty tree. Unusable tuning values are replaced by their
    /// defaults with a warning.
    pub fn new(config: OctreeConfig) -> Self {
        let sanitized = config.sanitized();
        if sanitized != config {
            warn!("octree: config {:?} adjusted to {:?}", config, sanitized);
        }
        Self {
            config: sanitized,
            nodes: Vec::new(),
            root: None,
            locations: HashMap::new(),
            bounds: None,
        }
    }

    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    // ========================================================================
    // MEMBERSHIP
    // ========================================================================

    /// Indexes `volume` under `handle` using the volume's current bounds.
    ///
    /// Adding a volume that is already indexed replaces its entry. Volumes
    /// owned by another handle and volumes with non-finite bounds are
    /// rejected with a warning.
    ///
    /// Returns `true` if the volume is indexed afterwards.
    pub fn add_body(&mut self, handle: BodyHandle, volume: &BoundingVolume) -> bool {
        if volume.body_handle() != handle {
            warn!(
                "octree: {} slot {} is owned by {}, not added",
                handle,
                volume.slot(),
                volume.body_handle()
            );
            return false;
        }
        let key = VolumeKey {
            body: handle,
            slot: volume.slot(),
        };
        let bounds = volume.bounds();
        if !bounds.is_finite() {
            warn!("octree: ignoring {} slot {} with non-finite bounds", handle, key.slot);
            return false;
        }

        self.remove_key(&key);

        self.bounds = Some(match self.bounds {
            Some(existing) => existing.union(&bounds),
            None => bounds,
        });

        self.ensure_root(&bounds);
        self.grow_to_contain(&bounds);
        if let Some(root) = self.root {
            self.insert_into(root, 0, Entry { key, bounds });
        }
        true
    }

    /// Removes the `(handle, volume)` pairing. Unknown pairings are ignored.
    ///
    /// Returns `true` if something was removed.
    pub fn remove_body(&mut self, handle: BodyHandle, volume: &BoundingVolume) -> bool {
        if volume.body_handle() != handle {
            return false;
        }
        self.remove_key(&VolumeKey {
            body: handle,
            slot: volume.slot(),
        })
    }

    /// Re-indexes a volume after it moved. Same as remove followed by add.
    pub fn update_body(&mut self, handle: BodyHandle, volume: &BoundingVolume) -> bool {
        self.add_body(handle, volume)
    }

    fn remove_key(&mut self, key: &VolumeKey) -> bool {
        let Some(node) = self.locations.remove(key) else {
            return false;
        };
        let entries = &mut self.nodes[node].entries;
        if let Some(pos) = entries.iter().position(|e| e.key == *key) {
            entries.swap_remove(pos);
        }
        true
    }

    /// True if `(handle, slot)` is indexed.
    pub fn contains(&self, handle: BodyHandle, slot: u32) -> bool {
        self.locations.contains_key(&VolumeKey { body: handle, slot })
    }

    /// Number of indexed volumes.
    pub fn body_count(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Drops every entry and resets the reported bounds.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.locations.clear();
        self.bounds = None;
    }

    // ========================================================================
    // BOUNDS
    // ========================================================================

    /// Union of every volume inserted since the last clear, `None` when
    /// nothing was ever inserted.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Minimum corner of [`Self::bounds`], the origin when empty.
    pub fn min_pos(&self) -> Vec4 {
        self.bounds.map_or(Vec4::W, |b| b.min_pos())
    }

    /// Maximum corner of [`Self::bounds`], the origin when empty.
    pub fn max_pos(&self) -> Vec4 {
        self.bounds.map_or(Vec4::W, |b| b.max_pos())
    }

    /// Number of allocated nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Region covered by the partition root.
    pub fn root_region(&self) -> Option<Bounds> {
        self.root.map(|r| self.nodes[r].region)
    }

    fn push_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Creates the root cube around `bounds` if there is none yet.
    fn ensure_root(&mut self, bounds: &Bounds) {
        if self.root.is_some() {
            return;
        }
        let half = (bounds.size().max_element() * 0.5).max(self.config.min_node_size * 0.5);
        let region = Bounds::from_center_half_extents(bounds.center(), Vec3::splat(half));
        let root = self.push_node(Node::leaf(region));
        self.root = Some(root);
        trace!("octree: root created {:?}..{:?}", region.min, region.max);
    }

    /// Doubles the root region until it contains `target`.
    fn grow_to_contain(&mut self, target: &Bounds) {
        for _ in 0..MAX_GROW_STEPS {
            let Some(old_root) = self.root else {
                return;
            };
            let region = self.nodes[old_root].region;
            if region.contains(target) {
                return;
            }

            // A point-sized root would never grow
            let size = region.size().max(Vec3::splat(self.config.min_node_size));
            let grow_negative = target.min.cmplt(region.min);
            let new_min = Vec3::select(grow_negative, region.min - size, region.min);
            let new_region = Bounds {
                min: new_min,
                max: new_min + size * 2.0,
            };

            // The old root ends up in the upper half of every axis we grew down
            let old_octant = (usize::from(grow_negative.x) << 2)
                | (usize::from(grow_negative.y) << 1)
                | usize::from(grow_negative.z);

            let mut children = [0usize; 8];
            for (i, child) in children.iter_mut().enumerate() {
                *child = if i == old_octant {
                    old_root
                } else {
                    self.push_node(Node::leaf(octant_region(&new_region, i)))
                };
            }

            let new_root = self.push_node(Node {
                region: new_region,
                children: Some(children),
                entries: Vec::new(),
            });
            self.root = Some(new_root);
            trace!("octree: root grown to {:?}..{:?}", new_region.min, new_region.max);
        }
        warn!(
            "octree: root did not reach {:?}..{:?} after {} doublings",
            target.min, target.max, MAX_GROW_STEPS
        );
    }

    fn insert_into(&mut self, start: usize, start_depth: u32, entry: Entry) {
        let mut node = start;
        let mut depth = start_depth;

        while let Some(children) = self.nodes[node].children {
            match children
                .iter()
                .copied()
                .find(|&c| self.nodes[c].region.contains(&entry.bounds))
            {
                Some(child) => {
                    node = child;
                    depth += 1;
                }
                None => break,
            }
        }

        self.nodes[node].entries.push(entry);
        self.locations.insert(entry.key, node);

        if self.should_subdivide(node, depth) {
            self.subdivide(node, depth);
        }
    }

    fn should_subdivide(&self, node: usize, depth: u32) -> bool {
        let n = &self.nodes[node];
        n.children.is_none()
            && n.entries.len() > self.config.leaf_capacity
            && depth < self.config.max_depth
            && n.region.size().min_element() * 0.5 >= self.config.min_node_size
    }

    fn subdivide(&mut self, node: usize, depth: u32) {
        let region = self.nodes[node].region;
        let mut children = [0usize; 8];
        for (i, child) in children.iter_mut().enumerate() {
            *child = self.push_node(Node::leaf(octant_region(&region, i)));
        }
        self.nodes[node].children = Some(children);

        let entries = std::mem::take(&mut self.nodes[node].entries);
        trace!("octree: node {} split at depth {} ({} entries)", node, depth, entries.len());
        for entry in entries {
            self.insert_into(node, depth, entry);
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Collects every indexed body whose bounds overlap `query`'s bounds.
    ///
    /// The query volume's owner is never reported and every handle is
    /// reported once, in ascending order. Since indexed volumes always match
    /// their owner, this excludes exactly the entries of the querying body.
    pub fn find_potential_intersections<E>(&self, query: &BoundingVolume, out: &mut E)
    where
        E: Extend<BodyHandle>,
    {
        out.extend(self.query_bounds(&query.bounds(), Some(query.body_handle())));
    }

    /// Handles overlapping `bounds`, optionally excluding one body.
    pub fn query_bounds(&self, bounds: &Bounds, exclude: Option<BodyHandle>) -> BTreeSet<BodyHandle> {
        let mut found = BTreeSet::new();
        let Some(root) = self.root else {
            return found;
        };

        // The root is always visited: entries that could not be fitted after
        // growth is capped live there regardless of its region.
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            for entry in &node.entries {
                if Some(entry.key.body) != exclude && entry.bounds.overlaps(bounds) {
                    found.insert(entry.key.body);
                }
            }
            if let Some(children) = node.children {
                stack.extend(
                    children
                        .iter()
                        .copied()
                        .filter(|&c| self.nodes[c].region.overlaps(bounds)),
                );
            }
        }
        found
    }

    /// Every pair of distinct bodies with overlapping volumes.
    ///
    /// Pairs are canonical (`a < b`) and sorted ascending.
    pub fn potential_pairs(&self) -> Vec<(BodyHandle, BodyHandle)> {
        let mut pairs = BTreeSet::new();
        for node in &self.nodes {
            for entry in &node.entries {
                let a = entry.key.body;
                for b in self.query_bounds(&entry.bounds, Some(a)) {
                    pairs.insert(if a < b { (a, b) } else { (b, a) });
                }
            }
        }
        pairs.into_iter().collect()
    }
}

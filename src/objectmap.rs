//------------ ObjectMap -----------------------------------------------------
//
// The top-level engine: oid allocation, the path<->oid bijection, the
// path-index (ancestor -> depth -> oid-set), subtree add/remove,
// depth-limited lookup and navigation enumeration, composing a
// `ReferenceMap` for typed relations. The path-index is kept as nested
// `BTreeMap`s so every subtree query is a contiguous range scan rather
// than a tree walk.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::ObjectMapError;
use crate::node::{node_path, Handle, ObjectNode, Resolver};
use crate::oid::{Oid, OidAllocator};
use crate::path::Path;
use crate::reference::ReferenceMap;

/// One entry of a [`ObjectMap::navgen`] result: a node, its path and name,
/// and the (possibly empty) list of its own children down to the
/// requested depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavNode {
    pub path: Path,
    pub name: String,
    pub children: Vec<NavNode>,
}

/// The persistent, in-process object map described in this crate's design
/// notes: a durable `oid <-> path` bijection, an ancestor path-index for
/// subtree queries, and a [`ReferenceMap<R>`] of typed relations between
/// registered oids.
///
/// `R` is the reference-type key: any totally-ordered, clonable type such
/// as a short string or a tagged enum variant.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "R: Ord + Serialize",
    deserialize = "R: Ord + Deserialize<'de>"
))]
pub struct ObjectMap<R: Ord> {
    id_to_path: BTreeMap<Oid, Path>,
    path_to_id: BTreeMap<Path, Oid>,
    pathindex: BTreeMap<Path, BTreeMap<u32, BTreeSet<Oid>>>,
    references: ReferenceMap<R>,
    #[serde(skip)]
    allocator: OidAllocator,
    #[serde(skip)]
    dirty: AtomicBool,
}

impl<R: Ord + Clone> ObjectMap<R> {
    pub fn new() -> Self {
        Self {
            id_to_path: BTreeMap::new(),
            path_to_id: BTreeMap::new(),
            pathindex: BTreeMap::new(),
            references: ReferenceMap::new(),
            allocator: OidAllocator::new(),
            dirty: AtomicBool::new(false),
        }
    }

    /// Number of currently registered oids.
    pub fn len(&self) -> usize {
        self.id_to_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_path.is_empty()
    }

    /// Whether a mutation has happened since the last [`ObjectMap::take_dirty`].
    /// Every mutating call sets this, so an embedding store can poll it to
    /// decide whether a commit is needed.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    /// Read and clear the dirty flag in one step.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::Relaxed)
    }

    //-------- registration ------------------------------------------------

    /// Register `node` at `path_tuple`. If `node` already carries an oid
    /// and `replace_oid` is false, that oid is kept (it must not already
    /// be registered); otherwise a fresh oid is allocated and stamped onto
    /// `node`.
    pub fn add<N: ObjectNode>(
        &mut self,
        node: &mut N,
        path_tuple: Path,
        replace_oid: bool,
    ) -> Result<Oid, ObjectMapError> {
        if path_tuple.is_empty() {
            return Err(ObjectMapError::BadArgument(
                "path_tuple must be a non-empty tuple".into(),
            ));
        }
        if self.path_to_id.contains_key(&path_tuple) {
            return Err(ObjectMapError::DuplicatePath(path_tuple));
        }

        let oid = match node.oid() {
            Some(existing) if !replace_oid => {
                if self.id_to_path.contains_key(&existing) {
                    return Err(ObjectMapError::DuplicateOid(existing));
                }
                existing
            }
            _ => {
                let allocated = self.allocator.allocate(&self.id_to_path);
                node.set_oid(allocated);
                allocated
            }
        };

        self.path_to_id.insert(path_tuple.clone(), oid);
        self.id_to_path.insert(oid, path_tuple.clone());

        let pathlen = path_tuple.len();
        for k in 0..pathlen {
            let ancestor = path_tuple.prefix(k + 1);
            let level = (pathlen - (k + 1)) as u32;
            self.pathindex
                .entry(ancestor)
                .or_default()
                .entry(level)
                .or_default()
                .insert(oid);
        }

        self.dirty.store(true, Ordering::Relaxed);
        log::debug!("add: registered oid {oid} at path {path_tuple}");

        #[cfg(debug_assertions)]
        self.debug_check_invariants();

        Ok(oid)
    }

    /// Remove `target` (and its whole subtree) from the map. If
    /// `references` is true, also evict every reference-map entry that
    /// mentions one of the removed oids; pass `false` on a move
    /// (remove immediately followed by re-`add`) to keep references
    /// intact across the transit.
    pub fn remove<N: ObjectNode>(
        &mut self,
        target: Handle<'_, N>,
        references: bool,
    ) -> Result<BTreeSet<Oid>, ObjectMapError> {
        let path = match target {
            Handle::Node(node) => node_path(node),
            Handle::Oid(oid) => match self.id_to_path.get(&oid) {
                Some(p) => p.clone(),
                None => return Ok(BTreeSet::new()),
            },
            Handle::Path(path) => {
                if path.is_empty() {
                    return Err(ObjectMapError::BadArgument(
                        "path tuple must be a non-empty tuple".into(),
                    ));
                }
                path
            }
        };

        Ok(self.remove_path(&path, references))
    }

    fn remove_path(&mut self, target: &Path, references: bool) -> BTreeSet<Oid> {
        if !self.pathindex.contains_key(target) {
            // rationale: if this key isn't present, no path ever added
            // contained it.
            return BTreeSet::new();
        }

        let pathlen = target.len();
        let mut removed = BTreeSet::new();
        let mut remove_keys = Vec::new();

        for (key, depthmap) in self.pathindex.range(target.clone()..) {
            if !key.has_prefix(target) {
                break;
            }
            for oidset in depthmap.values() {
                removed.extend(oidset.iter().copied());
            }
            remove_keys.push(key.clone());
        }

        let items: Vec<(u32, BTreeSet<Oid>)> = self
            .pathindex
            .get(target)
            .map(|depthmap| depthmap.iter().map(|(&d, s)| (d, s.clone())).collect())
            .unwrap_or_default();

        for key in &remove_keys {
            self.pathindex.remove(key);
        }

        for &oid in &removed {
            if let Some(path) = self.id_to_path.remove(&oid) {
                self.path_to_id.remove(&path);
            }
        }

        for offset in 1..pathlen {
            let ancestor = target.prefix(pathlen - offset);
            let mut now_empty = false;
            if let Some(ancestor_map) = self.pathindex.get_mut(&ancestor) {
                for (depth, oidset) in &items {
                    let level = depth + offset as u32;
                    if let Some(bucket) = ancestor_map.get_mut(&level) {
                        for oid in oidset {
                            bucket.remove(oid);
                        }
                        if bucket.is_empty() {
                            ancestor_map.remove(&level);
                        }
                    }
                }
                now_empty = ancestor_map.is_empty();
            }
            if now_empty {
                self.pathindex.remove(&ancestor);
            }
        }

        if references {
            self.references.remove(&removed);
        }

        self.dirty.store(true, Ordering::Relaxed);
        log::debug!(
            "remove: evicted {} oid(s) rooted at {target} (references={references})",
            removed.len()
        );

        #[cfg(debug_assertions)]
        self.debug_check_invariants();

        removed
    }

    //-------- lookups -------------------------------------------------------

    fn resolve_origin<N: ObjectNode>(&self, handle: Handle<'_, N>) -> Option<Path> {
        match handle {
            Handle::Node(node) => Some(node_path(node)),
            Handle::Oid(oid) => self.id_to_path.get(&oid).cloned(),
            Handle::Path(path) => Some(path),
        }
    }

    /// Returns the oid for a node or a path tuple, or `None` if unregistered.
    pub fn objectid_for<N: ObjectNode>(&self, handle: Handle<'_, N>) -> Option<Oid> {
        match handle {
            Handle::Oid(oid) => self.id_to_path.contains_key(&oid).then_some(oid),
            other => {
                let path = self.resolve_origin(other)?;
                self.path_to_id.get(&path).copied()
            }
        }
    }

    /// Returns the path tuple for an oid, or `None` if unregistered.
    pub fn path_for(&self, oid: Oid) -> Option<Path> {
        self.id_to_path.get(&oid).cloned()
    }

    /// Resolves an oid or path tuple to a live node via `resolver`,
    /// absorbing any traversal failure into `None`.
    pub fn object_for<N: ObjectNode>(
        &self,
        handle: Handle<'_, N>,
        origin: &N,
        resolver: &impl Resolver<N>,
    ) -> Option<N> {
        let path = self.resolve_origin(handle)?;
        resolver.resolve(origin, &path)
    }

    /// The set of oids whose path has `origin` as a prefix, at relative
    /// depth in `[include_origin ? 0 : 1, depth]` (or unbounded if `depth`
    /// is `None`).
    pub fn pathlookup<N: ObjectNode>(
        &self,
        origin: Handle<'_, N>,
        depth: Option<u32>,
        include_origin: bool,
    ) -> BTreeSet<Oid> {
        let Some(path) = self.resolve_origin(origin) else {
            return BTreeSet::new();
        };
        let Some(omap) = self.pathindex.get(&path) else {
            return BTreeSet::new();
        };

        let mut result = BTreeSet::new();
        match depth {
            None => {
                for (&d, oidset) in omap.iter() {
                    if d == 0 && !include_origin {
                        continue;
                    }
                    result.extend(oidset.iter().copied());
                }
            }
            Some(max_depth) => {
                for d in 0..=max_depth {
                    if d == 0 && !include_origin {
                        continue;
                    }
                    if let Some(oidset) = omap.get(&d) {
                        result.extend(oidset.iter().copied());
                    }
                }
            }
        }
        result
    }

    /// Recursive enumeration of immediate children as a tree of
    /// `{path, name, children}` records, for UI navigation. `depth = 1`
    /// yields the origin's direct children with no grandchildren; the
    /// recursion terminates when the remaining depth would go below zero.
    pub fn navgen<N: ObjectNode>(&self, origin: Handle<'_, N>, depth: i64) -> Vec<NavNode> {
        match self.resolve_origin(origin) {
            Some(path) => self.navgen_path(&path, depth),
            None => Vec::new(),
        }
    }

    fn navgen_path(&self, path: &Path, depth: i64) -> Vec<NavNode> {
        let Some(omap) = self.pathindex.get(path) else {
            return Vec::new();
        };
        let Some(oidset) = omap.get(&1) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let newdepth = depth - 1;
        if newdepth > -1 {
            for &oid in oidset {
                if let Some(child_path) = self.id_to_path.get(&oid) {
                    result.push(NavNode {
                        path: child_path.clone(),
                        name: child_path.last().unwrap_or("").to_owned(),
                        children: self.navgen_path(child_path, newdepth),
                    });
                }
            }
        }
        result
    }

    //-------- references -----------------------------------------------------

    fn ensure_registered(&self, oid: Oid) -> Result<(), ObjectMapError> {
        if self.id_to_path.contains_key(&oid) {
            Ok(())
        } else {
            Err(ObjectMapError::UnregisteredOid(oid))
        }
    }

    pub fn connect(&mut self, source: Oid, target: Oid, reftype: R) -> Result<(), ObjectMapError> {
        self.ensure_registered(source)?;
        self.ensure_registered(target)?;
        self.references.connect(source, target, reftype);
        self.dirty.store(true, Ordering::Relaxed);
        Ok(())
    }

    pub fn disconnect(
        &mut self,
        source: Oid,
        target: Oid,
        reftype: R,
    ) -> Result<(), ObjectMapError> {
        self.ensure_registered(source)?;
        self.ensure_registered(target)?;
        self.references.disconnect(source, target, reftype);
        self.dirty.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Snapshot copy: the caller may iterate and `disconnect` without
    /// disturbing iteration.
    pub fn sourceids(&self, oid: Oid, reftype: &R) -> Result<BTreeSet<Oid>, ObjectMapError> {
        self.ensure_registered(oid)?;
        Ok(self.references.sourceids(oid, reftype))
    }

    /// Snapshot copy: the caller may iterate and `disconnect` without
    /// disturbing iteration.
    pub fn targetids(&self, oid: Oid, reftype: &R) -> Result<BTreeSet<Oid>, ObjectMapError> {
        self.ensure_registered(oid)?;
        Ok(self.references.targetids(oid, reftype))
    }

    /// A lazy, restartable sequence resolving `sourceids(oid, reftype)` to
    /// live nodes on demand.
    pub fn sources<'a, N: ObjectNode, Res: Resolver<N>>(
        &'a self,
        oid: Oid,
        reftype: &R,
        origin: &'a N,
        resolver: &'a Res,
    ) -> Result<LazyRefs<'a, N, Res>, ObjectMapError> {
        let oids = self.sourceids(oid, reftype)?;
        Ok(LazyRefs {
            remaining: oids.into_iter(),
            id_to_path: &self.id_to_path,
            origin,
            resolver,
        })
    }

    /// A lazy, restartable sequence resolving `targetids(oid, reftype)` to
    /// live nodes on demand.
    pub fn targets<'a, N: ObjectNode, Res: Resolver<N>>(
        &'a self,
        oid: Oid,
        reftype: &R,
        origin: &'a N,
        resolver: &'a Res,
    ) -> Result<LazyRefs<'a, N, Res>, ObjectMapError> {
        let oids = self.targetids(oid, reftype)?;
        Ok(LazyRefs {
            remaining: oids.into_iter(),
            id_to_path: &self.id_to_path,
            origin,
            resolver,
        })
    }

    #[cfg(debug_assertions)]
    fn debug_check_invariants(&self) {
        for (oid, path) in &self.id_to_path {
            debug_assert_eq!(
                self.path_to_id.get(path),
                Some(oid),
                "id_to_path/path_to_id disagree for oid {oid}"
            );
            debug_assert!(
                self.pathindex
                    .get(path)
                    .and_then(|m| m.get(&0))
                    .is_some_and(|set| set.contains(oid)),
                "oid {oid} missing from its own path-index bucket"
            );
        }
        for depthmap in self.pathindex.values() {
            debug_assert!(!depthmap.is_empty(), "empty depth map left in place");
            for oidset in depthmap.values() {
                debug_assert!(!oidset.is_empty(), "empty inner set left in place");
            }
        }
    }
}

impl<R: Ord + Clone> Default for ObjectMap<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`ObjectMap::sources`]/[`ObjectMap::targets`]: a
/// snapshot of oids, resolved to live nodes one at a time. Traversal
/// failures are skipped rather than surfaced.
pub struct LazyRefs<'a, N, Res> {
    remaining: std::collections::btree_set::IntoIter<Oid>,
    id_to_path: &'a BTreeMap<Oid, Path>,
    origin: &'a N,
    resolver: &'a Res,
}

impl<'a, N, Res: Resolver<N>> Iterator for LazyRefs<'a, N, Res> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        for oid in self.remaining.by_ref() {
            if let Some(path) = self.id_to_path.get(&oid) {
                if let Some(node) = self.resolver.resolve(self.origin, path) {
                    return Some(node);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestNode;

    fn chain(segments: &[&str]) -> TestNode {
        let mut node = TestNode::new(segments[0]);
        for seg in &segments[1..] {
            node = TestNode::with_parent(*seg, node);
        }
        node
    }

    #[test]
    fn add_then_remove_clears_the_bijection_and_the_path_index() {
        let mut map: ObjectMap<&str> = ObjectMap::new();
        let mut node = chain(&["", "a", "b"]);
        let oid = map.add(&mut node, Path::from_segments(["", "a", "b"]), false).unwrap();
        assert_eq!(map.path_for(oid), Some(Path::from_segments(["", "a", "b"])));

        let removed = map.remove::<TestNode>(Handle::Oid(oid), true).unwrap();
        assert_eq!(removed, BTreeSet::from([oid]));
        assert_eq!(map.path_for(oid), None);
        assert!(map.is_empty());
    }

    #[test]
    fn replace_oid_stamps_a_fresh_oid_even_if_the_old_one_is_free() {
        let mut map: ObjectMap<&str> = ObjectMap::new();
        let mut node = chain(&["", "a"]);
        let first = map.add(&mut node, Path::from_segments(["", "a"]), false).unwrap();
        map.remove::<TestNode>(Handle::Oid(first), true).unwrap();

        let second = map.add(&mut node, Path::from_segments(["", "a"]), true).unwrap();
        assert_ne!(first, second);
        assert_eq!(node.oid(), Some(second));
    }

    #[test]
    fn dirty_flag_tracks_mutations() {
        let mut map: ObjectMap<&str> = ObjectMap::new();
        assert!(!map.is_dirty());
        let mut node = chain(&["", "a"]);
        map.add(&mut node, Path::from_segments(["", "a"]), false).unwrap();
        assert!(map.take_dirty());
        assert!(!map.is_dirty());
    }
}

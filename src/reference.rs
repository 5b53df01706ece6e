//------------ ReferenceSet / ReferenceMap ----------------------------------
//
// A bidirectional multimap between oids for a single reference type
// (`ReferenceSet`), and the mapping from reference-type key to
// `ReferenceSet` (`ReferenceMap`), kept over `BTreeMap`/`BTreeSet` for
// ordered, snapshot-safe iteration.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::oid::Oid;

/// The bidirectional multimap for a single reference type.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReferenceSet {
    src2tgt: BTreeMap<Oid, BTreeSet<Oid>>,
    tgt2src: BTreeMap<Oid, BTreeSet<Oid>>,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: re-inserting an existing edge is a no-op.
    pub fn connect(&mut self, source: Oid, target: Oid) {
        self.src2tgt.entry(source).or_default().insert(target);
        self.tgt2src.entry(target).or_default().insert(source);
    }

    /// Missing-edge disconnection silently succeeds. Empty inner sets are
    /// dropped eagerly here; both sides are pruned together so the two
    /// maps stay mutually consistent.
    pub fn disconnect(&mut self, source: Oid, target: Oid) {
        if let Some(targets) = self.src2tgt.get_mut(&source) {
            targets.remove(&target);
            if targets.is_empty() {
                self.src2tgt.remove(&source);
            }
        }
        if let Some(sources) = self.tgt2src.get_mut(&target) {
            sources.remove(&source);
            if sources.is_empty() {
                self.tgt2src.remove(&target);
            }
        }
    }

    /// Snapshot copy; callers may `disconnect` while iterating the result.
    pub fn targetids(&self, oid: Oid) -> BTreeSet<Oid> {
        self.src2tgt.get(&oid).cloned().unwrap_or_default()
    }

    /// Snapshot copy; callers may `disconnect` while iterating the result.
    pub fn sourceids(&self, oid: Oid) -> BTreeSet<Oid> {
        self.tgt2src.get(&oid).cloned().unwrap_or_default()
    }

    /// Evict every oid in `oids` as both source and target. Returns the
    /// subset that was actually present on at least one side.
    pub fn remove(&mut self, oids: &BTreeSet<Oid>) -> BTreeSet<Oid> {
        let mut removed = BTreeSet::new();

        for &oid in oids {
            if let Some(targets) = self.src2tgt.remove(&oid) {
                removed.insert(oid);
                for target in targets {
                    if let Some(sources) = self.tgt2src.get_mut(&target) {
                        sources.remove(&oid);
                        if sources.is_empty() {
                            self.tgt2src.remove(&target);
                        }
                    }
                }
            }
            if let Some(sources) = self.tgt2src.remove(&oid) {
                removed.insert(oid);
                for source in sources {
                    if let Some(targets) = self.src2tgt.get_mut(&source) {
                        targets.remove(&oid);
                        if targets.is_empty() {
                            self.src2tgt.remove(&source);
                        }
                    }
                }
            }
        }

        removed
    }

    #[cfg(test)]
    fn both_sides_agree(&self) -> bool {
        for (s, targets) in &self.src2tgt {
            for t in targets {
                if !self.tgt2src.get(t).is_some_and(|srcs| srcs.contains(s)) {
                    return false;
                }
            }
        }
        for (t, sources) in &self.tgt2src {
            for s in sources {
                if !self.src2tgt.get(s).is_some_and(|tgts| tgts.contains(t)) {
                    return false;
                }
            }
        }
        true
    }
}

/// An ordered mapping from reference-type key to [`ReferenceSet`]. `R` is
/// any totally-ordered, clonable key: a short string, a tagged enum
/// variant, or a pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "R: Ord + Serialize", deserialize = "R: Ord + Deserialize<'de>"))]
pub struct ReferenceMap<R: Ord> {
    sets: BTreeMap<R, ReferenceSet>,
}

impl<R: Ord> Default for ReferenceMap<R> {
    fn default() -> Self {
        Self {
            sets: BTreeMap::new(),
        }
    }
}

impl<R: Ord + Clone> ReferenceMap<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, source: Oid, target: Oid, reftype: R) {
        self.sets.entry(reftype).or_default().connect(source, target);
    }

    pub fn disconnect(&mut self, source: Oid, target: Oid, reftype: R) {
        if let Some(set) = self.sets.get_mut(&reftype) {
            set.disconnect(source, target);
        }
    }

    pub fn targetids(&self, oid: Oid, reftype: &R) -> BTreeSet<Oid> {
        self.sets
            .get(reftype)
            .map(|set| set.targetids(oid))
            .unwrap_or_default()
    }

    pub fn sourceids(&self, oid: Oid, reftype: &R) -> BTreeSet<Oid> {
        self.sets
            .get(reftype)
            .map(|set| set.sourceids(oid))
            .unwrap_or_default()
    }

    /// Broadcast eviction of `oids` to every reference type's set.
    pub fn remove(&mut self, oids: &BTreeSet<Oid>) {
        for set in self.sets.values_mut() {
            set.remove(oids);
        }
    }
}

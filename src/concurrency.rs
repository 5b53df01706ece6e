//------------ ConcurrentObjectMap -------------------------------------------
//
// `ObjectMap` itself is deliberately bare: single-writer, cooperative,
// no internal locking. This module is the thin wrapper an embedding
// store is expected to hold around it, using `parking_lot` for
// reader/writer coordination. It adds no behavior beyond lock
// discipline: readers see a frozen snapshot, writers serialize.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::objectmap::ObjectMap;

pub struct ConcurrentObjectMap<R: Ord> {
    inner: RwLock<ObjectMap<R>>,
}

impl<R: Ord + Clone> ConcurrentObjectMap<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ObjectMap::new()),
        }
    }

    /// Acquire a read guard. Multiple readers may hold this concurrently
    /// against a consistent snapshot.
    pub fn read(&self) -> RwLockReadGuard<'_, ObjectMap<R>> {
        self.inner.read()
    }

    /// Acquire the single writer guard. Mutations performed through it
    /// are serialized with every other writer and reader.
    pub fn write(&self) -> RwLockWriteGuard<'_, ObjectMap<R>> {
        self.inner.write()
    }
}

impl<R: Ord + Clone> Default for ConcurrentObjectMap<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;
    use crate::test_support::TestNode;

    #[test]
    fn readers_see_a_consistent_snapshot_after_a_write() {
        let map: ConcurrentObjectMap<&str> = ConcurrentObjectMap::new();
        {
            let mut guard = map.write();
            let mut node = TestNode::new("a");
            guard
                .add(&mut node, Path::from_segments(["", "a"]), false)
                .unwrap();
        }
        let guard = map.read();
        assert_eq!(guard.len(), 1);
    }
}

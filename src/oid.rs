//------------ Oid (object identifier) --------------------------------------

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::path::Path;

/// A durable 64-bit object identifier. `Oid::NONE` (zero) is reserved as
/// "unresolvable / none"; no live registration ever carries it.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Oid(pub i64);

impl Oid {
    pub const NONE: Oid = Oid(0);

    pub fn is_none(self) -> bool {
        self == Oid::NONE
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Volatile allocator state for [`Oid`]s.
///
/// The cursor is drawn from a uniform random starting point in the signed
/// 64-bit range on first use and incremented thereafter; it is never
/// persisted, so a fresh process always picks a fresh starting point.
///
/// Backed by atomics rather than a `Cell` so `ObjectMap` (which embeds
/// this) stays `Sync`: it is only ever mutated from the single writer
/// `ObjectMap::add` goes through, but `Cell` would make the whole map
/// unshareable across threads even for read-only access.
#[derive(Debug, Default)]
pub(crate) struct OidAllocator {
    next: AtomicI64,
    has_next: AtomicBool,
}

impl OidAllocator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Draw an unused [`Oid`], retrying on collision with `registered`.
    pub(crate) fn allocate(&self, registered: &BTreeMap<Oid, Path>) -> Oid {
        loop {
            let candidate = if self.has_next.load(Ordering::Relaxed) {
                self.next.load(Ordering::Relaxed)
            } else {
                let n = rand::rng().random_range(i64::MIN..=i64::MAX);
                self.next.store(n, Ordering::Relaxed);
                self.has_next.store(true, Ordering::Relaxed);
                n
            };

            if candidate == i64::MAX {
                // no room to increment further from here; redraw
                self.has_next.store(false, Ordering::Relaxed);
                continue;
            }

            self.next.store(candidate + 1, Ordering::Relaxed);

            if candidate != 0 && !registered.contains_key(&Oid(candidate)) {
                log::trace!("allocated new oid {candidate}");
                return Oid(candidate);
            }

            log::debug!("oid {candidate} collided with an existing registration, retrying");
            self.has_next.store(false, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_allocates_zero() {
        let alloc = OidAllocator::new();
        let registered = BTreeMap::new();
        for _ in 0..64 {
            assert_ne!(alloc.allocate(&registered).0, 0);
        }
    }

    #[test]
    fn skips_already_registered_ids() {
        let alloc = OidAllocator::new();
        let first = alloc.allocate(&BTreeMap::new());
        let mut registered = BTreeMap::new();
        registered.insert(first, Path::from_segments(["".into()]));
        let second = alloc.allocate(&registered);
        assert_ne!(first, second);
    }
}

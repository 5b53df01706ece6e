//------------ reference properties / Multireference -------------------------
//
// Convenience wrappers over `connect`/`disconnect`/`sourceids`/`targetids`
// for the common case of a named relation owned by one side: a single
// outgoing edge (`ReferenceProperty`) or a set of them (`Multireference`).
// Expressed as explicit getter/setter structs rather than attribute
// descriptors, the natural Rust shape for this kind of accessor.

use std::collections::BTreeSet;

use crate::error::ObjectMapError;
use crate::objectmap::ObjectMap;
use crate::oid::Oid;

/// Which side of the reference a reference-property's owner sits on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Orientation {
    /// The owner is the source; the property addresses the target(s).
    Source,
    /// The owner is the target; the property addresses the source(s).
    Target,
}

/// A single-valued reference "property". At most one target (or source)
/// oid is expected to be connected at a time; setting a new one first
/// clears any existing edge.
pub struct ReferenceProperty<R> {
    owner: Oid,
    reftype: R,
    orientation: Orientation,
}

impl<R: Ord + Clone> ReferenceProperty<R> {
    pub fn new(owner: Oid, reftype: R, orientation: Orientation) -> Self {
        Self {
            owner,
            reftype,
            orientation,
        }
    }

    /// The currently connected oid, if any. Panics-free: an owner with
    /// more than one connected oid (a caller using `connect` directly
    /// alongside this property) simply yields the first in oid order.
    pub fn get(&self, map: &ObjectMap<R>) -> Result<Option<Oid>, ObjectMapError> {
        let oids = match self.orientation {
            Orientation::Source => map.targetids(self.owner, &self.reftype)?,
            Orientation::Target => map.sourceids(self.owner, &self.reftype)?,
        };
        Ok(oids.into_iter().next())
    }

    /// Replace the connected oid. `None` just clears the existing edge.
    pub fn set(&self, map: &mut ObjectMap<R>, new_value: Option<Oid>) -> Result<(), ObjectMapError> {
        self.clear(map)?;
        if let Some(value) = new_value {
            match self.orientation {
                Orientation::Source => map.connect(self.owner, value, self.reftype.clone())?,
                Orientation::Target => map.connect(value, self.owner, self.reftype.clone())?,
            }
        }
        Ok(())
    }

    pub fn clear(&self, map: &mut ObjectMap<R>) -> Result<(), ObjectMapError> {
        if let Some(existing) = self.get(map)? {
            match self.orientation {
                Orientation::Source => map.disconnect(self.owner, existing, self.reftype.clone())?,
                Orientation::Target => map.disconnect(existing, self.owner, self.reftype.clone())?,
            }
        }
        Ok(())
    }
}

/// A view over every oid connected to `owner` via `reftype`, in a given
/// orientation, with `connect`/`disconnect`/`clear` mutators.
pub struct Multireference<R> {
    owner: Oid,
    reftype: R,
    orientation: Orientation,
}

impl<R: Ord + Clone> Multireference<R> {
    pub fn new(owner: Oid, reftype: R, orientation: Orientation) -> Self {
        Self {
            owner,
            reftype,
            orientation,
        }
    }

    pub fn oids(&self, map: &ObjectMap<R>) -> Result<BTreeSet<Oid>, ObjectMapError> {
        match self.orientation {
            Orientation::Source => map.targetids(self.owner, &self.reftype),
            Orientation::Target => map.sourceids(self.owner, &self.reftype),
        }
    }

    pub fn connect(
        &self,
        map: &mut ObjectMap<R>,
        oids: impl IntoIterator<Item = Oid>,
    ) -> Result<(), ObjectMapError> {
        for oid in oids {
            match self.orientation {
                Orientation::Source => map.connect(self.owner, oid, self.reftype.clone())?,
                Orientation::Target => map.connect(oid, self.owner, self.reftype.clone())?,
            }
        }
        Ok(())
    }

    pub fn disconnect(
        &self,
        map: &mut ObjectMap<R>,
        oids: impl IntoIterator<Item = Oid>,
    ) -> Result<(), ObjectMapError> {
        for oid in oids {
            match self.orientation {
                Orientation::Source => map.disconnect(self.owner, oid, self.reftype.clone())?,
                Orientation::Target => map.disconnect(oid, self.owner, self.reftype.clone())?,
            }
        }
        Ok(())
    }

    pub fn clear(&self, map: &mut ObjectMap<R>) -> Result<(), ObjectMapError> {
        let oids = self.oids(map)?;
        self.disconnect(map, oids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;
    use crate::test_support::TestNode;

    fn registered_map() -> (ObjectMap<&'static str>, Oid, Oid, Oid) {
        let mut map = ObjectMap::new();
        let mut a = TestNode::new("a");
        let mut b = TestNode::new("b");
        let mut c = TestNode::new("c");
        let oid_a = map.add(&mut a, Path::from_segments(["", "a"]), false).unwrap();
        let oid_b = map.add(&mut b, Path::from_segments(["", "b"]), false).unwrap();
        let oid_c = map.add(&mut c, Path::from_segments(["", "c"]), false).unwrap();
        (map, oid_a, oid_b, oid_c)
    }

    #[test]
    fn single_valued_property_replaces_its_previous_edge() {
        let (mut map, a, b, c) = registered_map();
        let prop = ReferenceProperty::new(a, "owns", Orientation::Source);
        prop.set(&mut map, Some(b)).unwrap();
        assert_eq!(prop.get(&map).unwrap(), Some(b));
        prop.set(&mut map, Some(c)).unwrap();
        assert_eq!(prop.get(&map).unwrap(), Some(c));
        assert!(map.targetids(a, &"owns").unwrap().contains(&c));
        assert!(!map.targetids(a, &"owns").unwrap().contains(&b));
    }

    #[test]
    fn multireference_connects_and_clears() {
        let (mut map, a, b, c) = registered_map();
        let refs = Multireference::new(a, "members", Orientation::Source);
        refs.connect(&mut map, [b, c]).unwrap();
        assert_eq!(refs.oids(&map).unwrap(), BTreeSet::from([b, c]));
        refs.clear(&mut map).unwrap();
        assert!(refs.oids(&map).unwrap().is_empty());
    }
}

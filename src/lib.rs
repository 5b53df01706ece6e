//! A persistent, in-process index that assigns durable integer identifiers
//! to hierarchical nodes addressed by path tuples, supports sub-tree
//! lookups at arbitrary depth, and maintains a secondary index of typed,
//! directed references between identifiers.
//!
//! This is the data-structure engine of a content repository: every
//! addressable node is registered exactly once, its sub-tree membership
//! and parentage are queryable in logarithmic time, and user-defined
//! relationships (e.g. "user owns profile") survive renames and are
//! cleaned up when either endpoint is removed.
//!
//! The engine is deliberately thin collaborators-in, data-structure-out:
//! node traversal, content-type metadata, schema validation and the
//! storage substrate itself are all external concerns reached through the
//! [`ObjectNode`]/[`Resolver`] traits (see the [`node`] module).

#![allow(clippy::type_complexity)]

pub mod concurrency;
pub mod error;
pub mod node;
pub mod oid;
pub mod path;
pub mod reference;
pub mod refprop;
pub mod test_support;

mod objectmap;

pub use concurrency::ConcurrentObjectMap;
pub use error::{FatalError, FatalResult, ObjectMapError};
pub use node::{node_path, Handle, ObjectNode, Resolver};
pub use objectmap::{LazyRefs, NavNode, ObjectMap};
pub use oid::Oid;
pub use path::Path;
pub use reference::{ReferenceMap, ReferenceSet};
pub use refprop::{Multireference, Orientation, ReferenceProperty};

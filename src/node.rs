//------------ ObjectNode / Handle / Resolver -------------------------------
//
// The object map never owns or allocates the nodes it indexes; it reaches
// them only through these small capability traits. A node's parent and
// name are read live on every call rather than cached, so renames and
// reparenting are reflected without any explicit invalidation step.

use crate::oid::Oid;
use crate::path::Path;

/// The attributes the object map needs to read and write on a tree node.
/// Implemented by the embedder's own node type.
pub trait ObjectNode {
    /// The oid stamped on this node, if any.
    fn oid(&self) -> Option<Oid>;

    /// Stamp (or overwrite) this node's oid.
    fn set_oid(&mut self, oid: Oid);

    /// The node's parent, absent at the root.
    fn parent(&self) -> Option<&Self>
    where
        Self: Sized;

    /// This node's own path segment (its name within its parent).
    fn name(&self) -> &str;
}

/// Walk `node`'s parent chain to build its full path tuple, root-first.
pub fn node_path<N: ObjectNode>(node: &N) -> Path {
    let mut segments = Vec::new();
    segments.push(node.name().to_owned().into_boxed_str());
    let mut cursor = node;
    while let Some(parent) = cursor.parent() {
        segments.push(parent.name().to_owned().into_boxed_str());
        cursor = parent;
    }
    segments.reverse();
    Path::from_segments(segments)
}

/// Resolves a path tuple, relative to some starting node, to a live node.
/// The only collaborator used by `ObjectMap::object_for`. Implementations
/// should return `None` rather than raise on a missing node; the map
/// absorbs traversal failures rather than surfacing them as errors.
pub trait Resolver<N> {
    fn resolve(&self, origin: &N, path: &Path) -> Option<N>;
}

/// Tagged union of the three ways a caller may address a registered node:
/// by the node itself, by its oid, or by its path tuple.
pub enum Handle<'n, N> {
    Node(&'n N),
    Oid(Oid),
    Path(Path),
}

impl<'n, N> From<Oid> for Handle<'n, N> {
    fn from(oid: Oid) -> Self {
        Handle::Oid(oid)
    }
}

impl<'n, N> From<Path> for Handle<'n, N> {
    fn from(path: Path) -> Self {
        Handle::Path(path)
    }
}

impl<'n, N> From<&'n N> for Handle<'n, N> {
    fn from(node: &'n N) -> Self {
        Handle::Node(node)
    }
}

//------------ test support types --------------------------------------------
//
// A minimal `ObjectNode`/`Resolver` pair used by this crate's own tests
// and doctests. Shipped as a plain public module (not `#[cfg(test)]`) so
// downstream integration tests can reuse it too.

use std::collections::BTreeMap;

use crate::node::{ObjectNode, Resolver};
use crate::oid::Oid;
use crate::path::Path;

/// A bare tree node: a name, an optional stamped oid, and an owned
/// parent chain (each node carries a copy of its ancestors, which is
/// wasteful for a real tree but keeps `node_path` exercising the same
/// traversal a real `ObjectNode` implementor would do).
#[derive(Debug, Clone, Default)]
pub struct TestNode {
    oid: Option<Oid>,
    name: String,
    parent: Option<Box<TestNode>>,
}

impl TestNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            oid: None,
            name: name.into(),
            parent: None,
        }
    }

    pub fn with_parent(name: impl Into<String>, parent: TestNode) -> Self {
        Self {
            oid: None,
            name: name.into(),
            parent: Some(Box::new(parent)),
        }
    }
}

impl ObjectNode for TestNode {
    fn oid(&self) -> Option<Oid> {
        self.oid
    }

    fn set_oid(&mut self, oid: Oid) {
        self.oid = Some(oid);
    }

    fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Resolves paths against a flat table, ignoring `origin` entirely.
/// Stands in for the real traversal function an embedder supplies.
#[derive(Debug, Default)]
pub struct PathTable(pub BTreeMap<Path, TestNode>);

impl Resolver<TestNode> for PathTable {
    fn resolve(&self, _origin: &TestNode, path: &Path) -> Option<TestNode> {
        self.0.get(path).cloned()
    }
}

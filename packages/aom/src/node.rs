use std::collections::HashMap;
use std::fmt;

use crate::event::{EventKind, Listener};
use crate::kind::Kind;

/// Node identifier, unique within its owning context
pub type NodeId = String;

/// A node in the document tree arena
///
/// `parent` and `article` are relations, not ownership; `children` is the
/// exclusive-ownership edge. The `article` back-reference is cached on every
/// node and eagerly propagated whenever a subtree is attached or detached.
pub struct Node {
    pub id: NodeId,
    pub kind: Kind,
    pub parent: Option<NodeId>,
    pub article: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub(crate) listeners: HashMap<EventKind, Vec<Listener>>,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: Kind) -> Self {
        Self {
            id,
            kind,
            parent: None,
            article: None,
            children: Vec::new(),
            listeners: HashMap::new(),
        }
    }

    pub(crate) fn listeners_for(&self, kind: EventKind) -> Vec<Listener> {
        self.listeners.get(&kind).cloned().unwrap_or_default()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("article", &self.article)
            .field("children", &self.children)
            .field(
                "listeners",
                &self.listeners.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}

/// An owned subtree extracted from the arena by a detach operation
///
/// Its ids are no longer registered; `Aom::restore` re-registers the whole
/// subtree for re-insertion. Dropping a `Detached` releases the subtree for
/// good.
pub struct Detached {
    pub id: NodeId,
    pub kind: Kind,
    pub children: Vec<Detached>,
    pub(crate) listeners: HashMap<EventKind, Vec<Listener>>,
}

impl Detached {
    /// Collect every id in this subtree, depth-first
    pub fn ids(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<NodeId>) {
        out.push(self.id.clone());
        for child in &self.children {
            child.collect_ids(out);
        }
    }
}

impl fmt::Debug for Detached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detached")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("children", &self.children)
            .finish()
    }
}

use std::rc::Rc;

use crate::aom::Aom;
use crate::node::NodeId;

/// Event kinds dispatched by tree mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    AppendChild,
    PrependChild,
    InsertChild,
    RemoveChild,
    SpliceChildren,
    Delete,
    /// Wrapper dispatched on each ancestor of a mutated node; its payload is
    /// the event from one level below
    ChildEvent,
}

/// A structural or content change notification
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    /// The node the event was dispatched on
    pub target: NodeId,
    pub payload: EventPayload,
}

#[derive(Debug, Clone)]
pub enum EventPayload {
    None,
    /// Nodes attached or detached by the operation
    Nodes(Vec<NodeId>),
    /// The whole shape of a spliceChildren call
    Splice {
        start: usize,
        removed: Vec<NodeId>,
        inserted: Vec<NodeId>,
    },
    /// Position argument of a partial delete
    Position(usize),
    /// The wrapped event of a ChildEvent
    Child(Box<Event>),
}

impl Event {
    /// Unwrap nested ChildEvent wrappers down to the original event
    pub fn original(&self) -> &Event {
        match &self.payload {
            EventPayload::Child(inner) => inner.original(),
            _ => self,
        }
    }

    /// Number of ChildEvent wrappers around the original event
    pub fn depth(&self) -> usize {
        match &self.payload {
            EventPayload::Child(inner) => 1 + inner.depth(),
            _ => 0,
        }
    }
}

/// A per-node event listener
///
/// Listeners receive the engine mutably and may themselves mutate the tree;
/// dispatch snapshots the listener list first, so re-entrant listener
/// registration cannot affect an in-progress dispatch.
pub type Listener = Rc<dyn Fn(&mut Aom, &Event)>;

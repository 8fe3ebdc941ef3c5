use std::collections::HashMap;

use crate::error::{AomError, AomResult};
use crate::event::{Event, EventKind, EventPayload, Listener};
use crate::id_generator::IdGenerator;
use crate::kind::{ArticleMeta, Kind};
use crate::node::{Detached, Node, NodeId};
use crate::registry::TypeRegistry;

/// The document tree engine
///
/// Owns the node arena (which doubles as the context-wide id index), the
/// type registry used by deserialization, and the id generator. One `Aom`
/// per independent set of documents; ids never collide within a context and
/// are never checked across contexts.
///
/// Every mutation is validated up front and either applies completely or
/// returns an error with the tree untouched.
pub struct Aom {
    pub(crate) nodes: HashMap<NodeId, Node>,
    pub(crate) registry: TypeRegistry,
    ids: IdGenerator,
}

impl Aom {
    pub fn new() -> Self {
        Self::with_registry(TypeRegistry::with_builtin_kinds())
    }

    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self {
            nodes: HashMap::new(),
            registry,
            ids: IdGenerator::new(),
        }
    }

    // ---- construction ----

    /// Build a new, unattached node with a fresh id
    pub fn build(&mut self, kind: Kind) -> NodeId {
        let mut id = self.ids.new_id();
        while self.nodes.contains_key(&id) {
            id = self.ids.new_id();
        }
        self.insert_node(id.clone(), kind);
        id
    }

    /// Build a new, unattached node under an externally supplied id
    pub fn build_with_id(&mut self, kind: Kind, id: impl Into<String>) -> AomResult<NodeId> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(AomError::id_collision(id));
        }
        self.insert_node(id.clone(), kind);
        Ok(id)
    }

    fn insert_node(&mut self, id: NodeId, kind: Kind) {
        let mut node = Node::new(id.clone(), kind);
        // an article is its own article back-reference
        if matches!(node.kind, Kind::Article(_)) {
            node.article = Some(id.clone());
        }
        self.nodes.insert(id, node);
    }

    // ---- queries ----

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, id: &str) -> AomResult<&Node> {
        self.nodes.get(id).ok_or_else(|| AomError::node_not_found(id))
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> AomResult<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| AomError::node_not_found(id))
    }

    pub fn kind(&self, id: &str) -> AomResult<&Kind> {
        Ok(&self.node(id)?.kind)
    }

    pub fn children(&self, id: &str) -> AomResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn parent(&self, id: &str) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent.clone())
    }

    pub fn article_of(&self, id: &str) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.article.clone())
    }

    /// The sibling immediately before `id`, if any
    ///
    /// Computed from the parent's children on demand; never cached.
    pub fn previous_sibling(&self, id: &str) -> Option<NodeId> {
        let parent = self.nodes.get(id)?.parent.as_ref()?;
        let siblings = &self.nodes.get(parent)?.children;
        let index = siblings.iter().position(|c| c == id)?;
        if index == 0 {
            None
        } else {
            siblings.get(index - 1).cloned()
        }
    }

    /// The sibling immediately after `id`, if any
    pub fn next_sibling(&self, id: &str) -> Option<NodeId> {
        let parent = self.nodes.get(id)?.parent.as_ref()?;
        let siblings = &self.nodes.get(parent)?.children;
        let index = siblings.iter().position(|c| c == id)?;
        siblings.get(index + 1).cloned()
    }

    // ---- article metadata ----

    pub fn article_meta(&self, id: &str) -> AomResult<&ArticleMeta> {
        match &self.node(id)?.kind {
            Kind::Article(meta) => Ok(meta),
            _ => Err(AomError::NotAnArticle { id: id.to_string() }),
        }
    }

    /// Flip the readonly flag on an article
    ///
    /// This is the one state change not guarded by the flag itself, so a
    /// readonly article can be made writable again.
    pub fn set_readonly(&mut self, id: &str, readonly: bool) -> AomResult<()> {
        match &mut self.node_mut(id)?.kind {
            Kind::Article(meta) => {
                meta.readonly = readonly;
                Ok(())
            }
            _ => Err(AomError::NotAnArticle { id: id.to_string() }),
        }
    }

    // ---- listeners ----

    pub fn add_event_listener(
        &mut self,
        id: &str,
        kind: EventKind,
        listener: Listener,
    ) -> AomResult<()> {
        self.node_mut(id)?
            .listeners
            .entry(kind)
            .or_default()
            .push(listener);
        Ok(())
    }

    /// Remove a previously added listener, matched by identity
    pub fn remove_event_listener(
        &mut self,
        id: &str,
        kind: EventKind,
        listener: &Listener,
    ) -> AomResult<()> {
        if let Some(list) = self.node_mut(id)?.listeners.get_mut(&kind) {
            if let Some(index) = list.iter().position(|l| std::rc::Rc::ptr_eq(l, listener)) {
                list.remove(index);
            }
        }
        Ok(())
    }

    // ---- mutation ----

    /// Attach nodes at the end of `parent`'s children
    pub fn append_children(&mut self, parent: &str, nodes: &[NodeId]) -> AomResult<()> {
        self.node(parent)?;
        self.ensure_writable(parent)?;
        self.validate_attachable(parent, nodes)?;

        let article = self.node(parent)?.article.clone();
        for id in nodes {
            self.node_mut(parent)?.children.push(id.clone());
            self.node_mut(id)?.parent = Some(parent.to_string());
            self.propagate_article(id, article.clone());
        }
        self.dispatch(Event {
            kind: EventKind::AppendChild,
            target: parent.to_string(),
            payload: EventPayload::Nodes(nodes.to_vec()),
        });
        Ok(())
    }

    /// Attach nodes at the front of `parent`'s children, preserving their
    /// given order
    pub fn prepend_children(&mut self, parent: &str, nodes: &[NodeId]) -> AomResult<()> {
        self.node(parent)?;
        self.ensure_writable(parent)?;
        self.validate_attachable(parent, nodes)?;

        let article = self.node(parent)?.article.clone();
        for (index, id) in nodes.iter().enumerate() {
            self.node_mut(parent)?.children.insert(index, id.clone());
            self.node_mut(id)?.parent = Some(parent.to_string());
            self.propagate_article(id, article.clone());
        }
        self.dispatch(Event {
            kind: EventKind::PrependChild,
            target: parent.to_string(),
            payload: EventPayload::Nodes(nodes.to_vec()),
        });
        Ok(())
    }

    /// Attach `node` just after `anchor` in `parent`'s children
    ///
    /// A no-op when the anchor is not among the parent's children.
    pub fn insert_child_after(&mut self, parent: &str, node: &str, anchor: &str) -> AomResult<()> {
        self.insert_adjacent(parent, node, anchor, 1)
    }

    /// Attach `node` just before `anchor` in `parent`'s children
    pub fn insert_child_before(&mut self, parent: &str, node: &str, anchor: &str) -> AomResult<()> {
        self.insert_adjacent(parent, node, anchor, 0)
    }

    fn insert_adjacent(
        &mut self,
        parent: &str,
        node: &str,
        anchor: &str,
        offset: usize,
    ) -> AomResult<()> {
        self.node(parent)?;
        self.ensure_writable(parent)?;

        let index = match self.node(parent)?.children.iter().position(|c| c == anchor) {
            Some(index) => index + offset,
            None => return Ok(()),
        };
        self.validate_attachable(parent, std::slice::from_ref(&node.to_string()))?;

        let article = self.node(parent)?.article.clone();
        self.node_mut(parent)?.children.insert(index, node.to_string());
        self.node_mut(node)?.parent = Some(parent.to_string());
        self.propagate_article(node, article);
        self.dispatch(Event {
            kind: EventKind::InsertChild,
            target: parent.to_string(),
            payload: EventPayload::Nodes(vec![node.to_string()]),
        });
        Ok(())
    }

    /// Detach `child` from `parent`, deregister its whole subtree, and hand
    /// it back as an owned value
    pub fn remove_child(&mut self, parent: &str, child: &str) -> AomResult<Detached> {
        self.node(parent)?;
        self.ensure_writable(parent)?;

        let index = self
            .node(parent)?
            .children
            .iter()
            .position(|c| c == child)
            .ok_or_else(|| AomError::node_not_found(child))?;

        self.node_mut(parent)?.children.remove(index);
        self.node_mut(child)?.parent = None;
        self.propagate_article(child, None);
        let detached = self.extract_subtree(child)?;

        self.dispatch(Event {
            kind: EventKind::RemoveChild,
            target: parent.to_string(),
            payload: EventPayload::Nodes(vec![child.to_string()]),
        });
        Ok(detached)
    }

    /// Array-splice semantics over `parent`'s children
    ///
    /// Omitting `delete_count` removes everything from `start` to the end.
    /// Removed children are detached and deregistered, and returned in their
    /// original order; `items` are attached in their place. One event
    /// describes the whole operation.
    pub fn splice_children(
        &mut self,
        parent: &str,
        start: usize,
        delete_count: Option<usize>,
        items: &[NodeId],
    ) -> AomResult<Vec<Detached>> {
        self.node(parent)?;
        self.ensure_writable(parent)?;
        self.validate_attachable(parent, items)?;

        let len = self.node(parent)?.children.len();
        let start = start.min(len);
        let count = delete_count.unwrap_or(len - start).min(len - start);

        let removed: Vec<NodeId> = self.node(parent)?.children[start..start + count].to_vec();
        self.node_mut(parent)?
            .children
            .splice(start..start + count, items.iter().cloned());

        for id in &removed {
            self.node_mut(id)?.parent = None;
            self.propagate_article(id, None);
        }
        let article = self.node(parent)?.article.clone();
        for id in items {
            self.node_mut(id)?.parent = Some(parent.to_string());
            self.propagate_article(id, article.clone());
        }

        let mut detached = Vec::with_capacity(removed.len());
        for id in &removed {
            detached.push(self.extract_subtree(id)?);
        }

        self.dispatch(Event {
            kind: EventKind::SpliceChildren,
            target: parent.to_string(),
            payload: EventPayload::Splice {
                start,
                removed,
                inserted: items.to_vec(),
            },
        });
        Ok(detached)
    }

    /// Remove a node from its parent, or apply a kind-specific partial edit
    ///
    /// A `position` of zero deletes the whole node (returning its subtree).
    /// On text-carrying kinds a non-zero position instead removes the
    /// character at `position - 1`, leaving the node in place.
    pub fn delete(&mut self, id: &str, position: usize) -> AomResult<Option<Detached>> {
        if position > 0 && self.node(id)?.kind.is_text_like() {
            self.ensure_writable(id)?;
            let node = self.node_mut(id)?;
            let text = match &mut node.kind {
                Kind::Text { text } | Kind::TextNormal { text } | Kind::Vector { text } => text,
                _ => return Ok(None),
            };
            match text.char_indices().nth(position - 1) {
                Some((byte_index, _)) => {
                    text.remove(byte_index);
                }
                None => return Ok(None),
            }
            self.dispatch(Event {
                kind: EventKind::Delete,
                target: id.to_string(),
                payload: EventPayload::Position(position),
            });
            return Ok(None);
        }

        match self.node(id)?.parent.clone() {
            Some(parent) => self.remove_child(&parent, id).map(Some),
            None => {
                self.ensure_writable(id)?;
                self.propagate_article(id, None);
                Ok(Some(self.extract_subtree(id)?))
            }
        }
    }

    /// Re-register a detached subtree as a fresh unattached node
    ///
    /// All-or-nothing: if any id in the subtree is already registered,
    /// nothing is inserted.
    pub fn restore(&mut self, detached: Detached) -> AomResult<NodeId> {
        let ids = detached.ids();
        let mut seen = std::collections::HashSet::new();
        for id in &ids {
            if self.nodes.contains_key(id) || !seen.insert(id) {
                return Err(AomError::id_collision(id.clone()));
            }
        }
        Ok(self.insert_detached(detached, None))
    }

    fn insert_detached(&mut self, detached: Detached, parent: Option<NodeId>) -> NodeId {
        let id = detached.id.clone();
        let mut node = Node::new(id.clone(), detached.kind);
        node.listeners = detached.listeners;
        node.parent = parent;
        if matches!(node.kind, Kind::Article(_)) {
            node.article = Some(id.clone());
        }
        node.children = detached.children.iter().map(|c| c.id.clone()).collect();
        self.nodes.insert(id.clone(), node);
        for child in detached.children {
            self.insert_detached(child, Some(id.clone()));
        }
        id
    }

    // ---- internals ----

    /// Fail with ReadonlyViolation when the owning article is readonly
    fn ensure_writable(&self, id: &str) -> AomResult<()> {
        let node = self.node(id)?;
        if let Some(article_id) = &node.article {
            if let Some(article) = self.nodes.get(article_id) {
                if let Kind::Article(meta) = &article.kind {
                    if meta.readonly {
                        return Err(AomError::ReadonlyViolation {
                            article: article_id.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_attachable(&self, parent: &str, nodes: &[NodeId]) -> AomResult<()> {
        for (index, id) in nodes.iter().enumerate() {
            let node = self.node(id)?;
            if node.parent.is_some() || nodes[..index].contains(id) {
                return Err(AomError::AlreadyAttached { id: id.clone() });
            }
            if id == parent || self.is_ancestor(id, parent) {
                return Err(AomError::CycleDetected { id: id.clone() });
            }
        }
        Ok(())
    }

    fn is_ancestor(&self, candidate: &str, of: &str) -> bool {
        let mut current = self.nodes.get(of).and_then(|n| n.parent.clone());
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent.clone());
        }
        false
    }

    /// Set the cached article reference on a subtree, maintaining the
    /// maketitles registration of any MakeTitle nodes inside it
    ///
    /// Articles keep themselves as their own reference and are not
    /// descended into.
    pub(crate) fn propagate_article(&mut self, start: &str, article: Option<NodeId>) {
        let mut stack = vec![start.to_string()];
        while let Some(id) = stack.pop() {
            let (old, is_maketitle) = {
                let Some(node) = self.nodes.get_mut(&id) else {
                    continue;
                };
                if matches!(node.kind, Kind::Article(_)) {
                    continue;
                }
                let old = node.article.clone();
                if old == article {
                    continue;
                }
                node.article = article.clone();
                stack.extend(node.children.iter().cloned());
                (old, matches!(node.kind, Kind::MakeTitle))
            };
            if is_maketitle {
                if let Some(old_article) = old {
                    if let Some(Kind::Article(meta)) =
                        self.nodes.get_mut(&old_article).map(|n| &mut n.kind)
                    {
                        meta.maketitles.retain(|m| m != &id);
                    }
                }
                if let Some(new_article) = &article {
                    if let Some(Kind::Article(meta)) =
                        self.nodes.get_mut(new_article).map(|n| &mut n.kind)
                    {
                        meta.maketitles.push(id.clone());
                    }
                }
            }
        }
    }

    /// Remove a subtree from the arena, releasing its ids
    fn extract_subtree(&mut self, id: &str) -> AomResult<Detached> {
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| AomError::node_not_found(id))?;
        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            children.push(self.extract_subtree(child)?);
        }
        Ok(Detached {
            id: node.id,
            kind: node.kind,
            children,
            listeners: node.listeners,
        })
    }

    /// Dispatch an event on its target, then bubble it to the root
    ///
    /// Bubbling walks the parent chain iteratively, wrapping the event as a
    /// ChildEvent at each hop. Listener lists are snapshotted per level, so
    /// a listener may add or remove listeners (or mutate the tree,
    /// re-entering dispatch) without affecting the current dispatch.
    pub(crate) fn dispatch(&mut self, event: Event) {
        let mut current = event.target.clone();
        let mut event = event;
        loop {
            let snapshot = self
                .nodes
                .get(&current)
                .map(|n| n.listeners_for(event.kind))
                .unwrap_or_default();
            for listener in snapshot {
                listener(self, &event);
            }
            let parent = match self.nodes.get(&current).and_then(|n| n.parent.clone()) {
                Some(parent) => parent,
                None => break,
            };
            event = Event {
                kind: EventKind::ChildEvent,
                target: parent.clone(),
                payload: EventPayload::Child(Box::new(event)),
            };
            current = parent;
        }
    }
}

impl Default for Aom {
    fn default() -> Self {
        Self::new()
    }
}

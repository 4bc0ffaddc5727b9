//! In-memory DOM host.
//!
//! # Responsibility
//! - Provide a deterministic `Dom` implementation for native hosts and tests.
//! - Carry optional layout rectangles so native hosts can compute
//!   intersection ratios without a browser.
//!
//! # Invariants
//! - Node ids are never reused; detached nodes keep their id.
//! - Query helpers walk the tree in document (pre-)order.

use super::selector::{ElementTree, Selector};
use super::{Dom, DomError, DomResult};
use crate::reveal::geometry::Rect;
use log::warn;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Stable handle for one `MemoryDom` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element { tag: String },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    attributes: BTreeMap<String, String>,
    layout: Option<Rect>,
}

impl NodeData {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            styles: BTreeMap::new(),
            attributes: BTreeMap::new(),
            layout: None,
        }
    }

    fn text(value: &str) -> Self {
        Self {
            kind: NodeKind::Text(value.to_string()),
            ..Self::element("#text")
        }
    }

    fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }
}

#[derive(Debug, Default)]
struct Tree {
    nodes: Vec<NodeData>,
}

impl ElementTree for Tree {
    type Id = NodeId;

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    fn tag_of(&self, id: NodeId) -> &str {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag } => tag.as_str(),
            NodeKind::Text(_) => "#text",
        }
    }

    fn id_of(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].attributes.get("id").map(String::as_str)
    }

    fn has_class_of(&self, id: NodeId, class: &str) -> bool {
        self.nodes[id.0].classes.iter().any(|value| value == class)
    }
}

impl Tree {
    fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0)
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[scope.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut cursor = Some(of);
        while let Some(id) = cursor {
            if id == candidate {
                return true;
            }
            cursor = self.nodes[id.0].parent;
        }
        false
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0].children.retain(|id| *id != child);
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(value) => out.push_str(value),
            NodeKind::Element { .. } => {
                for child in &self.nodes[id.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }
}

/// Deterministic in-process DOM.
///
/// The document root is an `html` element with a `body` child.
#[derive(Debug)]
pub struct MemoryDom {
    tree: RefCell<Tree>,
    root: NodeId,
    body: NodeId,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let mut tree = Tree::default();
        let root = tree.push(NodeData::element("html"));
        let body = tree.push(NodeData::element("body"));
        tree.nodes[body.0].parent = Some(root);
        tree.nodes[root.0].children.push(body);
        Self {
            tree: RefCell::new(tree),
            root,
            body,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Builds and attaches one element; `classes` is space separated.
    pub fn add_element(
        &self,
        parent: NodeId,
        tag: &str,
        id: Option<&str>,
        classes: &str,
    ) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let mut data = NodeData::element(tag);
        data.parent = Some(parent);
        data.classes = classes.split_whitespace().map(str::to_string).collect();
        if let Some(id) = id {
            data.attributes.insert("id".to_string(), id.to_string());
        }
        let node = tree.push(data);
        tree.nodes[parent.0].children.push(node);
        node
    }

    /// Element children of `node` in order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        tree.get(node)
            .map(|data| {
                data.children
                    .iter()
                    .copied()
                    .filter(|child| tree.nodes[child.0].is_element())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().get(node).and_then(|data| data.parent)
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        let tree = self.tree.borrow();
        tree.get(node).map(|_| tree.tag_of(node).to_string())
    }

    /// Whether `node` is reachable from the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let tree = self.tree.borrow();
        tree.get(node).is_some() && tree.is_ancestor(self.root, node)
    }

    /// Assigns a document-space layout rectangle.
    pub fn set_layout(&self, node: NodeId, rect: Rect) {
        if let Some(data) = self.tree.borrow_mut().get_mut(node) {
            data.layout = Some(rect);
        }
    }

    pub fn layout(&self, node: NodeId) -> Option<Rect> {
        self.tree.borrow().get(node).and_then(|data| data.layout)
    }

    fn select(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let parsed = match Selector::parse(selector) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("event=dom_query module=dom status=error selector={selector:?} error={err}");
                return Vec::new();
            }
        };
        let tree = self.tree.borrow();
        tree.descendants(scope)
            .into_iter()
            .filter(|id| tree.nodes[id.0].is_element() && parsed.matches(&*tree, *id))
            .collect()
    }

    fn with_node(&self, node: &NodeId, f: impl FnOnce(&mut NodeData)) {
        if let Some(data) = self.tree.borrow_mut().get_mut(*node) {
            f(data);
        }
    }

    fn read_node<T>(&self, node: &NodeId, f: impl FnOnce(&NodeData) -> Option<T>) -> Option<T> {
        self.tree.borrow().get(*node).and_then(f)
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.select(self.root, selector).into_iter().next()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        self.select(self.root, selector)
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        self.select(*scope, selector).into_iter().next()
    }

    fn query_all_within(&self, scope: &NodeId, selector: &str) -> Vec<NodeId> {
        self.select(*scope, selector)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree.borrow();
        tree.descendants(self.root)
            .into_iter()
            .find(|node| tree.id_of(*node) == Some(id))
    }

    fn create_element(&self, tag: &str) -> DomResult<NodeId> {
        if tag.trim().is_empty() {
            return Err(DomError::CreateElement(tag.to_string()));
        }
        Ok(self.tree.borrow_mut().push(NodeData::element(tag)))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> DomResult<()> {
        let mut tree = self.tree.borrow_mut();
        if tree.get(*parent).is_none() {
            return Err(DomError::UnknownNode(parent.to_string()));
        }
        if tree.get(*child).is_none() {
            return Err(DomError::UnknownNode(child.to_string()));
        }
        if tree.is_ancestor(*child, *parent) {
            return Err(DomError::Mutation(format!(
                "{child} is an ancestor of {parent}"
            )));
        }
        tree.detach(*child);
        tree.nodes[child.0].parent = Some(*parent);
        tree.nodes[parent.0].children.push(*child);
        Ok(())
    }

    fn append_text(&self, parent: &NodeId, text: &str) -> DomResult<()> {
        let mut tree = self.tree.borrow_mut();
        if tree.get(*parent).is_none() {
            return Err(DomError::UnknownNode(parent.to_string()));
        }
        let mut data = NodeData::text(text);
        data.parent = Some(*parent);
        let node = tree.push(data);
        tree.nodes[parent.0].children.push(node);
        Ok(())
    }

    fn clear_children(&self, node: &NodeId) {
        let mut tree = self.tree.borrow_mut();
        let Some(data) = tree.get_mut(*node) else {
            return;
        };
        let children = std::mem::take(&mut data.children);
        for child in children {
            tree.nodes[child.0].parent = None;
        }
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        self.with_node(node, |data| {
            if !data.classes.iter().any(|value| value == class) {
                data.classes.push(class.to_string());
            }
        });
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.with_node(node, |data| data.classes.retain(|value| value != class));
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.read_node(node, |data| Some(data.classes.iter().any(|value| value == class)))
            .unwrap_or(false)
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        self.with_node(node, |data| {
            if value.is_empty() {
                data.styles.remove(property);
            } else {
                data.styles.insert(property.to_string(), value.to_string());
            }
        });
    }

    fn style(&self, node: &NodeId, property: &str) -> Option<String> {
        self.read_node(node, |data| data.styles.get(property).cloned())
    }

    fn remove_style(&self, node: &NodeId, property: &str) {
        self.with_node(node, |data| {
            data.styles.remove(property);
        });
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        self.with_node(node, |data| {
            data.attributes.insert(name.to_string(), value.to_string());
        });
    }

    fn remove_attribute(&self, node: &NodeId, name: &str) {
        self.with_node(node, |data| {
            data.attributes.remove(name);
        });
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.read_node(node, |data| data.attributes.get(name).cloned())
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        self.clear_children(node);
        if let Err(err) = self.append_text(node, text) {
            warn!("event=dom_set_text module=dom status=error error={err}");
        }
    }

    fn text(&self, node: &NodeId) -> String {
        let tree = self.tree.borrow();
        let mut out = String::new();
        if tree.get(*node).is_some() {
            tree.collect_text(*node, &mut out);
        }
        out
    }

    fn reset_form(&self, form: &NodeId) {
        let controls = self.query_all_within(form, "input, textarea, select");
        for control in controls {
            self.remove_attribute(&control, "value");
        }
    }
}

//! DOM host abstraction.
//!
//! # Responsibility
//! - Define the minimal element operations the site components need.
//! - Keep component logic independent from the browser bindings so it can be
//!   driven by `MemoryDom` in native hosts and tests.
//!
//! # Invariants
//! - Node handles are cheap to clone and compare by identity.
//! - Query results are returned in document order.
//! - Mutations never panic; fallible host operations return `DomError`.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

mod memory;
mod selector;

pub use memory::{MemoryDom, NodeId};
pub use selector::{Selector, SelectorError};

pub type DomResult<T> = Result<T, DomError>;

/// Failure reported by a DOM host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// Element creation was rejected by the host.
    CreateElement(String),
    /// Tree mutation (append/remove) was rejected by the host.
    Mutation(String),
    /// Unknown node handle for this host.
    UnknownNode(String),
}

impl Display for DomError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateElement(tag) => write!(f, "failed to create element `{tag}`"),
            Self::Mutation(details) => write!(f, "dom mutation failed: {details}"),
            Self::UnknownNode(node) => write!(f, "unknown dom node: {node}"),
        }
    }
}

impl Error for DomError {}

/// Element operations shared by every site component.
///
/// Implementations: `MemoryDom` (native/tests) and the `web-sys` bridge.
pub trait Dom {
    /// Host element handle.
    type Node: Clone + Eq + Hash + Debug;

    /// First element in the document matching `selector`.
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;
    /// Every element in the document matching `selector`.
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Node>;
    /// First descendant of `scope` matching `selector`.
    fn query_within(&self, scope: &Self::Node, selector: &str) -> Option<Self::Node>;
    /// Every descendant of `scope` matching `selector`.
    fn query_all_within(&self, scope: &Self::Node, selector: &str) -> Vec<Self::Node>;
    /// Element with the given `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Creates a detached element.
    fn create_element(&self, tag: &str) -> DomResult<Self::Node>;
    /// Appends `child` as last child of `parent`.
    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> DomResult<()>;
    /// Appends a text node to `parent`.
    fn append_text(&self, parent: &Self::Node, text: &str) -> DomResult<()>;
    /// Removes every child node of `node`.
    fn clear_children(&self, node: &Self::Node);

    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Sets one inline style property.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    /// Reads one inline style property; empty values read as `None`.
    fn style(&self, node: &Self::Node, property: &str) -> Option<String>;
    /// Clears one inline style property.
    fn remove_style(&self, node: &Self::Node, property: &str);

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&self, node: &Self::Node, name: &str);
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Replaces all children with one text node.
    fn set_text(&self, node: &Self::Node, text: &str);
    /// Concatenated text of all descendants.
    fn text(&self, node: &Self::Node) -> String;

    /// Restores a form's controls to their initial values.
    fn reset_form(&self, form: &Self::Node);

    /// Toggles `class` and returns whether it is now present.
    fn toggle_class(&self, node: &Self::Node, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }
}

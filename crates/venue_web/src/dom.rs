//! `Dom` implementation over the live browser document.
//!
//! # Responsibility
//! - Translate core element operations into `web-sys` calls.
//! - Give elements a stable identity usable as map keys.
//!
//! # Invariants
//! - The same element always maps to the same `WebNode` id.
//! - Browser exceptions are logged or mapped to `DomError`, never thrown.

use js_sys::{Object, WeakMap};
use log::debug;
use std::cell::Cell;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use venue_core::dom::{Dom, DomError, DomResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlFormElement};

/// Element handle with identity semantics.
#[derive(Clone)]
pub struct WebNode {
    id: u32,
    element: Element,
}

impl WebNode {
    pub fn element(&self) -> &Element {
        &self.element
    }
}

impl PartialEq for WebNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WebNode {}

impl Hash for WebNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for WebNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebNode({}, <{}>)", self.id, self.element.tag_name())
    }
}

/// Live document bridge.
pub struct WebDom {
    document: Document,
    ids: WeakMap,
    next_id: Cell<u32>,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            ids: WeakMap::new(),
            next_id: Cell::new(1),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Wraps `element`, assigning an id on first sight.
    pub fn wrap(&self, element: Element) -> WebNode {
        let key: &Object = element.as_ref();
        let id = match self.ids.get(key).as_f64() {
            Some(existing) => existing as u32,
            None => {
                let id = self.next_id.get();
                self.next_id.set(id.wrapping_add(1));
                self.ids.set(key, &JsValue::from(id));
                id
            }
        };
        WebNode { id, element }
    }

    /// Wraps an event target when it is an element.
    pub fn wrap_target(&self, target: Option<web_sys::EventTarget>) -> Option<WebNode> {
        target
            .and_then(|target| target.dyn_into::<Element>().ok())
            .map(|element| self.wrap(element))
    }

    fn collect(&self, list: Result<web_sys::NodeList, JsValue>, selector: &str) -> Vec<WebNode> {
        let list = match list {
            Ok(list) => list,
            Err(err) => {
                debug!("event=dom_query module=dom status=error selector={selector:?} error={err:?}");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.wrap(element))
            .collect()
    }

    fn first(&self, found: Result<Option<Element>, JsValue>, selector: &str) -> Option<WebNode> {
        match found {
            Ok(found) => found.map(|element| self.wrap(element)),
            Err(err) => {
                debug!("event=dom_query module=dom status=error selector={selector:?} error={err:?}");
                None
            }
        }
    }
}

fn js_error(err: JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"))
}

fn html(node: &WebNode) -> Option<&HtmlElement> {
    node.element.dyn_ref::<HtmlElement>()
}

impl Dom for WebDom {
    type Node = WebNode;

    fn query_selector(&self, selector: &str) -> Option<WebNode> {
        self.first(self.document.query_selector(selector), selector)
    }

    fn query_selector_all(&self, selector: &str) -> Vec<WebNode> {
        self.collect(self.document.query_selector_all(selector), selector)
    }

    fn query_within(&self, scope: &WebNode, selector: &str) -> Option<WebNode> {
        self.first(scope.element.query_selector(selector), selector)
    }

    fn query_all_within(&self, scope: &WebNode, selector: &str) -> Vec<WebNode> {
        self.collect(scope.element.query_selector_all(selector), selector)
    }

    fn element_by_id(&self, id: &str) -> Option<WebNode> {
        self.document
            .get_element_by_id(id)
            .map(|element| self.wrap(element))
    }

    fn create_element(&self, tag: &str) -> DomResult<WebNode> {
        self.document
            .create_element(tag)
            .map(|element| self.wrap(element))
            .map_err(|err| DomError::CreateElement(format!("{tag}: {}", js_error(err))))
    }

    fn append_child(&self, parent: &WebNode, child: &WebNode) -> DomResult<()> {
        parent
            .element
            .append_child(&child.element)
            .map(|_| ())
            .map_err(|err| DomError::Mutation(js_error(err)))
    }

    fn append_text(&self, parent: &WebNode, text: &str) -> DomResult<()> {
        parent
            .element
            .append_with_str_1(text)
            .map_err(|err| DomError::Mutation(js_error(err)))
    }

    fn clear_children(&self, node: &WebNode) {
        node.element.set_text_content(None);
    }

    fn add_class(&self, node: &WebNode, class: &str) {
        if let Err(err) = node.element.class_list().add_1(class) {
            debug!("event=dom_class module=dom status=error class={class:?} error={}", js_error(err));
        }
    }

    fn remove_class(&self, node: &WebNode, class: &str) {
        if let Err(err) = node.element.class_list().remove_1(class) {
            debug!("event=dom_class module=dom status=error class={class:?} error={}", js_error(err));
        }
    }

    fn has_class(&self, node: &WebNode, class: &str) -> bool {
        node.element.class_list().contains(class)
    }

    fn set_style(&self, node: &WebNode, property: &str, value: &str) {
        let Some(element) = html(node) else {
            return;
        };
        if let Err(err) = element.style().set_property(property, value) {
            debug!("event=dom_style module=dom status=error property={property} error={}", js_error(err));
        }
    }

    fn style(&self, node: &WebNode, property: &str) -> Option<String> {
        html(node)?
            .style()
            .get_property_value(property)
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn remove_style(&self, node: &WebNode, property: &str) {
        if let Some(element) = html(node) {
            let _ = element.style().remove_property(property);
        }
    }

    fn set_attribute(&self, node: &WebNode, name: &str, value: &str) {
        if let Err(err) = node.element.set_attribute(name, value) {
            debug!("event=dom_attribute module=dom status=error name={name} error={}", js_error(err));
        }
    }

    fn remove_attribute(&self, node: &WebNode, name: &str) {
        let _ = node.element.remove_attribute(name);
    }

    fn attribute(&self, node: &WebNode, name: &str) -> Option<String> {
        node.element.get_attribute(name)
    }

    fn set_text(&self, node: &WebNode, text: &str) {
        node.element.set_text_content(Some(text));
    }

    fn text(&self, node: &WebNode) -> String {
        node.element.text_content().unwrap_or_default()
    }

    fn reset_form(&self, form: &WebNode) {
        if let Some(form) = form.element.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }
}

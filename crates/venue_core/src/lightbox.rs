//! Full-screen image viewer.
//!
//! # Invariants
//! - Only the close control or a click whose target is the overlay itself
//!   closes the viewer; clicks on the image or caption never do.
//! - Opening without an image anchor is a no-op.

use crate::context::PageContext;
use crate::dom::Dom;
use log::debug;

pub const LIGHTBOX_ID: &str = "lightbox";
pub const LIGHTBOX_IMAGE_ID: &str = "lightbox-img";
pub const LIGHTBOX_CAPTION_ID: &str = "lightbox-caption";
pub const LIGHTBOX_CLOSE_SELECTOR: &str = ".lightbox-close";

#[derive(Debug, Clone)]
pub struct Lightbox<N> {
    overlay: N,
    image: Option<N>,
    caption: Option<N>,
    close_button: Option<N>,
}

impl<N: Clone + PartialEq> Lightbox<N> {
    /// Returns `None` when the page has no lightbox overlay.
    pub fn from_context(context: &PageContext<N>) -> Option<Self> {
        let overlay = context.lightbox.clone()?;
        Some(Self {
            overlay,
            image: context.lightbox_image.clone(),
            caption: context.lightbox_caption.clone(),
            close_button: context.lightbox_close.clone(),
        })
    }

    pub fn overlay(&self) -> &N {
        &self.overlay
    }

    pub fn image(&self) -> Option<&N> {
        self.image.as_ref()
    }

    pub fn close_button(&self) -> Option<&N> {
        self.close_button.as_ref()
    }

    pub fn open<D: Dom<Node = N>>(&self, dom: &D, src: &str, caption: &str) {
        let Some(image) = &self.image else {
            debug!("event=lightbox_open module=lightbox status=skipped reason=no_image");
            return;
        };
        dom.set_style(&self.overlay, "display", "block");
        dom.set_attribute(image, "src", src);
        if let Some(node) = &self.caption {
            dom.set_text(node, caption);
        }
    }

    pub fn close<D: Dom<Node = N>>(&self, dom: &D) {
        dom.set_style(&self.overlay, "display", "none");
    }

    /// Handles a click inside the overlay; returns whether it closed.
    pub fn on_overlay_click<D: Dom<Node = N>>(&self, dom: &D, target: &N) -> bool {
        if *target != self.overlay {
            return false;
        }
        self.close(dom);
        true
    }

    pub fn is_open<D: Dom<Node = N>>(&self, dom: &D) -> bool {
        dom.style(&self.overlay, "display").as_deref() == Some("block")
    }
}

#[cfg(test)]
mod tests {
    use super::Lightbox;
    use crate::context::PageContext;
    use crate::dom::{Dom, MemoryDom};

    fn page() -> MemoryDom {
        let dom = MemoryDom::new();
        let overlay = dom.add_element(dom.body(), "div", Some("lightbox"), "lightbox");
        dom.add_element(overlay, "span", None, "lightbox-close");
        dom.add_element(overlay, "img", Some("lightbox-img"), "");
        dom.add_element(overlay, "div", Some("lightbox-caption"), "");
        dom
    }

    #[test]
    fn open_sets_source_and_caption() {
        let dom = page();
        let lightbox =
            Lightbox::from_context(&PageContext::resolve(&dom)).expect("overlay present");
        lightbox.open(&dom, "/images/special1.jpg", "Weekly Special");

        assert!(lightbox.is_open(&dom));
        let image = *lightbox.image().expect("image anchor");
        assert_eq!(
            dom.attribute(&image, "src").as_deref(),
            Some("/images/special1.jpg")
        );
        let caption = dom.element_by_id("lightbox-caption").expect("caption");
        assert_eq!(dom.text(&caption), "Weekly Special");
    }

    #[test]
    fn only_overlay_target_closes() {
        let dom = page();
        let lightbox =
            Lightbox::from_context(&PageContext::resolve(&dom)).expect("overlay present");
        lightbox.open(&dom, "/a.jpg", "A");

        let image = *lightbox.image().expect("image anchor");
        assert!(!lightbox.on_overlay_click(&dom, &image));
        assert!(lightbox.is_open(&dom));

        let overlay = *lightbox.overlay();
        assert!(lightbox.on_overlay_click(&dom, &overlay));
        assert!(!lightbox.is_open(&dom));
    }

    #[test]
    fn missing_image_anchor_keeps_overlay_hidden() {
        let dom = MemoryDom::new();
        dom.add_element(dom.body(), "div", Some("lightbox"), "lightbox");
        let lightbox =
            Lightbox::from_context(&PageContext::resolve(&dom)).expect("overlay present");
        lightbox.open(&dom, "/a.jpg", "A");
        assert!(!lightbox.is_open(&dom));
        assert!(Lightbox::<crate::dom::NodeId>::from_context(&PageContext::resolve(
            &MemoryDom::new()
        ))
        .is_none());
    }
}

//! Page anchors resolved once at boot.
//!
//! # Responsibility
//! - Look up every DOM anchor the components need in one pass.
//! - Hand components explicit handles instead of ambient lookups.
//!
//! # Invariants
//! - Anchors are resolved exactly once per page; absent anchors stay `None`
//!   and disable only the component that needs them.

use crate::contact::CONTACT_FORM_ID;
use crate::dom::Dom;
use crate::install::{INSTALL_BANNER_ID, INSTALL_BUTTON_ID, INSTALL_CLOSE_ID};
use crate::lightbox::{
    LIGHTBOX_CAPTION_ID, LIGHTBOX_CLOSE_SELECTOR, LIGHTBOX_ID, LIGHTBOX_IMAGE_ID,
};
use crate::menu::{MENU_BUTTON_SELECTOR, NAV_LINKS_SELECTOR};
use crate::navbar::HEADER_SELECTOR;
use crate::reveal::{CONTENT_SELECTOR, HERITAGE_IMAGE_SELECTOR};
use crate::specials::SPECIALS_GRID_ID;
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext<N> {
    pub header: Option<N>,
    pub lightbox: Option<N>,
    pub lightbox_image: Option<N>,
    pub lightbox_caption: Option<N>,
    pub lightbox_close: Option<N>,
    pub install_banner: Option<N>,
    pub install_button: Option<N>,
    pub install_close: Option<N>,
    pub specials_grid: Option<N>,
    pub menu_button: Option<N>,
    pub nav_links: Option<N>,
    pub contact_form: Option<N>,
    pub heritage_image: Option<N>,
    /// Content elements revealed on scroll, in document order.
    pub reveal_targets: Vec<N>,
}

impl<N: Clone> PageContext<N> {
    pub fn resolve<D: Dom<Node = N>>(dom: &D) -> Self {
        let context = Self {
            header: dom.query_selector(HEADER_SELECTOR),
            lightbox: dom.element_by_id(LIGHTBOX_ID),
            lightbox_image: dom.element_by_id(LIGHTBOX_IMAGE_ID),
            lightbox_caption: dom.element_by_id(LIGHTBOX_CAPTION_ID),
            lightbox_close: dom.query_selector(LIGHTBOX_CLOSE_SELECTOR),
            install_banner: dom.element_by_id(INSTALL_BANNER_ID),
            install_button: dom.element_by_id(INSTALL_BUTTON_ID),
            install_close: dom.element_by_id(INSTALL_CLOSE_ID),
            specials_grid: dom.element_by_id(SPECIALS_GRID_ID),
            menu_button: dom.query_selector(MENU_BUTTON_SELECTOR),
            nav_links: dom.query_selector(NAV_LINKS_SELECTOR),
            contact_form: dom.element_by_id(CONTACT_FORM_ID),
            heritage_image: dom.query_selector(HERITAGE_IMAGE_SELECTOR),
            reveal_targets: dom.query_selector_all(CONTENT_SELECTOR),
        };
        debug!(
            "event=context_resolve module=context status=ok reveal_targets={} header={} lightbox={} banner={} grid={}",
            context.reveal_targets.len(),
            context.header.is_some(),
            context.lightbox.is_some(),
            context.install_banner.is_some(),
            context.specials_grid.is_some()
        );
        context
    }
}

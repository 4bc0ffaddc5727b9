//! Mobile navigation toggle.

use crate::dom::Dom;

pub const MENU_BUTTON_SELECTOR: &str = ".mobile-menu-btn";
pub const NAV_LINKS_SELECTOR: &str = ".nav-links";
const ACTIVE_CLASS: &str = "active";
const OPEN_ICON_CLASS: &str = "fa-bars";
const CLOSE_ICON_CLASS: &str = "fa-times";

#[derive(Debug, Clone)]
pub struct MobileMenu<N> {
    button: N,
    nav: N,
}

impl<N: Clone> MobileMenu<N> {
    pub fn new(button: N, nav: N) -> Self {
        Self { button, nav }
    }

    pub fn button(&self) -> &N {
        &self.button
    }

    /// Navigation links that close the menu when followed.
    pub fn links<D: Dom<Node = N>>(&self, dom: &D) -> Vec<N> {
        dom.query_all_within(&self.nav, "a")
    }

    pub fn is_open<D: Dom<Node = N>>(&self, dom: &D) -> bool {
        dom.has_class(&self.nav, ACTIVE_CLASS)
    }

    /// Flips the menu; returns whether it is now open.
    pub fn toggle<D: Dom<Node = N>>(&self, dom: &D) -> bool {
        let open = dom.toggle_class(&self.nav, ACTIVE_CLASS);
        self.sync_icon(dom, open);
        open
    }

    pub fn close<D: Dom<Node = N>>(&self, dom: &D) {
        dom.remove_class(&self.nav, ACTIVE_CLASS);
        self.sync_icon(dom, false);
    }

    fn sync_icon<D: Dom<Node = N>>(&self, dom: &D, open: bool) {
        let Some(icon) = dom.query_within(&self.button, "i") else {
            return;
        };
        let (remove, add) = if open {
            (OPEN_ICON_CLASS, CLOSE_ICON_CLASS)
        } else {
            (CLOSE_ICON_CLASS, OPEN_ICON_CLASS)
        };
        dom.remove_class(&icon, remove);
        dom.add_class(&icon, add);
    }
}

//! Page-level composition of the site components.
//!
//! # Responsibility
//! - Resolve the page context once and initialize every component against it.
//! - Expose one entry point per host event so bridges only translate events.
//!
//! # Invariants
//! - Components initialize independently; a missing anchor disables only the
//!   component that needs it.
//! - No entry point panics or fails the page; storage errors are returned to
//!   the host for logging.

use crate::config::SiteConfig;
use crate::contact::ContactForm;
use crate::context::PageContext;
use crate::dom::Dom;
use crate::install::store::{DismissalStore, StoreError};
use crate::install::{BannerAnchors, InstallAction, InstallPromptController, UserChoice};
use crate::lightbox::Lightbox;
use crate::menu::MobileMenu;
use crate::model::platform::PlatformProbe;
use crate::model::special::SpecialOffer;
use crate::navbar::{HeaderVisibility, NavbarController, ScrollSampler};
use crate::reveal::{IntersectionSample, RevealEngine, RevealKind, RevealProfile};
use crate::specials::{RenderedCard, SpecialsError, SpecialsLoader};
use log::{debug, info};
use std::time::Duration;

/// All behavior of one loaded page.
pub struct Site<D: Dom, S, C> {
    dom: D,
    config: SiteConfig,
    context: PageContext<D::Node>,
    reveal: RevealEngine<D::Node>,
    navbar: Option<NavbarController<D::Node>>,
    sampler: ScrollSampler,
    lightbox: Option<Lightbox<D::Node>>,
    specials: Option<SpecialsLoader<D::Node>>,
    install: Option<InstallPromptController<D::Node, S, C>>,
    menu: Option<MobileMenu<D::Node>>,
    contact: Option<ContactForm<D::Node>>,
}

impl<D, S, C> Site<D, S, C>
where
    D: Dom,
    S: DismissalStore,
    C: Clone,
{
    /// Initializes every component present on the page.
    pub fn boot(dom: D, config: SiteConfig, store: S) -> Self {
        let context = PageContext::resolve(&dom);

        let mut reveal = RevealEngine::new();
        let content = RevealProfile::content(&config);
        for target in &context.reveal_targets {
            reveal.observe(&dom, target.clone(), content);
        }
        if let Some(image) = &context.heritage_image {
            reveal.observe(&dom, image.clone(), RevealProfile::heritage(&config));
        }

        let install = match (&context.install_banner, &context.install_button) {
            (Some(banner), Some(install_button)) => Some(InstallPromptController::new(
                BannerAnchors {
                    banner: banner.clone(),
                    install_button: install_button.clone(),
                    close_button: context.install_close.clone(),
                },
                store,
                config.dismissal_window_ms,
            )),
            _ => None,
        };

        let menu = match (&context.menu_button, &context.nav_links) {
            (Some(button), Some(nav)) => Some(MobileMenu::new(button.clone(), nav.clone())),
            _ => None,
        };

        let contact = context.contact_form.clone().map(|form| {
            ContactForm::new(
                &dom,
                form,
                config.contact_send_delay(),
                config.contact_reset_delay(),
            )
        });

        let site = Self {
            navbar: context.header.clone().map(NavbarController::new),
            sampler: ScrollSampler::new(config.scroll_sample_interval_ms),
            lightbox: Lightbox::from_context(&context),
            specials: context.specials_grid.clone().map(SpecialsLoader::new),
            install,
            menu,
            contact,
            reveal,
            context,
            config,
            dom,
        };
        info!(
            "event=site_boot module=site status=ok components={}",
            site.active_components().join(",")
        );
        site
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn context(&self) -> &PageContext<D::Node> {
        &self.context
    }

    pub fn reveal(&self) -> &RevealEngine<D::Node> {
        &self.reveal
    }

    pub fn install(&self) -> Option<&InstallPromptController<D::Node, S, C>> {
        self.install.as_ref()
    }

    pub fn lightbox(&self) -> Option<&Lightbox<D::Node>> {
        self.lightbox.as_ref()
    }

    pub fn menu(&self) -> Option<&MobileMenu<D::Node>> {
        self.menu.as_ref()
    }

    pub fn navbar(&self) -> Option<&NavbarController<D::Node>> {
        self.navbar.as_ref()
    }

    pub fn contact(&self) -> Option<&ContactForm<D::Node>> {
        self.contact.as_ref()
    }

    /// Names of the components that found their anchors.
    pub fn active_components(&self) -> Vec<&'static str> {
        let mut active = vec!["reveal"];
        for (name, present) in [
            ("navbar", self.navbar.is_some()),
            ("specials", self.specials.is_some()),
            ("lightbox", self.lightbox.is_some()),
            ("install", self.install.is_some()),
            ("menu", self.menu.is_some()),
            ("contact", self.contact.is_some()),
        ] {
            if present {
                active.push(name);
            }
        }
        active
    }

    /// Pending reveal targets of one kind with their trigger profile.
    pub fn pending_reveals(&self, kind: RevealKind) -> Vec<(D::Node, RevealProfile)> {
        self.reveal.pending(kind)
    }

    /// Applies intersection reports; returns elements to stop observing.
    pub fn on_intersections(&mut self, samples: &[IntersectionSample<D::Node>]) -> Vec<D::Node> {
        self.reveal.evaluate(&self.dom, samples)
    }

    /// Offers one raw scroll offset to the sampled navbar.
    pub fn on_scroll(&mut self, now_ms: f64, offset: f64) -> Option<HeaderVisibility> {
        let navbar = self.navbar.as_mut()?;
        let offset = self.sampler.offer(now_ms, offset)?;
        Some(navbar.on_scroll(&self.dom, offset))
    }

    /// Processes the trailing scroll sample held back by the sampler.
    pub fn flush_scroll(&mut self, now_ms: f64) -> Option<HeaderVisibility> {
        let navbar = self.navbar.as_mut()?;
        let offset = self.sampler.flush(now_ms)?;
        Some(navbar.on_scroll(&self.dom, offset))
    }

    pub fn scroll_has_pending(&self) -> bool {
        self.sampler.has_pending()
    }

    pub fn scroll_sample_interval_ms(&self) -> f64 {
        self.sampler.interval_ms()
    }

    pub fn on_install_ready(&mut self, capability: C) -> bool {
        match self.install.as_mut() {
            Some(install) => install.capture(capability),
            None => false,
        }
    }

    pub fn on_banner_delay_elapsed(&mut self, probe: &PlatformProbe, now_ms: i64) -> bool {
        match self.install.as_mut() {
            Some(install) => install.on_delay_elapsed(&self.dom, probe, now_ms),
            None => false,
        }
    }

    pub fn on_install_click(&mut self) -> InstallAction<C> {
        match self.install.as_mut() {
            Some(install) => install.request_install(),
            None => InstallAction::Unavailable,
        }
    }

    pub fn on_install_choice(&mut self, choice: UserChoice) {
        if let Some(install) = self.install.as_mut() {
            install.resolve_choice(&self.dom, choice);
        }
    }

    pub fn on_install_close(&mut self, now_ms: i64) -> Result<(), StoreError> {
        match self.install.as_mut() {
            Some(install) => install.dismiss(&self.dom, now_ms),
            None => Ok(()),
        }
    }

    /// Renders a catalog load result; empty when the page has no grid.
    pub fn on_specials_loaded(
        &mut self,
        loaded: Result<Vec<SpecialOffer>, SpecialsError>,
    ) -> Vec<RenderedCard<D::Node>> {
        match &self.specials {
            Some(loader) => loader.render(&self.dom, loaded),
            None => {
                debug!("event=specials_render module=site status=skipped reason=no_grid");
                Vec::new()
            }
        }
    }

    pub fn open_lightbox(&self, src: &str, caption: &str) {
        if let Some(lightbox) = &self.lightbox {
            lightbox.open(&self.dom, src, caption);
        }
    }

    pub fn on_card_image_click(&self, card: &RenderedCard<D::Node>) {
        self.open_lightbox(&card.offer.image, &card.offer.title);
    }

    /// Handles a click on the overlay; `target` is the event target.
    pub fn on_lightbox_click(&self, target: &D::Node) -> bool {
        self.lightbox
            .as_ref()
            .is_some_and(|lightbox| lightbox.on_overlay_click(&self.dom, target))
    }

    pub fn on_lightbox_close(&self) {
        if let Some(lightbox) = &self.lightbox {
            lightbox.close(&self.dom);
        }
    }

    pub fn is_lightbox_open(&self) -> bool {
        self.lightbox
            .as_ref()
            .is_some_and(|lightbox| lightbox.is_open(&self.dom))
    }

    pub fn on_menu_toggle(&self) -> Option<bool> {
        self.menu.as_ref().map(|menu| menu.toggle(&self.dom))
    }

    pub fn on_menu_link(&self) {
        if let Some(menu) = &self.menu {
            menu.close(&self.dom);
        }
    }

    /// Returns the delay before `on_contact_timer` must run.
    pub fn on_contact_submit(&mut self) -> Option<Duration> {
        self.contact.as_mut()?.submit(&self.dom)
    }

    pub fn on_contact_timer(&mut self) -> Option<Duration> {
        self.contact.as_mut()?.advance(&self.dom)
    }
}

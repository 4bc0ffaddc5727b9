use venue_core::dom::{Dom, MemoryDom, NodeId};
use venue_core::install::store::MemoryDismissalStore;
use venue_core::navbar::{HIDDEN_TRANSFORM, SCROLL_DOWN_CLASS, SCROLL_UP_CLASS, SHOWN_TRANSFORM};
use venue_core::reveal::{FADE_IN_UP_CLASS, REVEAL_COLOR_CLASS};
use venue_core::specials::SPECIALS_FALLBACK_TEXT;
use venue_core::{
    HeaderVisibility, InstallAction, InstallState, IntersectionSample, PlatformProbe, RevealKind,
    Site, SiteConfig, SpecialOffer, SpecialsError, UserChoice,
};

const NOW_MS: i64 = 1_700_000_000_000;
const MINUTE_MS: i64 = 60_000;
const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0";

type TestSite = Site<MemoryDom, MemoryDismissalStore, &'static str>;

struct Page {
    header: NodeId,
    cards: Vec<NodeId>,
    heritage_image: NodeId,
    grid: NodeId,
    overlay: NodeId,
    lightbox_image: NodeId,
    banner: NodeId,
    install_button: NodeId,
    menu_icon: NodeId,
    nav_links: NodeId,
    send_button: NodeId,
}

fn build_page() -> (MemoryDom, Page) {
    let dom = MemoryDom::new();
    let body = dom.body();

    let header = dom.add_element(body, "header", None, "main-header");
    let menu_button = dom.add_element(header, "button", None, "mobile-menu-btn");
    let menu_icon = dom.add_element(menu_button, "i", None, "fas fa-bars");
    let nav_links = dom.add_element(header, "ul", None, "nav-links");
    let item = dom.add_element(nav_links, "li", None, "");
    dom.add_element(item, "a", None, "");

    let section_header = dom.add_element(body, "div", None, "section-header");
    dom.add_element(section_header, "h2", None, "");
    let cards = vec![
        dom.add_element(body, "div", None, "card"),
        dom.add_element(body, "div", None, "card"),
    ];

    let heritage = dom.add_element(body, "div", None, "heritage-image");
    let heritage_image = dom.add_element(heritage, "img", None, "");

    let grid = dom.add_element(body, "div", Some("specials-grid"), "");

    let overlay = dom.add_element(body, "div", Some("lightbox"), "lightbox");
    dom.add_element(overlay, "span", None, "lightbox-close");
    let lightbox_image = dom.add_element(overlay, "img", Some("lightbox-img"), "");
    dom.add_element(overlay, "div", Some("lightbox-caption"), "");

    let banner = dom.add_element(body, "div", Some("install-banner"), "");
    let install_button = dom.add_element(banner, "button", Some("install-btn"), "");
    dom.add_element(banner, "button", Some("close-install"), "");

    let form = dom.add_element(body, "form", Some("contactForm"), "");
    dom.add_element(form, "input", None, "");
    let send_button = dom.add_element(form, "button", None, "");
    dom.set_text(&send_button, "Send Message");

    (
        dom,
        Page {
            header,
            cards,
            heritage_image,
            grid,
            overlay,
            lightbox_image,
            banner,
            install_button,
            menu_icon,
            nav_links,
            send_button,
        },
    )
}

fn boot(store: MemoryDismissalStore) -> (TestSite, Page) {
    let (dom, page) = build_page();
    (Site::boot(dom, SiteConfig::default(), store), page)
}

fn sample(target: NodeId, ratio: f64) -> IntersectionSample<NodeId> {
    IntersectionSample {
        target,
        ratio,
        is_intersecting: ratio > 0.0,
    }
}

fn two_offers() -> Vec<SpecialOffer> {
    vec![
        SpecialOffer::new("/images/a.jpg", "A", "x"),
        SpecialOffer::new("/images/b.jpg", "B", "y"),
    ]
}

#[test]
fn boot_initializes_every_component_and_hides_content() {
    let (site, page) = boot(MemoryDismissalStore::new());
    assert_eq!(
        site.active_components(),
        vec!["reveal", "navbar", "specials", "lightbox", "install", "menu", "contact"]
    );
    for card in &page.cards {
        assert_eq!(site.dom().style(card, "visibility").as_deref(), Some("hidden"));
    }
    // section header child + two cards
    assert_eq!(site.pending_reveals(RevealKind::Content).len(), 3);
    assert_eq!(site.pending_reveals(RevealKind::Heritage).len(), 1);
}

#[test]
fn empty_page_boots_without_components() {
    let mut site: TestSite = Site::boot(
        MemoryDom::new(),
        SiteConfig::default(),
        MemoryDismissalStore::new(),
    );
    assert_eq!(site.active_components(), vec!["reveal"]);
    assert_eq!(site.on_menu_toggle(), None);
    assert_eq!(site.on_scroll(0.0, 100.0), None);
    assert!(site.on_specials_loaded(Ok(two_offers())).is_empty());
    assert_eq!(site.on_install_click(), InstallAction::Unavailable);
    site.on_install_close(NOW_MS).expect("no banner means nothing to persist");
}

#[test]
fn reveal_fires_once_and_never_reverts() {
    let (mut site, page) = boot(MemoryDismissalStore::new());
    let card = page.cards[0];

    assert!(site.on_intersections(&[sample(card, 0.05)]).is_empty());
    assert_eq!(site.on_intersections(&[sample(card, 0.5)]), vec![card]);
    assert_eq!(site.dom().style(&card, "visibility").as_deref(), Some("visible"));
    assert!(site.dom().has_class(&card, FADE_IN_UP_CLASS));

    assert!(site.on_intersections(&[sample(card, 0.0)]).is_empty());
    assert!(site.on_intersections(&[sample(card, 0.9)]).is_empty());
    assert_eq!(site.dom().style(&card, "visibility").as_deref(), Some("visible"));
    assert!(!site.reveal().is_observing(&card));
}

#[test]
fn element_already_in_view_reveals_on_first_report() {
    let (mut site, page) = boot(MemoryDismissalStore::new());
    let revealed = site.on_intersections(&[sample(page.cards[1], 1.0)]);
    assert_eq!(revealed, vec![page.cards[1]]);
}

#[test]
fn heritage_image_colors_at_quarter_visibility() {
    let (mut site, page) = boot(MemoryDismissalStore::new());
    assert!(site
        .on_intersections(&[sample(page.heritage_image, 0.2)])
        .is_empty());
    assert!(!site.dom().has_class(&page.heritage_image, REVEAL_COLOR_CLASS));

    site.on_intersections(&[sample(page.heritage_image, 0.25)]);
    assert!(site.dom().has_class(&page.heritage_image, REVEAL_COLOR_CLASS));
}

#[test]
fn banner_shows_without_dismissal_record() {
    let (mut site, page) = boot(MemoryDismissalStore::new());
    assert!(site.on_banner_delay_elapsed(&PlatformProbe::browser(DESKTOP_UA), NOW_MS));
    assert_eq!(site.dom().style(&page.banner, "display").as_deref(), Some("flex"));
    assert_eq!(
        site.dom().text(&page.install_button),
        " Install App"
    );
}

#[test]
fn banner_suppressed_thirty_minutes_after_dismissal() {
    let store = MemoryDismissalStore::dismissed_at(NOW_MS - 30 * MINUTE_MS);
    let (mut site, page) = boot(store);
    assert!(!site.on_banner_delay_elapsed(&PlatformProbe::browser(DESKTOP_UA), NOW_MS));
    assert_ne!(site.dom().style(&page.banner, "display").as_deref(), Some("flex"));
}

#[test]
fn banner_returns_sixty_one_minutes_after_dismissal() {
    let store = MemoryDismissalStore::dismissed_at(NOW_MS - 61 * MINUTE_MS);
    let (mut site, _page) = boot(store);
    assert!(site.on_banner_delay_elapsed(&PlatformProbe::browser(DESKTOP_UA), NOW_MS));
}

#[test]
fn install_prompt_and_close_flow() {
    let (mut site, page) = boot(MemoryDismissalStore::new());
    assert!(site.on_install_ready("deferred"));
    assert!(site.on_banner_delay_elapsed(&PlatformProbe::browser(DESKTOP_UA), NOW_MS));

    assert_eq!(site.on_install_click(), InstallAction::Prompt("deferred"));
    assert_eq!(site.on_install_click(), InstallAction::Unavailable);
    site.on_install_choice(UserChoice::from_outcome("accepted"));
    assert_eq!(
        site.install().map(|install| install.state()),
        Some(InstallState::Installed)
    );
    assert_eq!(site.dom().style(&page.banner, "display").as_deref(), Some("none"));

    site.on_install_close(NOW_MS + 5).expect("memory store accepts writes");
    let install = site.install().expect("install component");
    assert_eq!(install.state(), InstallState::Dismissed);
    assert!(!install.has_capability());
    assert_eq!(install.store().raw(), Some("1700000000005"));
}

#[test]
fn specials_render_cards_that_open_lightbox() {
    let (mut site, page) = boot(MemoryDismissalStore::new());
    let cards = site.on_specials_loaded(Ok(two_offers()));
    assert_eq!(cards.len(), 2);
    assert_eq!(site.dom().children(page.grid).len(), 2);

    site.on_card_image_click(&cards[1]);
    assert!(site.is_lightbox_open());
    assert_eq!(
        site.dom().attribute(&page.lightbox_image, "src").as_deref(),
        Some("/images/b.jpg")
    );

    assert!(!site.on_lightbox_click(&page.lightbox_image));
    assert!(site.is_lightbox_open());
    assert!(site.on_lightbox_click(&page.overlay));
    assert!(!site.is_lightbox_open());
}

#[test]
fn failed_fetch_renders_single_fallback() {
    let (mut site, page) = boot(MemoryDismissalStore::new());
    let cards = site.on_specials_loaded(Err(SpecialsError::Network("offline".to_string())));
    assert!(cards.is_empty());

    let children = site.dom().children(page.grid);
    assert_eq!(children.len(), 1);
    assert_eq!(site.dom().text(&children[0]), SPECIALS_FALLBACK_TEXT);
}

#[test]
fn navbar_hides_on_descent_and_shows_on_ascent() {
    let (mut site, page) = boot(MemoryDismissalStore::new());
    // Samples spaced past the sampling interval.
    assert_eq!(site.on_scroll(0.0, 0.0), Some(HeaderVisibility::Shown));
    assert_eq!(site.on_scroll(200.0, 50.0), Some(HeaderVisibility::Hidden));
    assert_eq!(site.on_scroll(400.0, 100.0), Some(HeaderVisibility::Hidden));
    assert!(site.dom().has_class(&page.header, SCROLL_DOWN_CLASS));
    assert_eq!(
        site.dom().style(&page.header, "transform").as_deref(),
        Some(HIDDEN_TRANSFORM)
    );

    assert_eq!(site.on_scroll(600.0, 80.0), Some(HeaderVisibility::Shown));
    assert!(site.dom().has_class(&page.header, SCROLL_UP_CLASS));
    assert_eq!(
        site.dom().style(&page.header, "transform").as_deref(),
        Some(SHOWN_TRANSFORM)
    );
}

#[test]
fn scroll_burst_is_sampled_with_trailing_flush() {
    let (mut site, page) = boot(MemoryDismissalStore::new());
    assert_eq!(site.on_scroll(0.0, 10.0), Some(HeaderVisibility::Hidden));
    assert_eq!(site.on_scroll(20.0, 5.0), None);
    assert!(site.scroll_has_pending());
    assert_eq!(site.flush_scroll(100.0), Some(HeaderVisibility::Shown));
    assert!(site.dom().has_class(&page.header, SCROLL_UP_CLASS));
}

#[test]
fn menu_toggle_and_link_close() {
    let (site, page) = boot(MemoryDismissalStore::new());
    assert_eq!(site.on_menu_toggle(), Some(true));
    assert!(site.dom().has_class(&page.nav_links, "active"));
    assert!(site.dom().has_class(&page.menu_icon, "fa-times"));
    site.on_menu_link();
    assert!(!site.dom().has_class(&page.nav_links, "active"));
    assert!(site.dom().has_class(&page.menu_icon, "fa-bars"));
}

#[test]
fn contact_submission_cycles_button_label() {
    let (mut site, page) = boot(MemoryDismissalStore::new());
    let send_delay = site.on_contact_submit().expect("form has a button");
    assert_eq!(send_delay, site.config().contact_send_delay());
    assert_eq!(site.dom().text(&page.send_button), "Sending...");

    let reset_delay = site.on_contact_timer().expect("sent phase follows");
    assert_eq!(reset_delay, site.config().contact_reset_delay());
    assert_eq!(site.dom().text(&page.send_button), "Message Sent!");

    assert_eq!(site.on_contact_timer(), None);
    assert_eq!(site.dom().text(&page.send_button), "Send Message");
}

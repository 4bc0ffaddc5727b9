//! Native probe for the venue site core.
//!
//! # Responsibility
//! - Verify `venue_core` linkage with deterministic smoke output.
//! - Drive a scripted page visit against the in-memory DOM host.
//! - Refresh the specials catalog from a saved social page, downloading
//!   each flyer before the catalog is rewritten.
//!
//! Usage: `venue_cli [simulate | extract-specials <page.html> <out.json>]`

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use venue_core::db::open_db;
use venue_core::dom::{Dom, MemoryDom, NodeId};
use venue_core::reveal::geometry::{Rect, Viewport};
use venue_core::specials::catalog::{
    default_catalog, encode_catalog, extract_image_urls, local_image_names, refresh_catalog,
    CatalogError,
};
use venue_core::{
    default_log_level, init_logging, parse_specials, PlatformProbe, RevealKind, Site, SiteConfig,
    SqliteDismissalStore,
};

const CLI_DB_FILE_NAME: &str = "venue_cli.sqlite3";
const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
const VIEWPORT: Viewport = Viewport {
    width: 1280.0,
    height: 800.0,
};
const SCROLL_SCRIPT: [f64; 6] = [0.0, 400.0, 900.0, 1_600.0, 1_500.0, 0.0];
const SCROLL_STEP_MS: f64 = 150.0;
const FLYER_TIMEOUT: Duration = Duration::from_secs(20);

type CliResult = Result<(), Box<dyn Error>>;

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let outcome = match args.first().map(String::as_str) {
        None => {
            smoke();
            Ok(())
        }
        Some("simulate") => simulate(),
        Some("extract-specials") => match (args.get(1), args.get(2)) {
            (Some(page), Some(out)) => extract_specials(Path::new(page), Path::new(out)),
            _ => Err("usage: venue_cli extract-specials <page.html> <out.json>".into()),
        },
        Some(other) => Err(format!("unknown command `{other}`").into()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("venue_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn smoke() {
    println!("venue_core ping={}", venue_core::ping());
    println!("venue_core version={}", venue_core::core_version());
}

fn env_path(name: &str) -> Option<PathBuf> {
    let raw = std::env::var(name).ok()?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

fn load_config() -> Result<SiteConfig, Box<dyn Error>> {
    match env_path("VENUE_CONFIG") {
        Some(path) => Ok(SiteConfig::from_json_str(&std::fs::read_to_string(path)?)?),
        None => Ok(SiteConfig::default()),
    }
}

fn simulate() -> CliResult {
    if let Some(log_dir) = env_path("VENUE_LOG_DIR") {
        init_logging(default_log_level(), &log_dir.to_string_lossy())?;
    }
    let config = load_config()?;
    let db_path =
        env_path("VENUE_DB_PATH").unwrap_or_else(|| std::env::temp_dir().join(CLI_DB_FILE_NAME));
    let conn = open_db(&db_path)?;
    let store = SqliteDismissalStore::new(&conn, config.dismissal_key.clone());

    let (dom, page) = demo_page();
    let mut site: Site<MemoryDom, SqliteDismissalStore<'_>, ()> = Site::boot(dom, config, store);
    println!("components={}", site.active_components().join(","));

    for (step, offset) in SCROLL_SCRIPT.into_iter().enumerate() {
        let now = step as f64 * SCROLL_STEP_MS;
        let header = site.on_scroll(now, offset);
        let mut samples = Vec::new();
        for kind in [RevealKind::Content, RevealKind::Heritage] {
            for (node, profile) in site.pending_reveals(kind) {
                if let Some(layout) = site.dom().layout(node) {
                    samples.push(profile.measure(node, layout, offset, VIEWPORT));
                }
            }
        }
        let revealed = site.on_intersections(&samples);
        println!(
            "scroll offset={offset} header={header:?} revealed={} pending={}",
            revealed.len(),
            site.reveal().pending_count()
        );
    }

    let now_ms = epoch_ms();
    let shown = site.on_banner_delay_elapsed(&PlatformProbe::browser(DESKTOP_UA), now_ms);
    println!(
        "install banner_shown={shown} label={:?}",
        site.dom().text(&page.install_button)
    );
    if shown {
        site.on_install_close(now_ms)?;
        println!("install dismissed_at={now_ms} db={}", db_path.display());
    }

    let body = encode_catalog(&default_catalog())?;
    let cards = site.on_specials_loaded(parse_specials(&body));
    println!("specials cards={}", cards.len());
    if let Some(card) = cards.first() {
        site.on_card_image_click(card);
        println!(
            "lightbox open={} src={:?}",
            site.is_lightbox_open(),
            site.dom().attribute(&page.lightbox_image, "src")
        );
        site.on_lightbox_click(&page.overlay);
        println!("lightbox open={}", site.is_lightbox_open());
    }

    if let Some(delay) = site.on_contact_submit() {
        println!(
            "contact label={:?} next_ms={}",
            site.dom().text(&page.send_button),
            delay.as_millis()
        );
        while let Some(delay) = site.on_contact_timer() {
            println!(
                "contact label={:?} next_ms={}",
                site.dom().text(&page.send_button),
                delay.as_millis()
            );
        }
        println!("contact label={:?}", site.dom().text(&page.send_button));
    }
    Ok(())
}

fn epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

struct DemoPage {
    overlay: NodeId,
    lightbox_image: NodeId,
    install_button: NodeId,
    send_button: NodeId,
}

/// Landing page skeleton with document-space layout.
fn demo_page() -> (MemoryDom, DemoPage) {
    let dom = MemoryDom::new();
    let body = dom.body();
    let place = |node: NodeId, top: f64, height: f64| {
        dom.set_layout(node, Rect::new(top, 40.0, 1_200.0, height));
    };

    let header = dom.add_element(body, "header", None, "main-header");
    let menu_button = dom.add_element(header, "button", None, "mobile-menu-btn");
    dom.add_element(menu_button, "i", None, "fas fa-bars");
    let nav = dom.add_element(header, "ul", None, "nav-links");
    let item = dom.add_element(nav, "li", None, "");
    dom.add_element(item, "a", None, "");

    let section_header = dom.add_element(body, "div", None, "section-header");
    let title = dom.add_element(section_header, "h2", None, "");
    place(title, 100.0, 60.0);
    for (index, top) in [700.0, 1_400.0, 2_100.0].into_iter().enumerate() {
        let card = dom.add_element(body, "div", None, "card");
        dom.set_text(&card, &format!("Menu card {}", index + 1));
        place(card, top, 300.0);
    }
    let heritage = dom.add_element(body, "div", None, "heritage-image");
    let heritage_image = dom.add_element(heritage, "img", None, "");
    place(heritage_image, 2_600.0, 400.0);

    dom.add_element(body, "div", Some("specials-grid"), "");

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
        DemoPage {
            overlay,
            lightbox_image,
            install_button,
            send_button,
        },
    )
}

fn extract_specials(page: &Path, out: &Path) -> CliResult {
    let html = std::fs::read_to_string(page)?;
    let urls = extract_image_urls(&html);
    for (url, name) in urls.iter().zip(local_image_names()) {
        println!("flyer {name} <- {url}");
    }

    let client = reqwest::blocking::Client::builder()
        .user_agent(DESKTOP_UA)
        .timeout(FLYER_TIMEOUT)
        .build()?;
    let saved = refresh_catalog(&urls, out, |url| download_flyer(&client, url))?;
    for path in &saved {
        println!("saved {}", path.display());
    }
    println!("catalog written to {}", out.display());
    Ok(())
}

fn download_flyer(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>, CatalogError> {
    let download_error = |reason: String| CatalogError::Download {
        url: url.to_string(),
        reason,
    };
    let response = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(|err| download_error(err.to_string()))?;
    let bytes = response
        .bytes()
        .map_err(|err| download_error(err.to_string()))?;
    Ok(bytes.to_vec())
}

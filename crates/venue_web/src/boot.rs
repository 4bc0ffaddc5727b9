//! Browser event wiring.
//!
//! # Responsibility
//! - Boot the core `Site` on the live document once the DOM is ready.
//! - Translate browser events, timers and futures into `Site` entry points.
//!
//! # Invariants
//! - `Site` state lives in one `Rc<RefCell<_>>`; no borrow is held across an
//!   `await` or while calling back into the browser for user interaction.
//! - Listener closures live as long as the page and are leaked on purpose.
//! - No wiring failure aborts the rest of the boot sequence.

use crate::dom::{WebDom, WebNode};
use crate::storage::LocalStorageDismissalStore;
use js_sys::{Function, Promise, Reflect};
use log::{debug, info, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use venue_core::specials::{classify_response, RenderedCard};
use venue_core::tasks::report_background_outcome;
use venue_core::{
    InstallAction, IntersectionSample, PlatformProbe, RevealKind, Site, SiteConfig, SpecialOffer,
    SpecialsError, UserChoice,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, Response, Window,
};

const STANDALONE_QUERY: &str = "(display-mode: standalone)";

/// Deferred `beforeinstallprompt` event.
type Capability = Event;
type PageSite = Site<WebDom, LocalStorageDismissalStore, Capability>;
type Shared = Rc<RefCell<PageSite>>;

/// Boots now, or on `DOMContentLoaded` while the document is still loading.
pub fn boot_when_ready(window: Window, config: SiteConfig) -> Result<(), JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("document unavailable"))?;
    if document.ready_state() != "loading" {
        boot_page(window, config);
        return Ok(());
    }

    let target: EventTarget = document.into();
    let on_ready = Closure::once_into_js(move || boot_page(window, config));
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        "DOMContentLoaded",
        on_ready.unchecked_ref(),
        &options,
    )
}

fn boot_page(window: Window, config: SiteConfig) {
    let Some(document) = window.document() else {
        warn!("event=site_boot module=web status=error reason=no_document");
        return;
    };
    let store = LocalStorageDismissalStore::new(&window, config.dismissal_key.clone());
    let specials_path = config.specials_path.clone();
    let worker_script = config.worker_script.clone();
    let banner_delay = config.banner_delay();

    let shared: Shared = Rc::new(RefCell::new(Site::boot(
        WebDom::new(document),
        config,
        store,
    )));

    for (step, outcome) in [
        ("reveal", observe_reveals(&shared)),
        ("navbar", listen_scroll(&window, &shared)),
        ("lightbox", wire_lightbox(&shared)),
        ("menu", wire_menu(&shared)),
        ("contact", wire_contact(&window, &shared)),
        ("install", wire_install(&window, &shared, banner_delay)),
        ("worker", register_worker_on_load(&window, worker_script)),
    ] {
        if let Err(err) = outcome {
            warn!(
                "event=site_wire module=web status=error step={step} error={}",
                describe(&err)
            );
        }
    }

    spawn_local(load_specials(window, shared, specials_path));
    info!("event=site_boot module=web status=ok");
}

fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"))
}

fn listen(
    target: &EventTarget,
    kind: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn set_timeout(
    window: &Window,
    delay: Duration,
    callback: impl FnOnce() + 'static,
) -> Result<i32, JsValue> {
    let callback = Closure::once_into_js(callback);
    let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay_ms,
    )
}

fn now_ms(window: &Window) -> f64 {
    window
        .performance()
        .map_or_else(js_sys::Date::now, |performance| performance.now())
}

fn observe_reveals(shared: &Shared) -> Result<(), JsValue> {
    for kind in [RevealKind::Content, RevealKind::Heritage] {
        let pending = shared.borrow().pending_reveals(kind);
        let Some((_, profile)) = pending.first().cloned() else {
            continue;
        };

        let site = Rc::clone(shared);
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, observer: IntersectionObserver| {
                let mut site = site.borrow_mut();
                let samples = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| IntersectionSample {
                        target: site.dom().wrap(entry.target()),
                        ratio: entry.intersection_ratio(),
                        is_intersecting: entry.is_intersecting(),
                    })
                    .collect::<Vec<_>>();
                for released in site.on_intersections(&samples) {
                    observer.unobserve(released.element());
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&profile.root_margin());
        init.set_threshold(&JsValue::from_f64(profile.threshold));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        callback.forget();

        for (node, _) in &pending {
            observer.observe(node.element());
        }
        debug!(
            "event=reveal_observe module=web status=ok kind={kind:?} targets={}",
            pending.len()
        );
    }
    Ok(())
}

fn listen_scroll(window: &Window, shared: &Shared) -> Result<(), JsValue> {
    if shared.borrow().navbar().is_none() {
        return Ok(());
    }

    let flush_scheduled = Rc::new(Cell::new(false));
    let site = Rc::clone(shared);
    let scroll_window = window.clone();
    let on_scroll = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let offset = scroll_window.scroll_y().unwrap_or(0.0);
        let (pending, interval_ms) = {
            let mut site = site.borrow_mut();
            site.on_scroll(now_ms(&scroll_window), offset);
            (site.scroll_has_pending(), site.scroll_sample_interval_ms())
        };
        if !pending || flush_scheduled.get() {
            return;
        }

        flush_scheduled.set(true);
        let site = Rc::clone(&site);
        let flag = Rc::clone(&flush_scheduled);
        let flush_window = scroll_window.clone();
        let scheduled = set_timeout(
            &scroll_window,
            Duration::from_millis(interval_ms as u64),
            move || {
                flag.set(false);
                site.borrow_mut().flush_scroll(now_ms(&flush_window));
            },
        );
        if scheduled.is_err() {
            flush_scheduled.set(false);
        }
    });

    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    window.add_event_listener_with_callback_and_add_event_listener_options(
        "scroll",
        on_scroll.as_ref().unchecked_ref(),
        &options,
    )?;
    on_scroll.forget();
    Ok(())
}

fn wire_lightbox(shared: &Shared) -> Result<(), JsValue> {
    let (overlay, close_button) = {
        let site = shared.borrow();
        let Some(lightbox) = site.lightbox() else {
            return Ok(());
        };
        (lightbox.overlay().clone(), lightbox.close_button().cloned())
    };

    if let Some(close_button) = close_button {
        let site = Rc::clone(shared);
        listen(close_button.element(), "click", move |_event| {
            site.borrow().on_lightbox_close();
        })?;
    }

    let site = Rc::clone(shared);
    listen(overlay.element(), "click", move |event| {
        let site = site.borrow();
        if let Some(target) = site.dom().wrap_target(event.target()) {
            site.on_lightbox_click(&target);
        }
    })
}

fn wire_card_images(shared: &Shared, cards: Vec<RenderedCard<WebNode>>) {
    for card in cards {
        let site = Rc::clone(shared);
        let image = card.image.clone();
        if let Err(err) = listen(image.element(), "click", move |_event| {
            site.borrow().on_card_image_click(&card);
        }) {
            warn!(
                "event=specials_wire module=web status=error error={}",
                describe(&err)
            );
        }
    }
}

fn wire_menu(shared: &Shared) -> Result<(), JsValue> {
    let (button, links) = {
        let site = shared.borrow();
        let Some(menu) = site.menu() else {
            return Ok(());
        };
        (menu.button().clone(), menu.links(site.dom()))
    };

    let site = Rc::clone(shared);
    listen(button.element(), "click", move |_event| {
        site.borrow().on_menu_toggle();
    })?;
    for link in links {
        let site = Rc::clone(shared);
        listen(link.element(), "click", move |_event| {
            site.borrow().on_menu_link();
        })?;
    }
    Ok(())
}

fn wire_contact(window: &Window, shared: &Shared) -> Result<(), JsValue> {
    let Some(form) = shared.borrow().contact().map(|contact| contact.form().clone()) else {
        return Ok(());
    };

    let site = Rc::clone(shared);
    let window = window.clone();
    listen(form.element(), "submit", move |event| {
        event.prevent_default();
        let delay = site.borrow_mut().on_contact_submit();
        if let Some(delay) = delay {
            schedule_contact_step(&window, Rc::clone(&site), delay);
        }
    })
}

fn schedule_contact_step(window: &Window, site: Shared, delay: Duration) {
    let step_window = window.clone();
    let scheduled = set_timeout(window, delay, move || {
        let next = site.borrow_mut().on_contact_timer();
        if let Some(next) = next {
            schedule_contact_step(&step_window, site, next);
        }
    });
    if let Err(err) = scheduled {
        warn!(
            "event=contact_timer module=web status=error error={}",
            describe(&err)
        );
    }
}

fn wire_install(window: &Window, shared: &Shared, banner_delay: Duration) -> Result<(), JsValue> {
    let (install_button, close_button) = {
        let site = shared.borrow();
        let Some(install) = site.install() else {
            return Ok(());
        };
        let anchors = install.anchors();
        (anchors.install_button.clone(), anchors.close_button.clone())
    };

    let site = Rc::clone(shared);
    listen(window, "beforeinstallprompt", move |event| {
        event.prevent_default();
        site.borrow_mut().on_install_ready(event);
    })?;

    let site = Rc::clone(shared);
    let probe_window = window.clone();
    set_timeout(window, banner_delay, move || {
        let probe = probe_platform(&probe_window);
        site.borrow_mut()
            .on_banner_delay_elapsed(&probe, js_sys::Date::now() as i64);
    })?;

    let site = Rc::clone(shared);
    let alert_window = window.clone();
    listen(install_button.element(), "click", move |_event| {
        let action = site.borrow_mut().on_install_click();
        match action {
            InstallAction::Prompt(event) => spawn_local(run_install_prompt(Rc::clone(&site), event)),
            InstallAction::ManualInstructions(text) => {
                if let Err(err) = alert_window.alert_with_message(text) {
                    warn!(
                        "event=install_manual module=web status=error error={}",
                        describe(&err)
                    );
                }
            }
            InstallAction::Unavailable => {
                debug!("event=install_click module=web status=skipped reason=unavailable");
            }
        }
    })?;

    if let Some(close_button) = close_button {
        let site = Rc::clone(shared);
        listen(close_button.element(), "click", move |_event| {
            let outcome = site
                .borrow_mut()
                .on_install_close(js_sys::Date::now() as i64);
            report_background_outcome("install_dismiss", outcome);
        })?;
    }
    Ok(())
}

fn probe_platform(window: &Window) -> PlatformProbe {
    let navigator = window.navigator();
    let display_standalone = window
        .match_media(STANDALONE_QUERY)
        .ok()
        .flatten()
        .is_some_and(|query| query.matches());
    let navigator_standalone = Reflect::get(&navigator, &JsValue::from_str("standalone"))
        .ok()
        .and_then(|value| value.as_bool());
    let ms_stream = Reflect::get(window, &JsValue::from_str("MSStream"))
        .map(|value| value.is_truthy())
        .unwrap_or(false);

    PlatformProbe::from_host_signals(
        navigator.user_agent().ok(),
        display_standalone,
        navigator_standalone,
        ms_stream,
    )
}

async fn run_install_prompt(site: Shared, event: Capability) {
    let outcome = await_user_choice(&event)
        .await
        .map_err(|err| describe(&err));
    let choice = match &outcome {
        Ok(outcome) => UserChoice::from_outcome(outcome),
        Err(err) => UserChoice::Other(err.clone()),
    };
    report_background_outcome("install_prompt", outcome.map(|_| ()));
    site.borrow_mut().on_install_choice(choice);
}

async fn await_user_choice(event: &Capability) -> Result<String, JsValue> {
    let prompt: Function = Reflect::get(event, &JsValue::from_str("prompt"))?.dyn_into()?;
    prompt.call0(event)?;
    let user_choice: Promise =
        Reflect::get(event, &JsValue::from_str("userChoice"))?.dyn_into()?;
    let choice = JsFuture::from(user_choice).await?;
    Ok(Reflect::get(&choice, &JsValue::from_str("outcome"))?
        .as_string()
        .unwrap_or_default())
}

async fn load_specials(window: Window, shared: Shared, path: String) {
    if shared.borrow().context().specials_grid.is_none() {
        return;
    }
    let loaded = fetch_specials(&window, &path).await;
    let cards = shared.borrow_mut().on_specials_loaded(loaded);
    wire_card_images(&shared, cards);
}

async fn fetch_specials(window: &Window, path: &str) -> Result<Vec<SpecialOffer>, SpecialsError> {
    let network = |err: JsValue| SpecialsError::Network(describe(&err));

    let response: Response = JsFuture::from(window.fetch_with_str(path))
        .await
        .map_err(network)?
        .dyn_into()
        .map_err(network)?;
    if !response.ok() {
        return classify_response(response.status(), None);
    }
    let body = JsFuture::from(response.text().map_err(network)?)
        .await
        .map_err(network)?
        .as_string();
    classify_response(response.status(), body.as_deref())
}

fn register_worker_on_load(window: &Window, script: String) -> Result<(), JsValue> {
    let navigator = window.navigator();
    if !Reflect::has(&navigator, &JsValue::from_str("serviceWorker"))? {
        debug!("event=worker_register module=web status=skipped reason=unsupported");
        return Ok(());
    }

    let register = move || {
        spawn_local(async move {
            let container = navigator.service_worker();
            let outcome = JsFuture::from(container.register(&script))
                .await
                .map(|_| ())
                .map_err(|err| describe(&err));
            report_background_outcome("worker_register", outcome);
        });
    };

    let loaded = window
        .document()
        .is_some_and(|document| document.ready_state() == "complete");
    if loaded {
        register();
        return Ok(());
    }

    let on_load = Closure::once_into_js(register);
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    window.add_event_listener_with_callback_and_add_event_listener_options(
        "load",
        on_load.unchecked_ref(),
        &options,
    )
}

//! Install-prompt controller.
//!
//! # Responsibility
//! - Capture the platform's deferred install capability.
//! - Decide, after the page-load delay, whether the banner may show.
//! - Mediate the native install flow or the iOS manual fallback.
//! - Record explicit dismissals for the next eligibility check.
//!
//! # Invariants
//! - The first captured capability wins; later readiness signals are ignored.
//! - The banner only shows from `Idle`/`Eligible`, outside standalone mode,
//!   when `is_banner_eligible` holds.
//! - The capability is discarded on acceptance or on dismissal.
//! - The iOS manual path leaves the banner state untouched.

pub mod store;

use crate::dom::Dom;
use crate::model::platform::{Platform, PlatformProbe};
use log::{debug, info, warn};
use store::{is_banner_eligible, DismissalStore, StoreError};

pub const INSTALL_BANNER_ID: &str = "install-banner";
pub const INSTALL_BUTTON_ID: &str = "install-btn";
pub const INSTALL_CLOSE_ID: &str = "close-install";

pub const IOS_INSTALL_INSTRUCTIONS: &str =
    "To install on iPhone:\n1. Tap the \"Share\" button.\n2. Tap \"Add to Home Screen\".";

/// Banner lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    /// No capability captured and banner not shown yet.
    Idle,
    /// Capability captured, banner not shown yet.
    Eligible,
    Visible,
    /// Closed by the user; dismissal recorded.
    Dismissed,
    /// Native prompt accepted.
    Installed,
    /// Native prompt answered with anything but `accepted`.
    Declined,
}

/// Outcome of the native install prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserChoice {
    Accepted,
    Dismissed,
    /// Prompt failed or reported an unknown outcome.
    Other(String),
}

impl UserChoice {
    pub fn from_outcome(outcome: &str) -> Self {
        match outcome {
            "accepted" => Self::Accepted,
            "dismissed" => Self::Dismissed,
            other => Self::Other(other.to_string()),
        }
    }
}

/// What the host must do after an install activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallAction<C> {
    /// Call `prompt()` on the capability, await the choice and report it via
    /// `resolve_choice`.
    Prompt(C),
    /// Show manual installation steps.
    ManualInstructions(&'static str),
    /// Nothing to do on this platform.
    Unavailable,
}

/// Banner DOM anchors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerAnchors<N> {
    pub banner: N,
    pub install_button: N,
    pub close_button: Option<N>,
}

/// Install banner state machine over a dismissal store.
pub struct InstallPromptController<N, S, C> {
    anchors: BannerAnchors<N>,
    store: S,
    capability: Option<C>,
    /// Set on the first capture and never cleared.
    captured: bool,
    state: InstallState,
    platform: Option<Platform>,
    awaiting_choice: bool,
    dismissal_window_ms: i64,
}

impl<N, S, C> InstallPromptController<N, S, C>
where
    N: Clone,
    S: DismissalStore,
    C: Clone,
{
    pub fn new(anchors: BannerAnchors<N>, store: S, dismissal_window_ms: i64) -> Self {
        Self {
            anchors,
            store,
            capability: None,
            captured: false,
            state: InstallState::Idle,
            platform: None,
            awaiting_choice: false,
            dismissal_window_ms,
        }
    }

    pub fn state(&self) -> InstallState {
        self.state
    }

    pub fn has_capability(&self) -> bool {
        self.capability.is_some()
    }

    pub fn anchors(&self) -> &BannerAnchors<N> {
        &self.anchors
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stores the platform readiness capability.
    ///
    /// Returns `false` when one was already captured during this page
    /// lifetime, even if it has since been discarded. The host suppresses the
    /// platform's default prompt before calling this.
    pub fn capture(&mut self, capability: C) -> bool {
        if self.captured {
            debug!("event=install_capture module=install status=skipped reason=already_captured");
            return false;
        }
        self.captured = true;
        self.capability = Some(capability);
        if self.state == InstallState::Idle {
            self.state = InstallState::Eligible;
        }
        info!("event=install_capture module=install status=ok");
        true
    }

    /// Runs the delayed eligibility check; returns whether the banner shows.
    pub fn on_delay_elapsed<D: Dom<Node = N>>(
        &mut self,
        dom: &D,
        probe: &PlatformProbe,
        now_ms: i64,
    ) -> bool {
        if !matches!(self.state, InstallState::Idle | InstallState::Eligible) {
            return false;
        }
        if probe.standalone {
            debug!("event=install_banner module=install status=skipped reason=standalone");
            return false;
        }

        let dismissed_at = match self.store.load_dismissed_at() {
            Ok(value) => value,
            Err(err) => {
                // Unreadable records must not lock the banner out forever.
                warn!("event=install_banner module=install status=degraded error={err}");
                None
            }
        };
        if !is_banner_eligible(dismissed_at, now_ms, self.dismissal_window_ms) {
            debug!("event=install_banner module=install status=skipped reason=recently_dismissed");
            return false;
        }

        let platform = probe.platform();
        self.render_banner(dom, platform);
        self.platform = Some(platform);
        self.state = InstallState::Visible;
        info!("event=install_banner module=install status=shown platform={platform:?}");
        true
    }

    fn render_banner<D: Dom<Node = N>>(&self, dom: &D, platform: Platform) {
        let label = platform.install_label();
        let button = &self.anchors.install_button;

        dom.set_style(&self.anchors.banner, "display", "flex");
        dom.clear_children(button);
        match dom.create_element("i") {
            Ok(icon) => {
                for class in label.icon_classes.split_whitespace() {
                    dom.add_class(&icon, class);
                }
                if let Err(err) = dom.append_child(button, &icon) {
                    warn!("event=install_banner module=install status=degraded error={err}");
                }
            }
            Err(err) => warn!("event=install_banner module=install status=degraded error={err}"),
        }
        if let Err(err) = dom.append_text(button, &format!(" {}", label.text)) {
            warn!("event=install_banner module=install status=degraded error={err}");
        }
    }

    /// Handles an install button activation.
    pub fn request_install(&mut self) -> InstallAction<C> {
        if self.state != InstallState::Visible || self.awaiting_choice {
            return InstallAction::Unavailable;
        }
        if let Some(capability) = &self.capability {
            self.awaiting_choice = true;
            info!("event=install_prompt module=install status=start");
            return InstallAction::Prompt(capability.clone());
        }
        if self.platform == Some(Platform::Ios) {
            return InstallAction::ManualInstructions(IOS_INSTALL_INSTRUCTIONS);
        }
        InstallAction::Unavailable
    }

    /// Applies the native prompt outcome; hides the banner regardless.
    pub fn resolve_choice<D: Dom<Node = N>>(&mut self, dom: &D, choice: UserChoice) {
        self.awaiting_choice = false;
        dom.set_style(&self.anchors.banner, "display", "none");
        match choice {
            UserChoice::Accepted => {
                self.capability = None;
                self.state = InstallState::Installed;
                info!("event=install_prompt module=install status=ok outcome=accepted");
            }
            UserChoice::Dismissed => {
                self.state = InstallState::Declined;
                info!("event=install_prompt module=install status=ok outcome=dismissed");
            }
            UserChoice::Other(outcome) => {
                self.state = InstallState::Declined;
                warn!("event=install_prompt module=install status=error outcome={outcome:?}");
            }
        }
    }

    /// Closes the banner and records `now_ms` as the dismissal time.
    ///
    /// The banner is hidden even when persisting the timestamp fails.
    pub fn dismiss<D: Dom<Node = N>>(&mut self, dom: &D, now_ms: i64) -> Result<(), StoreError> {
        dom.set_style(&self.anchors.banner, "display", "none");
        self.capability = None;
        self.awaiting_choice = false;
        self.state = InstallState::Dismissed;
        self.store.save_dismissed_at(now_ms).inspect_err(|err| {
            warn!("event=install_dismiss module=install status=error error={err}");
        })?;
        info!("event=install_dismiss module=install status=ok");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::store::MemoryDismissalStore;
    use super::{
        BannerAnchors, InstallAction, InstallPromptController, InstallState, UserChoice,
        IOS_INSTALL_INSTRUCTIONS,
    };
    use crate::dom::{Dom, MemoryDom, NodeId};
    use crate::model::platform::PlatformProbe;

    const HOUR_MS: i64 = 3_600_000;
    const NOW_MS: i64 = 1_700_000_000_000;
    const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 14) Chrome/120.0 Mobile";
    const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";

    type Controller = InstallPromptController<NodeId, MemoryDismissalStore, &'static str>;

    fn fixture(store: MemoryDismissalStore) -> (MemoryDom, Controller) {
        let dom = MemoryDom::new();
        let banner = dom.add_element(dom.body(), "div", Some("install-banner"), "");
        let install_button = dom.add_element(banner, "button", Some("install-btn"), "");
        let close_button = dom.add_element(banner, "button", Some("close-install"), "");
        let controller = InstallPromptController::new(
            BannerAnchors {
                banner,
                install_button,
                close_button: Some(close_button),
            },
            store,
            HOUR_MS,
        );
        (dom, controller)
    }

    #[test]
    fn capture_moves_idle_to_eligible_once() {
        let (_dom, mut controller) = fixture(MemoryDismissalStore::new());
        assert!(controller.capture("first"));
        assert!(!controller.capture("second"));
        assert_eq!(controller.state(), InstallState::Eligible);
        assert_eq!(controller.request_install(), InstallAction::Unavailable);
    }

    #[test]
    fn capture_after_dismiss_is_ignored() {
        let (dom, mut controller) = fixture(MemoryDismissalStore::new());
        assert!(controller.capture("first"));
        assert!(controller.on_delay_elapsed(&dom, &PlatformProbe::browser(ANDROID_UA), NOW_MS));
        controller.dismiss(&dom, NOW_MS).expect("dismiss should persist");

        assert!(!controller.capture("second"));
        assert!(!controller.has_capability());
        assert_eq!(controller.state(), InstallState::Dismissed);
    }

    #[test]
    fn capture_after_accepted_prompt_is_ignored() {
        let (dom, mut controller) = fixture(MemoryDismissalStore::new());
        controller.capture("first");
        controller.on_delay_elapsed(&dom, &PlatformProbe::browser(ANDROID_UA), NOW_MS);
        controller.request_install();
        controller.resolve_choice(&dom, UserChoice::Accepted);

        assert!(!controller.capture("second"));
        assert!(!controller.has_capability());
        assert_eq!(controller.state(), InstallState::Installed);
    }

    #[test]
    fn standalone_mode_never_shows_banner() {
        let (dom, mut controller) = fixture(MemoryDismissalStore::new());
        let probe = PlatformProbe {
            standalone: true,
            ..PlatformProbe::browser(ANDROID_UA)
        };
        assert!(!controller.on_delay_elapsed(&dom, &probe, NOW_MS));
        assert_eq!(controller.state(), InstallState::Idle);
        assert_eq!(dom.style(&controller.anchors().banner, "display"), None);
    }

    #[test]
    fn shown_banner_carries_platform_label() {
        let (dom, mut controller) = fixture(MemoryDismissalStore::new());
        assert!(controller.on_delay_elapsed(&dom, &PlatformProbe::browser(ANDROID_UA), NOW_MS));

        let anchors = controller.anchors().clone();
        assert_eq!(dom.style(&anchors.banner, "display").as_deref(), Some("flex"));
        assert_eq!(dom.text(&anchors.install_button), " Install for Android");
        let icon = dom
            .query_within(&anchors.install_button, "i")
            .expect("icon should be rendered");
        assert!(dom.has_class(&icon, "fa-android"));
    }

    #[test]
    fn accepted_prompt_discards_capability() {
        let (dom, mut controller) = fixture(MemoryDismissalStore::new());
        controller.capture("deferred");
        controller.on_delay_elapsed(&dom, &PlatformProbe::browser(ANDROID_UA), NOW_MS);

        assert_eq!(controller.request_install(), InstallAction::Prompt("deferred"));
        assert_eq!(controller.request_install(), InstallAction::Unavailable);
        controller.resolve_choice(&dom, UserChoice::Accepted);

        assert_eq!(controller.state(), InstallState::Installed);
        assert!(!controller.has_capability());
        assert_eq!(
            dom.style(&controller.anchors().banner, "display").as_deref(),
            Some("none")
        );
    }

    #[test]
    fn declined_prompt_hides_banner_and_keeps_capability() {
        let (dom, mut controller) = fixture(MemoryDismissalStore::new());
        controller.capture("deferred");
        controller.on_delay_elapsed(&dom, &PlatformProbe::browser(ANDROID_UA), NOW_MS);
        controller.request_install();
        controller.resolve_choice(&dom, UserChoice::from_outcome("dismissed"));

        assert_eq!(controller.state(), InstallState::Declined);
        assert!(controller.has_capability());
        assert_eq!(
            dom.style(&controller.anchors().banner, "display").as_deref(),
            Some("none")
        );
    }

    #[test]
    fn ios_without_capability_gets_manual_instructions() {
        let (dom, mut controller) = fixture(MemoryDismissalStore::new());
        controller.on_delay_elapsed(&dom, &PlatformProbe::browser(IPHONE_UA), NOW_MS);

        assert_eq!(
            controller.request_install(),
            InstallAction::ManualInstructions(IOS_INSTALL_INSTRUCTIONS)
        );
        assert_eq!(controller.state(), InstallState::Visible);
    }

    #[test]
    fn dismiss_records_timestamp_and_discards_capability() {
        let (dom, mut controller) = fixture(MemoryDismissalStore::new());
        controller.capture("deferred");
        controller.on_delay_elapsed(&dom, &PlatformProbe::browser(ANDROID_UA), NOW_MS);
        controller
            .dismiss(&dom, NOW_MS + 5)
            .expect("dismiss should persist");

        assert_eq!(controller.state(), InstallState::Dismissed);
        assert!(!controller.has_capability());
        assert_eq!(controller.store().raw(), Some("1700000000005"));
    }

    #[test]
    fn malformed_record_does_not_block_banner() {
        let (dom, mut controller) = fixture(MemoryDismissalStore::with_raw("NaN"));
        assert!(controller.on_delay_elapsed(&dom, &PlatformProbe::browser(ANDROID_UA), NOW_MS));
    }
}

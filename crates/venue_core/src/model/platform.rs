//! Coarse client platform detection for the install banner.
//!
//! # Invariants
//! - Detection is a pure function of the probe; no global state.
//! - iOS is checked before the desktop keywords because iOS user agents
//!   contain `Mac OS X`.

use once_cell::sync::Lazy;
use regex::Regex;

static IOS_DEVICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"iPad|iPhone|iPod").expect("valid ios device regex"));

/// Client facts read by the host at banner evaluation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformProbe {
    /// Raw `navigator.userAgent`.
    pub user_agent: String,
    /// `navigator.standalone` or `(display-mode: standalone)` matched.
    pub standalone: bool,
    /// `window.MSStream` is present (legacy IE mobile spoofing iOS).
    pub ms_stream: bool,
}

impl PlatformProbe {
    pub fn browser(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            standalone: false,
            ms_stream: false,
        }
    }

    /// Merges raw host signals; either standalone signal counts.
    ///
    /// Missing values (no user agent, no `navigator.standalone`) read as
    /// empty/false.
    pub fn from_host_signals(
        user_agent: Option<String>,
        display_standalone: bool,
        navigator_standalone: Option<bool>,
        ms_stream: bool,
    ) -> Self {
        Self {
            user_agent: user_agent.unwrap_or_default(),
            standalone: display_standalone || navigator_standalone.unwrap_or(false),
            ms_stream,
        }
    }

    pub fn platform(&self) -> Platform {
        Platform::detect(&self.user_agent, self.ms_stream)
    }
}

/// Platform family used to pick banner wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Desktop,
    Other,
}

impl Platform {
    /// Classifies a user agent.
    ///
    /// iOS user agents also contain `Mac OS X`, so the device check runs
    /// before the desktop keywords and an iPhone gets the apple label. A
    /// desktop-first order would label iPhones as desktops.
    pub fn detect(user_agent: &str, ms_stream: bool) -> Self {
        let lowered = user_agent.to_ascii_lowercase();
        if lowered.contains("android") {
            Self::Android
        } else if IOS_DEVICE_RE.is_match(user_agent) && !ms_stream {
            Self::Ios
        } else if lowered.contains("windows") || lowered.contains("mac") {
            Self::Desktop
        } else {
            Self::Other
        }
    }

    /// Icon classes and label of the install button.
    pub fn install_label(self) -> InstallLabel {
        match self {
            Self::Android => InstallLabel {
                icon_classes: "fab fa-android",
                text: "Install for Android",
            },
            Self::Desktop => InstallLabel {
                icon_classes: "fas fa-desktop",
                text: "Install App",
            },
            Self::Ios => InstallLabel {
                icon_classes: "fab fa-apple",
                text: "Install App",
            },
            Self::Other => InstallLabel {
                icon_classes: "fas fa-download",
                text: "Install App",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallLabel {
    pub icon_classes: &'static str,
    pub text: &'static str,
}

#[cfg(test)]
mod tests {
    use super::{Platform, PlatformProbe};

    const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Mobile Safari/537.36";
    const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const WINDOWS_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
    const LINUX_UA: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

    #[test]
    fn detects_each_platform_family() {
        assert_eq!(Platform::detect(ANDROID_UA, false), Platform::Android);
        assert_eq!(Platform::detect(IPHONE_UA, false), Platform::Ios);
        assert_eq!(Platform::detect(WINDOWS_UA, false), Platform::Desktop);
        assert_eq!(Platform::detect(LINUX_UA, false), Platform::Other);
    }

    #[test]
    fn host_signals_merge_standalone_sources() {
        let home_screen =
            PlatformProbe::from_host_signals(Some(IPHONE_UA.to_string()), false, Some(true), false);
        assert!(home_screen.standalone);
        assert_eq!(home_screen.platform(), Platform::Ios);

        let installed = PlatformProbe::from_host_signals(None, true, None, false);
        assert!(installed.standalone);
        assert_eq!(installed.platform(), Platform::Other);

        let tab = PlatformProbe::from_host_signals(Some(WINDOWS_UA.to_string()), false, None, false);
        assert_eq!(tab, PlatformProbe::browser(WINDOWS_UA));
    }

    #[test]
    fn ms_stream_disables_ios_detection() {
        assert_eq!(Platform::detect(IPHONE_UA, true), Platform::Desktop);
    }

    #[test]
    fn every_platform_has_distinct_icon() {
        let icons = [
            Platform::Android,
            Platform::Ios,
            Platform::Desktop,
            Platform::Other,
        ]
        .map(|platform| platform.install_label().icon_classes);
        for (index, icon) in icons.iter().enumerate() {
            assert!(!icons[index + 1..].contains(icon));
        }
        assert_eq!(
            PlatformProbe::browser(ANDROID_UA).platform().install_label().text,
            "Install for Android"
        );
    }
}

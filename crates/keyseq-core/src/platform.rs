// Keyseq Platform Detection
// Classifies the host environment: Mac, Windows, Linux or unknown

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::modifier::Modifier;

/// Platform families that change how patterns resolve and render
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// macOS and iOS: `mod` is Command, labels use symbols
    #[strum(to_string = "mac", serialize = "macos", serialize = "apple", serialize = "darwin")]
    Mac,
    /// Windows: `mod` is Ctrl, labels use words
    #[strum(to_string = "windows", serialize = "win")]
    Windows,
    /// Linux and other Unix desktops
    #[strum(to_string = "linux", serialize = "bsd")]
    Linux,
    /// Nothing recognizable; behaves like a non-Mac platform
    #[default]
    #[strum(to_string = "unknown")]
    Unknown,
}

impl Platform {
    /// Classify the environment described by `hints`.
    ///
    /// Hints are consulted in order `os`, `platform`, `user_agent`; the first
    /// one that classifies wins. Never fails: no usable hint gives `Unknown`.
    pub fn resolve(hints: &EnvironmentHints) -> Platform {
        [&hints.os, &hints.platform, &hints.user_agent]
            .into_iter()
            .flatten()
            .map(|hint| PLATFORM_PATTERNS.classify(hint))
            .find(|platform| *platform != Platform::Unknown)
            .unwrap_or(Platform::Unknown)
    }

    /// The modifier the `mod` alias stands for
    pub fn platform_modifier(self) -> Modifier {
        match self {
            Platform::Mac => Modifier::Meta,
            _ => Modifier::Ctrl,
        }
    }

    /// Whether labels default to symbol glyphs
    pub fn uses_symbols(self) -> bool {
        self == Platform::Mac
    }
}

/// Explicit description of the environment, instead of probing it ambiently
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentHints {
    /// Operating system name (e.g. "macos", "windows")
    #[serde(default)]
    pub os: Option<String>,
    /// Platform string as reported by a host runtime (e.g. "MacIntel", "Win32")
    #[serde(default)]
    pub platform: Option<String>,
    /// User agent string
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl EnvironmentHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hints for the operating system this binary was compiled for
    pub fn from_current_os() -> Self {
        Self::new().with_os(std::env::consts::OS)
    }

    /// Set the operating system hint
    pub fn with_os(mut self, os: impl Into<String>) -> Self {
        self.os = Some(os.into());
        self
    }

    /// Set the platform hint
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Set the user agent hint
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.os.is_none() && self.platform.is_none() && self.user_agent.is_none()
    }
}

static PLATFORM_PATTERNS: LazyLock<PlatformPatterns> = LazyLock::new(PlatformPatterns::new);

/// Case-insensitive detection rules, checked in order
struct PlatformPatterns {
    rules: Vec<(Regex, Platform)>,
}

impl PlatformPatterns {
    fn new() -> Self {
        // Mac goes first: "darwin" would otherwise look like "win"
        let rules = [
            (r"(?i)mac|darwin|iphone|ipad|ipod|\bios\b", Platform::Mac),
            (r"(?i)\bwin(dows|32|64|nt)?\b", Platform::Windows),
            (r"(?i)linux|x11|bsd|android|\bcros\b", Platform::Linux),
        ]
        .into_iter()
        .map(|(pattern, platform)| {
            let regex = Regex::new(pattern).expect("platform pattern is a valid regex");
            (regex, platform)
        })
        .collect();

        Self { rules }
    }

    fn classify(&self, hint: &str) -> Platform {
        self.rules
            .iter()
            .find(|(regex, _)| regex.is_match(hint))
            .map(|(_, platform)| *platform)
            .unwrap_or(Platform::Unknown)
    }
}

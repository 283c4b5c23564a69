// Keyseq Settings Module
// Loads matching, formatting and binding configuration from TOML

#![cfg(feature = "settings")]

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::format::FormatOptions;
use crate::handler::PatternSource;
use crate::matcher::MatchOptions;
use crate::platform::{EnvironmentHints, Platform};
use crate::sequence::DEFAULT_SEQUENCE_TIMEOUT;

/// User settings for keyseq
///
/// Loaded from a TOML file (default: ~/.config/keyseq/settings.toml).
/// Bindings keep the order they appear in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Platform override; detected from the current OS when unset
    platform_override: Option<Platform>,

    case_sensitive: bool,

    platform_modifier_alias: bool,

    /// Sequence window in milliseconds; 0 disables the deadline
    sequence_timeout_ms: u64,

    use_symbols: Option<bool>,

    separator: Option<String>,

    /// Named bindings, each one or more patterns
    bindings: IndexMap<String, Vec<String>>,

    /// Path to the settings file (for reload)
    source_path: Option<PathBuf>,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

/// TOML representation for deserializing settings
#[derive(Debug, Clone, serde::Deserialize, Default)]
struct SettingsToml {
    #[serde(default)]
    platform: Option<PlatformSettings>,

    #[serde(default)]
    matching: Option<MatchingSettings>,

    #[serde(default)]
    sequence: Option<SequenceSettings>,

    #[serde(default)]
    format: Option<FormatSettings>,

    #[serde(default)]
    bindings: IndexMap<String, BindingValue>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct PlatformSettings {
    #[serde(default, rename = "override")]
    override_name: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct MatchingSettings {
    #[serde(default)]
    case_sensitive: Option<bool>,
    #[serde(default)]
    platform_modifier_alias: Option<bool>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct SequenceSettings {
    #[serde(default)]
    timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct FormatSettings {
    #[serde(default)]
    use_symbols: Option<bool>,
    #[serde(default)]
    separator: Option<String>,
}

/// A binding is either one pattern or a list of them
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(untagged)]
enum BindingValue {
    One(String),
    Many(Vec<String>),
}

impl BindingValue {
    fn into_patterns(self) -> Vec<String> {
        match self {
            BindingValue::One(pattern) => vec![pattern],
            BindingValue::Many(patterns) => patterns,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Create settings with every option at its default
    pub fn new() -> Self {
        Self {
            platform_override: None,
            case_sensitive: false,
            platform_modifier_alias: true,
            sequence_timeout_ms: DEFAULT_SEQUENCE_TIMEOUT.as_millis() as u64,
            use_symbols: None,
            separator: None,
            bindings: IndexMap::new(),
            source_path: None,
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        log::debug!("loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();

        if let Some(platform) = toml_settings.platform {
            if let Some(name) = platform.override_name {
                let parsed = name.parse::<Platform>().map_err(|_| {
                    SettingsError::InvalidValue(format!("Unknown platform '{}'", name))
                })?;
                settings.platform_override = Some(parsed);
            }
        }

        if let Some(matching) = toml_settings.matching {
            if let Some(case_sensitive) = matching.case_sensitive {
                settings.case_sensitive = case_sensitive;
            }
            if let Some(alias) = matching.platform_modifier_alias {
                settings.platform_modifier_alias = alias;
            }
        }

        if let Some(timeout_ms) = toml_settings.sequence.and_then(|s| s.timeout_ms) {
            settings.sequence_timeout_ms = timeout_ms;
        }

        if let Some(format) = toml_settings.format {
            settings.use_symbols = format.use_symbols;
            settings.separator = format.separator;
        }

        for (name, value) in toml_settings.bindings {
            let patterns = value.into_patterns();
            if patterns.is_empty() {
                return Err(SettingsError::InvalidValue(format!(
                    "Binding '{}' has no patterns",
                    name
                )));
            }
            settings.bindings.insert(name, patterns);
        }

        Ok(settings)
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keyseq").join("settings.toml"))
    }

    /// Load from default location (~/.config/keyseq/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        // Return default settings if file doesn't exist
        Ok(Self::new())
    }

    /// Reload settings from the original file
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        if let Some(ref path) = self.source_path {
            let new_settings = Self::from_file(path)?;
            *self = new_settings;
            Ok(())
        } else {
            Err(SettingsError::InvalidValue("No source path set".to_string()))
        }
    }

    /// Platform override, or the platform of the current OS
    pub fn platform(&self) -> Platform {
        self.platform_override
            .unwrap_or_else(|| Platform::resolve(&EnvironmentHints::from_current_os()))
    }

    /// Get the platform override
    pub fn platform_override(&self) -> Option<Platform> {
        self.platform_override
    }

    pub fn sequence_timeout_ms(&self) -> u64 {
        self.sequence_timeout_ms
    }

    /// Options for parsing and matching under these settings
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions::default()
            .with_platform(self.platform())
            .with_case_sensitive(self.case_sensitive)
            .with_platform_alias(self.platform_modifier_alias)
    }

    /// Options for formatting labels under these settings
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            platform: Some(self.platform()),
            hints: EnvironmentHints::default(),
            use_symbols: self.use_symbols,
            separator: self.separator.clone(),
        }
    }

    /// Get all bindings in file order
    pub fn bindings(&self) -> &IndexMap<String, Vec<String>> {
        &self.bindings
    }

    /// Pattern source for a named binding, with sequence tracking enabled
    pub fn pattern_source(&self, name: &str) -> Option<PatternSource> {
        self.bindings
            .get(name)
            .map(|patterns| PatternSource::Sequence {
                patterns: patterns.clone(),
                sequence_timeout_ms: self.sequence_timeout_ms,
            })
    }

    /// Add or replace a binding
    pub fn set_binding<I, S>(&mut self, name: &str, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bindings
            .insert(name.to_string(), patterns.into_iter().map(Into::into).collect());
    }
}

/// Create default settings content for a new installation
pub fn default_settings_content() -> &'static str {
    r#"# Keyseq Settings
# Place this file at: ~/.config/keyseq/settings.toml

[platform]
# Optional platform override (detected from the OS if not set)
# Valid values: "mac", "windows", "linux", "unknown"
# override = "mac"

[matching]
case_sensitive = false
# Treat "mod" as Command on Mac and Ctrl elsewhere
platform_modifier_alias = true

[sequence]
# Milliseconds allowed between steps of a sequence; 0 waits forever
timeout_ms = 600

[format]
# Symbol glyphs (⌘K) or words (Ctrl + K); platform default if not set
# use_symbols = true
# separator = " + "

[bindings]
palette = "mod+k"
save = "mod+s"
top = ["g g", "Home"]
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::new();
        assert_eq!(settings.platform_override(), None);
        assert_eq!(settings.sequence_timeout_ms(), 600);
        assert!(settings.bindings().is_empty());

        let options = settings.match_options();
        assert!(!options.case_sensitive);
        assert!(options.treat_alias_as_platform_modifier);
    }

    #[test]
    fn test_settings_from_toml() {
        let toml = r#"
[platform]
override = "mac"

[matching]
case_sensitive = true
platform_modifier_alias = false

[sequence]
timeout_ms = 1000

[format]
use_symbols = false
separator = "-"
"#;

        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(settings.platform(), Platform::Mac);
        assert_eq!(settings.sequence_timeout_ms(), 1000);

        let options = settings.match_options();
        assert_eq!(options.platform, Some(Platform::Mac));
        assert!(options.case_sensitive);
        assert!(!options.treat_alias_as_platform_modifier);

        let format = settings.format_options();
        assert_eq!(format.platform, Some(Platform::Mac));
        assert_eq!(format.use_symbols, Some(false));
        assert_eq!(format.separator.as_deref(), Some("-"));
    }

    #[test]
    fn test_bindings_keep_file_order() {
        let toml = r#"
[bindings]
save = "mod+s"
palette = "mod+k"
top = ["g g", "Home"]
"#;

        let settings = Settings::from_toml(toml).unwrap();
        let names: Vec<&str> = settings.bindings().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["save", "palette", "top"]);
        assert_eq!(settings.bindings()["top"], vec!["g g", "Home"]);
        assert_eq!(settings.bindings()["save"], vec!["mod+s"]);
    }

    #[test]
    fn test_pattern_source_uses_timeout() {
        let toml = r#"
[sequence]
timeout_ms = 0

[bindings]
top = ["g g"]
"#;

        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(
            settings.pattern_source("top"),
            Some(PatternSource::Sequence {
                patterns: vec!["g g".to_string()],
                sequence_timeout_ms: 0,
            })
        );
        assert_eq!(settings.pattern_source("missing"), None);
    }

    #[test]
    fn test_unknown_platform_is_invalid() {
        let toml = r#"
[platform]
override = "amiga"
"#;
        let err = Settings::from_toml(toml).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue(_)));
    }

    #[test]
    fn test_empty_binding_is_invalid() {
        let err = Settings::from_toml("[bindings]\nnothing = []\n").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = Settings::from_toml("[matching\ncase_sensitive = 1").unwrap_err();
        assert!(matches!(err, SettingsError::TomlParse(_)));
    }

    #[test]
    fn test_default_content_parses() {
        let settings = Settings::from_toml(default_settings_content()).unwrap();
        assert_eq!(settings.bindings().len(), 3);
        assert_eq!(settings.sequence_timeout_ms(), 600);
    }

    #[test]
    fn test_reload_without_source_fails() {
        let mut settings = Settings::new();
        assert!(settings.reload().is_err());
    }

    #[test]
    fn test_from_file_and_reload() {
        let path = std::env::temp_dir().join(format!("keyseq-settings-{}.toml", std::process::id()));
        std::fs::write(&path, "[bindings]\npalette = \"ctrl+k\"\n").unwrap();

        let mut settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.bindings().len(), 1);

        std::fs::write(&path, "[bindings]\npalette = \"ctrl+k\"\nsave = \"ctrl+s\"\n").unwrap();
        settings.reload().unwrap();
        assert_eq!(settings.bindings().len(), 2);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_set_binding() {
        let mut settings = Settings::new();
        settings.set_binding("palette", ["mod+k"]);
        assert_eq!(settings.bindings()["palette"], vec!["mod+k"]);
    }
}

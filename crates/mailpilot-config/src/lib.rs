//! Settings storage for the add-in.
//!
//! Settings live in a TOML file. Loading a missing file creates it with
//! defaults so first run and factory reset go through the same path; loading
//! an existing file normalizes enumerated fields back to supported values
//! and persists the result when anything changed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_MAILPILOT_CONFIG: &str = "MAILPILOT_CONFIG";

const DEFAULT_AI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_REPLY_TONE: &str = "professional";
const DEFAULT_SUMMARY_LENGTH: &str = "medium";
const DEFAULT_PRIVACY_MODE: bool = true;
const DEFAULT_DATA_RETENTION: bool = false;

const SUPPORTED_REPLY_TONES: &[&str] = &["professional", "friendly", "formal", "casual"];
const SUPPORTED_SUMMARY_LENGTHS: &[&str] = &["short", "medium", "long"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Message(String),
}

impl ConfigError {
    fn configuration(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_ai_model")]
    pub ai_model: String,
    #[serde(default = "default_reply_tone")]
    pub reply_tone: String,
    #[serde(default = "default_summary_length")]
    pub summary_length: String,
    #[serde(default = "default_privacy_mode")]
    pub privacy_mode: bool,
    #[serde(default = "default_data_retention")]
    pub data_retention: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            ai_model: default_ai_model(),
            reply_tone: default_reply_tone(),
            summary_length: default_summary_length(),
            privacy_mode: default_privacy_mode(),
            data_retention: default_data_retention(),
        }
    }
}

impl Settings {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

pub fn load_from_env() -> Result<Settings, ConfigError> {
    let path = config_path_from_env()?;
    load_from_path(path)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    load_or_create_settings(path.as_ref())
}

pub fn save_to_path(path: impl AsRef<Path>, settings: &Settings) -> Result<(), ConfigError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| {
                ConfigError::configuration(format!(
                    "Failed to create parent directory {} for MAILPILOT_CONFIG: {err}",
                    parent.display()
                ))
            })?;
        }
    }
    persist_settings(path, settings)
}

/// Overwrite the settings file with factory defaults and return them.
pub fn reset_to_defaults(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let settings = Settings::default();
    save_to_path(path, &settings)?;
    Ok(settings)
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = resolve_home_dir().ok_or_else(|| {
        ConfigError::configuration("Unable to resolve home directory from HOME or USERPROFILE")
    })?;

    Ok(home.join(".config").join("mailpilot").join("config.toml"))
}

fn config_path_from_env() -> Result<PathBuf, ConfigError> {
    match std::env::var(ENV_MAILPILOT_CONFIG) {
        Ok(raw) => {
            if raw.trim().is_empty() {
                default_config_path()
            } else {
                Ok(raw.into())
            }
        }
        Err(std::env::VarError::NotPresent) => default_config_path(),
        Err(_) => Err(ConfigError::configuration(
            "MAILPILOT_CONFIG contained invalid UTF-8",
        )),
    }
}

fn resolve_home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("USERPROFILE")
                .ok()
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
}

fn default_ai_model() -> String {
    DEFAULT_AI_MODEL.to_owned()
}

fn default_reply_tone() -> String {
    DEFAULT_REPLY_TONE.to_owned()
}

fn default_summary_length() -> String {
    DEFAULT_SUMMARY_LENGTH.to_owned()
}

fn default_privacy_mode() -> bool {
    DEFAULT_PRIVACY_MODE
}

fn default_data_retention() -> bool {
    DEFAULT_DATA_RETENTION
}

fn persist_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let rendered = toml::to_string_pretty(settings).map_err(|err| {
        ConfigError::configuration(format!(
            "Failed to serialize MAILPILOT_CONFIG for {}: {err}",
            path.display()
        ))
    })?;

    std::fs::write(path, rendered.as_bytes()).map_err(|err| {
        ConfigError::configuration(format!(
            "Failed to write MAILPILOT_CONFIG to {}: {err}",
            path.display()
        ))
    })
}

fn load_or_create_settings(path: &Path) -> Result<Settings, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|err| {
                        ConfigError::configuration(format!(
                            "Failed to create parent directory {} for MAILPILOT_CONFIG: {err}",
                            parent.display()
                        ))
                    })?;
                }
            }

            let default_settings = Settings::default();
            persist_settings(path, &default_settings)?;
            return Ok(default_settings);
        }
        Err(err) => {
            return Err(ConfigError::configuration(format!(
                "Failed to read MAILPILOT_CONFIG from {}: {err}",
                path.display()
            )));
        }
    };

    let mut settings: Settings = toml::from_str(&raw).map_err(|err| {
        ConfigError::configuration(format!(
            "Failed to parse MAILPILOT_CONFIG from {}: {err}",
            path.display()
        ))
    })?;

    let changed = normalize_settings(&mut settings);
    if changed {
        persist_settings(path, &settings)?;
    }

    Ok(settings)
}

fn normalize_settings(settings: &mut Settings) -> bool {
    let mut changed = false;

    let trimmed_key = settings.api_key.trim();
    if trimmed_key != settings.api_key {
        settings.api_key = trimmed_key.to_owned();
        changed = true;
    }

    changed |= normalize_non_empty_string(&mut settings.ai_model, default_ai_model());
    changed |= normalize_enumerated(
        &mut settings.reply_tone,
        SUPPORTED_REPLY_TONES,
        default_reply_tone(),
    );
    changed |= normalize_enumerated(
        &mut settings.summary_length,
        SUPPORTED_SUMMARY_LENGTHS,
        default_summary_length(),
    );

    changed
}

fn normalize_non_empty_string(value: &mut String, default: String) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        if *value != default {
            *value = default;
            return true;
        }
        return false;
    }

    if trimmed != value {
        *value = trimmed.to_owned();
        return true;
    }
    false
}

fn normalize_enumerated(value: &mut String, supported: &[&str], default: String) -> bool {
    let candidate = value.trim().to_ascii_lowercase();
    let canonical = if supported.contains(&candidate.as_str()) {
        candidate
    } else {
        default
    };
    if *value != canonical {
        *value = canonical;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Mutex, OnceLock};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn env_lock() -> &'static Mutex<()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn with_env_vars<F>(vars: &[(&str, Option<&str>)], test: F)
    where
        F: FnOnce(),
    {
        let _guard = env_lock().lock().expect("env lock");
        let backup = vars
            .iter()
            .map(|(name, _)| ((*name).to_owned(), std::env::var(name).ok()))
            .collect::<Vec<_>>();

        for (name, value) in vars {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }

        test();

        for (name, value) in backup {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
    }

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "mailpilot-config-{prefix}-{nanos}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&path).expect("create temp dir");
        path
    }

    fn remove_temp_path(path: &Path) {
        let _ = std::fs::remove_dir_all(path);
    }

    fn write_config_file(path: &Path, raw: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture config parent");
        }
        std::fs::write(path, raw.as_bytes()).expect("write fixture config");
    }

    #[test]
    fn defaults_match_first_run_expectations() {
        let settings = Settings::default();
        assert_eq!(settings.api_key, "");
        assert_eq!(settings.ai_model, "gpt-3.5-turbo");
        assert_eq!(settings.reply_tone, "professional");
        assert_eq!(settings.summary_length, "medium");
        assert!(settings.privacy_mode);
        assert!(!settings.data_retention);
        assert!(!settings.has_api_key());
    }

    #[test]
    fn load_from_path_creates_default_settings_when_missing() {
        let root = unique_temp_dir("missing");
        let path = root.join("nested").join("config.toml");

        let settings = load_from_path(&path).expect("load defaults");
        assert_eq!(settings, Settings::default());
        assert!(path.exists());

        remove_temp_path(&root);
    }

    #[test]
    fn load_from_env_honors_explicit_config_path() {
        let home = unique_temp_dir("home-explicit");
        let root = unique_temp_dir("explicit");
        let explicit = root.join("custom.toml");
        let default = home.join(".config").join("mailpilot").join("config.toml");

        with_env_vars(
            &[
                ("HOME", Some(home.to_str().expect("home path"))),
                ("USERPROFILE", None),
                (
                    ENV_MAILPILOT_CONFIG,
                    Some(explicit.to_str().expect("config path")),
                ),
            ],
            || {
                let settings = load_from_env().expect("load explicit path config");
                assert!(explicit.exists());
                assert!(!default.exists());
                assert_eq!(settings.ai_model, "gpt-3.5-turbo");
            },
        );

        remove_temp_path(&home);
        remove_temp_path(&root);
    }

    #[test]
    fn load_from_env_treats_blank_path_as_unset() {
        let home = unique_temp_dir("home-blank");
        let expected = home.join(".config").join("mailpilot").join("config.toml");

        with_env_vars(
            &[
                ("HOME", Some(home.to_str().expect("home path"))),
                ("USERPROFILE", None),
                (ENV_MAILPILOT_CONFIG, Some("  ")),
            ],
            || {
                let settings = load_from_env().expect("load config from default path");
                assert!(expected.exists());
                assert_eq!(settings.reply_tone, "professional");
            },
        );

        remove_temp_path(&home);
    }

    #[test]
    fn load_from_path_normalizes_and_persists_enumerated_fields() {
        let root = unique_temp_dir("normalize");
        let path = root.join("config.toml");
        write_config_file(
            &path,
            "api_key = \"  sk-test  \"\nai_model = \"  \"\nreply_tone = \"ANGRY\"\nsummary_length = \" Long \"\nprivacy_mode = false\n",
        );

        let settings = load_from_path(&path).expect("load and normalize settings");
        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.ai_model, "gpt-3.5-turbo");
        assert_eq!(settings.reply_tone, "professional");
        assert_eq!(settings.summary_length, "long");
        assert!(!settings.privacy_mode);
        assert!(!settings.data_retention);

        let persisted = std::fs::read_to_string(&path).expect("read persisted settings");
        let parsed: Settings = toml::from_str(&persisted).expect("parse persisted settings");
        assert_eq!(parsed, settings);

        remove_temp_path(&root);
    }

    #[test]
    fn load_from_path_returns_parse_error_for_invalid_toml() {
        let root = unique_temp_dir("invalid");
        let path = root.join("config.toml");
        write_config_file(&path, "api_key = [\n");

        let error = load_from_path(&path).expect_err("expected parse failure");
        assert!(error.to_string().contains("Failed to parse MAILPILOT_CONFIG"));

        remove_temp_path(&root);
    }

    #[test]
    fn save_then_load_round_trips_settings() {
        let root = unique_temp_dir("roundtrip");
        let path = root.join("config.toml");
        let settings = Settings {
            api_key: "sk-live".to_owned(),
            ai_model: "gpt-4".to_owned(),
            reply_tone: "casual".to_owned(),
            summary_length: "short".to_owned(),
            privacy_mode: false,
            data_retention: true,
        };

        save_to_path(&path, &settings).expect("save settings");
        let loaded = load_from_path(&path).expect("load saved settings");
        assert_eq!(loaded, settings);

        let reset = reset_to_defaults(&path).expect("reset settings");
        assert_eq!(reset, Settings::default());
        assert_eq!(load_from_path(&path).expect("reload"), Settings::default());

        remove_temp_path(&root);
    }
}

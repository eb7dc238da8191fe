use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::normalize_server_url;
use serde::Deserialize;

use crate::notifications::NotificationTiming;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_MAX_NOTIFICATIONS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub max_notifications: usize,
    pub timing: NotificationTiming,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            max_notifications: DEFAULT_MAX_NOTIFICATIONS,
            timing: NotificationTiming::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    max_notifications: Option<usize>,
    alert_visible_ms: Option<u64>,
    alert_fade_ms: Option<u64>,
    toast_enter_ms: Option<u64>,
    toast_visible_ms: Option<u64>,
    toast_exit_ms: Option<u64>,
}

/// `<config_dir>/cyber_sentinel/settings.toml`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cyber_sentinel").join("settings.toml"))
}

/// Resolves settings from defaults, the settings file, the environment and
/// finally the command line, in that order of precedence.
///
/// An explicitly named file must exist; the default location is optional.
pub fn load_settings(
    explicit_path: Option<&Path>,
    server_url_override: Option<&str>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let file = match explicit_path {
        Some(path) => Some((
            path.to_path_buf(),
            fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file {}", path.display()))?,
        )),
        None => default_settings_path()
            .and_then(|path| fs::read_to_string(&path).ok().map(|raw| (path, raw))),
    };
    if let Some((path, raw)) = file {
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid settings file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded settings file");
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());

    if let Some(url) = server_url_override {
        settings.server_url = url.to_string();
    }
    settings.server_url = normalize_server_url(&settings.server_url)
        .with_context(|| format!("invalid server url `{}`", settings.server_url))?;

    Ok(settings)
}

pub fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file.max_notifications {
        settings.max_notifications = v;
    }

    let timing = &mut settings.timing;
    for (value, slot) in [
        (file.alert_visible_ms, &mut timing.alert_visible),
        (file.alert_fade_ms, &mut timing.alert_fade),
        (file.toast_enter_ms, &mut timing.toast_enter),
        (file.toast_visible_ms, &mut timing.toast_visible),
        (file.toast_exit_ms, &mut timing.toast_exit),
    ] {
        if let Some(ms) = value {
            *slot = Duration::from_millis(ms);
        }
    }

    Ok(())
}

/// Applies environment overrides read through `lookup`.
pub fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SENTINEL_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__MAX_NOTIFICATIONS") {
        match v.trim().parse::<usize>() {
            Ok(parsed) => settings.max_notifications = parsed,
            Err(err) => tracing::warn!(value = %v, "ignoring APP__MAX_NOTIFICATIONS: {err}"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

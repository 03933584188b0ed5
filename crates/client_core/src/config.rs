use std::{collections::HashMap, fs, path::Path};

use anyhow::{anyhow, Context};
use shared::domain::{Actor, Role};
use url::Url;

pub const SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub actor_id: Option<String>,
    pub actor_role: Option<Role>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080/api".into(),
            api_token: None,
            actor_id: None,
            actor_role: None,
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn actor(&self) -> anyhow::Result<Actor> {
        let id = self
            .actor_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow!("actor id is not configured (set MARRIAGE_ACTOR_ID)"))?;
        let role = self
            .actor_role
            .ok_or_else(|| anyhow!("actor role is not configured (set MARRIAGE_ACTOR_ROLE)"))?;
        Ok(Actor::new(id, role))
    }
}

/// Defaults, then `client.toml` in the working directory, then environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    if Path::new(SETTINGS_FILE).exists() {
        let raw = fs::read_to_string(SETTINGS_FILE)
            .with_context(|| format!("failed to read {SETTINGS_FILE}"))?;
        apply_file(&mut settings, &raw)?;
    }
    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    settings.api_base_url = normalize_base_url(&settings.api_base_url)?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)
        .with_context(|| format!("{SETTINGS_FILE} must be a flat table of strings"))?;
    for (key, value) in &file_cfg {
        apply_value(settings, key, value)?;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    const VARS: [(&str, &str); 9] = [
        ("MARRIAGE_API_URL", "api_base_url"),
        ("APP__API_BASE_URL", "api_base_url"),
        ("MARRIAGE_API_TOKEN", "api_token"),
        ("APP__API_TOKEN", "api_token"),
        ("MARRIAGE_ACTOR_ID", "actor_id"),
        ("APP__ACTOR_ID", "actor_id"),
        ("MARRIAGE_ACTOR_ROLE", "actor_role"),
        ("APP__ACTOR_ROLE", "actor_role"),
        ("APP__REQUEST_TIMEOUT_SECS", "request_timeout_secs"),
    ];
    for (var, key) in VARS {
        if let Some(value) = lookup(var) {
            apply_value(settings, key, &value).with_context(|| format!("invalid {var}"))?;
        }
    }
    Ok(())
}

fn apply_value(settings: &mut Settings, key: &str, value: &str) -> anyhow::Result<()> {
    match key {
        "api_base_url" => settings.api_base_url = value.to_string(),
        "api_token" => settings.api_token = Some(value.to_string()).filter(|v| !v.is_empty()),
        "actor_id" => settings.actor_id = Some(value.to_string()),
        "actor_role" => {
            settings.actor_role =
                Some(Role::parse(value).ok_or_else(|| anyhow!("unknown role '{value}'"))?)
        }
        "request_timeout_secs" => {
            let secs = value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("'{value}' is not a number of seconds"))?;
            settings.request_timeout_secs = (secs > 0).then_some(secs);
        }
        _ => {}
    }
    Ok(())
}

/// Trims, defaults the scheme to `http://`, and drops trailing slashes.
pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Settings::default().api_base_url);
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    let parsed =
        Url::parse(&with_scheme).with_context(|| format!("invalid api base url '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!("api base url must use http or https, got '{raw}'"));
    }

    Ok(with_scheme.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use clinica_app::{DEFAULT_SEARCH_DEBOUNCE, DEFAULT_TOAST_TTL, FallbackPolicy};
use clinica_tui::UiOptions;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const APP_NAME: &str = "clinica";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_API_TIMEOUT: &str = "5s";
const DEFAULT_PLACEHOLDER: &str = "—";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
            dashboard: DashboardConfig::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_API_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_API_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub show_dashboard: Option<bool>,
    pub search_debounce: Option<String>,
    pub toast_ttl: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    pub fallback: Option<String>,
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub dir: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("CLINICA_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set CLINICA_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and place values under [api], [ui], [dashboard], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `clinica --print-example-config` for a template",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url {
            let trimmed = base_url.trim();
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                bail!(
                    "api.base_url in {} must start with http:// or https://, got {:?}",
                    path.display(),
                    base_url
                );
            }
        }

        for (key, raw) in [
            ("api.timeout", &self.api.timeout),
            ("ui.toast_ttl", &self.ui.toast_ttl),
        ] {
            if let Some(raw) = raw
                && parse_duration(raw)?.is_zero()
            {
                bail!("{key} in {} must be positive, got {raw}", path.display());
            }
        }
        if let Some(raw) = &self.ui.search_debounce {
            parse_duration(raw)
                .with_context(|| format!("ui.search_debounce in {}", path.display()))?;
        }

        self.fallback_policy()
            .with_context(|| format!("invalid [dashboard] in {}", path.display()))?;

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).with_context(|| {
                format!(
                    "log.level in {} is not a valid filter (for example \"info\" or \"clinica_api=debug\")",
                    path.display()
                )
            })?;
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim()
            .trim_end_matches('/')
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_API_TIMEOUT))
    }

    pub fn show_dashboard(&self) -> bool {
        self.ui.show_dashboard.unwrap_or(true)
    }

    pub fn fallback_policy(&self) -> Result<FallbackPolicy> {
        match self.dashboard.fallback.as_deref().map(str::trim) {
            None | Some("zero") => Ok(FallbackPolicy::Zero),
            Some("placeholder") => Ok(FallbackPolicy::Placeholder(
                self.dashboard
                    .placeholder
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_owned()),
            )),
            Some(other) => {
                bail!("dashboard.fallback must be \"zero\" or \"placeholder\", got {other:?}")
            }
        }
    }

    pub fn ui_options(&self) -> Result<UiOptions> {
        let search_debounce = match &self.ui.search_debounce {
            Some(raw) => parse_duration(raw)?,
            None => DEFAULT_SEARCH_DEBOUNCE,
        };
        let toast_ttl = match &self.ui.toast_ttl {
            Some(raw) => parse_duration(raw)?,
            None => DEFAULT_TOAST_TTL,
        };
        Ok(UiOptions {
            show_dashboard: self.show_dashboard(),
            search_debounce,
            toast_ttl,
            fallback: self.fallback_policy()?,
        })
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.log.dir {
            return Ok(PathBuf::from(dir));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].dir in the config file")
        })?;
        Ok(data_root.join(APP_NAME))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# clinica config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\ntimeout = \"{}\"\n\n[ui]\nshow_dashboard = true\nsearch_debounce = \"400ms\"\ntoast_ttl = \"4s\"\n\n[dashboard]\n# \"zero\" shows 0 while stats are unavailable; \"placeholder\" shows the text below\nfallback = \"zero\"\nplaceholder = \"{}\"\n\n[log]\nlevel = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/clinica)\n# dir = \"/absolute/path/to/logs\"\n",
            path.display(),
            DEFAULT_API_BASE_URL,
            DEFAULT_API_TIMEOUT,
            DEFAULT_PLACEHOLDER,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .with_context(|| format!("duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 400ms or 5s)")
}

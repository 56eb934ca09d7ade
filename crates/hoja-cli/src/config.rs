// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "hoja";
const DEFAULT_TITLE: &str = "hoja";
const DEFAULT_STATUS_CLEAR_SECS: i64 = 4;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub sheet: Sheet,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            sheet: Sheet::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sheet {
    pub title: Option<String>,
}

impl Default for Sheet {
    fn default() -> Self {
        Self {
            title: Some(DEFAULT_TITLE.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub show_summary: Option<bool>,
    pub status_clear_secs: Option<i64>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            show_summary: Some(true),
            status_clear_secs: Some(DEFAULT_STATUS_CLEAR_SECS),
        }
    }
}

/// Where interaction records go. Unset means they are discarded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub action_log_path: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("HOJA_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set HOJA_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
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
                    "config file {} is not versioned. Add `version = 1` and place values under [sheet], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
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
        if let Some(title) = &self.sheet.title
            && title.trim().is_empty()
        {
            bail!("sheet.title in {} must not be blank", path.display());
        }

        if let Some(secs) = self.ui.status_clear_secs
            && secs <= 0
        {
            bail!(
                "ui.status_clear_secs in {} must be positive, got {}",
                path.display(),
                secs
            );
        }

        if let Some(log_path) = &self.log.action_log_path {
            if log_path.trim().is_empty() {
                bail!(
                    "log.action_log_path in {} must not be blank; remove it to disable logging",
                    path.display()
                );
            }
            if log_path.contains("://") {
                bail!(
                    "log.action_log_path in {} looks like a URI; use a filesystem path",
                    path.display()
                );
            }
        }

        Ok(())
    }

    pub fn title(&self) -> &str {
        self.sheet.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn show_summary(&self) -> bool {
        self.ui.show_summary.unwrap_or(true)
    }

    pub fn status_clear_secs(&self) -> u64 {
        self.ui
            .status_clear_secs
            .unwrap_or(DEFAULT_STATUS_CLEAR_SECS)
            .max(1) as u64
    }

    pub fn action_log_path(&self) -> Option<PathBuf> {
        self.log.action_log_path.as_deref().map(PathBuf::from)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# hoja config\n# Place this file at: {}\n\nversion = 1\n\n[sheet]\ntitle = \"{}\"\n\n[ui]\nshow_summary = true\nstatus_clear_secs = {}\n\n[log]\n# Optional. Interaction records are appended here, one per line.\n# action_log_path = \"/absolute/path/to/hoja-actions.log\"\n",
            path.display(),
            DEFAULT_TITLE,
            DEFAULT_STATUS_CLEAR_SECS,
        )
    }
}

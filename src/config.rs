//! On-disk settings and file locations.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::layout::LayoutMetrics;
use crate::theme::{Theme, ThemeColorOverrides, DEFAULT_THEME};

pub const DEFAULT_TITLE: &str = "Start Page";
pub const DEFAULT_WEB_SEARCH_URL: &str = "https://www.google.com/search?q=";
const HOME_ENV: &str = "STARTPAGE_HOME";

pub struct AppPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    pub catalog_file: PathBuf,
    pub log_file: PathBuf,
}

impl AppPaths {
    /// `$STARTPAGE_HOME`, else the platform config directory.
    pub fn new() -> Result<Self> {
        let config_dir = match env::var_os(HOME_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
                .context("Unable to determine configuration directory")?
                .join("startpage"),
        };
        Self::at(config_dir)
    }

    pub fn at(config_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Unable to create {}", config_dir.display()))?;
        Ok(Self {
            settings_file: config_dir.join("settings.json"),
            catalog_file: config_dir.join("data.json"),
            log_file: config_dir.join("startpage.log"),
            config_dir,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub colors: Option<ThemeColorOverrides>,
    /// Template for modified-Enter web searches; the query is appended.
    #[serde(default)]
    pub web_search_url: Option<String>,
    /// Catalog location, relative to the config directory unless absolute.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub layout: LayoutMetrics,
}

impl SettingsFile {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let data = fs::read_to_string(path)
                .with_context(|| format!("Unable to read {}", path.display()))?;
            let parsed: SettingsFile = serde_json::from_str(&data)
                .with_context(|| format!("Invalid settings in {}", path.display()))?;
            Ok(parsed)
        } else {
            let default = Self::default_data();
            default.save(path)?;
            Ok(default)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn default_data() -> Self {
        SettingsFile {
            title: Some(DEFAULT_TITLE.into()),
            theme: Some(DEFAULT_THEME.into()),
            colors: None,
            web_search_url: Some(DEFAULT_WEB_SEARCH_URL.into()),
            catalog: None,
            layout: LayoutMetrics::default(),
        }
    }
}

/// Settings resolved against defaults and the config directory.
#[derive(Clone, Debug)]
pub struct Settings {
    pub title: String,
    pub theme: Theme,
    pub web_search_url: String,
    pub catalog_path: PathBuf,
    /// Whether the catalog lives at the default location and may be seeded.
    pub default_catalog: bool,
    pub metrics: LayoutMetrics,
}

impl Settings {
    pub fn resolve(file: SettingsFile, paths: &AppPaths) -> Self {
        let (catalog_path, default_catalog) = match file.catalog {
            Some(path) if path.is_absolute() => (path, false),
            Some(path) => (paths.config_dir.join(path), false),
            None => (paths.catalog_file.clone(), true),
        };
        Settings {
            title: file
                .title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.into()),
            theme: Theme::resolve(file.theme.as_deref(), file.colors.as_ref()),
            web_search_url: file
                .web_search_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_WEB_SEARCH_URL.into()),
            catalog_path,
            default_catalog,
            metrics: file.layout.sanitized(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            title: DEFAULT_TITLE.into(),
            theme: Theme::default(),
            web_search_url: DEFAULT_WEB_SEARCH_URL.into(),
            catalog_path: PathBuf::from("data.json"),
            default_catalog: false,
            metrics: LayoutMetrics::default(),
        }
    }
}

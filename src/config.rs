use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::catalog::TimeWindow;
use crate::error::{Error, Result};

pub const API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Connection settings handed to the catalog client at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_embed_base_url")]
    pub embed_base_url: String,
    #[serde(default = "default_opener")]
    pub opener: String,
    #[serde(default)]
    pub opener_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    #[serde(default = "default_carousel_interval")]
    pub carousel_interval_secs: u64,
    /// Window for the trending lists on every browse page.
    #[serde(default)]
    pub trending_window: TimeWindow,
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_embed_base_url() -> String {
    "https://vidsrc.icu/embed".to_string()
}

fn default_opener() -> String {
    if cfg!(target_os = "macos") {
        "open".to_string()
    } else if cfg!(target_os = "windows") {
        "explorer".to_string()
    } else {
        "xdg-open".to_string()
    }
}

fn default_accent_color() -> String {
    "cyan".to_string()
}

fn default_carousel_interval() -> u64 {
    5
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            embed_base_url: default_embed_base_url(),
            opener: default_opener(),
            opener_args: Vec::new(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            accent_color: default_accent_color(),
            carousel_interval_secs: default_carousel_interval(),
            trending_window: TimeWindow::default(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "bingepoint").ok_or(Error::NoConfigDir)
}

pub fn config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn data_dir() -> Result<PathBuf> {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .map_err(|_| Error::NoDataDir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

impl Config {
    /// Load from the platform config path, writing defaults on first run.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&config_path()?)?;
        config.apply_env_override(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// A non-blank environment key wins over the file.
    pub fn apply_env_override(&mut self, key: Option<String>) {
        if let Some(key) = key.map(|k| k.trim().to_string()) {
            if !key.is_empty() {
                self.catalog.api_key = key;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.catalog.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.playback.embed_base_url, "https://vidsrc.icu/embed");
        assert_eq!(config.ui.carousel_interval_secs, 5);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[catalog]\napi_key = \"abc\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.catalog.api_key, "abc");
        assert_eq!(config.catalog.image_base_url, "https://image.tmdb.org/t/p");
        assert_eq!(config.ui.accent_color, "cyan");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.catalog.base_url = "http://localhost:9000/3".to_string();
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.catalog.base_url, "http://localhost:9000/3");
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.catalog.api_key = "from-file".to_string();

        config.apply_env_override(Some("   ".to_string()));
        assert_eq!(config.catalog.api_key, "from-file");

        config.apply_env_override(Some("from-env".to_string()));
        assert_eq!(config.catalog.api_key, "from-env");

        config.apply_env_override(None);
        assert_eq!(config.catalog.api_key, "from-env");
    }

    #[test]
    fn test_trending_window_setting() {
        assert_eq!(Config::default().ui.trending_window, TimeWindow::Week);

        let config: Config = toml::from_str("[ui]\ntrending_window = \"day\"\n").unwrap();
        assert_eq!(config.ui.trending_window, TimeWindow::Day);
        assert_eq!(config.ui.carousel_interval_secs, 5);

        assert!(toml::from_str::<Config>("[ui]\ntrending_window = \"month\"\n").is_err());
    }

    #[test]
    fn test_dirs_share_project_root() {
        match (config_dir(), data_dir()) {
            (Ok(config), Ok(data)) => {
                let named = |p: &PathBuf| p.components().any(|c| c.as_os_str() == "bingepoint");
                assert!(named(&config));
                assert!(named(&data));
            }
            (Err(_), Err(e)) => assert!(matches!(e, Error::NoDataDir)),
            _ => panic!("config and data dirs disagree"),
        }
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(Error::MissingApiKey)));
    }
}

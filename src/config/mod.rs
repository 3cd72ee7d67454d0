use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::picker::ClipSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Draw reveals immediately, disclaimer only on request
    Classic,
    /// Clip plays first, reveal is delayed, disclaimer auto-shows once
    #[default]
    Enhanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipPaths {
    #[serde(default = "default_even_clip")]
    pub even: PathBuf,
    #[serde(default = "default_odd_clip")]
    pub odd: PathBuf,
}

fn default_even_clip() -> PathBuf {
    PathBuf::from("./video/ys.mp4")
}

fn default_odd_clip() -> PathBuf {
    PathBuf::from("./video/sr.mp4")
}

impl Default for ClipPaths {
    fn default() -> Self {
        Self {
            even: default_even_clip(),
            odd: default_odd_clip(),
        }
    }
}

impl ClipPaths {
    pub fn for_slot(&self, slot: ClipSlot) -> &PathBuf {
        match slot {
            ClipSlot::Even => &self.even,
            ClipSlot::Odd => &self.odd,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for PlayerCommand {
    fn default() -> Self {
        Self {
            program: "mpv".to_string(),
            args: vec!["--really-quiet".to_string()],
        }
    }
}

/// Hex colour overrides, e.g. `title_bar = "#DD828D"`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaletteOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_bar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
}

fn default_reveal_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub variant: Variant,

    /// Names pre-filled into the pool field
    #[serde(default)]
    pub default_pool: String,

    /// Delay between starting the clip and revealing the name
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,

    #[serde(default)]
    pub clips: ClipPaths,

    #[serde(default)]
    pub player: PlayerCommand,

    #[serde(default)]
    pub palette: PaletteOverrides,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            default_pool: String::new(),
            clips: ClipPaths::default(),
            player: PlayerCommand::default(),
            reveal_delay_ms: default_reveal_delay_ms(),
            palette: PaletteOverrides::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("rollcall");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Ok(Self::load_from(&path)),
            Err(_) => Ok(AppConfig::default()),
        }
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            // Leave a broken file alone so the user can fix it
            return AppConfig::default();
        }

        let config = AppConfig::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!("Could not write default config: {}", e);
        }
        config
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use egui::Color32;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::error::ConfigError;

/// Board settings. Missing fields fall back to their defaults when loading
/// older or partial config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Maximum number of undo entries kept
    pub history_limit: usize,
    /// Quiet period before a snapshot is persisted
    pub persist_debounce_ms: u64,
    /// Initial pen color as `#rrggbb`
    pub default_color: String,
    /// Initial stroke width in CSS pixels
    pub default_width: f32,
    /// Height of the drawing area in points
    pub canvas_height: f32,
    /// Prefix of the local fallback store key
    pub storage_prefix: String,
    /// Directory backing the local fallback store (native only)
    pub store_dir: Option<PathBuf>,
    /// Directory where the host keeps `board_<id>.png`
    pub snapshot_dir: Option<PathBuf>,
    /// Directory downloads are written to
    pub download_dir: PathBuf,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            history_limit: 40,
            persist_debounce_ms: 500,
            default_color: "#0f172a".to_owned(),
            default_width: 8.0,
            canvas_height: 460.0,
            storage_prefix: "board_snapshot_dataurl".to_owned(),
            store_dir: None,
            snapshot_dir: None,
            download_dir: PathBuf::from("."),
        }
    }
}

impl BoardConfig {
    /// Read a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Like [`Self::load`] but a missing or broken file yields the defaults
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Read(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring config {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }

    /// The configured pen color, or the built-in default if it doesn't parse
    pub fn default_color(&self) -> Color32 {
        parse_hex_color(&self.default_color).unwrap_or(Color32::from_rgb(0x0f, 0x17, 0x2a))
    }
}

/// Parse `#rrggbb` (leading `#` optional)
pub fn parse_hex_color(s: &str) -> Option<Color32> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.history_limit, 40);
        assert_eq!(config.persist_debounce(), Duration::from_millis(500));
        assert_eq!(config.default_color(), Color32::from_rgb(0x0f, 0x17, 0x2a));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BoardConfig = serde_json::from_str(r#"{ "history_limit": 5 }"#).unwrap();
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.persist_debounce_ms, 500);
        assert_eq!(config.storage_prefix, "board_snapshot_dataurl");
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Color32::RED));
        assert_eq!(parse_hex_color("00ff00"), Some(Color32::from_rgb(0, 255, 0)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = BoardConfig::load_or_default(&dir.path().join("missing.json"));
        assert_eq!(config, BoardConfig::default());
    }
}

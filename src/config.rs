use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::brush::{BrushState, parse_hex_color};
use crate::error::ConfigError;
use crate::export::EXPORT_FILE_NAME;
use crate::history::DEFAULT_HISTORY_DEPTH;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV_VAR: &str = "ATELIER_CONFIG";

/// Tunables for the canvas. Every field has a default, so a config file only
/// needs the keys it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaintConfig {
    /// Snapshots kept for undo/redo
    pub history_depth: usize,
    /// Initial brush color as `#rrggbb`
    pub default_color: String,
    /// Initial brush width in pixels
    pub default_brush_width: u32,
    /// Share of the window width the canvas takes
    pub canvas_width_fraction: f32,
    /// Share of the window height the canvas takes
    pub canvas_height_fraction: f32,
    /// Name the exported PNG is saved under
    pub export_file_name: String,
    /// Directory native saves are written to
    pub export_directory: String,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            default_color: "#000000".to_owned(),
            default_brush_width: 5,
            canvas_width_fraction: 0.8,
            canvas_height_fraction: 0.7,
            export_file_name: EXPORT_FILE_NAME.to_owned(),
            export_directory: ".".to_owned(),
        }
    }
}

impl PaintConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Load the file named by [`CONFIG_ENV_VAR`], falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(err) => {
                log::warn!("Ignoring config {}: {}", path, err);
                Self::default()
            }
        }
    }

    /// The brush new sessions start with
    pub fn initial_brush(&self) -> BrushState {
        let color = parse_hex_color(&self.default_color).unwrap_or_else(|| {
            log::warn!("Invalid default color {:?}, using black", self.default_color);
            egui::Color32::BLACK
        });
        BrushState::new(color, self.default_brush_width)
    }

    /// Canvas size for a window of the given size
    pub fn canvas_size(&self, window: egui::Vec2) -> (u32, u32) {
        let fraction = |value: f32| value.clamp(0.0, 1.0);
        let width = (window.x * fraction(self.canvas_width_fraction)).max(0.0);
        let height = (window.y * fraction(self.canvas_height_fraction)).max(0.0);
        (width.round() as u32, height.round() as u32)
    }
}

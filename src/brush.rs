use egui::Color32;
use serde::{Deserialize, Serialize};

/// Smallest brush width the panel and the surface accept
pub const MIN_BRUSH_WIDTH: u32 = 1;
/// Largest brush width the panel and the surface accept
pub const MAX_BRUSH_WIDTH: u32 = 50;

/// Color and width applied to new strokes.
///
/// Plain copy data: the toolbar writes it, the surface reads a copy each time
/// a segment is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushState {
    color: Color32,
    width: u32,
}

impl Default for BrushState {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            width: 5,
        }
    }
}

impl BrushState {
    pub fn new(color: Color32, width: u32) -> Self {
        Self {
            color: opaque(color),
            width: clamp_width(width),
        }
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Set the stroke color. Alpha is discarded, strokes are always opaque.
    pub fn set_color(&mut self, color: Color32) {
        self.color = opaque(color);
    }

    /// Set the stroke color from `#rrggbb` text.
    ///
    /// Returns false and keeps the previous color if the text is malformed.
    pub fn set_color_hex(&mut self, hex: &str) -> bool {
        match parse_hex_color(hex) {
            Some(color) => {
                self.color = color;
                true
            }
            None => {
                log::debug!("Rejected malformed color {:?}", hex);
                false
            }
        }
    }

    /// Set the stroke width, clamped into [MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH]
    pub fn set_width(&mut self, width: u32) {
        let clamped = clamp_width(width);
        if clamped != width {
            log::debug!("Brush width {} clamped to {}", width, clamped);
        }
        self.width = clamped;
    }

    /// Half the stroke width, the radius of the round pen tip
    pub fn radius(&self) -> f32 {
        self.width as f32 / 2.0
    }
}

fn clamp_width(width: u32) -> u32 {
    width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH)
}

fn opaque(color: Color32) -> Color32 {
    Color32::from_rgb(color.r(), color.g(), color.b())
}

/// Parse `#rrggbb` (leading `#` optional, case-insensitive)
pub fn parse_hex_color(text: &str) -> Option<Color32> {
    let digits = text.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Format a color as lowercase `#rrggbb`
pub fn to_hex_color(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// Brush settings as they are written to eframe storage between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BrushSettings {
    pub color: String,
    pub width: u32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        BrushState::default().into()
    }
}

impl From<BrushState> for BrushSettings {
    fn from(brush: BrushState) -> Self {
        Self {
            color: to_hex_color(brush.color),
            width: brush.width,
        }
    }
}

impl BrushSettings {
    /// Apply stored settings on top of `brush`, ignoring a malformed color
    pub fn apply_to(&self, brush: &mut BrushState) {
        brush.set_color_hex(&self.color);
        brush.set_width(self.width);
    }
}

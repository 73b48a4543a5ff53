//! Configuration persistence for layoutlens settings

use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use cosmic::iced::Color;
use serde::{Deserialize, Serialize};

use crate::domain::AspectRatio;

/// Serializable color representation for config storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl OverlayColor {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a * 255.0).round() as u8,
        ]
    }
}

impl From<OverlayColor> for Color {
    fn from(c: OverlayColor) -> Self {
        Color::from_rgba(c.r, c.g, c.b, c.a)
    }
}

/// Colors and stroke widths used by the overlay renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    /// Fill of the dimmed area outside the guide rectangle
    pub mask: OverlayColor,
    pub border: OverlayColor,
    pub border_width: f32,
    pub dot_fill: OverlayColor,
    pub dot_outline: OverlayColor,
    pub dot_radius: f32,
    pub dot_outline_width: f32,
    pub line: OverlayColor,
    pub line_width: f32,
    /// Color of the most recently placed line in the live preview
    pub selected_line: OverlayColor,
    pub selected_line_width: f32,
    /// Width of every line in exported images
    pub export_line_width: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            mask: OverlayColor::rgba(0.0, 0.0, 0.0, 0.45),
            border: OverlayColor::rgba(1.0, 1.0, 1.0, 0.95),
            border_width: 3.0,
            dot_fill: OverlayColor::rgba(1.0, 59.0 / 255.0, 48.0 / 255.0, 0.95),
            dot_outline: OverlayColor::rgba(1.0, 1.0, 1.0, 1.0),
            dot_radius: 8.0,
            dot_outline_width: 2.0,
            // Lime
            line: OverlayColor::rgba(0.0, 1.0, 0.0, 1.0),
            line_width: 3.0,
            // Cyan
            selected_line: OverlayColor::rgba(0.0, 1.0, 1.0, 1.0),
            selected_line_width: 4.0,
            export_line_width: 4.0,
        }
    }
}

/// Where exported images are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveLocation {
    #[default]
    Pictures,
    Documents,
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, CosmicConfigEntry)]
#[version = 1]
pub struct LayoutLensConfig {
    /// Ratio choices offered in the toolbar, as `"a/b"` or decimals
    pub ratio_presets: Vec<String>,
    /// Ratio used when the app starts (last selected)
    pub default_ratio: String,
    /// Folder exported images are saved to
    pub save_location: SaveLocation,
    /// Try a rear-facing camera first on startup
    pub prefer_rear_camera: bool,
    /// Overlay colors and widths
    #[serde(default)]
    pub style: OverlayStyle,
}

impl LayoutLensConfig {
    /// Configuration ID for cosmic-config
    pub const ID: &'static str = "io.github.layoutlens";

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match cosmic_config::Config::new(Self::ID, Self::VERSION) {
            Ok(config) => match Self::get_entry(&config) {
                Ok(entry) => entry,
                Err((errs, entry)) => {
                    log::warn!("Error loading config, using defaults: {:?}", errs);
                    entry
                }
            },
            Err(err) => {
                log::warn!("Could not create config handler: {:?}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        match cosmic_config::Config::new(Self::ID, Self::VERSION) {
            Ok(config) => {
                if let Err(err) = self.write_entry(&config) {
                    log::error!("Failed to save config: {:?}", err);
                }
            }
            Err(err) => {
                log::error!("Could not create config handler for saving: {:?}", err);
            }
        }
    }

    /// Parsed ratio presets, skipping entries that are not valid ratios
    pub fn ratios(&self) -> Vec<AspectRatio> {
        let ratios: Vec<AspectRatio> = self
            .ratio_presets
            .iter()
            .filter_map(|raw| {
                let ratio = AspectRatio::parse(raw);
                if ratio.is_none() {
                    log::warn!("Ignoring invalid ratio preset {:?}", raw);
                }
                ratio
            })
            .collect();
        if ratios.is_empty() {
            vec![AspectRatio::SQUARE]
        } else {
            ratios
        }
    }

    /// Ratio to start with, falling back to a square frame
    pub fn initial_ratio(&self) -> AspectRatio {
        AspectRatio::parse(&self.default_ratio).unwrap_or_default()
    }

    /// Record `ratio` as the startup ratio, keeping a matching preset's spelling
    ///
    /// Returns whether the stored value changed.
    pub fn set_default_ratio(&mut self, ratio: AspectRatio) -> bool {
        let raw = self
            .ratio_presets
            .iter()
            .find(|raw| AspectRatio::parse(raw) == Some(ratio))
            .cloned()
            .unwrap_or_else(|| ratio.value().to_string());
        if raw == self.default_ratio {
            return false;
        }
        self.default_ratio = raw;
        true
    }
}

impl Default for LayoutLensConfig {
    fn default() -> Self {
        Self {
            ratio_presets: ["1", "4/5", "3/4", "2/3", "1.618", "16/9"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_ratio: "1".to_string(),
            save_location: SaveLocation::Pictures,
            prefer_rear_camera: true,
            style: OverlayStyle::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_presets_parse() {
        let config = LayoutLensConfig::default();
        let labels: Vec<String> = config.ratios().iter().map(|r| r.to_string()).collect();
        assert_eq!(labels, ["1", "0.8", "0.75", "0.667", "Golden", "1.778"]);
        assert_eq!(config.initial_ratio(), AspectRatio::SQUARE);
    }

    #[test]
    fn test_invalid_presets_are_skipped() {
        let config = LayoutLensConfig {
            ratio_presets: vec!["nope".into(), "3/2".into(), "0".into()],
            default_ratio: "garbage".into(),
            ..Default::default()
        };
        assert_eq!(config.ratios(), vec![AspectRatio::parse("3/2").unwrap()]);
        assert_eq!(config.initial_ratio(), AspectRatio::SQUARE);

        let empty = LayoutLensConfig {
            ratio_presets: Vec::new(),
            ..Default::default()
        };
        assert_eq!(empty.ratios(), vec![AspectRatio::SQUARE]);
    }

    #[test]
    fn test_set_default_ratio_keeps_preset_spelling() {
        let mut config = LayoutLensConfig::default();
        assert!(config.set_default_ratio(AspectRatio::parse("16/9").unwrap()));
        assert_eq!(config.default_ratio, "16/9");
        assert!(!config.set_default_ratio(AspectRatio::parse("16/9").unwrap()));

        assert!(config.set_default_ratio(AspectRatio::parse("2").unwrap()));
        assert_eq!(config.default_ratio, "2");
    }

    #[test]
    fn test_default_style_colors() {
        let style = OverlayStyle::default();
        assert_eq!(style.dot_fill.to_rgba_u8(), [255, 59, 48, 242]);
        assert_eq!(style.mask.to_rgba_u8(), [0, 0, 0, 115]);
        assert_eq!(style.selected_line.to_rgba_u8(), [0, 255, 255, 255]);
    }
}

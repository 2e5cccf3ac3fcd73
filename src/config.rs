//! Editor configuration.
//!
//! [`EditorConfig`] captures the static settings of an editing session:
//! surface size and fill, the preprocess bound, default overlay footprint and
//! handle styling, the export file name, and the gallery of placeable
//! graphics. Every field has a default, so an empty JSON object is a valid
//! configuration.
//!
//! # Example
//!
//! ```
//! use livery_studio::EditorConfig;
//!
//! let config = EditorConfig::from_json(r#"{ "surface": { "width": 800 } }"#).unwrap();
//! assert_eq!(config.surface.width, 800);
//! assert_eq!(config.surface.height, 960);
//! assert_eq!(config.export.file_name, "custom-vehicle.png");
//! ```

use std::path::{Path, PathBuf};

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::geometry::SizePx;
use crate::preprocess::DEFAULT_MAX_DIMENSION;

/// An 8-bit RGBA color.
pub type Rgba8 = [u8; 4];

/// Parses a `#rrggbb` (or `#rgb`) hex string into an opaque RGBA color.
pub fn parse_color(hex: &str) -> Result<Rgba8, EditorError> {
    let rgb: Srgb<u8> = hex
        .trim()
        .parse()
        .map_err(|_| EditorError::InvalidColor(hex.to_string()))?;
    Ok([rgb.red, rgb.green, rgb.blue, 255])
}

// ============================================================================
// Surface
// ============================================================================

/// Size and background of the drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct SurfaceConfig {
    /// Surface width in logical units.
    pub width: u32,
    /// Surface height in logical units.
    pub height: u32,
    /// Fill shown where the base image does not cover the surface.
    pub background: String,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 960,
            background: "#f3f4f6".to_string(),
        }
    }
}

impl SurfaceConfig {
    pub fn size(&self) -> SizePx {
        SizePx::new(self.width, self.height)
    }
}

// ============================================================================
// Overlay handles
// ============================================================================

/// Shape of the corner handles drawn around the active overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum CornerStyle {
    #[default]
    Rect,
    Circle,
}

/// Styling of the interactive transform handles of an overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct HandleStyle {
    /// Side length of a corner handle in logical units.
    pub corner_size: f32,
    pub corner_color: String,
    pub border_color: String,
    pub corner_style: CornerStyle,
    /// When true only the outline of each corner handle is drawn.
    pub transparent_corners: bool,
}

impl Default for HandleStyle {
    fn default() -> Self {
        Self {
            corner_size: 12.0,
            corner_color: "#2563eb".to_string(),
            border_color: "#2563eb".to_string(),
            corner_style: CornerStyle::Rect,
            transparent_corners: false,
        }
    }
}

/// Defaults applied to every newly placed overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayDefaults {
    /// Width of a freshly placed overlay; height follows the aspect ratio.
    pub width: f32,
    pub handles: HandleStyle,
}

impl Default for OverlayDefaults {
    fn default() -> Self {
        Self {
            width: 100.0,
            handles: HandleStyle::default(),
        }
    }
}

// ============================================================================
// Export & gallery
// ============================================================================

/// Export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    /// File name handed to the save sink.
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "custom-vehicle.png".to_string(),
        }
    }
}

/// One placeable graphic shown in the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntry {
    /// Display name.
    pub name: String,
    /// Path of the SVG file.
    pub path: PathBuf,
}

// ============================================================================
// EditorConfig
// ============================================================================

/// Complete configuration of an editing session.
///
/// # JSON Format
///
/// ```json
/// {
///   "surface": { "width": 1200, "height": 960, "background": "#f3f4f6" },
///   "maxBaseDimension": 2048,
///   "overlay": { "width": 100, "handles": { "cornerSize": 12 } },
///   "export": { "fileName": "custom-vehicle.png" },
///   "gallery": [{ "name": "Flame", "path": "assets/flame.svg" }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub surface: SurfaceConfig,
    /// Longest side allowed for the base image before it is downsampled.
    pub max_base_dimension: u32,
    pub overlay: OverlayDefaults,
    pub export: ExportConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<GalleryEntry>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceConfig::default(),
            max_base_dimension: DEFAULT_MAX_DIMENSION,
            overlay: OverlayDefaults::default(),
            export: ExportConfig::default(),
            gallery: Vec::new(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes the config to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the config to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads and parses a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }

    /// Returns the JSON schema of the configuration format.
    #[cfg(feature = "jsonschema")]
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(EditorConfig)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_deserializes_to_defaults() {
        let config = EditorConfig::from_json("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.surface.size(), SizePx::new(1200, 960));
        assert_eq!(config.max_base_dimension, 2048);
        assert_eq!(config.overlay.width, 100.0);
        assert_eq!(config.overlay.handles.corner_style, CornerStyle::Rect);
        assert!(!config.overlay.handles.transparent_corners);
    }

    #[test]
    fn config_json_format() {
        let mut config = EditorConfig::new();
        config.gallery.push(GalleryEntry {
            name: "Stripe".into(),
            path: PathBuf::from("assets/stripe.svg"),
        });

        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"maxBaseDimension\""));
        assert!(json.contains("\"cornerSize\""));
        assert!(json.contains("\"fileName\""));
        assert!(json.contains("\"rect\""));

        let restored = EditorConfig::from_json(&json).unwrap();
        assert_eq!(restored.gallery.len(), 1);
        assert_eq!(restored.gallery[0].name, "Stripe");
    }

    #[test]
    fn partial_handles_keep_other_defaults() {
        let config =
            EditorConfig::from_json(r#"{ "overlay": { "handles": { "cornerStyle": "circle" } } }"#)
                .unwrap();
        assert_eq!(config.overlay.handles.corner_style, CornerStyle::Circle);
        assert_eq!(config.overlay.handles.corner_size, 12.0);
        assert_eq!(config.overlay.width, 100.0);
    }

    #[test]
    fn parse_hex_colors() {
        assert_eq!(parse_color("#ff0080").unwrap(), [255, 0, 128, 255]);
        assert_eq!(parse_color("#f3f4f6").unwrap(), [0xf3, 0xf4, 0xf6, 255]);
        assert!(matches!(
            parse_color("not-a-color"),
            Err(EditorError::InvalidColor(_))
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EditorConfig::from_json("{ surface: }").is_err());
    }
}

//! livery-studio: a single-page vehicle livery editor core
//!
//! This crate loads a vehicle photo as a fixed base layer, lets users stack
//! SVG overlays (decals, stripes, badges) on top of it, tone the base image
//! with brightness, contrast, saturation and hue rotation, and export the
//! composite as a PNG.
//!
//! # Example
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use livery_studio::{
//!     Editor, EditorConfig, ImageSource, Key, MemorySink, SvgSource, ToneParameter, encode_png,
//! };
//!
//! let photo = RgbaImage::from_pixel(320, 200, Rgba([30, 60, 160, 255]));
//! let base = ImageSource::Bytes(encode_png(&photo).unwrap());
//! let mut editor = Editor::open(EditorConfig::default(), &base).unwrap();
//!
//! // Place two decals; the newest one becomes the selection
//! let stripe = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="8"><rect width="40" height="8" fill="white"/></svg>"#;
//! editor.place_overlay(SvgSource::from_svg(stripe)).unwrap();
//! editor.place_overlay(SvgSource::from_svg(stripe)).unwrap();
//! editor.send_selected_to_back();
//! editor.handle_key(Key::Delete);
//!
//! editor.set_tone(ToneParameter::Saturation, -0.5);
//!
//! let mut sink = MemorySink::default();
//! editor.download(&mut sink).unwrap();
//! assert_eq!(sink.last.unwrap().0, "custom-vehicle.png");
//! ```
//!
//! # Configuration
//!
//! [`EditorConfig`] is plain serde data. It can be loaded from a JSON file
//! and, with the `jsonschema` feature, describes itself as a JSON schema:
//!
//! ```
//! use livery_studio::EditorConfig;
//!
//! let config = EditorConfig::from_json(r#"{"surface":{"width":800,"height":600}}"#).unwrap();
//! assert_eq!(config.surface.width, 800);
//! assert_eq!(config.export.file_name, "custom-vehicle.png");
//! ```

mod config;
mod editor;
mod error;
pub mod export;
mod geometry;
mod graphic;
mod placement;
mod preprocess;
mod raster;
pub mod surface;
pub mod tone;

pub use config::{
    CornerStyle, EditorConfig, ExportConfig, GalleryEntry, HandleStyle, OverlayDefaults, Rgba8,
    SurfaceConfig, parse_color,
};
pub use editor::{Editor, Key, PanelState, Tab};
pub use error::EditorError;
pub use export::{DirectorySink, MemorySink, SaveSink, encode_png, to_data_uri};
pub use geometry::{Point, Rect, SizePx};
pub use graphic::{Graphic, SvgSource};
pub use placement::{LoadedGraphic, PlacementRequest};
pub use preprocess::{
    DEFAULT_MAX_DIMENSION, ImageSource, decode_data_uri, fit_within, preprocess, try_preprocess,
};
pub use raster::{pixmap_to_rgba_image, rgba_image_to_pixmap};
pub use surface::{
    BaseLayer, ElementId, Handles, ObjectKind, OverlayElement, SceneObject, SelectionEvent,
    SelectionState, SubscriptionId, Surface,
};
pub use tone::{ToneFilter, ToneParameter, ToneParameters, TonePipeline};

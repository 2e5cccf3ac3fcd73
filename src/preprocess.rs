//! Base image loading and normalization.
//!
//! The base image is decoded once at startup, downsampled when it is larger
//! than a bound, and re-encoded as a PNG data URI so every later stage works
//! on a known-good local pixel buffer.

use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use image::imageops::FilterType;

use crate::error::EditorError;
use crate::export::{encode_png, to_data_uri};
use crate::geometry::SizePx;

/// Default bound on the longest side of the base image.
pub const DEFAULT_MAX_DIMENSION: u32 = 2048;

// ============================================================================
// ImageSource
// ============================================================================

/// A reference to raster image data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded image bytes (PNG, JPEG, ...).
    Bytes(Vec<u8>),
    /// A file on disk.
    Path(PathBuf),
    /// A `data:` URI with a base64 payload.
    DataUri(String),
}

impl ImageSource {
    /// Decodes this source into RGBA pixels.
    pub fn load(&self) -> Result<RgbaImage, EditorError> {
        let image = match self {
            Self::Bytes(bytes) => image::load_from_memory(bytes)?,
            Self::Path(path) => image::open(path)?,
            Self::DataUri(uri) => image::load_from_memory(&decode_data_uri(uri)?)?,
        };
        Ok(image.to_rgba8())
    }

    /// Returns `true` if this source is already a data URI.
    pub fn is_data_uri(&self) -> bool {
        matches!(self, Self::DataUri(_))
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Extracts the binary payload of a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, EditorError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| EditorError::InvalidDataUri("missing data: scheme".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| EditorError::InvalidDataUri("missing payload separator".into()))?;
    if !header.ends_with(";base64") {
        return Err(EditorError::InvalidDataUri(format!(
            "unsupported encoding {header:?}"
        )));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| EditorError::InvalidDataUri(e.to_string()))
}

// ============================================================================
// Preprocessing
// ============================================================================

/// Computes the size a base image is normalized to.
///
/// Images within the bound keep their size. Larger images are scaled so the
/// longer side equals `max_dimension` exactly, preserving the aspect ratio.
/// A bound of 0 disables downsampling.
pub fn fit_within(size: SizePx, max_dimension: u32) -> SizePx {
    if max_dimension == 0 || (size.width <= max_dimension && size.height <= max_dimension) {
        return size;
    }
    let ratio = max_dimension as f64 / size.longest_side() as f64;
    let scale = |side: u32| ((side as f64 * ratio).round() as u32).clamp(1, max_dimension);
    if size.width >= size.height {
        SizePx::new(max_dimension, scale(size.height))
    } else {
        SizePx::new(scale(size.width), max_dimension)
    }
}

/// Loads and normalizes a base image, failing on any load error.
pub fn try_preprocess(source: &ImageSource, max_dimension: u32) -> Result<RgbaImage, EditorError> {
    let image = source.load()?;
    let original = SizePx::new(image.width(), image.height());
    let target = fit_within(original, max_dimension);
    if target == original {
        return Ok(image);
    }

    log::debug!(
        "downsampling base image {}x{} -> {}x{}",
        original.width,
        original.height,
        target.width,
        target.height
    );
    Ok(image::imageops::resize(
        &image,
        target.width,
        target.height,
        FilterType::Lanczos3,
    ))
}

/// Normalizes a base image into a PNG data URI.
///
/// On any failure the original source is returned unchanged so surface
/// initialization can continue with it.
pub fn preprocess(source: &ImageSource, max_dimension: u32) -> ImageSource {
    let encoded = try_preprocess(source, max_dimension).and_then(|image| encode_png(&image));
    match encoded {
        Ok(png) => ImageSource::DataUri(to_data_uri(&png)),
        Err(e) => {
            log::warn!("base image preprocessing failed, using original source: {e}");
            source.clone()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]));
        encode_png(&img).unwrap()
    }

    #[test]
    fn small_image_keeps_its_size() {
        let source = ImageSource::Bytes(png_bytes(40, 20));
        let result = preprocess(&source, 64);
        assert!(result.is_data_uri());

        let img = result.load().unwrap();
        assert_eq!((img.width(), img.height()), (40, 20));
        assert_eq!(img.get_pixel(0, 0).0, [200, 30, 30, 255]);
    }

    #[test]
    fn wide_image_is_bounded() {
        let source = ImageSource::Bytes(png_bytes(300, 100));
        let img = preprocess(&source, 120).load().unwrap();
        assert_eq!(img.width(), 120);
        assert_eq!(img.height(), 40);
    }

    #[test]
    fn tall_image_is_bounded() {
        let source = ImageSource::Bytes(png_bytes(70, 210));
        let img = try_preprocess(&source, 90).unwrap();
        assert_eq!(img.height(), 90);
        assert_eq!(img.width(), 30);
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        for (w, h) in [(4000, 3000), (2049, 17), (333, 5000), (2500, 2500)] {
            let original = SizePx::new(w, h);
            let fitted = fit_within(original, 2048);
            assert_eq!(fitted.longest_side(), 2048);
            let drift = (fitted.aspect_ratio() - original.aspect_ratio()).abs()
                / original.aspect_ratio();
            let tolerance = 1.0 / fitted.width.min(fitted.height) as f32;
            assert!(drift <= tolerance, "{w}x{h} -> {fitted:?}");
        }
    }

    #[test]
    fn zero_bound_disables_downsampling() {
        assert_eq!(fit_within(SizePx::new(4000, 30), 0), SizePx::new(4000, 30));

        let img = try_preprocess(&ImageSource::Bytes(png_bytes(80, 40)), 0).unwrap();
        assert_eq!((img.width(), img.height()), (80, 40));
        assert!(preprocess(&ImageSource::Bytes(png_bytes(80, 40)), 0).is_data_uri());
    }

    #[test]
    fn failure_falls_back_to_original_source() {
        let source = ImageSource::Bytes(vec![1, 2, 3, 4]);
        assert_eq!(preprocess(&source, 2048), source);

        let missing = ImageSource::Path(PathBuf::from("/definitely/not/here.png"));
        assert_eq!(preprocess(&missing, 2048), missing);
    }

    #[test]
    fn data_uri_round_trips_through_load() {
        let uri = to_data_uri(&png_bytes(3, 5));
        let img = ImageSource::DataUri(uri).load().unwrap();
        assert_eq!((img.width(), img.height()), (3, 5));
    }

    #[test]
    fn malformed_data_uris_are_rejected() {
        assert!(decode_data_uri("image/png;base64,AAAA").is_err());
        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
    }
}

//! Error type shared by every fallible editor operation.

use thiserror::Error;

/// Errors produced while loading assets, parsing configuration, or encoding output.
///
/// Most editor actions cannot fail. Only resource loads (base image, overlay
/// graphics, configuration files) and the final PNG encode return this type.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Reading a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Raster data could not be decoded or encoded by the `image` crate.
    #[error("image error: {0}")]
    Decode(#[from] image::ImageError),

    /// A `data:` URI was malformed or its payload was not valid base64.
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),

    /// SVG markup could not be parsed.
    #[error("failed to parse SVG: {0}")]
    SvgParse(#[from] resvg::usvg::Error),

    /// An SVG source could not be resolved to markup (e.g. unknown emoji).
    #[error("unresolved graphic source: {0}")]
    UnresolvedSource(String),

    /// A color string in the configuration was not a `#rrggbb` hex value.
    #[error("invalid color {0:?}")]
    InvalidColor(String),

    /// A pixel buffer could not be allocated or encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// The configuration JSON was malformed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The operation needs a live surface but the editor was disposed.
    #[error("surface has been disposed")]
    EmptySurface,
}

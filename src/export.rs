//! PNG encoding and client-side delivery of the composited surface.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use crate::error::EditorError;

/// Encodes pixels as a lossless PNG at the highest compression setting.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, EditorError> {
    let mut bytes = Vec::new();
    PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, FilterType::Adaptive)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )?;
    Ok(bytes)
}

/// Wraps PNG bytes in a `data:image/png;base64,` URI.
pub fn to_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

// ============================================================================
// Save sinks
// ============================================================================

/// Destination of a download triggered by the editor.
///
/// The editor never transmits anything over the network; a sink decides
/// where the bytes land on the client.
pub trait SaveSink {
    /// Delivers `png` under `file_name`.
    fn save(&mut self, file_name: &str, png: &[u8]) -> Result<(), EditorError>;
}

/// Writes downloads into a directory on the local file system.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveSink for DirectorySink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> Result<(), EditorError> {
        let path = self.dir.join(file_name);
        std::fs::write(&path, png)?;
        log::info!("saved {} ({} bytes)", path.display(), png.len());
        Ok(())
    }
}

/// Keeps the most recent download in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// File name and bytes of the last download, if any.
    pub last: Option<(String, Vec<u8>)>,
}

impl SaveSink for MemorySink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> Result<(), EditorError> {
        self.last = Some((file_name.to_string(), png.to_vec()));
        Ok(())
    }
}

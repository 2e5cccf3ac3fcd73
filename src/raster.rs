//! Conversions between `image` buffers and tiny-skia pixmaps.
//!
//! tiny-skia stores premultiplied alpha while `image` stores straight alpha,
//! so every crossing converts explicitly.

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{IntSize, Pixmap};

use crate::error::EditorError;

/// Allocates a pixmap, failing for zero-sized or oversized dimensions.
pub fn new_pixmap(width: u32, height: u32) -> Result<Pixmap, EditorError> {
    Pixmap::new(width, height)
        .ok_or_else(|| EditorError::Encode(format!("cannot allocate {width}x{height} pixmap")))
}

/// Converts straight-alpha RGBA pixels into a premultiplied pixmap.
pub fn rgba_image_to_pixmap(image: &RgbaImage) -> Result<Pixmap, EditorError> {
    let size = IntSize::from_wh(image.width(), image.height()).ok_or_else(|| {
        EditorError::Encode(format!(
            "invalid image size {}x{}",
            image.width(),
            image.height()
        ))
    })?;

    let mut data = Vec::with_capacity(image.as_raw().len());
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        data.extend_from_slice(&premultiply(r, g, b, a));
    }

    Pixmap::from_vec(data, size)
        .ok_or_else(|| EditorError::Encode("pixmap buffer size mismatch".into()))
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let (r, g, b, a) = unpremultiply(src.red(), src.green(), src.blue(), src.alpha());
        *dst = Rgba([r, g, b, a]);
    }
    img
}

fn premultiply(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    let scale = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
    [scale(r), scale(g), scale(b), a]
}

/// Unpremultiplies a premultiplied alpha pixel.
fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        (0, 0, 0, 0)
    } else {
        let a_f = a as f32 / 255.0;
        (
            (r as f32 / a_f).round().min(255.0) as u8,
            (g as f32 / a_f).round().min(255.0) as u8,
            (b as f32 / a_f).round().min(255.0) as u8,
            a,
        )
    }
}

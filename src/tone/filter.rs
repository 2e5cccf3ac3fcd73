//! Per-pixel tone filters applied to the base layer.

use image::RgbaImage;
use palette::{Hsl, IntoColor, Srgb};

/// One step of the base layer's filter chain.
///
/// A filter with a neutral value leaves every pixel bit-identical. Values
/// outside their documented range are clamped when applied, and non-finite
/// values are treated as neutral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneFilter {
    /// Additive offset in [-1, 1] of the full channel range.
    Brightness(f32),
    /// Contrast in [-1, 1] around the channel midpoint.
    Contrast(f32),
    /// Relative saturation change in [-1, 1].
    Saturation(f32),
    /// Hue rotation in degrees.
    HueRotation(f32),
}

impl ToneFilter {
    /// Returns true if applying this filter cannot change any pixel.
    pub fn is_neutral(&self) -> bool {
        match *self {
            Self::Brightness(v) | Self::Contrast(v) | Self::Saturation(v) => {
                !v.is_finite() || v == 0.0
            }
            Self::HueRotation(degrees) => {
                !degrees.is_finite() || degrees.rem_euclid(360.0) == 0.0
            }
        }
    }

    /// Applies the filter to every non-transparent pixel of `image`.
    pub fn apply(&self, image: &mut RgbaImage) {
        if self.is_neutral() {
            return;
        }

        match *self {
            Self::Brightness(value) => {
                let offset = value.clamp(-1.0, 1.0) * 255.0;
                map_channels(image, |c| c + offset);
            }
            Self::Contrast(value) => {
                let c = value.clamp(-1.0, 1.0) * 255.0;
                let factor = (259.0 * (c + 255.0)) / (255.0 * (259.0 - c));
                map_channels(image, |v| factor * (v - 128.0) + 128.0);
            }
            Self::Saturation(value) => {
                let factor = 1.0 + value.clamp(-1.0, 1.0);
                map_hsl(image, |hsl| {
                    hsl.saturation = (hsl.saturation * factor).clamp(0.0, 1.0);
                });
            }
            Self::HueRotation(degrees) => {
                map_hsl(image, |hsl| hsl.hue += degrees);
            }
        }
    }
}

/// Applies a whole chain in order to a copy of `source`.
pub fn apply_chain(source: &RgbaImage, chain: &[ToneFilter]) -> RgbaImage {
    let mut result = source.clone();
    for filter in chain {
        filter.apply(&mut result);
    }
    result
}

// ============================================================================
// Helper Functions
// ============================================================================

fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn map_channels(image: &mut RgbaImage, f: impl Fn(f32) -> f32) {
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            continue;
        }
        pixel.0 = [
            to_u8(f(r as f32)),
            to_u8(f(g as f32)),
            to_u8(f(b as f32)),
            a,
        ];
    }
}

fn map_hsl(image: &mut RgbaImage, f: impl Fn(&mut Hsl)) {
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            continue;
        }

        let rgb = Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        let mut hsl: Hsl = rgb.into_color();
        f(&mut hsl);
        let out: Srgb = hsl.into_color();

        pixel.0 = [
            to_u8(out.red * 255.0),
            to_u8(out.green * 255.0),
            to_u8(out.blue * 255.0),
            a,
        ];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(4, 4, Rgba(rgba))
    }

    #[test]
    fn neutral_filters_are_identity() {
        let mut img = solid([37, 140, 201, 255]);
        img.put_pixel(1, 1, Rgba([255, 254, 1, 77]));
        let chain = [
            ToneFilter::Brightness(0.0),
            ToneFilter::Contrast(0.0),
            ToneFilter::Saturation(0.0),
            ToneFilter::HueRotation(0.0),
        ];
        assert!(chain.iter().all(ToneFilter::is_neutral));
        assert_eq!(apply_chain(&img, &chain), img);
    }

    #[test]
    fn full_turn_hue_is_neutral() {
        assert!(ToneFilter::HueRotation(360.0).is_neutral());
        assert!(!ToneFilter::HueRotation(90.0).is_neutral());
    }

    #[test]
    fn brightness_offsets_and_clamps() {
        let mut img = solid([100, 200, 250, 255]);
        ToneFilter::Brightness(0.2).apply(&mut img);
        assert_eq!(img.get_pixel(0, 0).0, [151, 251, 255, 255]);

        let mut dark = solid([10, 20, 30, 255]);
        ToneFilter::Brightness(-1.0).apply(&mut dark);
        assert_eq!(dark.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn contrast_spreads_from_midpoint() {
        let mut img = solid([100, 128, 160, 255]);
        ToneFilter::Contrast(0.5).apply(&mut img);
        let [r, g, b, _] = img.get_pixel(0, 0).0;
        assert!(r < 100);
        assert_eq!(g, 128);
        assert!(b > 160);

        let mut flat = solid([0, 128, 255, 255]);
        ToneFilter::Contrast(-1.0).apply(&mut flat);
        assert_eq!(flat.get_pixel(0, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn full_desaturation_is_gray() {
        let mut img = solid([200, 40, 40, 255]);
        ToneFilter::Saturation(-1.0).apply(&mut img);
        let [r, g, b, _] = img.get_pixel(0, 0).0;
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn hue_rotation_moves_red_to_green() {
        let mut img = solid([255, 0, 0, 255]);
        ToneFilter::HueRotation(120.0).apply(&mut img);
        let pixel = img.get_pixel(0, 0);
        assert!(pixel[1] > pixel[0], "Green should be > Red after 120° rotation");
        assert!(pixel[1] > pixel[2], "Green should be > Blue after 120° rotation");
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut strong = solid([100, 128, 160, 255]);
        ToneFilter::Contrast(3.0).apply(&mut strong);
        let mut full = solid([100, 128, 160, 255]);
        ToneFilter::Contrast(1.0).apply(&mut full);
        assert_eq!(strong, full);
        assert_eq!(strong.get_pixel(0, 0).0, [0, 128, 255, 255]);

        let mut bright = solid([10, 20, 30, 255]);
        ToneFilter::Brightness(7.0).apply(&mut bright);
        assert_eq!(bright.get_pixel(0, 0).0, [255, 255, 255, 255]);

        let mut gray = solid([200, 40, 40, 255]);
        ToneFilter::Saturation(-4.0).apply(&mut gray);
        let [r, g, b, _] = gray.get_pixel(0, 0).0;
        assert!(r == g && g == b);
    }

    #[test]
    fn non_finite_values_are_neutral() {
        let img = solid([37, 140, 201, 255]);
        let chain = [
            ToneFilter::Brightness(f32::NAN),
            ToneFilter::Contrast(f32::INFINITY),
            ToneFilter::HueRotation(f32::NEG_INFINITY),
        ];
        assert!(chain.iter().all(ToneFilter::is_neutral));
        assert_eq!(apply_chain(&img, &chain), img);
    }

    #[test]
    fn transparent_pixels_are_skipped() {
        let mut img = solid([50, 60, 70, 0]);
        ToneFilter::Brightness(0.5).apply(&mut img);
        ToneFilter::HueRotation(45.0).apply(&mut img);
        assert_eq!(img.get_pixel(0, 0).0, [50, 60, 70, 0]);
    }
}

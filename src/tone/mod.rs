//! Tone adjustment parameters and the filter chain they produce.
//!
//! The pipeline holds four independent values. Any change rebuilds the full
//! chain (always four filters, fixed order) which the editor then applies to
//! the base layer only.

pub mod filter;

pub use filter::ToneFilter;

/// Identifies one of the four tone parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToneParameter {
    Brightness,
    Contrast,
    Saturation,
    HueRotation,
}

impl ToneParameter {
    /// All parameters in chain order.
    pub const ALL: [Self; 4] = [
        Self::Brightness,
        Self::Contrast,
        Self::Saturation,
        Self::HueRotation,
    ];

    /// Inclusive range accepted for this parameter.
    pub fn range(&self) -> (f32, f32) {
        match self {
            Self::Brightness | Self::Contrast | Self::Saturation => (-1.0, 1.0),
            Self::HueRotation => (0.0, 360.0),
        }
    }
}

/// Current tone values. The default is all zero, which renders the base
/// layer unfiltered.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ToneParameters {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    /// Degrees in [0, 360].
    pub hue_rotation: f32,
}

impl ToneParameters {
    pub fn get(&self, parameter: ToneParameter) -> f32 {
        match parameter {
            ToneParameter::Brightness => self.brightness,
            ToneParameter::Contrast => self.contrast,
            ToneParameter::Saturation => self.saturation,
            ToneParameter::HueRotation => self.hue_rotation,
        }
    }

    /// Sets one value, clamped into the parameter's range. NaN becomes zero.
    pub fn set(&mut self, parameter: ToneParameter, value: f32) {
        let (min, max) = parameter.range();
        let value = if value.is_nan() { 0.0 } else { value.clamp(min, max) };
        match parameter {
            ToneParameter::Brightness => self.brightness = value,
            ToneParameter::Contrast => self.contrast = value,
            ToneParameter::Saturation => self.saturation = value,
            ToneParameter::HueRotation => self.hue_rotation = value,
        }
    }

    /// Builds the filter chain for these values.
    ///
    /// The chain always holds exactly four filters in the order brightness,
    /// contrast, saturation, hue rotation, neutral ones included.
    pub fn filter_chain(&self) -> [ToneFilter; 4] {
        [
            ToneFilter::Brightness(self.brightness),
            ToneFilter::Contrast(self.contrast),
            ToneFilter::Saturation(self.saturation),
            ToneFilter::HueRotation(self.hue_rotation),
        ]
    }
}

/// Holds the tone parameters and counts recomputations.
#[derive(Debug, Clone, Default)]
pub struct TonePipeline {
    params: ToneParameters,
    version: u64,
}

impl TonePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> ToneParameters {
        self.params
    }

    /// Number of chain rebuilds so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Updates one parameter and returns the rebuilt chain.
    pub fn set(&mut self, parameter: ToneParameter, value: f32) -> [ToneFilter; 4] {
        self.params.set(parameter, value);
        self.rebuild()
    }

    /// Assigns zero to every parameter and returns the rebuilt chain.
    pub fn reset(&mut self) -> [ToneFilter; 4] {
        for parameter in ToneParameter::ALL {
            self.params.set(parameter, 0.0);
        }
        self.rebuild()
    }

    fn rebuild(&mut self) -> [ToneFilter; 4] {
        self.version = self.version.wrapping_add(1);
        log::debug!("tone chain rebuilt (v{}): {:?}", self.version, self.params);
        self.params.filter_chain()
    }
}

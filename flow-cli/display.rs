//! Display conversion: min-max normalization plus a gamma lookup table,
//! mapping a real-valued grid to 8-bit samples for visualization only.

/// Explicitly owned gamma lookup table.
///
/// The 256-entry table is built at construction and rebuilt only when a
/// different gamma is requested, so repeated conversions with the same
/// parameter pay for one table build. Owning the cache here keeps the
/// invalidation visible at the call site instead of living in hidden
/// process-wide state.
#[derive(Debug, Clone)]
pub struct GammaLut {
    gamma: f32,
    table: [u8; 256],
}

impl GammaLut {
    pub fn new(gamma: f32) -> Self {
        let mut lut = GammaLut {
            gamma: f32::NAN,
            table: [0; 256],
        };
        lut.set_gamma(gamma);
        lut
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// Rebuild the table if `gamma` differs from the cached parameter.
    pub fn set_gamma(&mut self, gamma: f32) {
        if gamma == self.gamma {
            return;
        }
        let exponent = 1.0 / gamma;
        for (i, entry) in self.table.iter_mut().enumerate() {
            let linear = i as f32 / 255.0;
            *entry = (linear.powf(exponent) * 255.0).round() as u8;
        }
        self.gamma = gamma;
    }

    /// Map a normalized sample in [0, 1] to an 8-bit display value.
    #[inline]
    pub fn map(&self, normalized: f32) -> u8 {
        let idx = (normalized.clamp(0.0, 1.0) * 255.0).round() as usize;
        self.table[idx]
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Min-max normalize a sample grid and map it through the gamma table.
///
/// A zero-range (constant) input degenerates to an all-zero output rather
/// than dividing by zero.
pub fn to_display_8bit(samples: &[f32], lut: &GammaLut) -> Vec<u8> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut minimum = samples[0];
    let mut maximum = samples[0];
    for &v in samples {
        minimum = minimum.min(v);
        maximum = maximum.max(v);
    }

    let range = maximum - minimum;
    if range == 0.0 {
        return vec![0; samples.len()];
    }

    samples
        .iter()
        .map(|&v| lut.map((v - minimum) / range))
        .collect()
}

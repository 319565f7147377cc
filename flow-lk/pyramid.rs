use flow_core::Samples;
use flow_corners::{convolve, Kernel};

use crate::error::{FlowError, FlowResult};

/// One pyramid level: samples plus its dimensions.
#[derive(Debug, Clone)]
pub struct PyramidLevel {
    pub samples: Samples,
    pub width: usize,
    pub height: usize,
}

/// Coarse-to-fine image pyramid. Level 0 is full resolution; each
/// subsequent level is Gaussian-smoothed and subsampled by 2.
#[derive(Debug, Clone)]
pub struct Pyramid {
    levels: Vec<PyramidLevel>,
}

/// Smallest dimension a pyramid level may have; building stops early when
/// halving would go below this.
const MIN_LEVEL_DIM: usize = 8;

impl Pyramid {
    /// Build a pyramid with up to `num_levels` levels.
    ///
    /// Fewer levels are produced when the image is too small to halve
    /// further; at least the full-resolution level is always present.
    pub fn build(
        image: &[f32],
        width: usize,
        height: usize,
        num_levels: usize,
    ) -> FlowResult<Pyramid> {
        if width == 0 || height == 0 {
            return Err(FlowError::InvalidImageSize { width, height });
        }
        if image.len() != width * height {
            return Err(FlowError::InvalidImageData {
                expected_len: width * height,
                actual_len: image.len(),
            });
        }
        if num_levels == 0 {
            return Err(FlowError::InvalidLevels { levels: num_levels });
        }

        let mut levels = Vec::with_capacity(num_levels);
        levels.push(PyramidLevel {
            samples: image.to_vec(),
            width,
            height,
        });

        let gaussian = Kernel::gaussian_3x3();
        while levels.len() < num_levels {
            let prev = &levels[levels.len() - 1];
            let (w2, h2) = (prev.width / 2, prev.height / 2);
            if w2 < MIN_LEVEL_DIM || h2 < MIN_LEVEL_DIM {
                break;
            }

            let smoothed = convolve(&prev.samples, prev.width, prev.height, &gaussian);
            let mut samples = vec![0.0f32; w2 * h2];
            for y in 0..h2 {
                for x in 0..w2 {
                    samples[y * w2 + x] = smoothed[(2 * y) * prev.width + 2 * x];
                }
            }
            levels.push(PyramidLevel {
                samples,
                width: w2,
                height: h2,
            });
        }

        Ok(Pyramid { levels })
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, i: usize) -> &PyramidLevel {
        &self.levels[i]
    }

    /// Full-resolution dimensions.
    pub fn base_dimensions(&self) -> (usize, usize) {
        (self.levels[0].width, self.levels[0].height)
    }
}

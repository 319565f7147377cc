use flow_core::{Corner, FlowMatch, Point};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, FlowResult};
use crate::pyramid::{Pyramid, PyramidLevel};

/// Normal-matrix determinant below this is treated as untrackable
/// (textureless or aperture-ambiguous window).
const DET_EPSILON: f32 = 1e-6;

/// Sample an image at fractional coordinates with bilinear interpolation.
/// Coordinates outside the image replicate the nearest edge pixel, matching
/// the convolution engine's border policy.
pub fn sample_bilinear(samples: &[f32], width: usize, height: usize, x: f32, y: f32) -> f32 {
    let x = x.clamp(0.0, (width - 1) as f32);
    let y = y.clamp(0.0, (height - 1) as f32);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = samples[y0 * width + x0];
    let p10 = samples[y0 * width + x1];
    let p01 = samples[y1 * width + x0];
    let p11 = samples[y1 * width + x1];

    (1.0 - fx) * (1.0 - fy) * p00
        + fx * (1.0 - fy) * p10
        + (1.0 - fx) * fy * p01
        + fx * fy * p11
}

/// Pyramidal Lucas-Kanade tracker.
///
/// Template gradients are evaluated once per level in the previous frame,
/// so the 2x2 normal matrix is constant across iterations; only the
/// temporal error against the next frame is resampled as the displacement
/// estimate moves.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LkTracker {
    /// Window half-size; the tracked patch is `(2r + 1)^2` pixels.
    pub window_radius: usize,
    /// Iteration cap per pyramid level.
    pub max_iterations: usize,
    /// Convergence threshold on the per-iteration update, in pixels.
    pub epsilon: f32,
    /// Pyramid depth, including the full-resolution level.
    pub num_levels: usize,
}

impl Default for LkTracker {
    fn default() -> Self {
        Self {
            window_radius: 7,
            max_iterations: 30,
            epsilon: 0.01,
            num_levels: 3,
        }
    }
}

impl LkTracker {
    /// Create a tracker with validated parameters.
    pub fn new(
        window_radius: usize,
        max_iterations: usize,
        epsilon: f32,
        num_levels: usize,
    ) -> FlowResult<Self> {
        if window_radius == 0 {
            return Err(FlowError::InvalidWindow { radius: window_radius });
        }
        if num_levels == 0 {
            return Err(FlowError::InvalidLevels { levels: num_levels });
        }
        Ok(Self {
            window_radius,
            max_iterations,
            epsilon,
            num_levels,
        })
    }

    /// Track corners from the previous frame into the next frame.
    ///
    /// Untrackable corners (singular normal matrix at any pyramid level, or
    /// a final position outside the image) are dropped from the output;
    /// each returned match carries its own source corner, so the result
    /// stays aligned without placeholder entries. An empty *input* is an
    /// error: "nothing to track" and "nothing could be tracked" are
    /// different caller-visible conditions.
    pub fn track(
        &self,
        prev: &Pyramid,
        next: &Pyramid,
        corners: &[Corner],
    ) -> FlowResult<Vec<FlowMatch>> {
        if corners.is_empty() {
            return Err(FlowError::NoFeatures);
        }
        if prev.base_dimensions() != next.base_dimensions() {
            return Err(FlowError::MismatchedFrames {
                prev: prev.base_dimensions(),
                next: next.base_dimensions(),
            });
        }

        // Features are independent of each other; track them in parallel.
        Ok(corners
            .par_iter()
            .filter_map(|c| self.track_single(prev, next, c))
            .collect())
    }

    /// Convenience wrapper that builds both pyramids and tracks.
    pub fn track_frames(
        &self,
        prev_frame: &[f32],
        next_frame: &[f32],
        width: usize,
        height: usize,
        corners: &[Corner],
    ) -> FlowResult<Vec<FlowMatch>> {
        let prev = Pyramid::build(prev_frame, width, height, self.num_levels)?;
        let next = Pyramid::build(next_frame, width, height, self.num_levels)?;
        self.track(&prev, &next, corners)
    }

    /// Track one corner coarse-to-fine. Returns `None` when the feature is
    /// untrackable at any level, intentionally fail-fast rather than
    /// retrying at a finer level with a larger window.
    fn track_single(&self, prev: &Pyramid, next: &Pyramid, corner: &Corner) -> Option<FlowMatch> {
        let levels = self
            .num_levels
            .min(prev.num_levels())
            .min(next.num_levels());

        let r = self.window_radius as isize;
        let window_len = (2 * self.window_radius + 1) * (2 * self.window_radius + 1);
        let mut template = vec![0.0f32; window_len];
        let mut grad_x = vec![0.0f32; window_len];
        let mut grad_y = vec![0.0f32; window_len];

        let mut dx = 0.0f32;
        let mut dy = 0.0f32;

        for level in (0..levels).rev() {
            let prev_level = prev.level(level);
            let next_level = next.level(level);

            let scale = 1.0 / (1u32 << level) as f32;
            let fx = corner.x as f32 * scale;
            let fy = corner.y as f32 * scale;

            // Template values, central-difference gradients, and the 2x2
            // normal matrix: all fixed for this level.
            let mut m00 = 0.0f32;
            let mut m01 = 0.0f32;
            let mut m11 = 0.0f32;
            let mut idx = 0;
            for wy in -r..=r {
                for wx in -r..=r {
                    let tx = fx + wx as f32;
                    let ty = fy + wy as f32;
                    template[idx] = sample_level(prev_level, tx, ty);
                    let gx = 0.5
                        * (sample_level(prev_level, tx + 1.0, ty)
                            - sample_level(prev_level, tx - 1.0, ty));
                    let gy = 0.5
                        * (sample_level(prev_level, tx, ty + 1.0)
                            - sample_level(prev_level, tx, ty - 1.0));
                    grad_x[idx] = gx;
                    grad_y[idx] = gy;
                    m00 += gx * gx;
                    m01 += gx * gy;
                    m11 += gy * gy;
                    idx += 1;
                }
            }

            let det = m00 * m11 - m01 * m01;
            if det.abs() < DET_EPSILON {
                return None;
            }
            let inv_det = 1.0 / det;
            let i00 = inv_det * m11;
            let i01 = -inv_det * m01;
            let i11 = inv_det * m00;

            for _ in 0..self.max_iterations {
                // b accumulates (-Ix*It, -Iy*It) over the displaced window.
                let mut b0 = 0.0f32;
                let mut b1 = 0.0f32;
                let mut idx = 0;
                for wy in -r..=r {
                    for wx in -r..=r {
                        let sx = fx + dx + wx as f32;
                        let sy = fy + dy + wy as f32;
                        let it = sample_level(next_level, sx, sy) - template[idx];
                        b0 -= grad_x[idx] * it;
                        b1 -= grad_y[idx] * it;
                        idx += 1;
                    }
                }

                let delta_x = i00 * b0 + i01 * b1;
                let delta_y = i01 * b0 + i11 * b1;
                dx += delta_x;
                dy += delta_y;

                if delta_x * delta_x + delta_y * delta_y < self.epsilon * self.epsilon {
                    break;
                }
            }

            // Seed the next finer level with the doubled estimate.
            if level > 0 {
                dx *= 2.0;
                dy *= 2.0;
            }
        }

        let tracked_x = corner.x as f32 + dx;
        let tracked_y = corner.y as f32 + dy;
        let (width, height) = prev.base_dimensions();
        if tracked_x < 0.0
            || tracked_y < 0.0
            || tracked_x >= width as f32
            || tracked_y >= height as f32
        {
            return None;
        }

        Some(FlowMatch {
            source: *corner,
            tracked: Point {
                x: tracked_x,
                y: tracked_y,
            },
        })
    }
}

#[inline]
fn sample_level(level: &PyramidLevel, x: f32, y: f32) -> f32 {
    sample_bilinear(&level.samples, level.width, level.height, x, y)
}

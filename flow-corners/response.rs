use crate::tensor::TensorField;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which scalar reduction turns the structure tensor into a corner score.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResponseKind {
    /// `det(M) - k * trace(M)^2`. Larger `k` suppresses edge responses
    /// relative to corners; 0.04 to 0.06 is the usual range.
    Harris { k: f32 },
    /// Minimum eigenvalue of the 2x2 tensor, solved in closed form.
    ShiTomasi,
}

/// Reduce a tensor field to a per-pixel corner score.
pub fn corner_response(tensor: &TensorField, kind: ResponseKind) -> Vec<f32> {
    match kind {
        ResponseKind::Harris { k } => harris(tensor, k),
        ResponseKind::ShiTomasi => shi_tomasi(tensor),
    }
}

/// Harris criterion: `det(M) - k * trace(M)^2`.
pub fn harris(tensor: &TensorField, k: f32) -> Vec<f32> {
    let n = tensor.len();
    let mut response = vec![0.0f32; n];
    for i in 0..n {
        let det = tensor.ixx[i] * tensor.iyy[i] - tensor.ixy[i] * tensor.ixy[i];
        let trace = tensor.ixx[i] + tensor.iyy[i];
        response[i] = det - k * trace * trace;
    }
    response
}

/// Shi-Tomasi criterion: the smaller eigenvalue of the 2x2 tensor.
///
/// `lambda = trace/2 - sqrt(trace^2 - 4*det)/2`. Floating-point round-off
/// can push the discriminant slightly negative on near-degenerate tensors,
/// so it is clamped to zero before the square root.
pub fn shi_tomasi(tensor: &TensorField) -> Vec<f32> {
    let n = tensor.len();
    let mut response = vec![0.0f32; n];
    for i in 0..n {
        let det = tensor.ixx[i] * tensor.iyy[i] - tensor.ixy[i] * tensor.ixy[i];
        let trace = tensor.ixx[i] + tensor.iyy[i];
        let discriminant = (trace * trace - 4.0 * det).max(0.0);
        response[i] = 0.5 * (trace - discriminant.sqrt());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::structure_tensor;

    fn lone_point_image(width: usize, height: usize) -> Vec<f32> {
        let mut image = vec![0.0f32; width * height];
        image[(height / 2) * width + width / 2] = 100.0;
        image
    }

    #[test]
    fn test_lone_point_is_local_maximum_harris() {
        let image = lone_point_image(9, 9);
        let t = structure_tensor(&image, 9, 9, 3, false);
        let r = harris(&t, 0.04);
        let center = 4 * 9 + 4;
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let i = ((4 + dy) * 9 + 4 + dx) as usize;
                assert!(
                    r[center] >= r[i],
                    "harris response at neighbor ({},{}) exceeds center",
                    dx,
                    dy
                );
            }
        }
    }

    #[test]
    fn test_lone_point_is_local_maximum_shi_tomasi() {
        let image = lone_point_image(9, 9);
        let t = structure_tensor(&image, 9, 9, 3, false);
        let r = shi_tomasi(&t);
        let center = 4 * 9 + 4;
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let i = ((4 + dy) * 9 + 4 + dx) as usize;
                assert!(r[center] >= r[i]);
            }
        }
    }

    #[test]
    fn test_shi_tomasi_never_nan_on_degenerate_tensor() {
        // A pure edge makes the tensor rank-1: det ~ 0, and round-off can
        // make the naive discriminant negative.
        let mut image = vec![0.0f32; 8 * 8];
        for y in 0..8 {
            for x in 4..8 {
                image[y * 8 + x] = 17.3;
            }
        }
        let t = structure_tensor(&image, 8, 8, 3, false);
        for v in shi_tomasi(&t) {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_edge_scores_below_corner_shi_tomasi() {
        // An L-shaped corner scores higher than a straight edge.
        let mut image = vec![0.0f32; 16 * 16];
        for y in 0..16 {
            for x in 0..16 {
                if x >= 8 && y >= 8 {
                    image[y * 16 + x] = 10.0;
                }
            }
        }
        let t = structure_tensor(&image, 16, 16, 3, false);
        let r = shi_tomasi(&t);
        let corner = r[8 * 16 + 8];
        let edge = r[12 * 16 + 8]; // mid-edge, far from the corner
        assert!(corner > edge);
    }

    #[test]
    fn test_flat_image_zero_response() {
        let image = vec![3.0f32; 8 * 8];
        let t = structure_tensor(&image, 8, 8, 3, false);
        for v in corner_response(&t, ResponseKind::Harris { k: 0.04 }) {
            assert!(v.abs() < 1e-5);
        }
        for v in corner_response(&t, ResponseKind::ShiTomasi) {
            assert!(v.abs() < 1e-5);
        }
    }
}

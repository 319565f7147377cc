use flow_core::Samples;

use crate::convolve::{box_filter, convolve, Kernel};

/// Per-pixel structure tensor stored as three planar grids: the smoothed
/// gradient second moments (Ix^2, Ix*Iy, Iy^2). All planes share the
/// dimensions of the source image.
#[derive(Debug, Clone)]
pub struct TensorField {
    pub ixx: Samples,
    pub ixy: Samples,
    pub iyy: Samples,
}

impl TensorField {
    pub fn len(&self) -> usize {
        self.ixx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ixx.is_empty()
    }
}

/// Build the smoothed structure tensor of an image.
///
/// Gradients come from fixed 3x3 Sobel kernels; the raw per-pixel outer
/// product is then smoothed plane by plane with a separable box window of
/// `block_size`. The window sums unless `normalized` is set; summing
/// matches the classic Harris formulation, and the choice scales the
/// effective sensitivity, so it is an explicit parameter rather than a
/// hidden default.
pub fn structure_tensor(
    image: &[f32],
    width: usize,
    height: usize,
    block_size: usize,
    normalized: bool,
) -> TensorField {
    let gx = convolve(image, width, height, &Kernel::sobel_x());
    let gy = convolve(image, width, height, &Kernel::sobel_y());

    let n = width * height;
    let mut ixx = vec![0.0f32; n];
    let mut ixy = vec![0.0f32; n];
    let mut iyy = vec![0.0f32; n];
    for i in 0..n {
        ixx[i] = gx[i] * gx[i];
        ixy[i] = gx[i] * gy[i];
        iyy[i] = gy[i] * gy[i];
    }

    TensorField {
        ixx: box_filter(&ixx, width, height, block_size, normalized),
        ixy: box_filter(&ixy, width, height, block_size, normalized),
        iyy: box_filter(&iyy, width, height, block_size, normalized),
    }
}

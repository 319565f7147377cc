use rayon::prelude::*;

/// Immutable 2-D convolution kernel, anchored at its geometric center.
///
/// Odd dimensions are assumed for symmetric centering; even-sized kernels
/// are a precondition violation of the callers in this crate and are not
/// checked in the hot loop. Non-square and 1xN / Nx1 kernels are supported,
/// the latter being how the separable box filter is expressed as two 1-D
/// passes.
#[derive(Debug, Clone)]
pub struct Kernel {
    rows: usize,
    cols: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Create a kernel from row-major weights.
    ///
    /// # Panics
    /// Panics if `weights.len() != rows * cols` or either dimension is 0.
    pub fn new(rows: usize, cols: usize, weights: Vec<f32>) -> Self {
        assert!(rows > 0 && cols > 0, "kernel dimensions must be > 0");
        assert_eq!(
            weights.len(),
            rows * cols,
            "kernel weights length ({}) must equal rows * cols ({})",
            weights.len(),
            rows * cols,
        );
        Kernel { rows, cols, weights }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub(crate) fn weight(&self, row: usize, col: usize) -> f32 {
        self.weights[row * self.cols + col]
    }

    /// 3x3 Sobel derivative kernel in the x direction.
    pub fn sobel_x() -> Self {
        Kernel::new(3, 3, vec![
            -1.0, 0.0, 1.0,
            -2.0, 0.0, 2.0,
            -1.0, 0.0, 1.0,
        ])
    }

    /// 3x3 Sobel derivative kernel in the y direction.
    pub fn sobel_y() -> Self {
        Kernel::new(3, 3, vec![
            1.0, 2.0, 1.0,
            0.0, 0.0, 0.0,
            -1.0, -2.0, -1.0,
        ])
    }

    /// 3x3 binomial Gaussian used for pyramid smoothing.
    pub fn gaussian_3x3() -> Self {
        Kernel::new(3, 3, vec![
            1.0 / 16.0, 1.0 / 8.0, 1.0 / 16.0,
            1.0 / 8.0, 1.0 / 4.0, 1.0 / 8.0,
            1.0 / 16.0, 1.0 / 8.0, 1.0 / 16.0,
        ])
    }

    /// 1xN horizontal box kernel with uniform weight `w`.
    pub fn box_row(n: usize, w: f32) -> Self {
        Kernel::new(1, n, vec![w; n])
    }

    /// Nx1 vertical box kernel with uniform weight `w`.
    pub fn box_col(n: usize, w: f32) -> Self {
        Kernel::new(n, 1, vec![w; n])
    }
}

/// Convolve a single-channel sample grid with a kernel.
///
/// Samples beyond the image edges replicate the nearest valid pixel;
/// zero-padding would bias gradient magnitudes at the borders. The output
/// has the same dimensions as the input, and the input is never mutated.
///
/// Output rows are independent, so they are computed in parallel.
pub fn convolve(image: &[f32], width: usize, height: usize, kernel: &Kernel) -> Vec<f32> {
    debug_assert_eq!(image.len(), width * height);

    let half_y = (kernel.rows() / 2) as isize;
    let half_x = (kernel.cols() / 2) as isize;
    let max_x = width as isize - 1;
    let max_y = height as isize - 1;

    let mut output = vec![0.0f32; width * height];
    output
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, out_row)| {
            let y = y as isize;
            for (x, out) in out_row.iter_mut().enumerate() {
                let x = x as isize;
                let mut acc = 0.0f32;
                for kr in 0..kernel.rows() {
                    let sy = (y + kr as isize - half_y).clamp(0, max_y) as usize;
                    let row = &image[sy * width..sy * width + width];
                    for kc in 0..kernel.cols() {
                        let sx = (x + kc as isize - half_x).clamp(0, max_x) as usize;
                        acc += row[sx] * kernel.weight(kr, kc);
                    }
                }
                *out = acc;
            }
        });

    output
}

/// Box filter of size `block_size` applied as two separable 1-D passes.
///
/// When `normalized` is true each pass carries weight `1 / block_size`, so
/// the full window averages; otherwise the window sums. The classic Harris
/// formulation sums, so normalization is the caller's explicit choice
/// rather than a default.
pub fn box_filter(
    image: &[f32],
    width: usize,
    height: usize,
    block_size: usize,
    normalized: bool,
) -> Vec<f32> {
    let w = if normalized { 1.0 / block_size as f32 } else { 1.0 };
    let horizontal = convolve(image, width, height, &Kernel::box_row(block_size, w));
    convolve(&horizontal, width, height, &Kernel::box_col(block_size, w))
}

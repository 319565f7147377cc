//! Image file boundary: decode frames to the pipeline's sample grid and
//! encode 8-bit results back to disk.

use std::path::Path;

use image::{GrayImage, ImageReader};

use crate::PipelineResult;

/// Load an image as a grayscale sample grid in the 0..=255 range.
/// Color inputs are converted through the crate's luma weighting.
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> PipelineResult<(Vec<f32>, usize, usize)> {
    let img = ImageReader::open(path)?.decode()?;
    let luma = img.to_luma32f();
    let (width, height) = (luma.width() as usize, luma.height() as usize);
    let samples = luma.into_raw().into_iter().map(|v| v * 255.0).collect();
    Ok((samples, width, height))
}

/// Write an 8-bit grayscale buffer to `path`; format follows the extension.
pub fn save_grayscale<P: AsRef<Path>>(
    path: P,
    samples: &[u8],
    width: usize,
    height: usize,
) -> PipelineResult<()> {
    let img = GrayImage::from_raw(width as u32, height as u32, samples.to_vec())
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "buffer length does not match dimensions",
            )
        })?;
    img.save(path)?;
    Ok(())
}

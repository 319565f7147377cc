use flow_core::{Corner, ScoredCorner};

use crate::config::CornerConfig;
use crate::error::{CornerError, CornerResult};
use crate::response::{corner_response, shi_tomasi};
use crate::suppress::{non_maximal_suppression, threshold};
use crate::tensor::structure_tensor;

/// Compute a full corner-response field using the configured criterion.
/// Useful for visualization; feature selection goes through
/// [`good_features_to_track`].
pub fn response_field(
    image: &[f32],
    width: usize,
    height: usize,
    cfg: &CornerConfig,
) -> CornerResult<Vec<f32>> {
    validate_input(image, width, height, cfg)?;
    let tensor = structure_tensor(image, width, height, cfg.block_size, cfg.normalized_window);
    Ok(corner_response(&tensor, cfg.response))
}

/// Select strong, spatially separated corners, strongest first.
///
/// Pipeline: Shi-Tomasi response, threshold at `quality_level`, non-maximal
/// suppression over `nms_block`, descending sort (ties broken by raster
/// position so output is reproducible), then greedy minimum-distance
/// pruning over the ranked list. Because pruning walks in rank order, a
/// higher-response point always wins a distance conflict; the list is never
/// re-sorted once pruning starts.
pub fn good_features_to_track(
    image: &[f32],
    width: usize,
    height: usize,
    cfg: &CornerConfig,
) -> CornerResult<Vec<Corner>> {
    validate_input(image, width, height, cfg)?;

    let tensor = structure_tensor(image, width, height, cfg.block_size, cfg.normalized_window);
    let response = shi_tomasi(&tensor);
    let response = threshold(&response, cfg.quality_level);
    let response = non_maximal_suppression(&response, width, height, cfg.nms_block);

    let mut scored: Vec<ScoredCorner> = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let v = response[y * width + x];
            if v > 0.0 {
                scored.push(ScoredCorner {
                    corner: Corner { x, y },
                    response: v,
                });
            }
        }
    }

    scored.sort_by(|a, b| {
        b.response
            .partial_cmp(&a.response)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                let ra = a.corner.y * width + a.corner.x;
                let rb = b.corner.y * width + b.corner.x;
                ra.cmp(&rb)
            })
    });

    // Greedy pruning: a single forward pass accumulating survivors, rather
    // than erasing from the ranked list mid-iteration. The O(n^2) pairwise
    // comparisons are inherent to the algorithm.
    let min_dist_sq = cfg.min_distance * cfg.min_distance;
    let cap = cfg.max_features.unwrap_or(usize::MAX);
    let mut kept: Vec<Corner> = Vec::new();
    for s in &scored {
        if kept.len() >= cap {
            break;
        }
        if kept.iter().all(|k| k.distance_sq(&s.corner) >= min_dist_sq) {
            kept.push(s.corner);
        }
    }

    Ok(kept)
}

fn validate_input(
    image: &[f32],
    width: usize,
    height: usize,
    cfg: &CornerConfig,
) -> CornerResult<()> {
    if width == 0 || height == 0 {
        return Err(CornerError::InvalidImageSize { width, height });
    }
    if image.len() != width * height {
        return Err(CornerError::InvalidImageData {
            expected_len: width * height,
            actual_len: image.len(),
        });
    }
    cfg.validate()
}

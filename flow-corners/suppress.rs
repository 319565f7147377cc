use rayon::prelude::*;

/// Zero every response below `t * max(response)`, passing the rest through
/// unchanged.
///
/// Degenerate case: when the maximum is exactly 0 the cut-off is also 0,
/// every negative pixel is zeroed and every zero pixel stays zero, so the
/// result is an all-zero field without any special-case branch.
pub fn threshold(response: &[f32], t: f32) -> Vec<f32> {
    let max_val = response.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    if !max_val.is_finite() {
        return vec![0.0; response.len()];
    }
    let cut = t * max_val;
    response
        .iter()
        .map(|&v| if v < cut { 0.0 } else { v })
        .collect()
}

/// Keep only pixels that are local maxima within a centered, edge-clipped
/// `block_size` x `block_size` neighborhood.
///
/// A pixel survives unless some neighbor is *strictly* greater, so pixels
/// tied at the block maximum are all retained. This is deliberate: the
/// strictly-greater test is scan-order independent, whereas a first-wins
/// rule would silently depend on traversal order.
pub fn non_maximal_suppression(
    response: &[f32],
    width: usize,
    height: usize,
    block_size: usize,
) -> Vec<f32> {
    debug_assert_eq!(response.len(), width * height);
    let half = (block_size / 2) as isize;

    let mut output = vec![0.0f32; response.len()];
    output
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, out_row)| {
            for (x, out) in out_row.iter_mut().enumerate() {
                let v = response[y * width + x];
                if v != 0.0 && !has_greater_neighbor(response, width, height, x, y, half) {
                    *out = v;
                }
            }
        });
    output
}

/// True if any neighbor in the block strictly exceeds the pixel's value.
/// Returns as soon as one is found.
fn has_greater_neighbor(
    response: &[f32],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    half: isize,
) -> bool {
    let v = response[y * width + x];
    let y0 = (y as isize - half).max(0) as usize;
    let y1 = ((y as isize + half) as usize).min(height - 1);
    let x0 = (x as isize - half).max(0) as usize;
    let x1 = ((x as isize + half) as usize).min(width - 1);

    for ny in y0..=y1 {
        let row = &response[ny * width..ny * width + width];
        for nx in x0..=x1 {
            if row[nx] > v {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_zero_is_identity_for_nonnegative() {
        let response = vec![0.0f32, 1.0, 2.5, 0.3, 4.0];
        assert_eq!(threshold(&response, 0.0), response);
    }

    #[test]
    fn test_threshold_one_keeps_only_global_max() {
        let response = vec![1.0f32, 3.0, 2.0, 3.0, 0.5];
        let out = threshold(&response, 1.0);
        assert_eq!(out, vec![0.0, 3.0, 0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_threshold_fraction() {
        let response = vec![10.0f32, 4.0, 5.0, 1.0];
        let out = threshold(&response, 0.5);
        assert_eq!(out, vec![10.0, 0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_threshold_all_zero_max() {
        // Flat zero response degenerates to all zeros.
        let response = vec![0.0f32; 6];
        assert_eq!(threshold(&response, 0.5), vec![0.0; 6]);
    }

    #[test]
    fn test_threshold_all_negative() {
        let response = vec![-1.0f32, -5.0, -0.5];
        let out = threshold(&response, 0.5);
        // max is -0.5, cut is -0.25: everything below is zeroed.
        assert_eq!(out, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_nms_single_nonzero_pixel_survives() {
        for block in [3usize, 5, 9] {
            let mut response = vec![0.0f32; 7 * 7];
            response[3 * 7 + 3] = 2.0;
            let out = non_maximal_suppression(&response, 7, 7, block);
            assert_eq!(out[3 * 7 + 3], 2.0, "block={}", block);
            assert_eq!(out.iter().filter(|&&v| v != 0.0).count(), 1);
        }
    }

    #[test]
    fn test_nms_suppresses_weaker_neighbor() {
        let mut response = vec![0.0f32; 5 * 5];
        response[2 * 5 + 2] = 5.0;
        response[2 * 5 + 3] = 3.0;
        let out = non_maximal_suppression(&response, 5, 5, 3);
        assert_eq!(out[2 * 5 + 2], 5.0);
        assert_eq!(out[2 * 5 + 3], 0.0);
    }

    #[test]
    fn test_nms_retains_all_exact_ties() {
        // Two adjacent pixels tied at the block maximum: both survive.
        let mut response = vec![0.0f32; 5 * 5];
        response[2 * 5 + 1] = 4.0;
        response[2 * 5 + 2] = 4.0;
        let out = non_maximal_suppression(&response, 5, 5, 3);
        assert_eq!(out[2 * 5 + 1], 4.0);
        assert_eq!(out[2 * 5 + 2], 4.0);
    }

    #[test]
    fn test_nms_edge_clipping() {
        // A maximum in the image corner is still compared correctly against
        // its clipped neighborhood.
        let mut response = vec![0.0f32; 4 * 4];
        response[0] = 1.0;
        response[1] = 2.0;
        let out = non_maximal_suppression(&response, 4, 4, 3);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 2.0);
    }
}

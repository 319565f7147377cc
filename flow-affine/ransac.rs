use flow_core::{AffineModel, FlowMatch, Point};
use nalgebra::{Matrix3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::error::{AffineError, AffineResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minimal sample size for a 2x3 affine model.
const SAMPLE_SIZE: usize = 3;

/// Twice-signed-area below this marks a sample triple as near-collinear.
const COLLINEARITY_EPSILON: f64 = 1e-6;

/// Attempts per trial to draw a non-degenerate sample before the trial is
/// abandoned.
const MAX_SAMPLE_ATTEMPTS: usize = 10;

/// RANSAC estimation parameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RansacConfig {
    /// Fixed trial budget.
    pub trials: usize,
    /// Reprojection-error threshold (pixels) separating inliers from
    /// outliers.
    pub inlier_threshold: f32,
    /// Base seed for the per-trial generators. `None` draws one from the
    /// thread RNG; setting it makes estimation fully deterministic.
    pub seed: Option<u64>,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            trials: 256,
            inlier_threshold: 2.0,
            seed: None,
        }
    }
}

/// Result of a successful estimation: the refined model and the indices of
/// the correspondences consistent with it.
#[derive(Debug, Clone)]
pub struct AffineEstimate {
    pub model: AffineModel,
    pub inliers: Vec<usize>,
}

/// One trial's candidate, kept for the best-of reduction.
#[derive(Debug, Clone)]
struct Trial {
    model: AffineModel,
    inlier_count: usize,
    residual_sum: f64,
    index: usize,
}

impl Trial {
    /// Larger inlier count wins; ties go to the lower inlier residual,
    /// then to the lower trial index. The final tie-break matters because
    /// the parallel reduction's pairing order is not fixed: exact-fit data
    /// produces many candidates with identical counts and residuals, and
    /// without it the winner would depend on the reduction shape rather
    /// than the seed.
    fn better_of(self, other: Trial) -> Trial {
        let ordering = other
            .inlier_count
            .cmp(&self.inlier_count)
            .then_with(|| {
                self.residual_sum
                    .partial_cmp(&other.residual_sum)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| self.index.cmp(&other.index));
        if ordering == std::cmp::Ordering::Greater {
            other
        } else {
            self
        }
    }
}

/// Robustly fit a 2x3 affine model to index-aligned point lists.
///
/// Each trial samples three distinct, non-collinear correspondences,
/// solves the exact 3x3 system, and scores the candidate by inlier count
/// under the reprojection threshold. The winning candidate is then refit
/// by least squares over its full inlier set, and the inlier set is
/// re-evaluated against the refined model so that every reported inlier
/// reprojects within the threshold.
///
/// Trials are independent and run in parallel; each derives its own seeded
/// generator so a fixed `seed` gives reproducible output.
pub fn estimate_affine(
    src: &[Point],
    dst: &[Point],
    cfg: &RansacConfig,
) -> AffineResult<AffineEstimate> {
    if src.len() != dst.len() {
        return Err(AffineError::MismatchedLengths {
            src_len: src.len(),
            dst_len: dst.len(),
        });
    }
    if src.len() < SAMPLE_SIZE {
        return Err(AffineError::InsufficientCorrespondences {
            found: src.len(),
            needed: SAMPLE_SIZE,
        });
    }
    if !(cfg.inlier_threshold > 0.0) {
        return Err(AffineError::InvalidThreshold(cfg.inlier_threshold));
    }
    if cfg.trials == 0 {
        return Err(AffineError::InvalidTrials(cfg.trials));
    }

    let base_seed = cfg.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let threshold = cfg.inlier_threshold;

    let best = (0..cfg.trials)
        .into_par_iter()
        .filter_map(|trial| {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(trial as u64));
            run_trial(src, dst, threshold, trial, &mut rng)
        })
        .reduce_with(Trial::better_of);

    let best = best.ok_or(AffineError::NoValidModel)?;

    let inliers = collect_inliers(src, dst, &best.model, threshold);
    let model = refit_least_squares(src, dst, &inliers).unwrap_or(best.model);
    let inliers = collect_inliers(src, dst, &model, threshold);

    Ok(AffineEstimate { model, inliers })
}

/// Convenience wrapper taking tracker output directly.
pub fn estimate_from_matches(
    matches: &[FlowMatch],
    cfg: &RansacConfig,
) -> AffineResult<AffineEstimate> {
    let src: Vec<Point> = matches.iter().map(|m| m.source.into()).collect();
    let dst: Vec<Point> = matches.iter().map(|m| m.tracked).collect();
    estimate_affine(&src, &dst, cfg)
}

fn run_trial(
    src: &[Point],
    dst: &[Point],
    threshold: f32,
    index: usize,
    rng: &mut StdRng,
) -> Option<Trial> {
    let n = src.len();

    let sample = (0..MAX_SAMPLE_ATTEMPTS).find_map(|_| {
        let s = draw_distinct_triple(rng, n);
        if is_collinear(&src[s[0]], &src[s[1]], &src[s[2]]) {
            None
        } else {
            Some(s)
        }
    })?;

    let model = solve_exact(
        [&src[sample[0]], &src[sample[1]], &src[sample[2]]],
        [&dst[sample[0]], &dst[sample[1]], &dst[sample[2]]],
    )?;

    let mut inlier_count = 0;
    let mut residual_sum = 0.0f64;
    for i in 0..n {
        let projected = model.apply_point(&src[i]);
        let err = projected.distance(&dst[i]);
        if err < threshold {
            inlier_count += 1;
            residual_sum += err as f64;
        }
    }

    Some(Trial {
        model,
        inlier_count,
        residual_sum,
        index,
    })
}

fn draw_distinct_triple(rng: &mut StdRng, n: usize) -> [usize; 3] {
    let a = rng.gen_range(0..n);
    let b = loop {
        let v = rng.gen_range(0..n);
        if v != a {
            break v;
        }
    };
    let c = loop {
        let v = rng.gen_range(0..n);
        if v != a && v != b {
            break v;
        }
    };
    [a, b, c]
}

fn is_collinear(p0: &Point, p1: &Point, p2: &Point) -> bool {
    let area2 = (p1.x as f64 - p0.x as f64) * (p2.y as f64 - p0.y as f64)
        - (p1.y as f64 - p0.y as f64) * (p2.x as f64 - p0.x as f64);
    area2.abs() < COLLINEARITY_EPSILON
}

/// Exact solve of the 2x3 model from three correspondences: one shared
/// 3x3 LU decomposition, one right-hand side per output row.
fn solve_exact(s: [&Point; 3], d: [&Point; 3]) -> Option<AffineModel> {
    let m = Matrix3::new(
        s[0].x as f64, s[0].y as f64, 1.0,
        s[1].x as f64, s[1].y as f64, 1.0,
        s[2].x as f64, s[2].y as f64, 1.0,
    );
    let lu = m.lu();
    let row_x = lu.solve(&Vector3::new(d[0].x as f64, d[1].x as f64, d[2].x as f64))?;
    let row_y = lu.solve(&Vector3::new(d[0].y as f64, d[1].y as f64, d[2].y as f64))?;

    Some(AffineModel([
        [row_x.x as f32, row_x.y as f32, row_x.z as f32],
        [row_y.x as f32, row_y.y as f32, row_y.z as f32],
    ]))
}

fn collect_inliers(src: &[Point], dst: &[Point], model: &AffineModel, threshold: f32) -> Vec<usize> {
    (0..src.len())
        .filter(|&i| model.apply_point(&src[i]).distance(&dst[i]) < threshold)
        .collect()
}

/// Least-squares refit over an inlier set via the normal equations,
/// accumulated in f64. Returns `None` when the system is singular (for
/// example, all inliers collinear), in which case the caller keeps the
/// winning trial's model.
fn refit_least_squares(src: &[Point], dst: &[Point], inliers: &[usize]) -> Option<AffineModel> {
    if inliers.len() < SAMPLE_SIZE {
        return None;
    }

    let mut sxx = 0.0f64;
    let mut sxy = 0.0f64;
    let mut syy = 0.0f64;
    let mut sx = 0.0f64;
    let mut sy = 0.0f64;
    let mut bx = Vector3::zeros();
    let mut by = Vector3::zeros();

    for &i in inliers {
        let (x, y) = (src[i].x as f64, src[i].y as f64);
        let (u, v) = (dst[i].x as f64, dst[i].y as f64);
        sxx += x * x;
        sxy += x * y;
        syy += y * y;
        sx += x;
        sy += y;
        bx += Vector3::new(x * u, y * u, u);
        by += Vector3::new(x * v, y * v, v);
    }

    let n = inliers.len() as f64;
    let ata = Matrix3::new(
        sxx, sxy, sx,
        sxy, syy, sy,
        sx, sy, n,
    );
    let lu = ata.lu();
    let row_x = lu.solve(&bx)?;
    let row_y = lu.solve(&by)?;

    Some(AffineModel([
        [row_x.x as f32, row_x.y as f32, row_x.z as f32],
        [row_y.x as f32, row_y.y as f32, row_y.z as f32],
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUND_TRUTH: AffineModel = AffineModel([
        [1.02, -0.05, 3.0],
        [0.04, 0.98, -2.0],
    ]);

    fn spread_points(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| Point {
                x: ((i * 17) % 53) as f32,
                y: ((i * 29) % 47) as f32,
            })
            .collect()
    }

    fn seeded_config() -> RansacConfig {
        RansacConfig {
            trials: 256,
            inlier_threshold: 1.0,
            seed: Some(42),
        }
    }

    fn assert_models_close(a: &AffineModel, b: &AffineModel, tol: f32) {
        for r in 0..2 {
            for c in 0..3 {
                assert!(
                    (a.0[r][c] - b.0[r][c]).abs() < tol,
                    "model entry [{}][{}]: {} vs {}",
                    r,
                    c,
                    a.0[r][c],
                    b.0[r][c]
                );
            }
        }
    }

    #[test]
    fn test_exact_fit_without_outliers() {
        let src = spread_points(30);
        let dst: Vec<Point> = src.iter().map(|p| GROUND_TRUTH.apply_point(p)).collect();
        let est = estimate_affine(&src, &dst, &seeded_config()).unwrap();
        assert_models_close(&est.model, &GROUND_TRUTH, 1e-3);
        assert_eq!(est.inliers.len(), src.len());
    }

    #[test]
    fn test_outliers_rejected() {
        let src = spread_points(50);
        let mut dst: Vec<Point> = src.iter().map(|p| GROUND_TRUTH.apply_point(p)).collect();
        // Corrupt 20% of the correspondences with gross mismatches.
        let outlier_indices: Vec<usize> = (0..50).step_by(5).collect();
        for &i in &outlier_indices {
            dst[i].x += 40.0 + i as f32;
            dst[i].y -= 35.0;
        }

        let est = estimate_affine(&src, &dst, &seeded_config()).unwrap();
        assert_models_close(&est.model, &GROUND_TRUTH, 1e-2);
        for &i in &outlier_indices {
            assert!(
                !est.inliers.contains(&i),
                "outlier {} classified as inlier",
                i
            );
        }
        assert_eq!(est.inliers.len(), 40);
    }

    #[test]
    fn test_round_trip_on_inliers() {
        let src = spread_points(40);
        let mut dst: Vec<Point> = src.iter().map(|p| GROUND_TRUTH.apply_point(p)).collect();
        for i in [3usize, 11, 27] {
            dst[i].y += 25.0;
        }

        let cfg = seeded_config();
        let est = estimate_affine(&src, &dst, &cfg).unwrap();
        for &i in &est.inliers {
            let err = est.model.apply_point(&src[i]).distance(&dst[i]);
            assert!(
                err < cfg.inlier_threshold,
                "inlier {} reprojects with error {}",
                i,
                err
            );
        }
    }

    #[test]
    fn test_too_few_correspondences() {
        let src = spread_points(2);
        let dst = src.clone();
        let result = estimate_affine(&src, &dst, &seeded_config());
        assert!(matches!(
            result,
            Err(AffineError::InsufficientCorrespondences { found: 2, needed: 3 })
        ));
    }

    #[test]
    fn test_mismatched_lengths() {
        let src = spread_points(5);
        let dst = spread_points(4);
        let result = estimate_affine(&src, &dst, &seeded_config());
        assert!(matches!(result, Err(AffineError::MismatchedLengths { .. })));
    }

    #[test]
    fn test_all_collinear_is_no_valid_model() {
        // Every source point on one line: no sample can ever succeed.
        let src: Vec<Point> = (0..10)
            .map(|i| Point {
                x: i as f32,
                y: 2.0 * i as f32,
            })
            .collect();
        let dst = src.clone();
        let result = estimate_affine(&src, &dst, &seeded_config());
        assert!(matches!(result, Err(AffineError::NoValidModel)));
    }

    #[test]
    fn test_seeded_estimation_is_deterministic() {
        let src = spread_points(30);
        let mut dst: Vec<Point> = src.iter().map(|p| GROUND_TRUTH.apply_point(p)).collect();
        dst[7].x += 30.0;
        let a = estimate_affine(&src, &dst, &seeded_config()).unwrap();
        let b = estimate_affine(&src, &dst, &seeded_config()).unwrap();
        assert_eq!(a.model, b.model);
        assert_eq!(a.inliers, b.inliers);
    }

    #[test]
    fn test_tied_trials_resolve_by_index() {
        // Identical (count, residual) stats: the lower trial index must win
        // no matter which side of the reduction each candidate arrives on.
        let a = Trial {
            model: AffineModel::identity(),
            inlier_count: 10,
            residual_sum: 0.0,
            index: 5,
        };
        let b = Trial {
            model: AffineModel::translation(1.0, 0.0),
            inlier_count: 10,
            residual_sum: 0.0,
            index: 2,
        };
        assert_eq!(a.clone().better_of(b.clone()).index, 2);
        assert_eq!(b.better_of(a).index, 2);
    }

    #[test]
    fn test_exact_tie_data_is_reproducible() {
        // Identity correspondences make every trial an exact fit, so all
        // candidates tie on inlier count and zero residual; repeated runs
        // with one seed must still agree bitwise.
        let src = spread_points(25);
        let dst = src.clone();
        let first = estimate_affine(&src, &dst, &seeded_config()).unwrap();
        for _ in 0..10 {
            let again = estimate_affine(&src, &dst, &seeded_config()).unwrap();
            assert_eq!(first.model, again.model);
            assert_eq!(first.inliers, again.inliers);
        }
    }

    #[test]
    fn test_invalid_threshold() {
        let src = spread_points(10);
        let cfg = RansacConfig {
            inlier_threshold: 0.0,
            ..seeded_config()
        };
        let result = estimate_affine(&src, &src.clone(), &cfg);
        assert!(matches!(result, Err(AffineError::InvalidThreshold(_))));
    }

    #[test]
    fn test_estimate_from_matches() {
        use flow_core::{Corner, FlowMatch};
        let matches: Vec<FlowMatch> = spread_points(20)
            .iter()
            .map(|p| FlowMatch {
                source: Corner {
                    x: p.x as usize,
                    y: p.y as usize,
                },
                tracked: GROUND_TRUTH.apply_point(p),
            })
            .collect();
        let est = estimate_from_matches(&matches, &seeded_config()).unwrap();
        assert_models_close(&est.model, &GROUND_TRUTH, 1e-3);
    }
}

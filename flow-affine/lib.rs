//! Robust 2x3 affine estimation: random-sample consensus over point
//! correspondences with a least-squares refit over the winning inlier set.

pub mod error;
pub mod ransac;

pub use error::{AffineError, AffineResult};
pub use ransac::{estimate_affine, estimate_from_matches, AffineEstimate, RansacConfig};

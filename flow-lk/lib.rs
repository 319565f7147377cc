//! Pyramidal Lucas-Kanade optical flow: Gaussian image pyramids and an
//! iterative, coarse-to-fine differential tracker.

pub mod error;
pub mod pyramid;
pub mod tracker;

pub use error::{FlowError, FlowResult};
pub use pyramid::{Pyramid, PyramidLevel};
pub use tracker::{sample_bilinear, LkTracker};

//! High-level two-frame tracking pipeline plus the boundary collaborators
//! the binary needs: image I/O and display conversion.

pub mod display;
pub mod io;

use flow_affine::{estimate_from_matches, AffineEstimate, AffineError, RansacConfig};
use flow_core::{Corner, FlowMatch};
use flow_corners::{good_features_to_track, CornerConfig, CornerError};
use flow_lk::{FlowError, LkTracker};

/// Errors from any pipeline stage or boundary collaborator.
#[derive(Debug)]
pub enum PipelineError {
    Corner(CornerError),
    Flow(FlowError),
    Affine(AffineError),
    Image(image::ImageError),
    Io(std::io::Error),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Corner(e) => write!(f, "Corner detection failed: {}", e),
            PipelineError::Flow(e) => write!(f, "Optical flow failed: {}", e),
            PipelineError::Affine(e) => write!(f, "Affine estimation failed: {}", e),
            PipelineError::Image(e) => write!(f, "Image error: {}", e),
            PipelineError::Io(e) => write!(f, "I/O error: {}", e),
            PipelineError::ThreadPool(e) => write!(f, "Thread pool init failed: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Corner(e) => Some(e),
            PipelineError::Flow(e) => Some(e),
            PipelineError::Affine(e) => Some(e),
            PipelineError::Image(e) => Some(e),
            PipelineError::Io(e) => Some(e),
            PipelineError::ThreadPool(e) => Some(e),
        }
    }
}

impl From<CornerError> for PipelineError {
    fn from(e: CornerError) -> Self {
        PipelineError::Corner(e)
    }
}

impl From<FlowError> for PipelineError {
    fn from(e: FlowError) -> Self {
        PipelineError::Flow(e)
    }
}

impl From<AffineError> for PipelineError {
    fn from(e: AffineError) -> Self {
        PipelineError::Affine(e)
    }
}

impl From<image::ImageError> for PipelineError {
    fn from(e: image::ImageError) -> Self {
        PipelineError::Image(e)
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Io(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for PipelineError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        PipelineError::ThreadPool(e)
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Initialize the global worker pool. `None` sizes it to the detected
/// CPU count. Must be called before the first parallel stage runs.
pub fn init_threads(num_threads: Option<usize>) -> PipelineResult<()> {
    let n = num_threads.unwrap_or_else(flow_core::default_threads);
    flow_core::init_thread_pool(n)?;
    Ok(())
}

/// Everything the pipeline produced for one frame pair.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Corners detected in the previous frame.
    pub corners: Vec<Corner>,
    /// Corners successfully tracked into the next frame.
    pub matches: Vec<FlowMatch>,
    /// Robust affine fit over the matches, with its inlier indices.
    pub estimate: AffineEstimate,
}

/// Configured detect-track-estimate pipeline over two grayscale frames.
#[derive(Debug, Clone, Default)]
pub struct FlowPipeline {
    pub corners: CornerConfig,
    pub tracker: LkTracker,
    pub ransac: RansacConfig,
}

impl FlowPipeline {
    /// Run the full pipeline: select features in `prev`, track them into
    /// `next`, then fit an affine motion model to the surviving matches.
    pub fn run(
        &self,
        prev: &[f32],
        next: &[f32],
        width: usize,
        height: usize,
    ) -> PipelineResult<PipelineReport> {
        let corners = good_features_to_track(prev, width, height, &self.corners)?;
        let matches = self
            .tracker
            .track_frames(prev, next, width, height, &corners)?;
        let estimate = estimate_from_matches(&matches, &self.ransac)?;
        Ok(PipelineReport {
            corners,
            matches,
            estimate,
        })
    }
}

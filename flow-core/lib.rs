/// Row-major single-channel grid of floating-point samples.
///
/// Dimensions travel alongside the buffer as explicit `width`/`height`
/// arguments; `(x, y)` maps to index `x + y * width`.
pub type Samples = Vec<f32>;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer pixel coordinate of a detected corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Corner {
    pub x: usize,
    pub y: usize,
}

impl Corner {
    /// Squared Euclidean distance to another corner.
    #[inline]
    pub fn distance_sq(&self, other: &Corner) -> f32 {
        let dx = self.x as f32 - other.x as f32;
        let dy = self.y as f32 - other.y as f32;
        dx * dx + dy * dy
    }
}

/// Corner paired with its response value while features are being ranked.
/// The response is discarded once the final ordered list is produced.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCorner {
    pub corner: Corner,
    pub response: f32,
}

/// Sub-pixel image position.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<Corner> for Point {
    fn from(c: Corner) -> Self {
        Point {
            x: c.x as f32,
            y: c.y as f32,
        }
    }
}

/// A source corner together with the sub-pixel position it was tracked to
/// in the next frame. Features that could not be tracked are dropped, never
/// stored as placeholder entries, so a match list is always index-aligned
/// with its own sources.
#[derive(Debug, Clone, Copy)]
pub struct FlowMatch {
    pub source: Corner,
    pub tracked: Point,
}

/// 2x3 affine matrix mapping `(x, y, 1)` to `(x', y')`. Row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AffineModel(pub [[f32; 3]; 2]);

impl AffineModel {
    pub fn identity() -> Self {
        AffineModel([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
    }

    /// Build a pure-translation model.
    pub fn translation(tx: f32, ty: f32) -> Self {
        AffineModel([[1.0, 0.0, tx], [0.0, 1.0, ty]])
    }

    /// Map a point through the model.
    #[inline]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let m = &self.0;
        (
            m[0][0] * x + m[0][1] * y + m[0][2],
            m[1][0] * x + m[1][1] * y + m[1][2],
        )
    }

    /// Map a point value through the model.
    #[inline]
    pub fn apply_point(&self, p: &Point) -> Point {
        let (x, y) = self.apply(p.x, p.y);
        Point { x, y }
    }
}

/// Number of worker threads to use when the caller does not specify one.
pub fn default_threads() -> usize {
    num_cpus::get().max(1)
}

/// Initialize the global Rayon thread pool with the specified number of threads.
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}

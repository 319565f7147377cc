#[derive(Debug, Clone)]
pub enum FlowError {
    InvalidImageData { expected_len: usize, actual_len: usize },
    InvalidImageSize { width: usize, height: usize },
    InvalidWindow { radius: usize },
    InvalidLevels { levels: usize },
    MismatchedFrames {
        prev: (usize, usize),
        next: (usize, usize),
    },
    NoFeatures,
}

impl std::fmt::Display for FlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowError::InvalidImageData { expected_len, actual_len } => {
                write!(f, "Image data length mismatch: expected {}, got {}", expected_len, actual_len)
            }
            FlowError::InvalidImageSize { width, height } => {
                write!(f, "Invalid image dimensions: {}x{} (must be > 0)", width, height)
            }
            FlowError::InvalidWindow { radius } => {
                write!(f, "Invalid tracking window radius: {} (must be >= 1)", radius)
            }
            FlowError::InvalidLevels { levels } => {
                write!(f, "Invalid pyramid level count: {} (must be >= 1)", levels)
            }
            FlowError::MismatchedFrames { prev, next } => {
                write!(
                    f,
                    "Frame dimension mismatch: previous is {}x{}, next is {}x{}",
                    prev.0, prev.1, next.0, next.1
                )
            }
            FlowError::NoFeatures => {
                write!(f, "No features supplied for tracking")
            }
        }
    }
}

impl std::error::Error for FlowError {}

pub type FlowResult<T> = Result<T, FlowError>;

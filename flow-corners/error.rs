#[derive(Debug, Clone)]
pub enum CornerError {
    InvalidImageSize { width: usize, height: usize },
    InvalidImageData { expected_len: usize, actual_len: usize },
    InvalidBlockSize { block_size: usize },
    InvalidQualityLevel(f32),
    InvalidMinDistance(f32),
}

impl std::fmt::Display for CornerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CornerError::InvalidImageSize { width, height } => {
                write!(f, "Invalid image dimensions: {}x{} (must be > 0)", width, height)
            }
            CornerError::InvalidImageData { expected_len, actual_len } => {
                write!(f, "Image data length mismatch: expected {}, got {}", expected_len, actual_len)
            }
            CornerError::InvalidBlockSize { block_size } => {
                write!(f, "Invalid block size: {} (must be an odd value >= 1)", block_size)
            }
            CornerError::InvalidQualityLevel(q) => {
                write!(f, "Invalid quality level: {} (must be in (0, 1])", q)
            }
            CornerError::InvalidMinDistance(d) => {
                write!(f, "Invalid minimum distance: {} (must be >= 0)", d)
            }
        }
    }
}

impl std::error::Error for CornerError {}

pub type CornerResult<T> = Result<T, CornerError>;

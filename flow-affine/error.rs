#[derive(Debug, Clone)]
pub enum AffineError {
    MismatchedLengths { src_len: usize, dst_len: usize },
    InsufficientCorrespondences { found: usize, needed: usize },
    InvalidThreshold(f32),
    InvalidTrials(usize),
    NoValidModel,
}

impl std::fmt::Display for AffineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AffineError::MismatchedLengths { src_len, dst_len } => {
                write!(f, "Point list length mismatch: {} source vs {} destination", src_len, dst_len)
            }
            AffineError::InsufficientCorrespondences { found, needed } => {
                write!(f, "Insufficient correspondences: {} found, {} needed", found, needed)
            }
            AffineError::InvalidThreshold(t) => {
                write!(f, "Invalid reprojection threshold: {} (must be > 0)", t)
            }
            AffineError::InvalidTrials(n) => {
                write!(f, "Invalid trial budget: {} (must be > 0)", n)
            }
            AffineError::NoValidModel => {
                write!(f, "No valid model: every sampled candidate was degenerate")
            }
        }
    }
}

impl std::error::Error for AffineError {}

pub type AffineResult<T> = Result<T, AffineError>;

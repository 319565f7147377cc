//! Corner detection pipeline: convolution, structure tensor, Harris and
//! Shi-Tomasi scoring, threshold + non-maximal suppression, and ranked
//! minimum-distance feature selection.

pub mod config;
pub mod convolve;
pub mod error;
pub mod response;
pub mod select;
pub mod suppress;
pub mod tensor;

pub use config::CornerConfig;
pub use convolve::{box_filter, convolve, Kernel};
pub use error::{CornerError, CornerResult};
pub use response::{corner_response, harris, shi_tomasi, ResponseKind};
pub use select::{good_features_to_track, response_field};
pub use suppress::{non_maximal_suppression, threshold};
pub use tensor::{structure_tensor, TensorField};

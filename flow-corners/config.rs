use crate::error::{CornerError, CornerResult};
use crate::response::ResponseKind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Corner detection configuration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CornerConfig {
    /// Scoring criterion used when computing a full response field.
    /// Feature selection always scores with Shi-Tomasi.
    pub response: ResponseKind,
    /// Side length of the box window smoothing the structure tensor.
    /// Must be odd and >= 1.
    pub block_size: usize,
    /// Whether the smoothing window averages instead of sums. Changes the
    /// effective sensitivity scale of Harris scoring, so it is explicit.
    pub normalized_window: bool,
    /// Fraction of the maximum response below which pixels are rejected.
    /// Must be in (0, 1].
    pub quality_level: f32,
    /// Neighborhood side for non-maximal suppression during selection.
    /// Must be odd and >= 1.
    pub nms_block: usize,
    /// Minimum pairwise distance (pixels) between selected features.
    pub min_distance: f32,
    /// Optional cap on the number of returned features; strongest first.
    pub max_features: Option<usize>,
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self {
            response: ResponseKind::ShiTomasi,
            block_size: 3,
            normalized_window: false,
            quality_level: 0.01,
            nms_block: 3,
            min_distance: 8.0,
            max_features: None,
        }
    }
}

impl CornerConfig {
    /// Harris preset with the classic sensitivity value.
    pub fn harris_preset() -> Self {
        Self {
            response: ResponseKind::Harris { k: 0.04 },
            ..Self::default()
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> CornerResult<()> {
        if self.block_size == 0 || self.block_size % 2 == 0 {
            return Err(CornerError::InvalidBlockSize { block_size: self.block_size });
        }
        if self.nms_block == 0 || self.nms_block % 2 == 0 {
            return Err(CornerError::InvalidBlockSize { block_size: self.nms_block });
        }
        if !(self.quality_level > 0.0 && self.quality_level <= 1.0) {
            return Err(CornerError::InvalidQualityLevel(self.quality_level));
        }
        if !(self.min_distance >= 0.0) {
            return Err(CornerError::InvalidMinDistance(self.min_distance));
        }
        Ok(())
    }

    /// Human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "CornerConfig: {:?}, block={}, normalized={}, quality={}, nms={}, min_distance={}",
            self.response,
            self.block_size,
            self.normalized_window,
            self.quality_level,
            self.nms_block,
            self.min_distance,
        )
    }

    /// Save configuration to a JSON file.
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from a JSON file.
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Load configuration from a TOML file.
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

use crate::bound::ErrorBound;
use crate::error::{CodecError, Result};

pub const DEFAULT_SCALE_FACTOR: u32 = 1000;
pub const DEFAULT_MIN_POINTS: u32 = 1;
pub const DEFAULT_MAX_DEPTH: u32 = 32;

/// Deepest octree the codecs will build or accept from a blob.
pub const MAX_SUPPORTED_DEPTH: u32 = 64;

/// Integer packer used for the EB-Octree tree and centre streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackerChoice {
    /// Little-endian i32 words, no compression.
    Plain,
    /// zstd-compressed little-endian i32 words.
    #[default]
    Zstd,
}

/// Parameters shared by every codec.
///
/// Codecs read only the fields they need: EB-HC ignores the octree limits and
/// the packer, the lossless baseline ignores the error bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodecConfig {
    pub error_bound: ErrorBound,
    /// Coordinates are quantized as `round(value * scale_factor)`.
    pub scale_factor: u32,
    /// Octree nodes with at most this many points become leaves.
    pub min_points: u32,
    pub max_depth: u32,
    pub packer: PackerChoice,
}

impl CodecConfig {
    pub fn with_error_bound_cm(cm: f64) -> Result<Self> {
        Ok(Self {
            error_bound: ErrorBound::from_cm(cm)?,
            ..Self::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.scale_factor == 0 {
            return Err(CodecError::invalid_input("scale_factor must be > 0"));
        }
        if self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(CodecError::invalid_input(format!(
                "max_depth {} exceeds the supported limit of {}",
                self.max_depth, MAX_SUPPORTED_DEPTH
            )));
        }
        Ok(())
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            error_bound: ErrorBound::default(),
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_points: DEFAULT_MIN_POINTS,
            max_depth: DEFAULT_MAX_DEPTH,
            packer: PackerChoice::default(),
        }
    }
}

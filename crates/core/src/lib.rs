#![forbid(unsafe_code)]

pub mod bbox;
pub mod bound;
pub mod cloud;
pub mod config;
pub mod error;

pub use bbox::Aabb;
pub use bound::{ErrorBound, ErrorMetric};
pub use cloud::PointCloud;
pub use config::{
    CodecConfig, PackerChoice, DEFAULT_MAX_DEPTH, DEFAULT_MIN_POINTS, DEFAULT_SCALE_FACTOR,
    MAX_SUPPORTED_DEPTH,
};
pub use error::{CodecError, Result};

#![forbid(unsafe_code)]

//! Error-bounded point-cloud codecs.
//!
//! Every blob starts with a one-byte method tag; [`decompress`] dispatches on
//! it. The lossy methods keep reconstruction error within the configured
//! [`ErrorBound`](ebcloud_core::ErrorBound) under their metric, up to one
//! quantization step of slack.

pub mod axis;
pub mod hybrid;
pub mod lossless;
pub mod method;
pub mod octree;
pub mod quantize;
mod wire;

pub use axis::{derive_threshold, merge_by_threshold, AxisClusters, AXIS_THRESHOLD_DIVISOR};
pub use hybrid::OVERFLOW_EXTRA_DEPTH;
pub use method::{blob_method, compress, decompress, Method};

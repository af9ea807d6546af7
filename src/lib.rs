#![forbid(unsafe_code)]

//! Error-bounded compression for LiDAR point clouds.
//!
//! A facade over the workspace crates. Most callers only need [`compress`],
//! [`decompress`] and a [`CodecConfig`]:
//!
//! ```no_run
//! use ebcloud::{compress, decompress, CodecConfig, Method};
//!
//! let cloud = ebcloud::io::read_kitti_bin("000000.bin")?;
//! let config = CodecConfig::with_error_bound_cm(5.0)?;
//! let blob = compress(&cloud, Method::EbOctreeAxis, &config)?;
//! let restored = decompress(&blob)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use ebcloud_codec as codec;
pub use ebcloud_entropy as entropy;
pub use ebcloud_io as io;
pub use ebcloud_metrics as metrics;
pub use ebcloud_spatial as spatial;

pub use ebcloud_codec::{blob_method, compress, decompress, Method};
pub use ebcloud_core::{
    Aabb, CodecConfig, CodecError, ErrorBound, ErrorMetric, PackerChoice, PointCloud,
};
pub use ebcloud_metrics::{
    chamfer_distance, compression_ratio, occupancy_iou, reconstruction_error, ErrorReport,
};

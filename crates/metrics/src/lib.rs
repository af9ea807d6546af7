#![forbid(unsafe_code)]

//! Fidelity metrics for comparing a reconstruction with its original.
//!
//! These are informational: no codec consults them.

pub mod chamfer;
pub mod iou;
pub mod report;

pub use chamfer::chamfer_distance;
pub use iou::{occupancy_iou, DEFAULT_VOXEL_SIZE};
pub use report::{compression_ratio, reconstruction_error, ErrorReport};

#![forbid(unsafe_code)]

pub mod blob;
pub mod kitti;

pub use blob::{read_blob, write_blob};
pub use kitti::{kitti_records, parse_kitti_records, read_kitti_bin, write_kitti_bin, RECORD_SIZE};

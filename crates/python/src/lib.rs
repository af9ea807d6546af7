#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

mod cloud;
mod codec;
mod io;
mod metrics;

#[pymodule]
fn ebcloud_py(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core
    m.add_class::<cloud::PyPointCloud>()?;

    // Codecs
    m.add_function(wrap_pyfunction!(codec::compress_py, m)?)?;
    m.add_function(wrap_pyfunction!(codec::decompress_py, m)?)?;
    m.add_function(wrap_pyfunction!(codec::blob_method_py, m)?)?;
    m.add_function(wrap_pyfunction!(codec::methods_py, m)?)?;

    // Metrics
    m.add_class::<metrics::PyErrorReport>()?;
    m.add_function(wrap_pyfunction!(metrics::chamfer_distance_py, m)?)?;
    m.add_function(wrap_pyfunction!(metrics::occupancy_iou_py, m)?)?;
    m.add_function(wrap_pyfunction!(metrics::reconstruction_error_py, m)?)?;
    m.add_function(wrap_pyfunction!(metrics::compression_ratio_py, m)?)?;

    // IO
    m.add_function(wrap_pyfunction!(io::read_kitti_bin_py, m)?)?;
    m.add_function(wrap_pyfunction!(io::write_kitti_bin_py, m)?)?;
    m.add_function(wrap_pyfunction!(io::parse_kitti_records_py, m)?)?;

    Ok(())
}

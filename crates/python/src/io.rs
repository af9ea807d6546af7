use crate::cloud::PyPointCloud;
use pyo3::prelude::*;

#[pyfunction(name = "read_kitti_bin")]
pub fn read_kitti_bin_py(path: &str) -> PyResult<PyPointCloud> {
    let cloud = ebcloud_io::read_kitti_bin(path)
        .map_err(|e| pyo3::exceptions::PyIOError::new_err(e.to_string()))?;
    Ok(PyPointCloud { inner: cloud })
}

#[pyfunction(name = "write_kitti_bin")]
pub fn write_kitti_bin_py(path: &str, cloud: &PyPointCloud) -> PyResult<()> {
    ebcloud_io::write_kitti_bin(path, &cloud.inner)
        .map_err(|e| pyo3::exceptions::PyIOError::new_err(e.to_string()))
}

#[pyfunction(name = "parse_kitti_records")]
pub fn parse_kitti_records_py(data: &[u8]) -> PyPointCloud {
    PyPointCloud {
        inner: ebcloud_io::parse_kitti_records(data),
    }
}

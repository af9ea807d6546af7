use crate::cloud::PyPointCloud;
use pyo3::prelude::*;

#[pyclass(name = "ErrorReport")]
#[derive(Debug, Clone)]
pub struct PyErrorReport {
    #[pyo3(get)]
    pub mean_axis: f64,
    #[pyo3(get)]
    pub max_axis: f64,
    #[pyo3(get)]
    pub mean_l2: f64,
    #[pyo3(get)]
    pub max_l2: f64,
    #[pyo3(get)]
    pub chamfer: f64,
    #[pyo3(get)]
    pub occupancy_iou: f64,
}

#[pymethods]
impl PyErrorReport {
    pub fn __repr__(&self) -> String {
        format!(
            "ErrorReport(max_axis={:.6}, max_l2={:.6}, chamfer={:.6}, occupancy_iou={:.4})",
            self.max_axis, self.max_l2, self.chamfer, self.occupancy_iou
        )
    }
}

impl From<ebcloud_metrics::ErrorReport> for PyErrorReport {
    fn from(r: ebcloud_metrics::ErrorReport) -> Self {
        Self {
            mean_axis: r.mean_axis,
            max_axis: r.max_axis,
            mean_l2: r.mean_l2,
            max_l2: r.max_l2,
            chamfer: r.chamfer,
            occupancy_iou: r.occupancy_iou,
        }
    }
}

fn check_voxel_size(voxel_size: f64) -> PyResult<()> {
    if !voxel_size.is_finite() || voxel_size <= 0.0 {
        return Err(pyo3::exceptions::PyValueError::new_err(
            "voxel_size must be > 0 and finite",
        ));
    }
    Ok(())
}

#[pyfunction(name = "chamfer_distance")]
pub fn chamfer_distance_py(py: Python<'_>, a: &PyPointCloud, b: &PyPointCloud) -> f64 {
    py.allow_threads(|| ebcloud_metrics::chamfer_distance(&a.inner, &b.inner))
}

#[pyfunction(name = "occupancy_iou")]
#[pyo3(signature = (a, b, voxel_size = ebcloud_metrics::DEFAULT_VOXEL_SIZE))]
pub fn occupancy_iou_py(a: &PyPointCloud, b: &PyPointCloud, voxel_size: f64) -> PyResult<f64> {
    check_voxel_size(voxel_size)?;
    Ok(ebcloud_metrics::occupancy_iou(&a.inner, &b.inner, voxel_size))
}

#[pyfunction(name = "reconstruction_error")]
#[pyo3(signature = (original, reconstructed, voxel_size = ebcloud_metrics::DEFAULT_VOXEL_SIZE))]
pub fn reconstruction_error_py(
    py: Python<'_>,
    original: &PyPointCloud,
    reconstructed: &PyPointCloud,
    voxel_size: f64,
) -> PyResult<PyErrorReport> {
    check_voxel_size(voxel_size)?;
    let report = py.allow_threads(|| {
        ebcloud_metrics::reconstruction_error(&original.inner, &reconstructed.inner, voxel_size)
    });
    Ok(report.into())
}

#[pyfunction(name = "compression_ratio")]
pub fn compression_ratio_py(blob_len: usize, point_count: usize) -> f64 {
    ebcloud_metrics::compression_ratio(blob_len, point_count)
}

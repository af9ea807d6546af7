use numpy::{PyArray1, PyArray2, PyArrayMethods, PyUntypedArrayMethods};
use pyo3::prelude::*;

#[pyclass(name = "PointCloud")]
#[derive(Debug, Clone)]
pub struct PyPointCloud {
    pub(crate) inner: ebcloud_core::PointCloud,
}

#[pymethods]
impl PyPointCloud {
    #[new]
    pub fn new() -> Self {
        Self {
            inner: ebcloud_core::PointCloud::new(),
        }
    }

    /// Create a PointCloud from an Nx3 NumPy array.
    ///
    /// Accepts f32 or f64 arrays. f64 arrays are cast to f32. The array must
    /// be C-contiguous (row-major).
    #[staticmethod]
    pub fn from_numpy(array: &Bound<'_, PyAny>) -> PyResult<Self> {
        if let Ok(arr) = array.downcast::<PyArray2<f32>>() {
            let data = contiguous_rows(arr)?;
            return Ok(Self {
                inner: ebcloud_core::PointCloud::from_array(&data, data.len() / 3),
            });
        }
        if let Ok(arr) = array.downcast::<PyArray2<f64>>() {
            let data: Vec<f32> = contiguous_rows(arr)?.iter().map(|&v| v as f32).collect();
            return Ok(Self {
                inner: ebcloud_core::PointCloud::from_array(&data, data.len() / 3),
            });
        }
        Err(pyo3::exceptions::PyTypeError::new_err(
            "expected NumPy array with dtype float32 or float64, shape (N, 3)",
        ))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn to_numpy<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f32>>> {
        let data = self.inner.to_array();
        Ok(PyArray1::from_vec_bound(py, data).reshape([self.inner.len(), 3])?)
    }

    /// Per-point intensity, or None when the source carried none.
    pub fn intensity<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyArray1<f32>>> {
        self.inner
            .intensity
            .as_ref()
            .map(|values| PyArray1::from_slice_bound(py, values))
    }

    pub fn __len__(&self) -> usize {
        self.inner.len()
    }

    pub fn __repr__(&self) -> String {
        format!("PointCloud(n={})", self.inner.len())
    }
}

impl Default for PyPointCloud {
    fn default() -> Self {
        Self::new()
    }
}

fn contiguous_rows<T: numpy::Element + Copy>(array: &Bound<'_, PyArray2<T>>) -> PyResult<Vec<T>> {
    if !array.is_c_contiguous() {
        return Err(pyo3::exceptions::PyValueError::new_err(
            "array must be C-contiguous (row-major). \
             Use numpy.ascontiguousarray(arr) to convert.",
        ));
    }
    let readonly = array.readonly();
    let shape = readonly.shape();
    if shape.len() != 2 || shape[1] != 3 {
        return Err(pyo3::exceptions::PyValueError::new_err(
            "expected shape (N, 3)",
        ));
    }
    let slice = readonly.as_slice().map_err(|_| {
        pyo3::exceptions::PyValueError::new_err("failed to read array as contiguous slice")
    })?;
    Ok(slice.to_vec())
}

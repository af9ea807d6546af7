use crate::cloud::PyPointCloud;
use ebcloud_codec::Method;
use ebcloud_core::{CodecConfig, CodecError, ErrorBound, PackerChoice};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

pub(crate) fn codec_err(err: CodecError) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(err.to_string())
}

fn parse_packer(name: &str) -> PyResult<PackerChoice> {
    match name {
        "zstd" | "Zstd" => Ok(PackerChoice::Zstd),
        "plain" | "Plain" => Ok(PackerChoice::Plain),
        _ => Err(pyo3::exceptions::PyValueError::new_err(
            "packer must be 'zstd' or 'plain'",
        )),
    }
}

#[pyfunction(name = "compress")]
#[pyo3(signature = (
    cloud,
    method,
    error_bound_cm = 10.0,
    scale_factor = ebcloud_core::DEFAULT_SCALE_FACTOR,
    min_points = ebcloud_core::DEFAULT_MIN_POINTS,
    max_depth = ebcloud_core::DEFAULT_MAX_DEPTH,
    packer = "zstd"
))]
#[allow(clippy::too_many_arguments)]
pub fn compress_py<'py>(
    py: Python<'py>,
    cloud: &PyPointCloud,
    method: &str,
    error_bound_cm: f64,
    scale_factor: u32,
    min_points: u32,
    max_depth: u32,
    packer: &str,
) -> PyResult<Bound<'py, PyBytes>> {
    let method: Method = method.parse().map_err(codec_err)?;
    let config = CodecConfig {
        error_bound: ErrorBound::from_cm(error_bound_cm).map_err(codec_err)?,
        scale_factor,
        min_points,
        max_depth,
        packer: parse_packer(packer)?,
    };
    let blob = py
        .allow_threads(|| ebcloud_codec::compress(&cloud.inner, method, &config))
        .map_err(codec_err)?;
    Ok(PyBytes::new_bound(py, &blob))
}

#[pyfunction(name = "decompress")]
pub fn decompress_py(py: Python<'_>, blob: &[u8]) -> PyResult<PyPointCloud> {
    let cloud = py
        .allow_threads(|| ebcloud_codec::decompress(blob))
        .map_err(codec_err)?;
    Ok(PyPointCloud { inner: cloud })
}

/// Display name of the method a blob was written with, None for empty input.
#[pyfunction(name = "blob_method")]
pub fn blob_method_py(blob: &[u8]) -> PyResult<Option<&'static str>> {
    let method = ebcloud_codec::blob_method(blob).map_err(codec_err)?;
    Ok(method.map(Method::name))
}

#[pyfunction(name = "methods")]
pub fn methods_py() -> Vec<&'static str> {
    Method::ALL.iter().map(|m| m.name()).collect()
}

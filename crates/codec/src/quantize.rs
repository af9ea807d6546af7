use ebcloud_core::{CodecError, PointCloud, Result};

/// `round(value * scale)` as `i32`.
///
/// Non-finite values and values whose scaled form does not fit `i32` are
/// rejected rather than saturated.
pub fn quantize(value: f64, scale: f64) -> Result<i32> {
    let scaled = (value * scale).round();
    if !scaled.is_finite() || scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
        return Err(CodecError::invalid_input(format!(
            "coordinate {} cannot be quantized at scale {}",
            value, scale
        )));
    }
    Ok(scaled as i32)
}

pub fn quantize_axis(values: &[f32], scale: u32) -> Result<Vec<i32>> {
    let scale = scale as f64;
    values.iter().map(|&v| quantize(v as f64, scale)).collect()
}

pub fn dequantize(value: i32, scale: u32) -> f32 {
    (value as f64 / scale as f64) as f32
}

/// Fails with `InvalidInput` when any coordinate is NaN or infinite.
pub fn ensure_finite(cloud: &PointCloud) -> Result<()> {
    if cloud.is_finite() {
        Ok(())
    } else {
        Err(CodecError::invalid_input("point cloud contains non-finite coordinates"))
    }
}

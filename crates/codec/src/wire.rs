//! Blob header fields shared by the codecs.

use ebcloud_core::{CodecError, ErrorBound, ErrorMetric, Result};
use ebcloud_entropy::ByteReader;

use crate::method::Method;

pub(crate) fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_f64(out: &mut Vec<u8>, v: f64) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Write the method tag and, for lossy methods, the metric byte.
pub(crate) fn put_method(out: &mut Vec<u8>, method: Method) {
    out.push(method.tag());
    if let Some(metric) = method.metric() {
        out.push(metric.to_byte());
    }
}

/// Read the tag and check it names one of `accepted`.
///
/// A blob for another codec is `InvalidInput`: the caller picked the wrong
/// decoder, the blob itself may be fine.
pub(crate) fn read_method(reader: &mut ByteReader<'_>, accepted: &[Method]) -> Result<Method> {
    let tag = reader.u8()?;
    let method = Method::from_tag(tag)
        .ok_or_else(|| CodecError::malformed(format!("unknown method tag {}", tag)))?;
    if !accepted.contains(&method) {
        return Err(CodecError::invalid_input(format!(
            "{} blob given to the {} decoder",
            method, accepted[0]
        )));
    }
    Ok(method)
}

/// Read the metric byte and check it agrees with the method tag.
pub(crate) fn read_metric(reader: &mut ByteReader<'_>, method: Method) -> Result<ErrorMetric> {
    let byte = reader.u8()?;
    let metric = ErrorMetric::from_byte(byte)
        .ok_or_else(|| CodecError::malformed(format!("unknown error metric {}", byte)))?;
    if Some(metric) != method.metric() {
        return Err(CodecError::malformed(format!(
            "{} blob carries a {:?} metric",
            method, metric
        )));
    }
    Ok(metric)
}

/// `u64` point count that must fit `usize`.
pub(crate) fn read_count(reader: &mut ByteReader<'_>) -> Result<usize> {
    let count = reader.u64()?;
    usize::try_from(count)
        .map_err(|_| CodecError::malformed(format!("point count {} is not addressable", count)))
}

pub(crate) fn read_finite(reader: &mut ByteReader<'_>, field: &str) -> Result<f64> {
    let v = reader.f64()?;
    if !v.is_finite() {
        return Err(CodecError::malformed(format!("{} is not finite", field)));
    }
    Ok(v)
}

/// The stored error bound, in meters. Negative or non-finite is malformed.
pub(crate) fn read_bound(reader: &mut ByteReader<'_>) -> Result<ErrorBound> {
    let meters = reader.f64()?;
    ErrorBound::from_meters(meters)
        .map_err(|_| CodecError::malformed(format!("stored error bound {} m is invalid", meters)))
}

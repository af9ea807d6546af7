//! EB-HC: per-axis threshold clustering followed by Huffman coding.
//!
//! Each coordinate axis is quantized, clustered independently and coded with
//! its own Huffman table. Blob layout after the tag and metric bytes:
//!
//! ```text
//! scale_factor u32 | threshold u32 | error_bound_m f64 | point_count u64
//! table(x) | table(y) | table(z) | bits(x) u64 | bits(y) u64 | bits(z) u64
//! concatenated bit buffer
//! ```

use std::collections::BTreeMap;

use ebcloud_core::{CodecConfig, CodecError, ErrorBound, ErrorMetric, PointCloud, Result};
use ebcloud_entropy::{BitReader, BitWriter, ByteReader, CodingEfficiency, HuffmanCode};

use crate::method::Method;
use crate::quantize::{dequantize, ensure_finite, quantize_axis};
use crate::wire;

/// Empirical divisor applied to the scaled bound for the Axis metric.
///
/// Merging at the full bound would leave no room for the rounding done at
/// quantization time; 1.65 keeps the observed per-axis error under the bound
/// across the evaluated scans.
pub const AXIS_THRESHOLD_DIVISOR: f64 = 1.65;

const AXIS_STREAMS: [&str; 3] = ["x axis", "y axis", "z axis"];

/// Largest integer distance from a value to its cluster representative.
pub fn derive_threshold(bound: ErrorBound, metric: ErrorMetric, scale_factor: u32) -> u32 {
    let scaled = bound.meters() * scale_factor as f64;
    let threshold = match metric {
        ErrorMetric::Axis => scaled / AXIS_THRESHOLD_DIVISOR,
        ErrorMetric::L2 => scaled / 3f64.sqrt(),
    };
    threshold.floor() as u32
}

/// Result of clustering one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisClusters {
    /// Representative of each input value, in input order.
    pub representatives: Vec<i32>,
    /// Members per representative.
    pub frequencies: BTreeMap<i32, u64>,
}

impl AxisClusters {
    pub fn cluster_count(&self) -> usize {
        self.frequencies.len()
    }
}

/// Greedy interval clustering with a fixed anchor.
///
/// Values are visited in ascending order. The first value of a cluster is its
/// representative; a later value joins while it is within `threshold` of that
/// anchor and otherwise starts the next cluster.
pub fn merge_by_threshold(values: &[i32], threshold: u32) -> AxisClusters {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by_key(|&i| values[i]);

    let mut representatives = vec![0i32; values.len()];
    let mut frequencies = BTreeMap::new();
    let mut anchor: Option<i32> = None;

    for idx in order {
        let v = values[idx];
        let rep = match anchor {
            Some(a) if (v as i64 - a as i64) <= threshold as i64 => a,
            _ => {
                anchor = Some(v);
                v
            }
        };
        representatives[idx] = rep;
        *frequencies.entry(rep).or_insert(0u64) += 1;
    }

    AxisClusters {
        representatives,
        frequencies,
    }
}

pub fn compress(cloud: &PointCloud, metric: ErrorMetric, config: &CodecConfig) -> Result<Vec<u8>> {
    config.validate()?;
    ensure_finite(cloud)?;

    let threshold = derive_threshold(config.error_bound, metric, config.scale_factor);
    let mut out = Vec::new();
    wire::put_method(&mut out, Method::eb_hc(metric));
    wire::put_u32(&mut out, config.scale_factor);
    wire::put_u32(&mut out, threshold);
    wire::put_f64(&mut out, config.error_bound.meters());
    wire::put_u64(&mut out, cloud.len() as u64);
    if cloud.is_empty() {
        return Ok(out);
    }

    let mut writer = BitWriter::with_capacity_bits(cloud.len() * 3);
    let mut bit_lengths = [0u64; 3];
    for (axis, values) in [&cloud.x, &cloud.y, &cloud.z].into_iter().enumerate() {
        let quantized = quantize_axis(values, config.scale_factor)?;
        let clusters = merge_by_threshold(&quantized, threshold);
        let code = HuffmanCode::from_frequencies(&clusters.frequencies)?;

        let before = writer.bit_len();
        code.encode_into(&clusters.representatives, &mut writer)?;
        bit_lengths[axis] = writer.bit_len() - before;
        code.write_table(&mut out);

        let efficiency = CodingEfficiency::measure(&code, &clusters.frequencies);
        log::debug!(
            "{}: {} {} clusters (threshold {}), {} bits, efficiency {:.3}",
            Method::eb_hc(metric),
            AXIS_STREAMS[axis],
            clusters.cluster_count(),
            threshold,
            bit_lengths[axis],
            efficiency.efficiency
        );
    }

    for len in bit_lengths {
        wire::put_u64(&mut out, len);
    }
    let (bits, _) = writer.finish();
    out.extend_from_slice(&bits);
    Ok(out)
}

pub fn decompress(blob: &[u8]) -> Result<PointCloud> {
    let mut reader = ByteReader::new(blob, "eb-hc header");
    let method = wire::read_method(&mut reader, &[Method::EbHcAxis, Method::EbHcL2])?;
    let metric = wire::read_metric(&mut reader, method)?;
    let scale_factor = reader.u32()?;
    if scale_factor == 0 {
        return Err(CodecError::malformed("scale factor is zero"));
    }
    let threshold = reader.u32()?;
    let bound = wire::read_bound(&mut reader)?;
    let expected = derive_threshold(bound, metric, scale_factor);
    if threshold != expected {
        return Err(CodecError::malformed(format!(
            "threshold {} does not follow from the stored bound (expected {})",
            threshold, expected
        )));
    }
    let count = wire::read_count(&mut reader)?;
    if count == 0 {
        reader.finish()?;
        return Ok(PointCloud::new());
    }

    let mut codes = Vec::with_capacity(3);
    for _ in 0..3 {
        let offset = reader.position();
        let (code, used) = HuffmanCode::<i32>::read_table(&blob[offset..])?;
        reader.skip(used)?;
        codes.push(code);
    }
    let bit_lengths = [reader.u64()?, reader.u64()?, reader.u64()?];
    let total_bits = bit_lengths
        .iter()
        .try_fold(0u64, |acc, &len| acc.checked_add(len))
        .ok_or_else(|| CodecError::malformed("bit lengths overflow"))?;

    let bits = reader.rest();
    if total_bits > bits.len() as u64 * 8 {
        return Err(CodecError::exhausted("eb-hc bits"));
    }
    if (bits.len() as u64) != total_bits.div_ceil(8) {
        return Err(CodecError::malformed(format!(
            "{} bytes of bit data for {} bits",
            bits.len(),
            total_bits
        )));
    }

    let mut stream = BitReader::new(bits, total_bits);
    let mut axes: Vec<Vec<f32>> = Vec::with_capacity(3);
    for (axis, code) in codes.iter().enumerate() {
        // Every symbol costs at least one bit.
        if (count as u64) > bit_lengths[axis] {
            return Err(CodecError::exhausted(AXIS_STREAMS[axis]));
        }
        let segment = stream
            .split_off(bit_lengths[axis])
            .ok_or_else(|| CodecError::exhausted(AXIS_STREAMS[axis]))?;
        let symbols = code.decode_reader(segment)?;
        if symbols.len() != count {
            return Err(CodecError::exhausted(AXIS_STREAMS[axis]));
        }
        axes.push(
            symbols
                .into_iter()
                .map(|q| dequantize(q, scale_factor))
                .collect(),
        );
    }

    let z = axes.pop().unwrap_or_default();
    let y = axes.pop().unwrap_or_default();
    let x = axes.pop().unwrap_or_default();
    Ok(PointCloud::from_xyz(x, y, z))
}

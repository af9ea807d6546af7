//! Lossless baseline: Huffman over the little-endian bytes of the quantized
//! coordinates.
//!
//! The only error is the rounding to `1 / scale_factor`. Blob layout after
//! the tag byte:
//!
//! ```text
//! scale_factor u32 | point_count u64 | table_len u32 | table
//! bit_len u64 | payload_len u64 | payload
//! ```

use ebcloud_core::{CodecConfig, CodecError, PointCloud, Result};
use ebcloud_entropy::{encode, ByteReader, HuffmanCode};

use crate::method::Method;
use crate::quantize::{dequantize, ensure_finite, quantize};
use crate::wire;

/// Interleaved `x y z` words, four little-endian bytes each.
fn quantized_bytes(cloud: &PointCloud, scale_factor: u32) -> Result<Vec<u8>> {
    let scale = scale_factor as f64;
    let mut out = Vec::with_capacity(cloud.len() * 12);
    for p in cloud.iter_points() {
        for v in p {
            out.extend_from_slice(&quantize(v as f64, scale)?.to_le_bytes());
        }
    }
    Ok(out)
}

pub fn compress(cloud: &PointCloud, config: &CodecConfig) -> Result<Vec<u8>> {
    config.validate()?;
    ensure_finite(cloud)?;

    let mut out = Vec::new();
    wire::put_method(&mut out, Method::Huffman);
    wire::put_u32(&mut out, config.scale_factor);
    wire::put_u64(&mut out, cloud.len() as u64);
    if cloud.is_empty() {
        return Ok(out);
    }

    let raw = quantized_bytes(cloud, config.scale_factor)?;
    let encoded = encode(&raw)?;
    let mut table = Vec::new();
    encoded.code.write_table(&mut table);
    wire::put_u32(&mut out, table.len() as u32);
    out.extend_from_slice(&table);
    wire::put_u64(&mut out, encoded.bit_len);
    wire::put_u64(&mut out, encoded.bits.len() as u64);
    out.extend_from_slice(&encoded.bits);
    Ok(out)
}

pub fn decompress(blob: &[u8]) -> Result<PointCloud> {
    let mut reader = ByteReader::new(blob, "huffman header");
    wire::read_method(&mut reader, &[Method::Huffman])?;
    let scale_factor = reader.u32()?;
    if scale_factor == 0 {
        return Err(CodecError::malformed("scale factor is zero"));
    }
    let count = wire::read_count(&mut reader)?;
    if count == 0 {
        reader.finish()?;
        return Ok(PointCloud::new());
    }

    let table_len = reader.u32()? as usize;
    let table = reader.take(table_len)?;
    let (code, used) = HuffmanCode::<u8>::read_table(table)?;
    if used != table.len() {
        return Err(CodecError::malformed("code table length mismatch"));
    }
    let bit_len = reader.u64()?;
    let payload_len = reader.len_prefix()?;
    let payload = reader.take(payload_len)?;
    reader.finish()?;

    let raw = code.decode(payload, bit_len)?;
    let expected = count
        .checked_mul(12)
        .ok_or_else(|| CodecError::malformed("point count overflows"))?;
    if raw.len() < expected {
        return Err(CodecError::exhausted("huffman payload"));
    }
    if raw.len() > expected {
        return Err(CodecError::malformed(format!(
            "{} bytes decoded for {} points",
            raw.len(),
            count
        )));
    }

    let mut cloud = PointCloud::with_capacity(count);
    for word in raw.chunks_exact(12) {
        let coord = |i: usize| {
            let q = i32::from_le_bytes([word[i], word[i + 1], word[i + 2], word[i + 3]]);
            dequantize(q, scale_factor)
        };
        cloud.push([coord(0), coord(4), coord(8)]);
    }
    Ok(cloud)
}

//! EB-HC-3D: octree partitioning with per-point byte offsets, all coded by a
//! single Huffman table.
//!
//! Cells are cubes. The root is centred on the bounding box with a side equal
//! to its largest extent; every child halves the side. A leaf stores each
//! member as an offset from the cell centre in units of the error bound,
//! biased into a byte.
//!
//! Symbol stream, in preorder:
//!
//! ```text
//! leaf:     'L' count(u32, big-endian) { x+128 y+128 z+128 } * count
//! internal: 'N' child_mask
//! ```

use ebcloud_core::{CodecConfig, CodecError, ErrorMetric, PointCloud, Result};
use ebcloud_entropy::{encode, ByteReader, HuffmanCode};
use ebcloud_spatial::{child_center, FlatOctree, OctreeNode, SubdivisionRule, OCTANT_COUNT};

use crate::method::Method;
use crate::quantize::ensure_finite;
use crate::wire;

pub const LEAF_TOKEN: u8 = b'L';
pub const NODE_TOKEN: u8 = b'N';

/// Levels past `max_depth` a cell may still be split to make its offsets fit
/// a byte before the encoder gives up.
pub const OVERFLOW_EXTRA_DEPTH: u32 = 16;

const OFFSET_BIAS: i64 = 128;

/// A cubic octree cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub center: [f64; 3],
    pub size: f64,
}

impl Cell {
    /// Cube centred on the bounding box of `cloud`, sized to its largest extent.
    pub fn root_of(cloud: &PointCloud) -> Self {
        let aabb = cloud.aabb();
        Self {
            center: aabb.center(),
            size: aabb.max_extent(),
        }
    }

    pub fn child(&self, octant: usize) -> Self {
        Self {
            center: child_center(self.center, self.size, octant),
            size: self.size * 0.5,
        }
    }
}

/// Leaf test and split policy of EB-HC-3D.
#[derive(Debug, Clone, Copy)]
pub struct HybridRule {
    pub metric: ErrorMetric,
    pub bound: f64,
    pub quant_step: f64,
    pub min_points: usize,
    pub max_depth: u32,
}

impl HybridRule {
    pub fn new(metric: ErrorMetric, config: &CodecConfig) -> Self {
        Self {
            metric,
            bound: config.error_bound.meters(),
            quant_step: config.error_bound.meters(),
            min_points: config.min_points as usize,
            max_depth: config.max_depth,
        }
    }

    /// Biased offsets of `points` from `center`, or the first offset that
    /// does not fit a byte.
    fn offsets(&self, points: &[[f64; 3]], center: &[f64; 3]) -> std::result::Result<Vec<u8>, i64> {
        let mut out = Vec::with_capacity(points.len() * 3);
        for p in points {
            for axis in 0..3 {
                let q = ((p[axis] - center[axis]) / self.quant_step).round() as i64;
                if !(-OFFSET_BIAS..OFFSET_BIAS).contains(&q) {
                    return Err(q);
                }
                out.push((q + OFFSET_BIAS) as u8);
            }
        }
        Ok(out)
    }
}

impl SubdivisionRule for HybridRule {
    type Cell = Cell;
    type Leaf = Vec<u8>;

    fn try_leaf(&self, points: &[[f64; 3]], cell: &Cell, depth: u32) -> Result<Option<Vec<u8>>> {
        let c = cell.center;
        let within_bound = points.iter().all(|p| {
            self.metric.deviation([p[0] - c[0], p[1] - c[1], p[2] - c[2]]) <= self.bound
        });
        let eligible =
            within_bound || points.len() <= self.min_points || depth >= self.max_depth;
        if !eligible {
            return Ok(None);
        }

        match self.offsets(points, &c) {
            Ok(offsets) => Ok(Some(offsets)),
            Err(offset) if depth >= self.max_depth.saturating_add(OVERFLOW_EXTRA_DEPTH) => {
                Err(CodecError::QuantizationOverflow {
                    depth: depth as usize,
                    offset,
                })
            }
            Err(_) => Ok(None),
        }
    }

    fn split_point(&self, _points: &[[f64; 3]], cell: &Cell) -> [f64; 3] {
        cell.center
    }

    fn child_cell(&self, cell: &Cell, octant: usize) -> Cell {
        cell.child(octant)
    }
}

/// Build the tree for `cloud` and flatten it into the symbol stream.
pub fn build_symbol_stream(
    cloud: &PointCloud,
    metric: ErrorMetric,
    config: &CodecConfig,
) -> Result<(Cell, Vec<u8>)> {
    let root = Cell::root_of(cloud);
    let rule = HybridRule::new(metric, config);
    let tree = FlatOctree::build(&rule, cloud.to_f64_points(), root)?;
    log::debug!(
        "{}: {} nodes, {} leaves, depth {}",
        Method::eb_hc_3d(metric),
        tree.len(),
        tree.leaf_count(),
        tree.max_depth()
    );

    let mut stream = Vec::with_capacity(tree.len() * 2 + cloud.len() * 3);
    for node in tree.into_nodes() {
        match node {
            OctreeNode::Internal { child_mask } => {
                stream.push(NODE_TOKEN);
                stream.push(child_mask);
            }
            OctreeNode::Leaf(offsets) => {
                let count = u32::try_from(offsets.len() / 3).map_err(|_| {
                    CodecError::invalid_input("more than u32::MAX points in one leaf")
                })?;
                stream.push(LEAF_TOKEN);
                stream.extend_from_slice(&count.to_be_bytes());
                stream.extend_from_slice(&offsets);
            }
        }
    }
    Ok((root, stream))
}

pub fn compress(cloud: &PointCloud, metric: ErrorMetric, config: &CodecConfig) -> Result<Vec<u8>> {
    config.validate()?;
    if config.error_bound.meters() <= 0.0 {
        return Err(CodecError::invalid_input(
            "EB-HC-3D needs a positive error bound as its quantization step",
        ));
    }
    ensure_finite(cloud)?;

    let mut out = Vec::new();
    wire::put_method(&mut out, Method::eb_hc_3d(metric));
    wire::put_u32(&mut out, config.max_depth);
    wire::put_u32(&mut out, config.min_points);
    wire::put_f64(&mut out, config.error_bound.meters());
    wire::put_f64(&mut out, config.error_bound.meters());

    let (root, stream) = if cloud.is_empty() {
        (
            Cell {
                center: [0.0; 3],
                size: 0.0,
            },
            Vec::new(),
        )
    } else {
        build_symbol_stream(cloud, metric, config)?
    };
    for v in root.center {
        wire::put_f64(&mut out, v);
    }
    wire::put_f64(&mut out, root.size);
    wire::put_u64(&mut out, cloud.len() as u64);
    if cloud.is_empty() {
        return Ok(out);
    }

    let encoded = encode(&stream)?;
    let mut table = Vec::new();
    encoded.code.write_table(&mut table);
    wire::put_u32(&mut out, table.len() as u32);
    out.extend_from_slice(&table);
    wire::put_u64(&mut out, encoded.bit_len);
    wire::put_u64(&mut out, encoded.bits.len() as u64);
    out.extend_from_slice(&encoded.bits);

    log::debug!(
        "{}: {} symbols -> {} bits, table {} bytes",
        Method::eb_hc_3d(metric),
        stream.len(),
        encoded.bit_len,
        table.len()
    );
    Ok(out)
}

pub fn decompress(blob: &[u8]) -> Result<PointCloud> {
    let mut reader = ByteReader::new(blob, "eb-hc-3d header");
    let method = wire::read_method(&mut reader, &[Method::EbHc3dAxis, Method::EbHc3dL2])?;
    wire::read_metric(&mut reader, method)?;
    let max_depth = reader.u32()?;
    let _min_points = reader.u32()?;
    let bound = wire::read_bound(&mut reader)?;
    let quant_step = wire::read_finite(&mut reader, "quantization step")?;
    if quant_step != bound.meters() {
        return Err(CodecError::malformed(format!(
            "quantization step {} differs from the stored bound {}",
            quant_step,
            bound.meters()
        )));
    }
    let center = [
        wire::read_finite(&mut reader, "root centre")?,
        wire::read_finite(&mut reader, "root centre")?,
        wire::read_finite(&mut reader, "root centre")?,
    ];
    let size = wire::read_finite(&mut reader, "root size")?;
    let count = wire::read_count(&mut reader)?;
    if count == 0 {
        reader.finish()?;
        return Ok(PointCloud::new());
    }
    if quant_step <= 0.0 {
        return Err(CodecError::malformed("quantization step must be positive"));
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

    let symbols = code.decode(payload, bit_len)?;
    let decoder = StreamDecoder {
        symbols: &symbols,
        pos: 0,
        quant_step,
        depth_limit: max_depth.saturating_add(OVERFLOW_EXTRA_DEPTH),
    };
    decoder.decode(Cell { center, size }, count)
}

struct StreamDecoder<'a> {
    symbols: &'a [u8],
    pos: usize,
    quant_step: f64,
    depth_limit: u32,
}

impl StreamDecoder<'_> {
    fn next(&mut self) -> Result<u8> {
        let s = *self
            .symbols
            .get(self.pos)
            .ok_or_else(|| CodecError::exhausted("eb-hc-3d symbol"))?;
        self.pos += 1;
        Ok(s)
    }

    fn decode(mut self, root: Cell, count: usize) -> Result<PointCloud> {
        let mut cloud = PointCloud::with_capacity(count.min(self.symbols.len() / 3));
        let mut stack = vec![(root, 0u32)];

        while let Some((cell, depth)) = stack.pop() {
            match self.next()? {
                NODE_TOKEN => {
                    let mask = self.next()?;
                    if mask == 0 {
                        return Err(CodecError::malformed("internal node without children"));
                    }
                    if depth >= self.depth_limit {
                        return Err(CodecError::malformed(format!(
                            "internal node at depth {} past the depth limit",
                            depth
                        )));
                    }
                    for octant in (0..OCTANT_COUNT).rev() {
                        if mask & (1 << octant) != 0 {
                            stack.push((cell.child(octant), depth + 1));
                        }
                    }
                }
                LEAF_TOKEN => {
                    let n = u32::from_be_bytes([self.next()?, self.next()?, self.next()?, self.next()?]);
                    for _ in 0..n {
                        if cloud.len() == count {
                            return Err(CodecError::malformed(format!(
                                "stream holds more than the {} points in the header",
                                count
                            )));
                        }
                        let b = [self.next()?, self.next()?, self.next()?];
                        let mut p = [0.0f32; 3];
                        for axis in 0..3 {
                            p[axis] = (cell.center[axis]
                                + (b[axis] as i64 - OFFSET_BIAS) as f64 * self.quant_step)
                                as f32;
                        }
                        cloud.push(p);
                    }
                }
                other => {
                    return Err(CodecError::malformed(format!("unknown token {}", other)));
                }
            }
        }

        if self.pos != self.symbols.len() {
            return Err(CodecError::malformed(format!(
                "{} trailing symbols",
                self.symbols.len() - self.pos
            )));
        }
        if cloud.len() != count {
            return Err(CodecError::malformed(format!(
                "decoded {} points, header says {}",
                cloud.len(),
                count
            )));
        }
        Ok(cloud)
    }
}

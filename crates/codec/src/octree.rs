//! EB-Octree: recursive bounding-box subdivision with one quantized centroid
//! per leaf.
//!
//! The tree is emitted as a preorder token stream (`0` for a leaf, the child
//! mask for an internal node) next to a stream of leaf centroids, three `i32`
//! per leaf. Both streams go through an [`ebcloud_entropy::IntegerPacker`].
//! Reconstruction yields one point per leaf, so the decoded cloud is usually
//! smaller than the input.

use ebcloud_core::{CodecConfig, CodecError, ErrorMetric, PointCloud, Result};
use ebcloud_entropy::{ByteReader, PackerKind};
use ebcloud_spatial::{bounds_midpoint, FlatOctree, OctreeNode, SubdivisionRule, OCTANT_COUNT};

use crate::method::Method;
use crate::quantize::{dequantize, ensure_finite, quantize};
use crate::wire;

const LEAF_TOKEN: i32 = 0;

/// Leaf test and split policy of EB-Octree.
#[derive(Debug, Clone, Copy)]
pub struct EbOctreeRule {
    pub metric: ErrorMetric,
    pub bound: f64,
    pub scale: f64,
    pub min_points: usize,
    pub max_depth: u32,
}

impl EbOctreeRule {
    pub fn new(metric: ErrorMetric, config: &CodecConfig) -> Self {
        Self {
            metric,
            bound: config.error_bound.meters(),
            scale: config.scale_factor as f64,
            min_points: config.min_points as usize,
            max_depth: config.max_depth,
        }
    }

    /// Quantized centroid of `points`.
    fn representative(&self, points: &[[f64; 3]]) -> Result<[i32; 3]> {
        let n = points.len() as f64;
        let mut sum = [0.0f64; 3];
        for p in points {
            sum[0] += p[0];
            sum[1] += p[1];
            sum[2] += p[2];
        }
        Ok([
            quantize(sum[0] / n, self.scale)?,
            quantize(sum[1] / n, self.scale)?,
            quantize(sum[2] / n, self.scale)?,
        ])
    }
}

impl SubdivisionRule for EbOctreeRule {
    type Cell = ();
    type Leaf = [i32; 3];

    fn try_leaf(&self, points: &[[f64; 3]], _cell: &(), depth: u32) -> Result<Option<[i32; 3]>> {
        let rep = self.representative(points)?;
        let center = [
            rep[0] as f64 / self.scale,
            rep[1] as f64 / self.scale,
            rep[2] as f64 / self.scale,
        ];
        let within_bound = points.iter().all(|p| {
            self.metric
                .deviation([p[0] - center[0], p[1] - center[1], p[2] - center[2]])
                <= self.bound
        });

        if within_bound || points.len() <= self.min_points || depth >= self.max_depth {
            Ok(Some(rep))
        } else {
            Ok(None)
        }
    }

    fn split_point(&self, points: &[[f64; 3]], _cell: &()) -> [f64; 3] {
        bounds_midpoint(points)
    }

    fn child_cell(&self, _cell: &(), _octant: usize) {}
}

/// Token and centroid streams of a built tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OctreeStreams {
    pub tokens: Vec<i32>,
    pub centers: Vec<i32>,
}

impl OctreeStreams {
    pub fn leaf_count(&self) -> usize {
        self.centers.len() / 3
    }
}

/// Build the EB-Octree for `cloud` and flatten it into streams.
pub fn build_streams(
    cloud: &PointCloud,
    metric: ErrorMetric,
    config: &CodecConfig,
) -> Result<OctreeStreams> {
    let rule = EbOctreeRule::new(metric, config);
    let tree = FlatOctree::build(&rule, cloud.to_f64_points(), ())?;
    log::debug!(
        "{}: {} nodes, {} leaves, depth {}",
        Method::eb_octree(metric),
        tree.len(),
        tree.leaf_count(),
        tree.max_depth()
    );

    let mut streams = OctreeStreams {
        tokens: Vec::with_capacity(tree.len()),
        centers: Vec::with_capacity(tree.leaf_count() * 3),
    };
    for node in tree.into_nodes() {
        match node {
            OctreeNode::Internal { child_mask } => streams.tokens.push(child_mask as i32),
            OctreeNode::Leaf(rep) => {
                streams.tokens.push(LEAF_TOKEN);
                streams.centers.extend_from_slice(&rep);
            }
        }
    }
    Ok(streams)
}

pub fn compress(cloud: &PointCloud, metric: ErrorMetric, config: &CodecConfig) -> Result<Vec<u8>> {
    config.validate()?;
    ensure_finite(cloud)?;

    let streams = build_streams(cloud, metric, config)?;
    let kind = PackerKind::from(config.packer);
    let packer = kind.packer();
    let tree_bytes = packer.pack(&streams.tokens)?;
    let center_bytes = packer.pack(&streams.centers)?;

    let mut out = Vec::with_capacity(48 + tree_bytes.len() + center_bytes.len());
    wire::put_method(&mut out, Method::eb_octree(metric));
    out.push(packer.id());
    wire::put_u32(&mut out, config.min_points);
    wire::put_u32(&mut out, config.scale_factor);
    wire::put_u32(&mut out, config.max_depth);
    wire::put_f64(&mut out, config.error_bound.meters());
    wire::put_u64(&mut out, cloud.len() as u64);
    if cloud.is_empty() {
        wire::put_u64(&mut out, 0);
        wire::put_u64(&mut out, 0);
        return Ok(out);
    }
    wire::put_u64(&mut out, tree_bytes.len() as u64);
    wire::put_u64(&mut out, center_bytes.len() as u64);
    out.extend_from_slice(&tree_bytes);
    out.extend_from_slice(&center_bytes);

    log::debug!(
        "{}: {} tokens -> {} bytes, {} centres -> {} bytes ({:?} packer)",
        Method::eb_octree(metric),
        streams.tokens.len(),
        tree_bytes.len(),
        streams.centers.len(),
        center_bytes.len(),
        kind
    );
    Ok(out)
}

pub fn decompress(blob: &[u8]) -> Result<PointCloud> {
    let mut reader = ByteReader::new(blob, "eb-octree header");
    let method = wire::read_method(&mut reader, &[Method::EbOctreeAxis, Method::EbOctreeL2])?;
    wire::read_metric(&mut reader, method)?;
    let packer_id = reader.u8()?;
    let kind = PackerKind::from_id(packer_id)
        .ok_or_else(|| CodecError::malformed(format!("unknown packer id {}", packer_id)))?;
    let _min_points = reader.u32()?;
    let scale_factor = reader.u32()?;
    if scale_factor == 0 {
        return Err(CodecError::malformed("scale factor is zero"));
    }
    let max_depth = reader.u32()?;
    wire::read_bound(&mut reader)?;
    let count = wire::read_count(&mut reader)?;
    let tree_len = reader.len_prefix()?;
    let centers_len = reader.len_prefix()?;
    let tree_bytes = reader.take(tree_len)?;
    let center_bytes = reader.take(centers_len)?;
    reader.finish()?;

    if count == 0 {
        if tree_len != 0 || centers_len != 0 {
            return Err(CodecError::malformed("empty cloud with non-empty streams"));
        }
        return Ok(PointCloud::new());
    }

    let packer = kind.packer();
    let tokens = packer.unpack(tree_bytes)?;
    let centers = packer.unpack(center_bytes)?;
    decode_streams(&tokens, &centers, max_depth, scale_factor)
}

/// Replay the preorder token stream, emitting one point per leaf.
pub fn decode_streams(
    tokens: &[i32],
    centers: &[i32],
    max_depth: u32,
    scale_factor: u32,
) -> Result<PointCloud> {
    let mut cloud = PointCloud::with_capacity(centers.len() / 3);
    let mut stack = vec![0u32];
    let mut t = 0usize;
    let mut c = 0usize;

    while let Some(depth) = stack.pop() {
        let token = *tokens.get(t).ok_or_else(|| CodecError::exhausted("tree"))?;
        t += 1;
        match token {
            LEAF_TOKEN => {
                let rep = centers
                    .get(c..c + 3)
                    .ok_or_else(|| CodecError::exhausted("centers"))?;
                c += 3;
                cloud.push([
                    dequantize(rep[0], scale_factor),
                    dequantize(rep[1], scale_factor),
                    dequantize(rep[2], scale_factor),
                ]);
            }
            1..=255 => {
                if depth >= max_depth {
                    return Err(CodecError::malformed(format!(
                        "internal node at depth {} with max depth {}",
                        depth, max_depth
                    )));
                }
                let mask = token as u8;
                for octant in (0..OCTANT_COUNT).rev() {
                    if mask & (1 << octant) != 0 {
                        stack.push(depth + 1);
                    }
                }
            }
            other => {
                return Err(CodecError::malformed(format!("invalid tree token {}", other)));
            }
        }
    }

    if t != tokens.len() {
        return Err(CodecError::malformed(format!(
            "{} trailing tree tokens",
            tokens.len() - t
        )));
    }
    if c != centers.len() {
        return Err(CodecError::malformed(format!(
            "{} trailing centre values",
            centers.len() - c
        )));
    }
    Ok(cloud)
}

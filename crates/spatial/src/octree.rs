//! Arena octree construction shared by the octree codecs.
//!
//! A tree is built by recursively partitioning a point set into octants and
//! is emitted directly as a preorder array of [`OctreeNode`]s. Each recursive
//! call returns its own subtree, so no state is shared between calls and
//! sibling octants can be built on separate threads.

use ebcloud_core::{CodecError, Result};
use rayon::prelude::*;

pub const OCTANT_COUNT: usize = 8;

/// Nodes holding at least this many points build their children in parallel.
pub const PARALLEL_SPLIT_THRESHOLD: usize = 4096;

/// Hard recursion limit independent of any rule.
pub const MAX_BUILD_DEPTH: u32 = 128;

#[derive(Debug, Clone, PartialEq)]
pub enum OctreeNode<L> {
    /// Bit `i` of `child_mask` is set when octant `i` is non-empty.
    Internal { child_mask: u8 },
    Leaf(L),
}

/// Decides where a node stops subdividing and how it is split.
pub trait SubdivisionRule: Sync {
    /// Geometric state tracked per node (for example a cell centre and size).
    type Cell: Copy + Send + Sync;
    type Leaf: Send;

    /// Returns `Some(leaf)` when `points` should terminate at this node.
    fn try_leaf(
        &self,
        points: &[[f64; 3]],
        cell: &Self::Cell,
        depth: u32,
    ) -> Result<Option<Self::Leaf>>;

    /// Point the node's members are partitioned around.
    fn split_point(&self, points: &[[f64; 3]], cell: &Self::Cell) -> [f64; 3];

    fn child_cell(&self, cell: &Self::Cell, octant: usize) -> Self::Cell;
}

/// Octant of `p` relative to `split`.
///
/// Bit 0 selects x, bit 1 y, bit 2 z. A coordinate equal to the split goes to
/// the upper half.
pub fn octant_of(p: &[f64; 3], split: &[f64; 3]) -> usize {
    let mut idx = 0;
    if p[0] >= split[0] {
        idx |= 1;
    }
    if p[1] >= split[1] {
        idx |= 2;
    }
    if p[2] >= split[2] {
        idx |= 4;
    }
    idx
}

/// Centre of child `octant` of a cubic cell with side `size`.
pub fn child_center(center: [f64; 3], size: f64, octant: usize) -> [f64; 3] {
    let quarter = size * 0.25;
    let mut out = center;
    for (axis, c) in out.iter_mut().enumerate() {
        if octant & (1 << axis) != 0 {
            *c += quarter;
        } else {
            *c -= quarter;
        }
    }
    out
}

/// Midpoint of the axis-aligned bounding box of `points`.
///
/// Returns the origin for an empty slice.
pub fn bounds_midpoint(points: &[[f64; 3]]) -> [f64; 3] {
    if points.is_empty() {
        return [0.0; 3];
    }
    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for p in points {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    [
        0.5 * (min[0] + max[0]),
        0.5 * (min[1] + max[1]),
        0.5 * (min[2] + max[2]),
    ]
}

fn partition(points: Vec<[f64; 3]>, split: &[f64; 3]) -> [Vec<[f64; 3]>; OCTANT_COUNT] {
    let mut counts = [0usize; OCTANT_COUNT];
    for p in &points {
        counts[octant_of(p, split)] += 1;
    }
    let mut out: [Vec<[f64; 3]>; OCTANT_COUNT] =
        std::array::from_fn(|octant| Vec::with_capacity(counts[octant]));
    for p in points {
        out[octant_of(&p, split)].push(p);
    }
    out
}

/// An octree flattened into preorder.
///
/// Internal nodes are followed by the subtrees of their non-empty children in
/// ascending octant order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatOctree<L> {
    nodes: Vec<OctreeNode<L>>,
}

impl<L: Send> FlatOctree<L> {
    /// Build the tree for `points` starting from the `root` cell at depth 0.
    ///
    /// An empty point set yields an empty tree.
    pub fn build<R>(rule: &R, points: Vec<[f64; 3]>, root: R::Cell) -> Result<Self>
    where
        R: SubdivisionRule<Leaf = L>,
    {
        if points.is_empty() {
            return Ok(Self { nodes: Vec::new() });
        }
        let nodes = build_subtree(rule, points, root, 0)?;
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[OctreeNode<L>] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<OctreeNode<L>> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, OctreeNode::Leaf(_)))
            .count()
    }

    /// Depth of the deepest node (0 for a single root leaf).
    pub fn max_depth(&self) -> u32 {
        let mut deepest = 0;
        // Remaining children still to visit at each open level.
        let mut pending: Vec<u32> = Vec::new();
        for node in &self.nodes {
            let depth = pending.len() as u32;
            deepest = deepest.max(depth);
            match node {
                OctreeNode::Internal { child_mask } => pending.push(child_mask.count_ones()),
                OctreeNode::Leaf(_) => {
                    while let Some(left) = pending.last_mut() {
                        *left -= 1;
                        if *left > 0 {
                            break;
                        }
                        pending.pop();
                    }
                }
            }
        }
        deepest
    }
}

fn build_subtree<R>(
    rule: &R,
    points: Vec<[f64; 3]>,
    cell: R::Cell,
    depth: u32,
) -> Result<Vec<OctreeNode<R::Leaf>>>
where
    R: SubdivisionRule,
{
    if let Some(leaf) = rule.try_leaf(&points, &cell, depth)? {
        return Ok(vec![OctreeNode::Leaf(leaf)]);
    }
    if depth >= MAX_BUILD_DEPTH {
        return Err(CodecError::invalid_input(format!(
            "octree did not terminate within {} levels",
            MAX_BUILD_DEPTH
        )));
    }

    let split = rule.split_point(&points, &cell);
    let parallel = points.len() >= PARALLEL_SPLIT_THRESHOLD;

    let mut child_mask = 0u8;
    let mut children = Vec::with_capacity(OCTANT_COUNT);
    for (octant, child_points) in partition(points, &split).into_iter().enumerate() {
        if child_points.is_empty() {
            continue;
        }
        child_mask |= 1 << octant;
        children.push((child_points, rule.child_cell(&cell, octant)));
    }

    let subtrees: Vec<Vec<OctreeNode<R::Leaf>>> = if parallel {
        children
            .into_par_iter()
            .map(|(pts, child)| build_subtree(rule, pts, child, depth + 1))
            .collect::<Result<_>>()?
    } else {
        children
            .into_iter()
            .map(|(pts, child)| build_subtree(rule, pts, child, depth + 1))
            .collect::<Result<_>>()?
    };

    let total = 1 + subtrees.iter().map(Vec::len).sum::<usize>();
    let mut nodes = Vec::with_capacity(total);
    nodes.push(OctreeNode::Internal { child_mask });
    for subtree in subtrees {
        nodes.extend(subtree);
    }
    Ok(nodes)
}

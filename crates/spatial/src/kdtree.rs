use kiddo::float::distance::SquaredEuclidean;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use ebcloud_core::PointCloud;
use std::num::NonZero;

/// A KdTree for nearest-neighbour queries against one side of a comparison.
///
/// Built on top of kiddo v5's `ImmutableKdTree`, which uses a cache-optimized
/// layout for faster queries than the mutable variant. The tree is built once
/// from a cloud and cannot be modified afterwards.
///
/// The tree stores `u32` indices mapping back to the original PointCloud.
#[derive(Debug, Clone)]
pub struct KdTree {
    tree: ImmutableKdTree<f32, u32, 3, 32>,
    num_points: usize,
}

impl KdTree {
    /// Build a KdTree from a PointCloud.
    pub fn build(cloud: &PointCloud) -> Self {
        let n = cloud.len();
        if n == 0 {
            return Self {
                tree: ImmutableKdTree::new_from_slice(&[]),
                num_points: 0,
            };
        }

        let points: Vec<[f32; 3]> = cloud.iter_points().collect();
        let tree = ImmutableKdTree::new_from_slice(&points);

        Self {
            tree,
            num_points: n,
        }
    }

    /// Returns the number of points in the tree.
    pub fn len(&self) -> usize {
        self.num_points
    }

    /// Returns true if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.num_points == 0
    }

    /// Index of the point closest to `query` and its **squared** distance.
    ///
    /// Returns `None` if the tree is empty or the query is not finite.
    pub fn nearest(&self, query: &[f32; 3]) -> Option<(usize, f32)> {
        if self.is_empty() || !query.iter().all(|v| v.is_finite()) {
            return None;
        }

        self.tree
            .nearest_n::<SquaredEuclidean>(query, NonZero::<usize>::MIN)
            .first()
            .map(|nn| (nn.item as usize, nn.distance))
    }
}

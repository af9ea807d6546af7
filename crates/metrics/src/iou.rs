use ebcloud_core::{Aabb, PointCloud};
use ebcloud_spatial::VoxelGrid;

/// Voxel edge used when a caller does not pick one, in metres.
pub const DEFAULT_VOXEL_SIZE: f64 = 0.1;

/// Occupancy Intersection-over-Union of two clouds.
///
/// Both clouds are voxelized on one grid anchored at their joint minimum
/// corner. Returns `|A ∩ B| / |A ∪ B|` over occupied voxels, or 0 when either
/// cloud has no finite points.
///
/// # Panics
///
/// Panics if `voxel_size` is not finite and strictly positive.
pub fn occupancy_iou(a: &PointCloud, b: &PointCloud, voxel_size: f64) -> f64 {
    assert!(
        voxel_size.is_finite() && voxel_size > 0.0,
        "voxel_size must be > 0 and finite"
    );

    let box_a = a.aabb();
    let box_b = b.aabb();
    if box_a.is_empty() || box_b.is_empty() {
        return 0.0;
    }
    let mut joint = Aabb::empty();
    joint.merge(&box_a);
    joint.merge(&box_b);

    let origin = [
        joint.min[0] as f64,
        joint.min[1] as f64,
        joint.min[2] as f64,
    ];
    let grid = VoxelGrid::new(origin, voxel_size);
    let cells_a = grid.occupied(a);
    let cells_b = grid.occupied(b);

    let intersection = cells_a.intersection(&cells_b).count();
    let union = cells_a.len() + cells_b.len() - intersection;
    intersection as f64 / union as f64
}

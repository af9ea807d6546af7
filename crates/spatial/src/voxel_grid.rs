use ebcloud_core::PointCloud;
use hashbrown::HashSet;

pub type VoxelKey = (i64, i64, i64);

/// Regular grid of cubic voxels anchored at `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelGrid {
    origin: [f64; 3],
    voxel_size: f64,
}

impl VoxelGrid {
    /// # Panics
    ///
    /// Panics if `voxel_size` is not finite and strictly positive.
    pub fn new(origin: [f64; 3], voxel_size: f64) -> Self {
        assert!(
            voxel_size.is_finite() && voxel_size > 0.0,
            "voxel_size must be > 0 and finite"
        );
        Self { origin, voxel_size }
    }

    pub fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    /// Cell containing `point`, or `None` for a non-finite point.
    pub fn key(&self, point: [f32; 3]) -> Option<VoxelKey> {
        if !point.iter().all(|v| v.is_finite()) {
            return None;
        }
        let cell = |axis: usize| {
            ((point[axis] as f64 - self.origin[axis]) / self.voxel_size).floor() as i64
        };
        Some((cell(0), cell(1), cell(2)))
    }

    /// Set of cells holding at least one finite point of `cloud`.
    pub fn occupied(&self, cloud: &PointCloud) -> HashSet<VoxelKey> {
        cloud.iter_points().filter_map(|p| self.key(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::VoxelGrid;
    use ebcloud_core::PointCloud;
    use proptest::prelude::*;

    #[test]
    fn key_floors_relative_to_origin() {
        let grid = VoxelGrid::new([1.0, 1.0, 1.0], 0.5);
        assert_eq!(grid.key([1.0, 1.0, 1.0]), Some((0, 0, 0)));
        assert_eq!(grid.key([1.74, 2.0, 0.9]), Some((1, 2, -1)));
        assert_eq!(grid.key([f32::NAN, 0.0, 0.0]), None);
    }

    #[test]
    fn occupied_merges_points_in_same_cell() {
        let cloud = PointCloud::from_xyz(
            vec![0.01, 0.02, 0.5],
            vec![0.01, 0.03, 0.5],
            vec![0.0, 0.0, 0.0],
        );
        let grid = VoxelGrid::new([0.0; 3], 0.1);
        let cells = grid.occupied(&cloud);
        assert_eq!(cells.len(), 2);
    }

    #[test]
    #[should_panic]
    fn zero_voxel_size_panics() {
        let _ = VoxelGrid::new([0.0; 3], 0.0);
    }

    proptest! {
        #[test]
        fn occupied_never_exceeds_point_count(
            pts in prop::collection::vec((-50.0f32..50.0f32, -50.0f32..50.0f32, -50.0f32..50.0f32), 0..300),
            voxel_size in 0.01f64..5.0f64,
        ) {
            let cloud = PointCloud::from_points(
                &pts.iter().map(|p| [p.0, p.1, p.2]).collect::<Vec<_>>(),
            );
            let grid = VoxelGrid::new([-50.0; 3], voxel_size);
            prop_assert!(grid.occupied(&cloud).len() <= cloud.len());
        }
    }
}

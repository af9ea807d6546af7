#![forbid(unsafe_code)]

pub mod kdtree;
pub mod octree;
pub mod voxel_grid;

pub use kdtree::KdTree;
pub use octree::{
    bounds_midpoint, child_center, octant_of, FlatOctree, OctreeNode, SubdivisionRule,
    OCTANT_COUNT,
};
pub use voxel_grid::{VoxelGrid, VoxelKey};

use ebcloud_core::{ErrorMetric, PointCloud};
use ebcloud_spatial::KdTree;

use crate::chamfer::{chamfer_distance, nearest_indices, squared_distance};
use crate::iou::occupancy_iou;

/// Reconstruction quality of a decoded cloud against its original.
///
/// Axis and L2 errors pair every original point with its nearest
/// reconstructed point, so they stay meaningful when a codec changes the
/// point count or order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorReport {
    pub mean_axis: f64,
    pub max_axis: f64,
    pub mean_l2: f64,
    pub max_l2: f64,
    pub chamfer: f64,
    pub occupancy_iou: f64,
}

impl ErrorReport {
    /// Every field NaN; reported when either cloud is empty.
    pub fn nan() -> Self {
        Self {
            mean_axis: f64::NAN,
            max_axis: f64::NAN,
            mean_l2: f64::NAN,
            max_l2: f64::NAN,
            chamfer: f64::NAN,
            occupancy_iou: f64::NAN,
        }
    }

    /// Worst-case error under `metric`.
    pub fn max_error(&self, metric: ErrorMetric) -> f64 {
        match metric {
            ErrorMetric::Axis => self.max_axis,
            ErrorMetric::L2 => self.max_l2,
        }
    }
}

pub fn reconstruction_error(
    original: &PointCloud,
    reconstructed: &PointCloud,
    voxel_size: f64,
) -> ErrorReport {
    if original.is_empty() || reconstructed.is_empty() {
        return ErrorReport::nan();
    }

    let tree = KdTree::build(reconstructed);
    let queries: Vec<[f32; 3]> = original.iter_points().collect();
    let nearest = nearest_indices(&queries, &tree);

    let mut n = 0usize;
    let (mut sum_axis, mut max_axis) = (0.0f64, 0.0f64);
    let (mut sum_l2, mut max_l2) = (0.0f64, 0.0f64);
    for (p, idx) in queries.iter().zip(nearest) {
        let Some(idx) = idx else { continue };
        let q = reconstructed.point(idx);
        let axis = ErrorMetric::Axis.deviation([
            p[0] as f64 - q[0] as f64,
            p[1] as f64 - q[1] as f64,
            p[2] as f64 - q[2] as f64,
        ]);
        let l2 = squared_distance(*p, q).sqrt();
        sum_axis += axis;
        max_axis = max_axis.max(axis);
        sum_l2 += l2;
        max_l2 = max_l2.max(l2);
        n += 1;
    }
    if n == 0 {
        return ErrorReport::nan();
    }

    ErrorReport {
        mean_axis: sum_axis / n as f64,
        max_axis,
        mean_l2: sum_l2 / n as f64,
        max_l2,
        chamfer: chamfer_distance(original, reconstructed),
        occupancy_iou: occupancy_iou(original, reconstructed, voxel_size),
    }
}

/// Compressed size over raw size, both in bits.
///
/// The raw size counts three 32-bit coordinates per point. Returns 0 for an
/// empty cloud.
pub fn compression_ratio(blob_len: usize, point_count: usize) -> f64 {
    if point_count == 0 {
        return 0.0;
    }
    (blob_len as f64 * 8.0) / (point_count as f64 * 3.0 * 32.0)
}

use ebcloud_core::PointCloud;
use ebcloud_spatial::KdTree;
use rayon::prelude::*;

/// Index of the nearest point in `tree` for every query, in query order.
///
/// Queries run in parallel. Non-finite queries get `None`.
pub(crate) fn nearest_indices(queries: &[[f32; 3]], tree: &KdTree) -> Vec<Option<usize>> {
    queries
        .par_iter()
        .map(|q| tree.nearest(q).map(|(idx, _)| idx))
        .collect()
}

pub(crate) fn squared_distance(a: [f32; 3], b: [f32; 3]) -> f64 {
    let dx = a[0] as f64 - b[0] as f64;
    let dy = a[1] as f64 - b[1] as f64;
    let dz = a[2] as f64 - b[2] as f64;
    dx * dx + dy * dy + dz * dz
}

fn finite_points(cloud: &PointCloud) -> Vec<[f32; 3]> {
    cloud
        .iter_points()
        .filter(|p| p.iter().all(|v| v.is_finite()))
        .collect()
}

/// Mean over `from` of the squared distance to the nearest point of `to`.
fn directed_term(from: &[[f32; 3]], to: &[[f32; 3]]) -> f64 {
    let tree = KdTree::build(&PointCloud::from_points(to));
    let nearest = nearest_indices(from, &tree);
    // Summed sequentially so the result does not depend on thread scheduling.
    let mut sum = 0.0;
    let mut n = 0usize;
    for (p, idx) in from.iter().zip(nearest) {
        if let Some(idx) = idx {
            sum += squared_distance(*p, to[idx]);
            n += 1;
        }
    }
    sum / n as f64
}

/// Symmetric Chamfer Distance between two clouds.
///
/// The sum of the mean squared nearest-neighbour distance from `a` to `b` and
/// from `b` to `a`. Non-finite points are ignored; the result is NaN when
/// either side has no finite points.
pub fn chamfer_distance(a: &PointCloud, b: &PointCloud) -> f64 {
    let a = finite_points(a);
    let b = finite_points(b);
    if a.is_empty() || b.is_empty() {
        return f64::NAN;
    }
    directed_term(&a, &b) + directed_term(&b, &a)
}

#[cfg(test)]
mod tests {
    use super::chamfer_distance;
    use ebcloud_core::PointCloud;
    use proptest::prelude::*;

    #[test]
    fn identical_clouds_score_zero() {
        let cloud = PointCloud::from_points(&[[0.0, 0.0, 0.0], [1.0, 2.0, 3.0], [-4.0, 0.5, 2.0]]);
        assert_eq!(chamfer_distance(&cloud, &cloud), 0.0);
    }

    #[test]
    fn shifted_single_point() {
        let a = PointCloud::from_points(&[[0.0, 0.0, 0.0]]);
        let b = PointCloud::from_points(&[[3.0, 4.0, 0.0]]);
        // 25 in each direction.
        assert!((chamfer_distance(&a, &b) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn asymmetric_coverage() {
        let a = PointCloud::from_points(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]]);
        let b = PointCloud::from_points(&[[0.0, 0.0, 0.0]]);
        // a -> b: (0 + 100) / 2, b -> a: 0.
        assert!((chamfer_distance(&a, &b) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_side_is_nan() {
        let a = PointCloud::from_points(&[[0.0, 0.0, 0.0]]);
        assert!(chamfer_distance(&a, &PointCloud::new()).is_nan());
        assert!(chamfer_distance(&PointCloud::new(), &a).is_nan());
    }

    #[test]
    fn non_finite_points_are_ignored() {
        let a = PointCloud::from_points(&[[0.0, 0.0, 0.0], [f32::NAN, 0.0, 0.0]]);
        let b = PointCloud::from_points(&[[0.0, 0.0, 1.0]]);
        assert!((chamfer_distance(&a, &b) - 2.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn symmetric_and_non_negative(
            a in prop::collection::vec((-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0), 1..120),
            b in prop::collection::vec((-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0), 1..120),
        ) {
            let a = PointCloud::from_points(&a.iter().map(|p| [p.0, p.1, p.2]).collect::<Vec<_>>());
            let b = PointCloud::from_points(&b.iter().map(|p| [p.0, p.1, p.2]).collect::<Vec<_>>());
            let ab = chamfer_distance(&a, &b);
            let ba = chamfer_distance(&b, &a);
            prop_assert!(ab >= 0.0);
            prop_assert_eq!(ab, ba);
        }
    }
}

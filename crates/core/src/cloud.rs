use crate::Aabb;

/// A LiDAR scan stored as structure-of-arrays.
///
/// `intensity` is carried through from the sensor record when present; the
/// codecs only look at the coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub intensity: Option<Vec<f32>>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            intensity: None,
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
            intensity: None,
        }
    }

    pub fn from_xyz(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        Self {
            x,
            y,
            z,
            intensity: None,
        }
    }

    pub fn from_points(points: &[[f32; 3]]) -> Self {
        let mut cloud = Self::with_capacity(points.len());
        for p in points {
            cloud.push(*p);
        }
        cloud
    }

    pub fn from_array(data: &[f32], num_points: usize) -> Self {
        assert_eq!(
            data.len(),
            num_points * 3,
            "interleaved xyz input must have num_points * 3 floats"
        );

        let mut cloud = Self::with_capacity(num_points);
        for chunk in data.chunks_exact(3).take(num_points) {
            cloud.push([chunk[0], chunk[1], chunk[2]]);
        }
        cloud
    }

    /// Append a point. A cloud carrying intensity gets 0 for the new point.
    pub fn push(&mut self, point: [f32; 3]) {
        if let Some(intensity) = self.intensity.as_mut() {
            intensity.push(0.0);
        }
        self.x.push(point[0]);
        self.y.push(point[1]);
        self.z.push(point[2]);
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_xyz(&self.x, &self.y, &self.z)
    }

    pub fn point(&self, i: usize) -> [f32; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    pub fn iter_points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    /// Coordinates widened to f64, the precision the octree codecs work in.
    pub fn to_f64_points(&self) -> Vec<[f64; 3]> {
        self.iter_points()
            .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
            .collect()
    }

    /// True when every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.x
            .iter()
            .chain(&self.y)
            .chain(&self.z)
            .all(|v| v.is_finite())
    }

    pub fn to_array(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len() * 3);
        for i in 0..self.len() {
            out.push(self.x[i]);
            out.push(self.y[i]);
            out.push(self.z[i]);
        }
        out
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::PointCloud;
    use proptest::prelude::*;

    #[test]
    fn new_is_empty() {
        let cloud = PointCloud::new();
        assert!(cloud.is_empty());
        assert_eq!(cloud.len(), 0);
    }

    #[test]
    fn from_xyz_builds_cloud() {
        let cloud = PointCloud::from_xyz(vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.point(0), [1.0, 3.0, 5.0]);
        assert_eq!(cloud.point(1), [2.0, 4.0, 6.0]);
    }

    #[test]
    fn from_points_matches_from_xyz() {
        let cloud = PointCloud::from_points(&[[1.0, 3.0, 5.0], [2.0, 4.0, 6.0]]);
        assert_eq!(
            cloud,
            PointCloud::from_xyz(vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0])
        );
    }

    #[test]
    fn from_array_deinterleaves() {
        let arr = vec![1.0, 10.0, 100.0, 2.0, 20.0, 200.0];
        let cloud = PointCloud::from_array(&arr, 2);
        assert_eq!(cloud.x, vec![1.0, 2.0]);
        assert_eq!(cloud.y, vec![10.0, 20.0]);
        assert_eq!(cloud.z, vec![100.0, 200.0]);
    }

    #[test]
    fn to_f64_points_widens_exactly() {
        let cloud = PointCloud::from_xyz(vec![0.1], vec![-2.5], vec![1e6]);
        let pts = cloud.to_f64_points();
        assert_eq!(pts, vec![[0.1f32 as f64, -2.5, 1e6]]);
    }

    #[test]
    fn is_finite_detects_nan() {
        let mut cloud = PointCloud::from_xyz(vec![0.0, 1.0], vec![0.0; 2], vec![0.0; 2]);
        assert!(cloud.is_finite());
        cloud.z[1] = f32::NAN;
        assert!(!cloud.is_finite());
    }

    #[test]
    fn push_extends_intensity_with_zero() {
        let mut cloud = PointCloud::from_points(&[[1.0, 2.0, 3.0]]);
        cloud.intensity = Some(vec![0.7]);
        cloud.push([4.0, 5.0, 6.0]);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.intensity, Some(vec![0.7, 0.0]));
    }

    #[test]
    fn push_without_intensity_keeps_none() {
        let mut cloud = PointCloud::new();
        cloud.push([1.0, 2.0, 3.0]);
        assert_eq!(cloud.intensity, None);
    }

    #[test]
    #[should_panic]
    fn from_xyz_panics_on_mismatch() {
        let _ = PointCloud::from_xyz(vec![1.0], vec![2.0, 3.0], vec![4.0]);
    }

    proptest! {
        #[test]
        fn roundtrip_preserves_interleaved_data(
            pts in prop::collection::vec((-1000.0f32..1000.0f32, -1000.0f32..1000.0f32, -1000.0f32..1000.0f32), 0..500)
        ) {
            let mut flat = Vec::with_capacity(pts.len() * 3);
            for (x, y, z) in &pts {
                flat.push(*x);
                flat.push(*y);
                flat.push(*z);
            }
            let cloud = PointCloud::from_array(&flat, pts.len());
            prop_assert_eq!(cloud.to_array(), flat);
        }
    }
}

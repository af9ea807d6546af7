#[derive(Debug, Clone, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
    empty: bool,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: [f32::INFINITY; 3],
            max: [f32::NEG_INFINITY; 3],
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn expand_with_point(&mut self, point: [f32; 3]) {
        if !point.iter().all(|v| v.is_finite()) {
            return;
        }

        if self.empty {
            self.min = point;
            self.max = point;
            self.empty = false;
            return;
        }

        for (axis, &val) in point.iter().enumerate() {
            self.min[axis] = self.min[axis].min(val);
            self.max[axis] = self.max[axis].max(val);
        }
    }

    /// Grow this box so it also covers `other`.
    pub fn merge(&mut self, other: &Aabb) {
        if other.empty {
            return;
        }
        self.expand_with_point(other.min);
        self.expand_with_point(other.max);
    }

    /// Midpoint of the box, computed in f64 so the sum of two f32 bounds is exact.
    ///
    /// Returns the origin for an empty box.
    pub fn center(&self) -> [f64; 3] {
        if self.empty {
            return [0.0; 3];
        }
        [
            0.5 * (self.min[0] as f64 + self.max[0] as f64),
            0.5 * (self.min[1] as f64 + self.max[1] as f64),
            0.5 * (self.min[2] as f64 + self.max[2] as f64),
        ]
    }

    /// Largest side length of the box (0 for an empty box).
    pub fn max_extent(&self) -> f64 {
        if self.empty {
            return 0.0;
        }
        (0..3)
            .map(|axis| self.max[axis] as f64 - self.min[axis] as f64)
            .fold(0.0, f64::max)
    }

    pub fn from_xyz(x: &[f32], y: &[f32], z: &[f32]) -> Self {
        let n = x.len().min(y.len()).min(z.len());
        let mut aabb = Self::empty();
        for i in 0..n {
            aabb.expand_with_point([x[i], y[i], z[i]]);
        }
        aabb
    }
}

/// Axis-aligned bounds of a point set, in scene coordinates.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointCloudBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Default for PointCloudBounds {
    fn default() -> Self {
        Self::new()
    }
}

impl PointCloudBounds {
    /// Empty bounds: minimums at +inf, maximums at -inf.
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
            min_z: f64::INFINITY,
            max_z: f64::NEG_INFINITY,
        }
    }

    /// Bounds of a slice of positions, e.g. one chunk.
    pub fn from_positions(positions: &[[f64; 3]]) -> Self {
        let mut bounds = Self::new();
        for &[x, y, z] in positions {
            bounds.update(x, y, z);
        }
        bounds
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }

    pub fn update(&mut self, x: f64, y: f64, z: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
        self.min_z = self.min_z.min(z);
        self.max_z = self.max_z.max(z);
    }

    /// Union of two bounds. Used to reduce per-chunk results.
    pub fn merge(mut self, other: Self) -> Self {
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
        self.min_z = self.min_z.min(other.min_z);
        self.max_z = self.max_z.max(other.max_z);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_union() {
        let a = PointCloudBounds::from_positions(&[[0.0, 1.0, 2.0], [1.0, 1.0, 1.0]]);
        let b = PointCloudBounds::from_positions(&[[-1.0, 5.0, 1.5]]);
        let merged = a.merge(b);

        assert_eq!(merged.min_x, -1.0);
        assert_eq!(merged.max_y, 5.0);
        assert_eq!(merged.min_z, 1.0);
        assert_eq!(merged.max_x, 1.0);
        assert_eq!(merged.merge(PointCloudBounds::new()), merged);
    }

    #[test]
    fn empty_until_first_update() {
        let mut bounds = PointCloudBounds::new();
        assert!(bounds.is_empty());
        bounds.update(10.0, 3.0, 4.0);
        assert!(!bounds.is_empty());
    }
}

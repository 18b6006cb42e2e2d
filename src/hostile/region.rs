//! Axis-aligned spawn volume owned by a definition.
use bevy::prelude::Vec3;
use rand::Rng;

/// Box new instances are placed in. `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpawnRegion {
    min: Vec3,
    max: Vec3,
}

impl SpawnRegion {
    /// Builds a region from any two opposite corners.
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive on both corners.
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Uniformly distributed point inside the region.
    pub fn random_point(&self, rng: &mut impl Rng) -> Vec3 {
        let extent = self.size();
        Vec3::new(
            self.min.x + rng.gen::<f32>() * extent.x,
            self.min.y + rng.gen::<f32>() * extent.y,
            self.min.z + rng.gen::<f32>() * extent.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn corners_are_normalised() {
        let region = SpawnRegion::from_corners(Vec3::new(10.0, -2.0, 5.0), Vec3::new(0.0, 4.0, -5.0));
        assert_eq!(region.min(), Vec3::new(0.0, -2.0, -5.0));
        assert_eq!(region.max(), Vec3::new(10.0, 4.0, 5.0));
        assert_eq!(region.center(), Vec3::new(5.0, 1.0, 0.0));
    }

    #[test]
    fn random_points_stay_inside() {
        let region = SpawnRegion::from_corners(Vec3::new(-8.0, 60.0, 3.0), Vec3::new(8.0, 64.0, 9.0));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..256 {
            assert!(region.contains(region.random_point(&mut rng)));
        }
    }

    #[test]
    fn degenerate_region_yields_its_corner() {
        let corner = Vec3::new(1.0, 2.0, 3.0);
        let region = SpawnRegion::from_corners(corner, corner);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(region.random_point(&mut rng), corner);
        assert!(region.contains(corner));
        assert!(!region.contains(corner + Vec3::X));
    }
}

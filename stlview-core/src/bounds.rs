/// Axis-aligned bounding boxes and the aggregate used to center a scene
use nalgebra::{Point3, Vector3};

/// Per-axis extrema of one or more geometries.
///
/// A fresh box is empty: it contains no points and reports a zero center
/// and zero size until something is folded into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Point3<f32>,
    max: Point3<f32>,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn from_corners(a: Point3<f32>, b: Point3<f32>) -> Self {
        let mut bbox = Self::empty();
        bbox.include_point(&a);
        bbox.include_point(&b);
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn min(&self) -> Option<Point3<f32>> {
        (!self.is_empty()).then_some(self.min)
    }

    pub fn max(&self) -> Option<Point3<f32>> {
        (!self.is_empty()).then_some(self.max)
    }

    pub fn include_point(&mut self, p: &Point3<f32>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Grow this box to also cover `other`
    pub fn union(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Midpoint of min and max on every axis
    pub fn center(&self) -> Point3<f32> {
        if self.is_empty() {
            return Point3::origin();
        }
        nalgebra::center(&self.min, &self.max)
    }

    /// Extent along each axis
    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    /// Largest of the three axis extents
    pub fn max_extent(&self) -> f32 {
        self.size().max()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

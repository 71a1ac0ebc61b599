/// Geometry primitives for loaded STL meshes
use nalgebra::{Point3, Vector3};

use crate::bounds::BoundingBox;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal computed from the winding of the vertices.
    ///
    /// Degenerate (zero-area) faces yield the zero vector instead of NaN.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// A triangle mesh, the geometry behind one configured model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    /// Iterate over every vertex position in triangle order
    pub fn positions(&self) -> impl Iterator<Item = &Point3<f32>> + '_ {
        self.triangles
            .iter()
            .flat_map(|t| t.vertices.iter().map(|v| &v.position))
    }

    /// Axis-aligned bounds of this geometry alone
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for p in self.positions() {
            bbox.include_point(p);
        }
        bbox
    }

    /// Translate every vertex in place
    pub fn translate(&mut self, offset: &Vector3<f32>) {
        for triangle in &mut self.triangles {
            for vertex in &mut triangle.vertices {
                vertex.position += offset;
            }
        }
    }

    /// Create an axis-aligned box spanning `min`..`max`
    pub fn cuboid(min: Point3<f32>, max: Point3<f32>) -> Self {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        let mut mesh = Self::new();

        let mut quad = |a: [f32; 3], b: [f32; 3], c: [f32; 3], d: [f32; 3], n: [f32; 3]| {
            let v = |p: [f32; 3]| Vertex::new(p[0], p[1], p[2], n[0], n[1], n[2]);
            mesh.add_triangle(Triangle::new(v(a), v(b), v(c)));
            mesh.add_triangle(Triangle::new(v(a), v(c), v(d)));
        };

        // Front / back
        quad([x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1], [0.0, 0.0, 1.0]);
        quad([x0, y0, z0], [x0, y1, z0], [x1, y1, z0], [x1, y0, z0], [0.0, 0.0, -1.0]);
        // Top / bottom
        quad([x0, y1, z0], [x0, y1, z1], [x1, y1, z1], [x1, y1, z0], [0.0, 1.0, 0.0]);
        quad([x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1], [0.0, -1.0, 0.0]);
        // Right / left
        quad([x1, y0, z0], [x1, y1, z0], [x1, y1, z1], [x1, y0, z1], [1.0, 0.0, 0.0]);
        quad([x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0], [-1.0, 0.0, 0.0]);

        mesh
    }

    /// Create a cube centered on the origin
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        Self::cuboid(
            Point3::new(-half, -half, -half),
            Point3::new(half, half, half),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_has_twelve_faces() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.triangles.len(), 12);
        assert_eq!(cube.vertex_count(), 36);
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let cube = Mesh::cube(2.0);
        for triangle in &cube.triangles {
            let centroid = triangle
                .vertices
                .iter()
                .fold(Vector3::zeros(), |acc, v| acc + v.position.coords)
                / 3.0;
            assert!(triangle.calculate_normal().dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn test_translate_moves_bounds() {
        let mut mesh = Mesh::cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        mesh.translate(&Vector3::new(-1.0, 1.0, 0.5));
        let bbox = mesh.bounding_box();
        assert_eq!(bbox.min(), Some(Point3::new(-1.0, 1.0, 0.5)));
        assert_eq!(bbox.max(), Some(Point3::new(0.0, 3.0, 3.5)));
    }

    #[test]
    fn test_degenerate_normal_is_zero() {
        let v = Vertex::new(1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let triangle = Triangle::new(v, v, v);
        assert_eq!(triangle.calculate_normal(), Vector3::zeros());
    }
}

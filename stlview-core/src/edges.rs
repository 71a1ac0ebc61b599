/// Outline overlay built from the sharp and open edges of a mesh
use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::geometry::Mesh;

/// Crease angle, in degrees, above which a shared edge is drawn
pub const DEFAULT_THRESHOLD_DEG: f32 = 29.0;

/// Vertex positions are snapped to this many steps per unit before edges
/// are matched, so STL files that repeat vertices with float noise still
/// share their edges.
const WELD_PRECISION: f32 = 1e4;

type VertexKey = (i64, i64, i64);

fn vertex_key(p: &Point3<f32>) -> VertexKey {
    let snap = |c: f32| (c * WELD_PRECISION).round() as i64;
    (snap(p.x), snap(p.y), snap(p.z))
}

/// Line segments drawn on top of a mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeOverlay {
    pub segments: Vec<[Point3<f32>; 2]>,
}

impl EdgeOverlay {
    /// Collect edges whose adjacent faces meet at more than `threshold_deg`,
    /// plus every edge that belongs to a single face.
    pub fn from_mesh(mesh: &Mesh, threshold_deg: f32) -> Self {
        let threshold_dot = threshold_deg.to_radians().cos();
        let mut open: HashMap<(VertexKey, VertexKey), (Vector3<f32>, [Point3<f32>; 2])> =
            HashMap::new();
        let mut segments = Vec::new();

        for triangle in &mesh.triangles {
            let normal = triangle.calculate_normal();
            if normal == Vector3::zeros() {
                continue;
            }

            let keys = triangle.vertices.map(|v| vertex_key(&v.position));
            if keys[0] == keys[1] || keys[1] == keys[2] || keys[2] == keys[0] {
                continue;
            }

            for i in 0..3 {
                let j = (i + 1) % 3;
                let a = triangle.vertices[i].position;
                let b = triangle.vertices[j].position;
                let key = if keys[i] < keys[j] {
                    (keys[i], keys[j])
                } else {
                    (keys[j], keys[i])
                };

                match open.remove(&key) {
                    Some((other_normal, segment)) => {
                        if normal.dot(&other_normal) <= threshold_dot {
                            segments.push(segment);
                        }
                    }
                    None => {
                        open.insert(key, (normal, [a, b]));
                    }
                }
            }
        }

        segments.extend(open.into_values().map(|(_, segment)| segment));
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn translate(&mut self, offset: &Vector3<f32>) {
        for segment in &mut self.segments {
            for p in segment.iter_mut() {
                *p += offset;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Triangle, Vertex};

    #[test]
    fn test_cube_outline_has_twelve_edges() {
        // Face diagonals are coplanar and must be dropped.
        let overlay = EdgeOverlay::from_mesh(&Mesh::cube(2.0), DEFAULT_THRESHOLD_DEG);
        assert_eq!(overlay.segments.len(), 12);
    }

    #[test]
    fn test_single_triangle_is_all_boundary() {
        let mut mesh = Mesh::new();
        mesh.add_triangle(Triangle::new(
            Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            Vertex::new(1.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            Vertex::new(0.0, 1.0, 0.0, 0.0, 0.0, 1.0),
        ));
        let overlay = EdgeOverlay::from_mesh(&mesh, DEFAULT_THRESHOLD_DEG);
        assert_eq!(overlay.segments.len(), 3);
    }

    #[test]
    fn test_shallow_crease_is_hidden() {
        // Two faces folded by ~10 degrees along the x axis.
        let lift = 10f32.to_radians().tan();
        let mut mesh = Mesh::new();
        let v = |x: f32, y: f32, z: f32| Vertex::new(x, y, z, 0.0, 0.0, 0.0);
        mesh.add_triangle(Triangle::new(v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0)));
        mesh.add_triangle(Triangle::new(v(1.0, 0.0, 0.0), v(0.0, 0.0, 0.0), v(0.0, -1.0, lift)));
        let overlay = EdgeOverlay::from_mesh(&mesh, DEFAULT_THRESHOLD_DEG);
        // Shared edge suppressed, four open edges remain.
        assert_eq!(overlay.segments.len(), 4);
    }

    #[test]
    fn test_translate_moves_segments() {
        let mut overlay = EdgeOverlay::from_mesh(&Mesh::cube(2.0), DEFAULT_THRESHOLD_DEG);
        overlay.translate(&Vector3::new(1.0, 1.0, 1.0));
        assert!(overlay
            .segments
            .iter()
            .flatten()
            .all(|p| p.coords.min() >= 0.0 && p.coords.max() <= 2.0));
    }
}

/// Loaded scene: meshes with their materials, outlines, and transforms
use nalgebra::{Matrix4, Vector3};

use crate::bounds::BoundingBox;
use crate::edges::EdgeOverlay;
use crate::geometry::Mesh;
use crate::material::MaterialPreset;
use crate::transform::{RotationState, Transform};

/// One visible model after loading
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub label: String,
    pub mesh: Mesh,
    pub edges: EdgeOverlay,
    pub material: MaterialPreset,
    pub rotation: RotationState,
}

impl SceneObject {
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Transform::rotation_matrix(&self.rotation)
    }

    /// Interleaved `[x, y, z, nx, ny, nz]` per vertex, for triangle drawing.
    ///
    /// Facets stored with a zero normal (common in exported STL) get the
    /// normal computed from their winding.
    pub fn surface_vertices(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.mesh.vertex_count() * 6);
        for triangle in &self.mesh.triangles {
            let face_normal = triangle.calculate_normal();
            for vertex in &triangle.vertices {
                let normal = if vertex.normal.norm_squared() > 0.0 {
                    vertex.normal.normalize()
                } else {
                    face_normal
                };
                out.extend_from_slice(vertex.position.coords.as_slice());
                out.extend_from_slice(normal.as_slice());
            }
        }
        out
    }

    /// Line-list positions of every triangle edge, for wireframe drawing
    pub fn wireframe_vertices(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.mesh.triangles.len() * 18);
        for triangle in &self.mesh.triangles {
            for i in 0..3 {
                let a = triangle.vertices[i].position;
                let b = triangle.vertices[(i + 1) % 3].position;
                out.extend_from_slice(a.coords.as_slice());
                out.extend_from_slice(b.coords.as_slice());
            }
        }
        out
    }

    /// Line-list positions of the edge overlay
    pub fn edge_vertices(&self) -> Vec<f32> {
        self.edges
            .segments
            .iter()
            .flat_map(|[a, b]| [a.x, a.y, a.z, b.x, b.y, b.z])
            .collect()
    }
}

/// Everything produced by one load pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedScene {
    pub objects: Vec<SceneObject>,
    /// Aggregate bounds of the geometry as loaded, before centering
    pub bounds: BoundingBox,
}

impl LoadedScene {
    pub fn center(&self) -> Vector3<f32> {
        self.bounds.center().coords
    }

    pub fn size(&self) -> Vector3<f32> {
        self.bounds.size()
    }

    /// Aggregate bounds of the geometry as it is now
    pub fn current_bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for object in &self.objects {
            bounds.union(&object.mesh.bounding_box());
        }
        bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.objects.iter().map(|o| o.mesh.triangles.len()).sum()
    }
}

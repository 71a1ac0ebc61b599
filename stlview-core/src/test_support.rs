//! In-memory fixtures shared by the unit tests

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::ViewerError;
use crate::geometry::Mesh;
use crate::loader::GeometrySource;

/// Serve files from a map and record every requested path
#[derive(Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
    log: RefCell<Vec<String>>,
}

impl MemorySource {
    pub fn with(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(path.to_string(), bytes);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl GeometrySource for MemorySource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, ViewerError> {
        self.log.borrow_mut().push(path.to_string());
        self.files.get(path).cloned().ok_or_else(|| ViewerError::Fetch {
            path: path.to_string(),
            reason: "HTTP 404".to_string(),
        })
    }
}

pub fn encode_binary_stl(mesh: &Mesh) -> Vec<u8> {
    let mut data = vec![0u8; 80];
    data.extend_from_slice(&(mesh.triangles.len() as u32).to_le_bytes());
    for triangle in &mesh.triangles {
        for c in triangle.vertices[0].normal.iter() {
            data.extend_from_slice(&c.to_le_bytes());
        }
        for vertex in &triangle.vertices {
            for c in vertex.position.coords.iter() {
                data.extend_from_slice(&c.to_le_bytes());
            }
        }
        data.extend_from_slice(&[0, 0]);
    }
    data
}

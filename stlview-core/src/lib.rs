/// STL Viewer Core Library - platform-independent viewer logic
///
/// This library provides everything an STL viewer needs short of a drawing
/// surface: STL parsing, sequential loading and centering, material and
/// camera presets, orbit controls, and the render loop lifecycle.

pub mod bounds;
pub mod controls;
pub mod descriptor;
pub mod edges;
pub mod embed;
pub mod error;
pub mod geometry;
pub mod lifecycle;
pub mod lighting;
pub mod loader;
pub mod material;
pub mod projection;
pub mod scene;
pub mod stl;
pub mod transform;
pub mod variant;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use bounds::BoundingBox;
pub use controls::OrbitControls;
pub use descriptor::{parse_models, ModelDescriptor, ViewerConfig};
pub use error::{StlError, ViewerError};
pub use geometry::{Mesh, Triangle, Vertex};
pub use lifecycle::{ConnectionFlag, FrameDecision, LoopState, RenderLoop};
pub use lighting::Lighting;
pub use loader::{load_models, GeometrySource};
pub use material::{Color, MaterialPreset, RenderStyle, Shading};
pub use projection::{Camera, Projection, ProjectionMode};
pub use scene::{LoadedScene, SceneObject};
pub use transform::{RotationState, Transform};
pub use variant::{VariantKind, ViewerVariant};

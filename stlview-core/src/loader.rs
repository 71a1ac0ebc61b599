/// Sequential model loading and scene centering
use tracing::{debug, info};

use crate::bounds::BoundingBox;
use crate::descriptor::ModelDescriptor;
use crate::edges::{EdgeOverlay, DEFAULT_THRESHOLD_DEG};
use crate::error::ViewerError;
use crate::material::MaterialPreset;
use crate::scene::{LoadedScene, SceneObject};
use crate::stl::parse_stl;
use crate::variant::ViewerVariant;

/// Where model bytes come from: the browser's `fetch`, the filesystem, or
/// memory in tests.
#[allow(async_fn_in_trait)]
pub trait GeometrySource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, ViewerError>;
}

/// Load every visible model in order, then center the whole set on the
/// midpoint of its aggregate bounding box.
///
/// Each fetch completes before the next one starts. The first fetch or
/// parse failure aborts the remaining models and is returned as is.
pub async fn load_models<S: GeometrySource>(
    source: &S,
    models: &[ModelDescriptor],
    variant: &ViewerVariant,
) -> Result<LoadedScene, ViewerError> {
    let mut objects = Vec::with_capacity(models.len());
    let mut bounds = BoundingBox::empty();

    for model in models {
        if model.is_hidden() {
            debug!(path = %model.path, "Skipping hidden model");
            continue;
        }
        let Some(material) = MaterialPreset::select(model.color()?, model.render_style) else {
            continue;
        };

        let url = model.resolved_path();
        let bytes = source.fetch(&url).await?;
        let mesh = parse_stl(&bytes).map_err(|err| ViewerError::Parse {
            path: url.clone(),
            source: err,
        })?;
        let edges = EdgeOverlay::from_mesh(&mesh, DEFAULT_THRESHOLD_DEG);

        let mesh_bounds = mesh.bounding_box();
        bounds.union(&mesh_bounds);
        debug!(
            path = %url,
            triangles = mesh.triangles.len(),
            edges = edges.segments.len(),
            "Loaded model"
        );

        objects.push(SceneObject {
            label: model.label().to_string(),
            mesh,
            edges,
            material,
            rotation: variant.model_rotation(),
        });
    }

    let offset = -bounds.center().coords;
    for object in &mut objects {
        object.mesh.translate(&offset);
        object.edges.translate(&offset);
    }

    let size = bounds.size();
    info!(
        models = objects.len(),
        size_x = size.x,
        size_y = size.y,
        size_z = size.z,
        "Scene loaded and centered"
    );

    Ok(LoadedScene { objects, bounds })
}

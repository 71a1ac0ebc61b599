/// Filesystem geometry source
use std::path::{Path, PathBuf};
use stlview_core::{GeometrySource, ViewerError};
use tracing::debug;

/// Reads model files relative to a root directory, usually the directory
/// holding the viewer file.
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem path for a model URL; query strings are dropped
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl GeometrySource for FsSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, ViewerError> {
        if path.contains("://") {
            return Err(ViewerError::Fetch {
                path: path.to_string(),
                reason: "remote URLs are not supported in the terminal".to_string(),
            });
        }

        let file = self.resolve(path);
        debug!(path = %file.display(), "Reading model");
        std::fs::read(&file).map_err(|err| ViewerError::Fetch {
            path: path.to_string(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_strips_cache_query() {
        let source = FsSource::new("/srv/models");
        assert_eq!(
            source.resolve("./wing.stl?cache=1700000000"),
            PathBuf::from("/srv/models/./wing.stl")
        );
        assert_eq!(source.resolve("/abs/box.stl"), PathBuf::from("/abs/box.stl"));
    }

    #[test]
    fn test_fetch_reads_file() {
        let dir = std::env::temp_dir().join(format!("stlview-source-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("part.stl"), b"solid part\nendsolid part\n").unwrap();

        let source = FsSource::new(&dir);
        let bytes = pollster::block_on(source.fetch("part.stl?cache=1")).unwrap();
        assert!(bytes.starts_with(b"solid part"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_and_remote_files_fail() {
        let source = FsSource::new("/nonexistent");
        assert!(matches!(
            pollster::block_on(source.fetch("missing.stl")),
            Err(ViewerError::Fetch { .. })
        ));
        assert!(matches!(
            pollster::block_on(source.fetch("https://cdn.example/a.stl")),
            Err(ViewerError::Fetch { .. })
        ));
    }
}

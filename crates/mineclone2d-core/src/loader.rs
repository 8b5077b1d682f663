//! Asynchronous atlas and save-file loading.
//!
//! Each load is a single future: read the file, decode on a blocking task,
//! then build the result. A failed load yields an error and nothing else; no
//! retry is attempted.

use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::atlas::{AtlasError, TileAtlas};
use crate::canvas::Canvas;
use crate::png::{decode_png, PngError};

/// Errors from asynchronous loads.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: PngError,
    },

    #[error("invalid atlas {path}: {source}")]
    Atlas {
        path: PathBuf,
        #[source]
        source: AtlasError,
    },

    #[error("decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

async fn read_image(path: &Path) -> Result<Canvas, LoadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("read {} bytes from {}", bytes.len(), path.display());

    tokio::task::spawn_blocking(move || decode_png(&bytes))
        .await?
        .map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Load an atlas image and compute its offsets.
///
/// Resolves only once the atlas is ready to draw from.
pub async fn load_atlas(path: impl AsRef<Path>, tile_size: u32) -> Result<TileAtlas, LoadError> {
    let path = path.as_ref();
    let image = read_image(path).await?;
    TileAtlas::new(image, tile_size).map_err(|source| LoadError::Atlas {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a saved PNG canvas.
pub async fn load_save(path: impl AsRef<Path>) -> Result<Canvas, LoadError> {
    read_image(path.as_ref()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::png::{write_canvas, PngConfig};

    #[tokio::test]
    async fn test_load_atlas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.png");
        write_canvas(&Canvas::new(160, 16, Rgba::rgb(1, 2, 3)), &path, &PngConfig::default()).unwrap();

        let atlas = load_atlas(&path, 16).await.unwrap();
        assert_eq!(atlas.len(), 10);
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_atlas(dir.path().join("nope.png"), 16).await.unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"not a png").unwrap();
        let err = load_save(&path).await.unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_misaligned_atlas_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.png");
        write_canvas(&Canvas::new(20, 16, Rgba::rgb(1, 2, 3)), &path, &PngConfig::default()).unwrap();
        let err = load_atlas(&path, 16).await.unwrap_err();
        assert!(matches!(
            err,
            LoadError::Atlas {
                source: AtlasError::Misaligned { .. },
                ..
            }
        ));
    }
}

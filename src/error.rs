// error.rs — 加载与启动阶段的错误类型

use std::path::PathBuf;

use crate::catalog::ImageId;

/// Everything that can fail while the gallery starts up or pulls assets in.
///
/// The interactive state machines never produce these; they only come from
/// reading files, decoding images and bringing the GPU up.
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("catalog contains duplicate image id {0}")]
    DuplicateId(ImageId),

    #[error("catalog entry {0} has an empty path")]
    EmptyPath(ImageId),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter found")]
    NoAdapter,

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

impl GalleryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GalleryError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        GalleryError::Json {
            path: path.into(),
            source,
        }
    }
}

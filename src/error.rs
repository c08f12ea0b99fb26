use thiserror::Error;

/// Errors raised by the drawing surface
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Cannot export a {width}x{height} surface")]
    Export { width: u32, height: u32 },

    #[error("Failed to encode surface: {0}")]
    Encode(#[from] image::ImageError),
}

/// Errors raised while turning a snapshot back into pixels
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to decode snapshot {id}: {source}")]
    Decode {
        id: uuid::Uuid,
        #[source]
        source: image::ImageError,
    },

    #[error("Snapshot {id} decoded to {actual:?}, expected {expected:?}")]
    DimensionMismatch {
        id: uuid::Uuid,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Errors raised while handing exported bytes to the user
#[derive(Debug, Error)]
pub enum ExportSinkError {
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Browser download failed: {0}")]
    Browser(String),
}

/// Errors that can occur while saving the artwork
#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Sink(#[from] ExportSinkError),

    #[error("A restore is still in progress")]
    RestorePending,
}

/// Errors that can occur while loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;
pub type SnapshotResult<T> = Result<T, SnapshotError>;

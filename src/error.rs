use thiserror::Error;

/// Errors raised while encoding or decoding snapshot payloads
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Not an image data URL")]
    NotAnImagePayload,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to encode or decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors from the local fallback store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by a host-side bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Bridge rejected the call: {0}")]
    Rejected(String),

    #[error("Invalid snapshot payload: {0}")]
    Payload(#[from] SnapshotError),

    #[error("Bridge I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors while loading the board configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by board operations that have an observable result
#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Failed to write download: {0}")]
    Download(#[from] std::io::Error),
}

pub type BoardResult<T> = Result<T, BoardError>;
pub type StoreResult<T> = Result<T, StoreError>;
pub type BridgeResult<T> = Result<T, BridgeError>;

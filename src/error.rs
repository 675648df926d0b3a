use crate::network::NodeHandle;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("code too short: expected {expected} bytes, got {actual}")]
    CodeTooShort { expected: usize, actual: usize },

    #[error("unsupported code version: {0:#x}")]
    UnsupportedCodeVersion(u8),

    #[error("unexpected code kind: {0:#x}")]
    UnexpectedCodeKind(u8),

    #[error("environment has no markers")]
    EmptyEnvironment,

    #[error("too many markers: {0}")]
    TooManyMarkers(usize),

    #[error("device network is down")]
    NetworkDown,

    #[error("node {0} not found")]
    NodeNotFound(NodeHandle),

    #[error("node {0} is busy")]
    NodeBusy(NodeHandle),

    #[error("node {0} does not support tracking tasks")]
    TaskUnsupported(NodeHandle),

    #[error("task start refused by node {0}")]
    TaskRefused(NodeHandle),
}

pub type Result<T> = std::result::Result<T, Error>;

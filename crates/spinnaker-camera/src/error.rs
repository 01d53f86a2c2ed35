use nodemap_core::NodeError;
use thiserror::Error;

/// Error type produced by camera control operations.
///
/// Every registry failure is reported upwards unchanged in category; the
/// controller never retries and never rolls back earlier writes.
#[derive(Debug, Error)]
pub enum CameraError {
    /// The registry does not declare the requested property.
    #[error("invalid handle: property '{0}' not found")]
    InvalidHandle(String),
    /// The connected model cannot perform the operation (property missing a
    /// required access right, unavailable, or of an unexpected type).
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    /// Value beyond the device or mode limits.
    #[error("out of range: {0}")]
    OutOfRange(String),
    /// Registry communication failure.
    #[error("device: {0}")]
    Device(String),
    /// Configuration snapshot rejected before touching the device.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CameraError {
    pub(crate) fn unsupported<S: Into<String>>(msg: S) -> Self {
        CameraError::Unsupported(msg.into())
    }

    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        CameraError::InvalidConfig(msg.into())
    }
}

impl From<NodeError> for CameraError {
    fn from(err: NodeError) -> Self {
        match err {
            NodeError::NotFound(name) => CameraError::InvalidHandle(name),
            NodeError::Type(name) => CameraError::Unsupported(format!("{name} has an unexpected type")),
            NodeError::Access(name) => CameraError::Unsupported(format!("{name} access denied")),
            NodeError::Unavailable(name) => CameraError::Unsupported(format!("{name} is not available")),
            NodeError::Range(detail) => CameraError::OutOfRange(detail),
            NodeError::Io(msg) => CameraError::Device(msg),
        }
    }
}

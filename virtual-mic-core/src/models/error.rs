use thiserror::Error;

/// Errors produced by the virtual microphone core.
///
/// Every command handler reports failure through this enum; the dispatch
/// layer folds it into a wire [`Status`](super::status::Status).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid buffer size: need at least {required} bytes, got {actual}")]
    InvalidBufferSize { required: usize, actual: usize },

    #[error("device not ready")]
    DeviceNotReady,

    #[error("ring store saturated")]
    BufferSaturated,

    #[error("unsupported command code: {0:#010x}")]
    UnsupportedCommand(u32),

    #[error("insufficient resources: {0}")]
    InsufficientResources(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),
}

impl DeviceError {
    /// Caller-input errors are detected before any state is touched.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter(_) | Self::InvalidBufferSize { .. } | Self::UnsupportedCommand(_)
        )
    }
}

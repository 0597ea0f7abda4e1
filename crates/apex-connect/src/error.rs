//! Error types for the apex-connect crate

use apex_core_interface::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("gRPC status error: {0}")]
    Status(#[from] tonic::Status),

    #[error("Invalid session metadata: {0}")]
    InvalidMetadata(#[from] tonic::metadata::errors::InvalidMetadataValue),

    #[error("Invalid gateway endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Connection to gateway {endpoint} failed: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Handshake failed: {0}")]
    HandshakeFailed(String),
}

impl ConnectError {
    /// Attribute this failure to a forwarded engine operation
    pub fn into_engine_error(self, operation: &'static str) -> EngineError {
        EngineError::remote(operation, self.to_string())
    }
}

impl From<ConnectError> for EngineError {
    fn from(err: ConnectError) -> Self {
        err.into_engine_error("connect")
    }
}

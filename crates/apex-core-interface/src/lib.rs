//! Apex Core Interface: the remote streaming-context contract
//!
//! This crate defines the two traits the control layer talks to. Everything a
//! streaming application actually does (reading input, building the DAG,
//! running it) happens inside an external engine; these traits only describe
//! the calls that can be forwarded to it.
//!
//! # Architecture
//!
//! - **EngineEntryPoint**: creates a new remote streaming-application context
//!   by name. The gRPC gateway adapter lives in `apex-connect`.
//! - **StreamingContext**: one remote application context. Configuration
//!   (`from_folder`, `print_stream`), launch, and kill.
//!
//! # Example
//!
//! ```rust,no_run
//! use apex_core_interface::{EngineEntryPoint, StreamingContext};
//!
//! async fn run<E: EngineEntryPoint>(engine: &E) -> apex_core_interface::Result<String> {
//!     let context = engine.new_streaming_app("wordcount").await?;
//!     context.from_folder("/data/in").await?;
//!     context.print_stream().await?;
//!     context.launch_dag().await
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The remote call reached the engine (or tried to) and failed
    #[error("Remote invocation of {operation} failed: {reason}")]
    RemoteInvocation {
        operation: &'static str,
        reason: String,
    },

    /// The engine replied but the reply violated the contract
    #[error("Invalid reply to {operation}: {reason}")]
    InvalidReply {
        operation: &'static str,
        reason: String,
    },
}

impl EngineError {
    pub fn remote(operation: &'static str, reason: impl Into<String>) -> Self {
        EngineError::RemoteInvocation {
            operation,
            reason: reason.into(),
        }
    }

    /// Name of the forwarded operation that failed
    pub fn operation(&self) -> &'static str {
        match self {
            EngineError::RemoteInvocation { operation, .. }
            | EngineError::InvalidReply { operation, .. } => operation,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// One streaming-application context living inside the remote engine.
///
/// Implementations are proxies: they perform no local validation and simply
/// forward each call. Every method is a full round-trip to the engine.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so a handle wrapping them
/// can be shared across tasks.
#[async_trait]
pub trait StreamingContext: Send + Sync + 'static {
    /// Configure the application to read its input from a folder.
    ///
    /// The path is interpreted by the engine, not locally.
    async fn from_folder(&self, input_dir: &str) -> Result<()>;

    /// Ask the engine to print the stream output.
    async fn print_stream(&self) -> Result<()>;

    /// Build and launch the DAG.
    ///
    /// # Returns
    ///
    /// The engine-assigned application identifier.
    async fn launch_dag(&self) -> Result<String>;

    /// Terminate the running application.
    async fn kill(&self) -> Result<()>;
}

/// The engine entry point: the only operation reachable without a context.
#[async_trait]
pub trait EngineEntryPoint: Send + Sync + 'static {
    /// Create a new remote streaming-application context called `name`.
    async fn new_streaming_app(&self, name: &str) -> Result<Box<dyn StreamingContext>>;
}

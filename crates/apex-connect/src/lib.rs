//! Apex Connect: client-side gRPC connectivity to the engine gateway
//!
//! The gateway bridges to the external stream-processing engine. This crate
//! adapts it to the traits in `apex-core-interface`, so the control layer
//! never sees the transport.
//!
//! # Architecture
//!
//! - **RemoteEngine**: implements `EngineEntryPoint`; owns the channel and the
//!   handshake session
//! - **RemoteContext**: implements `StreamingContext` by forwarding each call
//!   to one gateway-side context
//!
//! # Example
//!
//! ```rust,no_run
//! use apex_connect::{ConnectOptions, RemoteEngine};
//! use apex_core_interface::EngineEntryPoint;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let engine = RemoteEngine::connect("http://10.0.0.5:25333", ConnectOptions::default()).await?;
//!     let context = engine.new_streaming_app("wordcount").await?;
//!     context.from_folder("/data/in").await?;
//!     context.print_stream().await?;
//!     let app_id = context.launch_dag().await?;
//!     println!("launched {}", app_id);
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::RemoteContext;
pub use engine::{ConnectOptions, RemoteEngine};
pub use error::ConnectError;

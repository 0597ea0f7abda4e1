/*!
 * Apex Control - launch, track, and kill streaming applications
 *
 * A thin control surface over an external stream-processing engine:
 * - Remote contexts are created through an engine entry point
 *   (`apex-core-interface`), reached over gRPC (`apex-connect`)
 * - `StreamingApp` forwards configuration and lifecycle calls
 * - `AppRegistry` finds and kills applications by their engine-assigned id
 */

pub mod app;
pub mod cli_style;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod session;
pub mod shell;

// Re-export commonly used types
pub use app::{AppPhase, StreamingApp};
pub use config::{GatewayConfig, LogLevel};
pub use error::{ApexError, Result};
pub use registry::AppRegistry;
pub use session::ApexSession;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

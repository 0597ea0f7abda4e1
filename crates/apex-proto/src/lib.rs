/// Protocol definitions for the Apex engine gateway.
///
/// The gateway exposes one unary service, `apex.gateway.v1.EngineGateway`.
/// Messages are plain prost structs; the client is a thin wrapper over
/// `tonic::client::Grpc` so the crate builds without `protoc`.
mod client;
mod messages;

pub use client::EngineGatewayClient;
pub use messages::*;

/// Metadata key carrying the session id on every post-handshake request
pub const SESSION_METADATA_KEY: &str = "x-apex-session";

//! Request and response messages of `apex.gateway.v1`.

/// Empty acknowledgement for calls that return nothing
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Ack {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HandshakeRequest {
    #[prost(string, tag = "1")]
    pub client_version: String,
    /// Shared secret, empty when the gateway runs unauthenticated
    #[prost(string, tag = "2")]
    pub token: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HandshakeResponse {
    #[prost(bool, tag = "1")]
    pub accepted: bool,
    #[prost(string, tag = "2")]
    pub session_id: String,
    #[prost(string, tag = "3")]
    pub engine_version: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NewStreamingAppRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NewStreamingAppResponse {
    /// Gateway-side handle of the created context
    #[prost(string, tag = "1")]
    pub context_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FromFolderRequest {
    #[prost(string, tag = "1")]
    pub context_id: String,
    #[prost(string, tag = "2")]
    pub folder: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PrintStreamRequest {
    #[prost(string, tag = "1")]
    pub context_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LaunchDagRequest {
    #[prost(string, tag = "1")]
    pub context_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LaunchDagResponse {
    #[prost(string, tag = "1")]
    pub app_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KillRequest {
    #[prost(string, tag = "1")]
    pub context_id: String,
}

//! Unary gRPC client for the engine gateway service.

use crate::messages::{
    Ack, FromFolderRequest, HandshakeRequest, HandshakeResponse, KillRequest, LaunchDagRequest,
    LaunchDagResponse, NewStreamingAppRequest, NewStreamingAppResponse, PrintStreamRequest,
};
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;
use tonic::{IntoRequest, Request, Response, Status};

/// Client for `apex.gateway.v1.EngineGateway`.
///
/// Cheap to clone: the underlying `Channel` is reference counted.
#[derive(Debug, Clone)]
pub struct EngineGatewayClient {
    inner: tonic::client::Grpc<Channel>,
}

impl EngineGatewayClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    async fn unary<Req, Resp>(
        &mut self,
        request: Request<Req>,
        path: &'static str,
    ) -> Result<Response<Resp>, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unknown(format!("Service was not ready: {}", e)))?;
        let codec: tonic_prost::ProstCodec<Req, Resp> = tonic_prost::ProstCodec::default();
        self.inner
            .unary(request, PathAndQuery::from_static(path), codec)
            .await
    }

    pub async fn handshake(
        &mut self,
        request: impl IntoRequest<HandshakeRequest>,
    ) -> Result<Response<HandshakeResponse>, Status> {
        self.unary(
            request.into_request(),
            "/apex.gateway.v1.EngineGateway/Handshake",
        )
        .await
    }

    pub async fn new_streaming_app(
        &mut self,
        request: impl IntoRequest<NewStreamingAppRequest>,
    ) -> Result<Response<NewStreamingAppResponse>, Status> {
        self.unary(
            request.into_request(),
            "/apex.gateway.v1.EngineGateway/NewStreamingApp",
        )
        .await
    }

    pub async fn from_folder(
        &mut self,
        request: impl IntoRequest<FromFolderRequest>,
    ) -> Result<Response<Ack>, Status> {
        self.unary(
            request.into_request(),
            "/apex.gateway.v1.EngineGateway/FromFolder",
        )
        .await
    }

    pub async fn print_stream(
        &mut self,
        request: impl IntoRequest<PrintStreamRequest>,
    ) -> Result<Response<Ack>, Status> {
        self.unary(
            request.into_request(),
            "/apex.gateway.v1.EngineGateway/PrintStream",
        )
        .await
    }

    pub async fn launch_dag(
        &mut self,
        request: impl IntoRequest<LaunchDagRequest>,
    ) -> Result<Response<LaunchDagResponse>, Status> {
        self.unary(
            request.into_request(),
            "/apex.gateway.v1.EngineGateway/LaunchDag",
        )
        .await
    }

    pub async fn kill(
        &mut self,
        request: impl IntoRequest<KillRequest>,
    ) -> Result<Response<Ack>, Status> {
        self.unary(request.into_request(), "/apex.gateway.v1.EngineGateway/Kill")
            .await
    }
}

//! RemoteEngine: the engine entry point reached through the gRPC gateway

use crate::context::{require_id, RemoteContext};
use crate::error::ConnectError;
use apex_core_interface::{EngineEntryPoint, Result, StreamingContext};
use apex_proto::{
    EngineGatewayClient, HandshakeRequest, HandshakeResponse, NewStreamingAppRequest,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info};

/// Connection settings for the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Shared secret sent in the handshake (None = unauthenticated gateway)
    pub token: Option<String>,

    /// Maximum time to establish the TCP/HTTP2 connection
    pub connect_timeout: Duration,

    /// Deadline applied to every RPC
    pub request_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Engine entry point that creates contexts on a remote gateway.
///
/// One `RemoteEngine` holds one channel and one session. Every context it
/// creates shares both.
///
/// # Example
///
/// ```rust,no_run
/// use apex_connect::{ConnectOptions, RemoteEngine};
/// use apex_core_interface::EngineEntryPoint;
///
/// # async fn example() -> anyhow::Result<()> {
/// let engine = RemoteEngine::connect("http://127.0.0.1:25333", ConnectOptions::default()).await?;
/// let context = engine.new_streaming_app("wordcount").await?;
/// context.from_folder("/data/in").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RemoteEngine {
    client: EngineGatewayClient,
    session_id: Arc<str>,
    engine_version: String,
}

impl RemoteEngine {
    /// Connect to the gateway at `endpoint` and perform the handshake.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the endpoint is not a valid URI
    /// - the network connection fails
    /// - the gateway rejects the handshake
    pub async fn connect(
        endpoint: &str,
        options: ConnectOptions,
    ) -> std::result::Result<Self, ConnectError> {
        debug!("Connecting to gateway at {}", endpoint);

        let channel = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| ConnectError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .connect()
            .await
            .map_err(|e| ConnectError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let engine = Self::handshake(channel, &options).await?;
        info!(
            endpoint,
            engine_version = %engine.engine_version,
            "Gateway started"
        );
        Ok(engine)
    }

    async fn handshake(
        channel: Channel,
        options: &ConnectOptions,
    ) -> std::result::Result<Self, ConnectError> {
        let mut client = EngineGatewayClient::new(channel);

        let request = HandshakeRequest {
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            token: options.token.clone().unwrap_or_default(),
        };

        let response = client
            .handshake(request)
            .await
            .map_err(|e| ConnectError::HandshakeFailed(format!("gRPC error: {}", e)))?
            .into_inner();
        let response = accept_handshake(response)?;

        debug!("Handshake accepted (session: {})", response.session_id);

        Ok(Self {
            client,
            session_id: Arc::from(response.session_id),
            engine_version: response.engine_version,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Version string reported by the gateway during the handshake
    pub fn engine_version(&self) -> &str {
        &self.engine_version
    }
}

/// Check the gateway accepted the handshake and opened a session
fn accept_handshake(
    response: HandshakeResponse,
) -> std::result::Result<HandshakeResponse, ConnectError> {
    if !response.accepted {
        return Err(ConnectError::HandshakeFailed(
            "Gateway rejected handshake".to_string(),
        ));
    }
    if response.session_id.is_empty() {
        return Err(ConnectError::HandshakeFailed(
            "Gateway returned an empty session id".to_string(),
        ));
    }
    Ok(response)
}

#[async_trait]
impl EngineEntryPoint for RemoteEngine {
    async fn new_streaming_app(&self, name: &str) -> Result<Box<dyn StreamingContext>> {
        const OP: &str = "new_streaming_app";

        let request = crate::context::with_session(
            &self.session_id,
            NewStreamingAppRequest {
                name: name.to_string(),
            },
        )
        .map_err(|e| e.into_engine_error(OP))?;

        let context_id = self
            .client
            .clone()
            .new_streaming_app(request)
            .await
            .map_err(|e| ConnectError::from(e).into_engine_error(OP))?
            .into_inner()
            .context_id;
        let context_id = require_id(OP, "context id", context_id)?;

        debug!("Created remote context {} for {}", context_id, name);

        Ok(Box::new(RemoteContext::new(
            self.client.clone(),
            self.session_id.clone(),
            context_id,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ConnectOptions::default();
        assert_eq!(options.token, None);
        assert_eq!(options.connect_timeout, Duration::from_secs(10));
        assert_eq!(options.request_timeout, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_rejected() {
        let result = RemoteEngine::connect("not a uri", ConnectOptions::default()).await;
        assert!(matches!(result, Err(ConnectError::InvalidEndpoint { .. })));
    }

    fn handshake_reply(accepted: bool, session_id: &str) -> HandshakeResponse {
        HandshakeResponse {
            accepted,
            session_id: session_id.to_string(),
            engine_version: "3.7.0".to_string(),
        }
    }

    #[test]
    fn test_rejected_handshake_fails() {
        let result = accept_handshake(handshake_reply(false, "session-1"));
        assert!(
            matches!(result, Err(ConnectError::HandshakeFailed(ref msg)) if msg.contains("rejected"))
        );
    }

    #[test]
    fn test_handshake_without_session_fails() {
        let result = accept_handshake(handshake_reply(true, ""));
        assert!(matches!(result, Err(ConnectError::HandshakeFailed(_))));
    }

    #[test]
    fn test_accepted_handshake_passes_through() {
        let response = accept_handshake(handshake_reply(true, "session-1")).unwrap();
        assert_eq!(response.session_id, "session-1");
        assert_eq!(response.engine_version, "3.7.0");
    }

    #[test]
    fn test_empty_context_id_is_invalid_reply() {
        let err = require_id("new_streaming_app", "context id", String::new()).unwrap_err();
        assert_eq!(err.operation(), "new_streaming_app");
        assert!(err.to_string().contains("empty context id"));
    }
}

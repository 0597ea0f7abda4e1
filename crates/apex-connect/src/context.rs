//! RemoteContext: StreamingContext implementation that proxies to the gateway

use crate::error::ConnectError;
use apex_core_interface::{EngineError, Result, StreamingContext};
use apex_proto::{
    EngineGatewayClient, FromFolderRequest, KillRequest, LaunchDagRequest, PrintStreamRequest,
    SESSION_METADATA_KEY,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Wrap a message in a request carrying the session id
pub(crate) fn with_session<T>(
    session_id: &str,
    message: T,
) -> std::result::Result<tonic::Request<T>, ConnectError> {
    let mut request = tonic::Request::new(message);
    request
        .metadata_mut()
        .insert(SESSION_METADATA_KEY, session_id.parse()?);
    Ok(request)
}

/// A streaming-application context that lives on the gateway.
///
/// Cheaply cloneable; the gRPC channel is shared with the engine that
/// created it.
#[derive(Clone)]
pub struct RemoteContext {
    client: EngineGatewayClient,
    session_id: Arc<str>,
    context_id: String,
}

impl RemoteContext {
    /// Wrap an already-created gateway context.
    ///
    /// Normally obtained from `RemoteEngine::new_streaming_app`.
    pub fn new(client: EngineGatewayClient, session_id: Arc<str>, context_id: String) -> Self {
        Self {
            client,
            session_id,
            context_id,
        }
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    fn request<T>(&self, operation: &'static str, message: T) -> Result<tonic::Request<T>> {
        with_session(&self.session_id, message).map_err(|e| e.into_engine_error(operation))
    }
}

/// Reject an empty identifier in a gateway reply
pub(crate) fn require_id(
    operation: &'static str,
    what: &str,
    value: String,
) -> Result<String> {
    if value.is_empty() {
        return Err(EngineError::InvalidReply {
            operation,
            reason: format!("gateway returned an empty {}", what),
        });
    }
    Ok(value)
}

fn status_error(operation: &'static str) -> impl FnOnce(tonic::Status) -> EngineError {
    move |status| ConnectError::from(status).into_engine_error(operation)
}

#[async_trait]
impl StreamingContext for RemoteContext {
    async fn from_folder(&self, input_dir: &str) -> Result<()> {
        debug!("Context {}: from_folder {}", self.context_id, input_dir);

        let request = self.request(
            "from_folder",
            FromFolderRequest {
                context_id: self.context_id.clone(),
                folder: input_dir.to_string(),
            },
        )?;

        self.client
            .clone()
            .from_folder(request)
            .await
            .map_err(status_error("from_folder"))?;
        Ok(())
    }

    async fn print_stream(&self) -> Result<()> {
        debug!("Context {}: print_stream", self.context_id);

        let request = self.request(
            "print_stream",
            PrintStreamRequest {
                context_id: self.context_id.clone(),
            },
        )?;

        self.client
            .clone()
            .print_stream(request)
            .await
            .map_err(status_error("print_stream"))?;
        Ok(())
    }

    async fn launch_dag(&self) -> Result<String> {
        debug!("Context {}: launch_dag", self.context_id);

        let request = self.request(
            "launch_dag",
            LaunchDagRequest {
                context_id: self.context_id.clone(),
            },
        )?;

        let app_id = self
            .client
            .clone()
            .launch_dag(request)
            .await
            .map_err(status_error("launch_dag"))?
            .into_inner()
            .app_id;

        require_id("launch_dag", "application id", app_id)
    }

    async fn kill(&self) -> Result<()> {
        debug!("Context {}: kill", self.context_id);

        let request = self.request(
            "kill",
            KillRequest {
                context_id: self.context_id.clone(),
            },
        )?;

        self.client
            .clone()
            .kill(request)
            .await
            .map_err(status_error("kill"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_context_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RemoteContext>();
    }

    #[test]
    fn test_session_metadata_is_attached() {
        let request = with_session("session-abc123", ()).unwrap();
        let value = request.metadata().get(SESSION_METADATA_KEY).unwrap();
        assert_eq!(value.to_str().unwrap(), "session-abc123");
    }

    #[test]
    fn test_empty_app_id_is_invalid_reply() {
        let err = require_id("launch_dag", "application id", String::new()).unwrap_err();
        assert_eq!(err.operation(), "launch_dag");
        assert!(matches!(err, EngineError::InvalidReply { .. }));
        assert!(err.to_string().contains("empty application id"));
    }

    #[test]
    fn test_non_empty_id_passes_through() {
        let id = require_id("launch_dag", "application id", "APP-42".to_string()).unwrap();
        assert_eq!(id, "APP-42");
    }

    #[test]
    fn test_unprintable_session_id_is_rejected() {
        let result = with_session("bad\nsession", ());
        assert!(matches!(result, Err(ConnectError::InvalidMetadata(_))));
    }
}

/*!
 * Control session: one engine entry point plus the registry of its apps
 */

use apex_connect::RemoteEngine;
use apex_core_interface::EngineEntryPoint;
use std::sync::Arc;
use tracing::info;

use crate::app::StreamingApp;
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::registry::AppRegistry;

/// Owns the engine connection and the application registry.
///
/// Construct one per process and pass it by reference to callers.
///
/// # Example
///
/// ```rust,no_run
/// use apex_control::{ApexSession, GatewayConfig};
///
/// # async fn example() -> apex_control::Result<()> {
/// let session = ApexSession::connect(&GatewayConfig::default()).await?;
///
/// let app = session.new_app("wordcount").await?;
/// app.from_folder("/data/in").await?.print_stream().await?;
/// let app_id = app.launch_dag().await?.to_string();
///
/// session.kill_app(&app_id).await?;
/// # Ok(())
/// # }
/// ```
pub struct ApexSession {
    entry_point: Arc<dyn EngineEntryPoint>,
    registry: AppRegistry,
}

impl ApexSession {
    /// Session over any entry point (tests pass an in-memory engine)
    pub fn new(entry_point: Arc<dyn EngineEntryPoint>) -> Self {
        Self {
            entry_point,
            registry: AppRegistry::new(),
        }
    }

    /// Connect to the gateway described by `config`
    pub async fn connect(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;
        let engine = RemoteEngine::connect(&config.endpoint, config.to_connect_options()).await?;
        info!(
            "Session {} opened on {}",
            engine.session_id(),
            config.endpoint
        );
        Ok(Self::new(Arc::new(engine)))
    }

    pub fn registry(&self) -> &AppRegistry {
        &self.registry
    }

    /// Create and register a new streaming application
    pub async fn new_app(&self, name: &str) -> Result<Arc<StreamingApp>> {
        StreamingApp::create(self.entry_point.as_ref(), &self.registry, name).await
    }

    pub async fn get_app(&self, app_id: &str) -> Option<Arc<StreamingApp>> {
        self.registry.find_by_app_id(app_id).await
    }

    pub async fn kill_app(&self, app_id: &str) -> Result<()> {
        self.registry.kill_by_app_id(app_id).await
    }
}

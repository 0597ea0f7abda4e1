/*!
 * Streaming application handles
 */

use apex_core_interface::{EngineEntryPoint, StreamingContext};
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{ApexError, Result};
use crate::registry::AppRegistry;

/// Lifecycle phase of a streaming application. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    /// Remote context exists; configuration calls are accepted
    Created,
    /// DAG launched; the application id is known
    Launched,
    /// Terminated; every further operation is rejected
    Killed,
}

impl fmt::Display for AppPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppPhase::Created => write!(f, "created"),
            AppPhase::Launched => write!(f, "launched"),
            AppPhase::Killed => write!(f, "killed"),
        }
    }
}

/// Local proxy for one streaming application running in the remote engine.
///
/// Remote calls on one handle are serialised by the operation lock, which is
/// held for the whole round-trip. The phase and the application id are only
/// written while that lock is held, and can be read at any time without
/// waiting for a call in flight.
pub struct StreamingApp {
    name: String,
    context: Box<dyn StreamingContext>,
    ops: Mutex<()>,
    phase: RwLock<AppPhase>,
    app_id: OnceLock<String>,
}

impl StreamingApp {
    /// Create a remote context called `name` and register the handle.
    ///
    /// # Errors
    ///
    /// Only a propagated remote error; nothing is registered in that case.
    pub async fn create(
        entry_point: &dyn EngineEntryPoint,
        registry: &AppRegistry,
        name: &str,
    ) -> Result<Arc<Self>> {
        let context = entry_point.new_streaming_app(name).await?;
        let app = Arc::new(Self::with_context(name, context));
        registry.register(Arc::clone(&app)).await;
        debug!("Created streaming application {}", name);
        Ok(app)
    }

    /// Wrap an existing context without registering it
    pub fn with_context(name: impl Into<String>, context: Box<dyn StreamingContext>) -> Self {
        Self {
            name: name.into(),
            context,
            ops: Mutex::new(()),
            phase: RwLock::new(AppPhase::Created),
            app_id: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current phase. Never waits on a remote call.
    pub fn phase(&self) -> AppPhase {
        *self.phase.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: AppPhase) {
        *self.phase.write().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    /// The engine-assigned id.
    ///
    /// Fails with `UninitializedState` until `launch_dag` has succeeded.
    pub fn app_id(&self) -> Result<&str> {
        self.app_id
            .get()
            .map(String::as_str)
            .ok_or_else(|| ApexError::UninitializedState {
                name: self.name.clone(),
            })
    }

    pub(crate) fn launched_id(&self) -> Option<&str> {
        self.app_id.get().map(String::as_str)
    }

    /// Error for configuration or launch calls outside `Created`
    fn not_configurable(&self, phase: AppPhase) -> ApexError {
        match phase {
            AppPhase::Killed => ApexError::Terminated {
                name: self.name.clone(),
            },
            _ => ApexError::AlreadyLaunched {
                name: self.name.clone(),
                app_id: self.app_id.get().cloned().unwrap_or_default(),
            },
        }
    }

    /// Caller must hold the operation lock
    fn require_created(&self, operation: &str) -> Result<()> {
        let phase = self.phase();
        if phase != AppPhase::Created {
            warn!("{}: {} rejected in phase {}", self.name, operation, phase);
            return Err(self.not_configurable(phase));
        }
        Ok(())
    }

    /// Read input from `input_dir` (resolved by the engine)
    pub async fn from_folder(&self, input_dir: &str) -> Result<&Self> {
        let _op = self.ops.lock().await;
        self.require_created("from_folder")?;
        self.context.from_folder(input_dir).await?;
        Ok(self)
    }

    /// Print the stream output inside the engine
    pub async fn print_stream(&self) -> Result<&Self> {
        let _op = self.ops.lock().await;
        self.require_created("print_stream")?;
        self.context.print_stream().await?;
        Ok(self)
    }

    /// Launch the DAG and record the returned id.
    ///
    /// A failed launch leaves the application in `Created`.
    pub async fn launch_dag(&self) -> Result<&str> {
        let _op = self.ops.lock().await;
        self.require_created("launch_dag")?;

        let id = self.context.launch_dag().await?;
        let id = self.app_id.get_or_init(|| id).as_str();
        self.set_phase(AppPhase::Launched);

        info!(app = %self.name, "AppID: {} started.", id);
        Ok(id)
    }

    /// Terminate the remote application.
    ///
    /// The handle stays registered in the `Killed` phase.
    pub async fn kill(&self) -> Result<()> {
        let _op = self.ops.lock().await;
        match self.phase() {
            AppPhase::Created => Err(ApexError::UninitializedState {
                name: self.name.clone(),
            }),
            AppPhase::Killed => Err(ApexError::Terminated {
                name: self.name.clone(),
            }),
            AppPhase::Launched => self.kill_locked().await,
        }
    }

    /// Kill only if currently launched, checking and killing under one lock.
    ///
    /// Returns whether a kill was sent.
    pub(crate) async fn kill_if_launched(&self) -> Result<bool> {
        let _op = self.ops.lock().await;
        if self.phase() != AppPhase::Launched {
            return Ok(false);
        }
        self.kill_locked().await?;
        Ok(true)
    }

    async fn kill_locked(&self) -> Result<()> {
        self.context.kill().await?;
        self.set_phase(AppPhase::Killed);
        let id = self.app_id.get().map_or("", String::as_str);
        info!(app = %self.name, "AppID: {} killed.", id);
        Ok(())
    }
}

impl fmt::Debug for StreamingApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingApp")
            .field("name", &self.name)
            .field("phase", &self.phase())
            .field("app_id", &self.app_id.get())
            .finish_non_exhaustive()
    }
}

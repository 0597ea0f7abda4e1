//! In-memory engine that records every forwarded call.

use crate::{EngineEntryPoint, EngineError, Result, StreamingContext};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A call received by a [`MockContext`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextCall {
    FromFolder(String),
    PrintStream,
    LaunchDag,
    Kill,
}

#[derive(Default)]
struct EngineState {
    launches: u32,
    scripted_ids: VecDeque<String>,
    fail_create: bool,
    fail_launch: bool,
    fail_kill: bool,
    contexts: Vec<MockContext>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Engine entry point backed by memory.
///
/// Launches return scripted ids first, then YARN-style
/// `application_0000000000000_NNNN` ids.
#[derive(Clone, Default)]
pub struct MockEngine {
    state: Arc<Mutex<EngineState>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue identifiers returned by the next launches, in order
    pub fn with_app_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.state)
            .scripted_ids
            .extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn fail_creation(&self, fail: bool) {
        lock(&self.state).fail_create = fail;
    }

    pub fn fail_launches(&self, fail: bool) {
        lock(&self.state).fail_launch = fail;
    }

    pub fn fail_kills(&self, fail: bool) {
        lock(&self.state).fail_kill = fail;
    }

    /// Every context created so far, in creation order
    pub fn contexts(&self) -> Vec<MockContext> {
        lock(&self.state).contexts.clone()
    }

    fn next_app_id(&self) -> Result<String> {
        let mut state = lock(&self.state);
        if state.fail_launch {
            return Err(EngineError::remote("launch_dag", "engine rejected launch"));
        }
        state.launches += 1;
        let id = match state.scripted_ids.pop_front() {
            Some(id) => id,
            None => format!("application_0000000000000_{:04}", state.launches),
        };
        Ok(id)
    }
}

#[async_trait]
impl EngineEntryPoint for MockEngine {
    async fn new_streaming_app(&self, name: &str) -> Result<Box<dyn StreamingContext>> {
        let context = {
            let mut state = lock(&self.state);
            if state.fail_create {
                return Err(EngineError::remote(
                    "new_streaming_app",
                    "gateway unavailable",
                ));
            }
            let context = MockContext {
                name: name.to_string(),
                engine: self.clone(),
                calls: Arc::new(Mutex::new(Vec::new())),
            };
            state.contexts.push(context.clone());
            context
        };
        Ok(Box::new(context))
    }
}

/// Context created by [`MockEngine`]; clones share the call log
#[derive(Clone)]
pub struct MockContext {
    name: String,
    engine: MockEngine,
    calls: Arc<Mutex<Vec<ContextCall>>>,
}

impl MockContext {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn calls(&self) -> Vec<ContextCall> {
        lock(&self.calls).clone()
    }

    pub fn count(&self, call: &ContextCall) -> usize {
        lock(&self.calls).iter().filter(|c| *c == call).count()
    }

    pub fn kill_count(&self) -> usize {
        self.count(&ContextCall::Kill)
    }

    fn record(&self, call: ContextCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl StreamingContext for MockContext {
    async fn from_folder(&self, input_dir: &str) -> Result<()> {
        self.record(ContextCall::FromFolder(input_dir.to_string()));
        Ok(())
    }

    async fn print_stream(&self) -> Result<()> {
        self.record(ContextCall::PrintStream);
        Ok(())
    }

    async fn launch_dag(&self) -> Result<String> {
        self.record(ContextCall::LaunchDag);
        self.engine.next_app_id()
    }

    async fn kill(&self) -> Result<()> {
        self.record(ContextCall::Kill);
        if lock(&self.engine.state).fail_kill {
            return Err(EngineError::remote("kill", "application already finished"));
        }
        Ok(())
    }
}

/*!
 * Registry of streaming application handles
 */

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::app::{AppPhase, StreamingApp};
use crate::error::{ApexError, Result};

/// Insertion-ordered list of every application created in a session.
///
/// Entries are never removed implicitly: a killed application stays
/// findable in its terminal phase until [`AppRegistry::remove_killed`] is
/// called. Clones share the same list.
#[derive(Clone, Default)]
pub struct AppRegistry {
    apps: Arc<RwLock<Vec<Arc<StreamingApp>>>>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handle. Called by [`StreamingApp::create`].
    pub async fn register(&self, app: Arc<StreamingApp>) {
        let mut apps = self.apps.write().await;
        apps.push(app);
        debug!("Registered application #{}", apps.len());
    }

    /// Find the first registered application launched with `app_id`.
    ///
    /// Applications that were never launched are skipped.
    pub async fn find_by_app_id(&self, app_id: &str) -> Option<Arc<StreamingApp>> {
        let apps = self.apps.read().await;
        let found = apps
            .iter()
            .find(|app| app.launched_id() == Some(app_id))
            .cloned();

        if found.is_none() {
            debug!("App not found: {}", app_id);
        }
        found
    }

    /// Kill the application launched with `app_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no application matches, otherwise whatever
    /// [`StreamingApp::kill`] returns.
    pub async fn kill_by_app_id(&self, app_id: &str) -> Result<()> {
        let app = self
            .find_by_app_id(app_id)
            .await
            .ok_or_else(|| ApexError::NotFound {
                app_id: app_id.to_string(),
            })?;
        app.kill().await
    }

    /// Kill every launched application, in registration order.
    ///
    /// Applications killed concurrently by someone else are skipped. Stops at
    /// the first remote failure. Returns the number killed here.
    pub async fn kill_all(&self) -> Result<usize> {
        let mut killed = 0;
        for app in self.list().await {
            if app.kill_if_launched().await? {
                killed += 1;
            }
        }
        info!("Killed {} application(s)", killed);
        Ok(killed)
    }

    /// Drop killed applications from the registry. Returns how many.
    pub async fn remove_killed(&self) -> usize {
        let mut apps = self.apps.write().await;
        let before = apps.len();
        apps.retain(|app| app.phase() != AppPhase::Killed);
        before - apps.len()
    }

    /// Snapshot of all registered applications in insertion order
    pub async fn list(&self) -> Vec<Arc<StreamingApp>> {
        self.apps.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.apps.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.apps.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apex_core_interface::mock::MockEngine;
    use apex_core_interface::StreamingContext;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Context whose launch waits until `release` is notified
    struct GatedContext {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl StreamingContext for GatedContext {
        async fn from_folder(&self, _input_dir: &str) -> apex_core_interface::Result<()> {
            Ok(())
        }

        async fn print_stream(&self) -> apex_core_interface::Result<()> {
            Ok(())
        }

        async fn launch_dag(&self) -> apex_core_interface::Result<String> {
            self.started.notify_one();
            self.release.notified().await;
            Ok("GATED-1".to_string())
        }

        async fn kill(&self) -> apex_core_interface::Result<()> {
            Ok(())
        }
    }

    async fn launched(
        engine: &MockEngine,
        registry: &AppRegistry,
        name: &str,
    ) -> Arc<StreamingApp> {
        let app = StreamingApp::create(engine, registry, name).await.unwrap();
        app.launch_dag().await.unwrap();
        app
    }

    #[tokio::test]
    async fn test_create_registers_exactly_one_entry() {
        let engine = MockEngine::new();
        let registry = AppRegistry::new();

        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            StreamingApp::create(&engine, &registry, name).await.unwrap();
            assert_eq!(registry.len().await, i + 1);
        }

        let names: Vec<String> = registry
            .list()
            .await
            .iter()
            .map(|app| app.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_find_on_empty_registry() {
        let registry = AppRegistry::new();
        assert!(registry.find_by_app_id("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_find_skips_unlaunched_and_non_matching() {
        let engine = MockEngine::new().with_app_ids(["APP-1"]);
        let registry = AppRegistry::new();

        StreamingApp::create(&engine, &registry, "pending").await.unwrap();
        launched(&engine, &registry, "running").await;

        assert!(registry.find_by_app_id("missing").await.is_none());
        let found = registry.find_by_app_id("APP-1").await.unwrap();
        assert_eq!(found.name(), "running");
    }

    #[tokio::test]
    async fn test_duplicate_ids_resolve_to_first_registered() {
        let engine = MockEngine::new().with_app_ids(["DUP", "DUP"]);
        let registry = AppRegistry::new();

        let first = launched(&engine, &registry, "first").await;
        launched(&engine, &registry, "second").await;

        let found = registry.find_by_app_id("DUP").await.unwrap();
        assert!(Arc::ptr_eq(&found, &first));
    }

    #[tokio::test]
    async fn test_kill_by_app_id_kills_once() {
        let engine = MockEngine::new().with_app_ids(["APP-42"]);
        let registry = AppRegistry::new();
        launched(&engine, &registry, "job1").await;

        registry.kill_by_app_id("APP-42").await.unwrap();
        assert_eq!(engine.contexts()[0].kill_count(), 1);

        // killed apps stay findable but reject a second kill
        let again = registry.kill_by_app_id("APP-42").await.unwrap_err();
        assert!(matches!(again, ApexError::Terminated { .. }));
        assert_eq!(engine.contexts()[0].kill_count(), 1);
        assert!(registry.find_by_app_id("APP-42").await.is_some());
    }

    #[tokio::test]
    async fn test_kill_by_unknown_id_is_not_found() {
        let engine = MockEngine::new();
        let registry = AppRegistry::new();
        launched(&engine, &registry, "job1").await;

        let err = registry.kill_by_app_id("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(engine.contexts()[0].kill_count(), 0);
    }

    #[tokio::test]
    async fn test_kill_all_and_remove_killed() {
        let engine = MockEngine::new();
        let registry = AppRegistry::new();
        launched(&engine, &registry, "a").await;
        launched(&engine, &registry, "b").await;
        StreamingApp::create(&engine, &registry, "never-launched")
            .await
            .unwrap();

        assert_eq!(registry.kill_all().await.unwrap(), 2);
        assert_eq!(registry.kill_all().await.unwrap(), 0);

        assert_eq!(registry.remove_killed().await, 2);
        let remaining = registry.list().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name(), "never-launched");
    }

    #[tokio::test]
    async fn test_kill_all_stops_at_first_failure() {
        let engine = MockEngine::new();
        let registry = AppRegistry::new();
        launched(&engine, &registry, "a").await;
        launched(&engine, &registry, "b").await;

        engine.fail_kills(true);
        assert!(matches!(
            registry.kill_all().await,
            Err(ApexError::Remote(_))
        ));
        assert_eq!(engine.contexts()[1].kill_count(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let engine = MockEngine::new();
        let registry = AppRegistry::new();
        let view = registry.clone();

        StreamingApp::create(&engine, &registry, "job1").await.unwrap();
        assert_eq!(view.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_killed_does_not_wait_on_launch_in_flight() {
        let engine = MockEngine::new();
        let registry = AppRegistry::new();
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());

        let gated = Arc::new(StreamingApp::with_context(
            "gated",
            Box::new(GatedContext {
                started: Arc::clone(&started),
                release: Arc::clone(&release),
            }),
        ));
        registry.register(Arc::clone(&gated)).await;
        launched(&engine, &registry, "running").await;

        let launching = Arc::clone(&gated);
        let launch = tokio::spawn(async move {
            let app_id = launching.launch_dag().await.unwrap().to_string();
            app_id
        });
        started.notified().await;

        let removed = tokio::time::timeout(Duration::from_millis(200), registry.remove_killed())
            .await
            .expect("remove_killed blocked on a remote call");
        assert_eq!(removed, 0);
        assert_eq!(registry.len().await, 2);
        assert!(registry.find_by_app_id("application_0000000000000_0001").await.is_some());

        release.notify_one();
        assert_eq!(launch.await.unwrap(), "GATED-1");
        assert!(registry.find_by_app_id("GATED-1").await.is_some());
    }

    #[tokio::test]
    async fn test_kill_all_races_with_kill_by_app_id() {
        let engine = MockEngine::new().with_app_ids(["APP-1", "APP-2"]);
        let registry = AppRegistry::new();
        launched(&engine, &registry, "a").await;
        launched(&engine, &registry, "b").await;

        let (all, single) = tokio::join!(registry.kill_all(), registry.kill_by_app_id("APP-2"));
        let all = all.unwrap();

        match single {
            Ok(()) => assert_eq!(all, 1),
            Err(err) => {
                assert!(matches!(err, ApexError::Terminated { .. }));
                assert_eq!(all, 2);
            }
        }
        for context in engine.contexts() {
            assert_eq!(context.kill_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_kill_all_skips_apps_already_killed() {
        let engine = MockEngine::new().with_app_ids(["APP-1", "APP-2"]);
        let registry = AppRegistry::new();
        launched(&engine, &registry, "a").await;
        launched(&engine, &registry, "b").await;

        registry.kill_by_app_id("APP-1").await.unwrap();
        assert_eq!(registry.kill_all().await.unwrap(), 1);
        assert_eq!(engine.contexts()[0].kill_count(), 1);
        assert_eq!(engine.contexts()[1].kill_count(), 1);
    }
}

//! Node-run live monitor
//!
//! State machine over a node run's visible lifecycle:
//!
//! ```text
//! Idle -> Resolving -> Polling -> Settled
//!   \________\___________\__________\____-> Destroyed
//! ```
//!
//! An activation corresponds to one set of route parameters. It fetches the
//! parent workflow run once, starts a poller scoped to the node run, applies
//! each snapshot to the view state, fetches sibling history on the first
//! applied snapshot, and stops the poller when a terminal status arrives.
//! Re-activation bumps a generation and replaces the poller wholesale, so a
//! previous activation's snapshots can never be applied late.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::context::{RouteParams, RunContext, SessionContext};
use crate::fetch::{RunFetcher, SnapshotSource};
use crate::poller::{NodeRunPoller, PollerConfig, PollerHandle};
use gantry_core::domain::run::{WorkflowNodeRun, WorkflowRun};
use gantry_core::duration;

/// Tab shown when the query string carries none.
pub const DEFAULT_TAB: &str = "workflow";

/// Lifecycle state of the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No context yet.
    Idle,
    /// Route parameters seen but incomplete; nothing is running.
    Resolving,
    /// Poller active, snapshots being applied.
    Polling,
    /// Terminal status observed; poller stopped, duration computed.
    Settled,
    /// Torn down; no poller survives this state.
    Destroyed,
}

/// Outcome of offering one poller payload to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applied {
    /// Empty or undecodable payload, or the monitor is not polling.
    Ignored,
    /// Snapshot replaced the node-run view state.
    Updated,
    /// Snapshot was terminal: poller stopped, duration computed.
    Settled,
}

/// Live view over one workflow node run.
pub struct NodeRunMonitor {
    session: SessionContext,
    fetcher: Arc<dyn RunFetcher>,
    /// Snapshot source handed to pollers; `None` means each poller builds
    /// its own authenticated client from the session.
    snapshot_source: Option<Arc<dyn SnapshotSource>>,
    poll_interval: Duration,

    state: MonitorState,
    /// Bumped on every activation; identifies which activation owns the
    /// current poller and view state.
    generation: u64,
    context: Option<RunContext>,
    poller: Option<PollerHandle>,
    history_fetched: bool,

    // View state
    pub workflow_run: Option<WorkflowRun>,
    pub node_run: Option<WorkflowNodeRun>,
    pub history: Vec<WorkflowNodeRun>,
    pub duration: Option<String>,
    pub selected_tab: String,
}

impl NodeRunMonitor {
    /// Creates a monitor; pollers authenticate with the given session.
    pub fn new(session: SessionContext, fetcher: Arc<dyn RunFetcher>) -> Self {
        Self {
            session,
            fetcher,
            snapshot_source: None,
            poll_interval: Duration::from_secs(2),
            state: MonitorState::Idle,
            generation: 0,
            context: None,
            poller: None,
            history_fetched: false,
            workflow_run: None,
            node_run: None,
            history: Vec::new(),
            duration: None,
            selected_tab: DEFAULT_TAB.to_string(),
        }
    }

    /// Substitute the snapshot source used by pollers.
    pub fn with_snapshot_source(mut self, source: Arc<dyn SnapshotSource>) -> Self {
        self.snapshot_source = Some(source);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn context(&self) -> Option<&RunContext> {
        self.context.as_ref()
    }

    /// Read the tab from an optional query value, defaulting to `workflow`.
    /// Tab selection is view state only; it never affects the lifecycle.
    pub fn set_tab_from_query(&mut self, tab: Option<&str>) {
        self.selected_tab = tab
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TAB)
            .to_string();
    }

    /// Navigation URL for a tab change, preserving all path parameters.
    /// Requires a node run to have been applied.
    pub fn tab_url(&self, tab: &str) -> Option<String> {
        let ctx = self.context.as_ref()?;
        let node_run = self.node_run.as_ref()?;
        Some(format!(
            "/project/{}/workflow/{}/run/{}/node/{}?&tab={}",
            ctx.project_key, ctx.workflow_name, node_run.num, node_run.id, tab
        ))
    }

    // =============================================================================
    // Lifecycle
    // =============================================================================

    /// React to a route-parameter change.
    ///
    /// Stops any live poller, then: with incomplete parameters the monitor
    /// rests in `Resolving`; with a complete context it fetches the parent
    /// workflow run once, starts a fresh poller and enters `Polling`.
    pub async fn activate(&mut self, params: &RouteParams) {
        self.generation = self.generation.wrapping_add(1);

        // The previous activation's poller must be gone before the new one
        // exists; the monitor holds at most one handle.
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
        self.history_fetched = false;
        self.duration = None;

        let Some(ctx) = params.resolve() else {
            debug!(
                generation = self.generation,
                "route parameters incomplete, monitor resolving"
            );
            self.context = None;
            self.state = MonitorState::Resolving;
            return;
        };

        info!(
            generation = self.generation,
            project = %ctx.project_key,
            workflow = %ctx.workflow_name,
            num = ctx.number,
            node_run_id = ctx.node_run_id,
            "activating node run monitor"
        );

        // One-shot fetch of the parent run; failure leaves the live view
        // without its surrounding context but does not stop the activation.
        match self.fetcher.workflow_run(&ctx).await {
            Ok(run) => self.workflow_run = Some(run),
            Err(e) => warn!("workflow run fetch failed: {e}"),
        }

        let config = PollerConfig::new(self.session.clone(), ctx.clone())
            .with_poll_interval(self.poll_interval);
        let poller = match &self.snapshot_source {
            Some(source) => NodeRunPoller::new(config, Arc::clone(source)),
            None => NodeRunPoller::from_session(config),
        };

        self.poller = Some(poller.start());
        self.context = Some(ctx);
        self.state = MonitorState::Polling;
    }

    /// Consume poller snapshots until the run settles or the poller goes
    /// away. Returns immediately when the monitor is not polling.
    pub async fn drive(&mut self) {
        self.drive_with(|_| {}).await
    }

    /// Like [`drive`](Self::drive), invoking `on_update` after each applied
    /// snapshot (ignored payloads do not trigger it).
    pub async fn drive_with<F>(&mut self, mut on_update: F)
    where
        F: FnMut(&Self),
    {
        loop {
            if self.state != MonitorState::Polling {
                return;
            }
            let Some(poller) = self.poller.as_mut() else {
                return;
            };
            let Some(payload) = poller.recv().await else {
                debug!("poller channel closed");
                return;
            };

            let applied = self.apply_snapshot(&payload);
            if applied != Applied::Ignored {
                if !self.history_fetched {
                    // Exactly once per activation, on the first applied snapshot.
                    self.history_fetched = true;
                    self.fetch_history().await;
                }
                on_update(self);
            }
        }
    }

    /// Tear the monitor down, stopping an active poller if one exists.
    /// Safe in any state; after `Settled` there is no poller left to stop.
    pub fn destroy(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
        self.state = MonitorState::Destroyed;
    }

    // =============================================================================
    // Snapshot application
    // =============================================================================

    /// Offer one poller payload to the view state.
    fn apply_snapshot(&mut self, payload: &str) -> Applied {
        if self.state != MonitorState::Polling {
            return Applied::Ignored;
        }
        if payload.trim().is_empty() {
            return Applied::Ignored;
        }

        let node_run: WorkflowNodeRun = match serde_json::from_str(payload) {
            Ok(run) => run,
            Err(e) => {
                debug!("ignoring undecodable snapshot: {e}");
                return Applied::Ignored;
            }
        };

        let status = node_run.status;
        if status.is_terminal() {
            self.duration = node_run
                .done
                .map(|done| duration::between(node_run.start, done));
        }
        self.node_run = Some(node_run);

        if status.is_terminal() {
            info!(
                generation = self.generation,
                "node run settled: {status}"
            );
            if let Some(poller) = self.poller.take() {
                poller.stop();
            }
            self.state = MonitorState::Settled;
            Applied::Settled
        } else {
            Applied::Updated
        }
    }

    /// One-shot sibling-history lookup, keyed by the applied snapshot's
    /// logical node id.
    async fn fetch_history(&mut self) {
        let (Some(ctx), Some(node_run)) = (self.context.as_ref(), self.node_run.as_ref()) else {
            return;
        };
        match self
            .fetcher
            .node_run_history(ctx, node_run.workflow_node_id)
            .await
        {
            Ok(runs) => self.history = runs,
            Err(e) => warn!("node run history fetch failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gantry_core::domain::status::PipelineStatus;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session() -> SessionContext {
        SessionContext::new("ada", "tok", "https://api.example.com")
    }

    fn params() -> RouteParams {
        RouteParams::new("PROJ", "deploy", 4, 12)
    }

    fn snapshot(status: &str, done: Option<&str>) -> String {
        let done = match done {
            Some(d) => format!(", \"done\": \"{d}\""),
            None => String::new(),
        };
        format!(
            r#"{{
                "id": 12,
                "workflow_run_id": 4,
                "workflow_node_id": 9,
                "num": 4,
                "status": "{status}",
                "start": "2024-05-01T10:00:00Z"{done}
            }}"#
        )
    }

    /// Scripted fetcher: counts calls, returns canned data.
    struct FakeFetcher {
        workflow_run_calls: AtomicUsize,
        history_calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                workflow_run_calls: AtomicUsize::new(0),
                history_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RunFetcher for FakeFetcher {
        async fn workflow_run(&self, ctx: &RunContext) -> gantry_client::Result<WorkflowRun> {
            self.workflow_run_calls.fetch_add(1, Ordering::SeqCst);
            Ok(WorkflowRun {
                id: 4,
                num: ctx.number,
                workflow_name: ctx.workflow_name.clone(),
                project_key: ctx.project_key.clone(),
                status: PipelineStatus::Building,
                start: "2024-05-01T10:00:00Z".parse().unwrap(),
                last_modified: None,
                node_runs: Vec::new(),
            })
        }

        async fn node_run_history(
            &self,
            _ctx: &RunContext,
            workflow_node_id: i64,
        ) -> gantry_client::Result<Vec<WorkflowNodeRun>> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            let payload = snapshot("Success", Some("2024-05-01T10:01:00Z"));
            let mut prior: WorkflowNodeRun = serde_json::from_str(&payload).unwrap();
            prior.workflow_node_id = workflow_node_id;
            prior.num = 3;
            Ok(vec![prior])
        }
    }

    /// Scripted snapshot source feeding the poller.
    struct ScriptedSource {
        payloads: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn new(payloads: Vec<String>) -> Arc<Self> {
            Arc::new(Self {
                payloads: Mutex::new(payloads),
            })
        }
    }

    #[async_trait]
    impl SnapshotSource for ScriptedSource {
        async fn node_run_snapshot(&self, _ctx: &RunContext) -> gantry_client::Result<String> {
            let mut payloads = self.payloads.lock().unwrap();
            if payloads.is_empty() {
                // Keep the channel quiet once the script runs out.
                Ok(String::new())
            } else {
                Ok(payloads.remove(0))
            }
        }
    }

    fn monitor(fetcher: Arc<FakeFetcher>, source: Arc<ScriptedSource>) -> NodeRunMonitor {
        NodeRunMonitor::new(session(), fetcher)
            .with_snapshot_source(source)
            .with_poll_interval(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_incomplete_params_rest_in_resolving() {
        let fetcher = FakeFetcher::new();
        let mut monitor = monitor(fetcher.clone(), ScriptedSource::new(Vec::new()));

        let mut incomplete = params();
        incomplete.node_run_id = None;
        monitor.activate(&incomplete).await;

        assert_eq!(monitor.state(), MonitorState::Resolving);
        assert_eq!(fetcher.workflow_run_calls.load(Ordering::SeqCst), 0);

        // drive on a resolving monitor is a no-op
        monitor.drive().await;
        assert_eq!(monitor.state(), MonitorState::Resolving);
    }

    #[tokio::test]
    async fn test_settles_on_first_terminal_snapshot() {
        let fetcher = FakeFetcher::new();
        let source = ScriptedSource::new(vec![
            snapshot("Building", None),
            snapshot("Building", None),
            snapshot("Success", Some("2024-05-01T10:02:05Z")),
            snapshot("Building", None),
        ]);
        let mut monitor = monitor(fetcher.clone(), source);

        monitor.activate(&params()).await;
        assert_eq!(monitor.state(), MonitorState::Polling);
        assert_eq!(fetcher.workflow_run_calls.load(Ordering::SeqCst), 1);
        assert!(monitor.workflow_run.is_some());

        monitor.drive().await;

        assert_eq!(monitor.state(), MonitorState::Settled);
        let node_run = monitor.node_run.as_ref().unwrap();
        assert_eq!(node_run.status, PipelineStatus::Success);
        assert_eq!(monitor.duration.as_deref(), Some("2m 5s"));

        // The fourth payload would have arrived after settle; offering it
        // again must not mutate anything.
        let applied = monitor.apply_snapshot(&snapshot("Building", None));
        assert_eq!(applied, Applied::Ignored);
        assert_eq!(monitor.state(), MonitorState::Settled);
        assert_eq!(
            monitor.node_run.as_ref().unwrap().status,
            PipelineStatus::Success
        );
    }

    #[tokio::test]
    async fn test_history_fetched_once_on_first_applied_snapshot() {
        let fetcher = FakeFetcher::new();
        let source = ScriptedSource::new(vec![
            String::new(),              // absent payload: ignored
            "{not json".to_string(),    // undecodable payload: ignored
            snapshot("Building", None), // first applied: history fetch
            snapshot("Building", None),
            snapshot("Fail", Some("2024-05-01T10:00:30Z")),
        ]);
        let mut monitor = monitor(fetcher.clone(), source);

        monitor.activate(&params()).await;
        monitor.drive().await;

        assert_eq!(monitor.state(), MonitorState::Settled);
        assert_eq!(fetcher.history_calls.load(Ordering::SeqCst), 1);
        assert_eq!(monitor.history.len(), 1);
        assert_eq!(monitor.duration.as_deref(), Some("30s"));
    }

    #[tokio::test]
    async fn test_drive_with_reports_applied_snapshots_only() {
        let fetcher = FakeFetcher::new();
        let source = ScriptedSource::new(vec![
            String::new(),
            snapshot("Waiting", None),
            snapshot("Building", None),
            snapshot("Success", Some("2024-05-01T10:01:00Z")),
        ]);
        let mut monitor = monitor(fetcher.clone(), source);

        monitor.activate(&params()).await;
        let mut seen = Vec::new();
        monitor
            .drive_with(|m| seen.push(m.node_run.as_ref().unwrap().status))
            .await;

        assert_eq!(
            seen,
            [
                PipelineStatus::Waiting,
                PipelineStatus::Building,
                PipelineStatus::Success
            ]
        );
    }

    #[tokio::test]
    async fn test_destroy_stops_active_poller() {
        let fetcher = FakeFetcher::new();
        let source = ScriptedSource::new(vec![snapshot("Building", None)]);
        let mut monitor = monitor(fetcher.clone(), source);

        monitor.activate(&params()).await;
        assert_eq!(monitor.state(), MonitorState::Polling);
        assert!(monitor.poller.is_some());

        monitor.destroy();
        assert_eq!(monitor.state(), MonitorState::Destroyed);
        assert!(monitor.poller.is_none());

        // Destroy again: nothing left to stop, no panic.
        monitor.destroy();
        assert_eq!(monitor.state(), MonitorState::Destroyed);
    }

    #[tokio::test]
    async fn test_destroy_after_settle_has_no_poller_to_stop() {
        let fetcher = FakeFetcher::new();
        let source = ScriptedSource::new(vec![snapshot("Skipped", Some("2024-05-01T10:00:00Z"))]);
        let mut monitor = monitor(fetcher.clone(), source);

        monitor.activate(&params()).await;
        monitor.drive().await;
        assert_eq!(monitor.state(), MonitorState::Settled);
        assert!(monitor.poller.is_none());

        monitor.destroy();
        assert_eq!(monitor.state(), MonitorState::Destroyed);
    }

    #[tokio::test]
    async fn test_reactivation_replaces_poller_and_resets_activation_state() {
        let fetcher = FakeFetcher::new();
        let source = ScriptedSource::new(vec![
            snapshot("Success", Some("2024-05-01T10:01:00Z")),
            snapshot("Building", None),
        ]);
        let mut monitor = monitor(fetcher.clone(), source);

        monitor.activate(&params()).await;
        monitor.drive().await;
        assert_eq!(monitor.state(), MonitorState::Settled);
        assert!(monitor.duration.is_some());
        let first_generation = monitor.generation;

        // New route parameters: fresh activation over the same component.
        monitor.activate(&RouteParams::new("PROJ", "deploy", 5, 13)).await;
        assert_eq!(monitor.state(), MonitorState::Polling);
        assert_eq!(monitor.generation, first_generation + 1);
        assert!(monitor.duration.is_none());
        assert!(!monitor.history_fetched);
        assert_eq!(fetcher.workflow_run_calls.load(Ordering::SeqCst), 2);

        monitor.destroy();
    }

    #[tokio::test]
    async fn test_tab_selection_and_url() {
        let fetcher = FakeFetcher::new();
        let source = ScriptedSource::new(vec![snapshot("Success", Some("2024-05-01T10:01:00Z"))]);
        let mut monitor = monitor(fetcher.clone(), source);

        monitor.set_tab_from_query(None);
        assert_eq!(monitor.selected_tab, "workflow");
        monitor.set_tab_from_query(Some("variables"));
        assert_eq!(monitor.selected_tab, "variables");

        // No node run applied yet: nothing to navigate to.
        assert!(monitor.tab_url("workflow").is_none());

        monitor.activate(&params()).await;
        monitor.drive().await;

        assert_eq!(
            monitor.tab_url("variables").as_deref(),
            Some("/project/PROJ/workflow/deploy/run/4/node/12?&tab=variables")
        );
    }
}

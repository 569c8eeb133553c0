//! Node-run poller
//!
//! Background task that fetches the watched node run on an interval and
//! relays each serialized snapshot over a channel. The poller never decodes
//! payloads and never stops on its own: fetch errors are logged and the next
//! tick retries, until the handle is stopped or the receiver goes away.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};

use crate::context::{RunContext, SessionContext};
use crate::fetch::SnapshotSource;
use gantry_client::ApiClient;

/// Default delay between two snapshot fetches.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Snapshots buffered before the poller awaits the consumer.
const CHANNEL_CAPACITY: usize = 16;

/// Activation payload for a poller: who is asking, and which node run.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub session: SessionContext,
    pub context: RunContext,
    pub poll_interval: Duration,
}

impl PollerConfig {
    /// Creates a configuration with the default interval
    pub fn new(session: SessionContext, context: RunContext) -> Self {
        Self {
            session,
            context,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }
        Ok(())
    }
}

/// Poller over one node run
pub struct NodeRunPoller {
    config: PollerConfig,
    source: Arc<dyn SnapshotSource>,
}

impl NodeRunPoller {
    /// Creates a poller reading snapshots from the given source
    pub fn new(config: PollerConfig, source: Arc<dyn SnapshotSource>) -> Self {
        Self { config, source }
    }

    /// Creates a poller with its own authenticated API client, built from
    /// the session carried by the configuration
    pub fn from_session(config: PollerConfig) -> Self {
        let client = ApiClient::with_session(
            config.session.api_url.clone(),
            config.session.session_token.clone(),
        );
        Self::new(config, Arc::new(client))
    }

    /// Starts the polling task
    ///
    /// Snapshots arrive through the returned handle; dropping or stopping
    /// the handle terminates the task.
    pub fn start(self) -> PollerHandle {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let config = self.config;
        let source = self.source;

        let task = tokio::spawn(async move {
            debug!(
                user = %config.session.user,
                project = %config.context.project_key,
                workflow = %config.context.workflow_name,
                num = config.context.number,
                node_run_id = config.context.node_run_id,
                "starting node run poller (interval: {:?})",
                config.poll_interval
            );

            let mut interval = time::interval(config.poll_interval);

            loop {
                interval.tick().await;

                match source.node_run_snapshot(&config.context).await {
                    Ok(payload) => {
                        // Receiver gone means the consumer was torn down.
                        if tx.send(payload).await.is_err() {
                            debug!("snapshot receiver dropped, stopping poller");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("node run poll failed: {e}");
                    }
                }
            }
        });

        PollerHandle { rx, task }
    }
}

/// Handle over a running poller: the snapshot channel plus its stop switch.
///
/// `stop` consumes the handle, so a second stop is unrepresentable.
pub struct PollerHandle {
    rx: mpsc::Receiver<String>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Receive the next snapshot; `None` once the poller task is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Stop the background task.
    pub fn stop(self) {
        self.task.abort();
    }
}

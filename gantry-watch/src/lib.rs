//! Gantry Watch
//!
//! Live tracking of a single workflow node run.
//!
//! Architecture:
//! - Context: the four values identifying a node run, threaded explicitly
//! - Poller: background task fetching serialized snapshots on an interval,
//!   delivered over a channel with an explicit stop handle
//! - Monitor: state machine that applies snapshots to view state and stops
//!   the poller once a terminal status is observed
//!
//! The monitor consumes the poller channel directly; there is no shared
//! mutable state between the background task and the consumer.

pub mod context;
pub mod fetch;
pub mod monitor;
pub mod poller;

pub use context::{RouteParams, RunContext, SessionContext};
pub use fetch::{RunFetcher, SnapshotSource};
pub use monitor::{MonitorState, NodeRunMonitor};
pub use poller::{NodeRunPoller, PollerConfig, PollerHandle};

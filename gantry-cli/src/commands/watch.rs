//! Watch command handlers
//!
//! Follows a workflow node run live: prints each status change as snapshots
//! arrive, then the settled status, elapsed duration, sibling history and
//! the run's variables grouped by scope.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use gantry_core::domain::status::PipelineStatus;
use gantry_core::domain::variable::{VariableBuckets, VariableScope};
use gantry_watch::{MonitorState, NodeRunMonitor, RouteParams, SessionContext};

use crate::commands::build::colored_status;
use crate::config::Config;

/// Watch subcommands
#[derive(Subcommand)]
pub enum WatchCommands {
    /// Follow a node run until it settles
    NodeRun {
        /// Project unique key
        key: String,
        /// Workflow name
        workflow: String,
        /// Workflow run number
        number: i64,
        /// Node run id
        node_run_id: i64,

        /// Tab to select in printed navigation links
        #[arg(long)]
        tab: Option<String>,

        /// Seconds between snapshot fetches
        #[arg(long, default_value = "2")]
        interval: u64,
    },
}

/// Handle watch commands
pub async fn handle_watch_command(command: WatchCommands, config: &Config) -> Result<()> {
    match command {
        WatchCommands::NodeRun {
            key,
            workflow,
            number,
            node_run_id,
            tab,
            interval,
        } => watch_node_run(config, &key, &workflow, number, node_run_id, tab, interval).await,
    }
}

async fn watch_node_run(
    config: &Config,
    key: &str,
    workflow: &str,
    number: i64,
    node_run_id: i64,
    tab: Option<String>,
    interval: u64,
) -> Result<()> {
    let session = SessionContext::new(&config.user, &config.session_token, &config.api_url);
    session.validate()?;

    let client = Arc::new(config.client());
    let mut monitor = NodeRunMonitor::new(session, client)
        .with_poll_interval(Duration::from_secs(interval.max(1)));
    monitor.set_tab_from_query(tab.as_deref());

    println!(
        "{}",
        format!("Watching {}/{} run #{} node {}", key, workflow, number, node_run_id).bold()
    );

    monitor
        .activate(&RouteParams::new(key, workflow, number, node_run_id))
        .await;

    if let Some(run) = &monitor.workflow_run {
        println!(
            "  workflow run #{} is {}",
            run.num,
            colored_status(run.status)
        );
    }

    let mut last_status: Option<PipelineStatus> = None;
    monitor
        .drive_with(|m| {
            let Some(node_run) = &m.node_run else { return };
            if last_status != Some(node_run.status) {
                last_status = Some(node_run.status);
                println!("  node run is {}", colored_status(node_run.status));
            }
        })
        .await;

    if monitor.state() != MonitorState::Settled {
        println!("{}", "Watch ended before the node run settled.".yellow());
        monitor.destroy();
        return Ok(());
    }

    print_settled(&monitor);
    monitor.destroy();
    Ok(())
}

fn print_settled(monitor: &NodeRunMonitor) {
    let Some(node_run) = &monitor.node_run else {
        return;
    };

    println!();
    println!(
        "{} {}",
        "Settled:".bold(),
        colored_status(node_run.status)
    );
    if let Some(duration) = &monitor.duration {
        println!("  duration: {}", duration);
    }
    if let Some(url) = monitor.tab_url(&monitor.selected_tab) {
        println!("  {}", url.dimmed());
    }

    if !monitor.history.is_empty() {
        println!();
        println!(
            "{}",
            format!("Previous runs of this node ({}):", monitor.history.len()).bold()
        );
        for prior in &monitor.history {
            println!(
                "  #{}.{} {}",
                prior.num,
                prior.subnumber,
                colored_status(prior.status)
            );
        }
    }

    if !node_run.build_parameters.is_empty() {
        let buckets = VariableBuckets::classify(&node_run.build_parameters);
        println!();
        println!("{}", "Variables:".bold());
        for scope in VariableScope::all() {
            let bucket = buckets.bucket(scope);
            if bucket.is_empty() {
                continue;
            }
            println!("  {}", scope.label().bold());
            for variable in bucket {
                println!("    {} = {}", variable.name, variable.value);
            }
        }
    }
}

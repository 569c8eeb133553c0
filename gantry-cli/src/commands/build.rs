//! Build command handlers
//!
//! Pipeline-build lifecycle commands: stopping, restarting, running,
//! rolling back, and querying history, commits and triggered builds.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use gantry_client::{ApiClient, HistoryFilter};
use gantry_core::domain::build::{Commit, PipelineBuild};
use gantry_core::domain::status::PipelineStatus;
use gantry_core::domain::variable::Variable;
use gantry_core::dto::PipelineRunRequest;

use crate::config::Config;

/// Build subcommands
#[derive(Subcommand)]
pub enum BuildCommands {
    /// Stop a running build
    Stop {
        /// Project unique key
        key: String,
        /// Application name
        app: String,
        /// Pipeline name
        pipeline: String,
        /// Build number
        number: i64,
        /// Environment name
        #[arg(long, default_value = "")]
        env: String,
    },
    /// Restart a build
    Restart {
        key: String,
        app: String,
        pipeline: String,
        number: i64,
        #[arg(long, default_value = "")]
        env: String,
    },
    /// Run a pipeline
    Run {
        key: String,
        app: String,
        pipeline: String,

        /// Branch to run on
        #[arg(long)]
        branch: Option<String>,

        /// Parameters as key=value pairs (e.g., image.tag=1.2.3)
        #[arg(short, long, value_parser = parse_key_val)]
        param: Vec<(String, String)>,

        /// Environment name
        #[arg(long)]
        env: Option<String>,
    },
    /// Roll back to the previous successful version
    Rollback {
        key: String,
        app: String,
        pipeline: String,
        #[arg(long)]
        env: Option<String>,
    },
    /// Show build history
    History {
        key: String,
        app: String,
        pipeline: String,
        #[arg(long, default_value = "")]
        env: String,
        #[arg(long, default_value = "20")]
        limit: u32,
        /// Status filter, passed through verbatim
        #[arg(long, default_value = "")]
        status: String,
        /// Branch filter, passed through verbatim
        #[arg(long, default_value = "")]
        branch: String,
    },
    /// List commits between a build's hash and HEAD
    Commits {
        key: String,
        app: String,
        pipeline: String,
        /// Commit hash to start from
        hash: String,
        #[arg(long, default_value = "")]
        env: String,
    },
    /// List builds triggered as children of a build
    Triggered {
        key: String,
        app: String,
        pipeline: String,
        number: i64,
    },
    /// Delete a build
    Delete {
        key: String,
        app: String,
        pipeline: String,
        number: i64,
        #[arg(long, default_value = "")]
        env: String,
    },
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Handle build commands
pub async fn handle_build_command(command: BuildCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        BuildCommands::Stop {
            key,
            app,
            pipeline,
            number,
            env,
        } => stop_build(&client, &key, &app, &pipeline, number, &env).await,
        BuildCommands::Restart {
            key,
            app,
            pipeline,
            number,
            env,
        } => restart_build(&client, &key, &app, &pipeline, number, &env).await,
        BuildCommands::Run {
            key,
            app,
            pipeline,
            branch,
            param,
            env,
        } => run_pipeline(&client, &key, &app, &pipeline, branch, param, env).await,
        BuildCommands::Rollback {
            key,
            app,
            pipeline,
            env,
        } => rollback(&client, &key, &app, &pipeline, env).await,
        BuildCommands::History {
            key,
            app,
            pipeline,
            env,
            limit,
            status,
            branch,
        } => {
            let filter = HistoryFilter {
                env_name: env,
                limit,
                status,
                branch_name: branch,
            };
            build_history(&client, &key, &app, &pipeline, &filter).await
        }
        BuildCommands::Commits {
            key,
            app,
            pipeline,
            hash,
            env,
        } => commits(&client, &key, &app, &pipeline, &env, &hash).await,
        BuildCommands::Triggered {
            key,
            app,
            pipeline,
            number,
        } => triggered_builds(&client, &key, &app, &pipeline, number).await,
        BuildCommands::Delete {
            key,
            app,
            pipeline,
            number,
            env,
        } => delete_build(&client, &key, &app, &pipeline, number, &env).await,
    }
}

async fn stop_build(
    client: &ApiClient,
    key: &str,
    app: &str,
    pipeline: &str,
    number: i64,
    env: &str,
) -> Result<()> {
    client.stop_build(key, app, pipeline, number, env).await?;
    println!("{}", format!("Build #{} stopped", number).green());
    Ok(())
}

async fn restart_build(
    client: &ApiClient,
    key: &str,
    app: &str,
    pipeline: &str,
    number: i64,
    env: &str,
) -> Result<()> {
    let build = client
        .restart_build(key, app, pipeline, number, env)
        .await?;
    println!("{}", "Build restarted:".bold());
    print_build(&build);
    Ok(())
}

async fn run_pipeline(
    client: &ApiClient,
    key: &str,
    app: &str,
    pipeline: &str,
    branch: Option<String>,
    params: Vec<(String, String)>,
    env: Option<String>,
) -> Result<()> {
    let mut req = match branch {
        Some(branch) => PipelineRunRequest::for_branch(branch),
        None => PipelineRunRequest::default(),
    };
    req.params
        .extend(params.into_iter().map(|(name, value)| Variable::new(name, value)));
    req.env_name = env;

    let build = client.run_pipeline(key, app, pipeline, &req).await?;
    println!("{}", "Build started:".bold());
    print_build(&build);
    Ok(())
}

async fn rollback(
    client: &ApiClient,
    key: &str,
    app: &str,
    pipeline: &str,
    env: Option<String>,
) -> Result<()> {
    let req = PipelineRunRequest {
        env_name: env,
        ..PipelineRunRequest::default()
    };
    let build = client.rollback(key, app, pipeline, &req).await?;
    println!("{}", "Rollback started:".bold());
    print_build(&build);
    Ok(())
}

async fn build_history(
    client: &ApiClient,
    key: &str,
    app: &str,
    pipeline: &str,
    filter: &HistoryFilter,
) -> Result<()> {
    let builds = client.build_history(key, app, pipeline, filter).await?;

    if builds.is_empty() {
        println!("{}", "No builds found.".yellow());
    } else {
        println!("{}", format!("Found {} build(s):", builds.len()).bold());
        println!();
        for build in builds {
            print_build(&build);
        }
    }

    Ok(())
}

async fn commits(
    client: &ApiClient,
    key: &str,
    app: &str,
    pipeline: &str,
    env: &str,
    hash: &str,
) -> Result<()> {
    let commits = client.commits(key, app, pipeline, env, hash).await?;

    if commits.is_empty() {
        println!("{}", "No commits found.".yellow());
    } else {
        println!("{}", format!("Found {} commit(s):", commits.len()).bold());
        println!();
        for commit in commits {
            print_commit(&commit);
        }
    }

    Ok(())
}

async fn triggered_builds(
    client: &ApiClient,
    key: &str,
    app: &str,
    pipeline: &str,
    number: i64,
) -> Result<()> {
    let builds = client.triggered_builds(key, app, pipeline, number).await?;

    if builds.is_empty() {
        println!("{}", "No triggered builds.".yellow());
    } else {
        println!(
            "{}",
            format!("Build #{} triggered {} build(s):", number, builds.len()).bold()
        );
        println!();
        for build in builds {
            print_build(&build);
        }
    }

    Ok(())
}

async fn delete_build(
    client: &ApiClient,
    key: &str,
    app: &str,
    pipeline: &str,
    number: i64,
    env: &str,
) -> Result<()> {
    client.delete_build(key, app, pipeline, number, env).await?;
    println!("{}", format!("Build #{} deleted", number).green());
    Ok(())
}

fn print_build(build: &PipelineBuild) {
    println!(
        "  #{} {} {} (started {})",
        build.build_number,
        colored_status(build.status),
        build.branch.as_deref().unwrap_or("").dimmed(),
        build.start
    );
}

fn print_commit(commit: &Commit) {
    let first_line = commit.message.lines().next().unwrap_or("");
    println!(
        "  {} {} {}",
        commit.id.chars().take(8).collect::<String>().yellow(),
        commit.author.name.dimmed(),
        first_line
    );
}

/// Render a status with the conventional color.
pub fn colored_status(status: PipelineStatus) -> ColoredString {
    match status {
        PipelineStatus::Success => status.as_str().green(),
        PipelineStatus::Fail => status.as_str().red(),
        PipelineStatus::Building => status.as_str().blue(),
        PipelineStatus::Waiting => status.as_str().yellow(),
        PipelineStatus::Disabled | PipelineStatus::Skipped => status.as_str().dimmed(),
    }
}

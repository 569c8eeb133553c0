//! Pipeline command handlers
//!
//! Pipeline definition commands: viewing, listing, deletion, and the
//! reverse lookup of applications using a pipeline.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use gantry_client::ApiClient;

use crate::config::Config;

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// Get pipeline details
    Get {
        /// Project unique key
        key: String,
        /// Pipeline name
        name: String,
    },
    /// List the project's pipelines
    List {
        key: String,
    },
    /// Delete a pipeline
    Delete {
        key: String,
        name: String,
    },
    /// List applications using a pipeline
    Applications {
        key: String,
        name: String,
    },
}

/// Handle pipeline commands
pub async fn handle_pipeline_command(command: PipelineCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        PipelineCommands::Get { key, name } => get_pipeline(&client, &key, &name).await,
        PipelineCommands::List { key } => list_pipelines(&client, &key).await,
        PipelineCommands::Delete { key, name } => delete_pipeline(&client, &key, &name).await,
        PipelineCommands::Applications { key, name } => {
            list_applications(&client, &key, &name).await
        }
    }
}

async fn get_pipeline(client: &ApiClient, key: &str, name: &str) -> Result<()> {
    let pipeline = client.pipeline(key, name).await?;
    println!("{}", pipeline.name.bold());
    if !pipeline.pipeline_type.is_empty() {
        println!("  type: {}", pipeline.pipeline_type);
    }
    Ok(())
}

async fn list_pipelines(client: &ApiClient, key: &str) -> Result<()> {
    let pipelines = client.pipelines(key).await?;

    if pipelines.is_empty() {
        println!("{}", "No pipelines found.".yellow());
    } else {
        println!("{}", format!("Found {} pipeline(s):", pipelines.len()).bold());
        for pipeline in pipelines {
            println!("  {}", pipeline.name);
        }
    }

    Ok(())
}

async fn delete_pipeline(client: &ApiClient, key: &str, name: &str) -> Result<()> {
    client.delete_pipeline(key, name).await?;
    println!("{}", format!("Pipeline {} deleted", name).green());
    Ok(())
}

async fn list_applications(client: &ApiClient, key: &str, name: &str) -> Result<()> {
    let applications = client.applications_using_pipeline(key, name).await?;

    if applications.is_empty() {
        println!("{}", "No applications use this pipeline.".yellow());
    } else {
        println!(
            "{}",
            format!("{} application(s) use {}:", applications.len(), name).bold()
        );
        for application in applications {
            println!("  {} {}", application.name, application.description.dimmed());
        }
    }

    Ok(())
}

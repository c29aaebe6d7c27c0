//! Taskstate CLI - inspect and drive task/group state in the store.

use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use taskstate_backend::{with_deadline, Backend, HttpBackend};
use taskstate_client::ClientConfig;
use taskstate_core::{GroupUuid, StateError, TaskResult, TaskSignature, TaskStatus, TaskUuid};

/// Taskstate CLI - state store management tool
#[derive(Parser)]
#[command(name = "taskstate")]
#[command(about = "CLI for the Taskstate state store", long_about = None)]
struct Cli {
    /// Store base URL
    #[arg(short, long, env = "TASKSTATE_STORE_URL", default_value = "http://127.0.0.1:8080/api/v1")]
    url: String,

    /// Deadline for the whole command, in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the state of one task
    #[command(name = "get-state")]
    GetState {
        /// Task UUID
        task_uuid: String,
    },

    /// Show the states of every task in a group
    #[command(name = "group-states")]
    GroupStates {
        /// Group UUID
        group_uuid: String,

        /// Expected group size
        #[arg(short, long, default_value_t = 0)]
        expected: usize,
    },

    /// Check whether a group reached its expected number of finished tasks
    #[command(name = "group-completed")]
    GroupCompleted {
        /// Group UUID
        group_uuid: String,

        /// Expected number of finished tasks
        #[arg(short, long)]
        expected: usize,
    },

    /// Claim a group's chord callback
    #[command(name = "trigger-chord")]
    TriggerChord {
        /// Group UUID
        group_uuid: String,
    },

    /// Register a group and its member tasks
    #[command(name = "init-group")]
    InitGroup {
        /// Group UUID (generated when omitted)
        #[arg(short, long)]
        group: Option<String>,

        /// Member task UUIDs, in order
        #[arg(required = true, num_args = 1..)]
        task_uuids: Vec<String>,
    },

    /// Record a lifecycle transition
    Mark {
        /// Task UUID
        task_uuid: String,

        /// Target status (PENDING, RECEIVED, STARTED, RETRY, SUCCESS, FAILURE)
        #[arg(short, long)]
        status: TaskStatus,

        /// Task name (used when creating the PENDING record)
        #[arg(short, long, default_value = "")]
        name: String,

        /// Group UUID (used when creating the PENDING record)
        #[arg(short, long)]
        group: Option<String>,

        /// Error message for FAILURE
        #[arg(long)]
        error: Option<String>,

        /// Results for SUCCESS, as a JSON array of {"type", "value"} objects
        #[arg(long)]
        results: Option<String>,
    },

    /// Delete a task record
    #[command(name = "purge-state")]
    PurgeState {
        /// Task UUID
        task_uuid: String,
    },

    /// Delete a group record
    #[command(name = "purge-group")]
    PurgeGroup {
        /// Group UUID
        group_uuid: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::new(cli.url).with_request_timeout_secs(cli.timeout);
    let backend = HttpBackend::new(&config)?;

    with_deadline(Duration::from_secs(cli.timeout), run(&backend, cli.command)).await?;
    Ok(())
}

async fn run(backend: &dyn Backend, command: Commands) -> Result<(), StateError> {
    match command {
        Commands::GetState { task_uuid } => {
            let state = backend.get_state(&TaskUuid::new(task_uuid)).await?;
            print_json(&state)
        }
        Commands::GroupStates {
            group_uuid,
            expected,
        } => {
            let states = backend
                .group_task_states(&GroupUuid::new(group_uuid), expected)
                .await?;
            print_json(&states)
        }
        Commands::GroupCompleted {
            group_uuid,
            expected,
        } => {
            let completed = backend
                .group_completed(&GroupUuid::new(group_uuid), expected)
                .await?;
            print_json(&serde_json::json!({ "completed": completed }))
        }
        Commands::TriggerChord { group_uuid } => {
            let triggered = backend.trigger_chord(&GroupUuid::new(group_uuid)).await?;
            print_json(&serde_json::json!({ "triggered": triggered }))
        }
        Commands::InitGroup { group, task_uuids } => {
            let group_uuid = group.map(GroupUuid::new).unwrap_or_else(GroupUuid::generate);
            let uuids: Vec<TaskUuid> = task_uuids.into_iter().map(TaskUuid::from).collect();
            backend.init_group(&group_uuid, &uuids).await?;
            println!("Group {} registered with {} tasks", group_uuid, uuids.len());
            Ok(())
        }
        Commands::Mark {
            task_uuid,
            status,
            name,
            group,
            error,
            results,
        } => {
            let mut signature = TaskSignature::new(task_uuid, name);
            if let Some(group) = group {
                signature = signature.in_group(group);
            }
            mark(backend, &signature, status, error, results).await?;
            println!("Task {} marked {}", signature.uuid, status);
            Ok(())
        }
        Commands::PurgeState { task_uuid } => {
            backend.purge_state(&TaskUuid::new(task_uuid)).await?;
            println!("Task state purged");
            Ok(())
        }
        Commands::PurgeGroup { group_uuid } => {
            backend.purge_group(&GroupUuid::new(group_uuid)).await?;
            println!("Group purged");
            Ok(())
        }
    }
}

async fn mark(
    backend: &dyn Backend,
    signature: &TaskSignature,
    status: TaskStatus,
    error: Option<String>,
    results: Option<String>,
) -> Result<(), StateError> {
    match status {
        TaskStatus::Pending => backend.mark_pending(signature).await,
        TaskStatus::Received => backend.mark_received(signature).await,
        TaskStatus::Started => backend.mark_started(signature).await,
        TaskStatus::Retry => backend.mark_retry(signature).await,
        TaskStatus::Success => {
            let results = parse_results(results.as_deref())?;
            backend.mark_success(signature, results).await
        }
        TaskStatus::Failure => {
            let error = error.ok_or_else(|| {
                StateError::InvalidArgument("--error is required for FAILURE".to_string())
            })?;
            backend.mark_failure(signature, &error).await
        }
    }
}

fn parse_results(raw: Option<&str>) -> Result<Vec<TaskResult>, StateError> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| StateError::InvalidArgument(format!("invalid --results: {e}"))),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), StateError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| StateError::InvalidArgument(format!("failed to render output: {e}")))?;
    println!("{rendered}");
    Ok(())
}

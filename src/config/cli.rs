use crate::domain::model::Trigger;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ausf-operator")]
#[command(about = "Lifecycle operator for the OAI 5G AUSF workload")]
pub struct CliArgs {
    /// Path to the TOML operator configuration
    #[arg(short, long, default_value = "ausf-operator.toml")]
    pub config: PathBuf,

    /// Directory holding relation data, deferred triggers and the workload root
    #[arg(long, default_value = "./state")]
    pub state_dir: PathBuf,

    /// Workload root directory (defaults to <state-dir>/workload)
    #[arg(long)]
    pub workload_root: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    /// Show configuration and readiness without writing anything
    #[arg(long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Local configuration changed
    ConfigChanged,
    /// Data in a relation changed
    RelationChanged {
        #[arg(long)]
        relation: String,
        #[arg(long)]
        id: u32,
    },
    /// A remote application joined a relation
    RelationJoined {
        #[arg(long)]
        relation: String,
        #[arg(long)]
        id: u32,
    },
    /// Redeliver deferred triggers
    Redeliver,
    /// Re-announce this unit's endpoint to every consumer
    Advertise,
    /// Show unit status, readiness and queued triggers
    Status,
}

impl Command {
    pub fn trigger(&self) -> Option<Trigger> {
        match self {
            Command::ConfigChanged => Some(Trigger::ConfigChanged),
            Command::RelationChanged { relation, id } => Some(Trigger::RelationChanged {
                relation: relation.clone(),
                id: *id,
            }),
            Command::RelationJoined { relation, id } => Some(Trigger::RelationJoined {
                relation: relation.clone(),
                id: *id,
            }),
            Command::Redeliver | Command::Advertise | Command::Status => None,
        }
    }
}

impl CliArgs {
    pub fn workload_root(&self) -> PathBuf {
        self.workload_root
            .clone()
            .unwrap_or_else(|| self.state_dir.join("workload"))
    }
}

//! # skillbase CLI (`skb`)
//!
//! The `skb` binary mirrors a tree of markdown skills and prompt templates
//! into SQLite and layers plan/task records on top.
//!
//! ## Usage
//!
//! ```bash
//! skb --config ./config/skb.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `skb init` | Create the SQLite database and schema |
//! | `skb sync` | Run the three sync passes (skills, prompts, fragments) |
//! | `skb search "<query>"` | Full-text search over synced documents |
//! | `skb show skill <path>` | Print a stored skill |
//! | `skb show prompt <name>` | Print a stored prompt and its skill list |
//! | `skb plan ...` | Plan CRUD |
//! | `skb tasklist ...` | Task lists under a plan |
//! | `skb task ...` | Tasks and recorded results |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use skillbase::{config, db, migrate, records, search, show, sync};

/// skillbase — a local-first knowledge-base CLI that mirrors markdown
/// skills and prompt templates into SQLite.
#[derive(Parser)]
#[command(
    name = "skb",
    about = "skillbase — mirror markdown skills and prompt templates into a searchable SQLite store",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/skb.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables, FTS
    /// indexes, and triggers. Idempotent — running it again is safe.
    Init,

    /// Run a full sync: skills, prompts, then fragment reconciliation.
    ///
    /// Individual file errors are reported and counted but do not fail
    /// the run; the exit code is non-zero only on schema or connection
    /// failure.
    Sync,

    /// Search synced documents via FTS5.
    Search {
        /// The search query string.
        query: String,

        /// Document kind: `skills`, `prompts`, or `all`.
        #[arg(long, default_value = "all")]
        kind: String,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Print a stored document.
    Show {
        #[command(subcommand)]
        target: ShowTarget,
    },

    /// Manage plans.
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },

    /// Manage task lists under a plan.
    Tasklist {
        #[command(subcommand)]
        action: TasklistAction,
    },

    /// Manage tasks and their recorded results.
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Print a skill by its stored path.
    Skill { path: String },
    /// Print a prompt by name, with its fragment's ordered skills.
    Prompt { name: String },
}

#[derive(Subcommand)]
enum PlanAction {
    /// Create a plan.
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List all plans.
    List,
    /// Show a plan with its task lists, tasks, and results.
    Show { name: String },
    /// Set a plan's status (active, completed, archived).
    Status { name: String, status: String },
    /// Delete a plan and everything under it.
    Remove { name: String },
}

#[derive(Subcommand)]
enum TasklistAction {
    /// Create a task list under a plan.
    Add { plan: String, name: String },
    /// List a plan's task lists with their ids.
    List { plan: String },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Create a task in a task list.
    Add { list_id: String, description: String },
    /// List a task list's tasks with their ids.
    List { list_id: String },
    /// Set a task's status (todo, in_progress, done, skipped).
    Status { task_id: String, status: String },
    /// Record a result summary for a task.
    Result { task_id: String, summary: String },
    /// Delete a task and its recorded results.
    Remove { task_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg).await?;
            migrate::ensure_schema(&pool).await?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Sync => {
            sync::sync_all(&cfg).await?;
        }
        Commands::Search { query, kind, limit } => {
            search::run_search(&cfg, &query, &kind, limit).await?;
        }
        Commands::Show { target } => match target {
            ShowTarget::Skill { path } => {
                show::run_show_skill(&cfg, &path).await?;
            }
            ShowTarget::Prompt { name } => {
                show::run_show_prompt(&cfg, &name).await?;
            }
        },
        Commands::Plan { action } => match action {
            PlanAction::Add { name, description } => {
                records::add_plan(&cfg, &name, description.as_deref()).await?;
            }
            PlanAction::List => {
                records::list_plans(&cfg).await?;
            }
            PlanAction::Show { name } => {
                records::show_plan(&cfg, &name).await?;
            }
            PlanAction::Status { name, status } => {
                records::set_plan_status(&cfg, &name, &status).await?;
            }
            PlanAction::Remove { name } => {
                records::remove_plan(&cfg, &name).await?;
            }
        },
        Commands::Tasklist { action } => match action {
            TasklistAction::Add { plan, name } => {
                records::add_task_list(&cfg, &plan, &name).await?;
            }
            TasklistAction::List { plan } => {
                records::list_task_lists(&cfg, &plan).await?;
            }
        },
        Commands::Task { action } => match action {
            TaskAction::Add {
                list_id,
                description,
            } => {
                records::add_task(&cfg, &list_id, &description).await?;
            }
            TaskAction::List { list_id } => {
                records::list_tasks(&cfg, &list_id).await?;
            }
            TaskAction::Status { task_id, status } => {
                records::set_task_status(&cfg, &task_id, &status).await?;
            }
            TaskAction::Result { task_id, summary } => {
                records::add_task_result(&cfg, &task_id, &summary).await?;
            }
            TaskAction::Remove { task_id } => {
                records::remove_task(&cfg, &task_id).await?;
            }
        },
    }

    Ok(())
}

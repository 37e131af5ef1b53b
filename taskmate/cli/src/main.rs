mod render;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use taskmate_core::{
    EmptyList, Priority, PriorityFilters, SortOption, StatusFilters, TaskDraft, TaskId, TaskQuery,
};
use taskmate_store::{FileStorage, StoreConfig, TaskPersistence, TaskStore};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "taskmate", about = "Keep track of what needs doing.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read settings from this TOML file instead of ./taskmate.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the task data
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log what the store is doing
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Create a new task
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Due date, e.g. 2024-05-01 or "2024-05-01 17:00" (defaults to now)
        #[arg(long, value_parser = render::parse_due)]
        due: Option<DateTime<Utc>>,
        #[arg(short, long, value_enum, default_value_t = PriorityArg::Medium)]
        priority: PriorityArg,
    },
    /// Change fields of an existing task
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long, value_parser = render::parse_due)]
        due: Option<DateTime<Utc>>,
        #[arg(short, long, value_enum)]
        priority: Option<PriorityArg>,
    },
    /// Mark a task done, or reopen a done one
    Toggle { id: String },
    /// Remove a task
    Delete { id: String },
    /// Show every detail of a task
    Show { id: String },
    /// List tasks, active ones first
    List {
        /// Only tasks whose title or description contains this text
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long)]
        hide_active: bool,
        #[arg(long)]
        hide_completed: bool,
        /// Only these priorities (repeatable)
        #[arg(short, long = "priority", value_enum)]
        priorities: Vec<PriorityArg>,
        #[arg(long, value_enum, default_value_t = SortArg::Deadline)]
        sort: SortArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PriorityArg {
    High,
    Medium,
    Low,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::High => Priority::High,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::Low => Priority::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortArg {
    Deadline,
    Priority,
    DateCreated,
    Alphabetical,
}

impl From<SortArg> for SortOption {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Deadline => SortOption::Deadline,
            SortArg::Priority => SortOption::Priority,
            SortArg::DateCreated => SortOption::DateCreated,
            SortArg::Alphabetical => SortOption::Alphabetical,
        }
    }
}

type Store = TaskStore<FileStorage>;

fn existing<'a>(store: &'a Store, id: &TaskId) -> anyhow::Result<&'a taskmate_core::Task> {
    store
        .get(id)
        .with_context(|| format!("No task with ID {}", id))
}

fn execute(command: Commands, store: &mut Store) -> anyhow::Result<()> {
    match command {
        Commands::Add {
            title,
            description,
            due,
            priority,
        } => {
            let draft = TaskDraft {
                title,
                description,
                due_date: due.unwrap_or_else(Utc::now),
                priority: priority.into(),
            };
            let id = TaskId::generate();
            store.add_task(draft.into_task(id.clone(), Utc::now())?);
            println!("Task added with ID {}", id);
        }
        Commands::Edit {
            id,
            title,
            description,
            due,
            priority,
        } => {
            let id = TaskId::from(id);
            let task = existing(store, &id)?;
            let mut draft = TaskDraft::from(task);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            if let Some(due) = due {
                draft.due_date = due;
            }
            if let Some(priority) = priority {
                draft.priority = priority.into();
            }
            let edited = draft.apply_to(task)?;
            store.update_task(edited);
            println!("Task {} updated", id);
        }
        Commands::Toggle { id } => {
            let id = TaskId::from(id);
            existing(store, &id)?;
            store.toggle_task_completion(&id);
            let state = match store.get(&id) {
                Some(task) if task.is_completed() => "completed",
                _ => "active",
            };
            println!("Task {} is now {}", id, state);
        }
        Commands::Delete { id } => {
            let id = TaskId::from(id);
            existing(store, &id)?;
            store.delete_task(&id);
            println!("Task {} deleted", id);
        }
        Commands::Show { id } => {
            let task = existing(store, &TaskId::from(id))?;
            println!("{}", render::task_details(task));
        }
        Commands::List {
            search,
            hide_active,
            hide_completed,
            priorities,
            sort,
        } => {
            let priority = if priorities.is_empty() {
                PriorityFilters::default()
            } else {
                let wanted: Vec<Priority> = priorities.into_iter().map(Priority::from).collect();
                PriorityFilters::only(&wanted)
            };
            let query = TaskQuery {
                search,
                status: StatusFilters {
                    active: !hide_active,
                    completed: !hide_completed,
                },
                priority,
                sort: sort.into(),
            };
            let visible = store.query(&query);
            match EmptyList::classify(store.tasks().len(), visible.len()) {
                Some(empty) => {
                    println!("{}", empty.message());
                    println!("{}", empty.hint());
                }
                None => {
                    for task in visible {
                        println!("{}", render::task_line(task));
                    }
                }
            }
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = StoreConfig::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    let persistence = TaskPersistence::with_key(config.file_storage(), config.storage_key.clone());
    let mut store = TaskStore::open(persistence).await;

    let result = execute(cli.command, &mut store);
    store.settle().await;
    result
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let max_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(max_level)
        .init();

    run(cli).await
}

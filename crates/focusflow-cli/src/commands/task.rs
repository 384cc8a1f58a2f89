//! Task list commands for CLI.

use clap::Subcommand;
use focusflow_core::{Database, Task};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task title
        title: String,
    },
    /// List tasks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Flip a task between open and done
    Toggle {
        /// Task ID
        id: String,
    },
    /// Remove a task
    Remove {
        /// Task ID
        id: String,
    },
    /// Remove every task
    Clear,
}

fn parse_id(id: &str) -> Result<Uuid, Box<dyn std::error::Error>> {
    Uuid::parse_str(id.trim()).map_err(|e| format!("invalid task id '{id}': {e}").into())
}

fn print_task(task: &Task) {
    let mark = if task.is_done { "x" } else { " " };
    println!("[{mark}] {}  {}", task.id, task.title);
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        TaskAction::Add { title } => {
            let task = db.add_task(&title)?;
            println!("Task added: {}", task.id);
        }
        TaskAction::List { json } => {
            let tasks = db.list_tasks()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("no tasks");
            } else {
                for task in &tasks {
                    print_task(task);
                }
            }
        }
        TaskAction::Toggle { id } => {
            let task = db.toggle_task(parse_id(&id)?)?;
            print_task(&task);
        }
        TaskAction::Remove { id } => {
            db.remove_task(parse_id(&id)?)?;
            println!("Task removed: {id}");
        }
        TaskAction::Clear => {
            let removed = db.clear_tasks()?;
            println!("{removed} task(s) removed");
        }
    }
    Ok(())
}

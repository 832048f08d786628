use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};

use crate::task::task_controller::DeletePrompt;
use crate::task::task_models::{StatusFilter, Task};

#[derive(Parser)]
#[command(name = "taskdeck", about = "Task tracking from the terminal", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List tasks
    List {
        /// Filter by status: all, pending, in_progress, completed
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Add a new task
    Add {
        title: String,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Toggle a task between completed and pending
    Toggle { id: i64 },
    /// Delete a task
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Log in and store the session
    Login {
        username: String,
        #[arg(long, short)]
        password: String,
    },
    /// Create an account and log in
    Register {
        username: String,
        email: String,
        #[arg(long, short)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
}

/// Asks on stdin before a delete; anything but y/yes declines.
pub struct StdinPrompt;

impl DeletePrompt for StdinPrompt {
    fn confirm(&self, task: &Task) -> bool {
        print!("Delete task {} \"{}\"? [y/N] ", task.id, task.title);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Used by `delete --yes`.
pub struct AssumeYes;

impl DeletePrompt for AssumeYes {
    fn confirm(&self, _task: &Task) -> bool {
        true
    }
}

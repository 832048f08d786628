use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use directories::ProjectDirs;
use prettytable::{format, row, Table};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdeck::auth::{AuthService, LoginRequest, RegisterRequest};
use taskdeck::cli::{AssumeYes, Cli, Command, StdinPrompt};
use taskdeck::config::Config;
use taskdeck::gateway::ApiGateway;
use taskdeck::session::SessionStore;
use taskdeck::task::{Phase, StatusFilter, Task, TaskListController, TaskRepository};

fn session_file() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("TASKDECK_SESSION_FILE") {
        return Ok(PathBuf::from(path));
    }
    let dirs = ProjectDirs::from("io", "taskdeck", "taskdeck")
        .context("could not determine a data directory for the session file")?;
    Ok(dirs.data_dir().join("session.json"))
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(row!["ID", "STATUS", "TITLE", "DESCRIPTION"]);
    for task in tasks {
        table.add_row(row![
            task.id,
            task.status,
            task.title,
            task.description.as_deref().unwrap_or("")
        ]);
    }
    table.printstd();
}

/// Fetch errors land in controller state rather than a Result; lift them
/// back out so the CLI exits non-zero with the normalized message.
fn ensure_ready(controller: &TaskListController) -> anyhow::Result<()> {
    if controller.phase() == Phase::Error {
        anyhow::bail!(controller
            .error()
            .unwrap_or_else(|| "request failed".to_string()));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,taskdeck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let session = Arc::new(SessionStore::open(session_file()?)?);
    let gateway = ApiGateway::new(config.api_url.clone(), session.clone());
    let repository = TaskRepository::new(gateway.clone());
    let controller = TaskListController::new(repository);
    let auth = AuthService::new(gateway, session);

    match cli.command {
        Command::List { status } => {
            controller.fetch(status).await;
            ensure_ready(&controller)?;
            print_tasks(&controller.tasks());
        }
        Command::Add { title, description } => {
            controller.create(title, description).await?;
            ensure_ready(&controller)?;
            print_tasks(&controller.tasks());
        }
        Command::Toggle { id } => {
            controller.fetch(StatusFilter::All).await;
            ensure_ready(&controller)?;
            controller.toggle_completion(id).await?;
            ensure_ready(&controller)?;
            print_tasks(&controller.tasks());
        }
        Command::Delete { id, yes } => {
            controller.fetch(StatusFilter::All).await;
            ensure_ready(&controller)?;
            let deleted = if yes {
                controller.delete(id, &AssumeYes).await?
            } else {
                controller.delete(id, &StdinPrompt).await?
            };
            if deleted {
                ensure_ready(&controller)?;
                println!("Deleted task {id}.");
            } else {
                println!("Aborted.");
            }
        }
        Command::Login { username, password } => {
            let user = auth.login(LoginRequest { username, password }).await?;
            println!("Logged in as {}.", user.username);
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let user = auth
                .register(RegisterRequest {
                    username,
                    email,
                    password,
                })
                .await?;
            println!("Registered {}.", user.username);
        }
        Command::Logout => {
            auth.logout();
            println!("Logged out.");
        }
        Command::Whoami => {
            let user = auth.current_user().await?;
            println!("{} <{}>", user.username, user.email);
        }
    }

    Ok(())
}

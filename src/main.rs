//! # td - Personal Task Manager
//!
//! A command-line task and project manager with due dates, priorities,
//! tags, subtasks and an optional terminal user interface (TUI).
//!
//! ## Key Features
//!
//! - **Tasks with Rich Metadata**: Due dates, priorities, tags, subtasks
//!   and optional project membership
//! - **Projects**: Named groups with an accent colour and icon; task
//!   counts are always derived from the live task list
//! - **Derived Views**: Today, upcoming, per-day calendar and free-text
//!   search, all computed on demand from stored tasks
//! - **Multiple Interfaces**: Full CLI for automation + interactive TUI
//!   with dashboard, calendar and projects screens
//! - **Per-User Local Storage**: One JSON store per user under
//!   `~/.taskdeck/`, with atomic saves and timestamped backups
//! - **One-Way Export**: Snapshot every task to a standalone JSON file
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive UI
//! td ui
//!
//! # Add a task via CLI
//! td add "Write quarterly report" --project work --due "in 3d" --priority high
//!
//! # What's on today, and what's coming up
//! td today
//! td upcoming
//!
//! # Search open tasks
//! td search report
//! ```
//!
//! ## Installation
//!
//! ```bash
//! git clone <repository-url>
//! cd taskdeck
//! cargo install --path .
//! ```
//!
//! Data is stored locally in `~/.taskdeck/` with one JSON file per user.
//! We recommend you source control this folder via `git init` and back it
//! up periodically (`td backup` creates timestamped copies).

use std::path::PathBuf;

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod dates;
pub mod error;
pub mod fields;
pub mod project;
pub mod store;
pub mod task;
pub mod views;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod form;
    pub mod input;
}

use cli::Cli;
use cmd::*;
use store::{store_path_for_user, Store};

fn main() {
    let cli = Cli::parse();

    // Completions need no store at all.
    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    // Resolve the store file: --store wins, otherwise one file per user
    // under ~/.taskdeck/.
    let store_path = cli.store.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let data_dir = PathBuf::from(home).join(".taskdeck");
        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            eprintln!("Failed to create data directory {}: {}", data_dir.display(), e);
            std::process::exit(1);
        }
        let user = cli
            .user
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_default();
        store_path_for_user(&data_dir, &user)
    });

    // Commands that operate on the file directly.
    match &cli.command {
        Commands::Ui => {
            cmd_ui(&store_path);
            return;
        }
        Commands::Backup => {
            cmd_backup(&store_path);
            return;
        }
        _ => {}
    }

    let mut store = Store::load(&store_path);

    match cli.command {
        Commands::Ui | Commands::Backup | Commands::Completions { .. } => {
            unreachable!("handled above")
        }

        Commands::Add { title, desc, project, tags, due, priority, subtasks } =>
            cmd_add(&mut store, &store_path, title, desc, project, tags, due, priority, subtasks),

        Commands::List { all, completed, project, tags, due, search, sort, limit } =>
            cmd_list(&store, all, completed, project, tags, due, search, sort, limit),

        Commands::Today => cmd_today(&store),

        Commands::Upcoming => cmd_upcoming(&store),

        Commands::Day { date } => cmd_day(&store, date),

        Commands::Search { query, all } => cmd_search(&store, query, all),

        Commands::View { id } => cmd_view(&store, id),

        Commands::Update {
            id, title, desc, project, due, priority,
            add_tags, rm_tags, clear_due, clear_project,
        } => cmd_update(&mut store, &store_path, id, title, desc, project, due, priority,
                        add_tags, rm_tags, clear_due, clear_project),

        Commands::Toggle { id } => cmd_toggle(&mut store, &store_path, id),

        Commands::Delete { id } => cmd_delete(&mut store, &store_path, id),

        Commands::Subtask { action } => cmd_subtask(&mut store, &store_path, action),

        Commands::Project { action } => cmd_project(&mut store, &store_path, action),

        Commands::Export { output } => cmd_export(&store, output),

        Commands::Clear { yes } => cmd_clear(&mut store, &store_path, yes),
    }
}

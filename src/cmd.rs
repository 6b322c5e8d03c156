//! Command implementations for the CLI interface.
//!
//! Each handler loads nothing itself: `main` resolves the store path and
//! loads the store, handlers mutate through the gateway and save. Failures
//! print a message naming the action and exit non-zero.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{Local, TimeZone, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use serde::Serialize;

use crate::dates::{format_due_relative, parse_calendar_date, parse_due_input};
use crate::error::Result;
use crate::fields::{AccentColor, DueFilter, Priority, ProjectIcon, SortKey};
use crate::project::ProjectPatch;
use crate::store::Store;
use crate::task::{Task, TaskDraft, TaskPatch};
use crate::tui::app::run_ui;
use crate::views;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive dashboard/calendar/projects UI.
    Ui,

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Project id or name.
        #[arg(long)]
        project: Option<String>,
        /// Tags. May be repeated; accepts comma-separated.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Due date: YYYY-MM-DD [HH:MM], "today", "tomorrow", "in Nd", weekday.
        #[arg(long)]
        due: Option<String>,
        /// Priority: low | medium | high.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Subtask titles. May be repeated.
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
    },

    /// List tasks with optional filters.
    List {
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
        /// Show only completed tasks.
        #[arg(long, conflicts_with = "all")]
        completed: bool,
        /// Filter by project id or name.
        #[arg(long)]
        project: Option<String>,
        /// Filter by tag. May be repeated.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Due bucket: today | upcoming | overdue | none.
        #[arg(long, value_enum)]
        due: Option<DueFilter>,
        /// Free-text filter on title and description.
        #[arg(long)]
        search: Option<String>,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = SortKey::Due)]
        sort: SortKey,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Tasks due today (completed ones included).
    Today,

    /// Incomplete tasks due after today, soonest first.
    Upcoming,

    /// Tasks due on a specific calendar date.
    Day {
        /// Date: YYYY-MM-DD, "today", "tomorrow" or "yesterday".
        date: String,
    },

    /// Search open tasks by title or description.
    Search {
        query: String,
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
    },

    /// View a single task in full, including subtasks.
    View { id: u64 },

    /// Update fields on a task.
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        /// Project id or name.
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Add tags. May be repeated and comma-separated.
        #[arg(long = "add-tag")]
        add_tags: Vec<String>,
        /// Remove tags. May be repeated and comma-separated.
        #[arg(long = "rm-tag")]
        rm_tags: Vec<String>,
        /// Clear the due date.
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
        /// Detach from its project.
        #[arg(long, conflicts_with = "project")]
        clear_project: bool,
    },

    /// Toggle a task's completion.
    Toggle { id: u64 },

    /// Delete a task (its subtasks go with it).
    Delete { id: u64 },

    /// Manage subtasks.
    Subtask {
        #[command(subcommand)]
        action: SubtaskAction,
    },

    /// Manage projects.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Export all tasks to a JSON document.
    Export {
        /// Output file path (default: tasks_export.json).
        #[arg(long, short)]
        output: Option<String>,
    },

    /// Create a timestamped backup of the store file.
    Backup,

    /// Delete every task and project in the store.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SubtaskAction {
    /// Add a subtask to a task.
    Add { task: u64, title: String },
    /// Toggle a subtask's completion.
    Toggle { task: u64, subtask: u64 },
    /// Remove a subtask.
    Rm { task: u64, subtask: u64 },
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project.
    Add {
        name: String,
        #[arg(long, value_enum, default_value_t = AccentColor::Blue)]
        color: AccentColor,
        #[arg(long, value_enum, default_value_t = ProjectIcon::Folder)]
        icon: ProjectIcon,
    },
    /// List projects with task counts.
    List,
    /// Update a project's name, colour or icon.
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_enum)]
        color: Option<AccentColor>,
        #[arg(long, value_enum)]
        icon: Option<ProjectIcon>,
    },
    /// Delete a project and every task in it.
    Delete { id: u64 },
}

/// Bail out with a message naming the failed action.
fn fail(action: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{action}: {err}");
    std::process::exit(1);
}

fn save_or_die(store: &Store, path: &Path) {
    if let Err(e) = store.save(path) {
        fail("failed to save store", e);
    }
}

/// Print tasks in a formatted table.
fn print_table(store: &Store, tasks: &[&Task]) {
    println!(
        "{:<5} {:<4} {:<7} {:<10} {:<14} {}",
        "ID", "Done", "Pri", "Due", "Project", "Title [tags]"
    );
    let today = Local::now().date_naive();
    let names: BTreeMap<u64, &str> = store
        .projects
        .iter()
        .map(|p| (p.id, p.name.as_str()))
        .collect();
    for t in tasks {
        let done = if t.completed { "[x]" } else { "[ ]" };
        let project = t
            .project
            .and_then(|pid| names.get(&pid).copied())
            .unwrap_or("-");
        let tags = if t.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.tags.join(","))
        };
        println!(
            "{:<5} {:<4} {:<7} {:<10} {:<14} {}{}",
            t.id,
            done,
            t.priority.label(),
            format_due_relative(t.due, today),
            truncate(project, 14),
            t.title,
            tags
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

fn resolve_project_arg(store: &Store, ident: Option<&str>) -> Result<Option<u64>> {
    match ident {
        Some(p) => Ok(Some(store.resolve_project(p)?)),
        None => Ok(None),
    }
}

/// Launch the terminal UI.
pub fn cmd_ui(store_path: &Path) {
    if let Err(e) = run_ui(store_path) {
        fail("UI error", e);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    store: &mut Store,
    store_path: &Path,
    title: String,
    desc: Option<String>,
    project: Option<String>,
    tags: Vec<String>,
    due: Option<String>,
    priority: Priority,
    subtasks: Vec<String>,
) {
    let today = Local::now().date_naive();
    let due = match due {
        Some(raw) => match parse_due_input(&raw, today) {
            Some(dt) => Some(dt),
            None => fail(
                "could not add task",
                "unrecognised due date; use YYYY-MM-DD [HH:MM], 'today', 'tomorrow' or 'in Nd'",
            ),
        },
        None => None,
    };
    let project = match resolve_project_arg(store, project.as_deref()) {
        Ok(p) => p,
        Err(e) => fail("could not add task", e),
    };

    let draft = TaskDraft {
        title,
        description: desc,
        due,
        priority,
        tags,
        project,
        subtasks,
    };
    match store.add_task(draft) {
        Ok(id) => {
            save_or_die(store, store_path);
            println!("Added task {id}");
        }
        Err(e) => fail("could not add task", e),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_list(
    store: &Store,
    all: bool,
    completed: bool,
    project: Option<String>,
    tags: Vec<String>,
    due: Option<DueFilter>,
    search: Option<String>,
    sort: SortKey,
    limit: Option<usize>,
) {
    let project = match resolve_project_arg(store, project.as_deref()) {
        Ok(p) => p,
        Err(e) => fail("could not list tasks", e),
    };
    let today = Local::now().date_naive();

    let mut filtered: Vec<&Task> = store
        .tasks
        .iter()
        .filter(|t| {
            if completed {
                if !t.completed {
                    return false;
                }
            } else if !all && t.completed {
                return false;
            }
            if project.is_some() && t.project != project {
                return false;
            }
            if !tags.iter().all(|tag| t.tags.iter().any(|have| have == tag.trim())) {
                return false;
            }
            match due {
                Some(DueFilter::Today) => t.due.is_some_and(|d| d.date() == today),
                Some(DueFilter::Upcoming) => t.due.is_some_and(|d| d.date() > today),
                Some(DueFilter::Overdue) => t.due.is_some_and(|d| d.date() < today),
                Some(DueFilter::None) => t.due.is_none(),
                None => true,
            }
        })
        .collect();

    if let Some(q) = search.as_deref() {
        filtered = views::search(&filtered, q);
    }

    match sort {
        SortKey::Due => {
            filtered.sort_by_key(|t| (t.due.is_none(), t.due, t.created_at_ms, t.id));
        }
        SortKey::Priority => {
            filtered.sort_by_key(|t| (t.priority.rank(), t.id));
        }
        SortKey::Id => filtered.sort_by_key(|t| t.id),
    }
    if let Some(n) = limit {
        filtered.truncate(n);
    }
    print_table(store, &filtered);
}

pub fn cmd_today(store: &Store) {
    let today = Local::now().date_naive();
    print_table(store, &views::due_today(&store.tasks, today));
}

pub fn cmd_upcoming(store: &Store) {
    let today = Local::now().date_naive();
    print_table(store, &views::upcoming(&store.tasks, today));
}

pub fn cmd_day(store: &Store, date: String) {
    let Some(date) = parse_calendar_date(&date) else {
        fail("could not show day", "unrecognised date; use YYYY-MM-DD");
    };
    print_table(store, &views::on_date(&store.tasks, date));
}

pub fn cmd_search(store: &Store, query: String, all: bool) {
    let within: Vec<&Task> = store
        .tasks
        .iter()
        .filter(|t| all || !t.completed)
        .collect();
    print_table(store, &views::search(&within, &query));
}

pub fn cmd_view(store: &Store, id: u64) {
    let Some(task) = store.task(id) else {
        fail("could not view task", format!("task {id} not found"));
    };
    let today = Local::now().date_naive();
    let project = task
        .project
        .and_then(|pid| store.project(pid))
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "-".into());
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Done:         {}", if task.completed { "yes" } else { "no" });
    println!("Priority:     {}", task.priority.label());
    println!("Project:      {project}");
    println!(
        "Due:          {}",
        match task.due {
            Some(d) => format!(
                "{} ({})",
                d.format("%Y-%m-%d %H:%M"),
                format_due_relative(Some(d), today)
            ),
            None => "-".into(),
        }
    );
    println!(
        "Tags:         {}",
        if task.tags.is_empty() { "-".into() } else { task.tags.join(",") }
    );
    println!("Created UTC:  {}", fmt_ms(task.created_at_ms));
    println!("Updated UTC:  {}", fmt_ms(task.updated_at_ms));
    println!(
        "Description:\n{}\n",
        task.description.clone().unwrap_or_else(|| "-".into())
    );
    println!("Subtasks:");
    if task.subtasks.is_empty() {
        println!("  -");
    }
    for s in &task.subtasks {
        println!("  {} [{}] {}", s.id, if s.completed { "x" } else { " " }, s.title);
    }
}

fn fmt_ms(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "-".into())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    store: &mut Store,
    store_path: &Path,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    project: Option<String>,
    due: Option<String>,
    priority: Option<Priority>,
    add_tags: Vec<String>,
    rm_tags: Vec<String>,
    clear_due: bool,
    clear_project: bool,
) {
    let today = Local::now().date_naive();
    let due = if clear_due {
        Some(None)
    } else {
        match due {
            Some(raw) => match parse_due_input(&raw, today) {
                Some(dt) => Some(Some(dt)),
                None => fail(
                    "could not update task",
                    "unrecognised due date; use YYYY-MM-DD [HH:MM], 'today', 'tomorrow' or 'in Nd'",
                ),
            },
            None => None,
        }
    };
    let project = if clear_project {
        Some(None)
    } else {
        match project.as_deref() {
            Some(p) => match store.resolve_project(p) {
                Ok(pid) => Some(Some(pid)),
                Err(e) => fail("could not update task", e),
            },
            None => None,
        }
    };

    let patch = TaskPatch {
        title,
        description: desc.map(Some),
        due,
        priority,
        project,
        completed: None,
        add_tags,
        rm_tags,
    };
    match store.update_task(id, patch) {
        Ok(()) => {
            save_or_die(store, store_path);
            println!("Updated task {id}");
        }
        Err(e) => fail("could not update task", e),
    }
}

pub fn cmd_toggle(store: &mut Store, store_path: &Path, id: u64) {
    match store.toggle_task(id) {
        Ok(done) => {
            save_or_die(store, store_path);
            println!(
                "Task {id} is now {}",
                if done { "complete" } else { "open" }
            );
        }
        Err(e) => fail("could not toggle task", e),
    }
}

pub fn cmd_delete(store: &mut Store, store_path: &Path, id: u64) {
    match store.delete_task(id) {
        Ok(()) => {
            save_or_die(store, store_path);
            println!("Deleted task {id}");
        }
        Err(e) => fail("could not delete task", e),
    }
}

pub fn cmd_subtask(store: &mut Store, store_path: &Path, action: SubtaskAction) {
    match action {
        SubtaskAction::Add { task, title } => match store.add_subtask(task, &title) {
            Ok(id) => {
                save_or_die(store, store_path);
                println!("Added subtask {id} to task {task}");
            }
            Err(e) => fail("could not add subtask", e),
        },
        SubtaskAction::Toggle { task, subtask } => match store.toggle_subtask(task, subtask) {
            Ok(done) => {
                save_or_die(store, store_path);
                println!(
                    "Subtask {subtask} is now {}",
                    if done { "complete" } else { "open" }
                );
            }
            Err(e) => fail("could not toggle subtask", e),
        },
        SubtaskAction::Rm { task, subtask } => match store.remove_subtask(task, subtask) {
            Ok(()) => {
                save_or_die(store, store_path);
                println!("Removed subtask {subtask} from task {task}");
            }
            Err(e) => fail("could not remove subtask", e),
        },
    }
}

pub fn cmd_project(store: &mut Store, store_path: &Path, action: ProjectAction) {
    match action {
        ProjectAction::Add { name, color, icon } => match store.add_project(&name, color, icon) {
            Ok(id) => {
                save_or_die(store, store_path);
                println!("Added project {id}: {name}");
            }
            Err(e) => fail("could not add project", e),
        },
        ProjectAction::List => {
            let counts = views::project_counts(&store.projects, &store.tasks);
            println!("{:<5} {:<3} {:<20} {:<7} {}", "ID", "", "Name", "Active", "Done");
            for p in &store.projects {
                let c = counts.get(&p.id).copied().unwrap_or_default();
                println!(
                    "{:<5} {:<3} {:<20} {:<7} {}",
                    p.id,
                    p.icon.glyph(),
                    truncate(&p.name, 20),
                    c.active,
                    c.completed
                );
            }
        }
        ProjectAction::Update { id, name, color, icon } => {
            let patch = ProjectPatch { name, color, icon };
            match store.update_project(id, patch) {
                Ok(()) => {
                    save_or_die(store, store_path);
                    println!("Updated project {id}");
                }
                Err(e) => fail("could not update project", e),
            }
        }
        ProjectAction::Delete { id } => match store.delete_project(id) {
            Ok(cascaded) => {
                save_or_die(store, store_path);
                println!("Deleted project {id} and {cascaded} task(s)");
            }
            Err(e) => fail("could not delete project", e),
        },
    }
}

#[derive(Serialize)]
struct ExportDoc<'a> {
    exported_at: String,
    count: usize,
    tasks: &'a [Task],
}

/// One-way export: the full task collection plus timestamp and count.
/// There is deliberately no import path.
pub fn cmd_export(store: &Store, output: Option<String>) {
    let output = output.unwrap_or_else(|| "tasks_export.json".to_string());
    let doc = ExportDoc {
        exported_at: Utc::now().to_rfc3339(),
        count: store.tasks.len(),
        tasks: &store.tasks,
    };
    let json = match serde_json::to_string_pretty(&doc) {
        Ok(j) => j,
        Err(e) => fail("could not export tasks", e),
    };
    match fs::write(&output, json) {
        Ok(()) => println!("Exported {} task(s) to {output}", doc.count),
        Err(e) => fail("could not export tasks", e),
    }
}

/// Copy the store file into a timestamped sibling under backup/.
pub fn cmd_backup(store_path: &Path) {
    if !store_path.exists() {
        fail("could not create backup", "store file does not exist yet");
    }
    let parent = store_path.parent().unwrap_or_else(|| Path::new("."));
    let backup_dir = parent.join("backup");
    if let Err(e) = fs::create_dir_all(&backup_dir) {
        fail("could not create backup", e);
    }
    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let file_name = store_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("store.json");
    let backup_path = backup_dir.join(format!("{stamp}_{file_name}"));
    match fs::copy(store_path, &backup_path) {
        Ok(_) => println!("Backup created: {}", backup_path.display()),
        Err(e) => fail("could not create backup", e),
    }
}

/// Wipe the current user's tasks and projects after confirmation.
pub fn cmd_clear(store: &mut Store, store_path: &Path, yes: bool) {
    if !yes {
        print!(
            "Delete all {} task(s) and {} project(s)? Consider 'td export' first. (y/N): ",
            store.tasks.len(),
            store.projects.len()
        );
        use std::io::{self, Write};
        let _ = io::stdout().flush();
        let mut response = String::new();
        if io::stdin().read_line(&mut response).is_err()
            || !response.trim().to_lowercase().starts_with('y')
        {
            println!("Clear cancelled.");
            return;
        }
    }
    store.tasks.clear();
    store.projects.clear();
    save_or_die(store, store_path);
    println!("Store cleared.");
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

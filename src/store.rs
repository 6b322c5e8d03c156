//! The record store: persistence plus the mutation gateway.
//!
//! One JSON document per user holds the task and project collections.
//! All writes go through the gateway methods below, which validate first
//! and only then mutate, so a rejected mutation never leaves a half
//! applied record behind. Reads for display go through `views`, never
//! through mutable access.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fields::{AccentColor, ProjectIcon};
use crate::project::{Project, ProjectPatch};
use crate::task::{clean_tags, SubTask, Task, TaskDraft, TaskPatch};

/// In-memory copy of one user's task and project collections.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Store {
    /// Load the store from a JSON file. A missing file yields an empty
    /// store; a corrupt file yields an empty store with a warning rather
    /// than aborting the session.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Store::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Error parsing store, starting fresh: {e}");
                    Store::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading store, starting fresh: {e}");
                Store::default()
            }
        }
    }

    /// Save atomically: write a temp file, flush, rename over the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Validation(format!("could not serialise store: {e}")))?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    pub fn next_task_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    pub fn next_project_id(&self) -> u64 {
        self.projects.iter().map(|p| p.id).max().unwrap_or(0) + 1
    }

    pub fn task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn task_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn project(&self, id: u64) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Resolve a project given on the command line: a numeric id or an
    /// exact (case-insensitive) name.
    pub fn resolve_project(&self, ident: &str) -> Result<u64> {
        if let Ok(id) = ident.parse::<u64>() {
            return match self.project(id) {
                Some(_) => Ok(id),
                None => Err(Error::ProjectNotFound(id)),
            };
        }
        let needle = ident.to_lowercase();
        let mut matches = self.projects.iter().filter(|p| p.name.to_lowercase() == needle);
        match (matches.next(), matches.next()) {
            (Some(p), None) => Ok(p.id),
            (Some(_), Some(_)) => Err(Error::Validation(format!(
                "multiple projects named '{ident}'; use the id instead"
            ))),
            _ => Err(Error::Validation(format!("no project named '{ident}'"))),
        }
    }

    fn check_project_ref(&self, project: Option<u64>) -> Result<()> {
        match project {
            Some(pid) if self.project(pid).is_none() => Err(Error::ProjectNotFound(pid)),
            _ => Ok(()),
        }
    }

    // ---- task mutations ----

    /// Create a task from a draft. Assigns id and timestamps, cleans tags,
    /// validates the title and the project reference.
    pub fn add_task(&mut self, draft: TaskDraft) -> Result<u64> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("please enter a task title".into()));
        }
        self.check_project_ref(draft.project)?;

        let now = Utc::now().timestamp_millis();
        let id = self.next_task_id();
        let subtasks = draft
            .subtasks
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .enumerate()
            .map(|(i, t)| SubTask {
                id: i as u64 + 1,
                title: t.to_string(),
                completed: false,
            })
            .collect();

        self.tasks.push(Task {
            id,
            title,
            description: draft.description.filter(|d| !d.trim().is_empty()),
            completed: false,
            due: draft.due,
            priority: draft.priority,
            tags: clean_tags(&draft.tags),
            project: draft.project,
            subtasks,
            created_at_ms: now,
            updated_at_ms: now,
        });
        Ok(id)
    }

    /// Merge a partial update into an existing task. Only supplied fields
    /// change; the modification timestamp always bumps.
    pub fn update_task(&mut self, id: u64, patch: TaskPatch) -> Result<()> {
        // Validate against &self before taking the mutable borrow.
        if self.task(id).is_none() {
            return Err(Error::TaskNotFound(id));
        }
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(Error::Validation("please enter a task title".into()));
            }
        }
        if let Some(project) = &patch.project {
            self.check_project_ref(*project)?;
        }

        let rm: Vec<String> = clean_tags(&patch.rm_tags);
        let add: Vec<String> = clean_tags(&patch.add_tags);
        let Some(t) = self.task_mut(id) else {
            return Err(Error::TaskNotFound(id));
        };
        if let Some(title) = patch.title {
            t.title = title.trim().to_string();
        }
        if let Some(desc) = patch.description {
            t.description = desc.filter(|d| !d.trim().is_empty());
        }
        if let Some(due) = patch.due {
            t.due = due;
        }
        if let Some(priority) = patch.priority {
            t.priority = priority;
        }
        if let Some(project) = patch.project {
            t.project = project;
        }
        if let Some(completed) = patch.completed {
            t.completed = completed;
        }
        if !rm.is_empty() {
            t.tags.retain(|tag| !rm.contains(tag));
        }
        for tag in add {
            if !t.tags.contains(&tag) {
                t.tags.push(tag);
            }
        }
        t.touch();
        Ok(())
    }

    /// Flip completion based on the task's current value and return the
    /// new state. Reads before writing so a stale boolean can never
    /// clobber a more recent toggle.
    pub fn toggle_task(&mut self, id: u64) -> Result<bool> {
        let current = self.task(id).ok_or(Error::TaskNotFound(id))?.completed;
        self.update_task(
            id,
            TaskPatch {
                completed: Some(!current),
                ..TaskPatch::default()
            },
        )?;
        Ok(!current)
    }

    /// Remove a task together with its subtasks.
    pub fn delete_task(&mut self, id: u64) -> Result<()> {
        if self.task(id).is_none() {
            return Err(Error::TaskNotFound(id));
        }
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }

    // ---- project mutations ----

    pub fn add_project(&mut self, name: &str, color: AccentColor, icon: ProjectIcon) -> Result<u64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("please enter a project name".into()));
        }
        let id = self.next_project_id();
        self.projects.push(Project {
            id,
            name: name.to_string(),
            color,
            icon,
        });
        Ok(id)
    }

    pub fn update_project(&mut self, id: u64, patch: ProjectPatch) -> Result<()> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(Error::Validation("please enter a project name".into()));
            }
        }
        let p = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(Error::ProjectNotFound(id))?;
        if let Some(name) = patch.name {
            p.name = name.trim().to_string();
        }
        if let Some(color) = patch.color {
            p.color = color;
        }
        if let Some(icon) = patch.icon {
            p.icon = icon;
        }
        Ok(())
    }

    /// Delete a project and every task referencing it (hard cascade, no
    /// orphaning). Returns the number of tasks removed.
    pub fn delete_project(&mut self, id: u64) -> Result<usize> {
        if self.project(id).is_none() {
            return Err(Error::ProjectNotFound(id));
        }
        let before = self.tasks.len();
        self.tasks.retain(|t| t.project != Some(id));
        self.projects.retain(|p| p.id != id);
        Ok(before - self.tasks.len())
    }

    /// Number of tasks a project delete would cascade to.
    pub fn cascade_count(&self, id: u64) -> usize {
        self.tasks.iter().filter(|t| t.project == Some(id)).count()
    }

    // ---- subtask mutations ----

    pub fn add_subtask(&mut self, task_id: u64, title: &str) -> Result<u64> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation("please enter a subtask title".into()));
        }
        let t = self.task_mut(task_id).ok_or(Error::TaskNotFound(task_id))?;
        let id = t.next_subtask_id();
        t.subtasks.push(SubTask {
            id,
            title: title.to_string(),
            completed: false,
        });
        t.touch();
        Ok(id)
    }

    pub fn toggle_subtask(&mut self, task_id: u64, subtask_id: u64) -> Result<bool> {
        let t = self.task_mut(task_id).ok_or(Error::TaskNotFound(task_id))?;
        let s = t
            .subtasks
            .iter_mut()
            .find(|s| s.id == subtask_id)
            .ok_or_else(|| Error::Validation(format!("no subtask {subtask_id} on task {task_id}")))?;
        s.completed = !s.completed;
        let state = s.completed;
        t.touch();
        Ok(state)
    }

    pub fn remove_subtask(&mut self, task_id: u64, subtask_id: u64) -> Result<()> {
        let t = self.task_mut(task_id).ok_or(Error::TaskNotFound(task_id))?;
        let before = t.subtasks.len();
        t.subtasks.retain(|s| s.id != subtask_id);
        if t.subtasks.len() == before {
            return Err(Error::Validation(format!(
                "no subtask {subtask_id} on task {task_id}"
            )));
        }
        t.touch();
        Ok(())
    }
}

/// Convert a user name into a safe store file stem: lowercase
/// alphanumerics with underscores.
pub fn sanitize_user_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Store file for a user inside the data directory, namespaced so two
/// accounts on one machine never share records.
pub fn store_path_for_user(data_dir: &Path, user: &str) -> PathBuf {
    let stem = sanitize_user_name(user);
    let stem = if stem.is_empty() { "default".to_string() } else { stem };
    data_dir.join(format!("{stem}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use chrono::NaiveDate;

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            ..TaskDraft::default()
        }
    }

    #[test]
    fn create_then_read_back_keeps_fields_and_defaults() {
        let mut store = Store::default();
        let id = store
            .add_task(TaskDraft {
                title: "Buy milk".into(),
                priority: Priority::High,
                tags: vec!["errand".into(), "errand".into()],
                ..TaskDraft::default()
            })
            .unwrap();

        let t = store.task(id).unwrap();
        assert_eq!(t.title, "Buy milk");
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.tags, vec!["errand"]);
        assert!(!t.completed);
        assert!(t.subtasks.is_empty());
        assert!(t.created_at_ms > 0);
        assert_eq!(t.created_at_ms, t.updated_at_ms);
    }

    #[test]
    fn empty_title_is_rejected_without_side_effects() {
        let mut store = Store::default();
        let err = store.add_task(draft("   ")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(store.tasks.is_empty());
    }

    #[test]
    fn dangling_project_ref_is_rejected() {
        let mut store = Store::default();
        let mut d = draft("Clean");
        d.project = Some(42);
        assert!(matches!(store.add_task(d), Err(Error::ProjectNotFound(42))));
    }

    #[test]
    fn partial_update_touches_only_supplied_fields() {
        let mut store = Store::default();
        let id = store
            .add_task(TaskDraft {
                title: "Write report".into(),
                description: Some("first pass".into()),
                tags: vec!["work".into()],
                ..TaskDraft::default()
            })
            .unwrap();

        store
            .update_task(
                id,
                TaskPatch {
                    priority: Some(Priority::High),
                    add_tags: vec!["urgent".into()],
                    ..TaskPatch::default()
                },
            )
            .unwrap();

        let t = store.task(id).unwrap();
        assert_eq!(t.title, "Write report");
        assert_eq!(t.description.as_deref(), Some("first pass"));
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.tags, vec!["work", "urgent"]);

        // Clearing is distinct from leaving alone.
        store
            .update_task(
                id,
                TaskPatch {
                    description: Some(None),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert!(store.task(id).unwrap().description.is_none());
    }

    #[test]
    fn update_of_missing_task_reports_not_found() {
        let mut store = Store::default();
        let err = store.update_task(99, TaskPatch::default()).unwrap_err();
        assert!(matches!(err, Error::TaskNotFound(99)));
    }

    #[test]
    fn double_toggle_restores_state_and_bumps_updated_at() {
        let mut store = Store::default();
        let id = store.add_task(draft("Stretch")).unwrap();
        let created = store.task(id).unwrap().updated_at_ms;

        assert!(store.toggle_task(id).unwrap());
        let after_first = store.task(id).unwrap().updated_at_ms;
        assert!(store.task(id).unwrap().completed);
        assert!(after_first > created);

        assert!(!store.toggle_task(id).unwrap());
        let t = store.task(id).unwrap();
        assert!(!t.completed);
        assert!(t.updated_at_ms > after_first);
        assert_eq!(t.title, "Stretch");
        assert_eq!(t.created_at_ms, created);
    }

    #[test]
    fn deleting_a_project_cascades_to_its_tasks() {
        let mut store = Store::default();
        let home = store
            .add_project("Home", AccentColor::Green, ProjectIcon::Home)
            .unwrap();
        let mut d = draft("Clean");
        d.project = Some(home);
        store.add_task(d).unwrap();
        let mut d = draft("Tidy");
        d.project = Some(home);
        store.add_task(d).unwrap();
        store.add_task(draft("Unrelated")).unwrap();

        assert_eq!(store.cascade_count(home), 2);
        let removed = store.delete_project(home).unwrap();
        assert_eq!(removed, 2);
        assert!(store.projects.is_empty());
        assert_eq!(store.tasks.len(), 1);
        assert_eq!(store.tasks[0].title, "Unrelated");
    }

    #[test]
    fn project_scenario_counts_follow_toggles() {
        use crate::views::project_counts;

        let mut store = Store::default();
        let home = store
            .add_project("Home", AccentColor::Blue, ProjectIcon::Home)
            .unwrap();
        let mut d = draft("Clean");
        d.project = Some(home);
        let task = store.add_task(d).unwrap();

        let counts = project_counts(&store.projects, &store.tasks);
        assert_eq!((counts[&home].active, counts[&home].completed), (1, 0));

        store.toggle_task(task).unwrap();
        let counts = project_counts(&store.projects, &store.tasks);
        assert_eq!((counts[&home].active, counts[&home].completed), (0, 1));
    }

    #[test]
    fn subtasks_live_and_die_with_their_task() {
        let mut store = Store::default();
        let id = store.add_task(draft("Pack")).unwrap();
        let s1 = store.add_subtask(id, "Socks").unwrap();
        let s2 = store.add_subtask(id, "Charger").unwrap();
        assert_eq!((s1, s2), (1, 2));

        assert!(store.toggle_subtask(id, s1).unwrap());
        store.remove_subtask(id, s2).unwrap();
        assert_eq!(store.task(id).unwrap().subtasks.len(), 1);

        store.delete_task(id).unwrap();
        assert!(store.task(id).is_none());
    }

    #[test]
    fn resolve_project_by_name_and_id() {
        let mut store = Store::default();
        let id = store
            .add_project("Side Quest", AccentColor::Purple, ProjectIcon::Star)
            .unwrap();
        assert_eq!(store.resolve_project("side quest").unwrap(), id);
        assert_eq!(store.resolve_project(&id.to_string()).unwrap(), id);
        assert!(store.resolve_project("missing").is_err());
    }

    #[test]
    fn save_and_load_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alice.json");

        let mut store = Store::default();
        let home = store
            .add_project("Home", AccentColor::Red, ProjectIcon::Heart)
            .unwrap();
        let mut d = draft("Water plants");
        d.project = Some(home);
        d.due = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap().and_hms_opt(8, 0, 0);
        d.tags = vec!["garden".into()];
        store.add_task(d).unwrap();
        store.save(&path).unwrap();

        let loaded = Store::load(&path);
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.projects.len(), 1);
        let t = &loaded.tasks[0];
        assert_eq!(t.title, "Water plants");
        assert_eq!(t.project, Some(home));
        assert_eq!(t.due, store.tasks[0].due);
        assert_eq!(t.tags, vec!["garden"]);
    }

    #[test]
    fn corrupt_store_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = Store::load(&path);
        assert!(store.tasks.is_empty() && store.projects.is_empty());
    }

    #[test]
    fn user_names_become_safe_file_stems() {
        assert_eq!(sanitize_user_name("Alice Smith"), "alice_smith");
        assert_eq!(sanitize_user_name("bob@laptop!"), "bob_laptop");
        let p = store_path_for_user(Path::new("/data"), "");
        assert_eq!(p, PathBuf::from("/data/default.json"));
    }
}

//! Derived, read-only views over the task and project collections.
//!
//! Everything here is a pure function: the caller passes the loaded
//! collections and the current date, and gets back borrowed subsets or
//! summaries. Nothing mutates, nothing touches the clock or the disk, so
//! these are safe to recompute on every frame and trivial to test.
//!
//! Records that cannot match (no due date, missing optional fields) are
//! omitted rather than treated as errors; one odd record never blanks a
//! whole view.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::project::Project;
use crate::task::Task;

/// Active/completed task tallies for one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectCounts {
    pub active: usize,
    pub completed: usize,
}

/// Tasks belonging to the given project, or project-less tasks when
/// `project` is `None`. Input order is preserved.
pub fn by_project(tasks: &[Task], project: Option<u64>) -> Vec<&Task> {
    tasks.iter().filter(|t| t.project == project).collect()
}

/// Tasks due on `today` in local time. Undated tasks are excluded;
/// completed tasks are included, since today-ness is independent of
/// completion.
pub fn due_today(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    on_date(tasks, today)
}

/// Incomplete tasks due strictly after the end of today, ascending by due
/// date. Equal due dates order by creation time, then id.
pub fn upcoming(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    let mut out: Vec<&Task> = tasks
        .iter()
        .filter(|t| !t.completed)
        .filter(|t| t.due.is_some_and(|d| d.date() > today))
        .collect();
    out.sort_by_key(|t| (t.due, t.created_at_ms, t.id));
    out
}

/// Tasks whose due date falls on the given calendar day, time of day
/// ignored.
pub fn on_date(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.due.is_some_and(|d| d.date() == date))
        .collect()
}

/// Case-insensitive substring match on title or description, over any
/// previously derived subset.
pub fn search<'a>(within: &[&'a Task], query: &str) -> Vec<&'a Task> {
    let needle = query.to_lowercase();
    within
        .iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&needle)
                || t.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .copied()
        .collect()
}

/// Per-project active and completed counts. Projects with no tasks report
/// zero for both.
pub fn project_counts(projects: &[Project], tasks: &[Task]) -> BTreeMap<u64, ProjectCounts> {
    let mut counts: BTreeMap<u64, ProjectCounts> =
        projects.iter().map(|p| (p.id, ProjectCounts::default())).collect();
    for t in tasks {
        let Some(entry) = t.project.and_then(|pid| counts.get_mut(&pid)) else {
            continue;
        };
        if t.completed {
            entry.completed += 1;
        } else {
            entry.active += 1;
        }
    }
    counts
}

/// Number of incomplete tasks.
pub fn remaining(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| !t.completed).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{AccentColor, Priority, ProjectIcon};
    use chrono::{Duration, NaiveDateTime};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 20).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    fn task(id: u64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: None,
            completed: false,
            due: None,
            priority: Priority::Medium,
            tags: Vec::new(),
            project: None,
            subtasks: Vec::new(),
            created_at_ms: id as i64,
            updated_at_ms: id as i64,
        }
    }

    fn project(id: u64, name: &str) -> Project {
        Project {
            id,
            name: name.to_string(),
            color: AccentColor::Blue,
            icon: ProjectIcon::Folder,
        }
    }

    #[test]
    fn by_project_buckets_on_id_and_none() {
        let mut a = task(1, "a");
        a.project = Some(7);
        let b = task(2, "b");
        let tasks = vec![a, b];

        let in_seven = by_project(&tasks, Some(7));
        assert_eq!(in_seven.len(), 1);
        assert_eq!(in_seven[0].id, 1);

        let loose = by_project(&tasks, None);
        assert_eq!(loose.len(), 1);
        assert_eq!(loose[0].id, 2);
    }

    #[test]
    fn due_today_matches_calendar_day_only() {
        let mut late_tonight = task(1, "tonight");
        late_tonight.due = Some(at(today(), 23, 59));
        let mut done_today = task(2, "done");
        done_today.due = Some(at(today(), 9, 0));
        done_today.completed = true;
        let mut tomorrow = task(3, "tomorrow");
        tomorrow.due = Some(at(today() + Duration::days(1), 0, 0));
        let undated = task(4, "undated");
        let tasks = vec![late_tonight, done_today, tomorrow, undated];

        let hits = due_today(&tasks, today());
        let ids: Vec<u64> = hits.iter().map(|t| t.id).collect();
        // 23:59 today is still today; completion does not exclude; the
        // next midnight and undated tasks are out.
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn upcoming_excludes_completed_and_today_and_sorts() {
        let d1 = today() + Duration::days(1);
        let d3 = today() + Duration::days(3);

        let mut later = task(1, "later");
        later.due = Some(at(d3, 0, 0));
        let mut sooner = task(2, "sooner");
        sooner.due = Some(at(d1, 0, 0));
        let mut done = task(3, "done");
        done.due = Some(at(d1, 0, 0));
        done.completed = true;
        let mut still_today = task(4, "today");
        still_today.due = Some(at(today(), 23, 59));
        let undated = task(5, "undated");
        let tasks = vec![later, sooner, done, still_today, undated];

        let ids: Vec<u64> = upcoming(&tasks, today()).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn upcoming_ties_break_on_creation_then_id() {
        let d = at(today() + Duration::days(2), 12, 0);
        let mut a = task(10, "a");
        a.due = Some(d);
        a.created_at_ms = 500;
        let mut b = task(3, "b");
        b.due = Some(d);
        b.created_at_ms = 100;
        let mut c = task(4, "c");
        c.due = Some(d);
        c.created_at_ms = 100;
        let tasks = vec![a, b, c];

        let ids: Vec<u64> = upcoming(&tasks, today()).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 4, 10]);
    }

    #[test]
    fn on_date_ignores_time_of_day() {
        let date = NaiveDate::from_ymd_opt(2026, 9, 14).unwrap();
        let mut morning = task(1, "m");
        morning.due = Some(at(date, 8, 0));
        let mut evening = task(2, "e");
        evening.due = Some(at(date, 22, 30));
        let mut other = task(3, "o");
        other.due = Some(at(date + Duration::days(1), 8, 0));
        let tasks = vec![morning, evening, other];

        let ids: Vec<u64> = on_date(&tasks, date).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let milk = task(1, "Buy milk");
        let dog = task(2, "Walk dog");
        let mut note = task(3, "Errands");
        note.description = Some("pick up MILK on the way".to_string());
        let tasks = vec![milk, dog, note];

        let all: Vec<&Task> = tasks.iter().collect();
        let ids: Vec<u64> = search(&all, "milk").iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn search_composes_over_derived_subsets() {
        let mut due_milk = task(1, "Buy milk");
        due_milk.due = Some(at(today(), 10, 0));
        let undated_milk = task(2, "More milk");
        let tasks = vec![due_milk, undated_milk];

        let todays = due_today(&tasks, today());
        let ids: Vec<u64> = search(&todays, "milk").iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn project_counts_reports_zeroes_for_empty_projects() {
        let projects = vec![project(1, "Home"), project(2, "Idle")];
        let mut clean = task(1, "Clean");
        clean.project = Some(1);
        let mut shopped = task(2, "Shop");
        shopped.project = Some(1);
        shopped.completed = true;
        let stray = task(3, "Stray");
        let tasks = vec![clean, shopped, stray];

        let counts = project_counts(&projects, &tasks);
        assert_eq!(counts[&1], ProjectCounts { active: 1, completed: 1 });
        assert_eq!(counts[&2], ProjectCounts { active: 0, completed: 0 });
        assert_eq!(remaining(&tasks), 2);
    }
}

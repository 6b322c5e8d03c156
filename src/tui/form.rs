//! Modal form state for adding and editing records in the TUI.
//!
//! Text fields are `InputField`s; priority, project, colour and icon are
//! cycled selectors. Field order matches the rendered layout.

use crate::fields::{AccentColor, Priority, ProjectIcon};
use crate::project::Project;
use crate::task::Task;
use crate::tui::input::InputField;

/// Form for creating or editing a task.
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    pub tags: InputField,
    /// Index into `priorities`.
    pub priority: usize,
    /// Index into the project selector; 0 means "no project".
    pub project: usize,
    pub current_field: usize,
    pub priorities: Vec<Priority>,
    /// (id, name) of selectable projects, with a leading None slot.
    pub project_choices: Vec<(Option<u64>, String)>,
    /// Task being edited, if any.
    pub editing: Option<u64>,
}

pub const TASK_FORM_FIELDS: usize = 6;
const TITLE: usize = 0;
const DESCRIPTION: usize = 1;
const DUE: usize = 2;
const TAGS: usize = 3;
const PRIORITY: usize = 4;
const PROJECT: usize = 5;

impl TaskForm {
    pub fn new(projects: &[Project]) -> Self {
        let mut project_choices = vec![(None, "(none)".to_string())];
        project_choices.extend(projects.iter().map(|p| (Some(p.id), p.name.clone())));
        let mut form = Self {
            title: InputField::new(),
            description: InputField::new(),
            due: InputField::new(),
            tags: InputField::new(),
            priority: 1, // Medium
            project: 0,
            current_field: TITLE,
            priorities: vec![Priority::Low, Priority::Medium, Priority::High],
            project_choices,
            editing: None,
        };
        form.update_active_field();
        form
    }

    /// Pre-populate from an existing task for editing.
    pub fn from_task(task: &Task, projects: &[Project]) -> Self {
        let mut form = Self::new(projects);
        form.editing = Some(task.id);
        form.title = InputField::with_value(&task.title);
        form.description = InputField::with_value(task.description.as_deref().unwrap_or(""));
        form.due = InputField::with_value(
            &task
                .due
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        );
        form.tags = InputField::with_value(&task.tags.join(","));
        form.priority = form
            .priorities
            .iter()
            .position(|&p| p == task.priority)
            .unwrap_or(1);
        form.project = form
            .project_choices
            .iter()
            .position(|(id, _)| *id == task.project)
            .unwrap_or(0);
        form.update_active_field();
        form
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % TASK_FORM_FIELDS;
        self.update_active_field();
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + TASK_FORM_FIELDS - 1) % TASK_FORM_FIELDS;
        self.update_active_field();
    }

    fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE;
        self.description.active = self.current_field == DESCRIPTION;
        self.due.active = self.current_field == DUE;
        self.tags.active = self.current_field == TAGS;
    }

    fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE => Some(&mut self.title),
            DESCRIPTION => Some(&mut self.description),
            DUE => Some(&mut self.due),
            TAGS => Some(&mut self.tags),
            _ => None,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.active_input() {
            field.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.active_input() {
            field.handle_backspace();
        }
    }

    /// Left/right moves the cursor in text fields and cycles selectors.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            PRIORITY => self.priority = cycle(self.priority, self.priorities.len(), right),
            PROJECT => self.project = cycle(self.project, self.project_choices.len(), right),
            _ => {
                if let Some(field) = self.active_input() {
                    if right {
                        field.move_cursor_right();
                    } else {
                        field.move_cursor_left();
                    }
                }
            }
        }
    }

    pub fn selected_priority(&self) -> Priority {
        self.priorities[self.priority]
    }

    pub fn selected_project(&self) -> Option<u64> {
        self.project_choices[self.project].0
    }

    pub fn selected_project_name(&self) -> &str {
        &self.project_choices[self.project].1
    }
}

/// Form for creating a project.
pub struct ProjectForm {
    pub name: InputField,
    pub color: usize,
    pub icon: usize,
    pub current_field: usize,
    pub colors: Vec<AccentColor>,
    pub icons: Vec<ProjectIcon>,
}

pub const PROJECT_FORM_FIELDS: usize = 3;
const NAME: usize = 0;
const COLOR: usize = 1;
const ICON: usize = 2;

impl ProjectForm {
    pub fn new() -> Self {
        let mut name = InputField::new();
        name.active = true;
        Self {
            name,
            color: 0,
            icon: 0,
            current_field: NAME,
            colors: vec![
                AccentColor::Blue,
                AccentColor::Green,
                AccentColor::Red,
                AccentColor::Yellow,
                AccentColor::Purple,
                AccentColor::Cyan,
                AccentColor::Magenta,
                AccentColor::Gray,
            ],
            icons: vec![
                ProjectIcon::Folder,
                ProjectIcon::Home,
                ProjectIcon::Briefcase,
                ProjectIcon::Heart,
                ProjectIcon::Star,
                ProjectIcon::Book,
                ProjectIcon::Cart,
                ProjectIcon::Plane,
            ],
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % PROJECT_FORM_FIELDS;
        self.name.active = self.current_field == NAME;
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + PROJECT_FORM_FIELDS - 1) % PROJECT_FORM_FIELDS;
        self.name.active = self.current_field == NAME;
    }

    pub fn handle_char(&mut self, c: char) {
        if self.current_field == NAME {
            self.name.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if self.current_field == NAME {
            self.name.handle_backspace();
        }
    }

    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            NAME => {
                if right {
                    self.name.move_cursor_right();
                } else {
                    self.name.move_cursor_left();
                }
            }
            COLOR => self.color = cycle(self.color, self.colors.len(), right),
            ICON => self.icon = cycle(self.icon, self.icons.len(), right),
            _ => {}
        }
    }

    pub fn selected_color(&self) -> AccentColor {
        self.colors[self.color]
    }

    pub fn selected_icon(&self) -> ProjectIcon {
        self.icons[self.icon]
    }
}

fn cycle(current: usize, len: usize, forward: bool) -> usize {
    if forward {
        (current + 1) % len
    } else {
        (current + len - 1) % len
    }
}

//! Terminal user interface: dashboard, calendar and projects screens.
//!
//! The UI is a thin event loop over the same store and derivation layer
//! the CLI uses: every frame re-derives its views from the in-memory
//! collections, and every mutation goes through the gateway followed by a
//! save. Validation failures land in the status bar and leave form
//! contents untouched so nothing the user typed is lost.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, Duration as ChronoDuration, Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};

use crate::dates::{format_due_relative, parse_due_input};
use crate::fields::Priority;
use crate::store::Store;
use crate::task::{clean_tags, Task, TaskDraft, TaskPatch};
use crate::tui::colors::{BUSY_GOLD, DIM_GRAY, TODAY_GREEN, URGENT_RED};
use crate::tui::form::{ProjectForm, TaskForm};
use crate::views;

/// Set up the terminal, run the app, restore the terminal.
pub fn run_ui(store_path: &Path) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store_path);
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Dashboard,
    Calendar,
    Projects,
}

/// What keyboard input currently drives.
#[derive(Clone, Copy)]
enum Mode {
    Normal,
    Search,
    TaskForm,
    ProjectForm,
    ConfirmDeleteTask(u64),
    ConfirmDeleteProject(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterTab {
    All,
    Today,
    Upcoming,
    Completed,
}

impl FilterTab {
    const ORDER: [FilterTab; 4] = [
        FilterTab::All,
        FilterTab::Today,
        FilterTab::Upcoming,
        FilterTab::Completed,
    ];

    fn label(self) -> &'static str {
        match self {
            FilterTab::All => "All",
            FilterTab::Today => "Today",
            FilterTab::Upcoming => "Upcoming",
            FilterTab::Completed => "Completed",
        }
    }

    fn next(self) -> Self {
        let i = Self::ORDER.iter().position(|&t| t == self).unwrap_or(0);
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        let i = Self::ORDER.iter().position(|&t| t == self).unwrap_or(0);
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Main application state for the terminal user interface.
pub struct App {
    store: Store,
    store_path: PathBuf,
    screen: Screen,
    mode: Mode,
    tab: FilterTab,
    search: crate::tui::input::InputField,
    table_state: TableState,
    /// Ids of the tasks currently listed on the dashboard.
    visible: Vec<u64>,
    selected_day: NaiveDate,
    project_state: ListState,
    task_form: TaskForm,
    project_form: ProjectForm,
    status: String,
    should_exit: bool,
}

impl App {
    pub fn new(store_path: &Path) -> Self {
        let store = Store::load(store_path);
        let task_form = TaskForm::new(&store.projects);
        let mut app = App {
            store,
            store_path: store_path.to_path_buf(),
            screen: Screen::Dashboard,
            mode: Mode::Normal,
            tab: FilterTab::All,
            search: crate::tui::input::InputField::new(),
            table_state: TableState::default(),
            visible: Vec::new(),
            selected_day: Local::now().date_naive(),
            project_state: ListState::default(),
            task_form,
            project_form: ProjectForm::new(),
            status: String::new(),
            should_exit: false,
        };
        app.refresh();
        app
    }

    /// Main event loop.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;
            self.handle_input()?;
            if self.should_exit {
                break;
            }
        }
        Ok(())
    }

    /// Recompute the dashboard's visible task ids from the current tab
    /// and search query, keeping the selection on the same task when it
    /// survives the refresh.
    fn refresh(&mut self) {
        let previous = self
            .table_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .copied();

        let today = Local::now().date_naive();
        let subset: Vec<&Task> = match self.tab {
            FilterTab::All => self.store.tasks.iter().collect(),
            FilterTab::Today => views::due_today(&self.store.tasks, today),
            FilterTab::Upcoming => views::upcoming(&self.store.tasks, today),
            FilterTab::Completed => self.store.tasks.iter().filter(|t| t.completed).collect(),
        };
        let subset = if self.search.is_empty() {
            subset
        } else {
            views::search(&subset, self.search.value.trim())
        };
        self.visible = subset.iter().map(|t| t.id).collect();

        let selected = previous
            .and_then(|id| self.visible.iter().position(|&v| v == id))
            .or(if self.visible.is_empty() { None } else { Some(0) });
        self.table_state.select(selected);

        if self.project_state.selected().is_none() && !self.store.projects.is_empty() {
            self.project_state.select(Some(0));
        }
    }

    fn selected_task_id(&self) -> Option<u64> {
        self.table_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .copied()
    }

    fn selected_project_id(&self) -> Option<u64> {
        self.project_state
            .selected()
            .and_then(|i| self.store.projects.get(i))
            .map(|p| p.id)
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.store_path) {
            self.status = format!("failed to save store: {e}");
        }
    }

    // ---- input ----

    fn handle_input(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(());
                }
                self.status.clear();
                match self.mode {
                    Mode::Normal => self.handle_normal(key.code),
                    Mode::Search => self.handle_search(key.code),
                    Mode::TaskForm => self.handle_task_form(key.code),
                    Mode::ProjectForm => self.handle_project_form(key.code),
                    Mode::ConfirmDeleteTask(id) => self.handle_confirm_task(key.code, id),
                    Mode::ConfirmDeleteProject(id) => self.handle_confirm_project(key.code, id),
                }
            }
        }
        Ok(())
    }

    fn handle_normal(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_exit = true,
            KeyCode::Tab => {
                self.screen = match self.screen {
                    Screen::Dashboard => Screen::Calendar,
                    Screen::Calendar => Screen::Projects,
                    Screen::Projects => Screen::Dashboard,
                };
            }
            KeyCode::Char('1') => self.screen = Screen::Dashboard,
            KeyCode::Char('2') => self.screen = Screen::Calendar,
            KeyCode::Char('3') => self.screen = Screen::Projects,
            _ => match self.screen {
                Screen::Dashboard => self.handle_dashboard(key),
                Screen::Calendar => self.handle_calendar(key),
                Screen::Projects => self.handle_projects(key),
            },
        }
    }

    fn handle_dashboard(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Left => {
                self.tab = self.tab.prev();
                self.refresh();
            }
            KeyCode::Right => {
                self.tab = self.tab.next();
                self.refresh();
            }
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
                self.search.active = true;
            }
            KeyCode::Char('a') => {
                self.task_form = TaskForm::new(&self.store.projects);
                self.mode = Mode::TaskForm;
            }
            KeyCode::Char('e') => {
                if let Some(task) = self.selected_task_id().and_then(|id| self.store.task(id)) {
                    self.task_form = TaskForm::from_task(task, &self.store.projects);
                    self.mode = Mode::TaskForm;
                }
            }
            KeyCode::Char('x') | KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(id) = self.selected_task_id() {
                    match self.store.toggle_task(id) {
                        Ok(_) => {
                            self.persist();
                            self.refresh();
                        }
                        Err(e) => self.status = format!("could not toggle task: {e}"),
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_task_id() {
                    self.mode = Mode::ConfirmDeleteTask(id);
                }
            }
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: i64) {
        if self.visible.is_empty() {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as i64;
        let max = self.visible.len() as i64 - 1;
        let next = (current + delta).clamp(0, max);
        self.table_state.select(Some(next as usize));
    }

    fn handle_calendar(&mut self, key: KeyCode) {
        match key {
            KeyCode::Left => self.selected_day -= ChronoDuration::days(1),
            KeyCode::Right => self.selected_day += ChronoDuration::days(1),
            KeyCode::Up => self.selected_day -= ChronoDuration::days(7),
            KeyCode::Down => self.selected_day += ChronoDuration::days(7),
            KeyCode::Char('[') => self.selected_day = shift_month(self.selected_day, -1),
            KeyCode::Char(']') => self.selected_day = shift_month(self.selected_day, 1),
            KeyCode::Char('t') => self.selected_day = Local::now().date_naive(),
            _ => {}
        }
    }

    fn handle_projects(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => {
                if let Some(i) = self.project_state.selected() {
                    if i > 0 {
                        self.project_state.select(Some(i - 1));
                    }
                }
            }
            KeyCode::Down => {
                if let Some(i) = self.project_state.selected() {
                    if i + 1 < self.store.projects.len() {
                        self.project_state.select(Some(i + 1));
                    }
                }
            }
            KeyCode::Char('a') => {
                self.project_form = ProjectForm::new();
                self.mode = Mode::ProjectForm;
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_project_id() {
                    self.mode = Mode::ConfirmDeleteProject(id);
                }
            }
            _ => {}
        }
    }

    fn handle_search(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.search.clear();
                self.search.active = false;
                self.mode = Mode::Normal;
                self.refresh();
            }
            KeyCode::Enter => {
                self.search.active = false;
                self.mode = Mode::Normal;
            }
            KeyCode::Backspace => {
                self.search.handle_backspace();
                self.refresh();
            }
            KeyCode::Left => self.search.move_cursor_left(),
            KeyCode::Right => self.search.move_cursor_right(),
            KeyCode::Char(c) => {
                self.search.handle_char(c);
                self.refresh();
            }
            _ => {}
        }
    }

    fn handle_task_form(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Enter => self.submit_task_form(),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
    }

    /// Validate and apply the task form. On failure the form stays open
    /// and populated, with the reason in the status bar.
    fn submit_task_form(&mut self) {
        let today = Local::now().date_naive();
        let due = if self.task_form.due.is_empty() {
            None
        } else {
            match parse_due_input(&self.task_form.due.value, today) {
                Some(dt) => Some(dt),
                None => {
                    self.status =
                        "unrecognised due date; use YYYY-MM-DD [HH:MM], 'today' or 'in Nd'".into();
                    return;
                }
            }
        };
        let description = if self.task_form.description.is_empty() {
            None
        } else {
            Some(self.task_form.description.value.trim().to_string())
        };
        let tags = clean_tags([self.task_form.tags.value.as_str()]);

        let result = match self.task_form.editing {
            None => self
                .store
                .add_task(TaskDraft {
                    title: self.task_form.title.value.clone(),
                    description,
                    due,
                    priority: self.task_form.selected_priority(),
                    tags,
                    project: self.task_form.selected_project(),
                    subtasks: Vec::new(),
                })
                .map(|_| ()),
            Some(id) => {
                let old_tags = self
                    .store
                    .task(id)
                    .map(|t| t.tags.clone())
                    .unwrap_or_default();
                let add_tags: Vec<String> =
                    tags.iter().filter(|t| !old_tags.contains(t)).cloned().collect();
                let rm_tags: Vec<String> =
                    old_tags.iter().filter(|t| !tags.contains(t)).cloned().collect();
                self.store.update_task(
                    id,
                    TaskPatch {
                        title: Some(self.task_form.title.value.clone()),
                        description: Some(description),
                        due: Some(due),
                        priority: Some(self.task_form.selected_priority()),
                        project: Some(self.task_form.selected_project()),
                        completed: None,
                        add_tags,
                        rm_tags,
                    },
                )
            }
        };

        match result {
            Ok(()) => {
                self.persist();
                self.mode = Mode::Normal;
                self.refresh();
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn handle_project_form(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Tab | KeyCode::Down => self.project_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.project_form.prev_field(),
            KeyCode::Left => self.project_form.handle_left_right(false),
            KeyCode::Right => self.project_form.handle_left_right(true),
            KeyCode::Backspace => self.project_form.handle_backspace(),
            KeyCode::Enter => {
                let result = self.store.add_project(
                    &self.project_form.name.value,
                    self.project_form.selected_color(),
                    self.project_form.selected_icon(),
                );
                match result {
                    Ok(_) => {
                        self.persist();
                        self.mode = Mode::Normal;
                        self.refresh();
                    }
                    Err(e) => self.status = e.to_string(),
                }
            }
            KeyCode::Char(c) => self.project_form.handle_char(c),
            _ => {}
        }
    }

    fn handle_confirm_task(&mut self, key: KeyCode, id: u64) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.store.delete_task(id) {
                    Ok(()) => {
                        self.persist();
                        self.refresh();
                    }
                    Err(e) => self.status = format!("could not delete task: {e}"),
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.mode = Mode::Normal,
            _ => {}
        }
    }

    fn handle_confirm_project(&mut self, key: KeyCode, id: u64) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.store.delete_project(id) {
                    Ok(cascaded) => {
                        self.persist();
                        self.project_state.select(None);
                        self.refresh();
                        self.status = format!("deleted project and {cascaded} task(s)");
                    }
                    Err(e) => self.status = format!("could not delete project: {e}"),
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.mode = Mode::Normal,
            _ => {}
        }
    }

    // ---- rendering ----

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_screen_tabs(f, chunks[0]);
        match self.screen {
            Screen::Dashboard => self.render_dashboard(f, chunks[1]),
            Screen::Calendar => self.render_calendar(f, chunks[1]),
            Screen::Projects => self.render_projects(f, chunks[1]),
        }
        self.render_status_bar(f, chunks[2]);

        match self.mode {
            Mode::TaskForm => self.render_task_form(f),
            Mode::ProjectForm => self.render_project_form(f),
            Mode::ConfirmDeleteTask(id) => self.render_confirm_task(f, id),
            Mode::ConfirmDeleteProject(id) => self.render_confirm_project(f, id),
            _ => {}
        }
    }

    fn render_screen_tabs(&self, f: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for (i, (screen, label)) in [
            (Screen::Dashboard, "1 Dashboard"),
            (Screen::Calendar, "2 Calendar"),
            (Screen::Projects, "3 Projects"),
        ]
        .iter()
        .enumerate()
        {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            let style = if *screen == self.screen {
                Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {label} "), style));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_dashboard(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        let remaining = views::remaining(&self.store.tasks);
        let header = Paragraph::new(format!("You have {remaining} task(s) remaining."))
            .style(Style::default().add_modifier(Modifier::BOLD));
        f.render_widget(header, chunks[0]);

        // Filter tabs with live counts.
        let today = Local::now().date_naive();
        let mut spans = Vec::new();
        for tab in FilterTab::ORDER {
            let count = match tab {
                FilterTab::All => self.store.tasks.len(),
                FilterTab::Today => views::due_today(&self.store.tasks, today).len(),
                FilterTab::Upcoming => views::upcoming(&self.store.tasks, today).len(),
                FilterTab::Completed => {
                    self.store.tasks.iter().filter(|t| t.completed).count()
                }
            };
            let style = if tab == self.tab {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {} ({count}) ", tab.label()), style));
            spans.push(Span::raw(" "));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);

        let search_style = if self.search.active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let search_line = Paragraph::new(format!("Search: {}", self.search.value))
            .style(search_style);
        f.render_widget(search_line, chunks[2]);
        if self.search.active {
            f.set_cursor_position((
                chunks[2].x + 8 + self.search.cursor as u16,
                chunks[2].y,
            ));
        }

        let rows: Vec<Row> = self
            .visible
            .iter()
            .filter_map(|id| self.store.task(*id))
            .map(|t| {
                let project = t
                    .project
                    .and_then(|pid| self.store.project(pid))
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "-".into());
                let tags = if t.tags.is_empty() {
                    String::new()
                } else {
                    t.tags.join(",")
                };
                let base = if t.completed {
                    Style::default().fg(DIM_GRAY).add_modifier(Modifier::CROSSED_OUT)
                } else if t.priority == Priority::High {
                    Style::default().fg(URGENT_RED)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(if t.completed { "[x]" } else { "[ ]" }),
                    Cell::from(t.priority.label()),
                    Cell::from(format_due_relative(t.due, today)),
                    Cell::from(t.title.clone()),
                    Cell::from(project),
                    Cell::from(tags),
                ])
                .style(base)
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Length(7),
                Constraint::Length(10),
                Constraint::Min(20),
                Constraint::Length(14),
                Constraint::Length(18),
            ],
        )
        .header(
            Row::new(vec!["", "Pri", "Due", "Title", "Project", "Tags"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title("Tasks"))
        .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
        .highlight_symbol("► ");

        f.render_stateful_widget(table, chunks[3], &mut self.table_state);
    }

    fn render_calendar(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(40), Constraint::Min(0)])
            .split(area);

        let grid = self.month_grid();
        let calendar = Paragraph::new(grid)
            .block(Block::default().borders(Borders::ALL).title("Calendar"))
            .alignment(Alignment::Left);
        f.render_widget(calendar, chunks[0]);

        let day_tasks = views::on_date(&self.store.tasks, self.selected_day);
        let items: Vec<ListItem> = if day_tasks.is_empty() {
            vec![ListItem::new("  no tasks due")]
        } else {
            day_tasks
                .iter()
                .map(|t| {
                    let marker = if t.completed { "[x]" } else { "[ ]" };
                    let time = t
                        .due
                        .map(|d| d.format("%H:%M").to_string())
                        .unwrap_or_default();
                    ListItem::new(format!("  {marker} {time}  {}", t.title))
                })
                .collect()
        };
        let title = format!("Due {}", self.selected_day.format("%A %-d %B %Y"));
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(list, chunks[1]);
    }

    /// Build the month grid for the selected day's month.
    fn month_grid(&self) -> Vec<Line<'static>> {
        let today = Local::now().date_naive();
        let first = self
            .selected_day
            .with_day(1)
            .unwrap_or(self.selected_day);
        let days = days_in_month(first);
        let lead = first.weekday().num_days_from_monday() as usize;

        let mut lines = vec![
            Line::from(Span::styled(
                format!("  {}", first.format("%B %Y")),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from("  Mo   Tu   We   Th   Fr   Sa   Su"),
        ];

        let mut cells: Vec<Span> = vec![Span::raw("     ".to_string()); lead];
        for day in 1..=days {
            let date = first.with_day(day).unwrap_or(first);
            let busy = !views::on_date(&self.store.tasks, date).is_empty();
            let text = format!(" {:>2}{} ", day, if busy { "•" } else { " " });
            let mut style = Style::default();
            if busy {
                style = style.fg(BUSY_GOLD);
            }
            if date == today {
                style = style.fg(TODAY_GREEN).add_modifier(Modifier::BOLD);
            }
            if date == self.selected_day {
                style = style.add_modifier(Modifier::REVERSED);
            }
            cells.push(Span::styled(text, style));
            if cells.len() == 7 {
                lines.push(Line::from(std::mem::take(&mut cells)));
            }
        }
        if !cells.is_empty() {
            lines.push(Line::from(cells));
        }
        lines
    }

    fn render_projects(&mut self, f: &mut Frame, area: Rect) {
        let counts = views::project_counts(&self.store.projects, &self.store.tasks);
        let items: Vec<ListItem> = self
            .store
            .projects
            .iter()
            .map(|p| {
                let c = counts.get(&p.id).copied().unwrap_or_default();
                let line = Line::from(vec![
                    Span::styled(
                        format!(" {} ", p.icon.glyph()),
                        Style::default().fg(p.color.color()),
                    ),
                    Span::raw(format!(
                        "{:<24} {} active / {} done",
                        p.name, c.active, c.completed
                    )),
                ]);
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Projects"))
            .highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol("► ");
        f.render_stateful_widget(list, area, &mut self.project_state);
    }

    fn render_task_form(&mut self, f: &mut Frame) {
        let area = centered_rect(60, 60, f.area());
        f.render_widget(Clear, area);
        let title = if self.task_form.editing.is_some() {
            "Edit Task"
        } else {
            "New Task"
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        f.render_widget(block, area);

        let inner = area.inner(ratatui::layout::Margin {
            horizontal: 2,
            vertical: 1,
        });
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // title
                Constraint::Length(2), // description
                Constraint::Length(2), // due
                Constraint::Length(2), // tags
                Constraint::Length(2), // priority
                Constraint::Length(2), // project
                Constraint::Min(0),
            ])
            .split(inner);

        let text_fields = [
            ("Title", &self.task_form.title),
            ("Description", &self.task_form.description),
            ("Due", &self.task_form.due),
            ("Tags", &self.task_form.tags),
        ];
        for (i, (label, field)) in text_fields.iter().enumerate() {
            let style = if field.active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let text = format!("{label:<12} {}", field.value);
            f.render_widget(Paragraph::new(text).style(style), rows[i]);
            if field.active {
                f.set_cursor_position((
                    rows[i].x + 13 + field.cursor as u16,
                    rows[i].y,
                ));
            }
        }

        let selector_style = |selected: bool| {
            if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            }
        };
        let priority = format!(
            "{:<12} ◄ {} ►",
            "Priority",
            self.task_form.selected_priority().label()
        );
        f.render_widget(
            Paragraph::new(priority).style(selector_style(self.task_form.current_field == 4)),
            rows[4],
        );
        let project = format!(
            "{:<12} ◄ {} ►",
            "Project",
            self.task_form.selected_project_name()
        );
        f.render_widget(
            Paragraph::new(project).style(selector_style(self.task_form.current_field == 5)),
            rows[5],
        );
    }

    fn render_project_form(&mut self, f: &mut Frame) {
        let area = centered_rect(50, 40, f.area());
        f.render_widget(Clear, area);
        let block = Block::default().borders(Borders::ALL).title("New Project");
        f.render_widget(block, area);

        let inner = area.inner(ratatui::layout::Margin {
            horizontal: 2,
            vertical: 1,
        });
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let name_style = if self.project_form.name.active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        f.render_widget(
            Paragraph::new(format!("{:<8} {}", "Name", self.project_form.name.value))
                .style(name_style),
            rows[0],
        );
        if self.project_form.name.active {
            f.set_cursor_position((
                rows[0].x + 9 + self.project_form.name.cursor as u16,
                rows[0].y,
            ));
        }

        let color = self.project_form.selected_color();
        let color_line = Line::from(vec![
            Span::raw(format!("{:<8} ◄ ", "Colour")),
            Span::styled(format!("{color:?}"), Style::default().fg(color.color())),
            Span::raw(" ►"),
        ]);
        let color_style = if self.project_form.current_field == 1 {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        f.render_widget(Paragraph::new(color_line).style(color_style), rows[1]);

        let icon = self.project_form.selected_icon();
        let icon_style = if self.project_form.current_field == 2 {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        f.render_widget(
            Paragraph::new(format!("{:<8} ◄ {} {:?} ►", "Icon", icon.glyph(), icon))
                .style(icon_style),
            rows[2],
        );
    }

    fn render_confirm_task(&mut self, f: &mut Frame, id: u64) {
        let title = self
            .store
            .task(id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| format!("task {id}"));
        self.render_confirm(
            f,
            "Delete Task",
            vec![
                Line::from(format!("Delete '{title}'?")),
                Line::from("Its subtasks will be removed with it."),
            ],
        );
    }

    fn render_confirm_project(&mut self, f: &mut Frame, id: u64) {
        let name = self
            .store
            .project(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("project {id}"));
        let cascaded = self.store.cascade_count(id);
        self.render_confirm(
            f,
            "Delete Project",
            vec![
                Line::from(format!("Delete '{name}'?")),
                Line::from(format!(
                    "{cascaded} task(s) in this project will be deleted too."
                )),
            ],
        );
    }

    fn render_confirm(&self, f: &mut Frame, title: &str, mut body: Vec<Line>) {
        let area = centered_rect(50, 30, f.area());
        f.render_widget(Clear, area);
        body.insert(0, Line::from(""));
        body.push(Line::from(""));
        body.push(Line::from("Press Y to confirm, N or Esc to cancel"));
        let dialog = Paragraph::new(body)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title.to_string())
                    .border_style(Style::default().fg(Color::Red)),
            )
            .alignment(Alignment::Center);
        f.render_widget(dialog, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status.is_empty() {
            self.status.clone()
        } else {
            match self.mode {
                Mode::Search => "Type to search, Enter to keep, Esc to clear".to_string(),
                Mode::TaskForm | Mode::ProjectForm => {
                    "Tab next field, ◄► edit/cycle, Enter save, Esc cancel".to_string()
                }
                Mode::ConfirmDeleteTask(_) | Mode::ConfirmDeleteProject(_) => {
                    "Y to confirm, N or Esc to cancel".to_string()
                }
                Mode::Normal => match self.screen {
                    Screen::Dashboard => {
                        "↑↓ select  ◄► filter  / search  a add  e edit  x toggle  d delete  Tab screen  q quit"
                            .to_string()
                    }
                    Screen::Calendar => {
                        "↑↓◄► move day  [ ] month  t today  Tab screen  q quit".to_string()
                    }
                    Screen::Projects => {
                        "↑↓ select  a add  d delete  Tab screen  q quit".to_string()
                    }
                },
            }
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(Color::Blue).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }
}

/// Move a date by whole months, clamping the day to the target month.
fn shift_month(date: NaiveDate, delta: i32) -> NaiveDate {
    let zero_based = date.month0() as i32 + delta;
    let year = date.year() + zero_based.div_euclid(12);
    let month = zero_based.rem_euclid(12) as u32 + 1;
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date);
    let day = date.day().min(days_in_month(first));
    first.with_day(day).unwrap_or(first)
}

/// Number of days in the month containing `date`.
fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next {
        Some(n) => (n - ChronoDuration::days(1)).day(),
        None => 28,
    }
}

/// Centered sub-rectangle taking the given percentages of the parent.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_arithmetic_clamps_day() {
        let jan31 = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        assert_eq!(shift_month(jan31, 1), NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        let dec = NaiveDate::from_ymd_opt(2026, 12, 15).unwrap();
        assert_eq!(shift_month(dec, 1), NaiveDate::from_ymd_opt(2027, 1, 15).unwrap());
        assert_eq!(shift_month(jan31, -1), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn filter_tabs_cycle() {
        assert_eq!(FilterTab::All.next(), FilterTab::Today);
        assert_eq!(FilterTab::All.prev(), FilterTab::Completed);
        assert_eq!(FilterTab::Completed.next(), FilterTab::All);
    }
}

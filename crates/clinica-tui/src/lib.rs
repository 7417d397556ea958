// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use clinica_app::html::count_label;
use clinica_app::schema::FieldKind;
use clinica_app::{
    ApiError, AppCommand, AppEvent, AppMode, AppState, Backend, ControllerEvent,
    DEFAULT_SEARCH_DEBOUNCE, DEFAULT_TOAST_TTL, Dashboard, Debouncer, EntityKind,
    EntityListController, FallbackPolicy, FormState, Level, ListPage, Node, Notifications,
    SearchStep, TabKind,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(120);

/// Console settings resolved from the `[ui]` and `[dashboard]` config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiOptions {
    pub show_dashboard: bool,
    pub search_debounce: Duration,
    pub toast_ttl: Duration,
    pub fallback: FallbackPolicy,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            show_dashboard: true,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            toast_ttl: DEFAULT_TOAST_TTL,
            fallback: FallbackPolicy::default(),
        }
    }
}

/// Results produced off the UI thread.
#[derive(Debug)]
pub enum InternalEvent {
    Search {
        kind: EntityKind,
        ticket: u64,
        result: Result<ListPage, ApiError>,
    },
}

#[derive(Debug)]
struct ViewData {
    controllers: BTreeMap<EntityKind, EntityListController>,
    loaded: BTreeSet<EntityKind>,
    dashboard: Dashboard,
    notifications: Notifications,
    debouncer: Debouncer,
    search_input: String,
    selected_row: usize,
    filter_slot: usize,
}

impl ViewData {
    fn new(options: &UiOptions) -> Self {
        Self {
            controllers: EntityKind::ALL
                .into_iter()
                .map(|kind| (kind, EntityListController::new(kind)))
                .collect(),
            loaded: BTreeSet::new(),
            dashboard: Dashboard::new(options.fallback.clone()),
            notifications: Notifications::new(options.toast_ttl),
            debouncer: Debouncer::new(options.search_debounce),
            search_input: String::new(),
            selected_row: 0,
            filter_slot: 0,
        }
    }

    fn controller(&self, tab: TabKind) -> Option<&EntityListController> {
        tab.entity().and_then(|kind| self.controllers.get(&kind))
    }

    fn with_controller(
        &mut self,
        tab: TabKind,
        action: impl FnOnce(&mut EntityListController) -> Vec<ControllerEvent>,
    ) -> Vec<ControllerEvent> {
        tab.entity()
            .and_then(|kind| self.controllers.get_mut(&kind))
            .map(action)
            .unwrap_or_default()
    }

    fn with_form(&mut self, tab: TabKind, action: impl FnOnce(&mut FormState)) {
        if let Some(form) = tab
            .entity()
            .and_then(|kind| self.controllers.get_mut(&kind))
            .and_then(EntityListController::form_mut)
        {
            action(form);
        }
    }

    fn clamp_selection(&mut self, tab: TabKind) {
        let len = self
            .controller(tab)
            .map_or(0, |controller| controller.list().filtered_len());
        self.selected_row = self.selected_row.min(len.saturating_sub(1));
    }
}

pub fn run_app<B>(state: &mut AppState, backend: &B, options: &UiOptions) -> Result<()>
where
    B: Backend + Clone + Send + 'static,
{
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend).context("create terminal")?;

    let mut view_data = ViewData::new(options);
    let (internal_tx, internal_rx) = mpsc::channel();
    open_initial_tab(state, backend, &mut view_data, options);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);
        tick(state, backend, &mut view_data, &internal_tx, Instant::now());

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(POLL_INTERVAL).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) => {
                if handle_key_event(state, backend, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn open_initial_tab<B: Backend + ?Sized>(
    state: &mut AppState,
    backend: &B,
    view_data: &mut ViewData,
    options: &UiOptions,
) {
    let tab = if options.show_dashboard {
        TabKind::Dashboard
    } else {
        TabKind::Entity(EntityKind::Patients)
    };
    state.active_tab = tab;
    enter_tab(state, backend, view_data, tab, Instant::now());
}

/// Loads what a freshly selected tab shows. Entity lists load once and then
/// only on `r`; the dashboard refreshes on every visit.
fn enter_tab<B: Backend + ?Sized>(
    state: &mut AppState,
    backend: &B,
    view_data: &mut ViewData,
    tab: TabKind,
    now: Instant,
) {
    view_data.selected_row = 0;
    view_data.filter_slot = 0;
    view_data.debouncer.cancel();
    view_data.search_input.clear();

    let events = match tab {
        TabKind::Dashboard => view_data.dashboard.load(backend),
        TabKind::Entity(kind) => {
            if view_data.loaded.insert(kind) {
                view_data.with_controller(tab, |controller| controller.load(backend))
            } else {
                Vec::new()
            }
        }
    };
    apply_events(state, view_data, events, now);
}

fn dispatch<B: Backend + ?Sized>(
    state: &mut AppState,
    backend: &B,
    view_data: &mut ViewData,
    command: AppCommand,
    now: Instant,
) {
    for event in state.dispatch(command) {
        if let AppEvent::TabChanged(tab) = event {
            debug!(tab = tab.label(), "tab changed");
            enter_tab(state, backend, view_data, tab, now);
        }
    }
}

/// Folds controller events into the mode machine and the toast stack.
fn apply_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    events: Vec<ControllerEvent>,
    now: Instant,
) {
    for event in events {
        match event {
            ControllerEvent::Notify { level, message } => {
                view_data.notifications.push(level, message, now);
            }
            ControllerEvent::FormOpened => {
                state.dispatch(AppCommand::OpenForm);
            }
            ControllerEvent::ConfirmOpened => {
                state.dispatch(AppCommand::OpenConfirm);
            }
            ControllerEvent::FormClosed | ControllerEvent::ConfirmClosed => {
                state.dispatch(AppCommand::ExitToNav);
            }
            ControllerEvent::ViewChanged => view_data.clamp_selection(state.active_tab),
            ControllerEvent::Discarded { .. } => {}
        }
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        handle_internal_event(state, view_data, event, Instant::now());
    }
}

fn handle_internal_event(
    state: &mut AppState,
    view_data: &mut ViewData,
    event: InternalEvent,
    now: Instant,
) {
    match event {
        InternalEvent::Search {
            kind,
            ticket,
            result,
        } => {
            let events = view_data
                .with_controller(TabKind::Entity(kind), |controller| {
                    controller.finish_search(ticket, result)
                });
            apply_events(state, view_data, events, now);
        }
    }
}

/// Fires a settled search and expires old toasts.
fn tick<B>(
    state: &mut AppState,
    backend: &B,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    now: Instant,
) where
    B: Backend + Clone + Send + 'static,
{
    if let Some(term) = view_data.debouncer.poll(now)
        && let Some(kind) = state.active_tab.entity()
    {
        start_search(state, backend, view_data, tx, kind, &term, now);
    }
    view_data.notifications.expire(now);
}

fn start_search<B>(
    state: &mut AppState,
    backend: &B,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    kind: EntityKind,
    term: &str,
    now: Instant,
) where
    B: Backend + Clone + Send + 'static,
{
    let Some(controller) = view_data.controllers.get_mut(&kind) else {
        return;
    };
    match controller.begin_search(term) {
        SearchStep::Done(events) => apply_events(state, view_data, events, now),
        SearchStep::Remote { ticket, term } => {
            debug!(entity = kind.path(), ticket, "search dispatched");
            let backend = backend.clone();
            let sender = tx.clone();
            thread::spawn(move || {
                let result = backend.search(kind, &term);
                let _ = sender.send(InternalEvent::Search {
                    kind,
                    ticket,
                    result,
                });
            });
        }
    }
}

/// Returns true when the console should exit.
fn handle_key_event<B>(
    state: &mut AppState,
    backend: &B,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool
where
    B: Backend + Clone + Send + 'static,
{
    let now = Instant::now();
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('q') {
        info!("quit requested");
        return true;
    }

    if state.help_visible {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            state.dispatch(AppCommand::ToggleHelp);
        }
        return false;
    }

    match state.mode {
        AppMode::Nav => handle_nav_key(state, backend, view_data, key, now),
        AppMode::Search => handle_search_key(state, backend, view_data, tx, key, now),
        AppMode::Form => handle_form_key(state, backend, view_data, key, now),
        AppMode::Confirm => handle_confirm_key(state, backend, view_data, key, now),
    }
    false
}

fn handle_nav_key<B: Backend + ?Sized>(
    state: &mut AppState,
    backend: &B,
    view_data: &mut ViewData,
    key: KeyEvent,
    now: Instant,
) {
    let tab = state.active_tab;
    let row = view_data.selected_row;
    let events = match key.code {
        KeyCode::Char('f') => {
            dispatch(state, backend, view_data, AppCommand::NextTab, now);
            return;
        }
        KeyCode::Char('b') => {
            dispatch(state, backend, view_data, AppCommand::PrevTab, now);
            return;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            move_row(view_data, tab, 1);
            return;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            move_row(view_data, tab, -1);
            return;
        }
        KeyCode::Char('/') => {
            if !state.dispatch(AppCommand::EnterSearch).is_empty() {
                view_data.search_input = view_data
                    .controller(tab)
                    .map(|controller| controller.search_term().to_owned())
                    .unwrap_or_default();
            }
            return;
        }
        KeyCode::Char('?') => {
            state.dispatch(AppCommand::ToggleHelp);
            return;
        }
        KeyCode::Char('x') => {
            view_data.notifications.dismiss_latest();
            return;
        }
        KeyCode::Char('t') => {
            let slots = view_data
                .controller(tab)
                .map_or(0, |controller| controller.schema().filters.len());
            if slots > 0 {
                view_data.filter_slot = (view_data.filter_slot + 1) % slots;
            }
            return;
        }
        KeyCode::Char('r') => match tab {
            TabKind::Dashboard => view_data.dashboard.load(backend),
            TabKind::Entity(_) => {
                // A reload resets the controller's search; drop the typed term too.
                view_data.debouncer.cancel();
                view_data.search_input.clear();
                view_data.with_controller(tab, |controller| controller.load(backend))
            }
        },
        KeyCode::Char('a') => view_data.with_controller(tab, EntityListController::open_create),
        KeyCode::Char('e') => {
            view_data.with_controller(tab, |controller| controller.open_edit_row(row, backend))
        }
        KeyCode::Char('d') => {
            view_data.with_controller(tab, |controller| controller.request_delete_row(row))
        }
        KeyCode::Char('c') => {
            let slot = view_data.filter_slot;
            view_data.with_controller(tab, |controller| controller.cycle_filter(slot))
        }
        _ => return,
    };
    apply_events(state, view_data, events, now);
}

fn move_row(view_data: &mut ViewData, tab: TabKind, delta: isize) {
    let len = view_data
        .controller(tab)
        .map_or(0, |controller| controller.list().filtered_len());
    if len == 0 {
        view_data.selected_row = 0;
        return;
    }
    let max = (len - 1) as isize;
    view_data.selected_row = (view_data.selected_row as isize + delta).clamp(0, max) as usize;
}

fn handle_search_key<B>(
    state: &mut AppState,
    backend: &B,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
    now: Instant,
) where
    B: Backend + Clone + Send + 'static,
{
    match key.code {
        // A pending keystroke still fires once it settles.
        KeyCode::Esc => {
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Enter => {
            view_data.debouncer.cancel();
            state.dispatch(AppCommand::ExitToNav);
            if let Some(kind) = state.active_tab.entity() {
                let term = view_data.search_input.clone();
                start_search(state, backend, view_data, tx, kind, &term, now);
            }
        }
        KeyCode::Backspace => {
            view_data.search_input.pop();
            view_data
                .debouncer
                .input(view_data.search_input.clone(), now);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.search_input.push(ch);
            view_data
                .debouncer
                .input(view_data.search_input.clone(), now);
        }
        _ => {}
    }
}

fn handle_form_key<B: Backend + ?Sized>(
    state: &mut AppState,
    backend: &B,
    view_data: &mut ViewData,
    key: KeyEvent,
    now: Instant,
) {
    let tab = state.active_tab;
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let events = match key.code {
        KeyCode::Esc => view_data.with_controller(tab, EntityListController::close_form),
        KeyCode::Enter => view_data.with_controller(tab, |controller| controller.submit(backend)),
        KeyCode::Char('s') if ctrl => {
            view_data.with_controller(tab, |controller| controller.submit(backend))
        }
        KeyCode::Tab => {
            view_data.with_form(tab, FormState::focus_next);
            return;
        }
        KeyCode::BackTab => {
            view_data.with_form(tab, FormState::focus_prev);
            return;
        }
        KeyCode::Left => {
            view_data.with_form(tab, |form| form.cycle_choice(-1));
            return;
        }
        KeyCode::Right => {
            view_data.with_form(tab, |form| form.cycle_choice(1));
            return;
        }
        KeyCode::Backspace => {
            view_data.with_form(tab, FormState::backspace);
            return;
        }
        KeyCode::Char(ch) if !ctrl => {
            view_data.with_form(tab, |form| form.insert_char(ch));
            return;
        }
        _ => return,
    };
    apply_events(state, view_data, events, now);
}

fn handle_confirm_key<B: Backend + ?Sized>(
    state: &mut AppState,
    backend: &B,
    view_data: &mut ViewData,
    key: KeyEvent,
    now: Instant,
) {
    let tab = state.active_tab;
    let events = match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            view_data.with_controller(tab, |controller| controller.confirm_delete(backend))
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            view_data.with_controller(tab, EntityListController::cancel_delete)
        }
        _ => return,
    };
    apply_events(state, view_data, events, now);
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tabs = Tabs::new(TabKind::ALL.iter().map(|tab| tab.label()).collect::<Vec<_>>())
        .block(Block::default().title("clinica").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match view_data.controller(state.active_tab) {
        Some(controller) => render_table(frame, layout[1], controller, view_data),
        None => {
            let body = Paragraph::new(render_dashboard_text(&view_data.dashboard))
                .block(Block::default().borders(Borders::ALL).title("estadísticas"));
            frame.render_widget(body, layout[1]);
        }
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(controller) = view_data.controller(state.active_tab) {
        if let Some(form) = controller.form() {
            let area = centered_rect(64, 72, frame.area());
            frame.render_widget(Clear, area);
            let overlay = Paragraph::new(render_form_text(form))
                .block(Block::default().title(form.title()).borders(Borders::ALL));
            frame.render_widget(overlay, area);
        }
        if let Some(pending) = controller.pending_delete() {
            let area = centered_rect(56, 24, frame.area());
            frame.render_widget(Clear, area);
            let overlay = Paragraph::new(render_confirm_text(&pending.summary))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .title("confirmar eliminación")
                        .borders(Borders::ALL)
                        .style(Style::default().fg(Color::Red)),
                );
            frame.render_widget(overlay, area);
        }
    }

    if state.help_visible {
        let area = centered_rect(72, 56, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("ayuda").borders(Borders::ALL));
        frame.render_widget(help, area);
    }

    render_toasts(frame, view_data);
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    controller: &EntityListController,
    view_data: &ViewData,
) {
    let block = Block::default()
        .title(table_title(controller, view_data.filter_slot))
        .borders(Borders::ALL);
    let rows = controller.table_rows();
    if rows.is_empty() {
        let empty = Paragraph::new(controller.schema().empty_message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // The actions column only exists in the HTML rendering.
    let mut headers = controller.headers();
    headers.pop();
    let widths = vec![Constraint::Min(6); headers.len().max(1)];
    let header = Row::new(headers.into_iter().map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = rows.into_iter().enumerate().map(|(index, cells)| {
        let style = if index == view_data.selected_row {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        Row::new(cells.into_iter().map(Cell::from)).style(style)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn render_toasts(frame: &mut ratatui::Frame<'_>, view_data: &ViewData) {
    let items = view_data.notifications.items();
    let area = toast_area(frame.area(), items.len());
    for (index, toast) in items.iter().enumerate() {
        let offset = u16::try_from(index).unwrap_or(u16::MAX).saturating_mul(3);
        if offset >= area.height {
            break;
        }
        let slot = Rect {
            y: area.y + offset,
            height: 3.min(area.height - offset),
            ..area
        };
        let color = match toast.level {
            Level::Success => Color::Green,
            Level::Error => Color::Red,
        };
        frame.render_widget(Clear, slot);
        let widget = Paragraph::new(toast.message.as_str()).block(
            Block::default()
                .title(toast.level.title())
                .borders(Borders::ALL)
                .style(Style::default().fg(color)),
        );
        frame.render_widget(widget, slot);
    }
}

/// Top-right stack, three rows per toast.
fn toast_area(area: Rect, count: usize) -> Rect {
    let width = (area.width / 2).max(24).min(area.width);
    let height = u16::try_from(count)
        .unwrap_or(u16::MAX)
        .saturating_mul(3)
        .min(area.height);
    Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height,
    }
}

fn table_title(controller: &EntityListController, filter_slot: usize) -> String {
    let node = controller.node().map_or("Sin conexión", Node::host_label);
    let mut title = format!(
        "{} | {} | {node}",
        controller.kind().label(),
        count_label(controller.list())
    );
    if !controller.search_term().trim().is_empty() {
        title.push_str(&format!(" | buscar: {}", controller.search_term().trim()));
    }
    if let Some(filter) = controller.filter_views().get(filter_slot) {
        let selected = filter.selected.as_deref().unwrap_or("todos");
        title.push_str(&format!(" | filtro {}: {selected}", filter.label));
    }
    title
}

fn render_dashboard_text(dashboard: &Dashboard) -> String {
    dashboard
        .slots()
        .into_iter()
        .map(|slot| format!("{:<28} {}", slot.label, slot.value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_form_text(form: &FormState) -> String {
    let mut lines: Vec<String> = form
        .fields()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let marker = if index == form.focus() { ">" } else { " " };
            let required = if field.spec.required { "*" } else { "" };
            let value = match field.spec.kind {
                FieldKind::Choice(choices) => choices
                    .iter()
                    .find(|(value, _)| *value == field.value)
                    .map_or_else(
                        || "(seleccione)".to_owned(),
                        |(value, label)| format!("{value} ({label})"),
                    ),
                _ => field.value.clone(),
            };
            let lock = if field.enabled { "" } else { " [bloqueado]" };
            format!("{marker} {}{required}: {value}{lock}", field.spec.label)
        })
        .collect();
    lines.push(String::new());
    lines.push(
        "tab/shift+tab campo | izq/der opción | enter o ctrl+s guardar | esc cancelar".to_owned(),
    );
    lines.join("\n")
}

fn render_confirm_text(summary: &str) -> String {
    format!("¿Está seguro de eliminar {summary}?\n\ny/enter confirmar | n/esc cancelar")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if state.help_visible {
        return String::new();
    }
    match state.mode {
        AppMode::Nav => concat!(
            "NAV | f/b pestaña | j/k fila | / buscar | r recargar | a nuevo | e editar | ",
            "d eliminar | t/c filtro | x cerrar aviso | ? ayuda | ctrl+q salir"
        )
        .to_owned(),
        AppMode::Search => format!(
            "BUSCAR | {}_ | enter aplicar | esc volver",
            view_data.search_input
        ),
        AppMode::Form => "FORM | tab campo | enter guardar | esc cancelar".to_owned(),
        AppMode::Confirm => "CONFIRMAR | y eliminar | n cancelar".to_owned(),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q salir | ? ayuda\n\
nav: f/b pestaña siguiente/anterior | j/k fila | r recargar\n\
nav: / buscar | t cambiar filtro | c ciclar valor del filtro | x cerrar aviso\n\
edición: a nuevo | e editar | d eliminar\n\
buscar: escriba el término | enter aplicar | esc volver\n\
formulario: tab/shift+tab campo | izq/der opción | enter o ctrl+s guardar | esc cancelar\n\
confirmar: y/enter eliminar | n/esc cancelar"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}

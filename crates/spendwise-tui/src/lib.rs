// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};
use rust_decimal::Decimal;
use spendwise_app::{
    Ack, BrowserCommand, BrowserEffect, Category, Confirmation, DismissRole, Dismissal,
    EditorCommand, EditorEffect, Expense, ExpenseBrowser, ExpenseEditor, ExpenseGateway,
    ExpenseGroup, GatewayError, Notice, NoticeLevel, PageRequest, PageResponse, format_date,
    month_label, parse_amount, parse_date,
};
use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const DAY_LABEL_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[weekday repr:short] [day] [month repr:short] [year]");

/// Everything the terminal front end needs from its host: the backend plus
/// a way to run page loads off the UI thread.
pub trait AppRuntime: ExpenseGateway {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }

    /// Runs `request` and posts the outcome on `tx`. The default runs inline.
    fn spawn_list_expenses(
        &mut self,
        request: PageRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self.list_expenses(&request.query);
        tx.send(InternalEvent::PageLoaded(PageResponse { request, result }))
            .map_err(|_| anyhow!("expense page channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    PageLoaded(PageResponse),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum EditorField {
    #[default]
    Name,
    Amount,
    Date,
    Category,
}

impl EditorField {
    const ALL: [Self; 4] = [Self::Name, Self::Amount, Self::Date, Self::Category];

    const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Amount => "amount",
            Self::Date => "date",
            Self::Category => "category",
        }
    }

    fn step(self, delta: isize) -> Self {
        let index = Self::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0) as isize;
        let len = Self::ALL.len() as isize;
        Self::ALL[(index + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EditorUiState {
    editor: ExpenseEditor,
    field: EditorField,
    name: String,
    amount: String,
    date: String,
}

impl EditorUiState {
    fn new(editor: ExpenseEditor) -> Self {
        let form = editor.form();
        Self {
            name: form.name.clone(),
            amount: form.amount.map(format_amount).unwrap_or_default(),
            date: form.date.map(format_date).unwrap_or_default(),
            field: EditorField::default(),
            editor,
        }
    }

    /// Applies `edit` to the focused text buffer and returns the command
    /// that mirrors the new value into the form.
    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) -> Option<EditorCommand> {
        match self.field {
            EditorField::Name => {
                edit(&mut self.name);
                Some(EditorCommand::SetName(self.name.clone()))
            }
            EditorField::Amount => {
                edit(&mut self.amount);
                Some(EditorCommand::SetAmount(parse_amount(&self.amount)))
            }
            EditorField::Date => {
                edit(&mut self.date);
                Some(EditorCommand::SetDate(parse_date(&self.date).ok()))
            }
            EditorField::Category => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PickerUiState {
    categories: Vec<Category>,
    cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AckPurpose {
    Refresh,
    NextPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusMessage {
    text: String,
    error: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    cursor: usize,
    search_input: Option<String>,
    editor: Option<EditorUiState>,
    confirm: Option<String>,
    picker: Option<PickerUiState>,
    help_visible: bool,
    status: Option<StatusMessage>,
    status_token: u64,
    next_ack: u64,
    pending_acks: BTreeMap<u64, AckPurpose>,
}

enum EditorKeyOutcome {
    Command(EditorCommand),
    Status(String),
    Nothing,
}

pub fn run_app<R: AppRuntime>(browser: &mut ExpenseBrowser, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    run_browser_command(
        browser,
        runtime,
        &mut view_data,
        &internal_tx,
        BrowserCommand::Reload { ack: None },
    );

    let mut result = Ok(());
    loop {
        process_internal_events(browser, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, browser, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(browser, runtime, &mut view_data, &internal_tx, key) {
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
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AppRuntime>(
    state: &mut ExpenseBrowser,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::PageLoaded(response) => {
                run_browser_command(
                    state,
                    runtime,
                    view_data,
                    tx,
                    BrowserCommand::PageLoaded(response),
                );
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn set_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    text: String,
    error: bool,
) {
    view_data.status = Some(StatusMessage { text, error });
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    set_status(view_data, internal_tx, message.into(), false);
}

fn emit_notice(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>, notice: Notice) {
    let error = notice.level == NoticeLevel::Error;
    if error {
        warn!(message = %notice.message, "surfacing error notice");
    }
    set_status(view_data, internal_tx, notice.message, error);
}

fn issue_ack(view_data: &mut ViewData, purpose: AckPurpose) -> Ack {
    view_data.next_ack = view_data.next_ack.wrapping_add(1);
    view_data.pending_acks.insert(view_data.next_ack, purpose);
    Ack(view_data.next_ack)
}

fn acknowledge(
    state: &ExpenseBrowser,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    ack: Ack,
) {
    let Some(purpose) = view_data.pending_acks.remove(&ack.0) else {
        return;
    };
    if purpose == AckPurpose::NextPage && state.last_page_reached() && !state.is_loading() {
        emit_status(
            view_data,
            tx,
            format!("all expenses for {} loaded", month_label(state.month())),
        );
    }
}

fn run_browser_command<R: AppRuntime>(
    state: &mut ExpenseBrowser,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: BrowserCommand,
) {
    let effects = state.dispatch(command);
    if state.groups().is_none() {
        view_data.cursor = 0;
    }
    clamp_cursor(state, view_data);

    for effect in effects {
        match effect {
            BrowserEffect::Fetch(request) => {
                if let Err(error) = runtime.spawn_list_expenses(request.clone(), tx.clone()) {
                    warn!(%error, "could not start expense load");
                    let result = Err(GatewayError::Network(format!("{error:#}")));
                    run_browser_command(
                        state,
                        runtime,
                        view_data,
                        tx,
                        BrowserCommand::PageLoaded(PageResponse { request, result }),
                    );
                }
            }
            BrowserEffect::Acknowledge(ack) => acknowledge(state, view_data, tx, ack),
            BrowserEffect::Notify(notice) => emit_notice(view_data, tx, notice),
            BrowserEffect::OpenEditor(expense) => {
                open_editor(state, runtime, view_data, tx, expense.as_ref());
            }
        }
    }
}

fn open_editor<R: AppRuntime>(
    state: &mut ExpenseBrowser,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    expense: Option<&Expense>,
) {
    let editor = ExpenseEditor::open(expense, runtime.today());
    view_data.editor = Some(EditorUiState::new(editor));
    run_editor_command(state, runtime, view_data, tx, EditorCommand::Shown);
}

fn dispatch_editor(view_data: &mut ViewData, command: EditorCommand) -> Vec<EditorEffect> {
    view_data
        .editor
        .as_mut()
        .map(|ui| ui.editor.dispatch(command))
        .unwrap_or_default()
}

fn run_editor_command<R: AppRuntime>(
    state: &mut ExpenseBrowser,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: EditorCommand,
) {
    let mut pending: VecDeque<EditorEffect> = dispatch_editor(view_data, command).into();
    while let Some(effect) = pending.pop_front() {
        match effect {
            EditorEffect::LoadCategories(direction) => {
                let result = runtime.list_categories(direction);
                pending.extend(dispatch_editor(
                    view_data,
                    EditorCommand::CategoriesLoaded(result),
                ));
            }
            EditorEffect::Upsert(expense) => {
                info!(id = ?expense.id, name = %expense.name, "saving expense");
                let result = runtime.upsert_expense(&expense);
                pending.extend(dispatch_editor(
                    view_data,
                    EditorCommand::UpsertFinished(result),
                ));
            }
            EditorEffect::DeleteExpense(id) => {
                info!(%id, "deleting expense");
                let result = runtime.delete_expense(&id);
                pending.extend(dispatch_editor(
                    view_data,
                    EditorCommand::DeleteFinished(result),
                ));
            }
            EditorEffect::ConfirmDeletion(message) => view_data.confirm = Some(message),
            EditorEffect::PickCategory(categories) => {
                let cursor = view_data
                    .editor
                    .as_ref()
                    .and_then(|ui| ui.editor.form().category.as_ref())
                    .and_then(|current| {
                        categories
                            .iter()
                            .position(|category| category.id == current.id)
                    })
                    .unwrap_or(0);
                view_data.picker = Some(PickerUiState { categories, cursor });
            }
            EditorEffect::Notify(notice) => emit_notice(view_data, tx, notice),
            EditorEffect::Dismiss(role) => {
                view_data.editor = None;
                view_data.confirm = None;
                view_data.picker = None;
                run_browser_command(
                    state,
                    runtime,
                    view_data,
                    tx,
                    BrowserCommand::EditorClosed(Dismissal::new(role)),
                );
            }
        }
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut ExpenseBrowser,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.confirm.is_some() {
        handle_confirm_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.picker.is_some() {
        handle_picker_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.editor.is_some() {
        handle_editor_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.search_input.is_some() {
        handle_search_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    handle_browser_key(state, runtime, view_data, internal_tx, key)
}

fn handle_browser_key<R: AppRuntime>(
    state: &mut ExpenseBrowser,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('h'), KeyModifiers::NONE) | (KeyCode::Left, _) => {
            run_browser_command(state, runtime, view_data, tx, BrowserCommand::ShiftMonth(-1));
        }
        (KeyCode::Char('l'), KeyModifiers::NONE) | (KeyCode::Right, _) => {
            run_browser_command(state, runtime, view_data, tx, BrowserCommand::ShiftMonth(1));
        }
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
            move_cursor(state, runtime, view_data, tx, 1);
        }
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
            move_cursor(state, runtime, view_data, tx, -1);
        }
        (KeyCode::Char('/'), _) => {
            view_data.search_input = Some(state.search_term().to_owned());
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            let sort = state.sort().next();
            run_browser_command(state, runtime, view_data, tx, BrowserCommand::SetSort(sort));
            emit_status(view_data, tx, format!("sort: {}", sort.label()));
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            let ack = issue_ack(view_data, AckPurpose::Refresh);
            run_browser_command(
                state,
                runtime,
                view_data,
                tx,
                BrowserCommand::Reload { ack: Some(ack) },
            );
        }
        (KeyCode::Char('n'), KeyModifiers::NONE) => request_next_page(state, runtime, view_data, tx),
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            run_browser_command(state, runtime, view_data, tx, BrowserCommand::OpenCreate);
        }
        (KeyCode::Enter, _) | (KeyCode::Char('e'), KeyModifiers::NONE) => {
            match selected_expense(state, view_data).cloned() {
                Some(expense) => run_browser_command(
                    state,
                    runtime,
                    view_data,
                    tx,
                    BrowserCommand::OpenEdit(expense),
                ),
                None => emit_status(view_data, tx, "no expense selected"),
            }
        }
        (KeyCode::Char('?'), _) => view_data.help_visible = true,
        _ => {}
    }
    false
}

fn request_next_page<R: AppRuntime>(
    state: &mut ExpenseBrowser,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let ack = issue_ack(view_data, AckPurpose::NextPage);
    run_browser_command(state, runtime, view_data, tx, BrowserCommand::LoadNextPage { ack });
}

fn move_cursor<R: AppRuntime>(
    state: &mut ExpenseBrowser,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    delta: isize,
) {
    let total = state.expense_count();
    if total == 0 {
        return;
    }
    if delta > 0 && view_data.cursor + 1 >= total {
        request_next_page(state, runtime, view_data, tx);
        return;
    }
    view_data.cursor = view_data.cursor.saturating_add_signed(delta).min(total - 1);
}

fn clamp_cursor(state: &ExpenseBrowser, view_data: &mut ViewData) {
    let total = state.expense_count();
    view_data.cursor = view_data.cursor.min(total.saturating_sub(1));
}

fn selected_expense<'a>(state: &'a ExpenseBrowser, view_data: &ViewData) -> Option<&'a Expense> {
    state
        .groups()?
        .iter()
        .flat_map(|group| group.expenses.iter())
        .nth(view_data.cursor)
}

fn handle_search_key<R: AppRuntime>(
    state: &mut ExpenseBrowser,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(buffer) = view_data.search_input.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => view_data.search_input = None,
        KeyCode::Enter => {
            let term = buffer.trim().to_owned();
            view_data.search_input = None;
            run_browser_command(state, runtime, view_data, tx, BrowserCommand::SetSearchTerm(term));
        }
        KeyCode::Backspace => {
            buffer.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => buffer.push(ch),
        _ => {}
    }
}

fn handle_editor_key<R: AppRuntime>(
    state: &mut ExpenseBrowser,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let outcome = {
        let Some(ui) = view_data.editor.as_mut() else {
            return;
        };
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => EditorKeyOutcome::Command(EditorCommand::Cancel),
            KeyCode::Char('s') if control => save_outcome(&ui.editor),
            KeyCode::Char('d') if control => {
                if ui.editor.can_delete() {
                    EditorKeyOutcome::Command(EditorCommand::Delete)
                } else {
                    EditorKeyOutcome::Status("unsaved expenses cannot be deleted".to_owned())
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                ui.field = ui.field.step(1);
                EditorKeyOutcome::Nothing
            }
            KeyCode::BackTab | KeyCode::Up => {
                ui.field = ui.field.step(-1);
                EditorKeyOutcome::Nothing
            }
            KeyCode::Enter if ui.field == EditorField::Category => {
                if ui.editor.categories().is_empty() {
                    EditorKeyOutcome::Status("no categories available".to_owned())
                } else {
                    EditorKeyOutcome::Command(EditorCommand::SelectCategory)
                }
            }
            KeyCode::Enter => save_outcome(&ui.editor),
            KeyCode::Backspace => ui
                .edit_focused(|buffer| {
                    buffer.pop();
                })
                .map_or(EditorKeyOutcome::Nothing, EditorKeyOutcome::Command),
            KeyCode::Char(ch) if !control && !key.modifiers.contains(KeyModifiers::ALT) => ui
                .edit_focused(|buffer| buffer.push(ch))
                .map_or(EditorKeyOutcome::Nothing, EditorKeyOutcome::Command),
            _ => EditorKeyOutcome::Nothing,
        }
    };

    match outcome {
        EditorKeyOutcome::Command(command) => {
            run_editor_command(state, runtime, view_data, tx, command);
        }
        EditorKeyOutcome::Status(message) => emit_status(view_data, tx, message),
        EditorKeyOutcome::Nothing => {}
    }
}

fn save_outcome(editor: &ExpenseEditor) -> EditorKeyOutcome {
    if editor.is_submitting() {
        return EditorKeyOutcome::Nothing;
    }
    match editor.validation_error() {
        Some(error) => EditorKeyOutcome::Status(error),
        None => EditorKeyOutcome::Command(EditorCommand::Save),
    }
}

fn handle_picker_key<R: AppRuntime>(
    state: &mut ExpenseBrowser,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let dismissal = {
        let Some(picker) = view_data.picker.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                picker.cursor = (picker.cursor + 1).min(picker.categories.len().saturating_sub(1));
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                picker.cursor = picker.cursor.saturating_sub(1);
                None
            }
            KeyCode::Enter => Some(
                picker
                    .categories
                    .get(picker.cursor)
                    .cloned()
                    .map(|category| Dismissal::with_data(DismissRole::Save, category))
                    .unwrap_or_else(|| Dismissal::new(DismissRole::Cancel)),
            ),
            KeyCode::Esc => Some(Dismissal::new(DismissRole::Cancel)),
            _ => None,
        }
    };

    if let Some(dismissal) = dismissal {
        view_data.picker = None;
        run_editor_command(
            state,
            runtime,
            view_data,
            tx,
            EditorCommand::CategoryPicked(dismissal),
        );
    }
}

fn handle_confirm_key<R: AppRuntime>(
    state: &mut ExpenseBrowser,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let answer = match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Confirmation::Delete,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Confirmation::Cancel,
        _ => return,
    };
    view_data.confirm = None;
    run_editor_command(
        state,
        runtime,
        view_data,
        tx,
        EditorCommand::DeletionAnswered(answer),
    );
}

fn render(frame: &mut ratatui::Frame<'_>, state: &ExpenseBrowser, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(render_header_text(state, view_data))
        .block(Block::default().title("spendwise").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    render_expenses(frame, layout[1], state, view_data);

    let status_style = match &view_data.status {
        Some(status) if status.error => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Yellow),
    };
    let status = Paragraph::new(status_text(view_data))
        .style(status_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(ui) = &view_data.editor {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);
        let editor = Paragraph::new(render_editor_overlay_text(ui)).block(
            Block::default()
                .title(ui.editor.title())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(editor, area);
    }

    if let Some(picker) = &view_data.picker {
        let area = centered_rect(40, 50, frame.area());
        frame.render_widget(Clear, area);
        let list = Paragraph::new(render_picker_overlay_text(picker))
            .block(Block::default().title("category").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    if let Some(message) = &view_data.confirm {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);
        let confirm = Paragraph::new(format!("{message}\n\ny delete | n cancel")).block(
            Block::default()
                .title("confirm")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(confirm, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_expenses(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &ExpenseBrowser,
    view_data: &ViewData,
) {
    let title = expenses_title(state);
    let Some(groups) = state.groups() else {
        let loading = Paragraph::new("loading expenses...")
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(loading, area);
        return;
    };
    if groups.is_empty() {
        let empty = Paragraph::new(format!(
            "no expenses for {} -- press a to add one",
            month_label(state.month())
        ))
        .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let lines = body_lines(groups);
    let selected = lines
        .iter()
        .position(|line| matches!(line, BodyLine::Expense { index, .. } if *index == view_data.cursor));
    let rows = lines.iter().map(|line| match line {
        BodyLine::Day(group) => Row::new([
            Cell::from(format_day_label(group.date)),
            Cell::from(""),
            Cell::from(format_amount(group.total())),
        ])
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        BodyLine::Expense { expense, .. } => Row::new([
            Cell::from(format!("  {}", expense.name)),
            Cell::from(
                expense
                    .category
                    .as_ref()
                    .map_or("-", |category| category.name.as_str())
                    .to_owned(),
            ),
            Cell::from(format_amount(expense.amount)),
        ]),
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(24),
            Constraint::Length(18),
            Constraint::Length(12),
        ],
    )
    .block(Block::default().title(title).borders(Borders::ALL))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut table_state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, area, &mut table_state);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyLine<'a> {
    Day(&'a ExpenseGroup),
    Expense { expense: &'a Expense, index: usize },
}

fn body_lines(groups: &[ExpenseGroup]) -> Vec<BodyLine<'_>> {
    let mut lines = Vec::new();
    let mut index = 0;
    for group in groups {
        lines.push(BodyLine::Day(group));
        for expense in &group.expenses {
            lines.push(BodyLine::Expense { expense, index });
            index += 1;
        }
    }
    lines
}

fn expenses_title(state: &ExpenseBrowser) -> String {
    let count = state.expense_count();
    let mut title = format!("{count} expenses");
    if state.groups().is_some() && !state.last_page_reached() {
        title.push_str(" (n for more)");
    }
    title
}

fn render_header_text(state: &ExpenseBrowser, view_data: &ViewData) -> String {
    let search = match &view_data.search_input {
        Some(buffer) => format!("search: {buffer}_"),
        None if state.search_term().trim().is_empty() => "search: -".to_owned(),
        None => format!("search: {}", state.search_term().trim()),
    };
    let total: Decimal = state
        .groups()
        .unwrap_or_default()
        .iter()
        .map(ExpenseGroup::total)
        .sum();

    let mut parts = vec![
        format!("< {} >", month_label(state.month())),
        search,
        format!("sort: {}", state.sort().label()),
        format!("total: {}", format_amount(total)),
    ];
    if view_data.pending_acks.values().any(|purpose| *purpose == AckPurpose::Refresh) {
        parts.push("refreshing".to_owned());
    } else if state.is_loading() {
        parts.push("loading".to_owned());
    }
    parts.join(" | ")
}

fn render_editor_overlay_text(ui: &EditorUiState) -> String {
    let form = ui.editor.form();
    let category = form
        .category
        .as_ref()
        .map_or("-".to_owned(), |category| category.name.clone());

    let mut lines = Vec::new();
    for field in EditorField::ALL {
        let marker = if field == ui.field { ">" } else { " " };
        let value = match field {
            EditorField::Name => ui.name.clone(),
            EditorField::Amount => ui.amount.clone(),
            EditorField::Date => ui.date.clone(),
            EditorField::Category => format!("{category} (enter to pick)"),
        };
        lines.push(format!("{marker} {:<9} {value}", format!("{}:", field.label())));
    }
    lines.push(String::new());

    let state_line = if ui.editor.is_submitting() {
        "saving...".to_owned()
    } else if ui.editor.is_deleting() {
        "deleting...".to_owned()
    } else {
        ui.editor
            .validation_error()
            .unwrap_or_else(|| "ready to save".to_owned())
    };
    lines.push(state_line);

    let mut hint = "tab field | ctrl+s save".to_owned();
    if ui.editor.can_delete() {
        hint.push_str(" | ctrl+d delete");
    }
    hint.push_str(" | esc cancel");
    lines.push(hint);
    lines.join("\n")
}

fn render_picker_overlay_text(picker: &PickerUiState) -> String {
    let mut lines: Vec<String> = picker
        .categories
        .iter()
        .enumerate()
        .map(|(index, category)| {
            let marker = if index == picker.cursor { ">" } else { " " };
            format!("{marker} {}", category.name)
        })
        .collect();
    lines.push(String::new());
    lines.push("j/k move | enter pick | esc cancel".to_owned());
    lines.join("\n")
}

fn status_text(view_data: &ViewData) -> String {
    match &view_data.status {
        Some(status) => status.text.clone(),
        None => "a add | e edit | / search | s sort | r refresh | ? help | q quit".to_owned(),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
month: h/left previous | l/right next\n\
list: j/k move | n more | r refresh | / search | s sort | q quit\n\
edit: a add | enter/e edit\n\
editor: tab/shift+tab field | enter pick category or save | ctrl+s save | ctrl+d delete | esc cancel\n\
confirm: y delete | n/esc cancel\n\
category: j/k move | enter pick | esc cancel"
}

fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

fn format_day_label(date: Date) -> String {
    date.format(DAY_LABEL_FORMAT)
        .unwrap_or_else(|_| format_date(date))
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

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, EditorField, InternalEvent, ViewData, body_lines, emit_status, format_amount,
        format_day_label, handle_key_event, help_overlay_text, process_internal_events, render,
        render_editor_overlay_text, render_header_text, run_browser_command,
    };
    use anyhow::{Result, anyhow};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use rust_decimal::Decimal;
    use spendwise_app::{
        BrowserCommand, Category, CategoryId, Expense, ExpenseBrowser, ExpenseGateway, ExpenseId,
        ExpenseQuery, GatewayError, GatewayResult, Page, PageRequest, PageResponse, SortCriterion,
        SortDirection,
    };
    use spendwise_testkit::{GatewayOperation, InMemoryGateway};
    use std::sync::mpsc;
    use time::{Date, Month};

    #[derive(Debug, Clone)]
    struct TestRuntime {
        gateway: InMemoryGateway,
        today: Date,
        refuse_spawn: bool,
    }

    impl ExpenseGateway for TestRuntime {
        fn list_expenses(&self, query: &ExpenseQuery) -> GatewayResult<Page<Expense>> {
            self.gateway.list_expenses(query)
        }

        fn upsert_expense(&self, expense: &Expense) -> GatewayResult<()> {
            self.gateway.upsert_expense(expense)
        }

        fn delete_expense(&self, id: &ExpenseId) -> GatewayResult<()> {
            self.gateway.delete_expense(id)
        }

        fn list_categories(&self, direction: SortDirection) -> GatewayResult<Vec<Category>> {
            self.gateway.list_categories(direction)
        }
    }

    impl AppRuntime for TestRuntime {
        fn today(&self) -> Date {
            self.today
        }

        fn spawn_list_expenses(
            &mut self,
            request: PageRequest,
            tx: mpsc::Sender<InternalEvent>,
        ) -> Result<()> {
            if self.refuse_spawn {
                return Err(anyhow!("thread limit reached"));
            }
            let result = self.gateway.list_expenses(&request.query);
            tx.send(InternalEvent::PageLoaded(PageResponse { request, result }))?;
            Ok(())
        }
    }

    struct Harness {
        browser: ExpenseBrowser,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: mpsc::Sender<InternalEvent>,
        rx: mpsc::Receiver<InternalEvent>,
    }

    impl Harness {
        fn new(page_size: u32) -> Result<Self> {
            let gateway = InMemoryGateway::new(vec![
                Category {
                    id: CategoryId::new("c-1"),
                    name: "Food".to_owned(),
                },
                Category {
                    id: CategoryId::new("c-2"),
                    name: "Transport".to_owned(),
                },
            ]);
            gateway.insert(expense("Coffee", march(2)?));
            gateway.insert(expense("Lunch", march(5)?));
            gateway.insert(expense("Iced coffee", march(5)?));
            gateway.insert(expense(
                "Rent",
                Date::from_calendar_date(2024, Month::April, 1)?,
            ));

            let today = march(15)?;
            let (tx, rx) = mpsc::channel();
            let mut harness = Self {
                browser: ExpenseBrowser::new(today, page_size),
                runtime: TestRuntime {
                    gateway,
                    today,
                    refuse_spawn: false,
                },
                view_data: ViewData::default(),
                tx,
                rx,
            };
            run_browser_command(
                &mut harness.browser,
                &mut harness.runtime,
                &mut harness.view_data,
                &harness.tx,
                BrowserCommand::Reload { ack: None },
            );
            harness.pump();
            Ok(harness)
        }

        fn pump(&mut self) {
            process_internal_events(
                &mut self.browser,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                &self.rx,
            );
        }

        fn key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
            let quit = handle_key_event(
                &mut self.browser,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                KeyEvent::new(code, modifiers),
            );
            self.pump();
            quit
        }

        fn press(&mut self, code: KeyCode) -> bool {
            self.key(code, KeyModifiers::NONE)
        }

        fn ctrl(&mut self, ch: char) -> bool {
            self.key(KeyCode::Char(ch), KeyModifiers::CONTROL)
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyCode::Char(ch));
            }
        }

        fn status(&self) -> String {
            self.view_data
                .status
                .as_ref()
                .map(|status| status.text.clone())
                .unwrap_or_default()
        }

        fn names(&self) -> Vec<String> {
            self.browser
                .groups()
                .unwrap_or_default()
                .iter()
                .flat_map(|group| group.expenses.iter().map(|expense| expense.name.clone()))
                .collect()
        }
    }

    fn march(day: u8) -> Result<Date> {
        Ok(Date::from_calendar_date(2024, Month::March, day)?)
    }

    fn expense(name: &str, date: Date) -> Expense {
        Expense {
            id: None,
            name: name.to_owned(),
            amount: Decimal::new(450, 2),
            date,
            category: None,
        }
    }

    #[test]
    fn initial_load_groups_current_month_by_day() -> Result<()> {
        let harness = Harness::new(25)?;
        let groups = harness
            .browser
            .groups()
            .ok_or_else(|| anyhow!("groups should be loaded"))?;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, march(5)?);
        assert_eq!(harness.names(), vec!["Iced coffee", "Lunch", "Coffee"]);
        assert!(!harness.browser.is_loading());
        Ok(())
    }

    #[test]
    fn month_keys_shift_and_reload() -> Result<()> {
        let mut harness = Harness::new(25)?;

        harness.press(KeyCode::Char('l'));
        assert_eq!(
            harness.browser.month(),
            Date::from_calendar_date(2024, Month::April, 1)?
        );
        assert_eq!(harness.names(), vec!["Rent"]);

        harness.press(KeyCode::Left);
        assert_eq!(harness.browser.month(), march(1)?);
        assert_eq!(harness.names().len(), 3);
        Ok(())
    }

    #[test]
    fn search_applies_on_enter_and_aborts_on_esc() -> Result<()> {
        let mut harness = Harness::new(25)?;

        harness.press(KeyCode::Char('/'));
        harness.type_text("coffee");
        assert!(render_header_text(&harness.browser, &harness.view_data).contains("coffee_"));
        harness.press(KeyCode::Enter);

        assert_eq!(harness.browser.search_term(), "coffee");
        assert_eq!(harness.names(), vec!["Iced coffee", "Coffee"]);
        let last_query = harness
            .runtime
            .gateway
            .queries()
            .pop()
            .ok_or_else(|| anyhow!("a query should have been sent"))?;
        assert_eq!(last_query.search.as_deref(), Some("coffee"));

        let sent = harness.runtime.gateway.queries().len();
        harness.press(KeyCode::Char('/'));
        harness.type_text("zzz");
        harness.press(KeyCode::Esc);
        assert_eq!(harness.browser.search_term(), "coffee");
        assert_eq!(harness.runtime.gateway.queries().len(), sent);
        Ok(())
    }

    #[test]
    fn sort_key_cycles_criteria() -> Result<()> {
        let mut harness = Harness::new(25)?;
        harness.press(KeyCode::Char('s'));
        assert_eq!(harness.browser.sort(), SortCriterion::CREATED_ASC);
        assert_eq!(harness.names(), vec!["Coffee", "Lunch", "Iced coffee"]);
        assert!(harness.status().contains("oldest first"));
        Ok(())
    }

    #[test]
    fn add_flow_saves_and_reloads() -> Result<()> {
        let mut harness = Harness::new(25)?;

        harness.press(KeyCode::Char('a'));
        let ui = harness
            .view_data
            .editor
            .as_ref()
            .ok_or_else(|| anyhow!("editor should open"))?;
        assert_eq!(ui.editor.title(), "add expense");
        assert_eq!(ui.date, "2024-03-15");
        assert_eq!(ui.editor.categories().len(), 2);

        harness.type_text("Bus");
        harness.press(KeyCode::Tab);
        harness.type_text("2,50");
        harness.ctrl('s');

        assert!(harness.view_data.editor.is_none());
        assert_eq!(harness.status(), "Expense saved successfully");
        assert_eq!(harness.runtime.gateway.expenses().len(), 5);
        assert!(harness.names().contains(&"Bus".to_owned()));
        Ok(())
    }

    #[test]
    fn save_with_blank_name_keeps_editor_open() -> Result<()> {
        let mut harness = Harness::new(25)?;

        harness.press(KeyCode::Char('a'));
        harness.ctrl('s');

        let ui = harness
            .view_data
            .editor
            .as_ref()
            .ok_or_else(|| anyhow!("editor should stay open"))?;
        assert!(!ui.editor.is_submitting());
        assert!(harness.status().contains("name is required"));
        assert_eq!(harness.runtime.gateway.expenses().len(), 4);
        Ok(())
    }

    #[test]
    fn delete_requires_confirmation() -> Result<()> {
        let mut harness = Harness::new(25)?;

        harness.press(KeyCode::Enter);
        assert!(harness.view_data.editor.is_some());
        harness.ctrl('d');
        assert!(harness.view_data.confirm.is_some());

        harness.press(KeyCode::Char('n'));
        assert!(harness.view_data.confirm.is_none());
        assert!(harness.view_data.editor.is_some());
        assert_eq!(harness.runtime.gateway.expenses().len(), 4);

        harness.ctrl('d');
        harness.press(KeyCode::Char('y'));
        assert!(harness.view_data.editor.is_none());
        assert_eq!(harness.status(), "Expense deleted successfully");
        assert_eq!(harness.names(), vec!["Lunch", "Coffee"]);
        Ok(())
    }

    #[test]
    fn new_expense_cannot_be_deleted() -> Result<()> {
        let mut harness = Harness::new(25)?;
        harness.press(KeyCode::Char('a'));
        harness.ctrl('d');
        assert!(harness.view_data.confirm.is_none());
        assert!(harness.status().contains("cannot be deleted"));
        Ok(())
    }

    #[test]
    fn category_picker_sets_form_category() -> Result<()> {
        let mut harness = Harness::new(25)?;

        harness.press(KeyCode::Char('a'));
        for _ in 0..3 {
            harness.press(KeyCode::Tab);
        }
        assert_eq!(
            harness.view_data.editor.as_ref().map(|ui| ui.field),
            Some(EditorField::Category)
        );
        harness.press(KeyCode::Enter);
        assert!(harness.view_data.picker.is_some());

        harness.press(KeyCode::Char('j'));
        harness.press(KeyCode::Enter);
        assert!(harness.view_data.picker.is_none());
        let category = harness
            .view_data
            .editor
            .as_ref()
            .and_then(|ui| ui.editor.form().category.clone())
            .ok_or_else(|| anyhow!("category should be picked"))?;
        assert_eq!(category.name, "Transport");
        Ok(())
    }

    #[test]
    fn escaping_picker_keeps_previous_category() -> Result<()> {
        let mut harness = Harness::new(25)?;
        harness.press(KeyCode::Char('a'));
        harness.key(KeyCode::BackTab, KeyModifiers::SHIFT);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Esc);

        let ui = harness
            .view_data
            .editor
            .as_ref()
            .ok_or_else(|| anyhow!("editor should stay open"))?;
        assert!(ui.editor.form().category.is_none());
        Ok(())
    }

    #[test]
    fn moving_past_last_row_loads_next_page() -> Result<()> {
        let mut harness = Harness::new(2)?;
        assert_eq!(harness.names().len(), 2);
        assert!(!harness.browser.last_page_reached());

        harness.press(KeyCode::Char('j'));
        assert_eq!(harness.view_data.cursor, 1);
        harness.press(KeyCode::Char('j'));
        assert_eq!(harness.names().len(), 3);
        assert!(harness.browser.last_page_reached());

        harness.press(KeyCode::Char('j'));
        assert_eq!(harness.view_data.cursor, 2);
        harness.press(KeyCode::Char('n'));
        assert!(harness.status().contains("all expenses for March 2024 loaded"));
        assert!(harness.view_data.pending_acks.is_empty());
        Ok(())
    }

    #[test]
    fn failed_refresh_shows_error_and_empty_list() -> Result<()> {
        let mut harness = Harness::new(25)?;
        harness.runtime.gateway.fail_next(
            GatewayOperation::ListExpenses,
            GatewayError::Network("connection refused".to_owned()),
        );

        harness.press(KeyCode::Char('r'));

        assert_eq!(harness.browser.groups().map(<[_]>::len), Some(0));
        let status = harness
            .view_data
            .status
            .clone()
            .ok_or_else(|| anyhow!("status should be set"))?;
        assert!(status.error);
        assert!(status.text.starts_with("Could not load expenses"));
        assert!(harness.view_data.pending_acks.is_empty());
        Ok(())
    }

    #[test]
    fn load_that_cannot_start_settles_like_a_failed_load() -> Result<()> {
        let mut harness = Harness::new(1)?;
        harness.runtime.refuse_spawn = true;

        harness.press(KeyCode::Char('r'));

        assert!(!harness.browser.is_loading());
        assert_eq!(harness.browser.groups().map(<[_]>::len), Some(0));
        assert!(harness.view_data.pending_acks.is_empty());
        let status = harness
            .view_data
            .status
            .clone()
            .ok_or_else(|| anyhow!("status should be set"))?;
        assert!(status.error);
        assert!(status.text.contains("thread limit reached"));

        harness.runtime.refuse_spawn = false;
        harness.press(KeyCode::Char('r'));
        assert!(!harness.browser.is_loading());
        assert_eq!(harness.names(), vec!["Iced coffee"]);

        harness.runtime.refuse_spawn = true;
        harness.press(KeyCode::Char('n'));
        assert!(!harness.browser.is_loading());
        assert_eq!(harness.names(), vec!["Iced coffee"]);
        assert_eq!(harness.browser.page_cursor(), 0);
        assert!(harness.view_data.pending_acks.is_empty());
        Ok(())
    }

    #[test]
    fn failed_save_keeps_editor_and_reports() -> Result<()> {
        let mut harness = Harness::new(25)?;
        harness.runtime.gateway.fail_next(
            GatewayOperation::UpsertExpense,
            GatewayError::Validation("amount too large".to_owned()),
        );

        harness.press(KeyCode::Char('e'));
        harness.ctrl('s');

        let ui = harness
            .view_data
            .editor
            .as_ref()
            .ok_or_else(|| anyhow!("editor should stay open"))?;
        assert!(!ui.editor.is_submitting());
        assert!(harness.status().starts_with("Failed to save expense"));
        Ok(())
    }

    #[test]
    fn quit_keys_only_quit_outside_text_entry() -> Result<()> {
        let mut harness = Harness::new(25)?;
        harness.press(KeyCode::Char('a'));
        assert!(!harness.press(KeyCode::Char('q')));
        let name = harness
            .view_data
            .editor
            .as_ref()
            .map(|ui| ui.name.clone())
            .unwrap_or_default();
        assert_eq!(name, "q");

        assert!(harness.ctrl('q'));
        harness.press(KeyCode::Esc);
        assert!(harness.view_data.editor.is_none());
        assert!(harness.press(KeyCode::Char('q')));
        Ok(())
    }

    #[test]
    fn help_toggles_with_question_mark() -> Result<()> {
        let mut harness = Harness::new(25)?;
        harness.key(KeyCode::Char('?'), KeyModifiers::SHIFT);
        assert!(harness.view_data.help_visible);
        harness.press(KeyCode::Char('a'));
        assert!(harness.view_data.editor.is_none());
        harness.press(KeyCode::Esc);
        assert!(!harness.view_data.help_visible);
        assert!(help_overlay_text().contains("ctrl+s save"));
        Ok(())
    }

    #[test]
    fn status_clear_ignores_stale_tokens() -> Result<()> {
        let mut harness = Harness::new(25)?;
        emit_status(&mut harness.view_data, &harness.tx, "first");
        emit_status(&mut harness.view_data, &harness.tx, "second");
        let token = harness.view_data.status_token;

        harness.tx.send(InternalEvent::ClearStatus { token: token - 1 })?;
        harness.pump();
        assert_eq!(harness.status(), "second");

        harness.tx.send(InternalEvent::ClearStatus { token })?;
        harness.pump();
        assert!(harness.view_data.status.is_none());
        Ok(())
    }

    #[test]
    fn editor_overlay_marks_focused_field() -> Result<()> {
        let mut harness = Harness::new(25)?;
        harness.press(KeyCode::Char('e'));
        harness.press(KeyCode::Tab);
        let ui = harness
            .view_data
            .editor
            .as_ref()
            .ok_or_else(|| anyhow!("editor should open"))?;
        let text = render_editor_overlay_text(ui);
        assert!(text.contains("> amount:"));
        assert!(
            text.lines()
                .any(|line| line.starts_with("  name:") && line.ends_with("Iced coffee"))
        );
        assert!(text.contains("ctrl+d delete"));
        Ok(())
    }

    #[test]
    fn body_lines_interleave_day_headers() -> Result<()> {
        let harness = Harness::new(25)?;
        let lines = body_lines(harness.browser.groups().unwrap_or_default());
        assert_eq!(lines.len(), 5);
        assert!(matches!(lines[0], super::BodyLine::Day(_)));
        assert!(matches!(lines[3], super::BodyLine::Day(_)));
        assert!(matches!(lines[4], super::BodyLine::Expense { index: 2, .. }));
        Ok(())
    }

    #[test]
    fn render_draws_month_header_and_rows() -> Result<()> {
        let harness = Harness::new(25)?;
        let mut terminal = Terminal::new(TestBackend::new(100, 24))?;
        terminal.draw(|frame| render(frame, &harness.browser, &harness.view_data))?;

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("March 2024"));
        assert!(screen.contains("Iced coffee"));
        assert!(screen.contains("Tue 05 Mar 2024"));
        Ok(())
    }

    #[test]
    fn amounts_render_with_two_decimals() -> Result<()> {
        assert_eq!(format_amount(Decimal::new(5, 0)), "5.00");
        assert_eq!(format_amount(Decimal::new(12_346, 3)), "12.35");
        assert_eq!(format_day_label(march(2)?), "Sat 02 Mar 2024");
        Ok(())
    }
}

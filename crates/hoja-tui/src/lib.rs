// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use hoja_app::{
    CellRef, CellValue, ColumnId, MoveDirection, PriorityKind, SheetCommand, SheetEvent,
    SheetState, SheetTab, StatusKind, StatusSummary, ToolbarAction,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::cmp::Ordering;
use std::io;
use std::ops::Range;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

const GUTTER_WIDTH: u16 = 5;
const MIN_COLUMN_WIDTH: u16 = 4;
const MAX_COLUMN_WIDTH: u16 = 40;
const SCROLL_STEP: usize = 3;
const DOUBLE_CLICK_MS: u64 = 400;
const TAB_DIVIDER: &str = "|";
const EDIT_CARET: &str = "▏";
const SORT_MARK_ASC: &str = " ↑";
const SORT_MARK_DESC: &str = " ↓";

pub use hoja_app::{ActionLog, NullActionLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SortSpec {
    column: ColumnId,
    direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
struct TableUiState {
    sort: Option<SortSpec>,
    widths: Vec<u16>,
    row_offset: usize,
    col_offset: usize,
}

impl Default for TableUiState {
    fn default() -> Self {
        Self {
            sort: None,
            widths: ColumnId::ALL.iter().map(|c| c.default_width()).collect(),
            row_offset: 0,
            col_offset: 0,
        }
    }
}

impl TableUiState {
    fn width(&self, column: ColumnId) -> u16 {
        self.widths
            .get(column.index())
            .copied()
            .unwrap_or(MIN_COLUMN_WIDTH)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LastClick {
    row: usize,
    column: ColumnId,
    at: Instant,
}

#[derive(Debug, Clone, PartialEq)]
struct ViewData {
    table_state: TableUiState,
    search_input: Option<String>,
    help_visible: bool,
    status_token: u64,
    status_clear_secs: u64,
    last_click: Option<LastClick>,
    screen: Rect,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            table_state: TableUiState::default(),
            search_input: None,
            help_visible: false,
            status_token: 0,
            status_clear_secs: 4,
            last_click: None,
            screen: Rect::new(0, 0, 0, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SheetStatus {
    SortAsc(&'static str),
    SortDesc(&'static str),
    SortCleared,
    SearchSet(String),
    SearchCleared,
    Toolbar(&'static str),
    TabSwitched(&'static str),
    ColumnResized(&'static str, u16),
    SelectFirst,
    EditInProgress,
    RowOutOfRange,
    HelpOpen,
    HelpHidden,
}

impl SheetStatus {
    fn message(self) -> String {
        match self {
            Self::SortAsc(column) => format!("sort {column} asc"),
            Self::SortDesc(column) => format!("sort {column} desc"),
            Self::SortCleared => "sort cleared".to_owned(),
            Self::SearchSet(query) => format!("search: '{query}'"),
            Self::SearchCleared => "search cleared".to_owned(),
            Self::Toolbar(label) => format!("{label} clicked"),
            Self::TabSwitched(label) => format!("tab: {label}"),
            Self::ColumnResized(column, width) => format!("{column} width {width}"),
            Self::SelectFirst => "select a cell first".to_owned(),
            Self::EditInProgress => "finish the edit first (enter/esc)".to_owned(),
            Self::RowOutOfRange => "row out of range".to_owned(),
            Self::HelpOpen => "help open".to_owned(),
            Self::HelpHidden => "help hidden".to_owned(),
        }
    }
}

/// Knobs the config layer feeds into the UI loop.
#[derive(Debug, Clone, PartialEq)]
pub struct UiOptions {
    pub title: String,
    pub show_summary: bool,
    pub status_clear_secs: u64,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            title: "hoja".to_owned(),
            show_summary: true,
            status_clear_secs: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

pub fn run_app<L: ActionLog>(
    state: &mut SheetState,
    log: &mut L,
    options: &UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        event::EnableMouseCapture
    )
    .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        status_clear_secs: options.status_clear_secs,
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    sync_display(state, &view_data);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        let size = terminal.size().context("query terminal size")?;
        view_data.screen = Rect::new(0, 0, size.width, size.height);
        ensure_cursor_visible(state, &mut view_data);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data, options)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, log, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse_event(state, log, &mut view_data, &internal_tx, mouse);
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(
        io::stdout(),
        event::DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )
    .context("leave alternate screen")?;
    result
}

fn process_internal_events(state: &mut SheetState, view_data: &ViewData, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(SheetCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64, secs: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(secs));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut SheetState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(SheetCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token, view_data.status_clear_secs);
}

// ---------------------------------------------------------------------------
// display order: search filter then sort, over grid row indices

fn display_order(state: &SheetState, table_state: &TableUiState) -> Vec<usize> {
    let grid = &state.grid;
    let needle = state.search.trim().to_lowercase();

    let mut order: Vec<usize> = (0..grid.row_count())
        .filter(|index| {
            if needle.is_empty() {
                return true;
            }
            let row = match grid.row(*index) {
                Some(row) => row,
                None => return false,
            };
            if row.id.get().to_string().contains(&needle) {
                return true;
            }
            ColumnId::ALL
                .iter()
                .any(|column| row.value(*column).display().to_lowercase().contains(&needle))
        })
        .collect();

    if let Some(sort) = table_state.sort {
        order.sort_by(|left, right| {
            let left_value = grid.value(*left, sort.column);
            let right_value = grid.value(*right, sort.column);
            let left_empty = left_value.map(CellValue::is_empty).unwrap_or(true);
            let right_empty = right_value.map(CellValue::is_empty).unwrap_or(true);

            // Empty cells sink to the bottom regardless of direction.
            let order = match (left_empty, right_empty) {
                (true, true) => Ordering::Equal,
                (true, false) => return Ordering::Greater,
                (false, true) => return Ordering::Less,
                (false, false) => {
                    let cmp = match (left_value, right_value) {
                        (Some(left), Some(right)) => cmp_cell_values(left, right),
                        _ => Ordering::Equal,
                    };
                    match sort.direction {
                        SortDirection::Asc => cmp,
                        SortDirection::Desc => cmp.reverse(),
                    }
                }
            };
            order.then(left.cmp(right))
        });
    }

    order
}

fn cmp_cell_values(left: &CellValue, right: &CellValue) -> Ordering {
    match (numeric_value(left), numeric_value(right)) {
        (Some(left), Some(right)) => left.total_cmp(&right),
        _ => left
            .display()
            .to_lowercase()
            .cmp(&right.display().to_lowercase()),
    }
}

/// Currency-style strings sort numerically: "6,200,000" beats "900".
fn numeric_value(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(value) => Some(*value),
        CellValue::Text(text) => {
            let cleaned = text.trim().replace(',', "");
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse().ok()
        }
    }
}

fn sync_display(state: &mut SheetState, view_data: &ViewData) {
    let order = display_order(state, &view_data.table_state);
    state.dispatch(SheetCommand::SyncDisplay { order });
}

fn cycle_sort(table_state: &mut TableUiState, column: ColumnId) -> SheetStatus {
    let label = column.header();
    match table_state.sort {
        Some(sort) if sort.column == column => match sort.direction {
            SortDirection::Asc => {
                table_state.sort = Some(SortSpec {
                    column,
                    direction: SortDirection::Desc,
                });
                SheetStatus::SortDesc(label)
            }
            SortDirection::Desc => {
                table_state.sort = None;
                SheetStatus::SortCleared
            }
        },
        _ => {
            table_state.sort = Some(SortSpec {
                column,
                direction: SortDirection::Asc,
            });
            SheetStatus::SortAsc(label)
        }
    }
}

// ---------------------------------------------------------------------------
// screen geometry, shared by render and mouse hit-testing

fn screen_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(area)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnSlot {
    column: ColumnId,
    x: u16,
    width: u16,
}

fn visible_column_slots(grid_area: Rect, table_state: &TableUiState) -> Vec<ColumnSlot> {
    let inner_x = grid_area.x.saturating_add(1);
    let inner_width = grid_area.width.saturating_sub(2);
    let right_edge = inner_x.saturating_add(inner_width);

    let mut slots = Vec::new();
    let mut x = inner_x.saturating_add(GUTTER_WIDTH).saturating_add(1);
    for column in ColumnId::ALL.iter().skip(table_state.col_offset) {
        if x >= right_edge {
            break;
        }
        let width = table_state.width(*column).min(right_edge - x);
        slots.push(ColumnSlot {
            column: *column,
            x,
            width,
        });
        x = x.saturating_add(width).saturating_add(1);
    }
    slots
}

fn grid_body_rows(grid_area: Rect) -> usize {
    // Borders plus the header row.
    grid_area.height.saturating_sub(3) as usize
}

fn toolbar_line() -> String {
    let labels = ToolbarAction::ALL
        .iter()
        .map(|action| action.label())
        .collect::<Vec<_>>()
        .join(" | ");
    format!(" {labels}")
}

fn toolbar_slots(toolbar_area: Rect) -> Vec<(ToolbarAction, Range<u16>)> {
    let mut slots = Vec::new();
    let mut x = toolbar_area.x.saturating_add(1);
    for action in ToolbarAction::ALL {
        let width = action.label().chars().count() as u16;
        slots.push((action, x..x.saturating_add(width)));
        x = x.saturating_add(width).saturating_add(3);
    }
    slots
}

fn tab_slots(tabs_area: Rect) -> Vec<(SheetTab, Range<u16>)> {
    let mut slots = Vec::new();
    let mut x = tabs_area.x.saturating_add(1);
    for tab in SheetTab::ALL {
        let width = tab.label().chars().count() as u16 + 2;
        slots.push((tab, x..x.saturating_add(width)));
        x = x.saturating_add(width).saturating_add(1);
    }
    slots
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HitTarget {
    Toolbar(ToolbarAction),
    Tab(SheetTab),
    SortHeader(ColumnId),
    Gutter(usize),
    Cell { row: usize, column: ColumnId },
    Outside,
}

fn hit_test(view_data: &ViewData, display_rows: usize, x: u16, y: u16) -> HitTarget {
    let layout = screen_layout(view_data.screen);
    let toolbar_area = layout[0];
    let tabs_area = layout[1];
    let grid_area = layout[2];

    if y == toolbar_area.y {
        for (action, range) in toolbar_slots(toolbar_area) {
            if range.contains(&x) {
                return HitTarget::Toolbar(action);
            }
        }
        return HitTarget::Outside;
    }

    if y == tabs_area.y.saturating_add(1) {
        for (tab, range) in tab_slots(tabs_area) {
            if range.contains(&x) {
                return HitTarget::Tab(tab);
            }
        }
        return HitTarget::Outside;
    }

    let inner_x = grid_area.x.saturating_add(1);
    let inner_y = grid_area.y.saturating_add(1);
    let header_y = inner_y;
    let body_top = inner_y.saturating_add(1);
    let body_bottom = grid_area
        .y
        .saturating_add(grid_area.height.saturating_sub(1));

    if y == header_y {
        for slot in visible_column_slots(grid_area, &view_data.table_state) {
            if x >= slot.x && x < slot.x.saturating_add(slot.width) {
                return HitTarget::SortHeader(slot.column);
            }
        }
        return HitTarget::Outside;
    }

    if y >= body_top && y < body_bottom {
        let row = view_data.table_state.row_offset + (y - body_top) as usize;
        if row >= display_rows {
            return HitTarget::Outside;
        }
        if x >= inner_x && x < inner_x.saturating_add(GUTTER_WIDTH) {
            return HitTarget::Gutter(row);
        }
        for slot in visible_column_slots(grid_area, &view_data.table_state) {
            if x >= slot.x && x < slot.x.saturating_add(slot.width) {
                return HitTarget::Cell {
                    row,
                    column: slot.column,
                };
            }
        }
    }

    HitTarget::Outside
}

fn ensure_cursor_visible(state: &SheetState, view_data: &mut ViewData) {
    let layout = screen_layout(view_data.screen);
    let grid_area = layout[2];
    let body = grid_body_rows(grid_area).max(1);

    let max_offset = state.display_row_count().saturating_sub(body);
    if view_data.table_state.row_offset > max_offset {
        view_data.table_state.row_offset = max_offset;
    }

    let Some(cell) = state.cursor.cell() else {
        return;
    };

    if cell.row < view_data.table_state.row_offset {
        view_data.table_state.row_offset = cell.row;
    } else if cell.row >= view_data.table_state.row_offset + body {
        view_data.table_state.row_offset = cell.row + 1 - body;
    }

    if cell.column.index() < view_data.table_state.col_offset {
        view_data.table_state.col_offset = cell.column.index();
        return;
    }
    while view_data.table_state.col_offset < cell.column.index() {
        let visible = visible_column_slots(grid_area, &view_data.table_state);
        if visible.iter().any(|slot| {
            slot.column == cell.column && slot.width >= table_width_or_min(view_data, cell.column)
        }) {
            break;
        }
        view_data.table_state.col_offset += 1;
    }
}

fn table_width_or_min(view_data: &ViewData, column: ColumnId) -> u16 {
    view_data.table_state.width(column).min(MIN_COLUMN_WIDTH)
}

// ---------------------------------------------------------------------------
// input handling

fn handle_key_event<L: ActionLog>(
    state: &mut SheetState,
    log: &mut L,
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
            emit_status(state, view_data, internal_tx, SheetStatus::HelpHidden.message());
        }
        return false;
    }

    if view_data.search_input.is_some() {
        handle_search_key(state, log, view_data, internal_tx, key);
        return false;
    }

    if state.cursor.is_editing() {
        handle_edit_key(state, log, view_data, internal_tx, key);
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
            dispatch_and_report(state, log, view_data, internal_tx, SheetCommand::Move(MoveDirection::Up));
        }
        (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
            dispatch_and_report(state, log, view_data, internal_tx, SheetCommand::Move(MoveDirection::Down));
        }
        (KeyCode::Left, _) | (KeyCode::Char('h'), KeyModifiers::NONE) => {
            dispatch_and_report(state, log, view_data, internal_tx, SheetCommand::Move(MoveDirection::Left));
        }
        (KeyCode::Right, _) | (KeyCode::Char('l'), KeyModifiers::NONE) => {
            dispatch_and_report(state, log, view_data, internal_tx, SheetCommand::Move(MoveDirection::Right));
        }
        (KeyCode::Enter, _) => {
            dispatch_and_report(state, log, view_data, internal_tx, SheetCommand::BeginEdit);
        }
        (KeyCode::Esc, _) => {
            dispatch_and_report(state, log, view_data, internal_tx, SheetCommand::ClearSelection);
        }
        (KeyCode::Char('/'), KeyModifiers::NONE) => {
            view_data.search_input = Some(state.search.clone());
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            let Some(cell) = state.cursor.cell() else {
                emit_status(state, view_data, internal_tx, SheetStatus::SelectFirst.message());
                return false;
            };
            apply_sort_cycle(state, log, view_data, internal_tx, cell.column);
        }
        (KeyCode::Char('S'), _) => {
            view_data.table_state.sort = None;
            sync_display(state, view_data);
            emit_status(state, view_data, internal_tx, SheetStatus::SortCleared.message());
        }
        (KeyCode::Char('<'), _) => {
            resize_cursor_column(state, view_data, internal_tx, -2);
        }
        (KeyCode::Char('>'), _) => {
            resize_cursor_column(state, view_data, internal_tx, 2);
        }
        (KeyCode::Char('f'), KeyModifiers::NONE) => {
            dispatch_and_report(state, log, view_data, internal_tx, SheetCommand::NextTab);
        }
        (KeyCode::Char('b'), KeyModifiers::NONE) => {
            dispatch_and_report(state, log, view_data, internal_tx, SheetCommand::PrevTab);
        }
        (KeyCode::Char(digit @ '1'..='4'), KeyModifiers::NONE) => {
            let index = digit as usize - '1' as usize;
            let tab = SheetTab::ALL[index];
            dispatch_and_report(state, log, view_data, internal_tx, SheetCommand::SetActiveTab(tab));
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) => {
            toolbar_stub(state, log, view_data, internal_tx, ToolbarAction::HideFields);
        }
        (KeyCode::Char('v'), KeyModifiers::NONE) => {
            toolbar_stub(state, log, view_data, internal_tx, ToolbarAction::CellView);
        }
        (KeyCode::Char('i'), KeyModifiers::NONE) => {
            toolbar_stub(state, log, view_data, internal_tx, ToolbarAction::Import);
        }
        (KeyCode::Char('x'), KeyModifiers::NONE) => {
            toolbar_stub(state, log, view_data, internal_tx, ToolbarAction::Export);
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            toolbar_stub(state, log, view_data, internal_tx, ToolbarAction::Share);
        }
        (KeyCode::Char('n'), KeyModifiers::NONE) => {
            toolbar_stub(state, log, view_data, internal_tx, ToolbarAction::NewAction);
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            emit_status(state, view_data, internal_tx, SheetStatus::HelpOpen.message());
        }
        _ => {}
    }
    false
}

fn handle_edit_key<L: ActionLog>(
    state: &mut SheetState,
    log: &mut L,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Enter, _) | (KeyCode::Esc, _) => {
            dispatch_and_report(state, log, view_data, internal_tx, SheetCommand::StopEditing);
            sync_display(state, view_data);
        }
        (KeyCode::Backspace, _) => {
            dispatch_and_report(
                state,
                log,
                view_data,
                internal_tx,
                SheetCommand::EditInput(hoja_app::EditInput::Backspace),
            );
        }
        (KeyCode::Char(ch), modifiers)
            if !modifiers.contains(KeyModifiers::CONTROL) =>
        {
            dispatch_and_report(
                state,
                log,
                view_data,
                internal_tx,
                SheetCommand::EditInput(hoja_app::EditInput::Char(ch)),
            );
        }
        (KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right, _) => {
            emit_status(state, view_data, internal_tx, SheetStatus::EditInProgress.message());
        }
        _ => {}
    }
}

fn handle_search_key<L: ActionLog>(
    state: &mut SheetState,
    log: &mut L,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Enter => {
            let query = view_data.search_input.take().unwrap_or_default();
            dispatch_and_report(state, log, view_data, internal_tx, SheetCommand::SetSearch(query.clone()));
            view_data.table_state.row_offset = 0;
            sync_display(state, view_data);
            let status = if query.is_empty() {
                SheetStatus::SearchCleared
            } else {
                SheetStatus::SearchSet(query)
            };
            emit_status(state, view_data, internal_tx, status.message());
        }
        KeyCode::Esc => {
            view_data.search_input = None;
        }
        KeyCode::Backspace => {
            if let Some(buffer) = view_data.search_input.as_mut() {
                buffer.pop();
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(buffer) = view_data.search_input.as_mut() {
                buffer.push(ch);
            }
        }
        _ => {}
    }
}

fn handle_mouse_event<L: ActionLog>(
    state: &mut SheetState,
    log: &mut L,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mouse: MouseEvent,
) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let target = hit_test(view_data, state.display_row_count(), mouse.column, mouse.row);
            handle_click(state, log, view_data, internal_tx, target);
        }
        MouseEventKind::ScrollDown => {
            let layout = screen_layout(view_data.screen);
            let body = grid_body_rows(layout[2]).max(1);
            let max_offset = state.display_row_count().saturating_sub(body);
            view_data.table_state.row_offset =
                (view_data.table_state.row_offset + SCROLL_STEP).min(max_offset);
        }
        MouseEventKind::ScrollUp => {
            view_data.table_state.row_offset =
                view_data.table_state.row_offset.saturating_sub(SCROLL_STEP);
        }
        _ => {}
    }
}

fn handle_click<L: ActionLog>(
    state: &mut SheetState,
    log: &mut L,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    target: HitTarget,
) {
    match target {
        HitTarget::Toolbar(action) => {
            toolbar_stub(state, log, view_data, internal_tx, action);
        }
        HitTarget::Tab(tab) => {
            dispatch_and_report(state, log, view_data, internal_tx, SheetCommand::SetActiveTab(tab));
        }
        HitTarget::SortHeader(column) => {
            apply_sort_cycle(state, log, view_data, internal_tx, column);
        }
        HitTarget::Gutter(row) => {
            // The row-number column is neither selectable nor editable; the
            // click still leaves a trace.
            let label = state
                .grid_row_for_display(row)
                .and_then(|grid_row| state.grid.row(grid_row))
                .map(|record| record.id.get().to_string())
                .unwrap_or_default();
            record_action(state, log, view_data, internal_tx, &format!("gutter clicked: row {label}"));
        }
        HitTarget::Cell { row, column } => {
            let now = Instant::now();
            let is_double = view_data.last_click.is_some_and(|click| {
                click.row == row
                    && click.column == column
                    && now.duration_since(click.at) <= Duration::from_millis(DOUBLE_CLICK_MS)
            });
            view_data.last_click = Some(LastClick {
                row,
                column,
                at: now,
            });
            let was_editing = state.cursor.is_editing();
            let command = if is_double {
                SheetCommand::EditCellAt { row, column }
            } else {
                SheetCommand::SelectCell { row, column }
            };
            dispatch_and_report(state, log, view_data, internal_tx, command);
            // Clicking elsewhere ends any edit in flight; the display order
            // re-syncs here just as it does on Enter/Esc and blur.
            if was_editing && !state.cursor.is_editing() {
                sync_display(state, view_data);
            }
        }
        HitTarget::Outside => {
            let was_editing = state.cursor.is_editing();
            dispatch_and_report(state, log, view_data, internal_tx, SheetCommand::ClearSelection);
            if was_editing {
                sync_display(state, view_data);
            }
        }
    }
}

fn apply_sort_cycle<L: ActionLog>(
    state: &mut SheetState,
    log: &mut L,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    column: ColumnId,
) {
    let status = cycle_sort(&mut view_data.table_state, column);
    sync_display(state, view_data);
    let message = status.message();
    record_action(state, log, view_data, internal_tx, &message);
    emit_status(state, view_data, internal_tx, message);
}

fn toolbar_stub<L: ActionLog>(
    state: &mut SheetState,
    log: &mut L,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    action: ToolbarAction,
) {
    let message = SheetStatus::Toolbar(action.label()).message();
    record_action(state, log, view_data, internal_tx, &message);
    emit_status(state, view_data, internal_tx, message);
}

fn resize_cursor_column(
    state: &mut SheetState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    delta: i16,
) {
    let Some(cell) = state.cursor.cell() else {
        emit_status(state, view_data, internal_tx, SheetStatus::SelectFirst.message());
        return;
    };
    let index = cell.column.index();
    let current = view_data.table_state.widths[index] as i16;
    let next = (current + delta).clamp(MIN_COLUMN_WIDTH as i16, MAX_COLUMN_WIDTH as i16) as u16;
    view_data.table_state.widths[index] = next;
    emit_status(
        state,
        view_data,
        internal_tx,
        SheetStatus::ColumnResized(cell.column.header(), next).message(),
    );
}

/// Runs one command through the state machine and turns the resulting events
/// into log entries and status-line updates.
fn dispatch_and_report<L: ActionLog>(
    state: &mut SheetState,
    log: &mut L,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: SheetCommand,
) {
    let events = state.dispatch(command);
    for event in events {
        match event {
            SheetEvent::SelectionChanged(cell) => {
                let label = cell_label(state, cell);
                record_action(state, log, view_data, internal_tx, &format!("cell selected: {label}"));
            }
            SheetEvent::CursorMoved(cell) => {
                let label = cell_label(state, cell);
                record_action(state, log, view_data, internal_tx, &format!("cursor moved: {label}"));
            }
            SheetEvent::EditStarted(cell) => {
                let label = cell_label(state, cell);
                record_action(state, log, view_data, internal_tx, &format!("edit started: {label}"));
            }
            SheetEvent::EditStopped(cell) => {
                let label = cell_label(state, cell);
                record_action(state, log, view_data, internal_tx, &format!("edit stopped: {label}"));
            }
            SheetEvent::SelectionCleared => {
                record_action(state, log, view_data, internal_tx, "selection cleared");
            }
            SheetEvent::CellUpdated { row, column, value } => {
                let id = state
                    .grid
                    .row(row)
                    .map(|record| record.id.get().to_string())
                    .unwrap_or_default();
                record_action(
                    state,
                    log,
                    view_data,
                    internal_tx,
                    &format!("cell updated: {}{} = '{}'", column.as_str(), id, value.display()),
                );
            }
            SheetEvent::TabChanged(tab) => {
                let message = SheetStatus::TabSwitched(tab.label()).message();
                record_action(state, log, view_data, internal_tx, &message);
                emit_status(state, view_data, internal_tx, message);
            }
            SheetEvent::Rejected(reason) => {
                let status = match reason {
                    hoja_app::RejectReason::NothingSelected => SheetStatus::SelectFirst,
                    hoja_app::RejectReason::EditInProgress => SheetStatus::EditInProgress,
                    hoja_app::RejectReason::NotEditing => SheetStatus::SelectFirst,
                    hoja_app::RejectReason::RowOutOfRange
                    | hoja_app::RejectReason::BadDisplayOrder => SheetStatus::RowOutOfRange,
                };
                emit_status(state, view_data, internal_tx, status.message());
            }
            SheetEvent::SearchChanged(_)
            | SheetEvent::StatusUpdated(_)
            | SheetEvent::StatusCleared => {}
        }
    }
}

fn record_action<L: ActionLog>(
    state: &mut SheetState,
    log: &mut L,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    action: &str,
) {
    if let Err(error) = log.record(action) {
        emit_status(state, view_data, internal_tx, format!("action log failed: {error}"));
    }
}

/// "C3"-style label using the row's stable id, not its display position.
fn cell_label(state: &SheetState, cell: CellRef) -> String {
    let id = state
        .grid_row_for_display(cell.row)
        .and_then(|grid_row| state.grid.row(grid_row))
        .map(|record| record.id.get().to_string())
        .unwrap_or_else(|| cell.row.to_string());
    format!("{}{}", cell.column.as_str(), id)
}

// ---------------------------------------------------------------------------
// rendering

fn render(frame: &mut ratatui::Frame<'_>, state: &SheetState, view_data: &ViewData, options: &UiOptions) {
    let layout = screen_layout(frame.area());

    let toolbar = Paragraph::new(toolbar_line()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(toolbar, layout[0]);

    let selected = SheetTab::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tabs = Tabs::new(SheetTab::ALL.iter().map(|tab| tab.label()))
        .block(
            Block::default()
                .title(options.title.clone())
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::White))
        .divider(TAB_DIVIDER)
        .padding(" ", " ")
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[1]);

    render_grid(frame, layout[2], state, view_data);

    if options.show_summary {
        let summary = Paragraph::new(summary_line(state)).style(Style::default().fg(Color::White));
        frame.render_widget(summary, layout[3]);
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[4]);

    if view_data.help_visible {
        let area = centered_rect(70, 70, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_grid(frame: &mut ratatui::Frame<'_>, area: Rect, state: &SheetState, view_data: &ViewData) {
    let slots = visible_column_slots(area, &view_data.table_state);

    let mut widths = Vec::with_capacity(slots.len() + 1);
    widths.push(Constraint::Length(GUTTER_WIDTH));
    widths.extend(slots.iter().map(|slot| Constraint::Length(slot.width)));

    let mut header_cells = Vec::with_capacity(slots.len() + 1);
    header_cells.push(Cell::from("#").style(Style::default().fg(Color::DarkGray)));
    header_cells.extend(slots.iter().map(|slot| {
        Cell::from(header_label(slot.column, &view_data.table_state)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let header = Row::new(header_cells);

    let body = grid_body_rows(area);
    let first = view_data.table_state.row_offset;
    let last = (first + body).min(state.display_row_count());
    let cursor = state.cursor.cell();
    let editing = state.cursor.is_editing();

    let rows = (first..last).filter_map(|display_row| {
        let grid_row = state.grid_row_for_display(display_row)?;
        let record = state.grid.row(grid_row)?;
        let selected_row = cursor.is_some_and(|cell| cell.row == display_row);

        let mut cells = Vec::with_capacity(slots.len() + 1);
        let gutter_style = if selected_row {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        cells.push(Cell::from(record.id.get().to_string()).style(gutter_style));

        for slot in &slots {
            let value = record.value(slot.column);
            let is_cursor = cursor
                .is_some_and(|cell| cell.row == display_row && cell.column == slot.column);

            let text = if is_cursor && editing {
                format!("{}{EDIT_CARET}", value.display())
            } else {
                value.display()
            };

            let mut style = badge_style(slot.column, value);
            if selected_row {
                style = style.bg(Color::DarkGray);
            }
            if is_cursor && editing {
                style = Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD);
            } else if is_cursor {
                style = Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD);
            }
            cells.push(Cell::from(text).style(style));
        }

        Some(Row::new(cells))
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(grid_title(state))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn header_label(column: ColumnId, table_state: &TableUiState) -> String {
    let mut label = column.header().to_owned();
    if let Some(sort) = table_state.sort
        && sort.column == column
    {
        label.push_str(match sort.direction {
            SortDirection::Asc => SORT_MARK_ASC,
            SortDirection::Desc => SORT_MARK_DESC,
        });
    }
    label
}

/// Status and priority cells carry the badge colors; everything else is
/// plain.
fn badge_style(column: ColumnId, value: &CellValue) -> Style {
    match column {
        ColumnId::C => match StatusKind::parse(&value.display()) {
            Some(StatusKind::InProcess) => Style::default().fg(Color::Yellow),
            Some(StatusKind::NeedToStart) => Style::default().fg(Color::Blue),
            Some(StatusKind::Complete) => Style::default().fg(Color::Green),
            Some(StatusKind::Blocked) => Style::default().fg(Color::Red),
            None => Style::default(),
        },
        ColumnId::G => match PriorityKind::parse(&value.display()) {
            Some(PriorityKind::High) => Style::default().fg(Color::Red),
            Some(PriorityKind::Medium) => Style::default().fg(Color::Yellow),
            Some(PriorityKind::Low) => Style::default().fg(Color::Blue),
            None => Style::default(),
        },
        _ => Style::default(),
    }
}

fn grid_title(state: &SheetState) -> String {
    let shown = state.display_row_count();
    let total = state.grid.row_count();
    let mut title = if shown == total {
        format!("{} — {total} rows", state.active_tab.label())
    } else {
        format!("{} — {shown} of {total} rows", state.active_tab.label())
    };
    if !state.search.is_empty() {
        title.push_str(&format!(" | search '{}'", state.search));
    }
    title
}

fn summary_line(state: &SheetState) -> String {
    let summary = StatusSummary::tally(&state.grid);
    format!(
        " All {} | Need to start {} | In-process {} | Complete {} | Blocked {}",
        summary.all,
        summary.need_to_start,
        summary.in_process,
        summary.complete,
        summary.blocked
    )
}

fn status_text(state: &SheetState, view_data: &ViewData) -> String {
    if let Some(buffer) = &view_data.search_input {
        return format!("SEARCH | /{buffer}▏ | enter apply, esc cancel");
    }

    let mode = if state.cursor.is_editing() {
        "EDIT"
    } else {
        "NAV"
    };
    let default = "arrows/hjkl | enter edit | / search | s/S sort | </> width | f/b tabs | ? help | ctrl+q";
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {default}"),
        None => format!("{mode} | {default}"),
    }
}

fn help_overlay_text() -> &'static str {
    "keys\n\
     \n\
     arrows, h/j/k/l   move the selection (clamped at the edges)\n\
     enter             edit the selected cell; enter/esc stops editing\n\
     esc               clear the selection\n\
     /                 search all cells (enter applies, esc cancels)\n\
     s                 cycle sort on the selected column (asc, desc, off)\n\
     S                 clear sorting\n\
     < >               narrow / widen the selected column\n\
     f, b, 1-4         switch sheet tabs\n\
     d v i x r n       toolbar actions (recorded only)\n\
     ctrl+q            quit\n\
     \n\
     mouse\n\
     \n\
     click             select a cell; headers cycle sort; tabs switch\n\
     double-click      edit a cell\n\
     click away        clear the selection (stops any edit)\n\
     scroll            move the viewport\n\
     \n\
     edits are written through on every keystroke; esc never reverts"
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
        HitTarget, LastClick, SheetStatus, SortDirection, SortSpec, TableUiState,
        ViewData, cmp_cell_values, cycle_sort, display_order, ensure_cursor_visible,
        grid_body_rows, handle_key_event, handle_mouse_event, header_label, hit_test,
        numeric_value, screen_layout, status_text, summary_line, sync_display, tab_slots,
        toolbar_slots, visible_column_slots,
    };
    use crossterm::event::{KeyCode, MouseEvent};
    use hoja_app::{
        CellRef, CellValue, ColumnId, CursorState, Grid, SheetCommand, SheetState, SheetTab,
        ToolbarAction,
    };
    use hoja_testkit::{
        FailingLog, RecordingLog, ctrl_key, grid_with_column_a, grid_with_statuses, key,
        left_click, scroll_down, scroll_up, seeded_state,
    };
    use ratatui::layout::Rect;
    use std::cmp::Ordering;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    fn view_for(screen: Rect) -> ViewData {
        ViewData {
            screen,
            ..ViewData::default()
        }
    }

    fn wide_screen() -> Rect {
        Rect::new(0, 0, 200, 40)
    }

    fn click(x: u16, y: u16) -> MouseEvent {
        left_click(x, y)
    }

    #[test]
    fn numeric_value_tolerates_commas() {
        assert_eq!(numeric_value(&CellValue::text("6,200,000")), Some(6_200_000.0));
        assert_eq!(numeric_value(&CellValue::text(" 42 ")), Some(42.0));
        assert_eq!(numeric_value(&CellValue::text("High")), None);
        assert_eq!(numeric_value(&CellValue::text("")), None);
        assert_eq!(numeric_value(&CellValue::Number(2.5)), Some(2.5));
    }

    #[test]
    fn cell_comparison_prefers_numbers_then_case_insensitive_text() {
        assert_eq!(
            cmp_cell_values(&CellValue::text("900"), &CellValue::text("6,200,000")),
            Ordering::Less
        );
        assert_eq!(
            cmp_cell_values(&CellValue::text("apple"), &CellValue::text("Banana")),
            Ordering::Less
        );
    }

    #[test]
    fn display_order_defaults_to_grid_order() {
        let state = SheetState::default();
        let table_state = TableUiState::default();
        let order = display_order(&state, &table_state);
        assert_eq!(order.len(), 100);
        assert_eq!(order[0], 0);
        assert_eq!(order[99], 99);
    }

    #[test]
    fn search_narrows_to_matching_rows_case_insensitively() {
        let mut state = SheetState::default();
        state.dispatch(SheetCommand::SetSearch("PRESS".to_owned()));
        let order = display_order(&state, &TableUiState::default());
        assert_eq!(order, vec![1]);
    }

    #[test]
    fn sort_asc_orders_currency_numerically_with_blanks_last() {
        let state = SheetState::default();
        let table_state = TableUiState {
            sort: Some(SortSpec {
                column: ColumnId::I,
                direction: SortDirection::Asc,
            }),
            ..TableUiState::default()
        };
        let order = display_order(&state, &table_state);
        assert_eq!(&order[..5], &[4, 1, 2, 3, 0]);
        // Blank rows keep their relative order after the populated ones.
        assert_eq!(order[5], 5);
        assert_eq!(order[99], 99);
    }

    #[test]
    fn sort_desc_reverses_values_but_keeps_blanks_last() {
        let state = SheetState::default();
        let table_state = TableUiState {
            sort: Some(SortSpec {
                column: ColumnId::I,
                direction: SortDirection::Desc,
            }),
            ..TableUiState::default()
        };
        let order = display_order(&state, &table_state);
        assert_eq!(&order[..5], &[0, 3, 2, 1, 4]);
        assert_eq!(order[5], 5);
    }

    #[test]
    fn sort_on_text_column_is_alphabetical() {
        let state = SheetState::default();
        let table_state = TableUiState {
            sort: Some(SortSpec {
                column: ColumnId::A,
                direction: SortDirection::Asc,
            }),
            ..TableUiState::default()
        };
        let order = display_order(&state, &table_state);
        assert_eq!(&order[..5], &[3, 2, 0, 4, 1]);
    }

    #[test]
    fn cycle_sort_goes_asc_desc_off() {
        let mut table_state = TableUiState::default();
        assert_eq!(
            cycle_sort(&mut table_state, ColumnId::C),
            SheetStatus::SortAsc("Status")
        );
        assert_eq!(
            cycle_sort(&mut table_state, ColumnId::C),
            SheetStatus::SortDesc("Status")
        );
        assert_eq!(
            cycle_sort(&mut table_state, ColumnId::C),
            SheetStatus::SortCleared
        );
        assert_eq!(table_state.sort, None);
    }

    #[test]
    fn cycle_sort_on_another_column_restarts_ascending() {
        let mut table_state = TableUiState::default();
        cycle_sort(&mut table_state, ColumnId::C);
        assert_eq!(
            cycle_sort(&mut table_state, ColumnId::G),
            SheetStatus::SortAsc("Priority")
        );
        assert_eq!(
            table_state.sort,
            Some(SortSpec {
                column: ColumnId::G,
                direction: SortDirection::Asc,
            })
        );
    }

    #[test]
    fn header_label_carries_sort_marker() {
        let mut table_state = TableUiState::default();
        assert_eq!(header_label(ColumnId::C, &table_state), "Status");
        cycle_sort(&mut table_state, ColumnId::C);
        assert_eq!(header_label(ColumnId::C, &table_state), "Status ↑");
        cycle_sort(&mut table_state, ColumnId::C);
        assert_eq!(header_label(ColumnId::C, &table_state), "Status ↓");
    }

    #[test]
    fn toolbar_hit_test_finds_every_action() {
        let view = view_for(wide_screen());
        let layout = screen_layout(view.screen);
        for (action, range) in toolbar_slots(layout[0]) {
            assert_eq!(
                hit_test(&view, 100, range.start, layout[0].y),
                HitTarget::Toolbar(action)
            );
        }
        assert_eq!(hit_test(&view, 100, 199, layout[0].y), HitTarget::Outside);
    }

    #[test]
    fn tab_hit_test_finds_every_tab() {
        let view = view_for(wide_screen());
        let layout = screen_layout(view.screen);
        let y = layout[1].y + 1;
        for (tab, range) in tab_slots(layout[1]) {
            assert_eq!(hit_test(&view, 100, range.start + 1, y), HitTarget::Tab(tab));
        }
    }

    #[test]
    fn grid_hit_test_maps_header_gutter_and_cells() {
        let view = view_for(wide_screen());
        let layout = screen_layout(view.screen);
        let grid = layout[2];
        let slots = visible_column_slots(grid, &view.table_state);
        assert!(!slots.is_empty());

        let header_y = grid.y + 1;
        assert_eq!(
            hit_test(&view, 100, slots[0].x, header_y),
            HitTarget::SortHeader(ColumnId::A)
        );

        let first_body_y = grid.y + 2;
        assert_eq!(hit_test(&view, 100, grid.x + 1, first_body_y), HitTarget::Gutter(0));
        assert_eq!(
            hit_test(&view, 100, slots[1].x, first_body_y + 3),
            HitTarget::Cell {
                row: 3,
                column: ColumnId::B,
            }
        );
    }

    #[test]
    fn grid_hit_test_honors_row_offset_and_row_count() {
        let mut view = view_for(wide_screen());
        view.table_state.row_offset = 10;
        let layout = screen_layout(view.screen);
        let grid = layout[2];
        let slots = visible_column_slots(grid, &view.table_state);

        let first_body_y = grid.y + 2;
        assert_eq!(
            hit_test(&view, 100, slots[0].x, first_body_y),
            HitTarget::Cell {
                row: 10,
                column: ColumnId::A,
            }
        );
        // A click below the last displayed row is a blur, not a cell.
        assert_eq!(hit_test(&view, 11, slots[0].x, first_body_y + 5), HitTarget::Outside);
    }

    #[test]
    fn click_selects_and_double_click_edits() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        let layout = screen_layout(view.screen);
        let grid = layout[2];
        let slots = visible_column_slots(grid, &view.table_state);
        let x = slots[0].x;
        let y = grid.y + 2;

        handle_mouse_event(&mut state, &mut log, &mut view, &tx, click(x, y));
        assert_eq!(
            state.cursor,
            CursorState::Selected(CellRef::new(0, ColumnId::A))
        );

        handle_mouse_event(&mut state, &mut log, &mut view, &tx, click(x, y));
        assert_eq!(
            state.cursor,
            CursorState::Editing(CellRef::new(0, ColumnId::A))
        );
        assert!(log.contains("cell selected: A1"));
        assert!(log.contains("edit started: A1"));
    }

    #[test]
    fn stale_click_does_not_count_as_double() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        let layout = screen_layout(view.screen);
        let grid = layout[2];
        let slots = visible_column_slots(grid, &view.table_state);
        let x = slots[0].x;
        let y = grid.y + 2;

        handle_mouse_event(&mut state, &mut log, &mut view, &tx, click(x, y));
        view.last_click = Some(LastClick {
            row: 0,
            column: ColumnId::A,
            at: Instant::now() - Duration::from_secs(2),
        });
        handle_mouse_event(&mut state, &mut log, &mut view, &tx, click(x, y));
        assert_eq!(
            state.cursor,
            CursorState::Selected(CellRef::new(0, ColumnId::A))
        );
    }

    #[test]
    fn click_away_blurs_and_stops_editing() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        state.dispatch(SheetCommand::EditCellAt {
            row: 0,
            column: ColumnId::A,
        });
        state.dispatch(SheetCommand::EditInput(hoja_app::EditInput::Char('z')));

        // Bottom-left corner sits in the status bar, outside the grid.
        handle_mouse_event(&mut state, &mut log, &mut view, &tx, click(0, 38));
        assert_eq!(state.cursor, CursorState::Idle);
        assert_eq!(
            state.grid.value(0, ColumnId::A),
            Some(&CellValue::text("Launch social media campaign for pro...z"))
        );
    }

    #[test]
    fn gutter_click_never_selects() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        let layout = screen_layout(view.screen);
        let grid = layout[2];
        handle_mouse_event(&mut state, &mut log, &mut view, &tx, click(grid.x + 1, grid.y + 2));
        assert_eq!(state.cursor, CursorState::Idle);
        assert!(log.contains("gutter clicked: row 1"));
    }

    #[test]
    fn header_click_cycles_sort_and_resyncs_display() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        let layout = screen_layout(view.screen);
        let grid = layout[2];
        let slots = visible_column_slots(grid, &view.table_state);
        let est_value = slots
            .iter()
            .find(|slot| slot.column == ColumnId::I)
            .expect("Est. Value visible on a wide screen");

        handle_mouse_event(
            &mut state,
            &mut log,
            &mut view,
            &tx,
            click(est_value.x, grid.y + 1),
        );
        // Cheapest row (id 5) now displays first.
        assert_eq!(state.grid_row_for_display(0), Some(4));
        assert!(log.contains("sort Est. Value asc"));
    }

    #[test]
    fn toolbar_click_records_and_reports_the_stub() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        let layout = screen_layout(view.screen);
        let slots = toolbar_slots(layout[0]);
        let (action, range) = slots
            .iter()
            .find(|(action, _)| *action == ToolbarAction::Import)
            .cloned()
            .expect("import slot");
        assert_eq!(action, ToolbarAction::Import);

        handle_mouse_event(&mut state, &mut log, &mut view, &tx, click(range.start, layout[0].y));
        assert_eq!(log.entries(), vec!["Import clicked".to_owned()]);
        assert_eq!(state.status_line.as_deref(), Some("Import clicked"));
        // The grid itself is untouched.
        assert_eq!(state.grid, Grid::seed());
    }

    #[test]
    fn keyboard_edit_flow_writes_through() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        state.dispatch(SheetCommand::SelectCell {
            row: 2,
            column: ColumnId::D,
        });
        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Enter));
        assert!(state.cursor.is_editing());

        for ch in "!!".chars() {
            handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char(ch)));
        }
        assert_eq!(
            state.grid.value(2, ColumnId::D),
            Some(&CellValue::text("Mark Johnson!!"))
        );

        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Backspace));
        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Esc));
        assert_eq!(
            state.cursor,
            CursorState::Selected(CellRef::new(2, ColumnId::D))
        );
        assert_eq!(
            state.grid.value(2, ColumnId::D),
            Some(&CellValue::text("Mark Johnson!"))
        );
    }

    #[test]
    fn arrows_while_editing_report_instead_of_moving() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        state.dispatch(SheetCommand::EditCellAt {
            row: 1,
            column: ColumnId::B,
        });
        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Down));
        assert_eq!(
            state.cursor,
            CursorState::Editing(CellRef::new(1, ColumnId::B))
        );
        assert_eq!(
            state.status_line.as_deref(),
            Some("finish the edit first (enter/esc)")
        );
    }

    #[test]
    fn ctrl_q_quits_even_mid_edit() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        state.dispatch(SheetCommand::EditCellAt {
            row: 0,
            column: ColumnId::A,
        });
        let quit = handle_key_event(&mut state, &mut log, &mut view, &tx, ctrl_key('q'));
        assert!(quit);
    }

    #[test]
    fn search_mode_buffers_until_enter() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('/')));
        assert_eq!(view.search_input.as_deref(), Some(""));
        for ch in "press".chars() {
            handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char(ch)));
        }
        // Not applied yet.
        assert_eq!(state.search, "");
        assert_eq!(state.display_row_count(), 100);

        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Enter));
        assert_eq!(state.search, "press");
        assert_eq!(state.display_row_count(), 1);
        assert_eq!(state.grid_row_for_display(0), Some(1));
    }

    #[test]
    fn search_escape_cancels_without_applying() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('/')));
        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('x')));
        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Esc));
        assert_eq!(view.search_input, None);
        assert_eq!(state.search, "");
        assert_eq!(state.display_row_count(), 100);
    }

    #[test]
    fn sort_key_uses_the_cursor_column() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        state.dispatch(SheetCommand::SelectCell {
            row: 0,
            column: ColumnId::I,
        });
        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('s')));
        assert_eq!(state.grid_row_for_display(0), Some(4));

        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('S')));
        assert_eq!(state.grid_row_for_display(0), Some(0));
        assert_eq!(view.table_state.sort, None);
    }

    #[test]
    fn sort_key_without_selection_asks_for_one() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('s')));
        assert_eq!(state.status_line.as_deref(), Some("select a cell first"));
        assert_eq!(view.table_state.sort, None);
    }

    #[test]
    fn tab_keys_rotate_and_jump() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('f')));
        assert_eq!(state.active_tab, SheetTab::Abc);
        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('b')));
        assert_eq!(state.active_tab, SheetTab::FinancialOverview);
        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('4')));
        assert_eq!(state.active_tab, SheetTab::Extract);
        assert!(log.contains("tab: Extract"));
    }

    #[test]
    fn width_keys_resize_the_cursor_column_within_bounds() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        state.dispatch(SheetCommand::SelectCell {
            row: 0,
            column: ColumnId::G,
        });
        let before = view.table_state.width(ColumnId::G);
        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('>')));
        assert_eq!(view.table_state.width(ColumnId::G), before + 2);

        for _ in 0..50 {
            handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('<')));
        }
        assert_eq!(view.table_state.width(ColumnId::G), super::MIN_COLUMN_WIDTH);
    }

    #[test]
    fn help_overlay_opens_and_swallows_keys() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('?')));
        assert!(view.help_visible);

        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('j')));
        assert_eq!(state.cursor, CursorState::Idle);

        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Esc));
        assert!(!view.help_visible);
    }

    #[test]
    fn cursor_scrolls_the_viewport() {
        let mut state = SheetState::default();
        let mut view = view_for(Rect::new(0, 0, 200, 20));
        sync_display(&mut state, &view);

        state.dispatch(SheetCommand::SelectCell {
            row: 50,
            column: ColumnId::A,
        });
        ensure_cursor_visible(&state, &mut view);
        let layout = screen_layout(view.screen);
        let body = grid_body_rows(layout[2]);
        assert!(view.table_state.row_offset + body > 50);
        assert!(view.table_state.row_offset <= 50);

        state.dispatch(SheetCommand::SelectCell {
            row: 0,
            column: ColumnId::A,
        });
        ensure_cursor_visible(&state, &mut view);
        assert_eq!(view.table_state.row_offset, 0);
    }

    #[test]
    fn cursor_scrolls_columns_into_view() {
        let mut state = SheetState::default();
        let mut view = view_for(Rect::new(0, 0, 60, 30));
        sync_display(&mut state, &view);

        state.dispatch(SheetCommand::SelectCell {
            row: 0,
            column: ColumnId::T,
        });
        ensure_cursor_visible(&state, &mut view);
        let layout = screen_layout(view.screen);
        let slots = visible_column_slots(layout[2], &view.table_state);
        assert!(slots.iter().any(|slot| slot.column == ColumnId::T));
    }

    #[test]
    fn summary_line_matches_the_seed_grid() {
        let state = SheetState::default();
        assert_eq!(
            summary_line(&state),
            " All 100 | Need to start 1 | In-process 2 | Complete 1 | Blocked 1"
        );
    }

    #[test]
    fn status_text_shows_mode_and_pending_search() {
        let mut state = SheetState::default();
        let view = view_for(wide_screen());
        assert!(status_text(&state, &view).starts_with("NAV | "));

        state.dispatch(SheetCommand::EditCellAt {
            row: 0,
            column: ColumnId::A,
        });
        assert!(status_text(&state, &view).starts_with("EDIT | "));

        let mut searching = view_for(wide_screen());
        searching.search_input = Some("pre".to_owned());
        assert!(status_text(&state, &searching).starts_with("SEARCH | /pre"));
    }

    #[test]
    fn edits_in_filtered_view_land_on_the_right_grid_row() {
        let mut state = SheetState::default();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('/')));
        for ch in "press".chars() {
            handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char(ch)));
        }
        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Enter));
        assert_eq!(state.display_row_count(), 1);

        state.dispatch(SheetCommand::EditCellAt {
            row: 0,
            column: ColumnId::G,
        });
        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('!')));
        // Display row 0 is grid row 1 under this filter.
        assert_eq!(
            state.grid.value(1, ColumnId::G),
            Some(&CellValue::text("High!"))
        );
    }

    #[test]
    fn clicking_another_cell_after_an_edit_resyncs_the_sort() {
        let mut state = seeded_state();
        let mut log = RecordingLog::default();
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        let layout = screen_layout(view.screen);
        let grid = layout[2];
        let slots = visible_column_slots(grid, &view.table_state);
        let est_value = slots
            .iter()
            .find(|slot| slot.column == ColumnId::I)
            .expect("Est. Value visible on a wide screen");

        // Ascending sort puts the cheapest row (grid row 4) on top.
        handle_mouse_event(&mut state, &mut log, &mut view, &tx, click(est_value.x, grid.y + 1));
        assert_eq!(state.grid_row_for_display(0), Some(4));

        // Double-click the top value and append a digit, making it the most
        // expensive row. The order holds while the edit is in flight.
        let top_cell_y = grid.y + 2;
        handle_mouse_event(&mut state, &mut log, &mut view, &tx, click(est_value.x, top_cell_y));
        handle_mouse_event(&mut state, &mut log, &mut view, &tx, click(est_value.x, top_cell_y));
        assert!(state.cursor.is_editing());
        handle_key_event(&mut state, &mut log, &mut view, &tx, key(KeyCode::Char('9')));
        assert_eq!(state.grid_row_for_display(0), Some(4));

        // Clicking a different cell stops the edit and re-sorts immediately.
        handle_mouse_event(&mut state, &mut log, &mut view, &tx, click(slots[0].x, grid.y + 4));
        assert!(!state.cursor.is_editing());
        assert_eq!(state.grid_row_for_display(0), Some(1));
    }

    #[test]
    fn mouse_scroll_moves_and_clamps_the_viewport() {
        let mut state = seeded_state();
        let mut log = RecordingLog::default();
        let mut view = view_for(Rect::new(0, 0, 200, 20));
        let (tx, _rx) = mpsc::channel();
        sync_display(&mut state, &view);

        handle_mouse_event(&mut state, &mut log, &mut view, &tx, scroll_up(10, 10));
        assert_eq!(view.table_state.row_offset, 0);

        handle_mouse_event(&mut state, &mut log, &mut view, &tx, scroll_down(10, 10));
        assert_eq!(view.table_state.row_offset, 3);

        for _ in 0..100 {
            handle_mouse_event(&mut state, &mut log, &mut view, &tx, scroll_down(10, 10));
        }
        let layout = screen_layout(view.screen);
        let body = grid_body_rows(layout[2]);
        assert_eq!(view.table_state.row_offset, 100 - body);
    }

    #[test]
    fn failed_log_writes_surface_on_the_status_line() {
        let mut state = seeded_state();
        let mut log = FailingLog;
        let mut view = view_for(wide_screen());
        let (tx, _rx) = mpsc::channel();

        let layout = screen_layout(view.screen);
        let grid = layout[2];
        let slots = visible_column_slots(grid, &view.table_state);
        handle_mouse_event(&mut state, &mut log, &mut view, &tx, click(slots[0].x, grid.y + 2));

        // The selection still lands; only the record is lost.
        assert_eq!(
            state.cursor,
            CursorState::Selected(CellRef::new(0, ColumnId::A))
        );
        assert_eq!(
            state.status_line.as_deref(),
            Some("action log failed: log sink unavailable")
        );
    }

    #[test]
    fn sort_orders_a_fixture_grid_alphabetically() {
        let state = SheetState::new(
            grid_with_column_a(&["pear", "apple", "plum"]).expect("fixture grid"),
        );
        let table_state = TableUiState {
            sort: Some(SortSpec {
                column: ColumnId::A,
                direction: SortDirection::Asc,
            }),
            ..TableUiState::default()
        };
        assert_eq!(display_order(&state, &table_state), vec![1, 0, 2]);
    }

    #[test]
    fn summary_line_tracks_fixture_statuses() {
        let state = SheetState::new(
            grid_with_statuses(&["Blocked", "Blocked", "Complete"]).expect("fixture grid"),
        );
        assert_eq!(
            summary_line(&state),
            " All 3 | Need to start 0 | In-process 0 | Complete 1 | Blocked 2"
        );
    }
}

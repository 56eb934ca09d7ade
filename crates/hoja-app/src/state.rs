// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::grid::Grid;
use crate::model::{CellValue, ColumnId, MoveDirection, SheetTab};
use serde::{Deserialize, Serialize};

/// A cell address: a position in the *displayed* row order plus a data
/// column. Display position, not row id — when the display order changes the
/// view layer must dispatch [`SheetCommand::SyncDisplay`] so the cursor is
/// re-clamped against the new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub column: ColumnId,
}

impl CellRef {
    pub const fn new(row: usize, column: ColumnId) -> Self {
        Self { row, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorState {
    #[default]
    Idle,
    Selected(CellRef),
    Editing(CellRef),
}

impl CursorState {
    pub const fn cell(self) -> Option<CellRef> {
        match self {
            Self::Idle => None,
            Self::Selected(cell) | Self::Editing(cell) => Some(cell),
        }
    }

    pub const fn is_editing(self) -> bool {
        matches!(self, Self::Editing(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditInput {
    Char(char),
    Backspace,
    Replace(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetCommand {
    SelectCell { row: usize, column: ColumnId },
    Move(MoveDirection),
    BeginEdit,
    EditCellAt { row: usize, column: ColumnId },
    EditInput(EditInput),
    StopEditing,
    ClearSelection,
    SyncDisplay { order: Vec<usize> },
    SetActiveTab(SheetTab),
    NextTab,
    PrevTab,
    SetSearch(String),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NothingSelected,
    EditInProgress,
    NotEditing,
    RowOutOfRange,
    BadDisplayOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetEvent {
    SelectionChanged(CellRef),
    CursorMoved(CellRef),
    EditStarted(CellRef),
    EditStopped(CellRef),
    SelectionCleared,
    CellUpdated {
        row: usize,
        column: ColumnId,
        value: CellValue,
    },
    Rejected(RejectReason),
    TabChanged(SheetTab),
    SearchChanged(String),
    StatusUpdated(String),
    StatusCleared,
}

/// The owned UI state: grid data, cursor state machine, active sheet tab,
/// search query, status line, and the current display order. All mutation
/// goes through [`SheetState::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct SheetState {
    pub grid: Grid,
    pub cursor: CursorState,
    pub active_tab: SheetTab,
    pub search: String,
    pub status_line: Option<String>,
    display: Vec<usize>,
}

impl SheetState {
    pub fn new(grid: Grid) -> Self {
        let display = (0..grid.row_count()).collect();
        Self {
            grid,
            cursor: CursorState::Idle,
            active_tab: SheetTab::FinancialOverview,
            search: String::new(),
            status_line: None,
            display,
        }
    }

    /// Rows in the current display order.
    pub fn display_row_count(&self) -> usize {
        self.display.len()
    }

    /// Resolves a display position to its grid row index.
    pub fn grid_row_for_display(&self, row: usize) -> Option<usize> {
        self.display.get(row).copied()
    }

    pub fn dispatch(&mut self, command: SheetCommand) -> Vec<SheetEvent> {
        match command {
            SheetCommand::SelectCell { row, column } => self.select_cell(row, column),
            SheetCommand::Move(direction) => self.move_cursor(direction),
            SheetCommand::BeginEdit => self.begin_edit(),
            SheetCommand::EditCellAt { row, column } => self.edit_cell_at(row, column),
            SheetCommand::EditInput(input) => self.apply_edit_input(input),
            SheetCommand::StopEditing => self.stop_editing(),
            SheetCommand::ClearSelection => self.clear_selection(),
            SheetCommand::SyncDisplay { order } => self.sync_display(order),
            SheetCommand::SetActiveTab(tab) => self.set_active_tab(tab),
            SheetCommand::NextTab => {
                let tab = rotate_tab(self.active_tab, 1);
                self.set_active_tab(tab)
            }
            SheetCommand::PrevTab => {
                let tab = rotate_tab(self.active_tab, -1);
                self.set_active_tab(tab)
            }
            SheetCommand::SetSearch(query) => {
                self.search = query.clone();
                vec![SheetEvent::SearchChanged(query)]
            }
            SheetCommand::SetStatus(message) => {
                self.status_line = Some(message.clone());
                vec![SheetEvent::StatusUpdated(message)]
            }
            SheetCommand::ClearStatus => {
                self.status_line = None;
                vec![SheetEvent::StatusCleared]
            }
        }
    }

    fn select_cell(&mut self, row: usize, column: ColumnId) -> Vec<SheetEvent> {
        if row >= self.display.len() {
            return vec![SheetEvent::Rejected(RejectReason::RowOutOfRange)];
        }

        let mut events = Vec::new();
        if let CursorState::Editing(cell) = self.cursor {
            events.push(SheetEvent::EditStopped(cell));
        }
        let cell = CellRef::new(row, column);
        self.cursor = CursorState::Selected(cell);
        events.push(SheetEvent::SelectionChanged(cell));
        events
    }

    /// Directional navigation, clamped at all four edges with no wraparound.
    /// Suppressed entirely while an edit is active.
    fn move_cursor(&mut self, direction: MoveDirection) -> Vec<SheetEvent> {
        let cell = match self.cursor {
            CursorState::Idle => return vec![SheetEvent::Rejected(RejectReason::NothingSelected)],
            CursorState::Editing(_) => {
                return vec![SheetEvent::Rejected(RejectReason::EditInProgress)];
            }
            CursorState::Selected(cell) => cell,
        };

        let last_row = self.display.len().saturating_sub(1);
        let next = match direction {
            MoveDirection::Up => CellRef::new(cell.row.saturating_sub(1), cell.column),
            MoveDirection::Down => CellRef::new((cell.row + 1).min(last_row), cell.column),
            MoveDirection::Left => CellRef::new(cell.row, cell.column.prev()),
            MoveDirection::Right => CellRef::new(cell.row, cell.column.next()),
        };

        if next == cell {
            return Vec::new();
        }
        self.cursor = CursorState::Selected(next);
        vec![SheetEvent::CursorMoved(next)]
    }

    fn begin_edit(&mut self) -> Vec<SheetEvent> {
        match self.cursor {
            CursorState::Idle => vec![SheetEvent::Rejected(RejectReason::NothingSelected)],
            CursorState::Editing(_) => vec![SheetEvent::Rejected(RejectReason::EditInProgress)],
            CursorState::Selected(cell) => {
                self.cursor = CursorState::Editing(cell);
                vec![SheetEvent::EditStarted(cell)]
            }
        }
    }

    fn edit_cell_at(&mut self, row: usize, column: ColumnId) -> Vec<SheetEvent> {
        let mut events = self.select_cell(row, column);
        if matches!(events.last(), Some(SheetEvent::Rejected(_))) {
            return events;
        }
        events.extend(self.begin_edit());
        events
    }

    /// Write-through editing: every keystroke lands in the grid immediately.
    /// There is no draft buffer, so stopping an edit never reverts anything.
    fn apply_edit_input(&mut self, input: EditInput) -> Vec<SheetEvent> {
        let CursorState::Editing(cell) = self.cursor else {
            return vec![SheetEvent::Rejected(RejectReason::NotEditing)];
        };
        let Some(grid_row) = self.grid_row_for_display(cell.row) else {
            return vec![SheetEvent::Rejected(RejectReason::RowOutOfRange)];
        };

        let current = self
            .grid
            .value(grid_row, cell.column)
            .map(CellValue::display)
            .unwrap_or_default();
        let next = match input {
            EditInput::Char(ch) => {
                let mut text = current;
                text.push(ch);
                text
            }
            EditInput::Backspace => {
                let mut text = current;
                text.pop();
                text
            }
            EditInput::Replace(text) => text,
        };

        let value = CellValue::Text(next);
        if self
            .grid
            .update_cell(grid_row, cell.column, value.clone())
            .is_err()
        {
            return vec![SheetEvent::Rejected(RejectReason::RowOutOfRange)];
        }
        vec![SheetEvent::CellUpdated {
            row: grid_row,
            column: cell.column,
            value,
        }]
    }

    /// Enter, Escape, and blur all land here; they are equivalent because
    /// commits already happened per keystroke.
    fn stop_editing(&mut self) -> Vec<SheetEvent> {
        let CursorState::Editing(cell) = self.cursor else {
            return Vec::new();
        };
        self.cursor = CursorState::Selected(cell);
        vec![SheetEvent::EditStopped(cell)]
    }

    /// Clicking away from the grid blurs it: any in-flight edit stops and the
    /// cursor returns to idle.
    fn clear_selection(&mut self) -> Vec<SheetEvent> {
        let mut events = Vec::new();
        if let CursorState::Editing(cell) = self.cursor {
            events.push(SheetEvent::EditStopped(cell));
        }
        if self.cursor != CursorState::Idle {
            self.cursor = CursorState::Idle;
            events.push(SheetEvent::SelectionCleared);
        }
        events
    }

    /// The view layer reports the new display order (grid row indices, in
    /// display order) whenever sort or search changes. The cursor re-clamps
    /// so it can never point past the displayed rows.
    fn sync_display(&mut self, order: Vec<usize>) -> Vec<SheetEvent> {
        let row_count = self.grid.row_count();
        if order.iter().any(|index| *index >= row_count) {
            return vec![SheetEvent::Rejected(RejectReason::BadDisplayOrder)];
        }
        self.display = order;

        let Some(cell) = self.cursor.cell() else {
            return Vec::new();
        };
        if self.display.is_empty() {
            let mut events = Vec::new();
            if let CursorState::Editing(cell) = self.cursor {
                events.push(SheetEvent::EditStopped(cell));
            }
            self.cursor = CursorState::Idle;
            return events;
        }

        let clamped_row = cell.row.min(self.display.len() - 1);
        if clamped_row == cell.row {
            return Vec::new();
        }
        let clamped = CellRef::new(clamped_row, cell.column);
        let mut events = Vec::new();
        if let CursorState::Editing(editing) = self.cursor {
            events.push(SheetEvent::EditStopped(editing));
        }
        self.cursor = CursorState::Selected(clamped);
        events.push(SheetEvent::CursorMoved(clamped));
        events
    }

    fn set_active_tab(&mut self, tab: SheetTab) -> Vec<SheetEvent> {
        self.active_tab = tab;
        vec![SheetEvent::TabChanged(tab)]
    }
}

impl Default for SheetState {
    fn default() -> Self {
        Self::new(Grid::seed())
    }
}

fn rotate_tab(current: SheetTab, delta: isize) -> SheetTab {
    let tabs = SheetTab::ALL;
    let position = tabs.iter().position(|tab| *tab == current).unwrap_or(0) as isize;
    let len = tabs.len() as isize;
    tabs[(position + delta).rem_euclid(len) as usize]
}

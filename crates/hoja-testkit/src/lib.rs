// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Deterministic fixtures and input constructors for exercising the sheet
//! without a terminal.

use anyhow::Result;
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use hoja_app::{ActionLog, CellValue, ColumnId, Grid, SheetState};

/// The standard startup state: seeded grid, idle cursor.
pub fn seeded_state() -> SheetState {
    SheetState::new(Grid::seed())
}

/// A grid whose column C carries exactly the given status strings, one row
/// per entry. Everything else is blank.
pub fn grid_with_statuses(statuses: &[&str]) -> Result<Grid> {
    let mut grid = Grid::blank(statuses.len());
    for (row, status) in statuses.iter().enumerate() {
        grid.update_cell(row, ColumnId::C, CellValue::text(*status))?;
    }
    Ok(grid)
}

/// A grid with the given texts down column A, for ordering and search tests.
pub fn grid_with_column_a(values: &[&str]) -> Result<Grid> {
    let mut grid = Grid::blank(values.len());
    for (row, value) in values.iter().enumerate() {
        grid.update_cell(row, ColumnId::A, CellValue::text(*value))?;
    }
    Ok(grid)
}

/// Captures every interaction record for later assertions.
#[derive(Debug, Default)]
pub struct RecordingLog {
    entries: Vec<String>,
}

impl RecordingLog {
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry == needle)
    }
}

impl ActionLog for RecordingLog {
    fn record(&mut self, action: &str) -> Result<()> {
        self.entries.push(action.to_owned());
        Ok(())
    }
}

/// A log whose every write fails, for error-path tests.
#[derive(Debug, Default)]
pub struct FailingLog;

impl ActionLog for FailingLog {
    fn record(&mut self, _action: &str) -> Result<()> {
        anyhow::bail!("log sink unavailable")
    }
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn ctrl_key(ch: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
}

pub fn left_click(column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

pub fn scroll_down(column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::ScrollDown,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

pub fn scroll_up(column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::ScrollUp,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

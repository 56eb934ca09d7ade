// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

/// The twenty data columns of the sheet. The row-number gutter ("id") is not
/// a `ColumnId`: the cursor can neither select nor edit it, so id-column
/// immutability holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnId {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
}

impl ColumnId {
    pub const ALL: [Self; 20] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
        Self::I,
        Self::J,
        Self::K,
        Self::L,
        Self::M,
        Self::N,
        Self::O,
        Self::P,
        Self::Q,
        Self::R,
        Self::S,
        Self::T,
    ];

    pub const FIRST: Self = Self::A;
    pub const LAST: Self = Self::T;

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
            Self::H => "H",
            Self::I => "I",
            Self::J => "J",
            Self::K => "K",
            Self::L => "L",
            Self::M => "M",
            Self::N => "N",
            Self::O => "O",
            Self::P => "P",
            Self::Q => "Q",
            Self::R => "R",
            Self::S => "S",
            Self::T => "T",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|column| column.as_str() == value)
    }

    /// Header label shown above the column. The first nine columns carry the
    /// sheet's field names; the rest fall back to the column letter.
    pub const fn header(self) -> &'static str {
        match self {
            Self::A => "Job Request",
            Self::B => "Submitted",
            Self::C => "Status",
            Self::D => "Submitter",
            Self::E => "URL",
            Self::F => "Assigned",
            Self::G => "Priority",
            Self::H => "Due Date",
            Self::I => "Est. Value",
            _ => self.as_str(),
        }
    }

    /// Default display width in terminal cells, wide for long-text columns.
    pub const fn default_width(self) -> u16 {
        match self {
            Self::A => 34,
            Self::B => 12,
            Self::C => 14,
            Self::D => 16,
            Self::E => 18,
            Self::F => 16,
            Self::G => 10,
            Self::H => 12,
            Self::I => 12,
            _ => 10,
        }
    }

    /// Position within `ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn prev(self) -> Self {
        match self.index().checked_sub(1).and_then(Self::from_index) {
            Some(column) => column,
            None => self,
        }
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(self)
    }
}

/// A single cell payload. Values are stored exactly as entered; dates and
/// currency strings are free text with no validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub const fn empty() -> Self {
        Self::Text(String::new())
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => {
                if value.fract() == 0.0 {
                    format!("{value:.0}")
                } else {
                    value.to_string()
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(value) if value.is_empty())
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Status bucket for column C. Parsing is exact-match on the stored strings;
/// anything else counts only toward the overall row total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    InProcess,
    NeedToStart,
    Complete,
    Blocked,
}

impl StatusKind {
    pub const ALL: [Self; 4] = [
        Self::NeedToStart,
        Self::InProcess,
        Self::Complete,
        Self::Blocked,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProcess => "In-process",
            Self::NeedToStart => "Need to start",
            Self::Complete => "Complete",
            Self::Blocked => "Blocked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "In-process" => Some(Self::InProcess),
            "Need to start" => Some(Self::NeedToStart),
            "Complete" => Some(Self::Complete),
            "Blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// Priority bucket for column G, used for badge styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityKind {
    High,
    Medium,
    Low,
}

impl PriorityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Sheet tabs along the top of the grid. Only one sheet of data exists;
/// switching tabs changes the active highlight and is otherwise log-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetTab {
    FinancialOverview,
    Abc,
    AnswerQuestion,
    Extract,
}

impl SheetTab {
    pub const ALL: [Self; 4] = [
        Self::FinancialOverview,
        Self::Abc,
        Self::AnswerQuestion,
        Self::Extract,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::FinancialOverview => "Q3 Financial Overview",
            Self::Abc => "ABC",
            Self::AnswerQuestion => "Answer a question",
            Self::Extract => "Extract",
        }
    }
}

/// Toolbar entries. All of them are stubs by design: activating one records
/// the action name and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolbarAction {
    HideFields,
    Sort,
    Filter,
    CellView,
    Import,
    Export,
    Share,
    NewAction,
}

impl ToolbarAction {
    pub const ALL: [Self; 8] = [
        Self::HideFields,
        Self::Sort,
        Self::Filter,
        Self::CellView,
        Self::Import,
        Self::Export,
        Self::Share,
        Self::NewAction,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::HideFields => "Hide Fields",
            Self::Sort => "Sort",
            Self::Filter => "Filter",
            Self::CellView => "Cell view",
            Self::Import => "Import",
            Self::Export => "Export",
            Self::Share => "Share",
            Self::NewAction => "New Action",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::grid::Grid;
use crate::model::{ColumnId, StatusKind};

/// Counts of column C values by status bucket, plus the overall row total.
/// Blank or unrecognized statuses count only toward `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSummary {
    pub all: usize,
    pub need_to_start: usize,
    pub in_process: usize,
    pub complete: usize,
    pub blocked: usize,
}

impl StatusSummary {
    pub fn tally(grid: &Grid) -> Self {
        let mut summary = Self {
            all: grid.row_count(),
            ..Self::default()
        };
        for row in grid.rows() {
            match StatusKind::parse(&row.value(ColumnId::C).display()) {
                Some(StatusKind::NeedToStart) => summary.need_to_start += 1,
                Some(StatusKind::InProcess) => summary.in_process += 1,
                Some(StatusKind::Complete) => summary.complete += 1,
                Some(StatusKind::Blocked) => summary.blocked += 1,
                None => {}
            }
        }
        summary
    }

    pub const fn count(&self, status: StatusKind) -> usize {
        match status {
            StatusKind::NeedToStart => self.need_to_start,
            StatusKind::InProcess => self.in_process,
            StatusKind::Complete => self.complete,
            StatusKind::Blocked => self.blocked,
        }
    }
}

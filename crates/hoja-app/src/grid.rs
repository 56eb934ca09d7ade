// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::ids::RowId;
use crate::model::{CellValue, ColumnId};

pub const ROW_COUNT: usize = 100;
const SEEDED_ROWS: usize = 5;

/// Sample values for the first five rows, column A through I. Columns J
/// through T start empty everywhere.
const SEED_ROWS: [[&str; 9]; SEEDED_ROWS] = [
    [
        "Launch social media campaign for pro...",
        "15-11-2024",
        "In-process",
        "Aisha Patel",
        "www.aishapatel...",
        "Sophie Choudhury",
        "Medium",
        "20-11-2024",
        "6,200,000",
    ],
    [
        "Update press kit for company redesign",
        "28-10-2024",
        "Need to start",
        "Irfan Khan",
        "www.irfankhan...",
        "Tejas Pandey",
        "High",
        "30-10-2024",
        "3,500,000",
    ],
    [
        "Finalize user testing feedback for app...",
        "05-12-2024",
        "In-process",
        "Mark Johnson",
        "www.markjohns...",
        "Rachel Lee",
        "Medium",
        "10-12-2024",
        "4,750,000",
    ],
    [
        "Design new features for the website",
        "10-01-2025",
        "Complete",
        "Emily Green",
        "www.emilygreen...",
        "Tom Wright",
        "Low",
        "15-01-2025",
        "5,900,000",
    ],
    [
        "Prepare financial report for Q4",
        "25-01-2025",
        "Blocked",
        "Jessica Brown",
        "www.jessicabro...",
        "Kevin Smith",
        "Low",
        "30-01-2025",
        "2,800,000",
    ],
];

/// One sheet row: a stable 1-based id plus one value per data column, stored
/// in `ColumnId::ALL` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRecord {
    pub id: RowId,
    values: Vec<CellValue>,
}

impl RowRecord {
    pub fn empty(id: RowId) -> Self {
        Self {
            id,
            values: vec![CellValue::empty(); ColumnId::ALL.len()],
        }
    }

    pub fn value(&self, column: ColumnId) -> &CellValue {
        &self.values[column.index()]
    }

    pub fn set_value(&mut self, column: ColumnId, value: CellValue) {
        self.values[column.index()] = value;
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(CellValue::is_empty)
    }
}

/// The in-memory grid data store. Rows are never inserted, removed, or
/// reordered; only individual cells change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: Vec<RowRecord>,
}

impl Grid {
    /// The fixed startup dataset: 100 rows, the first five populated with
    /// sample values, the rest blank. Deterministic.
    pub fn seed() -> Self {
        let mut rows = Vec::with_capacity(ROW_COUNT);
        for (index, seed) in SEED_ROWS.iter().enumerate() {
            let mut row = RowRecord::empty(RowId::new(index as i64 + 1));
            for (value, column) in seed.iter().zip(ColumnId::ALL) {
                row.set_value(column, CellValue::text(*value));
            }
            rows.push(row);
        }
        for index in SEEDED_ROWS..ROW_COUNT {
            rows.push(RowRecord::empty(RowId::new(index as i64 + 1)));
        }
        Self { rows }
    }

    pub fn blank(row_count: usize) -> Self {
        let rows = (0..row_count)
            .map(|index| RowRecord::empty(RowId::new(index as i64 + 1)))
            .collect();
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn row(&self, row_index: usize) -> Option<&RowRecord> {
        self.rows.get(row_index)
    }

    pub fn value(&self, row_index: usize, column: ColumnId) -> Option<&CellValue> {
        self.rows.get(row_index).map(|row| row.value(column))
    }

    /// Writes one cell. Fails without touching the grid when `row_index` is
    /// outside the row range.
    pub fn update_cell(
        &mut self,
        row_index: usize,
        column: ColumnId,
        value: CellValue,
    ) -> Result<()> {
        let row_count = self.rows.len();
        let Some(row) = self.rows.get_mut(row_index) else {
            bail!(
                "cell update out of range: row {row_index} column {} (grid has {row_count} rows)",
                column.as_str()
            );
        };
        row.set_value(column, value);
        Ok(())
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::seed()
    }
}

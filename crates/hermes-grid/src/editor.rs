//! Cell editing state machine: `Idle → Editing(row, col) → Idle`.
//!
//! Positions are page-relative. The editor never touches the document; a
//! commit produces a [`CellEdit`] addressed by absolute row index, which the
//! owner applies.

use hermes_common::CsvRow;
use serde::Serialize;

use crate::sanitize::{commit_value, sanitize_numeric};

/// The rows currently rendered plus where they sit in the document.
#[derive(Debug, Clone, Copy)]
pub struct PageSlice<'a> {
    pub headers: &'a [String],
    pub rows: &'a [CsvRow],
    /// Absolute index of `rows[0]`
    pub start: usize,
}

impl<'a> PageSlice<'a> {
    fn cell(&self, row: usize, col: usize) -> Option<&'a str> {
        let header = self.headers.get(col)?;
        let row = self.rows.get(row)?;
        Some(row.get(header).map(String::as_str).unwrap_or(""))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellEdit {
    pub abs_row: usize,
    pub col: usize,
    pub header: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Down,
    Right,
    Left,
}

#[derive(Debug, Clone, Default)]
pub struct GridEditor {
    editing: Option<CellPos>,
    value: String,
}

impl GridEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editing(&self) -> Option<CellPos> {
        self.editing
    }

    pub fn is_editing_cell(&self, row: usize, col: usize) -> bool {
        self.editing == Some(CellPos { row, col })
    }

    /// Current text of the open input.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Open `(row, col)` for editing, seeded with its current text.
    /// Out-of-range positions leave the editor idle.
    pub fn start(&mut self, page: &PageSlice<'_>, row: usize, col: usize) -> bool {
        match page.cell(row, col) {
            Some(current) => {
                self.editing = Some(CellPos { row, col });
                self.value = current.to_string();
                true
            }
            None => false,
        }
    }

    /// Keystroke into the open input; the text is reformatted, never refused.
    pub fn input(&mut self, raw: &str) {
        if self.editing.is_some() {
            self.value = sanitize_numeric(raw);
        }
    }

    /// Close the editor and report the committed value.
    pub fn commit(&mut self, page: &PageSlice<'_>) -> Option<CellEdit> {
        let pos = self.editing.take()?;
        let value = std::mem::take(&mut self.value);
        let header = page.headers.get(pos.col)?;
        let original = page.cell(pos.row, pos.col).unwrap_or("");

        Some(CellEdit {
            abs_row: page.start + pos.row,
            col: pos.col,
            header: header.clone(),
            value: commit_value(original, &value),
        })
    }

    /// Close the editor, discarding the input.
    pub fn cancel(&mut self) {
        self.editing = None;
        self.value.clear();
    }

    /// Where `movement` leads from the cell being edited, if anywhere on
    /// this page.
    pub fn target(&self, page: &PageSlice<'_>, movement: Movement) -> Option<CellPos> {
        let CellPos { row, col } = self.editing?;
        let cols = page.headers.len();
        let rows = page.rows.len();

        match movement {
            Movement::Down => (row + 1 < rows).then_some(CellPos { row: row + 1, col }),
            Movement::Right => {
                if col + 1 < cols {
                    Some(CellPos { row, col: col + 1 })
                } else if row + 1 < rows {
                    Some(CellPos { row: row + 1, col: 0 })
                } else {
                    None
                }
            }
            Movement::Left => {
                if col > 0 {
                    Some(CellPos { row, col: col - 1 })
                } else if row > 0 && cols > 0 {
                    Some(CellPos { row: row - 1, col: cols - 1 })
                } else {
                    None
                }
            }
        }
    }
}

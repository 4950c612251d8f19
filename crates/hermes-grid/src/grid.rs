//! The data grid: a document plus its interaction state.

use hermes_common::CsvDocument;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context_menu::ContextMenu;
use crate::editor::{CellEdit, GridEditor, Movement, PageSlice};
use crate::pagination::{self, PageItem};
use crate::rows;

pub const DEFAULT_PAGE_SIZE: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKey {
    Enter,
    Tab,
    ShiftTab,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    InsertAbove,
    InsertBelow,
    Delete,
}

/// User input forwarded by the front end. Row and column indexes are
/// relative to the current page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridEvent {
    CellClick { row: usize, col: usize },
    Input { value: String },
    Key { key: GridKey },
    Blur,
    PageChange { page: usize },
    PageJump { input: String },
    ContextMenu { row: usize, x: i64, y: i64, viewport_w: i64, viewport_h: i64 },
    MenuAction { action: RowAction },
    Scroll,
    OutsideClick,
    AddRow,
}

#[derive(Debug, Clone)]
pub struct DataGrid {
    document: CsvDocument,
    page: usize,
    page_size: usize,
    editor: GridEditor,
    menu: Option<ContextMenu>,
}

impl DataGrid {
    pub fn new(document: CsvDocument, page_size: usize) -> Self {
        Self {
            document,
            page: 1,
            page_size: page_size.max(1),
            editor: GridEditor::new(),
            menu: None,
        }
    }

    pub fn document(&self) -> &CsvDocument {
        &self.document
    }

    /// Direct access for whole-table operations (prediction merge). Any open
    /// edit or menu is dropped since row positions may change.
    pub fn document_mut(&mut self) -> &mut CsvDocument {
        self.editor.cancel();
        self.menu = None;
        &mut self.document
    }

    pub fn into_document(self) -> CsvDocument {
        self.document
    }

    pub fn headers(&self) -> &[String] {
        &self.document.headers
    }

    pub fn row_count(&self) -> usize {
        self.document.rows.len()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.row_count(), self.page_size)
    }

    pub fn editor(&self) -> &GridEditor {
        &self.editor
    }

    pub fn menu(&self) -> Option<&ContextMenu> {
        self.menu.as_ref()
    }

    pub fn page_items(&self) -> Vec<PageItem> {
        pagination::page_items(self.total_pages(), self.page, 1, 1)
    }

    pub fn showing_summary(&self) -> String {
        pagination::showing_summary(self.page, self.page_size, self.row_count())
    }

    /// Rows rendered on the current page.
    pub fn page_slice(&self) -> PageSlice<'_> {
        slice(&self.document, self.page, self.page_size)
    }

    /// Switch page (clamped). Any in-progress edit is discarded.
    pub fn set_page(&mut self, page: usize) {
        let page = pagination::clamp_page(page, self.total_pages());
        if page != self.page {
            debug!("Grid page {} -> {}", self.page, page);
        }
        self.page = page;
        self.editor.cancel();
    }

    /// Write a committed value into the document.
    pub fn apply_edit(&mut self, edit: &CellEdit) {
        if let Some(row) = self.document.rows.get_mut(edit.abs_row) {
            row.insert(edit.header.clone(), edit.value.clone());
        }
    }

    /// Handle one user event. Returns the edit committed by it, if any.
    pub fn apply(&mut self, event: GridEvent) -> Option<CellEdit> {
        match event {
            GridEvent::CellClick { row, col } => {
                if self.editor.is_editing_cell(row, col) {
                    return None;
                }
                let edit = self.commit();
                let page = slice(&self.document, self.page, self.page_size);
                self.editor.start(&page, row, col);
                edit
            }
            GridEvent::Input { value } => {
                self.editor.input(&value);
                None
            }
            GridEvent::Key { key } => match key {
                GridKey::Enter => self.commit_and_move(Movement::Down),
                GridKey::Tab => self.commit_and_move(Movement::Right),
                GridKey::ShiftTab => self.commit_and_move(Movement::Left),
                GridKey::Escape => {
                    self.editor.cancel();
                    self.menu = None;
                    None
                }
            },
            GridEvent::Blur => self.commit(),
            GridEvent::PageChange { page } => {
                self.set_page(page);
                None
            }
            GridEvent::PageJump { input } => {
                let page = pagination::parse_page_jump(&input, self.total_pages());
                self.set_page(page);
                None
            }
            GridEvent::ContextMenu { row, x, y, viewport_w, viewport_h } => {
                let edit = self.commit();
                let abs_row = self.page_slice().start + row;
                if abs_row < self.row_count() {
                    self.menu = Some(ContextMenu::open(abs_row, x, y, viewport_w, viewport_h));
                }
                edit
            }
            GridEvent::MenuAction { action } => {
                if let Some(menu) = self.menu.take() {
                    self.editor.cancel();
                    match action {
                        RowAction::InsertAbove => self.insert_row(menu.abs_row),
                        RowAction::InsertBelow => self.insert_row(menu.abs_row + 1),
                        RowAction::Delete => self.delete_row(menu.abs_row),
                    }
                }
                None
            }
            GridEvent::Scroll | GridEvent::OutsideClick => {
                self.menu = None;
                None
            }
            GridEvent::AddRow => {
                let edit = self.commit();
                self.add_row();
                edit
            }
        }
    }

    // ── Row operations ────────────────────────────────────────────────────────

    pub fn insert_row(&mut self, abs_index: usize) {
        rows::insert_row_at(&mut self.document, abs_index);
        self.clamp_page();
    }

    pub fn delete_row(&mut self, abs_index: usize) {
        rows::delete_row(&mut self.document, abs_index);
        self.clamp_page();
    }

    /// Append an empty row and jump to the last page, where it is visible.
    pub fn add_row(&mut self) {
        rows::append_row(&mut self.document);
        self.set_page(self.total_pages());
    }

    fn clamp_page(&mut self) {
        let total = self.total_pages();
        if self.page > total {
            self.set_page(total);
        }
    }

    fn commit(&mut self) -> Option<CellEdit> {
        let page = slice(&self.document, self.page, self.page_size);
        let edit = self.editor.commit(&page);
        if let Some(edit) = &edit {
            self.apply_edit(edit);
        }
        edit
    }

    fn commit_and_move(&mut self, movement: Movement) -> Option<CellEdit> {
        let next = self.editor.target(&self.page_slice(), movement);
        let edit = self.commit();
        if let Some(next) = next {
            let page = slice(&self.document, self.page, self.page_size);
            self.editor.start(&page, next.row, next.col);
        }
        edit
    }
}

fn slice(document: &CsvDocument, page: usize, page_size: usize) -> PageSlice<'_> {
    let (start, end) = pagination::page_bounds(page, page_size, document.rows.len());
    PageSlice {
        headers: &document.headers,
        rows: &document.rows[start..end],
        start,
    }
}

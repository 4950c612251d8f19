//! hermes-grid: Editable, paginated data grid over a `CsvDocument`.
//!
//! The grid keeps all interaction state (current page, the cell being
//! edited, the open context menu) and exposes a single event entry point,
//! [`DataGrid::apply`], so a thin front end only forwards user input.

pub mod sanitize;
pub mod pagination;
pub mod editor;
pub mod rows;
pub mod context_menu;
pub mod grid;

pub use context_menu::ContextMenu;
pub use editor::{CellEdit, GridEditor, PageSlice};
pub use grid::{DataGrid, GridEvent, GridKey, RowAction};
pub use pagination::PageItem;
pub use sanitize::{finalize_numeric, sanitize_numeric};

//! Row insertion and deletion on a document.
//!
//! Rows are positional: inserting at `i` shifts `i..` down by one, deleting
//! shifts `i+1..` up by one. Inserted rows carry an empty value per header.

use hermes_common::CsvDocument;
use tracing::debug;

/// Insert an all-empty row at `index` (clamped to the row count).
pub fn insert_row_at(doc: &mut CsvDocument, index: usize) -> usize {
    let index = index.min(doc.rows.len());
    let row = doc.empty_row();
    doc.rows.insert(index, row);
    debug!("Inserted row at {} ({} rows)", index, doc.rows.len());
    index
}

/// Append an all-empty row and return its index.
pub fn append_row(doc: &mut CsvDocument) -> usize {
    insert_row_at(doc, doc.rows.len())
}

/// Remove the row at `index`. Out-of-range indexes are ignored.
pub fn delete_row(doc: &mut CsvDocument, index: usize) -> bool {
    if index >= doc.rows.len() {
        return false;
    }
    doc.rows.remove(index);
    debug!("Deleted row {} ({} rows)", index, doc.rows.len());
    true
}

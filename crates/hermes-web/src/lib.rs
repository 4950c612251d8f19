//! hermes-web: Web front end for HERMES.
//! Serves:
//!   - CSV upload and the blank template
//!   - the editable data grid with classify / retrain actions
//!   - single-entry classification with contribution breakdown
//!   - notifications over SSE

pub mod error;
pub mod html;
pub mod router;
pub mod handlers;
pub mod state;
pub mod sse;
pub mod view;

//! hermes-explain: Per-feature contribution ranking and evaluation views
//! for classification results.

pub mod contributions;
pub mod evaluation;

pub use contributions::{Contribution, ContributionReport, TOP_N};
pub use evaluation::{EvaluationRow, EvaluationView, ResultBadge};

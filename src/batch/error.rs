use crate::{model::chart::ParseError, osu::SequenceError};

use super::collaborators::BoxError;

/// Failure while recalculating a single chart.
///
/// Never aborts the batch; the chart is counted as failed and skipped.
#[derive(Debug, thiserror::Error)]
pub enum RecalcError {
    #[error("failed to parse chart: {0}")]
    Parse(#[from] ParseError),
    #[error("failed to build difficulty objects: {0}")]
    Sequence(#[from] SequenceError),
    #[error("failed to persist attributes: {0}")]
    Persistence(#[source] BoxError),
    #[error("calculation panicked: {0}")]
    Panicked(String),
}

use std::{
    error::Error,
    path::{Path, PathBuf},
};

use crate::{
    model::chart::{ParseError, ParsedChart},
    osu::OsuDifficultyAttributes,
};

use super::BatchStatus;

/// Boxed error returned by external collaborators.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Reference to a single chart of a library.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChartRef {
    /// Location of the `.osu` file.
    pub path: PathBuf,
}

impl ChartRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// A collection of charts whose difficulty may need to be recalculated.
pub trait ChartLibrary {
    /// All charts of the library.
    fn list_items(&self) -> Vec<ChartRef>;

    /// Whether the stored attributes of `chart` are missing or outdated.
    fn needs_recalculation(&self, chart: &ChartRef) -> bool;
}

/// Turns a chart file into a [`ParsedChart`].
pub trait ChartParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<ParsedChart, ParseError>;
}

/// [`ChartParser`] decoding `.osu` files through `rosu-map`.
#[derive(Copy, Clone, Debug, Default)]
pub struct RosuMapParser;

impl ChartParser for RosuMapParser {
    fn parse(&self, path: &Path) -> Result<ParsedChart, ParseError> {
        ParsedChart::from_path(path)
    }
}

/// Persists freshly calculated attributes.
pub trait AttributesStore: Send + Sync {
    fn update(&self, chart: &ChartRef, attrs: &OsuDifficultyAttributes) -> Result<(), BoxError>;
}

/// Receives progress of a running batch.
///
/// All methods are called from the batch's coordinator thread, never from
/// workers, and never concurrently.
pub trait ProgressSink: Send + Sync {
    /// The batch has started processing.
    fn on_started(&self);

    /// `percent` of the library is up to date. Never decreases within a batch.
    fn on_progress(&self, percent: u8, message: &str);

    /// The batch ended with the given status.
    fn on_finished(&self, status: BatchStatus);
}

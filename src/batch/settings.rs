use std::{num::NonZeroUsize, thread, time::Duration};

use crate::Difficulty;

/// Configuration of a [`BatchScheduler`].
///
/// [`BatchScheduler`]: super::BatchScheduler
#[derive(Clone, Copy, Debug, PartialEq)]
#[must_use]
pub struct BatchSettings {
    thread_count: Option<NonZeroUsize>,
    timeout: Option<Duration>,
    difficulty: Difficulty,
}

impl BatchSettings {
    /// How long a batch may take before it is considered timed out.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

    pub const fn new() -> Self {
        Self {
            thread_count: None,
            timeout: None,
            difficulty: Difficulty::new(),
        }
    }

    /// Amount of worker threads.
    ///
    /// If none is specified, the available hardware parallelism is used.
    pub const fn thread_count(mut self, thread_count: NonZeroUsize) -> Self {
        self.thread_count = Some(thread_count);

        self
    }

    /// Upper bound for the whole batch.
    ///
    /// Defaults to [`BatchSettings::DEFAULT_TIMEOUT`].
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);

        self
    }

    /// Difficulty settings applied to every chart.
    pub const fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;

        self
    }

    pub(crate) fn get_thread_count(&self) -> usize {
        self.thread_count
            .or_else(|| thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }

    pub(crate) fn get_timeout(&self) -> Duration {
        self.timeout.unwrap_or(Self::DEFAULT_TIMEOUT)
    }

    pub(crate) const fn get_difficulty(&self) -> &Difficulty {
        &self.difficulty
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self::new()
    }
}

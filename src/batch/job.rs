use std::{
    ops::Range,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Instant,
};

use super::collaborators::ChartRef;

/// Shared state of a single batch.
#[derive(Debug)]
pub(crate) struct BatchJob {
    pub(crate) total_count: usize,
    pub(crate) pending: Arc<[ChartRef]>,
    completed_count: AtomicUsize,
    failed_count: AtomicUsize,
    cancel_requested: AtomicBool,
    any_skipped: AtomicBool,
    pub(crate) started_at: Instant,
}

impl BatchJob {
    pub(crate) fn new(total_count: usize, pending: Arc<[ChartRef]>) -> Self {
        Self {
            total_count,
            completed_count: AtomicUsize::new(total_count.saturating_sub(pending.len())),
            pending,
            failed_count: AtomicUsize::new(0),
            cancel_requested: AtomicBool::new(false),
            any_skipped: AtomicBool::new(false),
            started_at: Instant::now(),
        }
    }

    pub(crate) fn completed_count(&self) -> usize {
        self.completed_count.load(Ordering::Acquire)
    }

    /// Increment the amount of completed charts and return the new amount.
    pub(crate) fn complete_one(&self) -> usize {
        self.completed_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn failed_count(&self) -> usize {
        self.failed_count.load(Ordering::Acquire)
    }

    pub(crate) fn fail_one(&self) {
        self.failed_count.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::Release);
    }

    pub(crate) fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::Acquire)
    }

    /// A worker left charts of its chunk unprocessed due to cancellation.
    pub(crate) fn mark_skipped(&self) {
        self.any_skipped.store(true, Ordering::Release);
    }

    pub(crate) fn is_any_skipped(&self) -> bool {
        self.any_skipped.load(Ordering::Acquire)
    }

    /// Share of the library that is up to date.
    pub(crate) fn percent(&self) -> u8 {
        percent(self.completed_count(), self.total_count)
    }
}

pub(crate) fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }

    u8::try_from(completed.min(total) * 100 / total).unwrap_or(100)
}

/// Size of each chunk when distributing `pending` items over `thread_count`
/// workers.
pub(crate) fn chunk_size(pending: usize, thread_count: usize) -> usize {
    pending.div_ceil(thread_count.max(1)).max(1)
}

/// Contiguous index ranges of `chunk_size` items each, the last one possibly
/// shorter.
pub(crate) fn chunks(pending: usize, chunk_size: usize) -> impl Iterator<Item = Range<usize>> {
    let chunk_size = chunk_size.max(1);

    (0..pending)
        .step_by(chunk_size)
        .map(move |start| start..(start + chunk_size).min(pending))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lens(pending: usize, thread_count: usize) -> Vec<usize> {
        chunks(pending, chunk_size(pending, thread_count))
            .map(|range| range.len())
            .collect()
    }

    #[test]
    fn one_item_per_thread() {
        assert_eq!(lens(4, 4), [1, 1, 1, 1]);
    }

    #[test]
    fn last_chunk_is_shorter() {
        assert_eq!(lens(10, 4), [3, 3, 3, 1]);
    }

    #[test]
    fn fewer_items_than_threads() {
        assert_eq!(lens(2, 8), [1, 1]);
        assert_eq!(lens(0, 8), Vec::<usize>::new());
    }

    #[test]
    fn chunks_cover_everything() {
        let ranges: Vec<_> = chunks(17, chunk_size(17, 5)).collect();

        assert_eq!(ranges.first().map(|r| r.start), Some(0));
        assert_eq!(ranges.last().map(|r| r.end), Some(17));
        assert!(ranges.windows(2).all(|w| w[0].end == w[1].start));
    }

    #[test]
    fn counting_starts_with_finished_charts() {
        let pending: Arc<[ChartRef]> = (0..4).map(|i| ChartRef::new(format!("{i}.osu"))).collect();
        let job = BatchJob::new(10, pending);

        assert_eq!(job.completed_count(), 6);
        assert_eq!(job.percent(), 60);

        for _ in 0..4 {
            job.complete_one();
        }

        assert_eq!(job.completed_count(), 10);
        assert_eq!(job.percent(), 100);
    }

    #[test]
    fn percent_is_floored_and_capped() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(5, 3), 100);
        assert_eq!(percent(0, 0), 100);
    }
}

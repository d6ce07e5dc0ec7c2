//! Background recalculation of difficulty attributes across a chart library.

use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError},
        Arc, Mutex, PoisonError, Weak,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

pub use self::{
    collaborators::{
        AttributesStore, BoxError, ChartLibrary, ChartParser, ChartRef, ProgressSink,
        RosuMapParser,
    },
    error::RecalcError,
    settings::BatchSettings,
};

use self::{
    job::BatchJob,
    worker::{Worker, WorkerEvent},
};

mod collaborators;
mod error;
mod job;
mod settings;
mod worker;

const SUCCESS_MESSAGE: &str = "Background difficulty calculation has finished successfully.";
const CANCELLED_MESSAGE: &str = "Background difficulty calculation was cancelled.";
const FAILURE_MESSAGE: &str = "Something went wrong during background difficulty calculation.";

fn progress_message(percent: u8) -> String {
    format!("Calculating beatmap difficulties... ({percent}%)")
}

/// Terminal state of a batch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BatchStatus {
    /// Every chunk was processed.
    Completed,
    /// Cancellation made at least one worker skip a chart.
    Cancelled,
    /// The batch exceeded its timeout.
    ///
    /// Workers are detached, not joined. A worker may still be finishing its
    /// current chart, including the call to [`AttributesStore::update`], after
    /// this status was reported and a new batch may already be running.
    TimedOut,
    /// A worker was lost without reporting back.
    Interrupted,
}

/// Summary of a finished batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport {
    pub status: BatchStatus,
    /// Amount of charts in the library.
    pub total_count: usize,
    /// Amount of charts that are up to date, including those that did not
    /// need a recalculation in the first place.
    pub completed_count: usize,
    /// Amount of charts whose recalculation failed.
    pub failed_count: usize,
    pub elapsed: Duration,
}

impl BatchReport {
    fn new(job: &BatchJob, status: BatchStatus) -> Self {
        Self {
            status,
            total_count: job.total_count,
            completed_count: job.completed_count(),
            failed_count: job.failed_count(),
            elapsed: job.started_at.elapsed(),
        }
    }
}

/// Runs at most one recalculation batch at a time.
///
/// # Example
///
/// ```no_run
/// use std::{path::PathBuf, sync::Arc};
///
/// use rosu_recalc::{
///     batch::{
///         AttributesStore, BatchScheduler, BatchSettings, BatchStatus, BoxError, ChartLibrary,
///         ChartRef, ProgressSink, RosuMapParser,
///     },
///     OsuDifficultyAttributes,
/// };
///
/// struct Songs(Vec<PathBuf>);
///
/// impl ChartLibrary for Songs {
///     fn list_items(&self) -> Vec<ChartRef> {
///         self.0.iter().map(ChartRef::new).collect()
///     }
///
///     fn needs_recalculation(&self, _: &ChartRef) -> bool {
///         true
///     }
/// }
///
/// struct Print;
///
/// impl AttributesStore for Print {
///     fn update(&self, chart: &ChartRef, attrs: &OsuDifficultyAttributes) -> Result<(), BoxError> {
///         println!("{}: {:.2}", chart.path.display(), attrs.speed);
///
///         Ok(())
///     }
/// }
///
/// impl ProgressSink for Print {
///     fn on_started(&self) {}
///
///     fn on_progress(&self, _: u8, message: &str) {
///         println!("{message}");
///     }
///
///     fn on_finished(&self, status: BatchStatus) {
///         println!("{status:?}");
///     }
/// }
///
/// let scheduler = BatchScheduler::new(
///     BatchSettings::new(),
///     Arc::new(RosuMapParser),
///     Arc::new(Print),
///     Arc::new(Print),
/// );
///
/// let library = Songs(vec![PathBuf::from("./resources/2785319.osu")]);
///
/// if let Some(handle) = scheduler.start_batch(&library) {
///     let report = handle.join();
///     assert_eq!(report.status, BatchStatus::Completed);
/// }
/// ```
pub struct BatchScheduler {
    settings: BatchSettings,
    parser: Arc<dyn ChartParser>,
    store: Arc<dyn AttributesStore>,
    sink: Arc<dyn ProgressSink>,
    running: Arc<AtomicBool>,
    current: Mutex<Weak<BatchJob>>,
}

impl BatchScheduler {
    pub fn new(
        settings: BatchSettings,
        parser: Arc<dyn ChartParser>,
        store: Arc<dyn AttributesStore>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            settings,
            parser,
            store,
            sink,
            running: Arc::new(AtomicBool::new(false)),
            current: Mutex::new(Weak::new()),
        }
    }

    /// Start recalculating all charts of `library` that need it.
    ///
    /// Returns `None` without doing anything if a batch is already running or
    /// if no chart needs a recalculation. Otherwise the batch runs in the
    /// background and the returned handle can be used to observe or cancel it.
    pub fn start_batch(&self, library: &dyn ChartLibrary) -> Option<BatchHandle> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("Difficulty calculation is already running");

            return None;
        }

        let guard = RunningGuard(Arc::clone(&self.running));

        let charts = library.list_items();
        let total_count = charts.len();

        let pending: Arc<[ChartRef]> = charts
            .into_iter()
            .filter(|chart| library.needs_recalculation(chart))
            .collect();

        if pending.is_empty() {
            log::debug!("All {total_count} charts are up to date");

            return None;
        }

        let job = Arc::new(BatchJob::new(total_count, pending));

        let coordinator = Coordinator {
            job: Arc::clone(&job),
            parser: Arc::clone(&self.parser),
            store: Arc::clone(&self.store),
            sink: Arc::clone(&self.sink),
            settings: self.settings,
        };

        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Arc::downgrade(&job);

        let thread = match coordinator.spawn(guard) {
            Ok(thread) => thread,
            Err(err) => {
                log::error!("Failed to spawn difficulty calculation thread: {err}");

                return None;
            }
        };

        Some(BatchHandle { job, thread })
    }

    /// Request cancellation of the running batch, if any.
    pub fn cancel(&self) {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(job) = current.upgrade() {
            job.cancel();
        }
    }

    /// Whether a batch is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Handle to a running batch.
pub struct BatchHandle {
    job: Arc<BatchJob>,
    thread: JoinHandle<BatchReport>,
}

impl BatchHandle {
    /// Request cancellation.
    ///
    /// Charts that are currently being processed still finish, remaining
    /// charts are skipped.
    pub fn cancel(&self) {
        self.job.cancel();
    }

    /// Amount of charts that are up to date.
    pub fn completed_count(&self) -> usize {
        self.job.completed_count()
    }

    /// Amount of charts in the library.
    pub fn total_count(&self) -> usize {
        self.job.total_count
    }

    /// Whether the batch reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Block until the batch is finished.
    pub fn join(self) -> BatchReport {
        self.thread.join().unwrap_or_else(|_| {
            log::error!("Difficulty calculation thread panicked");

            BatchReport::new(&self.job, BatchStatus::Interrupted)
        })
    }
}

/// Resets the running flag once dropped.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the batch: spawns workers, collects their events, and is the only
/// one talking to the [`ProgressSink`].
struct Coordinator {
    job: Arc<BatchJob>,
    parser: Arc<dyn ChartParser>,
    store: Arc<dyn AttributesStore>,
    sink: Arc<dyn ProgressSink>,
    settings: BatchSettings,
}

impl Coordinator {
    fn spawn(self, guard: RunningGuard) -> io::Result<JoinHandle<BatchReport>> {
        thread::Builder::new()
            .name(String::from("difficulty-batch"))
            .spawn(move || {
                let report = self.run();
                drop(guard);

                report
            })
    }

    fn run(self) -> BatchReport {
        let job = &self.job;
        let thread_count = self.settings.get_thread_count();
        let chunk_size = job::chunk_size(job.pending.len(), thread_count);

        log::info!(
            "Calculating difficulty of {} out of {} charts on {thread_count} threads",
            job.pending.len(),
            job.total_count,
        );

        let mut last_percent = job.percent();
        self.sink.on_started();
        self.sink
            .on_progress(last_percent, &progress_message(last_percent));

        let (tx, rx) = mpsc::channel();
        let mut workers = 0;

        for (i, range) in job::chunks(job.pending.len(), chunk_size).enumerate() {
            let worker = Worker {
                job: Arc::clone(job),
                range,
                parser: Arc::clone(&self.parser),
                store: Arc::clone(&self.store),
                difficulty: *self.settings.get_difficulty(),
                tx: tx.clone(),
            };

            let spawned = thread::Builder::new()
                .name(format!("difficulty-worker-{i}"))
                .spawn(move || worker.run());

            match spawned {
                Ok(_) => workers += 1,
                Err(err) => log::error!("Failed to spawn difficulty worker {i}: {err}"),
            }
        }

        drop(tx);

        let deadline = job.started_at + self.settings.get_timeout();
        let mut finished_workers = 0;

        let status = loop {
            if workers == 0 {
                break BatchStatus::Interrupted;
            }

            if finished_workers == workers {
                break if job.is_any_skipped() {
                    BatchStatus::Cancelled
                } else {
                    BatchStatus::Completed
                };
            }

            let timeout = deadline.saturating_duration_since(Instant::now());

            match rx.recv_timeout(timeout) {
                Ok(WorkerEvent::Completed(completed)) => {
                    let percent = job::percent(completed, job.total_count);

                    if percent >= last_percent {
                        last_percent = percent;
                        self.sink.on_progress(percent, &progress_message(percent));
                    }
                }
                Ok(WorkerEvent::Failed) => {}
                Ok(WorkerEvent::ChunkDone) => finished_workers += 1,
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(
                        "Difficulty calculation did not finish within {:?}",
                        self.settings.get_timeout()
                    );
                    job.cancel();

                    break BatchStatus::TimedOut;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    log::error!(
                        "Failed while waiting for workers: {} out of {workers} did not report back",
                        workers - finished_workers
                    );
                    job.cancel();

                    break BatchStatus::Interrupted;
                }
            }
        };

        let report = BatchReport::new(job, status);

        log::info!(
            "Difficulty calculation ended as {status:?} after {:?}: {}/{} charts up to date, {} failed",
            report.elapsed,
            report.completed_count,
            report.total_count,
            report.failed_count,
        );

        let message = match status {
            BatchStatus::Completed => SUCCESS_MESSAGE,
            BatchStatus::Cancelled => CANCELLED_MESSAGE,
            BatchStatus::TimedOut | BatchStatus::Interrupted => FAILURE_MESSAGE,
        };

        let percent = last_percent.max(job::percent(report.completed_count, report.total_count));
        self.sink.on_progress(percent, message);
        self.sink.on_finished(status);

        report
    }
}

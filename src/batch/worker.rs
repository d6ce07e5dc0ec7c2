use std::{
    any::Any,
    ops::Range,
    panic::{self, AssertUnwindSafe},
    sync::{mpsc::Sender, Arc},
    time::Instant,
};

use crate::Difficulty;

use super::{
    collaborators::{AttributesStore, ChartParser, ChartRef},
    error::RecalcError,
    job::BatchJob,
};

/// Message from a worker to the coordinator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum WorkerEvent {
    /// A chart was recalculated; carries the new completed count.
    Completed(usize),
    Failed,
    /// The worker finished its chunk, either fully or due to cancellation.
    ChunkDone,
}

/// Processes one contiguous chunk of pending charts.
pub(crate) struct Worker {
    pub(crate) job: Arc<BatchJob>,
    pub(crate) range: Range<usize>,
    pub(crate) parser: Arc<dyn ChartParser>,
    pub(crate) store: Arc<dyn AttributesStore>,
    pub(crate) difficulty: Difficulty,
    pub(crate) tx: Sender<WorkerEvent>,
}

impl Worker {
    pub(crate) fn run(self) {
        let Some(chunk) = self.job.pending.get(self.range.clone()) else {
            let _ = self.tx.send(WorkerEvent::ChunkDone);

            return;
        };

        for chart in chunk {
            if self.job.is_cancel_requested() {
                log::debug!("Cancellation requested, skipping rest of chunk {:?}", self.range);
                self.job.mark_skipped();

                break;
            }

            let start = Instant::now();

            let res = panic::catch_unwind(AssertUnwindSafe(|| self.process(chart)))
                .unwrap_or_else(|payload| Err(RecalcError::Panicked(panic_message(&*payload))));

            let event = match res {
                Ok(()) => {
                    log::debug!(
                        "Calculated difficulty for {}, took {}ms.",
                        chart.path.display(),
                        start.elapsed().as_millis()
                    );

                    WorkerEvent::Completed(self.job.complete_one())
                }
                Err(err) => {
                    log::error!(
                        "Error while calculating difficulty for {}: {err}",
                        chart.path.display()
                    );
                    self.job.fail_one();

                    WorkerEvent::Failed
                }
            };

            // The coordinator stopped listening, i.e. the batch timed out
            if self.tx.send(event).is_err() {
                return;
            }
        }

        let _ = self.tx.send(WorkerEvent::ChunkDone);
    }

    fn process(&self, chart: &ChartRef) -> Result<(), RecalcError> {
        let parsed = self.parser.parse(&chart.path)?;
        let attrs = self.difficulty.calculate(&parsed)?;

        self.store
            .update(chart, &attrs)
            .map_err(RecalcError::Persistence)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        String::from("unknown panic payload")
    }
}

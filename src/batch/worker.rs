//! Background trigger loop.
//!
//! The loop is the only code path that appends to the buffer. It waits on the
//! intake channel, the flush timer, finished writes and the shutdown token in
//! a single `select!`, so it never races itself.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::{self, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error_handling::BatchError;
use crate::metrics::MetricType;

use super::flush::Shared;

/// Trigger writes still running, with the record count each one carries.
#[derive(Default)]
struct InFlight {
    tasks: JoinSet<Result<usize, BatchError>>,
    counts: HashMap<task::Id, usize>,
}

impl InFlight {
    fn spawn<T: Send + 'static>(&mut self, shared: &Arc<Shared<T>>, items: Vec<T>) {
        let count = items.len();
        let handle = self.tasks.spawn(Arc::clone(shared).write_snapshot(items));
        self.counts.insert(handle.id(), count);
    }

    fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Reaps the next finished write. Returns `None` once nothing is in flight.
    ///
    /// `write_snapshot` reports its own outcome; only a write task that died
    /// before reporting is counted here.
    async fn join_next<T: Send + 'static>(&mut self, shared: &Arc<Shared<T>>) -> Option<()> {
        match self.tasks.join_next_with_id().await? {
            Ok((id, _)) => {
                self.counts.remove(&id);
            }
            Err(join_error) => {
                let count = self.counts.remove(&join_error.id()).unwrap_or_default();
                shared.report_failure(&BatchError::Write {
                    count,
                    source: join_error.into(),
                });
            }
        }
        Some(())
    }
}

/// Runs until `shutdown` is cancelled or every sender is dropped.
///
/// On shutdown the intake is closed and drained into the buffer before the
/// loop exits, so a final `flush` sees every accepted record. In-flight
/// writes are awaited before returning.
pub(crate) async fn run_batcher<T: Send + 'static>(
    shared: Arc<Shared<T>>,
    mut intake: mpsc::Receiver<T>,
    shutdown: CancellationToken,
) {
    let period = shared.config.max_duration;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight = InFlight::default();

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                drain_intake(&shared, &mut intake, &mut in_flight).await;
                break;
            }

            Some(()) = in_flight.join_next(&shared), if !in_flight.is_empty() => {}

            item = intake.recv() => {
                let Some(item) = item else {
                    discard_stranded(&shared).await;
                    break;
                };
                debug!("item received in {} batch", shared.name);
                if shared.push(item).await >= shared.config.max_size {
                    debug!("max size on {} batcher reached", shared.name);
                    trigger_flush(&shared, &mut in_flight).await;
                    // a size flush restarts the time budget
                    ticker.reset();
                }
            }

            _ = ticker.tick() => {
                debug!("max duration on {} batcher reached", shared.name);
                trigger_flush(&shared, &mut in_flight).await;
            }
        }
    }

    while in_flight.join_next(&shared).await.is_some() {}
    debug!("{} batcher stopped", shared.name);
}

/// Swaps the buffer out and hands the snapshot to a write task.
///
/// The write runs concurrently so the loop keeps accepting records into the
/// fresh buffer. Results are logged and metered by `write_snapshot` itself.
async fn trigger_flush<T: Send + 'static>(shared: &Arc<Shared<T>>, in_flight: &mut InFlight) {
    let items = shared.take_snapshot().await;
    if items.is_empty() {
        info!("no item was saved on {} batch: nothing to flush", shared.name);
        return;
    }
    in_flight.spawn(shared, items);
}

/// Every sender is gone without a shutdown, so nothing will flush the buffer.
async fn discard_stranded<T: Send + 'static>(shared: &Arc<Shared<T>>) {
    let stranded = shared.take_snapshot().await.len();
    if stranded > 0 {
        warn!(
            "{} batch dropped without shutdown, {} buffered records discarded",
            shared.name, stranded
        );
        shared
            .metrics()
            .add(&shared.name, MetricType::Lost, stranded);
    }
}

async fn drain_intake<T: Send + 'static>(
    shared: &Arc<Shared<T>>,
    intake: &mut mpsc::Receiver<T>,
    in_flight: &mut InFlight,
) {
    intake.close();
    let mut drained = 0usize;
    while let Ok(item) = intake.try_recv() {
        drained += 1;
        if shared.push(item).await >= shared.config.max_size {
            trigger_flush(shared, in_flight).await;
        }
    }
    info!(
        "{} batcher shutting down: drained {} queued records, {} buffered for final flush",
        shared.name,
        drained,
        shared.size()
    );
}

use slog::{info, Logger};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Runs a task, sleeps a fixed interval, and repeats until cancelled.
///
/// Cancellation is observed between runs; a run that has started always
/// completes.
pub struct PeriodicRunner {
    logger: Logger,
    interval: Duration,
    cancel: CancellationToken,
}

impl PeriodicRunner {
    pub fn new(logger: Logger, interval: Duration, cancel: CancellationToken) -> Self {
        PeriodicRunner {
            logger,
            interval,
            cancel,
        }
    }

    /// Returns the number of completed runs once cancelled.
    pub async fn run<F, Fut>(&self, mut task: F) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut runs = 0;
        while !self.cancel.is_cancelled() {
            task().await;
            runs += 1;

            info!(
                self.logger,
                "waiting {} seconds for next run",
                self.interval.as_secs()
            );
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = sleep(self.interval) => {}
            }
        }

        info!(self.logger, "periodic runner stopped after {} runs", runs);
        runs
    }
}

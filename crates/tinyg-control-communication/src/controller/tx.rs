//! Transmit loop
//!
//! Single consumer of the command queue. Each line costs one unit of credit,
//! taken when the line leaves the queue. G-code lines are handed to the
//! spindle first (when one is attached) and only written once the drive has
//! applied them.

use super::liveness::Liveness;
use super::SharedWriter;
use crate::communication::{CommandQueue, CreditCounter, Lane, LaneThresholds, QueueEntry};
use crate::protocol::encode;
use crate::spindle::Spindle;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub(crate) struct Transmitter {
    pub queue: Arc<CommandQueue>,
    pub credit: Arc<CreditCounter>,
    pub writer: SharedWriter,
    pub liveness: Arc<Liveness>,
    pub spindle: Option<Arc<dyn Spindle>>,
    pub thresholds: LaneThresholds,
    pub spindle_poll: Duration,
    pub spindle_timeout: Duration,
    pub cancel: CancellationToken,
}

/// Write one encoded line and push it out
pub(crate) async fn write_line<W>(writer: &mut W, bytes: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(bytes).await?;
    writer.flush().await
}

impl Transmitter {
    pub(crate) async fn run(self) {
        while !self.cancel.is_cancelled() {
            let Some(entry) = self.queue.pop_ready(&self.credit, self.thresholds) else {
                tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    _ = self.queue.changed() => {}
                    _ = self.credit.changed() => {}
                }
                continue;
            };

            if !self.transmit(entry).await {
                break;
            }
        }

        tracing::debug!("Transmit loop stopped");
    }

    /// Returns false once cancelled
    async fn transmit(&self, entry: QueueEntry) -> bool {
        if entry.lane == Lane::Data {
            if let Some(spindle) = &self.spindle {
                if !self.spindle_rendezvous(&**spindle, &entry.line).await {
                    return false;
                }
            }
        }

        let mut writer = tokio::select! {
            _ = self.cancel.cancelled() => return false,
            writer = self.writer.lock() => writer,
        };

        if !self.queue.is_current(entry.generation) {
            drop(writer);
            tracing::debug!("Dropping '{}' discarded by flush", entry.line);
            self.credit.release();
            return true;
        }

        let bytes = encode(&entry.line);
        let result = tokio::select! {
            _ = self.cancel.cancelled() => return false,
            result = write_line(&mut *writer, &bytes) => result,
        };
        drop(writer);

        match result {
            Ok(()) => tracing::debug!("TX {}", entry.line),
            Err(e) => {
                tracing::error!("Write of '{}' failed: {}", entry.line, e);
                self.liveness.clear();
                self.credit.release();
            }
        }
        true
    }

    /// Submit `line` to the spindle and wait until it is applied
    ///
    /// Drive failures and timeouts are logged and do not hold the line back.
    /// Returns false once cancelled.
    async fn spindle_rendezvous(&self, spindle: &dyn Spindle, line: &str) -> bool {
        if let Err(e) = spindle.command_waiting(line).await {
            tracing::warn!("Spindle rejected '{}': {}", line, e);
            return true;
        }

        let deadline = Instant::now() + self.spindle_timeout;
        loop {
            match spindle.processed().await {
                Ok(progress) if progress.done => {
                    tracing::debug!(
                        "Spindle applied '{}' at {:.1} Hz",
                        line,
                        progress.frequency
                    );
                    return true;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Spindle status unavailable: {}", e);
                    return true;
                }
            }

            if Instant::now() >= deadline {
                tracing::warn!(
                    "Spindle did not confirm '{}' within {:?}",
                    line,
                    self.spindle_timeout
                );
                return true;
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return false,
                _ = tokio::time::sleep(self.spindle_poll) => {}
            }
        }
    }
}

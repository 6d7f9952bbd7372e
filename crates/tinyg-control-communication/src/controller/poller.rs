//! Periodic state refresh
//!
//! Requests are coalesced on the control lane: while a request is still
//! waiting to be sent, the next tick for it is skipped.

use crate::communication::{CommandQueue, Lane};
use crate::protocol::Request;
use std::sync::Arc;
use std::time::Duration;
use tinyg_control_core::StateStore;
use tinyg_control_settings::PollSettings;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub(crate) struct Poller {
    pub queue: Arc<CommandQueue>,
    pub store: Arc<StateStore>,
    pub settings: PollSettings,
    pub cancel: CancellationToken,
}

fn timer(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

impl Poller {
    pub(crate) async fn run(self) {
        let mut machine_position = timer(self.settings.machine_position_interval());
        let mut working_position = timer(self.settings.working_position_interval());
        let mut offsets = timer(self.settings.coordinate_offset_interval());
        let mut full_status = timer(self.settings.full_status_interval());

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = machine_position.tick() => self.request(&[Request::MachinePosition]),
                _ = working_position.tick() => self.request(&[Request::WorkingPosition]),
                _ = offsets.tick() => self.request(&self.offset_requests()),
                _ = full_status.tick() => self.request(&[Request::StatusReport]),
            }
        }

        tracing::debug!("Poller stopped");
    }

    /// Offsets of the active coordinate system plus G92
    fn offset_requests(&self) -> Vec<Request> {
        self.store
            .coordinate_system()
            .and_then(Request::offset_for)
            .into_iter()
            .chain(std::iter::once(Request::OffsetG92))
            .collect()
    }

    fn request(&self, requests: &[Request]) {
        for request in requests {
            if let Err(e) = self.queue.enqueue_coalesced(request.token(), Lane::Control) {
                tracing::warn!("Poll request {} dropped: {}", request, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyg_control_core::{CoordinateSystem, MachineState, StatusReport};

    fn poller(store: Arc<StateStore>) -> Poller {
        Poller {
            queue: Arc::new(CommandQueue::new(16)),
            store,
            settings: PollSettings::default(),
            cancel: CancellationToken::new(),
        }
    }

    #[test]
    fn test_offsets_follow_active_coordinate_system() {
        let store = Arc::new(StateStore::new());
        let poller = poller(store.clone());
        assert_eq!(poller.offset_requests(), vec![Request::OffsetG92]);

        store.merge(&MachineState {
            status_report: Some(StatusReport {
                coordinate_system: Some(CoordinateSystem::G55),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(
            poller.offset_requests(),
            vec![Request::OffsetG55, Request::OffsetG92]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_enqueue_coalesced_requests() {
        let store = Arc::new(StateStore::new());
        let poller = poller(store);
        let queue = poller.queue.clone();
        let cancel = poller.cancel.clone();
        let task = tokio::spawn(poller.run());

        tokio::time::sleep(Duration::from_millis(4999)).await;
        assert!(queue.is_empty());

        // mpo, pos and sr fire at 5 s; nothing drains the queue so the
        // 10 s ticks coalesce into the pending entries
        tokio::time::sleep(Duration::from_millis(5002)).await;
        assert_eq!(queue.lane_len(Lane::Control), 4);

        cancel.cancel();
        task.await.unwrap();
    }
}

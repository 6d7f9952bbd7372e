//! Receive loop
//!
//! Sole writer of the machine state. Reads the port, reassembles lines,
//! decodes each one and folds it into the store. A three element footer
//! returns one unit of credit to the transmit loop.

use super::liveness::Liveness;
use crate::communication::CreditCounter;
use crate::protocol::{decode, LineFramer};
use std::sync::Arc;
use tinyg_control_core::StateStore;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

const READ_CHUNK: usize = 1024;

pub(crate) struct Receiver {
    pub store: Arc<StateStore>,
    pub credit: Arc<CreditCounter>,
    pub liveness: Arc<Liveness>,
    pub cancel: CancellationToken,
}

impl Receiver {
    pub(crate) async fn run<R>(self, mut reader: R)
    where
        R: AsyncRead + Unpin,
    {
        let mut framer = LineFramer::new();
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            let read = tokio::select! {
                _ = self.cancel.cancelled() => break,
                read = reader.read(&mut chunk) => read,
            };

            match read {
                Ok(0) => {
                    tracing::warn!("Device closed the connection");
                    self.liveness.clear();
                    break;
                }
                Ok(n) => {
                    framer.push(&chunk[..n]);
                    while let Some(line) = framer.next_line() {
                        self.handle_line(&line);
                    }
                }
                Err(e) => {
                    tracing::error!("Read from device failed: {}", e);
                    self.liveness.clear();
                    break;
                }
            }
        }

        tracing::debug!("Receive loop stopped");
    }

    fn handle_line(&self, line: &[u8]) {
        if line.iter().all(u8::is_ascii_whitespace) {
            return;
        }
        tracing::debug!("RX {}", String::from_utf8_lossy(line));

        let response = match decode(line) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Discarding frame: {}", e);
                return;
            }
        };

        self.liveness.touch();
        if response.footer.is_credit_report() {
            self.credit.release();
        }
        if let Some(code) = response.footer.status_code() {
            if !code.is_ok() {
                tracing::warn!("Device reported {}", code);
            }
        }
        if let Some(report) = &response.exception {
            tracing::warn!("Exception report: {}", report);
        }

        self.store.merge(&response.into_update());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tinyg_control_core::AxisTable;
    use tokio::io::AsyncWriteExt;

    fn receiver(credit: u32) -> (Receiver, Arc<StateStore>, Arc<CreditCounter>, Arc<Liveness>) {
        let store = Arc::new(StateStore::new());
        let credit = Arc::new(CreditCounter::new(credit));
        let liveness = Arc::new(Liveness::new());
        let rx = Receiver {
            store: store.clone(),
            credit: credit.clone(),
            liveness: liveness.clone(),
            cancel: CancellationToken::new(),
        };
        (rx, store, credit, liveness)
    }

    #[test]
    fn test_frame_updates_state_and_credit() {
        let (rx, store, credit, liveness) = receiver(4);
        assert!(credit.try_acquire(1));
        assert!(credit.try_acquire(1));

        rx.handle_line(br#"{"r":{"mpo":{"x":3.0,"y":0,"z":0}},"f":[1,0,4]}"#);
        assert_eq!(credit.available(), 3);
        assert!(liveness.last_frame().is_some());
        assert_eq!(
            store.snapshot().machine_position,
            Some(AxisTable::xyz(3.0, 0.0, 0.0))
        );

        rx.handle_line(br#"{"r":{"pos":{"x":1.0}},"f":[1,0,4,99]}"#);
        assert_eq!(credit.available(), 3);
        assert!(store.snapshot().working_position.is_some());
    }

    #[test]
    fn test_malformed_frame_is_ignored() {
        let (rx, store, credit, liveness) = receiver(4);
        assert!(credit.try_acquire(1));
        rx.handle_line(b"{\"r\":{\"mpo\":");
        rx.handle_line(b"tinyg [mm] ok>");
        assert!(store.snapshot().is_empty());
        assert_eq!(credit.available(), 3);
        assert!(liveness.last_frame().is_none());
    }

    #[tokio::test]
    async fn test_loop_ends_on_eof() {
        let (rx, store, _credit, liveness) = receiver(4);
        let (mut device, host) = tokio::io::duplex(64);
        let task = tokio::spawn(rx.run(host));

        device
            .write_all(b"{\"r\":{\"fv\":0.97},\"f\":[1,0,4]}\r\n")
            .await
            .unwrap();
        drop(device);

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(store.snapshot().firmware_version, Some(0.97));
        assert!(liveness.last_frame().is_none());
    }
}

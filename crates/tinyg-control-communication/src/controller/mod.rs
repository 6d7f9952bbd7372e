//! TinyG link controller
//!
//! Owns the lifecycle of one serial session. Opening spawns three tasks that
//! share the session's queue, credit and write half:
//! - the receive loop, which decodes frames into the [`StateStore`]
//! - the transmit loop, which drains the queue as credit allows
//! - the poller, which keeps position and status fresh
//!
//! Realtime commands (hold, resume, flush, reset) take the write lock
//! directly and never wait in the queue.

pub mod liveness;
mod poller;
mod rx;
mod tx;

use crate::communication::{
    BoxedStream, CommandQueue, Connector, CreditCounter, Lane, LaneThresholds, SerialConnector,
};
use crate::protocol::{commands, encode, REFRESH_SEQUENCE};
use crate::spindle::{Spindle, SpindleStatus};
use liveness::Liveness;
use parking_lot::{Mutex, RwLock};
use poller::Poller;
use rx::Receiver;
use std::fmt;
use std::sync::Arc;
use tinyg_control_core::{
    ConnectionError, ControllerError, MachineState, Result, StateStore,
};
use tinyg_control_settings::Config;
use tokio::io::{AsyncWriteExt, WriteHalf};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use tx::{write_line, Transmitter};
use uuid::Uuid;

pub(crate) type SharedWriter = Arc<tokio::sync::Mutex<WriteHalf<BoxedStream>>>;

/// Lifecycle phase of the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

impl fmt::Display for LinkPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Opening => write!(f, "opening"),
            Self::Open => write!(f, "open"),
            Self::Closing => write!(f, "closing"),
        }
    }
}

/// Everything that lives exactly as long as one open link
struct Session {
    id: Uuid,
    queue: Arc<CommandQueue>,
    credit: Arc<CreditCounter>,
    writer: SharedWriter,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Controller for one TinyG board
pub struct TinyGController {
    config: Config,
    connector: Arc<dyn Connector>,
    spindle: Option<Arc<dyn Spindle>>,
    store: Arc<StateStore>,
    liveness: Arc<Liveness>,
    phase: RwLock<LinkPhase>,
    session: RwLock<Option<Arc<Session>>>,
    transition: tokio::sync::Mutex<()>,
}

impl TinyGController {
    /// Create a closed controller that opens its stream through `connector`
    pub fn new(config: Config, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            spindle: None,
            store: Arc::new(StateStore::new()),
            liveness: Arc::new(Liveness::new()),
            phase: RwLock::new(LinkPhase::Closed),
            session: RwLock::new(None),
            transition: tokio::sync::Mutex::new(()),
        }
    }

    /// Create a closed controller for the configured serial port
    pub fn serial(config: Config) -> Self {
        Self::new(config, Arc::new(SerialConnector::new()))
    }

    /// Attach a spindle drive that follows the G-code stream
    pub fn with_spindle(mut self, spindle: Arc<dyn Spindle>) -> Self {
        self.spindle = Some(spindle);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn link_phase(&self) -> LinkPhase {
        *self.phase.read()
    }

    /// Id of the open session, used in log spans
    pub fn session_id(&self) -> Option<Uuid> {
        self.session.read().as_ref().map(|s| s.id)
    }

    fn set_phase(&self, phase: LinkPhase) {
        let previous = std::mem::replace(&mut *self.phase.write(), phase);
        tracing::debug!("Link {} -> {}", previous, phase);
    }

    fn session(&self) -> Result<Arc<Session>> {
        self.session
            .read()
            .clone()
            .ok_or_else(|| ControllerError::NotConnected.into())
    }

    /// Open the link and start the receive, transmit and poll tasks
    ///
    /// Opening an open controller does nothing.
    pub async fn open(&self) -> Result<()> {
        let _transition = self.transition.lock().await;
        if self.link_phase() == LinkPhase::Open {
            tracing::debug!("Link already open");
            return Ok(());
        }

        self.set_phase(LinkPhase::Opening);
        let stream = match self.connector.connect(&self.config.serial).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!("Failed to open {}: {}", self.config.serial.port, e);
                self.set_phase(LinkPhase::Closed);
                return Err(e);
            }
        };

        let (reader, writer) = tokio::io::split(stream);
        let flow = &self.config.flow;
        let session = Arc::new(Session {
            id: Uuid::new_v4(),
            queue: Arc::new(CommandQueue::new(flow.queue_capacity)),
            credit: Arc::new(CreditCounter::new(flow.default_credit)),
            writer: Arc::new(tokio::sync::Mutex::new(writer)),
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        });

        self.store.reset();
        self.liveness.clear();

        let span = tracing::info_span!("session", id = %session.id);
        let mut tasks = Vec::with_capacity(3);

        let receiver = Receiver {
            store: self.store.clone(),
            credit: session.credit.clone(),
            liveness: self.liveness.clone(),
            cancel: session.cancel.clone(),
        };
        tasks.push(tokio::spawn(receiver.run(reader).instrument(span.clone())));

        let transmitter = Transmitter {
            queue: session.queue.clone(),
            credit: session.credit.clone(),
            writer: session.writer.clone(),
            liveness: self.liveness.clone(),
            spindle: self.spindle.clone(),
            thresholds: LaneThresholds::from(flow),
            spindle_poll: self.config.timing.spindle_poll(),
            spindle_timeout: self.config.timing.spindle_timeout(),
            cancel: session.cancel.clone(),
        };
        tasks.push(tokio::spawn(transmitter.run().instrument(span.clone())));

        if self.config.polling.enabled {
            let poller = Poller {
                queue: session.queue.clone(),
                store: self.store.clone(),
                settings: self.config.polling.clone(),
                cancel: session.cancel.clone(),
            };
            tasks.push(tokio::spawn(poller.run().instrument(span.clone())));
        }

        *session.tasks.lock() = tasks;
        *self.session.write() = Some(session.clone());
        self.set_phase(LinkPhase::Open);
        span.in_scope(|| tracing::info!("Link open on {}", self.config.serial.port));

        if let Some(spindle) = &self.spindle {
            if let Err(e) = spindle.command(commands::SPINDLE_STOP).await {
                tracing::warn!("Failed to stop spindle: {}", e);
            }
        }

        if self.config.polling.refresh_on_open {
            session
                .queue
                .enqueue(REFRESH_SEQUENCE.iter().map(|r| r.token()), Lane::Control)?;
        }

        Ok(())
    }

    /// Stop all tasks and release the port
    ///
    /// The last known machine state stays readable. Closing a closed
    /// controller does nothing.
    pub async fn close(&self) -> Result<()> {
        let _transition = self.transition.lock().await;
        let Some(session) = self.session.write().take() else {
            return Ok(());
        };

        self.set_phase(LinkPhase::Closing);
        session.cancel.cancel();

        let tasks = std::mem::take(&mut *session.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!("Session task ended abnormally: {}", e);
            }
        }

        if let Err(e) = session.writer.lock().await.shutdown().await {
            tracing::debug!("Writer shutdown failed: {}", e);
        }

        self.liveness.clear();
        self.set_phase(LinkPhase::Closed);
        tracing::info!(session = %session.id, "Link closed");
        Ok(())
    }

    /// Write raw bytes ahead of everything queued
    async fn write_now(&self, session: &Session, bytes: &[u8]) -> Result<()> {
        let mut writer = session.writer.lock().await;
        write_line(&mut *writer, bytes)
            .await
            .map_err(|e| self.write_failed(e))
    }

    fn write_failed(&self, e: std::io::Error) -> tinyg_control_core::Error {
        tracing::error!("Write to device failed: {}", e);
        self.liveness.clear();
        ConnectionError::WriteFailed {
            reason: e.to_string(),
        }
        .into()
    }

    /// Discard all queued lines, flush the device buffers and clear alarms
    pub async fn flush(&self) -> Result<()> {
        let session = self.session()?;
        session.queue.flush();
        let written = {
            let mut writer = session.writer.lock().await;
            match write_line(&mut *writer, &[commands::FLUSH]).await {
                Ok(()) => write_line(&mut *writer, &encode(commands::CLEAR_ALARMS)).await,
                Err(e) => Err(e),
            }
        };

        // Credit returns to default even when the device is gone
        if let Err(e) = written {
            session.credit.reset();
            return Err(self.write_failed(e));
        }

        let settle = self.config.timing.flush_settle();
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }
        session.credit.reset();
        tracing::info!("Queue flushed");
        Ok(())
    }

    /// Hardware reset, then flush once the board has restarted
    pub async fn reset(&self) -> Result<()> {
        let session = self.session()?;
        self.write_now(&session, &[commands::RESET]).await?;
        tracing::info!("Reset sent, waiting {:?}", self.config.timing.reset_settle());

        tokio::select! {
            _ = session.cancel.cancelled() => {
                return Err(ControllerError::NotConnected.into());
            }
            _ = tokio::time::sleep(self.config.timing.reset_settle()) => {}
        }
        self.flush().await
    }

    /// Feed hold (`!`)
    pub async fn feed_hold(&self) -> Result<()> {
        let session = self.session()?;
        self.write_now(&session, &[commands::FEED_HOLD]).await
    }

    /// Resume after feed hold (`~`)
    pub async fn feed_resume(&self) -> Result<()> {
        let session = self.session()?;
        self.write_now(&session, &[commands::FEED_RESUME]).await
    }

    /// Feed hold and flush the device queue (`!%`), dropping everything queued here
    pub async fn feed_hold_flush(&self) -> Result<()> {
        let session = self.session()?;
        session.queue.flush();
        let written = self.write_now(&session, commands::HOLD_FLUSH.as_bytes()).await;
        session.credit.reset();
        written
    }

    /// A frame arrived within the online threshold
    pub fn is_online(&self) -> bool {
        self.liveness
            .is_online(self.config.timing.online_threshold())
    }

    pub fn state_snapshot(&self) -> MachineState {
        self.store.snapshot()
    }

    /// Machine state as a JSON document, absent fields omitted
    pub fn state_json(&self) -> Result<String> {
        self.store.to_json()
    }

    /// Shared handle to the state store
    pub fn store(&self) -> Arc<StateStore> {
        self.store.clone()
    }

    /// Queue G-code lines; returns how many were queued after normalization
    pub fn submit<I, S>(&self, lines: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.session()?.queue.enqueue(lines, Lane::Data)
    }

    /// Queue a JSON command or status request on the control lane
    pub fn submit_command(&self, command: &str) -> Result<usize> {
        self.session()?.queue.enqueue([command], Lane::Control)
    }

    /// Request every reported value again
    pub fn refresh_state(&self) -> Result<usize> {
        self.session()?
            .queue
            .enqueue(REFRESH_SEQUENCE.iter().map(|r| r.token()), Lane::Control)
    }

    /// Free receive-buffer credit
    pub fn credit(&self) -> Result<u32> {
        Ok(self.session()?.credit.available())
    }

    /// Lines waiting in the queue
    pub fn queued(&self) -> Result<usize> {
        Ok(self.session()?.queue.len())
    }

    /// Readout of the attached spindle
    pub fn spindle_status(&self) -> Option<SpindleStatus> {
        self.spindle.as_ref().map(|spindle| spindle.status())
    }
}

impl Drop for TinyGController {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.cancel.cancel();
        }
    }
}

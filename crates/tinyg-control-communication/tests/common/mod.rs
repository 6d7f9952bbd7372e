//! In-memory TinyG stand-in for controller tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tinyg_control_communication::{
    BoxedStream, Connector, Spindle, SpindleDirection, SpindleProgress, TinyGController,
};
use tinyg_control_core::{ConnectionError, ControllerError, Result};
use tinyg_control_settings::{Config, SerialSettings};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::mpsc;

/// Acknowledgement returning one unit of credit
pub const ACK: &str = r#"{"r":{},"f":[1,0,4]}"#;

pub const QUIET: Duration = Duration::from_millis(150);

/// Hands the host end of a fresh pipe to the controller and the device end to the test
pub struct DuplexConnector {
    devices: mpsc::UnboundedSender<DuplexStream>,
    pub connects: AtomicUsize,
}

#[async_trait]
impl Connector for DuplexConnector {
    async fn connect(&self, _settings: &SerialSettings) -> Result<BoxedStream> {
        let (host, device) = tokio::io::duplex(4096);
        self.connects.fetch_add(1, Ordering::SeqCst);
        let _ = self.devices.send(device);
        Ok(Box::new(host))
    }
}

/// Connector for a port that is not there
pub struct MissingPort;

#[async_trait]
impl Connector for MissingPort {
    async fn connect(&self, settings: &SerialSettings) -> Result<BoxedStream> {
        Err(ConnectionError::FailedToOpen {
            port: settings.port.clone(),
            reason: "No such file or directory".to_string(),
        }
        .into())
    }
}

/// Config with background traffic switched off
pub fn quiet_config() -> Config {
    let mut config = Config::default();
    config.polling.enabled = false;
    config.polling.refresh_on_open = false;
    config.timing.reset_settle_ms = 50;
    config.timing.online_threshold_ms = 200;
    config
}

pub struct Harness {
    pub controller: TinyGController,
    pub connector: Arc<DuplexConnector>,
    devices: mpsc::UnboundedReceiver<DuplexStream>,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        Self::build(config, None)
    }

    pub fn with_spindle(config: Config, spindle: Arc<dyn Spindle>) -> Self {
        Self::build(config, Some(spindle))
    }

    fn build(config: Config, spindle: Option<Arc<dyn Spindle>>) -> Self {
        let (tx, devices) = mpsc::unbounded_channel();
        let connector = Arc::new(DuplexConnector {
            devices: tx,
            connects: AtomicUsize::new(0),
        });
        let mut controller = TinyGController::new(config, connector.clone());
        if let Some(spindle) = spindle {
            controller = controller.with_spindle(spindle);
        }
        Self {
            controller,
            connector,
            devices,
        }
    }

    /// Open the controller and return the device end of the link
    pub async fn open(&mut self) -> Device {
        self.controller.open().await.unwrap();
        let stream = self.devices.recv().await.unwrap();
        Device { stream }
    }
}

pub struct Device {
    stream: DuplexStream,
}

impl Device {
    /// Send one frame to the host
    pub async fn send(&mut self, frame: &str) {
        self.stream.write_all(frame.as_bytes()).await.unwrap();
        self.stream.write_all(b"\n").await.unwrap();
    }

    /// Everything the host writes until the link stays silent for `quiet`
    pub async fn drain(&mut self, quiet: Duration) -> String {
        let mut received = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            match tokio::time::timeout(quiet, self.stream.read(&mut chunk)).await {
                Ok(Ok(0)) | Ok(Err(_)) | Err(_) => break,
                Ok(Ok(n)) => received.extend_from_slice(&chunk[..n]),
            }
        }
        String::from_utf8_lossy(&received).into_owned()
    }
}

/// Poll `condition` until it holds or a second has passed
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Spindle that records what it is told and completes on demand
#[derive(Default)]
pub struct MockSpindle {
    pub commands: Mutex<Vec<String>>,
    pub waiting: Mutex<Vec<String>>,
    pub ready: AtomicBool,
    pub faulted: AtomicBool,
}

impl MockSpindle {
    pub fn ready() -> Self {
        let spindle = Self::default();
        spindle.ready.store(true, Ordering::SeqCst);
        spindle
    }
}

#[async_trait]
impl Spindle for MockSpindle {
    async fn command(&self, line: &str) -> Result<()> {
        self.commands.lock().push(line.to_string());
        Ok(())
    }

    async fn command_waiting(&self, line: &str) -> Result<()> {
        if self.faulted.load(Ordering::SeqCst) {
            return Err(ControllerError::Spindle {
                reason: "drive not responding".to_string(),
            }
            .into());
        }
        self.waiting.lock().push(line.to_string());
        Ok(())
    }

    async fn processed(&self) -> Result<SpindleProgress> {
        let done = self.ready.load(Ordering::SeqCst);
        Ok(SpindleProgress {
            done,
            frequency: if done { 288.0 } else { 0.0 },
            status: "ok".to_string(),
        })
    }

    fn output_frequency(&self) -> f64 {
        288.0
    }

    fn frequency_set(&self) -> f64 {
        288.0
    }

    fn output_rpm(&self) -> f64 {
        1000.0
    }

    fn direction(&self) -> SpindleDirection {
        SpindleDirection::Forward
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

//! Serial transport
//!
//! The engine only needs a bidirectional byte stream. [`Connector`] produces
//! one from the serial settings; [`SerialConnector`] opens a real port through
//! `tokio-serial`, tests substitute an in-memory pipe.
//!
//! Port enumeration goes through `serialport` so USB details are available.

use async_trait::async_trait;
use tinyg_control_core::{ConnectionError, Error, Result};
use tinyg_control_settings::{FlowControl, Parity, SerialSettings};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::SerialPortBuilderExt;

/// Anything the link can run over
pub trait ByteStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> ByteStream for T {}

pub type BoxedStream = Box<dyn ByteStream>;

/// Opens the byte stream for a session
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, settings: &SerialSettings) -> Result<BoxedStream>;
}

/// Opens the configured serial device
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

impl SerialConnector {
    pub fn new() -> Self {
        Self
    }
}

fn data_bits(bits: u8) -> Result<tokio_serial::DataBits> {
    match bits {
        5 => Ok(tokio_serial::DataBits::Five),
        6 => Ok(tokio_serial::DataBits::Six),
        7 => Ok(tokio_serial::DataBits::Seven),
        8 => Ok(tokio_serial::DataBits::Eight),
        other => Err(ConnectionError::InvalidParameters {
            reason: format!("unsupported data bits: {}", other),
        }
        .into()),
    }
}

fn stop_bits(bits: u8) -> Result<tokio_serial::StopBits> {
    match bits {
        1 => Ok(tokio_serial::StopBits::One),
        2 => Ok(tokio_serial::StopBits::Two),
        other => Err(ConnectionError::InvalidParameters {
            reason: format!("unsupported stop bits: {}", other),
        }
        .into()),
    }
}

fn parity(parity: Parity) -> tokio_serial::Parity {
    match parity {
        Parity::None => tokio_serial::Parity::None,
        Parity::Even => tokio_serial::Parity::Even,
        Parity::Odd => tokio_serial::Parity::Odd,
    }
}

fn flow_control(flow: FlowControl) -> tokio_serial::FlowControl {
    match flow {
        FlowControl::None => tokio_serial::FlowControl::None,
        FlowControl::Software => tokio_serial::FlowControl::Software,
        FlowControl::Hardware => tokio_serial::FlowControl::Hardware,
    }
}

#[async_trait]
impl Connector for SerialConnector {
    async fn connect(&self, settings: &SerialSettings) -> Result<BoxedStream> {
        tracing::info!(
            "Opening {} at {} baud, flow control {}",
            settings.port,
            settings.baud_rate,
            settings.flow_control
        );
        let port = tokio_serial::new(&settings.port, settings.baud_rate)
            .data_bits(data_bits(settings.data_bits)?)
            .parity(parity(settings.parity))
            .stop_bits(stop_bits(settings.stop_bits)?)
            .flow_control(flow_control(settings.flow_control))
            .open_native_async()
            .map_err(|e| ConnectionError::FailedToOpen {
                port: settings.port.clone(),
                reason: e.to_string(),
            })?;
        Ok(Box::new(port))
    }
}

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,
    /// USB manufacturer if available
    pub manufacturer: Option<String>,
    /// USB product string if available
    pub product: Option<String>,
    /// USB vendor/product id
    pub usb_ids: Option<(u16, u16)>,
}

impl std::fmt::Display for SerialPortInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.port_name)?;
        if let Some((vid, pid)) = self.usb_ids {
            write!(f, " [{:04x}:{:04x}]", vid, pid)?;
        }
        if let Some(product) = self.product.as_ref().or(self.manufacturer.as_ref()) {
            write!(f, " {}", product)?;
        }
        Ok(())
    }
}

/// List serial ports present on the system
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    let ports = serialport::available_ports().map_err(|e| {
        tracing::error!("Failed to enumerate serial ports: {}", e);
        Error::other(format!("Failed to enumerate ports: {}", e))
    })?;

    Ok(ports
        .into_iter()
        .map(|port| match port.port_type {
            serialport::SerialPortType::UsbPort(usb) => SerialPortInfo {
                port_name: port.port_name,
                manufacturer: usb.manufacturer,
                product: usb.product,
                usb_ids: Some((usb.vid, usb.pid)),
            },
            _ => SerialPortInfo {
                port_name: port.port_name,
                manufacturer: None,
                product: None,
                usb_ids: None,
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_framing_rejected() {
        assert!(data_bits(9).is_err());
        assert!(stop_bits(0).is_err());
        assert_eq!(data_bits(8).unwrap(), tokio_serial::DataBits::Eight);
    }

    #[tokio::test]
    async fn test_missing_device_fails_to_open() {
        let settings = SerialSettings {
            port: "/dev/tinyg-control-does-not-exist".to_string(),
            ..Default::default()
        };
        let err = SerialConnector::new().connect(&settings).await.err().unwrap();
        assert!(err.is_connection_error());
    }

    #[test]
    fn test_port_info_display() {
        let info = SerialPortInfo {
            port_name: "/dev/ttyUSB0".to_string(),
            manufacturer: Some("FTDI".to_string()),
            product: None,
            usb_ids: Some((0x0403, 0x6015)),
        };
        assert_eq!(info.to_string(), "/dev/ttyUSB0 [0403:6015] FTDI");
    }
}

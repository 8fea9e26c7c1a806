//! Native serial port backend over the `serialport` crate.
//!
//! Reads happen on a dedicated blocking thread that forwards every chunk it
//! gets from the OS into a channel; [`SerialPort::receive`] awaits that
//! channel. Writes run on the blocking pool.

use crate::{
    HardwareError, Result,
    traits::SerialPort,
    types::{ComSpec, DeviceInfo, Parity, SerialProtocol},
};
use bytes::Bytes;
use serialport::SerialPort as _;
use std::io::{ErrorKind, Read, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tracing::{debug, error, info, trace, warn};

/// Read timeout of the reader thread. Bounds how long the thread lingers
/// after the port is dropped.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

const READ_BUFFER_SIZE: usize = 1024;

impl From<serialport::Error> for HardwareError {
    fn from(error: serialport::Error) -> Self {
        match error.kind() {
            serialport::ErrorKind::NoDevice => HardwareError::disconnected(error.description),
            serialport::ErrorKind::InvalidInput => HardwareError::configuration(error.description),
            serialport::ErrorKind::Io(kind) => {
                HardwareError::Io(std::io::Error::new(kind, error.description))
            }
            serialport::ErrorKind::Unknown => HardwareError::communication(error.description),
        }
    }
}

/// Serial port backed by an OS device (e.g. `/dev/ttyUSB0`, `COM3`).
pub struct NativeSerialPort {
    path: String,
    spec: ComSpec,
    port: Option<Mutex<Box<dyn serialport::SerialPort>>>,
    incoming: AsyncMutex<Option<mpsc::UnboundedReceiver<Bytes>>>,
}

impl std::fmt::Debug for NativeSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeSerialPort")
            .field("path", &self.path)
            .field("spec", &self.spec)
            .field("open", &self.port.is_some())
            .finish()
    }
}

impl NativeSerialPort {
    /// Describe a port to be opened on [`register`](SerialPort::register).
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            spec: ComSpec::default(),
            port: None,
            incoming: AsyncMutex::new(None),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn open_port(&self) -> Result<&Mutex<Box<dyn serialport::SerialPort>>> {
        self.port
            .as_ref()
            .ok_or_else(|| HardwareError::not_registered(&self.path))
    }

    fn try_clone_port(&self) -> Result<Box<dyn serialport::SerialPort>> {
        let port = self.open_port()?;
        let guard = port.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.try_clone()?)
    }
}

fn data_bits(bits: u8) -> Result<serialport::DataBits> {
    match bits {
        5 => Ok(serialport::DataBits::Five),
        6 => Ok(serialport::DataBits::Six),
        7 => Ok(serialport::DataBits::Seven),
        8 => Ok(serialport::DataBits::Eight),
        other => Err(HardwareError::configuration(format!(
            "Data bits must be 5-8, got {other}"
        ))),
    }
}

fn stop_bits(bits: u8) -> Result<serialport::StopBits> {
    match bits {
        1 => Ok(serialport::StopBits::One),
        2 => Ok(serialport::StopBits::Two),
        other => Err(HardwareError::configuration(format!(
            "Stop bits must be 1-2, got {other}"
        ))),
    }
}

fn parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Odd => serialport::Parity::Odd,
        Parity::Even => serialport::Parity::Even,
    }
}

fn flow_control(spec: &ComSpec) -> serialport::FlowControl {
    if spec.hardware_handshake {
        serialport::FlowControl::Hardware
    } else if spec.software_handshake {
        serialport::FlowControl::Software
    } else {
        serialport::FlowControl::None
    }
}

/// Blocking read loop. Exits when the port errors or the receiver is gone.
fn read_loop(
    path: String,
    mut port: Box<dyn serialport::SerialPort>,
    tx: mpsc::UnboundedSender<Bytes>,
) {
    let mut buf = [0u8; READ_BUFFER_SIZE];
    loop {
        match port.read(&mut buf) {
            Ok(0) => {}
            Ok(n) => {
                trace!("{} RX {} bytes", path, n);
                if tx.send(Bytes::copy_from_slice(&buf[..n])).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::Interrupted => {
                if tx.is_closed() {
                    break;
                }
            }
            Err(e) => {
                error!("{} read failed: {}", path, e);
                break;
            }
        }
    }
    debug!("{} reader thread exiting", path);
}

impl SerialPort for NativeSerialPort {
    async fn register(&mut self) -> Result<()> {
        let port = serialport::new(&self.path, self.spec.baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| HardwareError::registration_failed(&self.path, e.to_string()))?;

        let reader_port = port.try_clone()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let path = self.path.clone();
        // Detached: the thread exits once the receiver below is dropped.
        std::thread::Builder::new()
            .name(format!("serial-rx-{}", self.path))
            .spawn(move || read_loop(path, reader_port, tx))?;

        self.port = Some(Mutex::new(port));
        *self.incoming.get_mut() = Some(rx);

        info!("Opened serial port {}", self.path);
        Ok(())
    }

    async fn configure(&mut self, spec: &ComSpec) -> Result<()> {
        spec.validate()?;
        if spec.protocol != SerialProtocol::Rs232 {
            warn!(
                "{}: {:?} signalling is set by the adapter, not the driver",
                self.path, spec.protocol
            );
        }

        let port = self.open_port()?;
        let mut port = port.lock().unwrap_or_else(PoisonError::into_inner);
        port.set_baud_rate(spec.baud_rate)?;
        port.set_data_bits(data_bits(spec.data_bits)?)?;
        port.set_parity(parity(spec.parity))?;
        port.set_stop_bits(stop_bits(spec.stop_bits)?)?;
        port.set_flow_control(flow_control(spec))?;
        drop(port);

        self.spec = *spec;
        debug!("{} configured {}", self.path, spec);
        Ok(())
    }

    async fn send(&self, data: &[u8]) -> Result<()> {
        let mut writer = self.try_clone_port()?;
        let data = data.to_vec();

        tokio::task::spawn_blocking(move || {
            writer.write_all(&data)?;
            writer.flush()
        })
        .await
        .map_err(|e| HardwareError::communication(format!("Write task failed: {e}")))??;

        Ok(())
    }

    async fn receive(&self) -> Result<Bytes> {
        let mut incoming = self.incoming.lock().await;
        let rx = incoming
            .as_mut()
            .ok_or_else(|| HardwareError::not_registered(&self.path))?;
        rx.recv()
            .await
            .ok_or_else(|| HardwareError::disconnected(&self.path))
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        let name = self
            .port
            .as_ref()
            .and_then(|port| port.lock().unwrap_or_else(PoisonError::into_inner).name())
            .unwrap_or_else(|| self.path.clone());
        Ok(DeviceInfo::new(name, "Native Serial Port").with_address(self.path.clone()))
    }
}

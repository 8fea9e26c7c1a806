//! Mock serial port.
//!
//! Received data is injected through a [`MockSerialPortHandle`]; sent data is
//! recorded on it. [`MockSerialPort::loopback_pair`] wires two ports together
//! the way a bench setup ties COM1 TX to COM2 RX and COM2 TX to COM1 RX.

use crate::{
    HardwareError, Result,
    mock::{Registration, lock},
    traits::SerialPort,
    types::{ComSpec, DeviceInfo},
};
use bytes::Bytes;
use hearth_core::PortIndex;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tracing::trace;

/// Mock serial port.
///
/// # Examples
///
/// ```
/// use hearth_core::PortIndex;
/// use hearth_hardware::mock::MockSerialPort;
/// use hearth_hardware::traits::SerialPort;
///
/// #[tokio::main]
/// async fn main() -> hearth_hardware::Result<()> {
///     let ((mut com1, _h1), (mut com2, _h2)) =
///         MockSerialPort::loopback_pair(PortIndex::new(1)?, PortIndex::new(2)?);
///     com1.register().await?;
///     com2.register().await?;
///
///     com1.send(b"ping\n").await?;
///     assert_eq!(&com2.receive().await?[..], b"ping\n");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockSerialPort {
    port: PortIndex,
    name: String,
    registration: Registration,
    incoming: AsyncMutex<mpsc::UnboundedReceiver<Bytes>>,
    /// Receive side of the wired peer, if any.
    peer: Option<mpsc::UnboundedSender<Bytes>>,
    sent: Arc<Mutex<Vec<Bytes>>>,
    applied_spec: Arc<Mutex<Option<ComSpec>>>,
}

impl MockSerialPort {
    /// Create an unwired mock port.
    pub fn new(port: PortIndex) -> (Self, MockSerialPortHandle) {
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let applied_spec = Arc::new(Mutex::new(None));
        let name = format!("COM{port}");

        let serial = Self {
            port,
            name: name.clone(),
            registration: Registration::default(),
            incoming: AsyncMutex::new(incoming_rx),
            peer: None,
            sent: Arc::clone(&sent),
            applied_spec: Arc::clone(&applied_spec),
        };

        let handle = MockSerialPortHandle {
            name,
            incoming_tx,
            sent,
            applied_spec,
        };

        (serial, handle)
    }

    /// Create two ports whose transmit lines feed each other's receive
    /// lines.
    pub fn loopback_pair(
        first: PortIndex,
        second: PortIndex,
    ) -> (
        (Self, MockSerialPortHandle),
        (Self, MockSerialPortHandle),
    ) {
        let (mut a, a_handle) = Self::new(first);
        let (mut b, b_handle) = Self::new(second);
        a.peer = Some(b_handle.incoming_tx.clone());
        b.peer = Some(a_handle.incoming_tx.clone());
        ((a, a_handle), (b, b_handle))
    }

    /// Make [`register`](SerialPort::register) fail with `reason`.
    pub fn with_registration_failure(mut self, reason: impl Into<String>) -> Self {
        self.registration = Registration::failing(reason);
        self
    }

    pub fn port(&self) -> PortIndex {
        self.port
    }

    /// Line settings applied by the last successful `configure`.
    pub fn spec(&self) -> Option<ComSpec> {
        *lock(&self.applied_spec)
    }
}

impl SerialPort for MockSerialPort {
    async fn register(&mut self) -> Result<()> {
        self.registration.register(&self.name)
    }

    async fn configure(&mut self, spec: &ComSpec) -> Result<()> {
        self.registration.ensure(&self.name)?;
        spec.validate()?;
        *lock(&self.applied_spec) = Some(*spec);
        Ok(())
    }

    async fn send(&self, data: &[u8]) -> Result<()> {
        self.registration.ensure(&self.name)?;
        let data = Bytes::copy_from_slice(data);
        trace!("{} TX {} bytes", self.name, data.len());

        lock(&self.sent).push(data.clone());
        if let Some(peer) = &self.peer
            && peer.send(data).is_err()
        {
            trace!("{} peer receiver dropped", self.name);
        }
        Ok(())
    }

    async fn receive(&self) -> Result<Bytes> {
        self.registration.ensure(&self.name)?;
        self.incoming
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected(&self.name))
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock COM Port"))
    }
}

/// Handle for driving and inspecting a mock serial port.
///
/// Dropping every handle (and the wired peer) disconnects the port's
/// receive side.
#[derive(Debug, Clone)]
pub struct MockSerialPortHandle {
    name: String,
    incoming_tx: mpsc::UnboundedSender<Bytes>,
    sent: Arc<Mutex<Vec<Bytes>>>,
    applied_spec: Arc<Mutex<Option<ComSpec>>>,
}

impl MockSerialPortHandle {
    /// Make `data` arrive on the port's receive line.
    ///
    /// # Errors
    ///
    /// Returns `Disconnected` if the port has been dropped.
    pub fn inject(&self, data: impl Into<Bytes>) -> Result<()> {
        self.incoming_tx
            .send(data.into())
            .map_err(|_| HardwareError::disconnected(&self.name))
    }

    /// Everything sent on the port so far, one entry per `send`.
    pub fn sent(&self) -> Vec<Bytes> {
        lock(&self.sent).clone()
    }

    /// All sent bytes concatenated.
    pub fn sent_bytes(&self) -> Vec<u8> {
        lock(&self.sent).iter().flat_map(|b| b.iter().copied()).collect()
    }

    /// Line settings applied to the port, if configured.
    pub fn spec(&self) -> Option<ComSpec> {
        *lock(&self.applied_spec)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

//! Mock device implementations for testing and development.
//!
//! This module provides simulated device implementations that can be controlled
//! programmatically without requiring physical hardware. Each mock is created
//! together with a handle used to drive or inspect it from tests.

pub mod digital;
pub mod ir;
pub mod keypad;
pub mod serial;
pub mod switcher;

// Re-export commonly used types
pub use digital::{MockDigitalOutput, MockDigitalOutputHandle};
pub use ir::{IrCall, MockIrOutput, MockIrOutputHandle};
pub use keypad::{MockKeypad, MockKeypadHandle};
pub use serial::{MockSerialPort, MockSerialPortHandle};
pub use switcher::{MockAudioSwitcher, MockAudioSwitcherHandle};

use crate::error::{HardwareError, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Registration state shared by all mocks.
#[derive(Debug, Default)]
pub(crate) struct Registration {
    failure: Option<String>,
    registered: bool,
}

impl Registration {
    /// A registration that will be refused with `reason`.
    pub(crate) fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            registered: false,
        }
    }

    pub(crate) fn register(&mut self, device: &str) -> Result<()> {
        if let Some(reason) = &self.failure {
            return Err(HardwareError::registration_failed(device, reason.clone()));
        }
        self.registered = true;
        Ok(())
    }

    pub(crate) fn ensure(&self, device: &str) -> Result<()> {
        if self.registered {
            Ok(())
        } else {
            Err(HardwareError::not_registered(device))
        }
    }

    pub(crate) fn is_registered(&self) -> bool {
        self.registered
    }
}

/// Lock a mock's shared state. A panicking test thread must not poison
/// inspection from the handle.
pub(crate) fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

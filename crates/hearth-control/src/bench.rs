//! Mock device bench.
//!
//! Builds a [`ControlSystem`] populated with mock devices sized from a
//! [`ControlConfig`]. Serial ports are wired in loopback pairs the way the
//! bench hardware is cabled: COM1 TX to COM2 RX and COM2 TX to COM1 RX,
//! then COM3 with COM4, and so on. An odd last port is left unwired.

use hearth_core::PortIndex;
use hearth_hardware::mock::{
    MockAudioSwitcher, MockAudioSwitcherHandle, MockDigitalOutput, MockDigitalOutputHandle,
    MockIrOutput, MockIrOutputHandle, MockKeypad, MockKeypadHandle, MockSerialPort,
    MockSerialPortHandle,
};

use crate::config::ControlConfig;
use crate::error::Result;
use crate::system::ControlSystem;

/// Handles to every mock device on the bench, in port order.
#[derive(Debug, Clone)]
pub struct LoopbackBench {
    pub keypad: MockKeypadHandle,
    pub outputs: Vec<MockDigitalOutputHandle>,
    pub serial_ports: Vec<MockSerialPortHandle>,
    pub ir_outputs: Vec<MockIrOutputHandle>,
    pub switcher: MockAudioSwitcherHandle,
}

impl LoopbackBench {
    /// Create the mock devices and a system that owns them.
    pub fn build(config: ControlConfig) -> Result<(ControlSystem, Self)> {
        let mut system = ControlSystem::new(config.clone());

        let (keypad, keypad_handle) = MockKeypad::with_address(config.keypad.address);
        system.register_keypad(keypad);

        let mut outputs = Vec::new();
        for n in 1..=config.digital_outputs {
            let (output, handle) = MockDigitalOutput::new(PortIndex::new(n)?);
            system.register_output(output);
            outputs.push(handle);
        }

        let mut serial_ports = Vec::new();
        for n in (1..=config.serial.ports).step_by(2) {
            let first = PortIndex::new(n)?;
            match n.checked_add(1).filter(|&m| m <= config.serial.ports) {
                Some(m) => {
                    let ((a, a_handle), (b, b_handle)) =
                        MockSerialPort::loopback_pair(first, PortIndex::new(m)?);
                    system.register_serial_port(a);
                    system.register_serial_port(b);
                    serial_ports.extend([a_handle, b_handle]);
                }
                None => {
                    let (port, handle) = MockSerialPort::new(first);
                    system.register_serial_port(port);
                    serial_ports.push(handle);
                }
            }
        }

        // IR ports up to and including the one the cues use.
        let mut ir_outputs = Vec::new();
        for n in 1..=config.ir.port.as_u8() {
            let (ir, handle) = MockIrOutput::new(PortIndex::new(n)?);
            system.register_ir_output(ir);
            ir_outputs.push(handle);
        }

        let (switcher, switcher_handle) = MockAudioSwitcher::with_size(
            config.switcher.address,
            hearth_hardware::mock::switcher::DEFAULT_SOURCES,
            hearth_hardware::mock::switcher::DEFAULT_ZONES,
        );
        system.register_switcher(switcher);

        Ok((
            system,
            Self {
                keypad: keypad_handle,
                outputs,
                serial_ports,
                ir_outputs,
                switcher: switcher_handle,
            },
        ))
    }

    /// Handle for `COM{port}`.
    pub fn serial(&self, port: PortIndex) -> Option<&MockSerialPortHandle> {
        self.serial_ports.get(port.offset())
    }

    pub fn output(&self, port: PortIndex) -> Option<&MockDigitalOutputHandle> {
        self.outputs.get(port.offset())
    }

    pub fn ir(&self, port: PortIndex) -> Option<&MockIrOutputHandle> {
        self.ir_outputs.get(port.offset())
    }
}

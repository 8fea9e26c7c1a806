//! Button controller: turns cues into output, IR and serial activity.
//!
//! For a cue on port `i`:
//!
//! | edge    | digital output `i` | IR port           | serial port `i`      |
//! |---------|--------------------|-------------------|----------------------|
//! | press   | high               | press cue command | cue's press payload  |
//! | release | low                | release           | cue's release payload|
//!
//! Ports that do not exist, or whose device failed registration, are
//! skipped. Device errors are logged and never abort the remaining steps.

use std::sync::Arc;

use hearth_core::PortIndex;
use hearth_hardware::{
    AnyDigitalOutput, AnyIrOutput, AnySerialPort, ButtonState, DigitalOutput, IrOutput, SerialPort,
};
use tracing::{debug, error};

use crate::actions::Cue;
use crate::bank::PortBank;
use crate::config::{CuePayloads, IrConfig};

/// Drives the devices a cue touches.
#[derive(Debug)]
pub struct ButtonController {
    outputs: PortBank<AnyDigitalOutput>,
    ir_outputs: PortBank<AnyIrOutput>,
    serial_ports: PortBank<Arc<AnySerialPort>>,
    ir: IrConfig,
    payloads: CuePayloads,
}

impl ButtonController {
    pub fn new(
        outputs: PortBank<AnyDigitalOutput>,
        ir_outputs: PortBank<AnyIrOutput>,
        serial_ports: PortBank<Arc<AnySerialPort>>,
        ir: IrConfig,
        payloads: CuePayloads,
    ) -> Self {
        Self {
            outputs,
            ir_outputs,
            serial_ports,
            ir,
            payloads,
        }
    }

    /// Run the press or release half of a cue.
    pub async fn handle_cue(&mut self, cue: Cue, port: PortIndex, state: ButtonState) {
        match state {
            ButtonState::Pressed => self.cue_pressed(cue, port).await,
            ButtonState::Released => self.cue_released(cue, port).await,
        }
    }

    pub async fn cue_pressed(&mut self, cue: Cue, port: PortIndex) {
        debug!("{} pressed on port {}", cue, port);
        self.drive_output(port, true).await;

        let command = self.ir.command(cue).to_string();
        if let Some(ir) = self.ir_outputs.get_mut(self.ir.port)
            && let Err(e) = ir.press(&command).await
        {
            error!("IR press {} on port {} failed: {}", command, self.ir.port, e);
        }

        let payload = self.payloads.press(cue).map(str::to_owned);
        self.transmit(port, payload.as_deref()).await;
    }

    pub async fn cue_released(&mut self, cue: Cue, port: PortIndex) {
        debug!("{} released on port {}", cue, port);
        self.drive_output(port, false).await;

        if let Some(ir) = self.ir_outputs.get_mut(self.ir.port)
            && let Err(e) = ir.release().await
        {
            error!("IR release on port {} failed: {}", self.ir.port, e);
        }

        let payload = self.payloads.release(cue).map(str::to_owned);
        self.transmit(port, payload.as_deref()).await;
    }

    /// Drive every output low and stop the IR emitter.
    pub async fn all_released(&mut self) {
        for (port, output) in self.outputs.iter_mut() {
            if let Err(e) = output.set_level(false).await {
                error!("Resetting output {} failed: {}", port, e);
            }
        }
        if let Some(ir) = self.ir_outputs.get_mut(self.ir.port)
            && let Err(e) = ir.release().await
        {
            error!("IR release on port {} failed: {}", self.ir.port, e);
        }
    }

    async fn drive_output(&mut self, port: PortIndex, level: bool) {
        let Some(output) = self.outputs.get_mut(port) else {
            debug!("No digital output {}", port);
            return;
        };
        if let Err(e) = output.set_level(level).await {
            error!("Setting output {} {} failed: {}", port, level, e);
        }
    }

    async fn transmit(&self, port: PortIndex, payload: Option<&str>) {
        let Some(payload) = payload.filter(|p| !p.is_empty()) else {
            return;
        };
        let Some(serial) = self.serial_ports.get(port) else {
            debug!("No serial port {}", port);
            return;
        };
        if let Err(e) = serial.send(payload.as_bytes()).await {
            error!("Send on COM{} failed: {}", port, e);
        }
    }
}

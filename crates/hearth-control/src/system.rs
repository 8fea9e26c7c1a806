//! Control system wiring and event dispatch.
//!
//! [`ControlSystem`] collects the devices, and [`ControlSystem::start`]
//! registers them, starts the line assembler and spawns the tasks:
//!
//! - a receive task that moves chunks from the assembler's serial port
//!   into the chunk queue,
//! - a keypad task that forwards keypad events,
//! - the dispatcher, which owns the button and zone controllers and runs
//!   keypad events and console commands one at a time.
//!
//! # Example
//!
//! ```no_run
//! use hearth_control::{ConsoleCommand, ControlConfig, ControlSystem};
//! use hearth_hardware::mock::MockKeypad;
//!
//! # async fn example() -> hearth_control::Result<()> {
//! let mut system = ControlSystem::new(ControlConfig::default());
//! let (keypad, keypad_handle) = MockKeypad::new();
//! system.register_keypad(keypad);
//!
//! let handle = system.start().await?;
//! keypad_handle.tap(1).await?;
//! handle.execute("route 1 3".parse::<ConsoleCommand>()?).await.ok();
//!
//! let report = handle.shutdown().await?;
//! println!("{} lines received", report.lines_emitted);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use hearth_hardware::{
    AnyAudioSwitcher, AnyDigitalOutput, AnyIrOutput, AnyKeypadDevice, AnySerialPort, AudioSwitcher,
    ButtonEvent, ButtonState, DigitalOutput, IrOutput, KeypadDevice, KeypadEvent, PortMode,
    SerialPort,
};
use hearth_serial::{
    AssemblerHandle, AssemblerReport, ChunkQueue, Line, LineAssembler, SerialError, chunk_queue,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::actions::{ButtonAction, ButtonBindings, Trigger};
use crate::bank::PortBank;
use crate::buttons::ButtonController;
use crate::config::ControlConfig;
use crate::console::ConsoleCommand;
use crate::error::{ControlError, Result};
use crate::zones::ZoneController;

/// Program-level state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramStatus {
    /// Keypad events are ignored until resumed. Console commands still run.
    Paused,
    Resumed,
    /// Close the chunk queue and stop dispatching.
    Stopping,
}

/// Messages handled by the dispatcher.
#[derive(Debug)]
enum Command {
    Keypad(KeypadEvent),
    Console(ConsoleCommand, oneshot::Sender<Result<()>>),
}

/// Handle to a started [`ControlSystem`].
#[derive(Debug)]
pub struct ControlHandle {
    commands: mpsc::UnboundedSender<Command>,
    lines: mpsc::UnboundedReceiver<Line>,
    queue: ChunkQueue,
    dispatcher: JoinHandle<()>,
    tasks: JoinSet<Result<()>>,
    assembler: AssemblerHandle,
}

impl ControlHandle {
    /// Run a console command and wait for it to finish.
    ///
    /// # Errors
    ///
    /// Returns the command's own error, or `Stopped` once the program has
    /// stopped.
    pub async fn execute(&self, command: ConsoleCommand) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send(Command::Console(command, ack_tx))
            .map_err(|_| ControlError::Stopped)?;
        ack_rx.await.map_err(|_| ControlError::Stopped)?
    }

    /// Deliver a program status change.
    pub async fn program_event(&self, status: ProgramStatus) -> Result<()> {
        self.execute(ConsoleCommand::Program(status)).await
    }

    /// Next line assembled from the receive port.
    ///
    /// Returns `None` once the assembler has stopped and every line has been
    /// read.
    pub async fn recv_line(&mut self) -> Option<Line> {
        self.lines.recv().await
    }

    /// Stop the program and wait for the line assembler to drain.
    ///
    /// Sends `Stopping` if it has not been sent already, waits for the
    /// dispatcher, aborts the device tasks, and returns the assembler's
    /// report. Task failures are logged, not returned.
    pub async fn shutdown(mut self) -> Result<AssemblerReport> {
        match self.program_event(ProgramStatus::Stopping).await {
            Ok(()) | Err(ControlError::Stopped) => {}
            Err(e) => warn!("Stopping failed: {}", e),
        }
        if let Err(e) = (&mut self.dispatcher).await {
            error!("Dispatcher task failed: {}", e);
        }
        // Closing twice is harmless and covers a dispatcher that died early.
        self.queue.close();

        self.tasks.abort_all();

        let mut error_count = 0;
        let mut panic_count = 0;

        while let Some(result) = self.tasks.join_next().await {
            match classify_task_result(result) {
                TaskTermination::Success => {}
                TaskTermination::Error => error_count += 1,
                TaskTermination::Panic => panic_count += 1,
                TaskTermination::Cancelled => {}
            }
        }

        if error_count + panic_count > 0 {
            warn!(
                "Device tasks ended with {} error(s) and {} panic(s)",
                error_count, panic_count
            );
        }

        let report = self.assembler.join().await?;
        info!(
            "Line assembler stopped: {} line(s), {} fault(s), {} residual byte(s)",
            report.lines_emitted,
            report.faults,
            report.residual.len()
        );
        Ok(report)
    }
}

fn classify_task_result(
    result: std::result::Result<Result<()>, tokio::task::JoinError>,
) -> TaskTermination {
    match result {
        Ok(Ok(())) => TaskTermination::Success,
        Ok(Err(_)) => TaskTermination::Error,
        Err(e) if e.is_cancelled() => TaskTermination::Cancelled,
        Err(_) => TaskTermination::Panic,
    }
}

/// How a device task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskTermination {
    Success,
    Error,
    /// Aborted during shutdown.
    Cancelled,
    Panic,
}

/// Devices added to a [`ControlSystem`], by family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCounts {
    pub keypad: bool,
    pub digital_outputs: usize,
    pub serial_ports: usize,
    pub ir_outputs: usize,
    pub switcher: bool,
}

/// The home control program before it starts.
///
/// Devices are added in port order: the first digital output registered is
/// output 1, the second is output 2, and so on.
#[derive(Debug)]
pub struct ControlSystem {
    config: ControlConfig,
    keypad: Option<AnyKeypadDevice>,
    outputs: Vec<AnyDigitalOutput>,
    serial_ports: Vec<AnySerialPort>,
    ir_outputs: Vec<AnyIrOutput>,
    switcher: Option<AnyAudioSwitcher>,
}

impl ControlSystem {
    pub fn new(config: ControlConfig) -> Self {
        Self {
            config,
            keypad: None,
            outputs: Vec::new(),
            serial_ports: Vec::new(),
            ir_outputs: Vec::new(),
            switcher: None,
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Set the keypad, replacing any earlier one.
    pub fn register_keypad(&mut self, device: impl Into<AnyKeypadDevice>) {
        self.keypad = Some(device.into());
    }

    pub fn register_output(&mut self, device: impl Into<AnyDigitalOutput>) {
        self.outputs.push(device.into());
    }

    pub fn register_serial_port(&mut self, device: impl Into<AnySerialPort>) {
        self.serial_ports.push(device.into());
    }

    pub fn register_ir_output(&mut self, device: impl Into<AnyIrOutput>) {
        self.ir_outputs.push(device.into());
    }

    pub fn register_switcher(&mut self, device: impl Into<AnyAudioSwitcher>) {
        self.switcher = Some(device.into());
    }

    /// Register and configure every device, then spawn the program tasks.
    ///
    /// A device that fails registration or configuration is logged and left
    /// out; the program runs with what remains.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration is inconsistent.
    pub async fn start(self) -> Result<ControlHandle> {
        self.config.validate()?;
        let Self {
            config,
            keypad,
            outputs,
            serial_ports,
            ir_outputs,
            switcher,
        } = self;

        let keypad = match keypad {
            Some(mut keypad) => match keypad.register().await {
                Ok(()) => Some(keypad),
                Err(e) => {
                    error!("Keypad {}: {}", config.keypad.address, e);
                    None
                }
            },
            None => None,
        };

        let mut output_bank = PortBank::new();
        for mut output in outputs {
            let slot = match setup_output(&mut output).await {
                Ok(()) => Some(output),
                Err(e) => {
                    error!("Digital output {}: {}", output_bank.len() + 1, e);
                    None
                }
            };
            output_bank.push(slot);
        }

        let mut serial_bank = PortBank::new();
        for mut port in serial_ports {
            let slot = match setup_serial(&mut port, &config).await {
                Ok(()) => Some(Arc::new(port)),
                Err(e) => {
                    error!("COM{}: {}", serial_bank.len() + 1, e);
                    None
                }
            };
            serial_bank.push(slot);
        }

        let mut ir_bank = PortBank::new();
        for mut ir in ir_outputs {
            let slot = match ir.register().await {
                Ok(()) => Some(ir),
                Err(e) => {
                    error!("IR port {}: {}", ir_bank.len() + 1, e);
                    None
                }
            };
            ir_bank.push(slot);
        }

        let switcher = match switcher {
            Some(mut switcher) => match switcher.register().await {
                Ok(()) => Some(switcher),
                Err(e) => {
                    error!("Switcher {}: {}", config.switcher.address, e);
                    None
                }
            },
            None => None,
        };

        info!(
            "Devices ready: keypad={} outputs={}/{} serial={}/{} ir={}/{} switcher={}",
            keypad.is_some(),
            output_bank.available(),
            output_bank.len(),
            serial_bank.available(),
            serial_bank.len(),
            ir_bank.available(),
            ir_bank.len(),
            switcher.is_some()
        );
        if output_bank.len() != usize::from(config.digital_outputs) {
            warn!(
                "Configured for {} digital output(s), {} registered",
                config.digital_outputs,
                output_bank.len()
            );
        }

        let (queue, receiver) = chunk_queue();
        let (line_tx, line_rx) = mpsc::unbounded_channel();
        let assembler = LineAssembler::with_config(
            receiver,
            move |line: Line| {
                info!("RX: {}", line);
                line_tx.send(line).map_err(|_| SerialError::HandlerClosed)
            },
            config.assembler(),
        )
        .spawn();

        let mut tasks = JoinSet::new();
        match serial_bank.get(config.serial.receive_port) {
            Some(port) => {
                tasks.spawn(receive_task(Arc::clone(port), queue.clone()));
            }
            None => warn!(
                "Receive port COM{} unavailable, no lines will be assembled",
                config.serial.receive_port
            ),
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        if let Some(keypad) = keypad {
            tasks.spawn(keypad_task(keypad, command_tx.clone()));
        }

        let mut bindings = ButtonBindings::new();
        for binding in &config.keypad.buttons {
            bindings.register(binding.button, binding.action);
        }

        let dispatcher = Dispatcher {
            buttons: ButtonController::new(
                output_bank,
                ir_bank,
                serial_bank,
                config.ir.clone(),
                config.payloads.clone(),
            ),
            zones: ZoneController::new(switcher),
            bindings,
            queue: queue.clone(),
            paused: false,
        };

        Ok(ControlHandle {
            commands: command_tx,
            lines: line_rx,
            queue,
            dispatcher: tokio::spawn(dispatcher.run(command_rx)),
            tasks,
            assembler,
        })
    }

    /// Registered device counts, before start.
    pub fn device_counts(&self) -> DeviceCounts {
        DeviceCounts {
            keypad: self.keypad.is_some(),
            digital_outputs: self.outputs.len(),
            serial_ports: self.serial_ports.len(),
            ir_outputs: self.ir_outputs.len(),
            switcher: self.switcher.is_some(),
        }
    }
}

async fn setup_output(output: &mut AnyDigitalOutput) -> hearth_hardware::Result<()> {
    output.register().await?;
    output.configure(PortMode::DigitalOutput).await
}

async fn setup_serial(
    port: &mut AnySerialPort,
    config: &ControlConfig,
) -> hearth_hardware::Result<()> {
    port.register().await?;
    port.configure(&config.serial.spec).await
}

/// Move received chunks into the queue until the port or the queue goes away.
async fn receive_task(port: Arc<AnySerialPort>, queue: ChunkQueue) -> Result<()> {
    loop {
        let chunk = match port.receive().await {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("Receive task stopping: {}", e);
                return Err(e.into());
            }
        };
        if queue.is_closed() {
            debug!("Chunk queue closed, receive task stopping");
            return Ok(());
        }
        queue.enqueue(chunk);
    }
}

async fn keypad_task(
    mut keypad: AnyKeypadDevice,
    tx: mpsc::UnboundedSender<Command>,
) -> Result<()> {
    loop {
        match keypad.read_event().await {
            Ok(event) => {
                if tx.send(Command::Keypad(event)).is_err() {
                    // Dispatcher gone
                    return Ok(());
                }
            }
            Err(e) => {
                warn!("Keypad task stopping: {}", e);
                return Err(e.into());
            }
        }
    }
}

struct Dispatcher {
    buttons: ButtonController,
    zones: ZoneController,
    bindings: ButtonBindings,
    queue: ChunkQueue,
    paused: bool,
}

impl Dispatcher {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            match command {
                Command::Keypad(event) => self.keypad_event(event).await,
                Command::Console(command, ack) => {
                    let stopping = command == ConsoleCommand::Program(ProgramStatus::Stopping);
                    let result = self.console_command(command).await;
                    if let Err(e) = &result {
                        warn!("Command failed: {}", e);
                    }
                    // The caller may have given up waiting.
                    let _ = ack.send(result);
                    if stopping {
                        break;
                    }
                }
            }
        }
        debug!("Dispatcher stopped");
    }

    async fn keypad_event(&mut self, event: KeypadEvent) {
        match event {
            KeypadEvent::Button(event) if self.paused => {
                debug!("Paused, ignoring button {} {}", event.button, event.state);
            }
            KeypadEvent::Button(event) => self.button_event(event).await,
            KeypadEvent::InputChanged { port, level } => {
                info!("Port {}: {}", port, if level { "high" } else { "low" });
            }
            other => debug!("Unhandled keypad event: {:?}", other),
        }
    }

    async fn button_event(&mut self, event: ButtonEvent) {
        let Some(action) = self.bindings.action_for(event.button).copied() else {
            debug!("Button {} is not bound", event.button);
            return;
        };

        match action {
            ButtonAction::Cue(cue) => {
                self.buttons
                    .handle_cue(cue, event.button.port(), event.state)
                    .await;
            }
            ButtonAction::Trigger(trigger) if event.state == ButtonState::Pressed => {
                if let Err(e) = self.run_trigger(trigger).await {
                    error!("Button {} trigger failed: {}", event.button, e);
                }
            }
            ButtonAction::Trigger(_) => {}
        }
    }

    async fn run_trigger(&mut self, trigger: Trigger) -> Result<()> {
        match trigger {
            Trigger::RouteSource { zone, source } => {
                self.zones.set_source_for_room(zone, source).await
            }
            Trigger::AllOff => self.zones.all_off().await,
        }
    }

    async fn console_command(&mut self, command: ConsoleCommand) -> Result<()> {
        match command {
            ConsoleCommand::Cue { cue, state, port } => {
                self.buttons.handle_cue(cue, port, state).await;
                Ok(())
            }
            ConsoleCommand::Route { zone, source } => {
                self.run_trigger(Trigger::RouteSource { zone, source }).await
            }
            ConsoleCommand::AllOff => self.run_trigger(Trigger::AllOff).await,
            ConsoleCommand::Program(status) => {
                self.program_status(status).await;
                Ok(())
            }
            ConsoleCommand::Help => Ok(()),
        }
    }

    async fn program_status(&mut self, status: ProgramStatus) {
        match status {
            ProgramStatus::Paused => {
                self.paused = true;
                info!("Program paused");
            }
            ProgramStatus::Resumed => {
                self.paused = false;
                info!("Program resumed");
            }
            ProgramStatus::Stopping => {
                info!("Program stopping");
                self.buttons.all_released().await;
                self.queue.close();
            }
        }
    }
}

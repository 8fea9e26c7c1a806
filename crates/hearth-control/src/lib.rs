//! Room control program for the Hearth system.
//!
//! Ties a wall keypad, digital outputs, serial ports, an IR emitter and an
//! audio switcher together:
//!
//! - Keypad buttons are bound to [`ButtonAction`]s. A [`Cue`] follows the
//!   button through press and release on the port matching the button
//!   number; a [`Trigger`] runs once on press.
//! - Data received on the configured serial port is assembled into lines by
//!   a [`hearth_serial::LineAssembler`] and surfaced through
//!   [`ControlHandle::recv_line`].
//! - [`ConsoleCommand`]s drive the same actions from a terminal.
//!
//! Start with [`LoopbackBench::build`] for a mock-device system, or
//! [`ControlSystem::new`] and the `register_*` methods to supply devices.

pub mod actions;
pub mod bank;
pub mod bench;
pub mod buttons;
pub mod config;
pub mod console;
pub mod error;
pub mod system;
pub mod zones;

pub use actions::{BindingToken, ButtonAction, ButtonBindings, Cue, Trigger};
pub use bench::LoopbackBench;
pub use config::ControlConfig;
pub use console::ConsoleCommand;
pub use error::{ControlError, Result};
pub use system::{ControlHandle, ControlSystem, DeviceCounts, ProgramStatus};

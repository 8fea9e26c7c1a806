//! Shared constants for the Hearth control program.
//!
//! Serial framing, default port parameters and the default bus addresses of
//! the devices wired into a single control processor live here so that the
//! line assembler, the hardware layer and the configuration loader agree on
//! them.
//!
//! # Serial Framing
//!
//! Data received on a serial port is split into lines on a single newline
//! byte. A line always includes its terminator:
//!
//! ```text
//! chunk 1: "12"      chunk 2: "3\n45"     chunk 3: "\n"
//!           └───────────────┬──┘└─────────────┬┘
//!                       "123\n"             "45\n"
//! ```
//!
//! ```
//! use hearth_core::constants::LINE_DELIMITER;
//!
//! let data = b"123\n45";
//! assert_eq!(data.iter().position(|&b| b == LINE_DELIMITER), Some(3));
//! ```

// ============================================================================
// Serial Framing
// ============================================================================

/// Line delimiter for received serial data (`\n`).
pub const LINE_DELIMITER: u8 = b'\n';

/// Carriage return, stripped together with the delimiter by
/// `Line::content`.
pub const CARRIAGE_RETURN: u8 = b'\r';

/// Default upper bound on bytes held without a delimiter.
///
/// A peer that never sends a newline would otherwise grow the accumulation
/// buffer without limit. Exceeding this bound clears the buffer.
pub const DEFAULT_MAX_PENDING: usize = 64 * 1024; // 64 KB

/// Initial accumulation buffer capacity.
pub const INITIAL_LINE_BUFFER_CAPACITY: usize = 1024; // 1 KB

// ============================================================================
// Serial Port Defaults
// ============================================================================

/// Default baud rate for control ports.
pub const DEFAULT_BAUD_RATE: u32 = 19_200;

/// Default number of data bits per character.
pub const DEFAULT_DATA_BITS: u8 = 8;

/// Default number of stop bits.
pub const DEFAULT_STOP_BITS: u8 = 1;

/// Serial port whose received data feeds the line assembler (1-based).
///
/// On the bench the TX of COM1 is tied to the RX of COM2 and vice versa, so
/// anything sent on port 1 shows up here.
pub const DEFAULT_RECEIVE_PORT: u8 = 2;

/// Number of serial ports configured at startup.
pub const DEFAULT_SERIAL_PORT_COUNT: u8 = 2;

/// Number of digital outputs configured at startup.
pub const DEFAULT_DIGITAL_OUTPUT_COUNT: u8 = 2;

// ============================================================================
// Device Addresses
// ============================================================================

/// Default bus address of the keypad.
pub const DEFAULT_KEYPAD_ADDRESS: u8 = 0x25;

/// Default address of the audio switcher.
pub const DEFAULT_SWITCHER_ADDRESS: u8 = 0x99;

// ============================================================================
// IR Commands
// ============================================================================

/// IR command pressed for the "up" cue.
pub const IR_UP_COMMAND: &str = "UP_ARROW";

/// IR command pressed for the "down" cue.
pub const IR_DOWN_COMMAND: &str = "DN_ARROW";

/// IR output port used for all cues (1-based).
pub const DEFAULT_IR_PORT: u8 = 1;

// ============================================================================
// Audio Switcher Limits
// ============================================================================

/// Highest zone number accepted by [`ZoneNumber`](crate::ZoneNumber).
pub const MAX_ZONE: u16 = 64;

/// Highest source number accepted by [`SourceNumber`](crate::SourceNumber).
///
/// Source `0` means "no source".
pub const MAX_SOURCE: u16 = 64;

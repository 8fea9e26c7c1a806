//! Serial line assembly for the Hearth control program.
//!
//! Received serial data arrives as arbitrary byte chunks. This crate turns
//! that stream into newline-terminated lines on a dedicated background task:
//!
//! - [`ChunkQueue`] / [`ChunkReceiver`]: unbounded FIFO of chunks with a
//!   close marker, fed by any number of producers.
//! - [`LineBuffer`]: synchronous accumulation buffer that extracts complete
//!   lines and keeps the trailing partial line.
//! - [`LineAssembler`]: the single consumer that drains the queue through a
//!   `LineBuffer` and hands each [`Line`] to a [`LineHandler`].
//!
//! # Example
//!
//! ```
//! use hearth_serial::{Line, LineAssembler, Result, chunk_queue};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (queue, receiver) = chunk_queue();
//!
//! let handle = LineAssembler::new(receiver, |line: Line| -> Result<()> {
//!     println!("received: {}", line);
//!     Ok(())
//! })
//! .spawn();
//!
//! queue.enqueue("PWR ON\r\n");
//! queue.close();
//!
//! let report = handle.join().await.unwrap();
//! assert_eq!(report.lines_emitted, 1);
//! # }
//! ```

pub mod assembler;
pub mod buffer;
pub mod error;
pub mod line;
pub mod queue;

pub use assembler::{
    AssemblerConfig, AssemblerHandle, AssemblerReport, AssemblerState, LineAssembler, LineHandler,
};
pub use buffer::{DrainLines, LineBuffer};
pub use error::{Result, SerialError};
pub use line::Line;
pub use queue::{ChunkQueue, ChunkReceiver, QueueEntry, chunk_queue};

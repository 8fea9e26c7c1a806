//! Background consumer that turns queued byte chunks into lines.
//!
//! The [`LineAssembler`] is the only reader of a [`ChunkReceiver`]. It owns
//! a [`LineBuffer`] and hands every complete line to a [`LineHandler`].
//!
//! # State Machine
//!
//! ```text
//! ┌─────────┐  Close entry   ┌─────────┐
//! │ Running │───────────────>│ Stopped │
//! └─────────┘                └─────────┘
//!   ^    │
//!   │    │ Chunk entry: append, emit every complete line
//!   └────┘
//! ```
//!
//! Each iteration dequeues one entry (the only await point), appends it to
//! the buffer and delivers all lines the chunk completed before dequeuing
//! again. Entries enqueued after `Close` are never read.
//!
//! # Fault Handling
//!
//! Nothing stops the loop except `Close`:
//! - An over-long partial line is logged and discarded.
//! - A handler error is logged and the line is dropped.
//!
//! # Example
//!
//! ```
//! use hearth_serial::{Line, LineAssembler, chunk_queue};
//! use tokio::sync::mpsc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (queue, receiver) = chunk_queue();
//! let (line_tx, mut line_rx) = mpsc::unbounded_channel::<Line>();
//!
//! let handle = LineAssembler::new(receiver, line_tx).spawn();
//!
//! queue.enqueue("12");
//! queue.enqueue("3\n");
//! queue.enqueue("45\n");
//! queue.close();
//!
//! assert_eq!(line_rx.recv().await.unwrap().as_bytes(), b"123\n");
//! assert_eq!(line_rx.recv().await.unwrap().as_bytes(), b"45\n");
//!
//! let report = handle.join().await.unwrap();
//! assert_eq!(report.lines_emitted, 2);
//! assert!(report.residual.is_empty());
//! # }
//! ```

use bytes::Bytes;
use hearth_core::constants::DEFAULT_MAX_PENDING;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::buffer::LineBuffer;
use crate::error::{Result, SerialError};
use crate::line::Line;
use crate::queue::{ChunkReceiver, QueueEntry};

/// Receives each complete line produced by a [`LineAssembler`].
///
/// Implemented for closures returning [`Result`] and for unbounded senders
/// of [`Line`].
pub trait LineHandler: Send {
    /// Handle one delimiter-terminated line.
    ///
    /// # Errors
    ///
    /// An error is logged by the assembler and the line is dropped; the
    /// assembler keeps running.
    ///
    /// # Panics
    ///
    /// Handlers must not panic. A panic unwinds through the assembler task
    /// and ends it; [`AssemblerHandle::join`] then reports
    /// [`SerialError::TaskFailed`].
    fn handle_line(&mut self, line: Line) -> Result<()>;
}

impl<F> LineHandler for F
where
    F: FnMut(Line) -> Result<()> + Send,
{
    fn handle_line(&mut self, line: Line) -> Result<()> {
        self(line)
    }
}

impl LineHandler for mpsc::UnboundedSender<Line> {
    fn handle_line(&mut self, line: Line) -> Result<()> {
        self.send(line).map_err(|_| SerialError::HandlerClosed)
    }
}

/// Configuration for a [`LineAssembler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Maximum bytes held without a delimiter before they are discarded.
    pub max_pending: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            max_pending: DEFAULT_MAX_PENDING,
        }
    }
}

/// Lifecycle state of a [`LineAssembler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// Dequeuing and assembling lines.
    Running,

    /// Observed the close entry. Terminal.
    Stopped,
}

/// Summary returned when an assembler stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblerReport {
    /// Lines successfully handed to the handler.
    pub lines_emitted: u64,

    /// Parse faults recovered by discarding pending bytes.
    pub faults: u64,

    /// Lines the handler rejected.
    pub handler_errors: u64,

    /// Partial line left in the buffer when the assembler stopped.
    pub residual: Bytes,
}

/// Single consumer that assembles lines from a chunk queue.
pub struct LineAssembler<H> {
    receiver: ChunkReceiver,
    buffer: LineBuffer,
    handler: H,
    state: AssemblerState,
    report: AssemblerReport,
}

impl<H: LineHandler> LineAssembler<H> {
    /// Create an assembler with the default configuration.
    pub fn new(receiver: ChunkReceiver, handler: H) -> Self {
        Self::with_config(receiver, handler, AssemblerConfig::default())
    }

    /// Create an assembler with a custom configuration.
    pub fn with_config(receiver: ChunkReceiver, handler: H, config: AssemblerConfig) -> Self {
        Self {
            receiver,
            buffer: LineBuffer::with_max_pending(config.max_pending),
            handler,
            state: AssemblerState::Running,
            report: AssemblerReport::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Bytes received since the last delimiter.
    pub fn pending(&self) -> &[u8] {
        self.buffer.pending()
    }

    /// Counters collected so far.
    pub fn report(&self) -> &AssemblerReport {
        &self.report
    }

    /// Run one iteration: dequeue one entry and act on it.
    ///
    /// Returns the state after the iteration. Once `Stopped`, further calls
    /// return immediately without touching the queue.
    pub async fn step(&mut self) -> AssemblerState {
        if self.state == AssemblerState::Stopped {
            return self.state;
        }

        match self.receiver.dequeue().await {
            QueueEntry::Close => {
                debug!(
                    "Line assembler stopping with {} pending bytes",
                    self.buffer.pending().len()
                );
                self.state = AssemblerState::Stopped;
            }
            QueueEntry::Chunk(chunk) => {
                trace!("Received {} byte chunk", chunk.len());
                self.absorb(&chunk);
            }
        }

        self.state
    }

    /// Run until the close entry is dequeued.
    pub async fn run(mut self) -> AssemblerReport {
        debug!("Line assembler started");

        while self.step().await == AssemblerState::Running {}

        self.report.residual = self.buffer.take_pending();
        debug!(
            "Line assembler stopped: {} lines, {} faults, {} handler errors",
            self.report.lines_emitted, self.report.faults, self.report.handler_errors
        );
        self.report
    }

    /// Append a chunk and deliver every line it completes.
    fn absorb(&mut self, chunk: &[u8]) {
        if let Err(e) = self.buffer.feed(chunk) {
            if e.is_parse_fault() {
                self.report.faults += 1;
                warn!("Discarded pending serial data: {}", e);
            } else {
                error!("Error buffering serial data: {}", e);
            }
        }

        while let Some(line) = self.buffer.next_line() {
            self.deliver(line);
        }
    }

    fn deliver(&mut self, line: Line) {
        trace!("Assembled line: {}", line);
        match self.handler.handle_line(line) {
            Ok(()) => self.report.lines_emitted += 1,
            Err(e) => {
                self.report.handler_errors += 1;
                error!("Error handling serial line: {}", e);
            }
        }
    }
}

impl<H: LineHandler + 'static> LineAssembler<H> {
    /// Run the assembler on its own task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(self) -> AssemblerHandle {
        AssemblerHandle {
            task: tokio::spawn(self.run()),
        }
    }
}

/// Handle to a spawned [`LineAssembler`].
#[derive(Debug)]
pub struct AssemblerHandle {
    task: JoinHandle<AssemblerReport>,
}

impl AssemblerHandle {
    /// Whether the assembler task has finished.
    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the assembler to stop and return its report.
    ///
    /// The assembler only stops after a close entry is enqueued (or every
    /// producer handle is dropped).
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::TaskFailed`] if the task panicked or was
    /// aborted.
    pub async fn join(self) -> Result<AssemblerReport> {
        self.task.await.map_err(|e| SerialError::TaskFailed {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::chunk_queue;
    use std::sync::{Arc, Mutex};

    fn collecting_handler() -> (impl LineHandler + 'static, Arc<Mutex<Vec<Vec<u8>>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let handler = move |line: Line| -> Result<()> {
            sink.lock().unwrap().push(line.as_bytes().to_vec());
            Ok(())
        };
        (handler, lines)
    }

    #[tokio::test]
    async fn test_initial_state_running() {
        let (_queue, receiver) = chunk_queue();
        let (handler, _) = collecting_handler();
        let assembler = LineAssembler::new(receiver, handler);

        assert_eq!(assembler.state(), AssemblerState::Running);
        assert!(assembler.pending().is_empty());
    }

    #[tokio::test]
    async fn test_step_retains_partial_line() {
        let (queue, receiver) = chunk_queue();
        let (handler, lines) = collecting_handler();
        let mut assembler = LineAssembler::new(receiver, handler);

        queue.enqueue("no newline");
        assert_eq!(assembler.step().await, AssemblerState::Running);

        assert!(lines.lock().unwrap().is_empty());
        assert_eq!(assembler.pending(), b"no newline");
    }

    #[tokio::test]
    async fn test_step_emits_every_line_in_chunk() {
        let (queue, receiver) = chunk_queue();
        let (handler, lines) = collecting_handler();
        let mut assembler = LineAssembler::new(receiver, handler);

        queue.enqueue("a\nb\nc");
        assembler.step().await;

        assert_eq!(
            *lines.lock().unwrap(),
            vec![b"a\n".to_vec(), b"b\n".to_vec()]
        );
        assert_eq!(assembler.pending(), b"c");
        assert_eq!(assembler.report().lines_emitted, 2);
    }

    #[tokio::test]
    async fn test_close_stops_and_ignores_later_entries() {
        let (queue, receiver) = chunk_queue();
        let (handler, lines) = collecting_handler();
        let mut assembler = LineAssembler::new(receiver, handler);

        queue.close();
        queue.enqueue("after\n");

        assert_eq!(assembler.step().await, AssemblerState::Stopped);
        assert_eq!(assembler.step().await, AssemblerState::Stopped);

        assert!(lines.lock().unwrap().is_empty());
        assert_eq!(assembler.receiver.len(), 1);
    }

    #[tokio::test]
    async fn test_handler_error_does_not_stop_assembler() {
        let (queue, receiver) = chunk_queue();
        let mut seen = Vec::new();
        let handler = move |line: Line| {
            seen.push(line.clone());
            if line.content() == b"bad" {
                Err(SerialError::handler("rejected"))
            } else {
                Ok(())
            }
        };

        queue.enqueue("ok\nbad\nok\n");
        queue.close();

        let report = LineAssembler::new(receiver, handler).run().await;

        assert_eq!(report.lines_emitted, 2);
        assert_eq!(report.handler_errors, 1);
    }

    #[tokio::test]
    async fn test_overflow_is_counted_and_recovered() {
        let (queue, receiver) = chunk_queue();
        let (handler, lines) = collecting_handler();
        let config = AssemblerConfig { max_pending: 4 };

        queue.enqueue("toolong");
        queue.enqueue("ok\n");
        queue.enqueue("fine\n");
        queue.close();

        let report = LineAssembler::with_config(receiver, handler, config)
            .run()
            .await;

        assert_eq!(report.faults, 1);
        assert_eq!(*lines.lock().unwrap(), vec![b"fine\n".to_vec()]);
    }

    #[tokio::test]
    async fn test_overflow_never_delivers_line_fragment() {
        let (queue, receiver) = chunk_queue();
        let (handler, lines) = collecting_handler();
        let config = AssemblerConfig { max_pending: 8 };

        queue.enqueue("GARBAGE-LONG-LINE-");
        queue.enqueue("END\nOK\n");
        queue.close();

        let report = LineAssembler::with_config(receiver, handler, config)
            .run()
            .await;

        assert_eq!(report.faults, 1);
        assert_eq!(report.lines_emitted, 1);
        assert_eq!(*lines.lock().unwrap(), vec![b"OK\n".to_vec()]);
        assert!(report.residual.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_handler_fails_join() {
        let (queue, receiver) = chunk_queue();
        let handler = |line: Line| -> Result<()> {
            if line.content() == b"bad" {
                panic!("handler bug");
            }
            Ok(())
        };

        queue.enqueue("ok\nbad\n");
        let handle = LineAssembler::new(receiver, handler).spawn();

        let err = handle.join().await.unwrap_err();
        assert!(matches!(err, SerialError::TaskFailed { .. }));
    }

    #[tokio::test]
    async fn test_closed_sender_handler_counts_errors() {
        let (queue, receiver) = chunk_queue();
        let (line_tx, line_rx) = mpsc::unbounded_channel::<Line>();
        drop(line_rx);

        queue.enqueue("x\n");
        queue.close();

        let report = LineAssembler::new(receiver, line_tx).run().await;

        assert_eq!(report.lines_emitted, 0);
        assert_eq!(report.handler_errors, 1);
    }

    #[tokio::test]
    async fn test_report_carries_residual() {
        let (queue, receiver) = chunk_queue();
        let (handler, _) = collecting_handler();

        queue.enqueue("line\npartial");
        queue.close();

        let report = LineAssembler::new(receiver, handler).run().await;

        assert_eq!(report.lines_emitted, 1);
        assert_eq!(&report.residual[..], b"partial");
    }
}

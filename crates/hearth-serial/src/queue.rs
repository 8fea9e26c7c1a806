//! Unbounded multi-producer, single-consumer queue of received byte chunks.
//!
//! Producers (serial receive callbacks, console shims, tests) push chunks
//! with [`ChunkQueue::enqueue`] and request shutdown with
//! [`ChunkQueue::close`]. Both calls are synchronous and never block, so they
//! are safe to use from any context including non-async callbacks.
//!
//! ```text
//! ┌──────────┐
//! │ COM2 rx  │──┐
//! └──────────┘  │   ┌──────────────────┐   ┌────────────────┐
//!               ├──►│ ChunkQueue (FIFO)│──►│ LineAssembler  │
//! ┌──────────┐  │   └──────────────────┘   └────────────────┘
//! │ console  │──┘
//! └──────────┘
//! ```
//!
//! The queue is unbounded: a producer that outpaces the consumer grows
//! memory. Serial ports are slow compared to the assembler, so there is no
//! backpressure.

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::trace;

/// Entry delivered to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEntry {
    /// Raw received bytes of any length, possibly empty.
    Chunk(Bytes),

    /// No more chunks will follow. The consumer stops on this entry.
    Close,
}

/// Create a connected queue and receiver.
///
/// # Example
///
/// ```
/// use hearth_serial::{QueueEntry, chunk_queue};
///
/// # #[tokio::main]
/// # async fn main() {
/// let (queue, mut receiver) = chunk_queue();
///
/// queue.enqueue("12");
/// queue.close();
///
/// assert_eq!(receiver.dequeue().await, QueueEntry::Chunk("12".into()));
/// assert_eq!(receiver.dequeue().await, QueueEntry::Close);
/// # }
/// ```
pub fn chunk_queue() -> (ChunkQueue, ChunkReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChunkQueue { tx }, ChunkReceiver { rx })
}

/// Producer side of the chunk queue. Cheap to clone; every clone feeds the
/// same consumer.
#[derive(Debug, Clone)]
pub struct ChunkQueue {
    tx: mpsc::UnboundedSender<QueueEntry>,
}

impl ChunkQueue {
    /// Append a chunk to the queue.
    ///
    /// Never blocks and never fails. Once the consumer has stopped the chunk
    /// is dropped.
    pub fn enqueue(&self, chunk: impl Into<Bytes>) {
        let chunk = chunk.into();
        let len = chunk.len();
        if self.tx.send(QueueEntry::Chunk(chunk)).is_err() {
            trace!("Dropped {} byte chunk, line assembler has stopped", len);
        }
    }

    /// Ask the consumer to stop after draining everything enqueued before
    /// this call.
    ///
    /// Calling `close` again, before or after the consumer stopped, has no
    /// further effect.
    pub fn close(&self) {
        if self.tx.send(QueueEntry::Close).is_err() {
            trace!("Close ignored, line assembler already stopped");
        }
    }

    /// Whether the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of the chunk queue. Not cloneable: there is exactly one
/// consumer.
#[derive(Debug)]
pub struct ChunkReceiver {
    rx: mpsc::UnboundedReceiver<QueueEntry>,
}

impl ChunkReceiver {
    /// Wait for the next entry.
    ///
    /// Suspends until an entry is available; there is no timeout. If every
    /// [`ChunkQueue`] handle has been dropped, nothing can ever arrive and
    /// this returns [`QueueEntry::Close`].
    pub async fn dequeue(&mut self) -> QueueEntry {
        self.rx.recv().await.unwrap_or(QueueEntry::Close)
    }

    /// Number of entries waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo_order() {
        let (queue, mut receiver) = chunk_queue();

        queue.enqueue("a");
        queue.enqueue("b");
        queue.enqueue("c");

        assert_eq!(receiver.len(), 3);
        assert_eq!(receiver.dequeue().await, QueueEntry::Chunk("a".into()));
        assert_eq!(receiver.dequeue().await, QueueEntry::Chunk("b".into()));
        assert_eq!(receiver.dequeue().await, QueueEntry::Chunk("c".into()));
        assert!(receiver.is_empty());
    }

    #[tokio::test]
    async fn test_empty_chunk_is_delivered() {
        let (queue, mut receiver) = chunk_queue();

        queue.enqueue(Bytes::new());

        assert_eq!(receiver.dequeue().await, QueueEntry::Chunk(Bytes::new()));
    }

    #[tokio::test]
    async fn test_clones_share_consumer() {
        let (queue, mut receiver) = chunk_queue();
        let other = queue.clone();

        queue.enqueue("1");
        other.enqueue("2");

        assert_eq!(receiver.dequeue().await, QueueEntry::Chunk("1".into()));
        assert_eq!(receiver.dequeue().await, QueueEntry::Chunk("2".into()));
    }

    #[tokio::test]
    async fn test_dequeue_waits_for_producer() {
        let (queue, mut receiver) = chunk_queue();

        let producer = tokio::spawn(async move {
            tokio::task::yield_now().await;
            queue.enqueue("late");
        });

        assert_eq!(receiver.dequeue().await, QueueEntry::Chunk("late".into()));
        producer.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_producers_read_as_close() {
        let (queue, mut receiver) = chunk_queue();

        queue.enqueue("x");
        drop(queue);

        assert_eq!(receiver.dequeue().await, QueueEntry::Chunk("x".into()));
        assert_eq!(receiver.dequeue().await, QueueEntry::Close);
    }

    #[tokio::test]
    async fn test_enqueue_after_consumer_dropped_is_silent() {
        let (queue, receiver) = chunk_queue();
        drop(receiver);

        assert!(queue.is_closed());
        queue.enqueue("ignored");
        queue.close();
        queue.close();
    }

    #[tokio::test]
    async fn test_concurrent_producers_keep_per_producer_order() {
        let (queue, mut receiver) = chunk_queue();

        let mut producers = Vec::new();
        for id in 0..4u8 {
            let queue = queue.clone();
            producers.push(std::thread::spawn(move || {
                for seq in 0..100u8 {
                    queue.enqueue(vec![id, seq]);
                }
            }));
        }
        for producer in producers {
            producer.join().unwrap();
        }

        let mut last_seen = [None::<u8>; 4];
        for _ in 0..400 {
            match receiver.dequeue().await {
                QueueEntry::Chunk(chunk) => {
                    let (id, seq) = (chunk[0] as usize, chunk[1]);
                    if let Some(prev) = last_seen[id] {
                        assert!(seq > prev);
                    }
                    last_seen[id] = Some(seq);
                }
                QueueEntry::Close => panic!("unexpected close"),
            }
        }
        assert!(last_seen.iter().all(|seen| *seen == Some(99)));
    }
}

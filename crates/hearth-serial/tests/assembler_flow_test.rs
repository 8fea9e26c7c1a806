//! End-to-end tests for the spawned line assembler.
//!
//! These tests drive the assembler the way the control program does: one
//! background task consuming the queue while producers enqueue from other
//! tasks and threads.

use hearth_serial::{Line, LineAssembler, chunk_queue};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

const STOP_TIMEOUT: Duration = Duration::from_secs(2);

async fn collect_lines(rx: &mut mpsc::UnboundedReceiver<Line>) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    while let Ok(line) = rx.try_recv() {
        lines.push(line.as_bytes().to_vec());
    }
    lines
}

#[tokio::test]
async fn test_split_lines_then_close() {
    let (queue, receiver) = chunk_queue();
    let (line_tx, mut line_rx) = mpsc::unbounded_channel();

    let handle = LineAssembler::new(receiver, line_tx).spawn();

    queue.enqueue("12");
    queue.enqueue("3\n");
    queue.enqueue("45\n");
    queue.close();

    let report = timeout(STOP_TIMEOUT, handle.join())
        .await
        .expect("assembler did not stop")
        .unwrap();

    assert_eq!(
        collect_lines(&mut line_rx).await,
        vec![b"123\n".to_vec(), b"45\n".to_vec()]
    );
    assert_eq!(report.lines_emitted, 2);
    assert!(report.residual.is_empty());
}

#[tokio::test]
async fn test_multi_line_chunk_retains_tail() {
    let (queue, receiver) = chunk_queue();
    let (line_tx, mut line_rx) = mpsc::unbounded_channel();

    let handle = LineAssembler::new(receiver, line_tx).spawn();

    queue.enqueue("a\nb\nc");
    queue.close();

    let report = handle.join().await.unwrap();

    assert_eq!(
        collect_lines(&mut line_rx).await,
        vec![b"a\n".to_vec(), b"b\n".to_vec()]
    );
    assert_eq!(&report.residual[..], b"c");
}

#[tokio::test]
async fn test_no_delimiter_emits_nothing() {
    let (queue, receiver) = chunk_queue();
    let (line_tx, mut line_rx) = mpsc::unbounded_channel();

    let handle = LineAssembler::new(receiver, line_tx).spawn();

    queue.enqueue("abc");
    queue.enqueue("");
    queue.enqueue("def");
    queue.close();

    let report = handle.join().await.unwrap();

    assert!(collect_lines(&mut line_rx).await.is_empty());
    assert_eq!(&report.residual[..], b"abcdef");
}

#[tokio::test]
async fn test_lines_arrive_while_running() {
    let (queue, receiver) = chunk_queue();
    let (line_tx, mut line_rx) = mpsc::unbounded_channel();

    let handle = LineAssembler::new(receiver, line_tx).spawn();

    queue.enqueue("first\n");
    let line = timeout(STOP_TIMEOUT, line_rx.recv()).await.unwrap().unwrap();
    assert_eq!(line.as_bytes(), b"first\n");
    assert!(!handle.is_stopped());

    queue.enqueue("sec");
    queue.enqueue("ond\n");
    let line = timeout(STOP_TIMEOUT, line_rx.recv()).await.unwrap().unwrap();
    assert_eq!(line.as_bytes(), b"second\n");

    queue.close();
    handle.join().await.unwrap();
}

#[tokio::test]
async fn test_stops_within_bounded_time() {
    let (queue, receiver) = chunk_queue();
    let (line_tx, _line_rx) = mpsc::unbounded_channel();

    let handle = LineAssembler::new(receiver, line_tx).spawn();
    queue.close();

    let report = timeout(STOP_TIMEOUT, handle.join()).await;
    assert!(report.is_ok());
    assert!(queue.is_closed());
}

#[tokio::test]
async fn test_second_close_after_stop_is_harmless() {
    let (queue, receiver) = chunk_queue();
    let (line_tx, mut line_rx) = mpsc::unbounded_channel();

    let handle = LineAssembler::new(receiver, line_tx).spawn();
    queue.close();
    handle.join().await.unwrap();

    queue.close();
    queue.enqueue("late\n");

    assert!(collect_lines(&mut line_rx).await.is_empty());
}

#[tokio::test]
async fn test_dropping_all_producers_stops_assembler() {
    let (queue, receiver) = chunk_queue();
    let (line_tx, _line_rx) = mpsc::unbounded_channel();

    let handle = LineAssembler::new(receiver, line_tx).spawn();
    queue.enqueue("tail");
    drop(queue);

    let report = timeout(STOP_TIMEOUT, handle.join())
        .await
        .expect("assembler did not stop")
        .unwrap();
    assert_eq!(&report.residual[..], b"tail");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_producer_threads_lines_not_lost() {
    let (queue, receiver) = chunk_queue();
    let (line_tx, mut line_rx) = mpsc::unbounded_channel();

    let handle = LineAssembler::new(receiver, line_tx).spawn();

    // Each producer sends whole lines so cross-producer interleaving cannot
    // split a line.
    let mut producers = Vec::new();
    for id in 0..4 {
        let queue = queue.clone();
        producers.push(std::thread::spawn(move || {
            for seq in 0..50 {
                queue.enqueue(format!("{id}:{seq}\n"));
            }
        }));
    }
    for producer in producers {
        producer.join().unwrap();
    }
    queue.close();

    let report = handle.join().await.unwrap();
    assert_eq!(report.lines_emitted, 200);

    let lines = collect_lines(&mut line_rx).await;
    assert_eq!(lines.len(), 200);

    for id in 0..4 {
        let prefix = format!("{id}:");
        let seqs: Vec<u32> = lines
            .iter()
            .map(|l| String::from_utf8(l.clone()).unwrap())
            .filter(|l| l.starts_with(&prefix))
            .map(|l| l.trim_end()[prefix.len()..].parse().unwrap())
            .collect();
        assert_eq!(seqs, (0..50).collect::<Vec<_>>());
    }
}

//! Credit-based batch streaming of decoded rows
//!
//! A background worker decodes the byte source into rows and hands them to
//! the consumer in batches. The consumer drives the worker with
//! [`ControlMsg`]s: every `RequestMore` is answered by exactly one batch, and
//! the worker never decodes more than one batch ahead of the consumer.
//!
//! After the final batch (`has_more == false`) the worker still waits for one
//! more control message before it exits. [`RowStreamer::close`] provides it;
//! dropping the streamer without closing aborts the worker instead.

use super::row::{Row, RowAssembler};
use crate::screen::lines::LineReader;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Message from the consumer to the decoding worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMsg {
    RequestMore,
    Close,
}

/// Rows delivered in answer to one `RequestMore`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowBatch {
    pub rows: Vec<Row>,
    /// False on the last batch of the stream
    pub has_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamerState {
    Accumulating,
    AwaitingCredit,
    Closed,
}

/// Consumer handle of the decoding worker
pub struct RowStreamer {
    control: Option<mpsc::Sender<ControlMsg>>,
    batches: mpsc::Receiver<RowBatch>,
    worker: Option<JoinHandle<()>>,
    exhausted: bool,
}

impl RowStreamer {
    /// Spawn a decoding worker over `source` on the current tokio runtime.
    ///
    /// A `batch_size` of zero is treated as one.
    pub fn spawn<R>(source: R, batch_size: usize) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let batch_size = batch_size.max(1);
        let (control_tx, control_rx) = mpsc::channel(1);
        let (batch_tx, batch_rx) = mpsc::channel(1);

        let worker = tokio::spawn(run_worker(
            LineReader::new(source),
            batch_size,
            control_rx,
            batch_tx,
        ));

        Self {
            control: Some(control_tx),
            batches: batch_rx,
            worker: Some(worker),
            exhausted: false,
        }
    }

    /// Ask for the next batch and wait for it.
    ///
    /// Once the final batch has been delivered, or the streamer is closed,
    /// this returns an empty batch with `has_more == false`.
    pub async fn request_more(&mut self) -> RowBatch {
        if self.exhausted {
            return RowBatch::default();
        }
        let Some(control) = self.control.as_ref() else {
            return RowBatch::default();
        };

        if control.send(ControlMsg::RequestMore).await.is_err() {
            self.exhausted = true;
            return RowBatch::default();
        }

        match self.batches.recv().await {
            Some(batch) => {
                if !batch.has_more {
                    self.exhausted = true;
                }
                batch
            }
            None => {
                self.exhausted = true;
                RowBatch::default()
            }
        }
    }

    /// True once the final batch has been delivered
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Tell the worker to stop and release the control channel, without
    /// waiting for it to exit. Safe to call more than once.
    pub async fn send_close(&mut self) {
        self.exhausted = true;
        if let Some(control) = self.control.take() {
            if control.send(ControlMsg::Close).await.is_err() {
                trace!("Row worker already gone before close");
            }
        }
    }

    /// Wait for the worker to exit
    pub async fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                debug!("Row worker ended abnormally: {}", e);
            }
        }
    }

    /// Close the stream and wait for the worker. Idempotent.
    pub async fn close(&mut self) {
        self.send_close().await;
        self.join().await;
    }
}

impl Drop for RowStreamer {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

fn transition(state: &mut StreamerState, next: StreamerState) {
    trace!("Row worker {:?} -> {:?}", state, next);
    *state = next;
}

async fn run_worker<R>(
    mut lines: LineReader<R>,
    batch_size: usize,
    mut control: mpsc::Receiver<ControlMsg>,
    batches: mpsc::Sender<RowBatch>,
) where
    R: AsyncRead + Unpin,
{
    let mut assembler = RowAssembler::new();
    let mut state = StreamerState::Accumulating;

    loop {
        let segments = match lines.next_line().await {
            Ok(Some(segments)) => segments,
            Ok(None) => break,
            Err(e) => {
                debug!("Log output read failed, treating as end of stream: {}", e);
                break;
            }
        };

        assembler.push_line(segments);
        if assembler.pending_len() < batch_size {
            continue;
        }

        // a full batch is pending: wait for credit before decoding further
        transition(&mut state, StreamerState::AwaitingCredit);
        match control.recv().await {
            Some(ControlMsg::RequestMore) => {
                let rows = assembler.take_pending();
                trace!("Sending batch of {} rows", rows.len());
                let batch = RowBatch {
                    rows,
                    has_more: true,
                };
                if batches.send(batch).await.is_err() {
                    transition(&mut state, StreamerState::Closed);
                    return;
                }
                transition(&mut state, StreamerState::Accumulating);
            }
            Some(ControlMsg::Close) | None => {
                drop(lines);
                transition(&mut state, StreamerState::Closed);
                return;
            }
        }
    }

    drop(lines);
    assembler.finish();

    transition(&mut state, StreamerState::AwaitingCredit);
    if let Some(ControlMsg::RequestMore) = control.recv().await {
        let rows = assembler.take_pending();
        trace!("Sending final batch of {} rows", rows.len());
        let _ = batches
            .send(RowBatch {
                rows,
                has_more: false,
            })
            .await;
    }

    // every batch cycle is acknowledged by one more control message
    let _ = control.recv().await;
    transition(&mut state, StreamerState::Closed);
}

//! # Flow-Controlled Pipe
//!
//! A bounded byte pipe between the pump and the framer. The writer fills a
//! `BytesMut` in place and flushes it as one segment; a flush suspends while
//! the reader is `capacity` segments behind.
//!
//! When the pump re-establishes its source it sends a `Segment::Break`, so a
//! record torn by the lost connection is never glued onto the new one.

use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;

/// Create a pipe that buffers at most `capacity` flushed segments.
pub fn pipe(capacity: usize) -> (PipeWriter, PipeReader) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        PipeWriter {
            tx: Some(tx),
            buf: BytesMut::new(),
        },
        PipeReader { rx },
    )
}

/// One item carried by the pipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Data(Bytes),
    /// The byte stream restarted; earlier bytes never complete a record.
    Break,
}

/// Outcome of a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushResult {
    /// The reader completed; nothing more will be consumed.
    pub is_completed: bool,
}

pub struct PipeWriter {
    tx: Option<mpsc::Sender<Segment>>,
    buf: BytesMut,
}

impl PipeWriter {
    /// Writable memory with at least `size_hint` bytes of spare capacity.
    /// Data appended here is pending until the next `flush`.
    pub fn memory(&mut self, size_hint: usize) -> &mut BytesMut {
        if self.buf.capacity() - self.buf.len() < size_hint {
            self.buf.reserve(size_hint);
        }
        &mut self.buf
    }

    /// Bytes written but not yet flushed.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Hand pending bytes to the reader, waiting for room if it is behind.
    pub async fn flush(&mut self) -> FlushResult {
        let Some(tx) = &self.tx else {
            return FlushResult { is_completed: true };
        };
        if self.buf.is_empty() {
            return FlushResult {
                is_completed: tx.is_closed(),
            };
        }

        let segment = Segment::Data(self.buf.split().freeze());
        self.send(segment).await
    }

    /// Drop pending bytes and tell the reader the byte stream restarted.
    pub async fn mark_break(&mut self) -> FlushResult {
        self.buf.clear();
        self.send(Segment::Break).await
    }

    async fn send(&mut self, segment: Segment) -> FlushResult {
        let Some(tx) = &self.tx else {
            return FlushResult { is_completed: true };
        };
        match tx.send(segment).await {
            Ok(()) => FlushResult {
                is_completed: false,
            },
            Err(_) => {
                self.tx = None;
                FlushResult { is_completed: true }
            }
        }
    }

    /// Signal end of stream. Unflushed bytes are dropped.
    pub fn complete(&mut self) {
        self.tx = None;
        self.buf.clear();
    }
}

pub struct PipeReader {
    rx: mpsc::Receiver<Segment>,
}

impl PipeReader {
    /// Next flushed segment, or `None` once the writer completed and the
    /// pipe is drained.
    pub async fn read(&mut self) -> Option<Segment> {
        self.rx.recv().await
    }

    /// Stop consuming; pending and future flushes report completion.
    pub fn complete(&mut self) {
        self.rx.close();
    }
}

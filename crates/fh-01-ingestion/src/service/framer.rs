//! # Line Framer
//!
//! Reassembles newline-delimited records from pipe segments. A record may
//! span any number of segments. Blank records are dropped, a trailing `\r`
//! is stripped, and a partial record left when the pipe ends or the source
//! reconnects is discarded.

use bytes::BytesMut;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use fh_telemetry::LINES_FRAMED;

use crate::service::pipe::{PipeReader, Segment};

/// Summary of a framer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramerReport {
    pub lines: u64,
    pub discarded_bytes: usize,
}

pub struct LineFramer {
    reader: PipeReader,
    partial: BytesMut,
    scanned: usize,
}

impl LineFramer {
    pub fn new(reader: PipeReader) -> Self {
        Self {
            reader,
            partial: BytesMut::new(),
            scanned: 0,
        }
    }

    /// Frame until the pipe ends, the receiver drops, or `cancel` fires.
    /// Dropping `output` on return closes the downstream channel.
    pub async fn run(
        mut self,
        output: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> FramerReport {
        let mut report = FramerReport::default();

        loop {
            let segment = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                segment = self.reader.read() => segment,
            };
            let bytes = match segment {
                Some(Segment::Data(bytes)) => bytes,
                Some(Segment::Break) => {
                    report.discarded_bytes += self.discard_partial("reconnect");
                    continue;
                }
                None => {
                    report.discarded_bytes += self.discard_partial("end of stream");
                    break;
                }
            };

            self.partial.extend_from_slice(&bytes);
            while let Some(line) = self.next_line() {
                let sent = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    sent = output.send(line) => Some(sent.is_ok()),
                };
                match sent {
                    Some(true) => {
                        report.lines += 1;
                        LINES_FRAMED.inc();
                    }
                    Some(false) => {
                        debug!("[fh-01] Line receiver gone, completing reader");
                        self.reader.complete();
                        return report;
                    }
                    None => return report,
                }
            }
        }

        report
    }

    fn discard_partial(&mut self, cause: &str) -> usize {
        let dropped = self.partial.len();
        if dropped > 0 {
            debug!(
                "[fh-01] Discarding {} bytes of unterminated record at {}",
                dropped, cause
            );
        }
        self.partial.clear();
        self.scanned = 0;
        dropped
    }

    /// Split off the next non-blank record, if a full one is buffered.
    fn next_line(&mut self) -> Option<String> {
        loop {
            let offset = self.partial[self.scanned..].iter().position(|b| *b == b'\n');
            let Some(offset) = offset else {
                self.scanned = self.partial.len();
                return None;
            };

            let mut record = self.partial.split_to(self.scanned + offset + 1);
            self.scanned = 0;
            record.truncate(record.len() - 1);
            if record.last() == Some(&b'\r') {
                record.truncate(record.len() - 1);
            }

            let line = String::from_utf8_lossy(&record);
            if !line.trim().is_empty() {
                return Some(line.into_owned());
            }
        }
    }
}

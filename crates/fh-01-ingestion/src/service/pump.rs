//! # Ingestion Pump
//!
//! Reads from a reconnectable source into the flow-controlled pipe.
//!
//! ## Reconnect Policy
//!
//! | Event | Connection age < minimum | Otherwise |
//! |-------|--------------------------|-----------|
//! | Read error | `Failing`, error returned | `Reconnecting` |
//! | Zero-byte read, live source | `Failing`, error returned | `Reconnecting` |
//! | Zero-byte read, finite source | `Completed` | `Completed` |
//! | Factory error | `Failing`, error returned | `Failing`, error returned |
//!
//! Every reconnect sends a break through the pipe so the framer drops the
//! record the lost connection tore.
//!
//! A completed reader or a cancelled token ends the run cleanly. The writer
//! is always completed on exit so the framer sees end of stream.

use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use fh_telemetry::{INGEST_BYTES_READ, INGEST_RECONNECTS};

use crate::domain::{IngestError, PumpConfig, PumpReport, PumpState};
use crate::ports::{BoxedSource, SourceFactory};
use crate::service::pipe::PipeWriter;
use crate::service::throughput::ThroughputMeter;

enum Step {
    Continue,
    Stop,
}

pub struct IngestionPump {
    factory: Arc<dyn SourceFactory>,
    config: PumpConfig,
    state_tx: watch::Sender<PumpState>,
    bytes_read: u64,
    reconnects: u32,
}

impl IngestionPump {
    pub fn new(factory: Arc<dyn SourceFactory>, config: PumpConfig) -> Self {
        let (state_tx, _) = watch::channel(PumpState::Connecting);
        Self {
            factory,
            config,
            state_tx,
            bytes_read: 0,
            reconnects: 0,
        }
    }

    /// Observe state transitions while the pump runs.
    pub fn subscribe_state(&self) -> watch::Receiver<PumpState> {
        self.state_tx.subscribe()
    }

    /// Pump until the source ends, the reader completes, or `cancel` fires.
    pub async fn run(
        mut self,
        mut writer: PipeWriter,
        cancel: CancellationToken,
    ) -> Result<PumpReport, IngestError> {
        let result = self.pump(&mut writer, &cancel).await;
        writer.complete();

        match result {
            Ok(()) => {
                self.set_state(PumpState::Completed);
                info!(
                    "[fh-01] Pump completed: {} bytes, {} reconnects",
                    self.bytes_read, self.reconnects
                );
                Ok(self.report(PumpState::Completed))
            }
            Err(e) => {
                self.set_state(PumpState::Failing);
                error!("[fh-01] Pump failing from {}: {}", self.factory.describe(), e);
                Err(e)
            }
        }
    }

    async fn pump(
        &mut self,
        writer: &mut PipeWriter,
        cancel: &CancellationToken,
    ) -> Result<(), IngestError> {
        self.set_state(PumpState::Connecting);
        let Some(mut source) = self.connect(cancel).await? else {
            return Ok(());
        };
        let mut connected_at = Instant::now();
        self.set_state(PumpState::Reading);

        let mut meter = ThroughputMeter::new(self.config.throughput_window);
        let read_size = self.config.read_buffer_bytes.max(1);

        loop {
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("[fh-01] Pump cancelled");
                    return Ok(());
                }
                read = source.read_buf(writer.memory(read_size)) => read,
            };

            let reconnect = match read {
                Ok(0) if !self.factory.is_reconnectable() => {
                    debug!("[fh-01] Finite source exhausted");
                    return Ok(());
                }
                Ok(0) => {
                    let connected_for = connected_at.elapsed();
                    if connected_for < self.config.min_connection {
                        return Err(IngestError::ZeroByteStall { connected_for });
                    }
                    warn!(
                        "[fh-01] Source closed after {:?}, reconnecting",
                        connected_for
                    );
                    true
                }
                Ok(n) => {
                    match self.deliver(writer, &mut meter, n, cancel).await {
                        Step::Continue => false,
                        Step::Stop => return Ok(()),
                    }
                }
                Err(e) => {
                    let connected_for = connected_at.elapsed();
                    if connected_for < self.config.min_connection {
                        return Err(IngestError::ReadFailed {
                            connected_for,
                            source: e,
                        });
                    }
                    warn!(
                        "[fh-01] Read failed after {:?} ({}), reconnecting",
                        connected_for, e
                    );
                    true
                }
            };

            if reconnect {
                self.set_state(PumpState::Reconnecting);
                drop(source);
                let marked = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Ok(()),
                    marked = writer.mark_break() => marked,
                };
                if marked.is_completed {
                    debug!("[fh-01] Reader completed, stopping pump");
                    return Ok(());
                }
                source = match self.connect(cancel).await? {
                    Some(source) => source,
                    None => return Ok(()),
                };
                connected_at = Instant::now();
                self.reconnects += 1;
                INGEST_RECONNECTS.inc();
                self.set_state(PumpState::Reading);
            }
        }
    }

    async fn deliver(
        &mut self,
        writer: &mut PipeWriter,
        meter: &mut ThroughputMeter,
        n: usize,
        cancel: &CancellationToken,
    ) -> Step {
        self.bytes_read += n as u64;
        INGEST_BYTES_READ.inc_by(n as u64);
        meter.record(n);

        let flushed = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Step::Stop,
            flushed = writer.flush() => flushed,
        };
        if flushed.is_completed {
            debug!("[fh-01] Reader completed, stopping pump");
            return Step::Stop;
        }
        Step::Continue
    }

    /// `Ok(None)` when cancelled while connecting.
    async fn connect(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<BoxedSource>, IngestError> {
        debug!("[fh-01] Connecting to {}", self.factory.describe());
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Ok(None),
            source = self.factory.connect() => source.map(Some),
        }
    }

    fn set_state(&self, state: PumpState) {
        self.state_tx.send_replace(state);
    }

    fn report(&self, final_state: PumpState) -> PumpReport {
        PumpReport {
            bytes_read: self.bytes_read,
            reconnects: self.reconnects,
            final_state,
        }
    }
}

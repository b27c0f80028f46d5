//! # Fan-Out Broadcaster
//!
//! Explicit replacement for a multicast subscription: outputs are registered
//! up front and the broadcaster only starts pulling when `run` is awaited.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

struct Output<T> {
    name: String,
    sender: mpsc::Sender<T>,
}

/// Duplicates every input item into each registered output, in order.
pub struct FanOut<T> {
    name: String,
    input: mpsc::Receiver<T>,
    outputs: Vec<Output<T>>,
}

impl<T: Clone + Send + 'static> FanOut<T> {
    pub fn new(name: impl Into<String>, input: mpsc::Receiver<T>) -> Self {
        Self {
            name: name.into(),
            input,
            outputs: Vec::new(),
        }
    }

    /// Register a downstream consumer and get its receiving end.
    pub fn add_output(&mut self, name: impl Into<String>, capacity: usize) -> mpsc::Receiver<T> {
        let (sender, receiver) = mpsc::channel(capacity);
        self.outputs.push(Output {
            name: name.into(),
            sender,
        });
        receiver
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Pump items until the input closes, every output is gone, or the token
    /// is cancelled. Returns the number of input items forwarded.
    ///
    /// An output whose receiver was dropped is detached; the others keep
    /// receiving. Dropping `self` at the end closes every output.
    pub async fn run(mut self, cancel: CancellationToken) -> anyhow::Result<u64> {
        let mut forwarded = 0u64;

        loop {
            let item = tokio::select! {
                _ = cancel.cancelled() => break,
                item = self.input.recv() => match item {
                    Some(item) => item,
                    None => break,
                },
            };

            let mut index = 0;
            while index < self.outputs.len() {
                let sent = tokio::select! {
                    _ = cancel.cancelled() => return Ok(forwarded),
                    sent = self.outputs[index].sender.send(item.clone()) => sent,
                };
                if sent.is_err() {
                    let detached = self.outputs.remove(index);
                    debug!(fanout = %self.name, output = %detached.name, "Output closed, detaching");
                } else {
                    index += 1;
                }
            }

            forwarded += 1;
            if self.outputs.is_empty() {
                info!(fanout = %self.name, "All outputs closed, stopping fan-out");
                break;
            }
        }

        Ok(forwarded)
    }
}

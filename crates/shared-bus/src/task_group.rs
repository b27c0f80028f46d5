//! # Task Group
//!
//! Runs pipeline stages side by side under one cancellation token.
//!
//! Two membership kinds:
//! - `spawn`: the group is torn down when the member ends, for any reason.
//! - `spawn_feeder`: the group is torn down only if the member fails. A
//!   feeder that finishes cleanly just closes its output so downstream
//!   members drain what is left.
//!
//! `join` waits for every member and reports the first failure.

use std::future::Future;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

type MemberOutcome = (String, bool, anyhow::Result<()>);

pub struct TaskGroup {
    name: String,
    token: CancellationToken,
    tasks: JoinSet<MemberOutcome>,
}

impl TaskGroup {
    /// Create a group whose token is a child of `parent`.
    pub fn new(name: impl Into<String>, parent: &CancellationToken) -> Self {
        Self {
            name: name.into(),
            token: parent.child_token(),
            tasks: JoinSet::new(),
        }
    }

    /// Token members should watch to stop early.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Add a member whose completion, successful or not, cancels the group.
    pub fn spawn<F>(&mut self, name: impl Into<String>, fut: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.insert(name.into(), true, fut);
    }

    /// Add a member that only cancels the group when it fails.
    pub fn spawn_feeder<F>(&mut self, name: impl Into<String>, fut: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.insert(name.into(), false, fut);
    }

    fn insert<F>(&mut self, name: String, cancels_on_ok: bool, fut: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        debug!(group = %self.name, member = %name, "Spawning member");
        self.tasks.spawn(async move { (name, cancels_on_ok, fut.await) });
    }

    /// Wait for all members. Returns the first failure, if any.
    pub async fn join(mut self) -> anyhow::Result<()> {
        let mut first_error: Option<anyhow::Error> = None;

        while let Some(joined) = self.tasks.join_next().await {
            let (member, cancels_on_ok, result) = match joined {
                Ok(outcome) => outcome,
                Err(join_error) => (
                    "<panicked>".to_string(),
                    true,
                    Err(anyhow::anyhow!("member task aborted: {join_error}")),
                ),
            };

            match result {
                Ok(()) => {
                    info!(group = %self.name, member = %member, "Member completed");
                    if cancels_on_ok && !self.token.is_cancelled() {
                        debug!(group = %self.name, member = %member, "Cancelling group");
                        self.token.cancel();
                    }
                }
                Err(e) => {
                    error!(group = %self.name, member = %member, error = %e, "Member failed");
                    self.token.cancel();
                    if first_error.is_none() {
                        first_error =
                            Some(e.context(format!("{} member '{}' failed", self.name, member)));
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

//! Drains every configured bucket and reports per-bucket outcomes.
//!
//! Two paths exist, selected by the `prompt` setting:
//!
//! - Non-interactive: every bucket is drained concurrently, the run lasts at
//!   least `settle_wait_milliseconds`, and any failed bucket turns the whole
//!   run into [`GBucketRemoveError::DrainFailed`].
//! - Interactive: every bucket is confirmed up front, in configuration order.
//!   Declined buckets are reported as cancelled. Confirmed buckets are drained
//!   concurrently; failures are reported but the run still succeeds.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_channel::{Receiver, Sender};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::config::{Config, LifecycleEvent};
use crate::drainer::BucketDrainer;
use crate::safety::{ConfirmationGate, PromptHandler};
use crate::stage::Stage;
use crate::storage::{Storage, create_storage};
use crate::types::error::{DrainError, GBucketRemoveError};
use crate::types::token::DrainCancellationToken;
use crate::types::{BucketConfig, DrainReport, DrainStatistics};

const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_RESET: &str = "\x1b[0m";

/// Destination of the human-readable status lines.
pub trait ConsoleSink: Send + Sync {
    fn console_log(&self, message: &str);
}

/// Writes status lines to stdout, prefixed and optionally yellow.
pub struct StdoutConsole {
    message_prefix: String,
    use_color: bool,
}

impl StdoutConsole {
    pub fn new(message_prefix: &str, use_color: bool) -> Self {
        Self {
            message_prefix: message_prefix.to_string(),
            use_color,
        }
    }
}

impl ConsoleSink for StdoutConsole {
    fn console_log(&self, message: &str) {
        println!(
            "{}",
            format_console_line(&self.message_prefix, message, self.use_color)
        );
    }
}

/// `{prefix}{message}`, with only the message colored.
pub fn format_console_line(message_prefix: &str, message: &str, use_color: bool) -> String {
    if use_color {
        format!("{message_prefix}{ANSI_YELLOW}{message}{ANSI_RESET}")
    } else {
        format!("{message_prefix}{message}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketOutcome {
    Drained(DrainReport),
    /// Declined at the prompt, or the drain observed Ctrl+C.
    Cancelled,
    Failed(DrainError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketResult {
    pub bucket: String,
    pub outcome: BucketOutcome,
}

pub struct Remover {
    config: Config,
    storage: Storage,
    gate: ConfirmationGate,
    console: Arc<dyn ConsoleSink>,
    cancellation_token: DrainCancellationToken,
    stats_sender: Sender<DrainStatistics>,
    stats_receiver: Receiver<DrainStatistics>,
}

impl Remover {
    /// Create a remover talking to Google Cloud Storage.
    pub async fn new(config: Config, cancellation_token: DrainCancellationToken) -> Result<Self> {
        let storage = create_storage(&config)
            .await
            .context("failed to create the Google Cloud Storage client.")?;
        Ok(Self::with_storage(config, storage, cancellation_token))
    }

    /// Create a remover over an arbitrary storage backend.
    pub fn with_storage(
        config: Config,
        storage: Storage,
        cancellation_token: DrainCancellationToken,
    ) -> Self {
        let (stats_sender, stats_receiver) = async_channel::unbounded();
        let use_color = config.use_color() && std::io::stdout().is_terminal();

        Self {
            gate: ConfirmationGate::new(config.prompt_config.clone()),
            console: Arc::new(StdoutConsole::new(
                &config.prompt_config.message_prefix,
                use_color,
            )),
            config,
            storage,
            cancellation_token,
            stats_sender,
            stats_receiver,
        }
    }

    pub fn set_prompt_handler(&mut self, prompt_handler: Box<dyn PromptHandler>) {
        self.gate =
            ConfirmationGate::with_prompt_handler(self.config.prompt_config.clone(), prompt_handler);
    }

    pub fn set_console(&mut self, console: Arc<dyn ConsoleSink>) {
        self.console = console;
    }

    pub fn get_stats_receiver(&self) -> Receiver<DrainStatistics> {
        self.stats_receiver.clone()
    }

    pub fn close_stats_sender(&self) {
        self.stats_sender.close();
    }

    /// Drain every configured bucket.
    ///
    /// Both lifecycle events run the same procedure. Returns one result per
    /// configured bucket, in configuration order.
    pub async fn run(&self, lifecycle_event: LifecycleEvent) -> Result<Vec<BucketResult>> {
        info!(
            lifecycle_event = lifecycle_event.as_str(),
            buckets = self.config.remover.buckets.len(),
            prompt = self.config.remover.prompt,
            "remove has started."
        );

        let result = if self.config.remover.prompt {
            self.run_interactive().await
        } else {
            self.run_non_interactive().await
        };

        self.close_stats_sender();
        result
    }

    async fn run_non_interactive(&self) -> Result<Vec<BucketResult>> {
        let bucket_configs = self.config.bucket_configs();
        let settle_wait = Duration::from_millis(self.config.settle_wait_milliseconds);
        let cancellation_token = self.cancellation_token.clone();

        let (results, ()) = tokio::join!(self.drain_buckets(&bucket_configs), async move {
            tokio::select! {
                _ = tokio::time::sleep(settle_wait) => {},
                _ = cancellation_token.cancelled() => {},
            }
        });
        let results = results?;

        if results
            .iter()
            .any(|r| matches!(r.outcome, BucketOutcome::Failed(_)))
        {
            return Err(anyhow!(GBucketRemoveError::DrainFailed));
        }
        if results
            .iter()
            .any(|r| r.outcome == BucketOutcome::Cancelled)
        {
            return Err(anyhow!(GBucketRemoveError::Cancelled));
        }

        Ok(results)
    }

    async fn run_interactive(&self) -> Result<Vec<BucketResult>> {
        let bucket_configs = self.config.bucket_configs();

        let mut confirmed = vec![];
        let mut declined = vec![];
        for bucket_config in bucket_configs.iter() {
            if self.gate.confirm(bucket_config) {
                confirmed.push(bucket_config.clone());
            } else {
                declined.push(bucket_config.bucket_name.clone());
            }
        }

        for bucket in declined.iter() {
            self.report(&format!("Remove cancelled: {bucket}"));
        }

        let drained = self.drain_buckets(&confirmed).await?;
        for failed in drained
            .iter()
            .filter(|r| matches!(r.outcome, BucketOutcome::Failed(_)))
        {
            debug!(bucket = failed.bucket, "drain failure is ignored in interactive mode.");
        }

        Ok(bucket_configs
            .iter()
            .map(|bucket_config| {
                let bucket = &bucket_config.bucket_name;
                let outcome = drained
                    .iter()
                    .find(|r| &r.bucket == bucket)
                    .map(|r| r.outcome.clone())
                    .unwrap_or(BucketOutcome::Cancelled);
                BucketResult {
                    bucket: bucket.clone(),
                    outcome,
                }
            })
            .collect())
    }

    /// Drain `bucket_configs` concurrently, one task per bucket.
    ///
    /// Status lines are reported as each bucket finishes. The results are
    /// returned in the order of `bucket_configs`.
    async fn drain_buckets(&self, bucket_configs: &[BucketConfig]) -> Result<Vec<BucketResult>> {
        let mut join_set = JoinSet::new();
        for (index, bucket_config) in bucket_configs.iter().enumerate() {
            let stage = Stage::new(
                self.config.clone(),
                self.storage.clone(),
                self.cancellation_token.clone(),
                self.stats_sender.clone(),
            );
            let bucket = bucket_config.bucket_name.clone();

            join_set.spawn(async move {
                let drainer = BucketDrainer::new(stage);
                let result = drainer.drain(&bucket).await;
                (index, bucket, result)
            });
        }

        let mut outcomes: Vec<Option<BucketResult>> = vec![None; bucket_configs.len()];
        while let Some(join_result) = join_set.join_next().await {
            let (index, bucket, result) = join_result.context("bucket drain task panicked.")?;

            let outcome = match result {
                Ok(report) => {
                    self.report(&format!("Success: {bucket} is empty."));
                    BucketOutcome::Drained(report)
                }
                Err(DrainError::Cancelled { .. }) => {
                    self.report(&format!("Remove cancelled: {bucket}"));
                    BucketOutcome::Cancelled
                }
                Err(e) => {
                    error!(bucket = bucket, error = %e, "drain failed.");
                    self.report(&format!("Failed: {bucket} may not be empty: {e}"));
                    BucketOutcome::Failed(e)
                }
            };
            outcomes[index] = Some(BucketResult { bucket, outcome });
        }

        Ok(outcomes.into_iter().flatten().collect())
    }

    fn report(&self, message: &str) {
        info!("{message}");
        self.console.console_log(message);
    }
}

pub mod args;
pub mod file;

use std::collections::HashSet;

use serde::Deserialize;
use tracing::warn;

use crate::types::BucketConfig;

/// Prefix of every prompt and console line.
pub const DEFAULT_MESSAGE_PREFIX: &str = "Google Bucket Remover: ";

/// Main configuration for a gbucketremove run.
///
/// Holds the remover section (`prompt` and `buckets`), the storage client
/// settings, the confirmation prompt layout, and the drain tuning knobs.
///
/// # Quick Start
///
/// ```
/// use gbucketremove_rs::Config;
///
/// let config = Config::for_buckets(&["logs", "assets"]);
/// assert_eq!(config.remover.buckets.len(), 2);
/// assert!(!config.remover.prompt);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub remover: RemoverConfig,
    pub lifecycle_event: LifecycleEvent,
    pub client_config: Option<ClientConfig>,
    pub tracing_config: Option<TracingConfig>,
    pub prompt_config: PromptConfig,
    pub drain_mode: DrainMode,
    pub max_drain_passes: Option<u32>,
    pub worker_size: u16,
    pub settle_wait_milliseconds: u64,
    pub show_no_progress: bool,
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
}

impl Config {
    /// Create a `Config` that drains the given buckets without prompting.
    ///
    /// The settle wait is disabled, which is what library callers usually want.
    pub fn for_buckets(buckets: &[&str]) -> Self {
        Config {
            remover: RemoverConfig {
                prompt: false,
                buckets: buckets.iter().map(|b| b.to_string()).collect(),
            },
            settle_wait_milliseconds: 0,
            ..Config::default()
        }
    }

    /// Per-bucket configuration derived from the remover section.
    pub fn bucket_configs(&self) -> Vec<BucketConfig> {
        self.remover.bucket_configs()
    }

    /// Whether console lines should be colored.
    pub fn use_color(&self) -> bool {
        !self
            .tracing_config
            .map(|tc| tc.disable_color_tracing)
            .unwrap_or(false)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            remover: RemoverConfig::default(),
            lifecycle_event: LifecycleEvent::default(),
            client_config: None,
            tracing_config: None,
            prompt_config: PromptConfig::default(),
            drain_mode: DrainMode::default(),
            max_drain_passes: None,
            worker_size: 64,
            settle_wait_milliseconds: 5000,
            show_no_progress: false,
            auto_complete_shell: None,
        }
    }
}

/// The remover section of the deployment configuration.
///
/// Mirrors the `custom.remover` mapping: `prompt` defaults to `false` and
/// `buckets` to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoverConfig {
    pub prompt: bool,
    pub buckets: Vec<String>,
}

impl RemoverConfig {
    /// One configuration per distinct bucket, in first-occurrence order.
    ///
    /// A bucket listed twice is drained once.
    pub fn bucket_configs(&self) -> Vec<BucketConfig> {
        let mut seen = HashSet::new();
        self.buckets
            .iter()
            .filter(|bucket| {
                let first = seen.insert(bucket.as_str());
                if !first {
                    warn!(bucket = bucket.as_str(), "duplicate bucket ignored.");
                }
                first
            })
            .map(|bucket| BucketConfig::new(bucket, self.prompt))
            .collect()
    }
}

/// How a drain decides that a bucket is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DrainMode {
    /// Repeat list-then-delete until a listing pass returns zero keys.
    #[default]
    UntilEmpty,
    /// List once, delete once, and report success.
    SinglePass,
}

/// Host lifecycle events that trigger a drain of all configured buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LifecycleEvent {
    /// Runs before the deployment teardown removes the stack.
    #[value(name = "before:remove:remove")]
    BeforeRemove,
    /// The standalone `gbucketremove` command.
    #[default]
    #[value(name = "gbucketremove:remove")]
    Command,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::BeforeRemove => "before:remove:remove",
            LifecycleEvent::Command => "gbucketremove:remove",
        }
    }
}

/// Layout of the confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptConfig {
    pub message_prefix: String,
    pub delimiter: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        PromptConfig {
            message_prefix: DEFAULT_MESSAGE_PREFIX.to_string(),
            delimiter: String::new(),
        }
    }
}

/// Google Cloud Storage client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub endpoint_url: Option<String>,
    pub anonymous_credentials: bool,
    pub retry_config: RetryConfig,
}

/// Retry configuration applied to the storage client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig { max_attempts: 10 }
    }
}

/// Tracing (logging) configuration.
#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    pub tracing_level: log::Level,
    pub json_tracing: bool,
    pub gcs_sdk_tracing: bool,
    pub span_events_tracing: bool,
    pub disable_color_tracing: bool,
}

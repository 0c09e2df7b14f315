use crate::config::file::load_remover_config;
use crate::config::{
    ClientConfig, Config, DrainMode, LifecycleEvent, PromptConfig, RemoverConfig, RetryConfig,
    TracingConfig, DEFAULT_MESSAGE_PREFIX,
};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::ffi::OsString;
use std::path::PathBuf;

mod value_parser;

use value_parser::bucket_name::check_bucket_name;
use value_parser::file_exist::is_file_exist;
use value_parser::url::check_scheme;


// ---------------------------------------------------------------------------
// Default constants
// ---------------------------------------------------------------------------

const DEFAULT_PROMPT: bool = false;
const DEFAULT_NO_PROMPT: bool = false;
const DEFAULT_WORKER_SIZE: u16 = 64;
const DEFAULT_SETTLE_WAIT_MILLISECONDS: u64 = 5000;
const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_ANONYMOUS_CREDENTIALS: bool = false;
const DEFAULT_SHOW_NO_PROGRESS: bool = false;
const DEFAULT_JSON_TRACING: bool = false;
const DEFAULT_GCS_SDK_TRACING: bool = false;
const DEFAULT_SPAN_EVENTS_TRACING: bool = false;
const DEFAULT_DISABLE_COLOR_TRACING: bool = false;
const DEFAULT_PROMPT_DELIMITER: &str = "";

// ---------------------------------------------------------------------------
// Error messages
// ---------------------------------------------------------------------------

const ERROR_MESSAGE_WORKER_SIZE_ZERO: &str = "Worker size must be at least 1.";
const ERROR_MESSAGE_MAX_ATTEMPTS_ZERO: &str = "Max attempts must be at least 1.";
const ERROR_MESSAGE_MAX_DRAIN_PASSES_ZERO: &str = "Max drain passes must be at least 1.";
const ERROR_MESSAGE_MAX_DRAIN_PASSES_SINGLE_PASS: &str =
    "--max-drain-passes cannot be used with --drain-mode single-pass.";

// ---------------------------------------------------------------------------
// CLIArgs (clap-derived argument struct)
// ---------------------------------------------------------------------------

/// gbucketremove - Remove all files in Google Cloud Storage buckets.
///
/// Empties every configured bucket before a deployment teardown.
///
/// Example:
///   gbucketremove --bucket my-app-logs --bucket my-app-assets
///   gbucketremove --config-file gbucketremove.toml --prompt -v
///   gbucketremove --lifecycle-event before:remove:remove --config-file gbucketremove.toml
#[derive(Parser, Clone, Debug)]
#[command(name = "gbucketremove", version, about, long_about = None)]
pub struct CLIArgs {
    // -----------------------------------------------------------------------
    // Remover options
    // -----------------------------------------------------------------------
    /// Bucket to empty. Can be repeated. Overrides the buckets of the config file.
    #[arg(
        short = 'b',
        long = "bucket",
        env = "BUCKETS",
        value_delimiter = ',',
        value_parser = check_bucket_name,
        help_heading = "Remover"
    )]
    pub buckets: Vec<String>,

    /// Ask for confirmation before emptying each bucket.
    #[arg(long, env, default_value_t = DEFAULT_PROMPT, help_heading = "Remover")]
    pub prompt: bool,

    /// Never ask for confirmation, even when the config file sets `prompt = true`.
    #[arg(
        long,
        env,
        default_value_t = DEFAULT_NO_PROMPT,
        conflicts_with = "prompt",
        help_heading = "Remover"
    )]
    pub no_prompt: bool,

    /// TOML file with a [custom.remover] (or [remover]) table.
    #[arg(
        long,
        env,
        value_parser = is_file_exist,
        help_heading = "Remover",
        long_help = r#"TOML file with the remover configuration.

Example:
  [custom.remover]
  prompt = true
  buckets = ["my-app-logs", "my-app-assets"]"#
    )]
    pub config_file: Option<String>,

    /// Lifecycle event that triggered this run.
    #[arg(long, env, value_enum, default_value_t = LifecycleEvent::Command, help_heading = "Remover")]
    pub lifecycle_event: LifecycleEvent,

    // -----------------------------------------------------------------------
    // Drain options
    // -----------------------------------------------------------------------
    /// How to decide that a bucket is empty.
    #[arg(long, env, value_enum, default_value_t = DrainMode::UntilEmpty, help_heading = "Drain")]
    pub drain_mode: DrainMode,

    /// Fail a bucket that is still not empty after this many delete passes.
    #[arg(long, env, help_heading = "Drain")]
    pub max_drain_passes: Option<u32>,

    /// Number of concurrent delete requests per bucket. Default: 64.
    #[arg(long, env, default_value_t = DEFAULT_WORKER_SIZE, help_heading = "Drain")]
    pub worker_size: u16,

    /// Minimum run time in milliseconds when not prompting. Default: 5000.
    #[arg(long, env, default_value_t = DEFAULT_SETTLE_WAIT_MILLISECONDS, help_heading = "Drain")]
    pub settle_wait_milliseconds: u64,

    // -----------------------------------------------------------------------
    // Prompt options
    // -----------------------------------------------------------------------
    /// Prefix of every prompt and console line.
    #[arg(long, env, default_value = DEFAULT_MESSAGE_PREFIX, help_heading = "Prompt")]
    pub prompt_message_prefix: String,

    /// Text printed between the prompt question and the answer.
    #[arg(long, env, default_value = DEFAULT_PROMPT_DELIMITER, help_heading = "Prompt")]
    pub prompt_delimiter: String,

    // -----------------------------------------------------------------------
    // General options
    // -----------------------------------------------------------------------
    /// Don't show the progress bar.
    #[arg(long, env, default_value_t = DEFAULT_SHOW_NO_PROGRESS, help_heading = "General")]
    pub show_no_progress: bool,

    // -----------------------------------------------------------------------
    // Logging options
    // -----------------------------------------------------------------------
    /// Verbosity level. -q (quiet), default (normal), -v, -vv, -vvv.
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Output logs in JSON format.
    #[arg(long, env, default_value_t = DEFAULT_JSON_TRACING, help_heading = "Logging")]
    pub json_tracing: bool,

    /// Enable Google Cloud client library tracing.
    #[arg(long, env, default_value_t = DEFAULT_GCS_SDK_TRACING, help_heading = "Logging")]
    pub gcs_sdk_tracing: bool,

    /// Enable tracing span events.
    #[arg(long, env, default_value_t = DEFAULT_SPAN_EVENTS_TRACING, help_heading = "Logging")]
    pub span_events_tracing: bool,

    /// Disable colored output in logs and console messages.
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_COLOR_TRACING, help_heading = "Logging")]
    pub disable_color_tracing: bool,

    // -----------------------------------------------------------------------
    // Google Cloud options
    // -----------------------------------------------------------------------
    /// Custom storage endpoint URL (e.g. a local emulator).
    #[arg(long, env, value_parser = check_scheme, help_heading = "Google Cloud")]
    pub endpoint_url: Option<String>,

    /// Do not send credentials. Useful with emulators.
    #[arg(long, env, default_value_t = DEFAULT_ANONYMOUS_CREDENTIALS, help_heading = "Google Cloud")]
    pub anonymous_credentials: bool,

    /// Maximum attempts per storage request, retrying transient errors. Default: 10.
    #[arg(long, env, default_value_t = DEFAULT_MAX_ATTEMPTS, help_heading = "Google Cloud")]
    pub max_attempts: u32,

    // -----------------------------------------------------------------------
    // Advanced options
    // -----------------------------------------------------------------------
    /// Generate shell completions.
    #[arg(long, env, help_heading = "Advanced")]
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
}

// ---------------------------------------------------------------------------
// parse_from_args (public API)
// ---------------------------------------------------------------------------

/// Parse command-line arguments into a `CLIArgs` struct.
///
/// # Example
///
/// ```
/// use gbucketremove_rs::config::args::parse_from_args;
///
/// let args = vec!["gbucketremove", "--bucket", "my-app-logs", "--prompt"];
/// let cli_args = parse_from_args(args).unwrap();
/// assert!(cli_args.prompt);
/// assert_eq!(cli_args.buckets, vec!["my-app-logs"]);
/// ```
pub fn parse_from_args<I, T>(args: I) -> Result<CLIArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CLIArgs::try_parse_from(args)
}

/// Parse arguments and build a Config in one step.
pub fn build_config_from_args<I, T>(args: I) -> Result<Config, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli_args = CLIArgs::try_parse_from(args).map_err(|e| e.to_string())?;
    Config::try_from(cli_args)
}

// ---------------------------------------------------------------------------
// Validation and Config conversion
// ---------------------------------------------------------------------------

impl CLIArgs {
    fn validate(&self) -> Result<(), String> {
        if self.worker_size == 0 {
            return Err(ERROR_MESSAGE_WORKER_SIZE_ZERO.to_string());
        }
        if self.max_attempts == 0 {
            return Err(ERROR_MESSAGE_MAX_ATTEMPTS_ZERO.to_string());
        }
        if let Some(max_drain_passes) = self.max_drain_passes {
            if max_drain_passes == 0 {
                return Err(ERROR_MESSAGE_MAX_DRAIN_PASSES_ZERO.to_string());
            }
            if self.drain_mode == DrainMode::SinglePass {
                return Err(ERROR_MESSAGE_MAX_DRAIN_PASSES_SINGLE_PASS.to_string());
            }
        }
        Ok(())
    }

    /// Merge the config file with the command line.
    ///
    /// Buckets given on the command line replace the file's list. `--prompt`
    /// turns prompting on and `--no-prompt` turns it off; without either, the
    /// file decides.
    fn build_remover_config(&self) -> Result<RemoverConfig, String> {
        let file_remover = match self.config_file {
            Some(ref path) => {
                load_remover_config(&PathBuf::from(path)).map_err(|e| e.to_string())?
            }
            None => RemoverConfig::default(),
        };

        let buckets = if self.buckets.is_empty() {
            file_remover
                .buckets
                .iter()
                .map(|bucket| check_bucket_name(bucket).map_err(|e| format!("{bucket}: {e}")))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            self.buckets.clone()
        };

        Ok(RemoverConfig {
            prompt: !self.no_prompt && (self.prompt || file_remover.prompt),
            buckets,
        })
    }

    fn build_client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint_url: self.endpoint_url.clone(),
            anonymous_credentials: self.anonymous_credentials,
            retry_config: RetryConfig {
                max_attempts: self.max_attempts,
            },
        }
    }

    fn build_tracing_config(&self) -> Option<TracingConfig> {
        let log_level = self.verbosity.log_level()?;
        Some(TracingConfig {
            tracing_level: log_level,
            json_tracing: self.json_tracing,
            gcs_sdk_tracing: self.gcs_sdk_tracing,
            span_events_tracing: self.span_events_tracing,
            disable_color_tracing: self.disable_color_tracing,
        })
    }
}

impl TryFrom<CLIArgs> for Config {
    type Error = String;

    fn try_from(args: CLIArgs) -> Result<Self, Self::Error> {
        args.validate()?;

        // Shell completion needs nothing else.
        if args.auto_complete_shell.is_some() {
            return Ok(Config {
                auto_complete_shell: args.auto_complete_shell,
                ..Config::default()
            });
        }

        let remover = args.build_remover_config()?;
        let client_config = Some(args.build_client_config());
        let tracing_config = args.build_tracing_config();

        Ok(Config {
            remover,
            lifecycle_event: args.lifecycle_event,
            client_config,
            tracing_config,
            prompt_config: PromptConfig {
                message_prefix: args.prompt_message_prefix,
                delimiter: args.prompt_delimiter,
            },
            drain_mode: args.drain_mode,
            max_drain_passes: args.max_drain_passes,
            worker_size: args.worker_size,
            settle_wait_milliseconds: args.settle_wait_milliseconds,
            show_no_progress: args.show_no_progress,
            auto_complete_shell: None,
        })
    }
}

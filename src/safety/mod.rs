//! Confirmation gate for interactive drains.
//!
//! When a bucket requires confirmation, the drain must not start until the
//! operator answered affirmatively. The answer is read through a
//! [`PromptHandler`] so tests never block on stdin.

#[cfg(test)]
mod safety_properties;

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::config::PromptConfig;
use crate::types::BucketConfig;
use crate::types::error::PromptError;

/// Printed when an answer matches neither `yes` nor `no`.
pub const INVALID_ANSWER_WARNING: &str = "Must respond yes or no";

/// Source of answers to confirmation questions.
///
/// The default implementation ([`StdioPromptHandler`]) uses stdin/stdout.
pub trait PromptHandler: Send + Sync {
    /// Display `question` and read one line of input.
    ///
    /// Returns the trimmed input, `PromptError::EndOfInput` when stdin is
    /// closed.
    fn read_answer(&self, question: &str) -> Result<String, PromptError>;

    /// Display a warning after an invalid answer.
    fn warn(&self, message: &str);
}

/// Prompt handler using stdin/stdout.
///
/// Uses `print!`/`println!` rather than tracing: the question must appear
/// even when logging is quiet.
pub struct StdioPromptHandler;

impl PromptHandler for StdioPromptHandler {
    fn read_answer(&self, question: &str) -> Result<String, PromptError> {
        print!("{question}");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().lock().read_line(&mut input)? == 0 {
            return Err(PromptError::EndOfInput);
        }
        Ok(input.trim().to_string())
    }

    fn warn(&self, message: &str) {
        println!("{message}");
    }
}

/// An answer is accepted when it contains `yes` or `no`, ignoring case.
pub fn is_valid_answer(answer: &str) -> bool {
    let answer = answer.to_ascii_lowercase();
    answer.contains("yes") || answer.contains("no")
}

/// An answer is affirmative when it starts with `y`, ignoring case.
pub fn is_affirmative(answer: &str) -> bool {
    answer
        .trim()
        .chars()
        .next()
        .is_some_and(|c| c.eq_ignore_ascii_case(&'y'))
}

pub struct ConfirmationGate {
    prompt_config: PromptConfig,
    prompt_handler: Box<dyn PromptHandler>,
}

impl ConfirmationGate {
    /// Create a gate reading answers from stdin.
    pub fn new(prompt_config: PromptConfig) -> Self {
        Self::with_prompt_handler(prompt_config, Box::new(StdioPromptHandler))
    }

    pub fn with_prompt_handler(
        prompt_config: PromptConfig,
        prompt_handler: Box<dyn PromptHandler>,
    ) -> Self {
        Self {
            prompt_config,
            prompt_handler,
        }
    }

    /// The question asked for `bucket`.
    pub fn question(&self, bucket: &str) -> String {
        format!(
            "{}Make {} empty. Are you sure? [yes/no]:{}",
            self.prompt_config.message_prefix, bucket, self.prompt_config.delimiter
        )
    }

    /// Ask about `bucket` until a valid answer arrives.
    pub fn ask(&self, bucket: &str) -> Result<String, PromptError> {
        let question = self.question(bucket);
        loop {
            let answer = self.prompt_handler.read_answer(&question)?;
            if is_valid_answer(&answer) {
                return Ok(answer);
            }
            self.prompt_handler.warn(INVALID_ANSWER_WARNING);
        }
    }

    /// Whether the drain of this bucket may start.
    ///
    /// Buckets that do not require confirmation are always allowed. A prompt
    /// error counts as a negative answer.
    pub fn confirm(&self, bucket_config: &BucketConfig) -> bool {
        if !bucket_config.require_confirmation {
            return true;
        }

        match self.ask(&bucket_config.bucket_name) {
            Ok(answer) => {
                let confirmed = is_affirmative(&answer);
                debug!(
                    bucket = bucket_config.bucket_name,
                    confirmed = confirmed,
                    "confirmation answered."
                );
                confirmed
            }
            Err(e) => {
                warn!(
                    bucket = bucket_config.bucket_name,
                    error = %e,
                    "no confirmation received. the bucket is skipped."
                );
                false
            }
        }
    }
}

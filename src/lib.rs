/*!
# Overview
gbucketremove-rs empties Google Cloud Storage buckets, typically right before
a deployment teardown deletes them.

## Features
- **Drain to empty**: list every object page by page, delete all listed
  objects concurrently, and repeat until a listing comes back empty
- **Confirmation prompts**: optionally ask `yes/no` for every bucket before
  touching it
- **Library-First**: the `gbucketremove` CLI is a thin wrapper over this crate

## As a Library

```toml
[dependencies]
gbucketremove-rs = "0.1"
tokio = { version = "1", features = ["full"] }
```

```no_run
use gbucketremove_rs::config::Config;
use gbucketremove_rs::config::args::parse_from_args;
use gbucketremove_rs::{Remover, create_drain_cancellation_token};

#[tokio::main]
async fn main() {
    let args = vec!["gbucketremove", "--bucket", "my-app-logs"];

    let config = Config::try_from(parse_from_args(args).unwrap()).unwrap();
    let cancellation_token = create_drain_cancellation_token();
    let remover = Remover::new(config.clone(), cancellation_token).await.unwrap();

    if let Err(e) = remover.run(config.lifecycle_event).await {
        eprintln!("{e}");
    }
}
```
*/

pub mod config;
pub mod deleter;
pub mod drainer;
pub mod lister;
pub mod remover;
pub mod safety;
pub mod stage;
pub mod storage;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use config::args::CLIArgs;
pub use drainer::BucketDrainer;
pub use remover::{BucketOutcome, BucketResult, ConsoleSink, Remover};
pub use safety::{ConfirmationGate, PromptHandler};
pub use storage::{Storage, StorageTrait};
pub use types::error::{
    DrainError, GBucketRemoveError, PromptError, exit_code_from_error, is_cancelled_error,
};
pub use types::token::{DrainCancellationToken, create_drain_cancellation_token};
pub use types::{BucketConfig, DrainReport, DrainStatistics, ListPage, ObjectKey, PageResult};

//! Concurrent deletion of listed objects.
//!
//! One delete request is issued per key. Requests run on a `JoinSet`,
//! bounded by a semaphore sized from `worker_size`, and complete in no
//! particular order. There is no partial-failure isolation: a single failed
//! request fails the whole batch, but only after every request has finished.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::stage::Stage;
use crate::types::error::DrainError;
use crate::types::{DrainStatistics, ObjectKey};


pub struct ObjectDeleter {
    stage: Stage,
    semaphore: Arc<Semaphore>,
}

impl ObjectDeleter {
    pub fn new(stage: Stage) -> Self {
        let permits = usize::from(stage.config.worker_size.max(1));
        Self {
            stage,
            semaphore: Arc::new(Semaphore::new(permits)),
        }
    }

    /// Delete every key in `keys`.
    ///
    /// Returns the number of deleted objects. When one or more requests fail,
    /// returns `DrainError::Delete` carrying the failure count and the first
    /// observed cause.
    pub async fn delete_all(&self, bucket: &str, keys: &[ObjectKey]) -> Result<u64, DrainError> {
        if keys.is_empty() {
            return Ok(0);
        }

        debug!(bucket = bucket, objects = keys.len(), "delete objects has started.");

        let mut join_set = JoinSet::new();
        for key in keys {
            let key = key.clone();
            let storage = self.stage.storage.clone();
            let stats_sender = self.stage.stats_sender.clone();
            let semaphore = self.semaphore.clone();

            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return Err(format!("{key}: {e}")),
                };

                match storage.delete_object(&key).await {
                    Ok(()) => {
                        let _ = stats_sender
                            .send(DrainStatistics::DeleteComplete {
                                bucket: key.bucket.clone(),
                                object: key.object.clone(),
                            })
                            .await;
                        Ok(())
                    }
                    Err(e) => {
                        warn!(
                            bucket = key.bucket,
                            object = key.object,
                            error = %e,
                            "delete object failed."
                        );
                        let _ = stats_sender
                            .send(DrainStatistics::DeleteError {
                                bucket: key.bucket.clone(),
                                object: key.object.clone(),
                            })
                            .await;
                        Err(format!("{key}: {e:#}"))
                    }
                }
            });
        }

        let total = keys.len();
        let mut deleted = 0u64;
        let mut failed = 0usize;
        let mut first_cause = None;
        while let Some(join_result) = join_set.join_next().await {
            let cause = match join_result {
                Ok(Ok(())) => {
                    deleted += 1;
                    continue;
                }
                Ok(Err(cause)) => cause,
                Err(e) => format!("delete task failed: {e}"),
            };
            failed += 1;
            first_cause.get_or_insert(cause);
        }

        if let Some(cause) = first_cause {
            return Err(DrainError::Delete {
                bucket: bucket.to_string(),
                failed,
                total,
                cause,
            });
        }

        debug!(bucket = bucket, deleted = deleted, "delete objects has been completed.");
        Ok(deleted)
    }
}

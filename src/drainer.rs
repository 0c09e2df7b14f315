use tracing::{debug, info};

use crate::config::DrainMode;
use crate::deleter::ObjectDeleter;
use crate::lister::BucketLister;
use crate::stage::Stage;
use crate::types::error::DrainError;
use crate::types::{DrainReport, DrainStatistics};

/// Empties one bucket.
///
/// A drain is a sequence of passes. Each pass lists the whole bucket and then
/// deletes every listed key. In [`DrainMode::UntilEmpty`] passes repeat until a
/// listing returns no keys, so objects written while a pass was running are
/// picked up by the next one. In [`DrainMode::SinglePass`] the drain stops after
/// the first delete phase.
///
/// When `max_drain_passes` is set and the bucket still lists objects after that
/// many passes, the drain fails with [`DrainError::NotEmpty`].
pub struct BucketDrainer {
    stage: Stage,
}

impl BucketDrainer {
    pub fn new(stage: Stage) -> Self {
        Self { stage }
    }

    pub async fn drain(&self, bucket: &str) -> Result<DrainReport, DrainError> {
        debug!(
            bucket = bucket,
            drain_mode = ?self.stage.config.drain_mode,
            "drain has started."
        );

        let lister = BucketLister::new(self.stage.clone());
        let deleter = ObjectDeleter::new(self.stage.clone());

        let mut report = DrainReport {
            bucket: bucket.to_string(),
            ..Default::default()
        };

        loop {
            let listing = lister.list_all(bucket).await?;
            report.list_calls = lister.list_calls();

            if listing.is_empty() {
                break;
            }

            if let Some(max_drain_passes) = self.stage.config.max_drain_passes
                && report.passes >= max_drain_passes
            {
                return Err(DrainError::NotEmpty {
                    bucket: bucket.to_string(),
                    passes: report.passes,
                });
            }

            let deleted = deleter.delete_all(bucket, &listing.keys).await?;
            report.passes += 1;
            report.deleted_objects += deleted;
            debug!(
                bucket = bucket,
                pass = report.passes,
                deleted = deleted,
                "drain pass has been completed."
            );

            if self.stage.config.drain_mode == DrainMode::SinglePass {
                break;
            }
        }

        self.stage
            .send_stats(DrainStatistics::BucketDrained {
                bucket: bucket.to_string(),
            })
            .await;

        info!(
            bucket = bucket,
            passes = report.passes,
            list_calls = report.list_calls,
            deleted_objects = report.deleted_objects,
            "drain has been completed."
        );
        Ok(report)
    }
}

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::stage::Stage;
use crate::types::error::DrainError;
use crate::types::{DrainStatistics, ObjectKey, PageResult};

/// Lists every object of a bucket by following page tokens.
///
/// Pagination is sequential: the next page is requested only after the
/// previous one arrived, because its token is needed. The loop stops at the
/// first page without a continuation token. A page with no objects but with a
/// token does not end the listing.
///
/// The cancellation token is checked before every page request.
pub struct BucketLister {
    stage: Stage,
    list_calls: AtomicU64,
}

impl BucketLister {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            list_calls: AtomicU64::new(0),
        }
    }

    /// Number of listing requests issued by this lister so far.
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// List all objects of `bucket`.
    ///
    /// The returned keys are the concatenation of every page's object names,
    /// in page order. `next_page_token` of the result is always `None`.
    pub async fn list_all(&self, bucket: &str) -> Result<PageResult, DrainError> {
        debug!(bucket = bucket, "listing bucket has started.");

        let mut result = PageResult::default();
        loop {
            if self.stage.is_cancelled() {
                debug!(bucket = bucket, "listing cancelled.");
                return Err(DrainError::Cancelled {
                    bucket: bucket.to_string(),
                });
            }

            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let page = self
                .stage
                .storage
                .list_objects(bucket, result.next_page_token.take())
                .await
                .map_err(|e| DrainError::List {
                    bucket: bucket.to_string(),
                    cause: format!("{e:#}"),
                })?;

            trace!(
                bucket = bucket,
                objects = page.object_names.len(),
                next_page_token = page.next_page_token.as_deref(),
                "page listed."
            );
            self.stage
                .send_stats(DrainStatistics::ListPage {
                    bucket: bucket.to_string(),
                    objects: page.object_names.len() as u64,
                })
                .await;

            result.keys.extend(
                page.object_names
                    .iter()
                    .map(|object| ObjectKey::new(bucket, object)),
            );

            match page.next_page_token {
                Some(token) => result.next_page_token = Some(token),
                None => break,
            }
        }

        debug!(
            bucket = bucket,
            objects = result.len(),
            "listing bucket has been completed."
        );
        Ok(result)
    }
}

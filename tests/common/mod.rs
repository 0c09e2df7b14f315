//! Shared E2E test infrastructure for gbucketremove-rs.
//!
//! Talks to a real Google Cloud project given by `GOOGLE_CLOUD_PROJECT`, using
//! Application Default Credentials.

#![allow(dead_code)]

use std::sync::Arc;

use google_cloud_storage::client::{Storage, StorageControl};
use google_cloud_storage::model::Bucket;
use gbucketremove_rs::config::args::build_config_from_args;
use gbucketremove_rs::{BucketResult, Remover, create_drain_cancellation_token};
use uuid::Uuid;

const PROJECT_ENV_VAR: &str = "GOOGLE_CLOUD_PROJECT";

/// RAII guard that empties and deletes the bucket when dropped.
pub struct BucketGuard {
    helper: Arc<TestHelper>,
    bucket: String,
}

impl Drop for BucketGuard {
    fn drop(&mut self) {
        let helper = self.helper.clone();
        let bucket = self.bucket.clone();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tokio::task::block_in_place(|| {
                tokio::runtime::Handle::current().block_on(async move {
                    helper.delete_bucket_cascade(&bucket).await;
                });
            });
        }));
    }
}

pub struct TestHelper {
    control: StorageControl,
    storage: Storage,
    project: String,
}

impl TestHelper {
    pub async fn new() -> Arc<Self> {
        let project = std::env::var(PROJECT_ENV_VAR)
            .unwrap_or_else(|_| panic!("{PROJECT_ENV_VAR} must be set for e2e tests"));
        let control = StorageControl::builder().build().await.unwrap();
        let storage = Storage::builder().build().await.unwrap();

        Arc::new(Self {
            control,
            storage,
            project,
        })
    }

    pub fn bucket_guard(self: &Arc<Self>, bucket: &str) -> BucketGuard {
        BucketGuard {
            helper: Arc::clone(self),
            bucket: bucket.to_string(),
        }
    }

    pub fn generate_bucket_name(&self) -> String {
        format!("gbucketremove-e2e-{}", Uuid::new_v4())
    }

    pub async fn create_bucket(&self, bucket: &str) {
        self.control
            .create_bucket()
            .set_parent("projects/_")
            .set_bucket_id(bucket)
            .set_bucket(Bucket::new().set_project(format!("projects/{}", self.project)))
            .send()
            .await
            .unwrap();
    }

    pub async fn put_object(&self, bucket: &str, object: &str) {
        self.storage
            .write_object(
                format!("projects/_/buckets/{bucket}"),
                object,
                bytes::Bytes::from_static(b"gbucketremove e2e"),
            )
            .send_unbuffered()
            .await
            .unwrap();
    }

    pub async fn put_objects(&self, bucket: &str, prefix: &str, count: usize) {
        for i in 0..count {
            self.put_object(bucket, &format!("{prefix}{i:04}")).await;
        }
    }

    pub async fn list_object_names(&self, bucket: &str) -> Vec<String> {
        let mut names = vec![];
        let mut page_token = String::new();
        loop {
            let response = self
                .control
                .list_objects()
                .set_parent(format!("projects/_/buckets/{bucket}"))
                .set_page_token(page_token)
                .send()
                .await
                .unwrap();
            names.extend(response.objects.into_iter().map(|o| o.name));
            if response.next_page_token.is_empty() {
                return names;
            }
            page_token = response.next_page_token;
        }
    }

    pub async fn delete_bucket_cascade(&self, bucket: &str) {
        for name in self.list_object_names(bucket).await {
            let _ = self
                .control
                .delete_object()
                .set_bucket(format!("projects/_/buckets/{bucket}"))
                .set_object(name)
                .send()
                .await;
        }
        let _ = self
            .control
            .delete_bucket()
            .set_name(format!("projects/_/buckets/{bucket}"))
            .send()
            .await;
    }

    /// Run the remover with `args` appended to the program name.
    pub async fn run_remover(&self, args: &[&str]) -> anyhow::Result<Vec<BucketResult>> {
        let mut all_args = vec!["gbucketremove", "--settle-wait-milliseconds", "0"];
        all_args.extend_from_slice(args);
        let config = build_config_from_args(all_args).map_err(anyhow::Error::msg)?;

        let remover = Remover::new(config.clone(), create_drain_cancellation_token()).await?;
        remover.run(config.lifecycle_event).await
    }
}

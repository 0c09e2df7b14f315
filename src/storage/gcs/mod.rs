pub mod client_builder;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use google_cloud_storage::client::StorageControl;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::storage::{Storage, StorageTrait};
use crate::types::{ListPage, ObjectKey};

/// Google Cloud Storage addresses buckets by resource name in the control API.
pub fn bucket_resource_name(bucket: &str) -> String {
    format!("projects/_/buckets/{bucket}")
}

/// The API signals the last page with an empty token.
fn normalize_page_token(token: String) -> Option<String> {
    if token.is_empty() { None } else { Some(token) }
}

/// Factory for creating Google Cloud Storage instances.
pub struct GcsStorageFactory;

impl GcsStorageFactory {
    pub async fn create(client_config: &ClientConfig) -> Result<Storage> {
        let client = client_config.create_client().await?;

        Ok(Box::new(GcsStorage {
            client: Arc::new(client),
        }))
    }
}

/// Storage backend over the `StorageControl` client.
#[derive(Clone)]
struct GcsStorage {
    client: Arc<StorageControl>,
}

#[async_trait]
impl StorageTrait for GcsStorage {
    async fn list_objects(&self, bucket: &str, page_token: Option<String>) -> Result<ListPage> {
        let response = self
            .client
            .list_objects()
            .set_parent(bucket_resource_name(bucket))
            .set_page_token(page_token.unwrap_or_default())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    bucket = bucket,
                    http_status_code = ?e.http_status_code(),
                    error = %e,
                    "Cloud Storage ListObjects API call failed for gs://{}.",
                    bucket,
                );
                anyhow!(e).context("google_cloud_storage::client::StorageControl::list_objects() failed.")
            })?;

        let object_names: Vec<String> = response
            .objects
            .into_iter()
            .map(|object| object.name)
            .collect();

        tracing::trace!(
            bucket = bucket,
            objects = object_names.len(),
            "ListObjects page received."
        );

        Ok(ListPage {
            object_names,
            next_page_token: normalize_page_token(response.next_page_token),
        })
    }

    async fn delete_object(&self, key: &ObjectKey) -> Result<()> {
        self.client
            .delete_object()
            .set_bucket(bucket_resource_name(&key.bucket))
            .set_object(&key.object)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(
                    bucket = key.bucket,
                    object = key.object,
                    http_status_code = ?e.http_status_code(),
                    error = %e,
                    "Cloud Storage DeleteObject API call failed for {}.",
                    key,
                );
                anyhow!(e).context("google_cloud_storage::client::StorageControl::delete_object() failed.")
            })?;

        Ok(())
    }
}

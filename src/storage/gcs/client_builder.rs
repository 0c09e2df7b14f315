use anyhow::{Context, Result};
use google_cloud_auth::credentials::anonymous;
use google_cloud_gax::retry_policy::RetryPolicyExt;
use google_cloud_storage::client::StorageControl;
use google_cloud_storage::retry_policy::RetryableErrors;
use tracing::debug;

use crate::config::ClientConfig;

impl ClientConfig {
    /// Build a `StorageControl` client from this configuration.
    ///
    /// Transient errors are retried up to `retry_config.max_attempts` times.
    /// Credentials come from Application Default Credentials unless
    /// `anonymous_credentials` is set.
    pub async fn create_client(&self) -> Result<StorageControl> {
        let mut builder = StorageControl::builder().with_retry_policy(
            RetryableErrors.with_attempt_limit(self.retry_config.max_attempts),
        );

        if let Some(ref endpoint_url) = self.endpoint_url {
            debug!(endpoint_url = endpoint_url, "using custom storage endpoint.");
            builder = builder.with_endpoint(endpoint_url);
        }

        if self.anonymous_credentials {
            debug!("using anonymous credentials.");
            builder = builder.with_credentials(anonymous::Builder::new().build());
        }

        builder
            .build()
            .await
            .context("google_cloud_storage::client::StorageControl::builder().build() failed.")
    }
}

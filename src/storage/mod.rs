use anyhow::Result;
use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::config::Config;
use crate::types::{ListPage, ObjectKey};

pub mod gcs;

/// Type alias for a boxed Storage trait object.
pub type Storage = Box<dyn StorageTrait + Send + Sync>;

/// The storage capabilities a drain needs.
///
/// Implementations must be safe for concurrent use: one instance is cloned
/// into every delete task and shared by every bucket drain.
#[async_trait]
pub trait StorageTrait: DynClone {
    /// List one page of objects in `bucket`.
    ///
    /// `page_token` is `None` for the first page and the previous page's
    /// `next_page_token` afterwards. The returned page carries
    /// `next_page_token: None` on the last page.
    async fn list_objects(&self, bucket: &str, page_token: Option<String>) -> Result<ListPage>;

    /// Delete a single object.
    async fn delete_object(&self, key: &ObjectKey) -> Result<()>;
}

dyn_clone::clone_trait_object!(StorageTrait);

/// Create the Google Cloud Storage backend from the client configuration.
pub async fn create_storage(config: &Config) -> Result<Storage> {
    let client_config = config.client_config.clone().unwrap_or_default();
    gcs::GcsStorageFactory::create(&client_config).await
}

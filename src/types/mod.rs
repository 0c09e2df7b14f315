use std::fmt;

pub mod error;
pub mod token;

/// Configuration of a single bucket to drain.
///
/// Created from the `buckets` list of the remover configuration. The
/// `require_confirmation` flag is copied from the global `prompt` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketConfig {
    pub bucket_name: String,
    pub require_confirmation: bool,
}

impl BucketConfig {
    pub fn new(bucket_name: &str, require_confirmation: bool) -> Self {
        Self {
            bucket_name: bucket_name.to_string(),
            require_confirmation,
        }
    }
}

/// One stored object-location pair, produced by listing and consumed by deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub bucket: String,
    pub object: String,
}

impl ObjectKey {
    pub fn new(bucket: &str, object: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            object: object.to_string(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.object)
    }
}

/// A single page returned by the storage listing capability.
///
/// An empty page token returned by the API is normalized to `None` by the
/// storage implementation, so `next_page_token.is_none()` always means
/// "last page".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub object_names: Vec<String>,
    pub next_page_token: Option<String>,
}

/// Accumulated listing result for one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    pub keys: Vec<ObjectKey>,
    pub next_page_token: Option<String>,
}

impl PageResult {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

/// Result of a successful drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub bucket: String,
    /// Number of list-then-delete passes that deleted at least one object.
    pub passes: u32,
    /// Number of listing requests issued, across all passes.
    pub list_calls: u64,
    pub deleted_objects: u64,
}

/// Statistics sent through the stats channel while draining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainStatistics {
    ListPage { bucket: String, objects: u64 },
    DeleteComplete { bucket: String, object: String },
    DeleteError { bucket: String, object: String },
    BucketDrained { bucket: String },
}

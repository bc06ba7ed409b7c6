//! Types for storage operations

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A file in a storage bucket, as returned by the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileObject {
    pub name: String,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,

    /// Object metadata, including `size` and `mimetype`
    #[serde(default)]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl FileObject {
    /// Size in bytes from the metadata, when reported
    pub fn size(&self) -> Option<u64> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("size"))
            .and_then(|v| v.as_u64())
    }
}

/// Response of an upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// `bucket/path` of the stored object
    #[serde(rename = "Key")]
    pub key: String,
}

/// Options for uploading a file
#[derive(Debug, Clone)]
pub struct FileOptions {
    /// Cache control header, in seconds
    pub cache_control: Option<String>,

    /// Content type header
    pub content_type: Option<String>,

    /// Whether to overwrite an existing object
    pub upsert: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            cache_control: Some("3600".to_string()),
            content_type: None,
            upsert: false,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Uploaded binary attached to a theme (its illustration).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: i64,
    pub title: String,
    pub mime_type: String,
    #[serde(skip_serializing)]
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInput {
    pub title: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file attached to an entry.
///
/// Only attachments with an `image/*` MIME type take part in reordering.
/// `rank` defines display order among the siblings of one entry; ties fall
/// back to ascending id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub parent_id: i64,
    pub title: String,
    /// URL of the thumbnail-sized rendition.
    pub thumbnail_url: String,
    pub mime_type: String,
    pub rank: i64,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Input for attaching a file to an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAttachmentInput {
    pub title: String,
    pub thumbnail_url: String,
    /// Defaults to `image/jpeg`.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Defaults to 0, like any freshly uploaded attachment.
    #[serde(default)]
    pub rank: Option<i64>,
}

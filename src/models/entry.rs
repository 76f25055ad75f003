use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered content type (`post`, `page`, or a custom type).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentType {
    /// Identifier used in the enabled-type option and as the edit-screen id.
    pub name: String,
    /// Human readable label shown on the settings page.
    pub label: String,
    /// Only public types are offered on the settings page.
    pub public: bool,
}

/// The internal type used for attachment records. Never offered for reordering.
pub const ATTACHMENT_TYPE: &str = "attachment";

/// A content record that can own image attachments.
///
/// Entries belong to the host's content storage; the reordering feature only
/// reads them and never rewrites their fields on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub content_type: String,
    pub title: String,
    pub author_id: Option<i64>,
    /// Primary image of the entry, excluded from the sortable list.
    pub featured_image_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntryInput {
    pub content_type: String,
    pub title: String,
    #[serde(default)]
    pub author_id: Option<i64>,
}

/// Input for setting or clearing an entry's featured image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetFeaturedImageInput {
    pub image_id: Option<i64>,
}

/// Sanitized entry fields about to be persisted by an entry save.
///
/// This is what the save filter receives and must hand back untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryData {
    pub id: i64,
    pub content_type: String,
    pub title: String,
}

impl From<&Entry> for EntryData {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id,
            content_type: entry.content_type.clone(),
            title: entry.title.clone(),
        }
    }
}

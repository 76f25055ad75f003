use anyhow::Result;
use serde::Serialize;

use super::ReorderImages;
use crate::models::Entry;

pub const METABOX_ID: &str = "sort-entry-images";
pub const METABOX_TITLE: &str = "Sort your images with drag & drop";

/// Column of the edit screen the panel sits in.
pub const METABOX_CONTEXT: &str = "normal";
/// Placement of the panel within its column.
pub const METABOX_PRIORITY: &str = "default";

/// A panel registered on the edit screen of one content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metabox {
    pub id: &'static str,
    pub title: &'static str,
    /// Content type whose edit screen shows the panel.
    pub screen: String,
    pub context: &'static str,
    pub priority: &'static str,
}

impl ReorderImages {
    /// Register the sortable panel while the edit screen of `entry` is built.
    ///
    /// Only entries of an enabled type trigger registration, and only when the
    /// entry has at least one image attachment. The featured image counts
    /// here even though the panel itself leaves it out, so an entry whose only
    /// image is the featured one still gets an (empty) panel.
    ///
    /// Registration covers every enabled type; the edit screen keeps the ones
    /// matching its own type.
    pub fn on_entry_type_supports_reordering(&self, entry: &Entry) -> Result<Vec<Metabox>> {
        let enabled = self.enabled_types();
        if !enabled.contains(&entry.content_type) {
            return Ok(Vec::new());
        }

        if !self.db().has_image_attachments(entry.id)? {
            return Ok(Vec::new());
        }

        Ok(enabled
            .iter()
            .map(|screen| Metabox {
                id: METABOX_ID,
                title: METABOX_TITLE,
                screen: screen.to_string(),
                context: METABOX_CONTEXT,
                priority: METABOX_PRIORITY,
            })
            .collect())
    }
}

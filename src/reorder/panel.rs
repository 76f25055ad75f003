use anyhow::Result;
use askama::Template;

use super::{sort_action, ReorderImages};
use crate::models::Attachment;

#[derive(Template)]
#[template(path = "panel.html")]
struct SortablePanel<'a> {
    nonce: &'a str,
    images: &'a [Attachment],
}

impl ReorderImages {
    /// Images shown in the sortable panel: rank order, featured image left out.
    pub fn sortable_images(&self, entry_id: i64) -> Result<Vec<Attachment>> {
        let featured = self.db().get_featured_image_id(entry_id)?;
        self.db().get_images(entry_id, featured)
    }

    /// Render the sortable list of an entry's images for `user_id`.
    ///
    /// Returns an empty string when there is nothing to sort.
    pub fn render_sortable_panel(&self, entry_id: i64, user_id: i64) -> Result<String> {
        let images = self.sortable_images(entry_id)?;
        if images.is_empty() {
            return Ok(String::new());
        }

        let nonce = self.nonces().create(&sort_action(entry_id), user_id);
        Ok(SortablePanel {
            nonce: &nonce,
            images: &images,
        }
        .render()?)
    }
}

//! Image reordering for content entries.
//!
//! [`ReorderImages`] is created once at startup and handed to the request
//! handlers. It owns no state of its own beyond the store handle and the
//! nonce keeper; the enabled content types are re-read from the options
//! table on every call so a settings change applies to the next request.
//!
//! The pieces:
//!
//! - [`settings`]: the checklist of content types on the settings page
//! - [`metabox`]: which edit screens get the sortable panel
//! - [`panel`]: the sortable list of an entry's images
//! - [`save`]: writing the submitted order back as image ranks
//!
//! Nothing in here surfaces an error to the user because of reordering. Every
//! guard in the save path short-circuits to a no-op and the entry save goes on.

pub mod metabox;
pub mod panel;
pub mod save;
pub mod settings;

use crate::db::Database;
use crate::models::{EnabledTypeSet, ENABLED_TYPES_OPTION};
use crate::nonce::Nonces;

pub use metabox::{Metabox, METABOX_CONTEXT, METABOX_ID, METABOX_PRIORITY, METABOX_TITLE};
pub use save::{SaveContext, SkipReason, SortOutcome, SortRequest};

/// Nonce action guarding the submitted image order of one entry.
pub const SORT_ACTION: &str = "custom_images_sort";

/// Form field carrying the sort nonce.
pub const SORT_NONCE_FIELD: &str = "images_sort_nonce";

/// Repeated form field carrying image ids in display order.
pub const IMAGE_ID_FIELD: &str = "att_id[]";

pub fn sort_action(entry_id: i64) -> String {
    format!("{}_{}", SORT_ACTION, entry_id)
}

#[derive(Clone)]
pub struct ReorderImages {
    db: Database,
    nonces: Nonces,
}

impl ReorderImages {
    pub fn new(db: Database, nonces: Nonces) -> Self {
        Self { db, nonces }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn nonces(&self) -> &Nonces {
        &self.nonces
    }

    /// The currently enabled content types. Store failures read as "none".
    pub fn enabled_types(&self) -> EnabledTypeSet {
        match self.db.get_option(ENABLED_TYPES_OPTION) {
            Ok(value) => EnabledTypeSet::from_option(value.as_ref()),
            Err(e) => {
                tracing::warn!("Could not read {}: {}", ENABLED_TYPES_OPTION, e);
                EnabledTypeSet::default()
            }
        }
    }
}

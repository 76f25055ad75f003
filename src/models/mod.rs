//! Domain models for image reordering.
//!
//! # Core Concepts
//!
//! ## Host records
//!
//! - [`ContentType`]: A registered kind of entry (`post`, `page`, custom types).
//! - [`Entry`]: A content record that owns attachments. Never rewritten by reordering.
//! - [`Attachment`]: A file attached to an entry; images carry a `rank`.
//! - [`User`]: The acting admin user and their [`Role`].
//!
//! ## Feature state
//!
//! - [`EnabledTypeSet`]: The content types that get the sortable panel,
//!   stored under [`ENABLED_TYPES_OPTION`].

mod attachment;
mod entry;
mod settings;
mod user;

pub use attachment::*;
pub use entry::*;
pub use settings::*;
pub use user::*;

use crate::models::{EntryData, User};
use crate::nonce::NonceError;

use super::{sort_action, ReorderImages};

/// The reorder part of a submitted entry form.
#[derive(Debug, Clone, Default)]
pub struct SortRequest {
    /// Submitted `images_sort_nonce`, absent when the panel was not on the page.
    pub nonce: Option<String>,
    /// Submitted `att_id[]` values in document order.
    pub image_ids: Vec<String>,
}

/// Who is saving, and how.
#[derive(Debug, Clone, Copy)]
pub struct SaveContext<'a> {
    pub user: &'a User,
    /// Set for background saves the editor issues on its own.
    pub autosave: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TypeNotEnabled,
    NoToken,
    Autosave,
    BadNonce(NonceError),
    EntryMissing,
    NotPermitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    Skipped(SkipReason),
    Applied { updated: usize, skipped: usize },
}

impl ReorderImages {
    /// Filter run right before entry data is persisted.
    ///
    /// Writes the submitted image order as ranks and hands `data` back
    /// untouched whatever happened.
    pub fn sort_images_on_save(
        &self,
        data: EntryData,
        request: &SortRequest,
        ctx: &SaveContext<'_>,
    ) -> EntryData {
        match self.apply_sort(&data, request, ctx) {
            SortOutcome::Skipped(reason) => {
                tracing::debug!(entry_id = data.id, ?reason, "Image order not saved");
            }
            SortOutcome::Applied { updated, skipped } => {
                tracing::info!(
                    entry_id = data.id,
                    updated,
                    skipped,
                    "Saved image order"
                );
            }
        }
        data
    }

    /// Validate the request and write ranks, one independent write per image.
    pub fn apply_sort(
        &self,
        data: &EntryData,
        request: &SortRequest,
        ctx: &SaveContext<'_>,
    ) -> SortOutcome {
        if !self.enabled_types().contains(&data.content_type) {
            return SortOutcome::Skipped(SkipReason::TypeNotEnabled);
        }
        let Some(nonce) = request.nonce.as_deref() else {
            return SortOutcome::Skipped(SkipReason::NoToken);
        };

        if ctx.autosave {
            return SortOutcome::Skipped(SkipReason::Autosave);
        }

        if let Err(e) = self
            .nonces()
            .verify(nonce, &sort_action(data.id), ctx.user.id)
        {
            return SortOutcome::Skipped(SkipReason::BadNonce(e));
        }

        let entry = match self.db().get_entry(data.id) {
            Ok(Some(entry)) => entry,
            Ok(None) => return SortOutcome::Skipped(SkipReason::EntryMissing),
            Err(e) => {
                tracing::warn!("Could not load entry {}: {}", data.id, e);
                return SortOutcome::Skipped(SkipReason::EntryMissing);
            }
        };
        if !ctx.user.can_edit_entry(&entry) {
            return SortOutcome::Skipped(SkipReason::NotPermitted);
        }

        let mut updated = 0;
        let mut skipped = 0;
        for (rank, raw_id) in request.image_ids.iter().enumerate() {
            let Ok(image_id) = raw_id.trim().parse::<i64>() else {
                tracing::debug!("Ignoring malformed image id {:?}", raw_id);
                skipped += 1;
                continue;
            };

            match self.db().set_image_rank(data.id, image_id, rank as i64) {
                Ok(true) => updated += 1,
                Ok(false) => {
                    tracing::debug!("Image {} is not attached to entry {}", image_id, data.id);
                    skipped += 1;
                }
                Err(e) => {
                    tracing::warn!("Could not rank image {}: {}", image_id, e);
                    skipped += 1;
                }
            }
        }

        SortOutcome::Applied { updated, skipped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::*;
    use crate::nonce::Nonces;

    struct Fixture {
        reorder: ReorderImages,
        editor: User,
        entry: Entry,
        images: Vec<Attachment>,
    }

    fn fixture(enabled: &[&str]) -> Fixture {
        let db = Database::open_memory().expect("Failed to create database");
        db.migrate().expect("Failed to migrate");
        let reorder = ReorderImages::new(db.clone(), Nonces::new(b"unit-test-key", 3600));
        reorder
            .save_settings(enabled.iter().map(|s| s.to_string()).collect())
            .expect("Failed to save settings");

        let editor = db
            .create_user(CreateUserInput {
                name: "Ed".to_string(),
                role: Role::Editor,
                token: None,
            })
            .expect("Failed to create user");
        let entry = db
            .create_entry(CreateEntryInput {
                content_type: "page".to_string(),
                title: "Gallery".to_string(),
                author_id: None,
            })
            .expect("Failed to create entry");
        let images = (0..3)
            .map(|i| {
                db.create_attachment(
                    entry.id,
                    CreateAttachmentInput {
                        title: format!("Image {}", i + 1),
                        thumbnail_url: format!("/uploads/{}.jpg", i + 1),
                        mime_type: None,
                        rank: Some(i),
                    },
                )
                .expect("Failed to create attachment")
            })
            .collect();

        Fixture {
            reorder,
            editor,
            entry,
            images,
        }
    }

    fn request(f: &Fixture, ids: &[i64]) -> SortRequest {
        SortRequest {
            nonce: Some(
                f.reorder
                    .nonces()
                    .create(&sort_action(f.entry.id), f.editor.id),
            ),
            image_ids: ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    #[test]
    fn autosave_is_skipped_before_the_nonce_is_checked() {
        let f = fixture(&["page"]);
        let ctx = SaveContext {
            user: &f.editor,
            autosave: true,
        };
        let req = SortRequest {
            nonce: Some("bogus".to_string()),
            image_ids: vec![f.images[2].id.to_string()],
        };

        let outcome = f.reorder.apply_sort(&EntryData::from(&f.entry), &req, &ctx);
        assert_eq!(outcome, SortOutcome::Skipped(SkipReason::Autosave));
    }

    #[test]
    fn type_check_comes_before_token_check() {
        let f = fixture(&["post"]);
        let ctx = SaveContext {
            user: &f.editor,
            autosave: false,
        };

        let outcome = f
            .reorder
            .apply_sort(&EntryData::from(&f.entry), &SortRequest::default(), &ctx);
        assert_eq!(outcome, SortOutcome::Skipped(SkipReason::TypeNotEnabled));
    }

    #[test]
    fn missing_id_list_applies_nothing() {
        let f = fixture(&["page"]);
        let ctx = SaveContext {
            user: &f.editor,
            autosave: false,
        };

        let outcome = f
            .reorder
            .apply_sort(&EntryData::from(&f.entry), &request(&f, &[]), &ctx);
        assert_eq!(
            outcome,
            SortOutcome::Applied {
                updated: 0,
                skipped: 0
            }
        );
    }

    #[test]
    fn malformed_and_foreign_ids_are_counted_as_skipped() {
        let f = fixture(&["page"]);
        let other = f
            .reorder
            .db()
            .create_entry(CreateEntryInput {
                content_type: "page".to_string(),
                title: "Other".to_string(),
                author_id: None,
            })
            .unwrap();
        let foreign = f
            .reorder
            .db()
            .create_attachment(
                other.id,
                CreateAttachmentInput {
                    title: "Foreign".to_string(),
                    thumbnail_url: "/uploads/f.jpg".to_string(),
                    mime_type: None,
                    rank: Some(5),
                },
            )
            .unwrap();

        let mut req = request(&f, &[f.images[2].id, foreign.id]);
        req.image_ids.insert(0, "abc".to_string());
        let ctx = SaveContext {
            user: &f.editor,
            autosave: false,
        };

        let outcome = f.reorder.apply_sort(&EntryData::from(&f.entry), &req, &ctx);
        assert_eq!(
            outcome,
            SortOutcome::Applied {
                updated: 1,
                skipped: 2
            }
        );

        let moved = f.reorder.db().get_attachment(f.images[2].id).unwrap().unwrap();
        assert_eq!(moved.rank, 1);
        let untouched = f.reorder.db().get_attachment(foreign.id).unwrap().unwrap();
        assert_eq!(untouched.rank, 5);
    }

    #[test]
    fn author_cannot_reorder_someone_elses_entry() {
        let f = fixture(&["page"]);
        let author = f
            .reorder
            .db()
            .create_user(CreateUserInput {
                name: "Au".to_string(),
                role: Role::Author,
                token: None,
            })
            .unwrap();
        let req = SortRequest {
            nonce: Some(
                f.reorder
                    .nonces()
                    .create(&sort_action(f.entry.id), author.id),
            ),
            image_ids: vec![f.images[2].id.to_string()],
        };
        let ctx = SaveContext {
            user: &author,
            autosave: false,
        };

        let outcome = f.reorder.apply_sort(&EntryData::from(&f.entry), &req, &ctx);
        assert_eq!(outcome, SortOutcome::Skipped(SkipReason::NotPermitted));
    }

    #[test]
    fn nonce_issued_for_another_user_is_rejected() {
        let f = fixture(&["page"]);
        let other = f
            .reorder
            .db()
            .create_user(CreateUserInput {
                name: "Other".to_string(),
                role: Role::Editor,
                token: None,
            })
            .unwrap();
        let req = request(&f, &[f.images[2].id]);
        let ctx = SaveContext {
            user: &other,
            autosave: false,
        };

        let outcome = f.reorder.apply_sort(&EntryData::from(&f.entry), &req, &ctx);
        assert_eq!(
            outcome,
            SortOutcome::Skipped(SkipReason::BadNonce(NonceError::Invalid))
        );
    }
}

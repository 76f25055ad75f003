use reorder_entry_images::db::Database;
use reorder_entry_images::models::*;
use serde_json::json;
use speculate2::speculate;

fn create_test_entry(db: &Database, content_type: &str) -> Entry {
    db.create_entry(CreateEntryInput {
        content_type: content_type.to_string(),
        title: "Test Entry".to_string(),
        author_id: None,
    })
    .expect("Failed to create entry")
}

fn attach(db: &Database, entry_id: i64, title: &str, mime_type: &str, rank: i64) -> Attachment {
    db.create_attachment(
        entry_id,
        CreateAttachmentInput {
            title: title.to_string(),
            thumbnail_url: format!("/uploads/{}.jpg", title),
            mime_type: Some(mime_type.to_string()),
            rank: Some(rank),
        },
    )
    .expect("Failed to create attachment")
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "schema" {
        it "reports the latest applied version" {
            assert_eq!(db.schema_version().expect("Query failed"), Some("002".to_string()));
        }

        it "applies nothing on a second run" {
            assert_eq!(db.migrate().expect("Failed to migrate"), 0);
        }
    }

    describe "content types" {
        it "seeds the built-in types" {
            let names: Vec<String> = db
                .get_public_content_types()
                .expect("Query failed")
                .into_iter()
                .map(|t| t.name)
                .collect();
            assert_eq!(names, vec!["attachment", "page", "post"]);
        }

        it "registers a custom type" {
            db.register_content_type(&ContentType {
                name: "book".to_string(),
                label: "Books".to_string(),
                public: true,
            }).expect("Failed to register");

            let book = db.get_content_type("book").expect("Query failed");
            assert_eq!(book.map(|t| t.label), Some("Books".to_string()));
        }

        it "leaves private types out of the public list" {
            db.register_content_type(&ContentType {
                name: "internal".to_string(),
                label: "Internal".to_string(),
                public: false,
            }).expect("Failed to register");

            let types = db.get_public_content_types().expect("Query failed");
            assert!(types.iter().all(|t| t.name != "internal"));
        }
    }

    describe "options" {
        it "returns None for an unset option" {
            assert!(db.get_option("rei-options").expect("Query failed").is_none());
        }

        it "round-trips a JSON value" {
            db.update_option("rei-options", &json!(["page"])).expect("Failed to update");
            assert_eq!(db.get_option("rei-options").expect("Query failed"), Some(json!(["page"])));
        }

        it "overwrites an existing value" {
            db.update_option("rei-options", &json!(["page"])).expect("Failed to update");
            db.update_option("rei-options", &json!(["post"])).expect("Failed to update");
            assert_eq!(db.get_option("rei-options").expect("Query failed"), Some(json!(["post"])));
        }

        it "deletes an option" {
            db.update_option("rei-options", &json!(["page"])).expect("Failed to update");
            assert!(db.delete_option("rei-options").expect("Delete failed"));
            assert!(db.get_option("rei-options").expect("Query failed").is_none());
        }
    }

    describe "users" {
        it "generates a token when none is given" {
            let user = db.create_user(CreateUserInput {
                name: "Ed".to_string(),
                role: Role::Editor,
                token: None,
            }).expect("Failed to create user");

            assert_eq!(user.token.len(), 48);
            let found = db.get_user_by_token(&user.token).expect("Query failed").unwrap();
            assert_eq!(found.id, user.id);
            assert_eq!(found.role, Role::Editor);
        }

        it "finds a user by id" {
            let user = db.create_user(CreateUserInput {
                name: "Au".to_string(),
                role: Role::Author,
                token: None,
            }).expect("Failed to create user");

            let found = db.get_user(user.id).expect("Query failed").unwrap();
            assert_eq!(found.name, "Au");
            assert!(db.get_user(user.id + 1).expect("Query failed").is_none());
        }

        it "returns None for an unknown token" {
            assert!(db.get_user_by_token("missing").expect("Query failed").is_none());
        }
    }

    describe "entries" {
        it "rejects an unregistered content type" {
            let result = db.create_entry(CreateEntryInput {
                content_type: "nope".to_string(),
                title: "X".to_string(),
                author_id: None,
            });
            assert!(result.is_err());
        }

        it "updates only the title on save" {
            let entry = create_test_entry(&db, "page");
            let saved = db.update_entry_data(&EntryData {
                id: entry.id,
                content_type: "page".to_string(),
                title: "Renamed".to_string(),
            }).expect("Update failed");

            assert!(saved);
            let found = db.get_entry(entry.id).expect("Query failed").unwrap();
            assert_eq!(found.title, "Renamed");
            assert_eq!(found.content_type, "page");
        }

        it "sets and clears the featured image" {
            let entry = create_test_entry(&db, "page");
            let image = attach(&db, entry.id, "a", "image/png", 0);

            let updated = db.set_featured_image(entry.id, Some(image.id)).expect("Update failed").unwrap();
            assert_eq!(updated.featured_image_id, Some(image.id));
            assert_eq!(db.get_featured_image_id(entry.id).expect("Query failed"), Some(image.id));

            db.set_featured_image(entry.id, None).expect("Update failed");
            assert_eq!(db.get_featured_image_id(entry.id).expect("Query failed"), None);
        }

        it "refuses a featured image from another entry" {
            let entry = create_test_entry(&db, "page");
            let other = create_test_entry(&db, "page");
            let image = attach(&db, other.id, "a", "image/png", 0);

            assert!(db.set_featured_image(entry.id, Some(image.id)).is_err());
        }
    }

    describe "attachments" {
        it "orders images by rank then id" {
            let entry = create_test_entry(&db, "page");
            let c = attach(&db, entry.id, "c", "image/jpeg", 2);
            let a = attach(&db, entry.id, "a", "image/jpeg", 0);
            let b1 = attach(&db, entry.id, "b1", "image/jpeg", 1);
            let b2 = attach(&db, entry.id, "b2", "image/jpeg", 1);

            let ids: Vec<i64> = db.get_images(entry.id, None).expect("Query failed")
                .into_iter().map(|i| i.id).collect();
            assert_eq!(ids, vec![a.id, b1.id, b2.id, c.id]);
        }

        it "leaves non-image attachments out" {
            let entry = create_test_entry(&db, "post");
            attach(&db, entry.id, "doc", "application/pdf", 0);

            assert!(db.get_images(entry.id, None).expect("Query failed").is_empty());
            assert!(!db.has_image_attachments(entry.id).expect("Query failed"));
        }

        it "excludes the given image" {
            let entry = create_test_entry(&db, "page");
            let a = attach(&db, entry.id, "a", "image/jpeg", 0);
            let b = attach(&db, entry.id, "b", "image/jpeg", 1);

            let ids: Vec<i64> = db.get_images(entry.id, Some(a.id)).expect("Query failed")
                .into_iter().map(|i| i.id).collect();
            assert_eq!(ids, vec![b.id]);
        }

        it "ranks only images of the given entry" {
            let entry = create_test_entry(&db, "page");
            let other = create_test_entry(&db, "page");
            let mine = attach(&db, entry.id, "mine", "image/jpeg", 0);
            let theirs = attach(&db, other.id, "theirs", "image/jpeg", 0);

            assert!(db.set_image_rank(entry.id, mine.id, 4).expect("Update failed"));
            assert!(!db.set_image_rank(entry.id, theirs.id, 4).expect("Update failed"));
            assert!(!db.set_image_rank(entry.id, 9999, 4).expect("Update failed"));

            assert_eq!(db.get_attachment(mine.id).expect("Query failed").unwrap().rank, 4);
            assert_eq!(db.get_attachment(theirs.id).expect("Query failed").unwrap().rank, 0);
        }

        it "refuses to attach to a missing entry" {
            let result = db.create_attachment(42, CreateAttachmentInput {
                title: "x".to_string(),
                thumbnail_url: "/x.jpg".to_string(),
                mime_type: None,
                rank: None,
            });
            assert!(result.is_err());
        }
    }
}

#[test]
fn file_database_persists_between_opens() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("rei.db");

    {
        let db = Database::open(path.clone()).expect("Failed to open");
        db.migrate().expect("Failed to migrate");
        db.update_option("rei-options", &json!(["page"])).expect("Failed to update");
    }

    let db = Database::open(path).expect("Failed to reopen");
    db.migrate().expect("Failed to migrate");
    assert_eq!(db.get_option("rei-options").expect("Query failed"), Some(json!(["page"])));
}

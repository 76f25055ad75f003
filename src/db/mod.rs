mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rand::RngCore;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::*;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Apply pending migrations, returning how many ran.
    pub fn migrate(&self) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    pub fn schema_version(&self) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::current_version(&conn)
    }

    // ============================================================
    // Content type operations
    // ============================================================

    /// Public content types ordered by name, `attachment` included.
    pub fn get_public_content_types(&self) -> Result<Vec<ContentType>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT name, label, public FROM content_types WHERE public = 1 ORDER BY name",
        )?;

        let types = stmt
            .query_map([], content_type_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(types)
    }

    pub fn get_content_type(&self, name: &str) -> Result<Option<ContentType>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let content_type = conn
            .query_row(
                "SELECT name, label, public FROM content_types WHERE name = ?",
                [name],
                content_type_from_row,
            )
            .optional()?;
        Ok(content_type)
    }

    /// Register a custom content type, replacing any existing registration.
    pub fn register_content_type(&self, content_type: &ContentType) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT INTO content_types (name, label, public) VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET label = excluded.label, public = excluded.public",
            (
                &content_type.name,
                &content_type.label,
                if content_type.public { 1 } else { 0 },
            ),
        )?;
        Ok(())
    }

    // ============================================================
    // Option operations
    // ============================================================

    /// Read a named option. A stored value that is not valid JSON reads as absent.
    pub fn get_option(&self, name: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let raw: Option<String> = conn
            .query_row("SELECT value FROM options WHERE name = ?", [name], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(raw.and_then(|raw| match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Option {} holds malformed JSON: {}", name, e);
                None
            }
        }))
    }

    pub fn update_option(&self, name: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT INTO options (name, value) VALUES (?, ?)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value",
            (name, value.to_string()),
        )?;
        Ok(())
    }

    pub fn delete_option(&self, name: &str) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM options WHERE name = ?", [name])?;
        Ok(rows > 0)
    }

    // ============================================================
    // User operations
    // ============================================================

    pub fn create_user(&self, input: CreateUserInput) -> Result<User> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let token = input.token.unwrap_or_else(generate_token);

        conn.execute(
            "INSERT INTO users (name, role, token, created_at) VALUES (?, ?, ?, ?)",
            (&input.name, input.role.as_str(), &token, now.to_rfc3339()),
        )?;

        Ok(User {
            id: conn.last_insert_rowid(),
            name: input.name,
            role: input.role,
            token,
            created_at: now,
        })
    }

    pub fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let user = conn
            .query_row(
                "SELECT id, name, role, token, created_at FROM users WHERE token = ?",
                [token],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let user = conn
            .query_row(
                "SELECT id, name, role, token, created_at FROM users WHERE id = ?",
                [id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_all_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt =
            conn.prepare("SELECT id, name, role, token, created_at FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    // ============================================================
    // Entry operations
    // ============================================================

    pub fn create_entry(&self, input: CreateEntryInput) -> Result<Entry> {
        self.get_content_type(&input.content_type)?
            .ok_or_else(|| anyhow::anyhow!("Content type not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        conn.execute(
            "INSERT INTO entries (content_type, title, author_id, featured_image_id, created_at, updated_at)
             VALUES (?, ?, ?, NULL, ?, ?)",
            (
                &input.content_type,
                &input.title,
                input.author_id,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Entry {
            id: conn.last_insert_rowid(),
            content_type: input.content_type,
            title: input.title,
            author_id: input.author_id,
            featured_image_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_entry(&self, id: i64) -> Result<Option<Entry>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let entry = conn
            .query_row(
                "SELECT id, content_type, title, author_id, featured_image_id, created_at, updated_at
                 FROM entries WHERE id = ?",
                [id],
                entry_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// Persist the sanitized fields of an entry save. Returns false if the entry is gone.
    pub fn update_entry_data(&self, data: &EntryData) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "UPDATE entries SET title = ?, updated_at = ? WHERE id = ?",
            (&data.title, Utc::now().to_rfc3339(), data.id),
        )?;
        Ok(rows > 0)
    }

    pub fn set_featured_image(&self, entry_id: i64, image_id: Option<i64>) -> Result<Option<Entry>> {
        if let Some(image_id) = image_id {
            match self.get_attachment(image_id)? {
                Some(image) if image.parent_id == entry_id && image.is_image() => {}
                _ => anyhow::bail!("Image not found on entry {}", entry_id),
            }
        }

        {
            let conn = self.conn.lock().expect("database lock poisoned");
            let rows = conn.execute(
                "UPDATE entries SET featured_image_id = ?, updated_at = ? WHERE id = ?",
                (image_id, Utc::now().to_rfc3339(), entry_id),
            )?;
            if rows == 0 {
                return Ok(None);
            }
        }
        self.get_entry(entry_id)
    }

    pub fn get_featured_image_id(&self, entry_id: i64) -> Result<Option<i64>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let featured: Option<Option<i64>> = conn
            .query_row(
                "SELECT featured_image_id FROM entries WHERE id = ?",
                [entry_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(featured.flatten())
    }

    // ============================================================
    // Attachment operations
    // ============================================================

    pub fn create_attachment(
        &self,
        parent_id: i64,
        input: CreateAttachmentInput,
    ) -> Result<Attachment> {
        self.get_entry(parent_id)?
            .ok_or_else(|| anyhow::anyhow!("Entry not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let mime_type = input.mime_type.unwrap_or_else(|| "image/jpeg".to_string());
        let rank = input.rank.unwrap_or(0);

        conn.execute(
            "INSERT INTO attachments (parent_id, title, thumbnail_url, mime_type, rank, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                parent_id,
                &input.title,
                &input.thumbnail_url,
                &mime_type,
                rank,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Attachment {
            id: conn.last_insert_rowid(),
            parent_id,
            title: input.title,
            thumbnail_url: input.thumbnail_url,
            mime_type,
            rank,
            created_at: now,
        })
    }

    pub fn get_attachment(&self, id: i64) -> Result<Option<Attachment>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let attachment = conn
            .query_row(
                "SELECT id, parent_id, title, thumbnail_url, mime_type, rank, created_at
                 FROM attachments WHERE id = ?",
                [id],
                attachment_from_row,
            )
            .optional()?;
        Ok(attachment)
    }

    /// Whether the entry has any image attachment at all, featured image included.
    pub fn has_image_attachments(&self, parent_id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM attachments WHERE parent_id = ? AND mime_type LIKE 'image/%'",
            [parent_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Image attachments of an entry in display order (rank, then id).
    pub fn get_images(&self, parent_id: i64, exclude: Option<i64>) -> Result<Vec<Attachment>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, parent_id, title, thumbnail_url, mime_type, rank, created_at
             FROM attachments
             WHERE parent_id = ?1 AND mime_type LIKE 'image/%' AND (?2 IS NULL OR id != ?2)
             ORDER BY rank, id",
        )?;

        let images = stmt
            .query_map((parent_id, exclude), attachment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(images)
    }

    /// Set the rank of one image of an entry. Returns false when no such image exists.
    pub fn set_image_rank(&self, parent_id: i64, image_id: i64, rank: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "UPDATE attachments SET rank = ?
             WHERE id = ? AND parent_id = ? AND mime_type LIKE 'image/%'",
            (rank, image_id, parent_id),
        )?;
        Ok(rows > 0)
    }
}

fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "reorder-entry-images")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("rei.db"))
}

fn generate_token() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn content_type_from_row(row: &Row<'_>) -> rusqlite::Result<ContentType> {
    Ok(ContentType {
        name: row.get(0)?,
        label: row.get(1)?,
        public: row.get::<_, i32>(2)? != 0,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        role: Role::from_str(&row.get::<_, String>(2)?).unwrap_or(Role::Subscriber),
        token: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: row.get(0)?,
        content_type: row.get(1)?,
        title: row.get(2)?,
        author_id: row.get(3)?,
        featured_image_id: row.get(4)?,
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn attachment_from_row(row: &Row<'_>) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        title: row.get(2)?,
        thumbnail_url: row.get(3)?,
        mime_type: row.get(4)?,
        rank: row.get(5)?,
        created_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

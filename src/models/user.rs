use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::Entry;

/// An admin user resolved from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub token: String,
    pub created_at: DateTime<Utc>,
}

/// Coarse capability level of a user.
///
/// - `Administrator`: manages options and edits every entry
/// - `Editor`: edits every entry
/// - `Author`: edits only entries they wrote
/// - `Subscriber`: read-only
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Editor,
    Author,
    Subscriber,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Editor => "editor",
            Self::Author => "author",
            Self::Subscriber => "subscriber",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "administrator" => Some(Self::Administrator),
            "editor" => Some(Self::Editor),
            "author" => Some(Self::Author),
            "subscriber" => Some(Self::Subscriber),
            _ => None,
        }
    }
}

impl User {
    /// Whether the user may change site options (the settings page).
    pub fn can_manage_options(&self) -> bool {
        self.role == Role::Administrator
    }

    /// Whether the user may edit this specific entry.
    pub fn can_edit_entry(&self, entry: &Entry) -> bool {
        match self.role {
            Role::Administrator | Role::Editor => true,
            Role::Author => entry.author_id == Some(self.id),
            Role::Subscriber => false,
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserInput {
    pub name: String,
    pub role: Role,
    /// Generated when absent.
    #[serde(default)]
    pub token: Option<String>,
}

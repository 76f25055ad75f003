use anyhow::Result;
use askama::Template;
use serde_json::Value;

use super::ReorderImages;
use crate::models::{ATTACHMENT_TYPE, ENABLED_TYPES_OPTION};

/// Nonce action of the settings form.
pub const SETTINGS_ACTION: &str = "rei_the_settings_group-options";

pub struct TypeChoice {
    pub name: String,
    pub label: String,
    pub checked: bool,
}

#[derive(Template)]
#[template(path = "settings_field.html")]
struct SettingsField<'a> {
    choices: &'a [TypeChoice],
}

#[derive(Template)]
#[template(path = "settings.html")]
struct SettingsPage<'a> {
    nonce: &'a str,
    field: &'a str,
    updated: bool,
}

impl ReorderImages {
    /// Public content types except attachments, each marked if enabled.
    pub fn type_choices(&self) -> Result<Vec<TypeChoice>> {
        let enabled = self.enabled_types();
        let choices = self
            .db()
            .get_public_content_types()?
            .into_iter()
            .filter(|t| t.name != ATTACHMENT_TYPE)
            .map(|t| TypeChoice {
                checked: enabled.contains(&t.name),
                name: t.name,
                label: t.label,
            })
            .collect();
        Ok(choices)
    }

    /// One checkbox per selectable content type.
    pub fn render_settings_field(&self) -> Result<String> {
        let choices = self.type_choices()?;
        Ok(SettingsField { choices: &choices }.render()?)
    }

    pub fn render_settings_page(&self, user_id: i64, updated: bool) -> Result<String> {
        let field = self.render_settings_field()?;
        let nonce = self.nonces().create(SETTINGS_ACTION, user_id);
        Ok(SettingsPage {
            nonce: &nonce,
            field: &field,
            updated,
        }
        .render()?)
    }

    /// Store the submitted type list as is.
    pub fn save_settings(&self, submitted: Vec<String>) -> Result<()> {
        tracing::info!("Enabling image reordering for {:?}", submitted);
        let value = Value::Array(submitted.into_iter().map(Value::String).collect());
        self.db().update_option(ENABLED_TYPES_OPTION, &value)
    }
}

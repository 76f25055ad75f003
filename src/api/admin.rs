//! Admin screens: the settings page and the entry edit screen.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Extension,
};
use axum_extra::extract::Form;
use serde::Deserialize;

use super::handlers::internal_error;
use super::CurrentUser;
use crate::models::{Entry, EntryData, User};
use crate::reorder::settings::SETTINGS_ACTION;
use crate::reorder::{ReorderImages, SaveContext, SortRequest};

type AdminResult<T> = Result<T, (StatusCode, String)>;

fn forbidden(msg: &str) -> (StatusCode, String) {
    (StatusCode::FORBIDDEN, msg.to_string())
}

// ============================================================
// Settings page
// ============================================================

#[derive(Debug, Deserialize)]
pub struct SettingsQuery {
    #[serde(default)]
    pub updated: bool,
}

#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    #[serde(rename = "_nonce", default)]
    pub nonce: String,
    #[serde(rename = "rei-options[]", default)]
    pub types: Vec<String>,
}

pub async fn settings_page(
    State(reorder): State<ReorderImages>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<SettingsQuery>,
) -> AdminResult<Html<String>> {
    if !user.can_manage_options() {
        return Err(forbidden("Sorry, you are not allowed to manage options for this site."));
    }

    reorder
        .render_settings_page(user.id, query.updated)
        .map(Html)
        .map_err(internal_error)
}

pub async fn save_settings(
    State(reorder): State<ReorderImages>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<SettingsForm>,
) -> AdminResult<Redirect> {
    if !user.can_manage_options() {
        return Err(forbidden("Sorry, you are not allowed to manage options for this site."));
    }
    if let Err(e) = reorder.nonces().verify(&form.nonce, SETTINGS_ACTION, user.id) {
        tracing::warn!(user_id = user.id, "Settings nonce rejected: {}", e);
        return Err(forbidden("The link you followed has expired."));
    }

    reorder.save_settings(form.types).map_err(internal_error)?;
    Ok(Redirect::to("/admin/settings?updated=true"))
}

// ============================================================
// Entry edit screen
// ============================================================

struct RenderedMetabox {
    id: &'static str,
    title: &'static str,
    context: &'static str,
    priority: &'static str,
    body: String,
}

#[derive(Template)]
#[template(path = "edit.html")]
struct EditScreen<'a> {
    entry_id: i64,
    title: &'a str,
    screen: &'a str,
    metaboxes: Vec<RenderedMetabox>,
    enqueue_assets: bool,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct EntrySaveForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub images_sort_nonce: Option<String>,
    #[serde(rename = "att_id[]", default)]
    pub att_id: Vec<String>,
}

fn editable_entry(reorder: &ReorderImages, user: &User, id: i64) -> AdminResult<Entry> {
    let entry = reorder
        .db()
        .get_entry(id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Entry not found".to_string()))?;

    if !user.can_edit_entry(&entry) {
        return Err(forbidden("Sorry, you are not allowed to edit this item."));
    }
    Ok(entry)
}

pub async fn edit_entry(
    State(reorder): State<ReorderImages>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AdminResult<Html<String>> {
    let entry = editable_entry(&reorder, &user, id)?;

    let mut metaboxes = Vec::new();
    for metabox in reorder
        .on_entry_type_supports_reordering(&entry)
        .map_err(internal_error)?
        .into_iter()
        .filter(|m| m.screen == entry.content_type)
    {
        let body = reorder
            .render_sortable_panel(entry.id, user.id)
            .map_err(internal_error)?;
        metaboxes.push(RenderedMetabox {
            id: metabox.id,
            title: metabox.title,
            context: metabox.context,
            priority: metabox.priority,
            body,
        });
    }

    EditScreen {
        entry_id: entry.id,
        title: &entry.title,
        screen: &entry.content_type,
        metaboxes,
        enqueue_assets: reorder.enabled_types().contains(&entry.content_type),
        version: crate::VERSION,
    }
    .render()
    .map(Html)
    .map_err(internal_error)
}

fn save(
    reorder: &ReorderImages,
    user: &User,
    id: i64,
    form: EntrySaveForm,
    autosave: bool,
) -> AdminResult<()> {
    let entry = editable_entry(reorder, user, id)?;

    let data = EntryData {
        id: entry.id,
        content_type: entry.content_type,
        title: form
            .title
            .map(|t| t.trim().to_string())
            .unwrap_or(entry.title),
    };
    let sort = SortRequest {
        nonce: form.images_sort_nonce,
        image_ids: form.att_id,
    };
    let ctx = SaveContext { user, autosave };

    let data = reorder.sort_images_on_save(data, &sort, &ctx);
    reorder
        .db()
        .update_entry_data(&data)
        .map_err(internal_error)?;
    Ok(())
}

pub async fn save_entry(
    State(reorder): State<ReorderImages>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<EntrySaveForm>,
) -> AdminResult<Redirect> {
    save(&reorder, &user, id, form, false)?;
    Ok(Redirect::to(&format!("/admin/entries/{}/edit", id)))
}

pub async fn autosave_entry(
    State(reorder): State<ReorderImages>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<EntrySaveForm>,
) -> AdminResult<StatusCode> {
    save(&reorder, &user, id, form, true)?;
    Ok(StatusCode::NO_CONTENT)
}

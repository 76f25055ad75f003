use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::api::CurrentUser;
use crate::db::Database;
use crate::models::*;
use crate::reorder::ReorderImages;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
///
/// Lookups of a missing parent record ("... not found") are reported as
/// NOT_FOUND with their message; everything else becomes a generic 500.
pub(crate) fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    let msg = e.to_string();

    if msg.contains("not found") {
        tracing::warn!("Lookup failed: {}", msg);
        return (StatusCode::NOT_FOUND, msg);
    }

    tracing::error!("Internal error: {}", msg);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Content types
// ============================================================

pub async fn list_content_types(
    State(db): State<Database>,
) -> Result<Json<Vec<ContentType>>, (StatusCode, String)> {
    db.get_public_content_types()
        .map(Json)
        .map_err(internal_error)
}

pub async fn register_content_type(
    State(db): State<Database>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<ContentType>,
) -> Result<(StatusCode, Json<ContentType>), (StatusCode, String)> {
    if !user.can_manage_options() {
        return Err((StatusCode::FORBIDDEN, "Sorry, you are not allowed to do that.".to_string()));
    }

    db.register_content_type(&input)
        .map(|_| (StatusCode::CREATED, Json(input)))
        .map_err(internal_error)
}

// ============================================================
// Entries
// ============================================================

pub async fn create_entry(
    State(db): State<Database>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(mut input): Json<CreateEntryInput>,
) -> Result<(StatusCode, Json<Entry>), (StatusCode, String)> {
    if user.role == Role::Subscriber {
        return Err((StatusCode::FORBIDDEN, "Sorry, you are not allowed to do that.".to_string()));
    }
    match input.author_id {
        // Authors only create entries of their own.
        Some(_) if user.role == Role::Author => input.author_id = Some(user.id),
        Some(author_id) => {
            if db.get_user(author_id).map_err(internal_error)?.is_none() {
                return Err((StatusCode::NOT_FOUND, "Author not found".to_string()));
            }
        }
        None => input.author_id = Some(user.id),
    }

    db.create_entry(input)
        .map(|e| (StatusCode::CREATED, Json(e)))
        .map_err(internal_error)
}

pub async fn get_entry(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Entry>, (StatusCode, String)> {
    db.get_entry(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Entry not found".to_string()))
}

pub async fn set_featured_image(
    State(db): State<Database>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(input): Json<SetFeaturedImageInput>,
) -> Result<Json<Entry>, (StatusCode, String)> {
    let entry = db
        .get_entry(id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Entry not found".to_string()))?;
    if !user.can_edit_entry(&entry) {
        return Err((StatusCode::FORBIDDEN, "Sorry, you are not allowed to edit this item.".to_string()));
    }

    db.set_featured_image(id, input.image_id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Entry not found".to_string()))
}

// ============================================================
// Attachments
// ============================================================

pub async fn create_attachment(
    State(db): State<Database>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(entry_id): Path<i64>,
    Json(input): Json<CreateAttachmentInput>,
) -> Result<(StatusCode, Json<Attachment>), (StatusCode, String)> {
    let entry = db
        .get_entry(entry_id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Entry not found".to_string()))?;
    if !user.can_edit_entry(&entry) {
        return Err((StatusCode::FORBIDDEN, "Sorry, you are not allowed to edit this item.".to_string()));
    }

    db.create_attachment(entry_id, input)
        .map(|a| (StatusCode::CREATED, Json(a)))
        .map_err(internal_error)
}

/// All image attachments of an entry in display order, featured image included.
pub async fn list_images(
    State(db): State<Database>,
    Path(entry_id): Path<i64>,
) -> Result<Json<Vec<Attachment>>, (StatusCode, String)> {
    db.get_entry(entry_id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Entry not found".to_string()))?;

    db.get_images(entry_id, None)
        .map(Json)
        .map_err(internal_error)
}

// ============================================================
// Settings
// ============================================================

pub async fn get_settings(State(reorder): State<ReorderImages>) -> Json<EnabledTypeSet> {
    Json(reorder.enabled_types())
}

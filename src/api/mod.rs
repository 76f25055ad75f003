mod admin;
mod assets;
mod handlers;
mod middleware;
mod session;

use axum::{
    extract::FromRef,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::db::Database;
use crate::reorder::ReorderImages;

pub use middleware::{CurrentUser, SESSION_COOKIE};

/// Shared state of every handler: the store and the reordering controller.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub reorder: ReorderImages,
}

impl AppState {
    pub fn new(reorder: ReorderImages) -> Self {
        Self {
            db: reorder.db().clone(),
            reorder,
        }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for ReorderImages {
    fn from_ref(state: &AppState) -> Self {
        state.reorder.clone()
    }
}

pub fn create_router(reorder: ReorderImages) -> Router {
    let state = AppState::new(reorder);
    let auth = axum::middleware::from_fn_with_state(state.clone(), middleware::auth_middleware);
    let admin_auth =
        axum::middleware::from_fn_with_state(state.clone(), middleware::admin_auth_middleware);

    let api = Router::new()
        // Content types
        .route("/content-types", get(handlers::list_content_types))
        .route("/content-types", post(handlers::register_content_type))
        // Entries
        .route("/entries", post(handlers::create_entry))
        .route("/entries/{id}", get(handlers::get_entry))
        .route("/entries/{id}/featured-image", put(handlers::set_featured_image))
        .route("/entries/{id}/attachments", post(handlers::create_attachment))
        .route("/entries/{id}/images", get(handlers::list_images))
        // Settings
        .route("/settings", get(handlers::get_settings))
        .route_layer(auth)
        // Health (unauthenticated)
        .route("/health", get(handlers::health));

    let admin = Router::new()
        .route("/settings", get(admin::settings_page))
        .route("/settings", post(admin::save_settings))
        .route("/entries/{id}/edit", get(admin::edit_entry))
        .route("/entries/{id}", post(admin::save_entry))
        .route("/entries/{id}/autosave", post(admin::autosave_entry))
        .route_layer(admin_auth);

    Router::new()
        .nest("/api/v1", api)
        .nest("/admin", admin)
        .route("/login", get(session::login_page).post(session::login))
        .route("/logout", post(session::logout))
        .route("/assets/admin.js", get(assets::admin_script))
        .route("/assets/admin.css", get(assets::admin_style))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

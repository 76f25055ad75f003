//! Script and style of the sortable panel, embedded in the binary.

use axum::{http::header, response::IntoResponse};

const ADMIN_JS: &str = include_str!("../../assets/admin.js");
const ADMIN_CSS: &str = include_str!("../../assets/admin.css");

pub async fn admin_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        ADMIN_JS,
    )
}

pub async fn admin_style() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], ADMIN_CSS)
}

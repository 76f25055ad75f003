//! Authentication middleware resolving the acting user.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::db::Database;
use crate::models::User;

/// The user a request acts as, inserted by [`auth_middleware`].
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Cookie carrying the user token for browser sessions on the admin screens.
pub const SESSION_COOKIE: &str = "token";

/// Resolve `Authorization: Bearer <token>` to a user or reject the request.
pub async fn auth_middleware(
    State(db): State<Database>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = bearer_token(&request)?.ok_or_else(|| {
        tracing::warn!("Missing Authorization header");
        StatusCode::UNAUTHORIZED
    })?;

    authenticate(&db, &token, request, next).await
}

/// Like [`auth_middleware`], but a browser may present the token in the
/// session cookie instead. A bearer header wins when both are sent.
pub async fn admin_auth_middleware(
    State(db): State<Database>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = match bearer_token(&request)? {
        Some(token) => token,
        None => CookieJar::from_headers(request.headers())
            .get(SESSION_COOKIE)
            .map(|c| c.value().trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                tracing::warn!("No bearer token or session cookie");
                StatusCode::UNAUTHORIZED
            })?,
    };

    authenticate(&db, &token, request, next).await
}

fn bearer_token(request: &Request<Body>) -> Result<Option<String>, StatusCode> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    match auth_header {
        Some(header) if header.starts_with("Bearer ") => Ok(Some(header[7..].trim().to_string())),
        Some(_) => {
            tracing::warn!("Invalid Authorization header format");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => Ok(None),
    }
}

async fn authenticate(
    db: &Database,
    token: &str,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let user = db.get_user_by_token(token).map_err(|e| {
        tracing::error!("Could not resolve user: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    match user {
        Some(user) => {
            tracing::debug!(user_id = user.id, "Authenticated request");
            request.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(request).await)
        }
        None => {
            tracing::warn!("Unknown user token provided");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

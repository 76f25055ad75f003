//! Browser sign-in for the admin screens.
//!
//! Signing in stores the user token in the session cookie, which the admin
//! routes accept in place of a bearer header.

use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::Form;
use serde::Deserialize;

use super::handlers::internal_error;
use super::middleware::SESSION_COOKIE;
use crate::db::Database;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginPage<'a> {
    failed: bool,
    redirect_to: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub token: String,
    /// Admin screen to land on after signing in.
    #[serde(default)]
    pub redirect_to: Option<String>,
}

fn session_cookie(value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub redirect_to: Option<String>,
}

pub async fn login_page(
    Query(query): Query<LoginQuery>,
) -> Result<Html<String>, (StatusCode, String)> {
    LoginPage {
        failed: false,
        redirect_to: query.redirect_to.as_deref().unwrap_or_default(),
    }
    .render()
    .map(Html)
    .map_err(internal_error)
}

pub async fn login(
    State(db): State<Database>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), (StatusCode, Html<String>)> {
    let token = form.token.trim().to_string();
    let user = if token.is_empty() {
        None
    } else {
        db.get_user_by_token(&token).map_err(|e| {
            tracing::error!("Could not resolve user: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(String::new()))
        })?
    };

    let Some(user) = user else {
        tracing::warn!("Sign-in with an unknown token");
        let page = LoginPage {
            failed: true,
            redirect_to: form.redirect_to.as_deref().unwrap_or_default(),
        }
        .render()
        .unwrap_or_default();
        return Err((StatusCode::UNAUTHORIZED, Html(page)));
    };

    tracing::info!(user_id = user.id, "Signed in");
    let target = form
        .redirect_to
        .filter(|path| path.starts_with("/admin/"))
        .unwrap_or_else(|| "/admin/settings".to_string());
    Ok((jar.add(session_cookie(user.token)), Redirect::to(&target)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (
        jar.remove(session_cookie(String::new())),
        Redirect::to("/login"),
    )
}

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, MessageResponse},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{verify_dummy, verify_password},
        SESSION_COOKIE,
    },
    error::{AppError, AppJson},
    state::AppState,
    users::services::normalize_email,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login/", post(login))
        .route("/logout/", get(logout))
}

fn session_cookie(token: String, keys: &JwtKeys, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(keys.ttl)
        .build()
}

#[instrument(skip(state, keys, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    State(keys): State<JwtKeys>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        warn!("login with missing credentials");
        return Err(AppError::InvalidCredentials);
    }

    let user = match state.users.find_by_email(&email).await? {
        Some(u) if u.is_active => u,
        Some(u) => {
            verify_dummy(&payload.password);
            warn!(user_id = u.id, "login to inactive account");
            return Err(AppError::InvalidCredentials);
        }
        None => {
            verify_dummy(&payload.password);
            warn!(email = %email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = keys.issue(user.id)?;
    info!(user_id = user.id, email = %user.email, "user logged in");

    let jar = jar.add(session_cookie(token, &keys, state.config.cookie.secure));
    Ok((jar, Json(MessageResponse::success())))
}

/// Drops the client's cookie. The token itself stays valid until it expires.
#[instrument(skip_all)]
pub async fn logout(
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    info!(user_id = user.id, "user logged out");
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(MessageResponse::success()))
}

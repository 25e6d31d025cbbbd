use crate::state::AppState;
use axum::Router;

pub mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "jwt";

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}

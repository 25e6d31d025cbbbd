use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use tracing::warn;

use super::SESSION_COOKIE;
use crate::{error::AppError, state::AppState, users::repo_types::User};

/// Account resolved from the `jwt` cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(SESSION_COOKIE).ok_or(AppError::Unauthenticated)?;

        let claims = state.keys.verify(token.value()).map_err(|e| {
            warn!(error = %e, "rejected session token");
            AppError::Unauthenticated
        })?;

        // The subject must still resolve to an active account.
        let user = match state.users.find_by_id(claims.sub).await? {
            Some(user) if user.is_active => user,
            Some(_) => {
                warn!(user_id = claims.sub, "token for inactive account");
                return Err(AppError::Unauthenticated);
            }
            None => {
                warn!(user_id = claims.sub, "token for missing account");
                return Err(AppError::Unauthenticated);
            }
        };

        Ok(CurrentUser(user))
    }
}

impl CurrentUser {
    /// Identity cross-check for self-service operations.
    pub fn ensure_self(&self, id: i64) -> Result<(), AppError> {
        if self.0.id != id {
            warn!(user_id = self.0.id, target = id, "self-only operation on another account");
            return Err(AppError::PermissionDenied);
        }
        Ok(())
    }
}

/// Authenticated staff account.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_staff() {
            warn!(user_id = user.id, "admin-only operation by non-staff account");
            return Err(AppError::PermissionDenied);
        }
        Ok(AdminUser(user))
    }
}

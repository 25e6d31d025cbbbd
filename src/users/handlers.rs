use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::{AdminUser, CurrentUser},
    error::{AppError, AppJson, AppPath, AppQuery},
    state::AppState,
    users::{
        dto::{
            AdminUpdateRequest, CreateUserRequest, CreatedUser, CurrentUserResponse, Page,
            Pagination, SelfProfile, SelfUpdateRequest, UserDetail, UserSummary,
        },
        services::create_account,
    },
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users/current/", get(current_user))
        .route("/users/", get(list_users))
        .route("/user/:id/", patch(update_self))
}

pub fn private_routes() -> Router<AppState> {
    Router::new()
        .route("/private/users/", get(admin_list_users).post(admin_create_user))
        .route(
            "/private/users/:id/",
            get(admin_get_user)
                .patch(admin_update_user)
                .delete(admin_delete_user),
        )
}

async fn page_of_summaries(state: &AppState, p: &Pagination) -> Result<Page<UserSummary>, AppError> {
    let (limit, offset) = p.clamped();
    let (users, count) = state.users.list(limit, offset).await?;
    Ok(Page {
        count,
        limit,
        offset,
        results: users.iter().map(UserSummary::from).collect(),
    })
}

#[instrument(skip_all)]
pub async fn current_user(CurrentUser(user): CurrentUser) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse::from(&user))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(p): AppQuery<Pagination>,
) -> Result<Json<Page<UserSummary>>, AppError> {
    Ok(Json(page_of_summaries(&state, &p).await?))
}

#[instrument(skip(state, current, payload))]
pub async fn update_self(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<SelfUpdateRequest>,
) -> Result<Json<SelfProfile>, AppError> {
    current.ensure_self(id)?;
    let changes = payload.into_changes()?;
    let user = state
        .users
        .update(id, changes)
        .await?
        .ok_or(AppError::NotFound)?;
    info!(user_id = user.id, "profile updated");
    Ok(Json(SelfProfile::from(&user)))
}

#[instrument(skip(state, _admin))]
pub async fn admin_list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(p): AppQuery<Pagination>,
) -> Result<Json<Page<UserSummary>>, AppError> {
    Ok(Json(page_of_summaries(&state, &p).await?))
}

#[instrument(skip(state, admin, payload))]
pub async fn admin_create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedUser>), AppError> {
    let profile = payload.profile()?;
    let user = create_account(
        state.users.as_ref(),
        &payload.email,
        &payload.password,
        profile,
    )
    .await?;
    info!(admin_id = admin.id, user_id = user.id, "account created by admin");
    Ok((StatusCode::CREATED, Json(CreatedUser::from(&user))))
}

#[instrument(skip(state, _admin))]
pub async fn admin_get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i64>,
) -> Result<Json<UserDetail>, AppError> {
    let user = state.users.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(UserDetail::from(&user)))
}

#[instrument(skip(state, admin, payload))]
pub async fn admin_update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<AdminUpdateRequest>,
) -> Result<Json<UserDetail>, AppError> {
    let changes = payload.into_changes()?;
    let user = state
        .users
        .update(id, changes)
        .await?
        .ok_or(AppError::NotFound)?;
    info!(admin_id = admin.id, user_id = user.id, "account updated by admin");
    Ok(Json(UserDetail::from(&user)))
}

#[instrument(skip(state, admin))]
pub async fn admin_delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    if !state.users.delete(id).await? {
        return Err(AppError::NotFound);
    }
    info!(admin_id = admin.id, user_id = id, "account deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

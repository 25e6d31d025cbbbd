use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    error::AppError,
    users::{
        repo_types::{NewUser, User, UserChanges},
        services::clean_email,
    },
};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

const MAX_NAME_LEN: usize = 255;
const MAX_PHONE_LEN: usize = 50;
const MAX_INFO_LEN: usize = 1000;

fn bounded(field: &str, value: Option<String>, max: usize) -> Result<Option<String>, AppError> {
    match value {
        Some(v) if v.chars().count() > max => Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        ))),
        other => Ok(other),
    }
}

fn optional_email(value: Option<String>) -> Result<Option<String>, AppError> {
    value.as_deref().map(clean_email).transpose()
}

// --- representations ---

/// `GET /users/current/`
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub first_name: String,
    pub last_name: String,
    pub other_name: String,
    pub email: String,
    pub phone: String,
    #[serde(with = "iso_date::option")]
    pub birthday: Option<Date>,
    pub is_admin: bool,
}

impl From<&User> for CurrentUserResponse {
    fn from(u: &User) -> Self {
        Self {
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            other_name: u.other_name.clone(),
            email: u.email.clone(),
            phone: u.phone.clone(),
            birthday: u.birthday,
            is_admin: u.is_admin,
        }
    }
}

/// List item for public and admin listings.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
        }
    }
}

/// `PATCH /user/{id}/` response.
#[derive(Debug, Serialize)]
pub struct SelfProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub other_name: String,
    pub email: String,
    pub phone: String,
    #[serde(with = "iso_date::option")]
    pub birthday: Option<Date>,
}

impl From<&User> for SelfProfile {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            other_name: u.other_name.clone(),
            email: u.email.clone(),
            phone: u.phone.clone(),
            birthday: u.birthday,
        }
    }
}

/// Admin detail view.
#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub other_name: String,
    pub email: String,
    pub phone: String,
    #[serde(with = "iso_date::option")]
    pub birthday: Option<Date>,
    pub city: String,
    pub additional_info: String,
    pub is_admin: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub date_joined: OffsetDateTime,
}

impl From<&User> for UserDetail {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            other_name: u.other_name.clone(),
            email: u.email.clone(),
            phone: u.phone.clone(),
            birthday: u.birthday,
            city: u.city.clone(),
            additional_info: u.additional_info.clone(),
            is_admin: u.is_admin,
            date_joined: u.date_joined,
        }
    }
}

/// `POST /private/users/` response; the password is write-only.
#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<&User> for CreatedUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            is_admin: u.is_admin,
        }
    }
}

// --- pagination ---

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub const MAX_LIMIT: i64 = 100;

    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, Self::MAX_LIMIT), self.offset.max(0))
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub limit: i64,
    pub offset: i64,
    pub results: Vec<T>,
}

// --- request bodies ---

/// Body of `PATCH /user/{id}/`. Fields outside the profile are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct SelfUpdateRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub other_name: Option<String>,
    pub phone: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub birthday: Option<Date>,
}

impl SelfUpdateRequest {
    pub fn into_changes(self) -> Result<UserChanges, AppError> {
        Ok(UserChanges {
            email: optional_email(self.email)?,
            first_name: bounded("first_name", self.first_name, MAX_NAME_LEN)?,
            last_name: bounded("last_name", self.last_name, MAX_NAME_LEN)?,
            other_name: bounded("other_name", self.other_name, MAX_NAME_LEN)?,
            phone: bounded("phone", self.phone, MAX_PHONE_LEN)?,
            birthday: self.birthday,
            ..UserChanges::default()
        })
    }
}

/// Body of `PATCH /private/users/{id}/`.
#[derive(Debug, Default, Deserialize)]
pub struct AdminUpdateRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub other_name: Option<String>,
    pub phone: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub birthday: Option<Date>,
    pub city: Option<String>,
    pub additional_info: Option<String>,
    pub is_admin: Option<bool>,
}

impl AdminUpdateRequest {
    pub fn into_changes(self) -> Result<UserChanges, AppError> {
        Ok(UserChanges {
            email: optional_email(self.email)?,
            first_name: bounded("first_name", self.first_name, MAX_NAME_LEN)?,
            last_name: bounded("last_name", self.last_name, MAX_NAME_LEN)?,
            other_name: bounded("other_name", self.other_name, MAX_NAME_LEN)?,
            phone: bounded("phone", self.phone, MAX_PHONE_LEN)?,
            birthday: self.birthday,
            city: bounded("city", self.city, MAX_NAME_LEN)?,
            additional_info: bounded("additional_info", self.additional_info, MAX_INFO_LEN)?,
            is_admin: self.is_admin,
        })
    }
}

/// Body of `POST /private/users/`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl CreateUserRequest {
    /// Profile part of the request; email and password go through
    /// account creation.
    pub fn profile(&self) -> Result<NewUser, AppError> {
        bounded("first_name", Some(self.first_name.clone()), MAX_NAME_LEN)?;
        bounded("last_name", Some(self.last_name.clone()), MAX_NAME_LEN)?;
        Ok(NewUser {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            is_admin: self.is_admin,
            ..NewUser::default()
        })
    }
}

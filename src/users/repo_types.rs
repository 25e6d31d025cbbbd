use sqlx::FromRow;
use time::{Date, OffsetDateTime};

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,           // normalized, unique login identifier
    pub password_hash: String,   // Argon2 PHC string, never serialized
    pub first_name: String,
    pub last_name: String,
    pub other_name: String,
    pub phone: String,
    pub birthday: Option<Date>,
    pub city: String,
    pub additional_info: String,
    pub date_joined: OffsetDateTime,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_superuser: bool,
}

impl User {
    /// Staff members pass the admin-only policy.
    pub fn is_staff(&self) -> bool {
        self.is_admin
    }
}

/// Validated, normalized input for inserting an account.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub other_name: String,
    pub phone: String,
    pub birthday: Option<Date>,
    pub city: String,
    pub additional_info: String,
    pub is_admin: bool,
    pub is_superuser: bool,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub other_name: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<Date>,
    pub city: Option<String>,
    pub additional_info: Option<String>,
    pub is_admin: Option<bool>,
}

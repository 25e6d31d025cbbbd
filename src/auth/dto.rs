use serde::{Deserialize, Serialize};

/// Request body for login. Missing fields deserialize as empty and are
/// reported like any other credential failure.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn success() -> Self {
        Self { message: "success" }
    }
}

// Session and account models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the signed-in user, echoed by the login endpoint and kept
/// for ownership checks in the stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Access/refresh token pair plus the identity it belongs to. Lives only in
/// memory on the client; destroyed on sign-out or irrecoverable refresh
/// failure.
#[derive(Debug, Clone)]
pub struct Session {
    pub access: String,
    pub refresh: String,
    pub user: UserInfo,
}

/// Wire shape of `POST /user/login/`.
#[derive(Debug, Deserialize)]
pub struct SignInResponse {
    pub access: String,
    pub refresh: String,
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
pub struct SignUpRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Wire shape of `POST /user/token/refresh/`.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

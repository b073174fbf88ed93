//! Authenticated user handlers

use axum::{Extension, Json};
use serde::Serialize;

use crate::middleware::AuthUser;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub success: bool,
    pub message: String,
    pub user_id: String,
}

/// Echo the caller identified by the verified token
pub async fn get_current_user(Extension(user): Extension<AuthUser>) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        success: true,
        message: "Authenticated user".to_string(),
        user_id: user.user_id,
    })
}

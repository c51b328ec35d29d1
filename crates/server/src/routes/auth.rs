use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use service::admin_auth::{AdminAuth, AdminAuthError};

use super::collections::{parse_input, ALLOWED_HEADERS};
use crate::errors::method_not_allowed;

#[derive(Debug, Default, Deserialize)]
pub struct LoginInput {
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginOutput {
    pub success: bool,
    pub message: String,
}

async fn login(State(auth): State<Arc<AdminAuth>>, body: Bytes) -> (StatusCode, Json<LoginOutput>) {
    let input: LoginInput = parse_input(&body);
    match auth.verify(input.password.as_deref()) {
        Ok(()) => (
            StatusCode::OK,
            Json(LoginOutput { success: true, message: "Authentication successful".into() }),
        ),
        Err(e) => {
            let status = match e {
                AdminAuthError::MissingPassword => StatusCode::BAD_REQUEST,
                AdminAuthError::InvalidPassword => StatusCode::UNAUTHORIZED,
            };
            (status, Json(LoginOutput { success: false, message: e.to_string() }))
        }
    }
}

async fn login_preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
        ],
    )
}

pub fn router(auth: Arc<AdminAuth>) -> Router {
    Router::new()
        .route(
            "/api/auth",
            post(login).options(login_preflight).fallback(method_not_allowed),
        )
        .with_state(auth)
}

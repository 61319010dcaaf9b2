use axum::extract::State;

use lumen_types::Role;
use lumen_types::api::{LoginRequest, LoginResponse, MessageResponse, SignupRequest};

use crate::error::ApiError;
use crate::extract::Json;
use crate::password;
use crate::state::AppState;

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let role = req
        .role
        .as_deref()
        .and_then(Role::parse)
        .ok_or_else(|| ApiError::Validation("Invalid role".into()))?;

    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::Conflict("Username already exists".into()));
    }

    let password_hash = password::hash(&req.password)?;
    state.db.create_user(&req.username, &password_hash, role.as_str())?;

    Ok(Json(MessageResponse {
        message: format!("User {} signed up successfully as {}", req.username, role),
    }))
}

/// Credential check only — no session or token is created.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .db
        .get_user_by_username(&req.username)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if !password::verify(&req.password, &user.password)? {
        return Err(ApiError::Unauthorized("Incorrect password".into()));
    }

    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        role: user.role,
    }))
}

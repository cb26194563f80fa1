use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    common::{ApiResponse, Message},
    database::{User, UserUpdate},
    error::{AppError, AppResult},
    utils::{success_to_api_response, verify_password},
};

use super::model::{UpdatePassword, UserPublic, UserRegister, is_valid_email};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<UserRegister>,
) -> AppResult<Json<ApiResponse<UserPublic>>> {
    if !state.config.users_open_registration {
        return Err(AppError::Forbidden(
            "Open user registration is forbidden on this server".into(),
        ));
    }
    if !is_valid_email(&req.email) {
        return Err(AppError::BadRequest("Invalid email address".into()));
    }
    if req.password.is_empty() {
        return Err(AppError::BadRequest("Password must not be empty".into()));
    }
    if state.users.read_by_email(&req.email).await?.is_some() {
        return Err(AppError::BadRequest(
            "A user with this email already exists".into(),
        ));
    }

    let user = state.users.create(&req.email, &req.password).await?;
    tracing::info!("Registered user {}", user.id);
    Ok(success_to_api_response(user.into()))
}

#[axum::debug_handler]
pub async fn read_me(Extension(user): Extension<User>) -> Json<ApiResponse<UserPublic>> {
    success_to_api_response(user.into())
}

#[axum::debug_handler]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<UserUpdate>,
) -> AppResult<Json<ApiResponse<UserPublic>>> {
    if let Some(email) = req.email.as_deref() {
        if !is_valid_email(email) {
            return Err(AppError::BadRequest("Invalid email address".into()));
        }
    }

    let updated = state.users.update(user.id, req).await?;
    Ok(success_to_api_response(updated.into()))
}

#[axum::debug_handler]
pub async fn update_password_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<UpdatePassword>,
) -> AppResult<Json<ApiResponse<Message>>> {
    if !verify_password(&req.current_password, &user.hashed_password)? {
        return Err(AppError::BadRequest("Incorrect password".into()));
    }
    if req.current_password == req.new_password {
        return Err(AppError::BadRequest(
            "New password cannot be the same as the current password".into(),
        ));
    }

    state.users.update_password(user.id, &req.new_password).await?;
    Ok(success_to_api_response(Message::new(
        "Password updated successfully",
    )))
}

#[axum::debug_handler]
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let report = state.cascade().delete_user(user.id).await?;
    Ok(success_to_api_response(Message::new(format!(
        "User deleted successfully along with {} files",
        report.files_deleted
    ))))
}

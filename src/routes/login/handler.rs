use axum::{
    Form,
    extract::{Extension, Json, State},
};

use crate::{
    AppState,
    common::ApiResponse,
    database::User,
    error::{AppError, AppResult},
    routes::user::UserPublic,
    utils::{generate_token, success_to_api_response},
};

use super::model::{LoginForm, Token};

#[axum::debug_handler]
pub async fn login_access_token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<ApiResponse<Token>>> {
    let user = state
        .users
        .authenticate(&form.username, &form.password)
        .await?
        .ok_or_else(|| AppError::BadRequest("Incorrect email or password".into()))?;

    let (access_token, expires_at) = generate_token(user.id, &state.config)?;
    tracing::info!("User {} logged in", user.id);
    Ok(success_to_api_response(Token::bearer(
        access_token,
        expires_at,
    )))
}

#[axum::debug_handler]
pub async fn test_token(Extension(user): Extension<User>) -> Json<ApiResponse<UserPublic>> {
    success_to_api_response(user.into())
}

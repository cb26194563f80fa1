use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use crate::{AppState, error::AppError, utils::verify_token};

/// 校验 Bearer 令牌并把当前用户放进请求扩展
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.map_err(|_| AppError::Unauthorized("Not authenticated".into()))?;

    let claims = verify_token(bearer.token(), &state.config).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        AppError::Forbidden("Could not validate credentials".into())
    })?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::Forbidden("Could not validate credentials".into()))?;

    let user = state
        .users
        .read(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

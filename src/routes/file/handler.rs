use axum::extract::{Extension, Json, Path, Query, State};

use crate::{
    AppState,
    common::{ApiResponse, Message},
    database::{File, FileUpdate, NewFile, Page, User},
    error::{AppError, AppResult},
    utils::success_to_api_response,
};

use super::model::FilesPublic;

/// 读取文件并确认归属当前用户
async fn owned_file(state: &AppState, user: &User, file_id: i64) -> AppResult<File> {
    let file = state
        .files
        .read(file_id)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".into()))?;

    if file.owner_id != user.id {
        tracing::debug!("User {} denied access to file {}", user.id, file_id);
        return Err(AppError::BadRequest(
            "User does not have permission to access this file".into(),
        ));
    }
    Ok(file)
}

#[axum::debug_handler]
pub async fn create_file(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<NewFile>,
) -> AppResult<Json<ApiResponse<File>>> {
    if req.path.trim().is_empty() {
        return Err(AppError::BadRequest("Path must not be empty".into()));
    }

    let file = state.files.create(user.id, req).await?;
    Ok(success_to_api_response(file))
}

#[axum::debug_handler]
pub async fn read_files(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(page): Query<Page>,
) -> AppResult<Json<ApiResponse<FilesPublic>>> {
    let page = Page::new(page.skip, page.limit);
    let listing = state.files.list_by_owner(user.id, page).await?;

    Ok(success_to_api_response(FilesPublic {
        data: listing.items,
        count: listing.total,
    }))
}

#[axum::debug_handler]
pub async fn read_file(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(file_id): Path<i64>,
) -> AppResult<Json<ApiResponse<File>>> {
    let file = owned_file(&state, &user, file_id).await?;
    Ok(success_to_api_response(file))
}

#[axum::debug_handler]
pub async fn update_file(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(file_id): Path<i64>,
    Json(req): Json<FileUpdate>,
) -> AppResult<Json<ApiResponse<File>>> {
    owned_file(&state, &user, file_id).await?;

    let file = state.files.update(file_id, req).await?;
    Ok(success_to_api_response(file))
}

#[axum::debug_handler]
pub async fn delete_file(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(file_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Message>>> {
    owned_file(&state, &user, file_id).await?;

    state.files.delete(file_id).await?;
    Ok(success_to_api_response(Message::new(
        "File deleted successfully",
    )))
}

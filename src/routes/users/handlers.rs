use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::identity::AuthUser;
use crate::routes::pagination::{PageQuery, Pagination};

use super::types::{CreateUserRequest, DeleteUserResponse, UserPage, UserResponse};

/// Current user
///
/// Profile of the session's user, fetched from the identity provider.
#[utoipa::path(
    get,
    path = "/api/auth",
    responses(
        (status = 200, description = "Signed-in user", body = UserResponse),
        (status = 403, description = "Missing or invalid session"),
    ),
    tag = "users"
)]
pub async fn current_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let profile = state.identity_client.get_user(&user.user_id).await?;
    Ok(Json(profile.into()))
}

/// List users
#[utoipa::path(
    get,
    path = "/api/users",
    params(PageQuery),
    responses(
        (status = 200, description = "Users, newest first", body = UserPage),
        (status = 403, description = "Missing or invalid session"),
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<UserPage>> {
    let page = Pagination::from(&query);

    let (users, total) = tokio::try_join!(
        state.identity_client.list_users(page.page_size, page.offset()),
        state.identity_client.count_users(),
    )?;

    Ok(Json(UserPage {
        items: users.into_iter().map(UserResponse::from).collect(),
        page: page.page,
        page_size: page.page_size,
        total,
        total_pages: page.total_pages(total),
    }))
}

/// Create a user
///
/// The body is validated before anything is sent to the identity provider.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "Missing or invalid session"),
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let new_user = request.validate()?;

    let created = state.identity_client.create_user(&new_user).await?;

    tracing::info!(created_by = %user.user_id, user_id = %created.id, "User created");

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    params(
        ("user_id" = String, Path, description = "Identity provider user id"),
    ),
    responses(
        (status = 200, description = "User deleted", body = DeleteUserResponse),
        (status = 400, description = "Attempt to delete own account"),
        (status = 403, description = "Missing or invalid session"),
        (status = 404, description = "User not found"),
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<DeleteUserResponse>> {
    if user_id == user.user_id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let id = state.identity_client.delete_user(&user_id).await?;

    tracing::info!(deleted_by = %user.user_id, user_id = %id, "User deleted");

    Ok(Json(DeleteUserResponse { id, deleted: true }))
}

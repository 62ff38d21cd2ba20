use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult, ErrorBody},
    models::{AdminDashboardStats, UserProfile},
    policy,
};

/// get_admin_stats
///
/// [Admin Route] Platform totals for the staff dashboard.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses(
        (status = 200, description = "Stats", body = AdminDashboardStats),
        (status = 403, description = "Not staff", body = ErrorBody)
    )
)]
pub async fn get_admin_stats(user: AuthUser, State(state): State<AppState>) -> ApiResult<Json<AdminDashboardStats>> {
    policy::can_administer(Some(&user)).into_result()?;
    Ok(Json(state.repo.get_stats().await))
}

/// list_users
///
/// [Admin Route] Every profile, by username.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "Users", body = [UserProfile]),
        (status = 403, description = "Not staff", body = ErrorBody)
    )
)]
pub async fn list_users(user: AuthUser, State(state): State<AppState>) -> ApiResult<Json<Vec<UserProfile>>> {
    policy::can_administer(Some(&user)).into_result()?;
    let users = state.repo.list_users().await;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

/// delete_user
///
/// [Admin Route] Removes a local profile along with the courses it teaches and its
/// enrollments, reviews, submissions and progress. The auth provider account is untouched.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not staff", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    policy::can_administer(Some(&user)).into_result()?;
    if state.repo.delete_user(id).await {
        tracing::info!(user_id = %id, deleted_by = %user.id, "user deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

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
    models::{Category, CreateCategoryRequest, UpdateCategoryRequest},
    policy::{self, Access},
};

/// list_categories
///
/// [Public Route]
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "All categories", body = [Category]))
)]
pub async fn list_categories(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Category>>> {
    policy::can_manage_catalog(viewer.as_ref(), Access::Read).into_result()?;
    Ok(Json(state.repo.list_categories().await))
}

/// get_category
///
/// [Public Route]
#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Found", body = Category),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_category(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Category>> {
    policy::can_manage_catalog(viewer.as_ref(), Access::Read).into_result()?;
    state.repo.get_category(id).await.map(Json).ok_or(ApiError::NotFound)
}

/// create_category
///
/// [Admin Route] Staff only. Names are unique.
#[utoipa::path(
    post,
    path = "/admin/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Created", body = Category),
        (status = 403, description = "Not staff", body = ErrorBody),
        (status = 409, description = "Duplicate name", body = ErrorBody)
    )
)]
pub async fn create_category(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    policy::can_manage_catalog(Some(&user), Access::Write).into_result()?;
    payload.validate()?;
    let category = state.repo.create_category(payload).await?;
    tracing::info!(category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// update_category
///
/// [Admin Route] Staff only.
#[utoipa::path(
    put,
    path = "/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated", body = Category),
        (status = 403, description = "Not staff", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_category(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> ApiResult<Json<Category>> {
    policy::can_manage_catalog(Some(&user), Access::Write).into_result()?;
    payload.validate()?;
    Ok(Json(state.repo.update_category(id, payload).await?))
}

/// delete_category
///
/// [Admin Route] Staff only. Courses filed under the category go with it.
#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not staff", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_category(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    policy::can_manage_catalog(Some(&user), Access::Write).into_result()?;
    if state.repo.delete_category(id).await {
        tracing::info!(category_id = %id, "category deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

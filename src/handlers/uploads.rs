use axum::{Json, extract::State};

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult, ErrorBody},
    models::{PresignedUrlRequest, PresignedUrlResponse},
    storage::upload_key,
};

/// get_presigned_url
///
/// [Authenticated Route] Issues a short-lived PUT URL so the client uploads an image straight
/// to object storage. The returned `resource_key` is then passed as `thumbnail_key` on a
/// course write or as `profile_image_key` to `PATCH /me`.
#[utoipa::path(
    post,
    path = "/upload/presigned",
    request_body = PresignedUrlRequest,
    responses(
        (status = 200, description = "URL", body = PresignedUrlResponse),
        (status = 400, description = "Not an image", body = ErrorBody),
        (status = 500, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn get_presigned_url(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PresignedUrlRequest>,
) -> ApiResult<Json<PresignedUrlResponse>> {
    payload.validate()?;

    let object_key = upload_key(user.id, &payload.filename);

    let upload_url = state
        .storage
        .get_presigned_upload_url(&object_key, &payload.file_type)
        .await
        .map_err(|e| {
            tracing::error!(key = %object_key, "presign failed: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(PresignedUrlResponse {
        upload_url,
        resource_key: object_key,
    }))
}

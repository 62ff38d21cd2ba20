use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult, ErrorBody, RepoError},
    models::{RegisterUserRequest, UpdateProfileRequest, User, UserProfile},
};

#[derive(Deserialize)]
struct SupabaseAccount {
    id: Uuid,
}

/// SupabaseAuthResponse
///
/// `/auth/v1/signup` answers with the bare user while email confirmation is pending, and
/// with a session wrapping it once the account is auto-confirmed.
#[derive(Deserialize)]
#[serde(untagged)]
enum SupabaseAuthResponse {
    Session { user: SupabaseAccount },
    User(SupabaseAccount),
}

impl SupabaseAuthResponse {
    fn account_id(&self) -> Uuid {
        match self {
            SupabaseAuthResponse::Session { user } | SupabaseAuthResponse::User(user) => user.id,
        }
    }
}

/// register_user
///
/// [Public Route] Creates the account with the external auth provider, then mirrors the
/// profile locally under the provider's user id. The role is fixed here and never re-checked.
///
/// The username is checked before the provider is called: a provider account whose local
/// profile can't be created blocks any retry with the same email.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = UserProfile),
        (status = 400, description = "Invalid payload or rejected by the auth provider", body = ErrorBody),
        (status = 409, description = "Username taken", body = ErrorBody)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let role = payload.validate()?;
    let username = payload.username.trim().to_string();

    let (Some(supabase_url), Some(supabase_key)) = (&state.config.supabase_url, &state.config.supabase_key) else {
        tracing::error!("registration attempted without SUPABASE_URL/SUPABASE_KEY configured");
        return Err(ApiError::Internal);
    };

    if state.repo.get_user_by_username(&username).await.is_some() {
        return Err(ApiError::Conflict("username already taken".to_string()));
    }

    let response = reqwest::Client::new()
        .post(format!("{}/auth/v1/signup", supabase_url))
        .header("apikey", supabase_key)
        .json(&serde_json::json!({ "email": payload.email, "password": payload.password }))
        .send()
        .await
        .map_err(|e| {
            tracing::error!("auth provider unreachable: {:?}", e);
            ApiError::Internal
        })?;

    if !response.status().is_success() {
        let status = response.status();
        tracing::info!(%status, "auth provider rejected signup");
        return Err(ApiError::Rejected(status.to_string()));
    }

    let account_id = response
        .json::<SupabaseAuthResponse>()
        .await
        .map_err(|e| {
            tracing::error!("unexpected signup response: {:?}", e);
            ApiError::Internal
        })?
        .account_id();

    let user = state
        .repo
        .create_user(User {
            id: account_id,
            username,
            email: payload.email,
            bio: String::new(),
            profile_image: None,
            role,
            is_staff: false,
        })
        .await
        .inspect_err(|e| {
            // Lost a race on the username after the provider accepted the signup.
            if let RepoError::Conflict(_) = e {
                tracing::error!(provider_user_id = %account_id, "auth account orphaned: local profile rejected");
            }
        })?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// get_me
///
/// [Authenticated Route] The caller's own profile.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_me(user: AuthUser, State(state): State<AppState>) -> ApiResult<Json<UserProfile>> {
    let profile = state.repo.get_user(user.id).await.ok_or(ApiError::NotFound)?;
    Ok(Json(profile.into()))
}

/// update_me
///
/// [Authenticated Route] Edits the caller's bio and avatar. The avatar is the `resource_key`
/// of an image uploaded through `POST /upload/presigned`.
#[utoipa::path(
    patch,
    path = "/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated", body = UserProfile),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_me(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    payload.validate()?;
    let profile = state.repo.update_user(user.id, payload).await?;
    Ok(Json(profile.into()))
}

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::files::{store_multipart_field, stream_blob_response};
use crate::models::auth::{
    LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse,
    UpdateProfileRequest, validate_login_request, validate_register_request,
    validate_update_profile,
};
use crate::state::AppState;
use crate::utils::filename::validate_upload_filename;
use crate::utils::{hash, jwt};

/// Body limit layer for profile picture uploads (8 MB).
pub fn picture_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(8 * 1024 * 1024)
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register a new user",
    description = "Creates a regular (non-admin) account. An optional starting budget may be supplied.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Username already exists (USERNAME_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let username = payload.username.trim().to_string();

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        username: Set(username),
        password: Set(hash),
        budget: Set(payload.budget.unwrap_or(0)),
        is_admin: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Registration race condition: unique constraint caught on insert");
            AppError::UsernameTaken
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in and obtain a bearer token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Bad credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let username = payload.username.trim();

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::sign(
        user.id,
        &user.username,
        user.is_admin,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_days,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        is_admin: user.is_admin,
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Get the current user's profile",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, AppError> {
    let user = find_user(&state.db, auth_user.user_id).await?;
    Ok(Json(MeResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/profile",
    tag = "Auth",
    operation_id = "updateProfile",
    summary = "Update the current user's profile",
    description = "PATCH semantics: only provided fields are modified. Changing the username \
        invalidates nothing; existing tokens keep working (the user ID is the identity).",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = MeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Username already exists (USERNAME_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<MeResponse>, AppError> {
    validate_update_profile(&payload)?;

    let user = find_user(&state.db, auth_user.user_id).await?;

    let Some(new_username) = payload.username else {
        return Ok(Json(MeResponse::from(user)));
    };

    let mut active: user::ActiveModel = user.into();
    active.username = Set(new_username.trim().to_string());

    let updated = active.update(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::UsernameTaken,
        _ => AppError::from(e),
    })?;

    Ok(Json(MeResponse::from(updated)))
}

#[utoipa::path(
    put,
    path = "/profile/picture",
    tag = "Auth",
    operation_id = "uploadProfilePicture",
    summary = "Upload or replace the current user's profile picture",
    description = "Multipart upload; the `file` field is required. Body limit: 8 MB.",
    request_body(content_type = "multipart/form-data", description = "Image file"),
    responses(
        (status = 200, description = "Picture stored", body = MeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_profile_picture(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MeResponse>, AppError> {
    let user = find_user(&state.db, auth_user.user_id).await?;

    let mut stored = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
            let filename = validate_upload_filename(filename)
                .map_err(|e| AppError::Validation(e.message().into()))?
                .to_string();

            let blob = store_multipart_field(
                field,
                &*state.blob_store,
                state.config.storage.max_upload_size,
            )
            .await?;
            stored = Some((blob, filename));
            break;
        }
    }

    let (blob, filename) =
        stored.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    let mut active: user::ActiveModel = user.into();
    active.profile_picture_hash = Set(Some(blob.hash.to_hex()));
    active.profile_picture_name = Set(Some(filename));
    let updated = active.update(&state.db).await?;

    Ok(Json(MeResponse::from(updated)))
}

#[utoipa::path(
    get,
    path = "/{id}/picture",
    tag = "Auth",
    operation_id = "getUserPicture",
    summary = "Download a user's profile picture",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Picture content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 404, description = "User or picture not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers), fields(id))]
pub async fn get_user_picture(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let user = find_user(&state.db, id).await?;

    let (hash, name) = match (user.profile_picture_hash, user.profile_picture_name) {
        (Some(hash), Some(name)) => (hash, name),
        _ => return Err(AppError::NotFound("User has no profile picture".into())),
    };

    stream_blob_response(&hash, &name, None, false, &headers, &*state.blob_store).await
}

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

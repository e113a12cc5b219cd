use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest, RefreshRequest, VerifyPasswordRequest},
    extractors::CurrentUser,
    jwt::JwtKeys,
    services::{authenticate, check_password, issue_tokens},
};
use crate::{
    envelope::Envelope,
    error::{ApiError, ApiResult},
    state::AppState,
    users::User,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(get_me))
        .route("/mobile/auth/sign-in", post(mobile_sign_in))
        .route("/users/verify", post(verify_password))
}

/// Admin panel sign-in; only `ADMIN` accounts may enter.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Envelope<AuthResponse>> {
    let user = authenticate(&state, &payload.login, &payload.password).await?;

    if !user.is_admin() {
        warn!(user_id = %user.id, "panel login refused for non-admin");
        return Err(ApiError::Forbidden("User has no access permissions".into()));
    }

    info!(user_id = %user.id, employee_id = %user.employee_id, "user logged in");
    Ok(Envelope::ok("Logged in", issue_tokens(&state, user)?))
}

/// Scanner device sign-in; any role.
#[instrument(skip(state, payload))]
pub async fn mobile_sign_in(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Envelope<AuthResponse>> {
    let user = authenticate(&state, &payload.login, &payload.password).await?;
    info!(user_id = %user.id, employee_id = %user.employee_id, "mobile user signed in");
    Ok(Envelope::ok("User verified", issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Envelope<AuthResponse>> {
    let claims = JwtKeys::from_ref(&state)
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    Ok(Envelope::ok("Token refreshed", issue_tokens(&state, user)?))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Envelope<User> {
    Envelope::ok("User fetched successfully", user)
}

/// Re-check the caller's password before a destructive action.
#[instrument(skip_all)]
pub async fn verify_password(
    CurrentUser(user): CurrentUser,
    Json(payload): Json<VerifyPasswordRequest>,
) -> ApiResult<Envelope<()>> {
    check_password(&user, &payload.password)?;
    info!(user_id = %user.id, "password re-verified");
    Ok(Envelope::message("User verified"))
}

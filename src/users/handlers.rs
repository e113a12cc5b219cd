use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{AddUserRequest, UpdateUserRequest},
    repo_types::User,
    services::{create_user, validate_add, validate_update},
};
use crate::{
    auth::{password::hash_password, AdminUser},
    envelope::Envelope,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/list", get(list_users))
        .route("/users/add", post(add_user))
        .route("/users/update", put(update_user))
}

#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Envelope<Vec<User>>> {
    let users = User::list(&state.db).await?;
    Ok(Envelope::ok("Users fetched successfully", users))
}

#[instrument(skip_all)]
pub async fn add_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<AddUserRequest>,
) -> ApiResult<Envelope<User>> {
    let valid = validate_add(payload)?;
    let user = create_user(&state.db, valid).await?;
    info!(
        admin_id = %admin.id,
        user_id = %user.id,
        employee_id = %user.employee_id,
        role = user.role.as_str(),
        "user created"
    );
    Ok(Envelope::ok("User created successfully", user))
}

#[instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Envelope<()>> {
    validate_update(&payload)?;

    let hash = payload
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;

    let touched = User::update_by_employee_id(
        &state.db,
        payload.employee_id.trim(),
        payload.name.trim(),
        payload.employee_type,
        hash.as_deref(),
    )
    .await?;

    if touched == 0 {
        return Err(ApiError::not_found("Employee not found"));
    }

    info!(admin_id = %admin.id, employee_id = %payload.employee_id, "employee updated");
    Ok(Envelope::message("Employee updated successfully"))
}

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, warn};

use super::{
    dto::AuthResponse,
    jwt::JwtKeys,
    password::verify_password,
};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    users::User,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// How a login string identifies a user.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LoginId {
    Email(String),
    EmployeeId(String),
}

pub(crate) fn parse_login(raw: &str) -> ApiResult<LoginId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::bad_request("Invalid email or password"));
    }
    if raw.contains('@') {
        let email = raw.to_lowercase();
        if !is_valid_email(&email) {
            return Err(ApiError::bad_request("Invalid email"));
        }
        Ok(LoginId::Email(email))
    } else {
        Ok(LoginId::EmployeeId(raw.to_string()))
    }
}

/// Resolve a user by login and check the password. Any mismatch is a 401.
pub async fn authenticate(state: &AppState, login: &str, password: &str) -> ApiResult<User> {
    if password.is_empty() {
        return Err(ApiError::bad_request("Invalid email or password"));
    }

    let found = match parse_login(login)? {
        LoginId::Email(email) => User::find_by_email(&state.db, &email).await?,
        LoginId::EmployeeId(id) => User::find_by_employee_id(&state.db, &id).await?,
    };

    let Some(user) = found else {
        warn!(login = %login.trim(), "login unknown user");
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    check_password(&user, password)?;
    Ok(user)
}

pub fn check_password(user: &User, password: &str) -> ApiResult<()> {
    let ok = verify_password(password, &user.password_hash).map_err(|e| {
        error!(error = %e, user_id = %user.id, "verify_password failed");
        ApiError::Internal(e)
    })?;
    if !ok {
        warn!(user_id = %user.id, "invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }
    Ok(())
}

pub fn issue_tokens(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let pair = JwtKeys::from_ref(state).issue_pair(user.id)?;
    Ok(AuthResponse {
        access_token: pair.access,
        refresh_token: pair.refresh,
        user,
    })
}

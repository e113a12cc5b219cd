use anyhow::Context;
use sqlx::PgPool;
use tracing::info;

use super::{
    dto::{AddUserRequest, UpdateUserRequest},
    repo_types::{NewUser, Role, User},
};
use crate::{
    auth::{
        password::{hash_password, long_enough},
        services::is_valid_email,
    },
    config::SeedAdmin,
    error::{ApiError, ApiResult},
};

/// Trimmed, validated form of an add-user request.
#[derive(Debug)]
pub(crate) struct ValidNewUser {
    pub email: Option<String>,
    pub employee_id: String,
    pub name: String,
    pub role: Role,
    pub password: String,
}

pub(crate) fn validate_add(req: AddUserRequest) -> ApiResult<ValidNewUser> {
    let employee_id = req.employee_id.trim().to_string();
    let name = req.name.trim().to_string();
    if employee_id.is_empty() {
        return Err(ApiError::bad_request("Employee id is required"));
    }
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    if !long_enough(&req.password) {
        return Err(ApiError::bad_request("Password too short"));
    }

    let email = match req.email.map(|e| e.trim().to_lowercase()) {
        Some(e) if e.is_empty() => None,
        Some(e) if !is_valid_email(&e) => return Err(ApiError::bad_request("Invalid email")),
        other => other,
    };

    Ok(ValidNewUser {
        email,
        employee_id,
        name,
        role: req.employee_type,
        password: req.password,
    })
}

pub(crate) fn validate_update(req: &UpdateUserRequest) -> ApiResult<()> {
    if req.employee_id.trim().is_empty() {
        return Err(ApiError::bad_request("Employee id is required"));
    }
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    if let Some(pw) = &req.password {
        if !long_enough(pw) {
            return Err(ApiError::bad_request("Password too short"));
        }
    }
    Ok(())
}

pub async fn create_user(db: &PgPool, valid: ValidNewUser) -> ApiResult<User> {
    if User::find_by_employee_id(db, &valid.employee_id).await?.is_some() {
        return Err(ApiError::Conflict("Employee id already registered".into()));
    }
    if let Some(email) = &valid.email {
        if User::find_by_email(db, email).await?.is_some() {
            return Err(ApiError::Conflict("Email already registered".into()));
        }
    }

    let hash = hash_password(&valid.password)?;
    let created = User::create(
        db,
        NewUser {
            email: valid.email.as_deref(),
            employee_id: &valid.employee_id,
            name: &valid.name,
            role: valid.role,
            password_hash: &hash,
        },
    )
    .await;

    match created {
        Ok(user) => Ok(user),
        // lost a race against a concurrent insert
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(ApiError::Conflict("User already registered".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Create the bootstrap admin if no user owns its email yet.
pub async fn seed_admin(db: &PgPool, seed: &SeedAdmin) -> anyhow::Result<()> {
    if User::find_by_email(db, &seed.email)
        .await
        .context("look up seed admin")?
        .is_some()
    {
        return Ok(());
    }

    let hash = hash_password(&seed.password)?;
    let inserted = User::upsert_admin(
        db,
        NewUser {
            email: Some(&seed.email),
            employee_id: &seed.employee_id,
            name: &seed.name,
            role: Role::Admin,
            password_hash: &hash,
        },
    )
    .await?;

    if inserted {
        info!(email = %seed.email, employee_id = %seed.employee_id, "seed admin created");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_req(employee_id: &str, name: &str, password: &str, email: Option<&str>) -> AddUserRequest {
        AddUserRequest {
            employee_id: employee_id.into(),
            name: name.into(),
            password: password.into(),
            employee_type: Role::User,
            email: email.map(Into::into),
        }
    }

    #[test]
    fn validate_add_trims_and_normalizes() {
        let v = validate_add(add_req(" 12AB34 ", " Jo Scanner ", "long-enough", Some(" Jo@Plant.COM ")))
            .unwrap();
        assert_eq!(v.employee_id, "12AB34");
        assert_eq!(v.name, "Jo Scanner");
        assert_eq!(v.email.as_deref(), Some("jo@plant.com"));
        assert_eq!(v.role, Role::User);
    }

    #[test]
    fn validate_add_treats_blank_email_as_absent() {
        let v = validate_add(add_req("12AB34", "Jo", "long-enough", Some("  "))).unwrap();
        assert!(v.email.is_none());
    }

    #[test]
    fn validate_add_rejects_bad_input() {
        assert!(matches!(
            validate_add(add_req("", "Jo", "long-enough", None)),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_add(add_req("12AB34", "  ", "long-enough", None)),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_add(add_req("12AB34", "Jo", "short", None)),
            Err(ApiError::BadRequest(m)) if m == "Password too short"
        ));
        assert!(matches!(
            validate_add(add_req("12AB34", "Jo", "long-enough", Some("not-an-email"))),
            Err(ApiError::BadRequest(m)) if m == "Invalid email"
        ));
    }

    #[test]
    fn validate_update_checks_optional_password() {
        let mut req = UpdateUserRequest {
            employee_id: "12AB34".into(),
            name: "Jo".into(),
            employee_type: Role::Admin,
            password: None,
        };
        assert!(validate_update(&req).is_ok());
        req.password = Some("tiny".into());
        assert!(validate_update(&req).is_err());
        req.password = Some("much-longer-secret".into());
        assert!(validate_update(&req).is_ok());
    }
}

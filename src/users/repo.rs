use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, Role, User};

const USER_COLUMNS: &str =
    "id, email, employee_id, name, role, password_hash, created_at, updated_at";

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Find a user by (lowercased) email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_employee_id(db: &PgPool, employee_id: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE employee_id = $1"
        ))
        .bind(employee_id)
        .fetch_optional(db)
        .await
    }

    pub async fn list(db: &PgPool) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(db)
        .await
    }

    pub async fn create(db: &PgPool, new: NewUser<'_>) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, employee_id, name, role, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.email)
        .bind(new.employee_id)
        .bind(new.name)
        .bind(new.role.as_str())
        .bind(new.password_hash)
        .fetch_one(db)
        .await
    }

    /// Update name/role (and optionally password) by employee id. Returns rows touched.
    pub async fn update_by_employee_id(
        db: &PgPool,
        employee_id: &str,
        name: &str,
        role: Role,
        password_hash: Option<&str>,
    ) -> sqlx::Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET name = $2,
                   role = $3,
                   password_hash = COALESCE($4, password_hash),
                   updated_at = now()
             WHERE employee_id = $1
            "#,
        )
        .bind(employee_id)
        .bind(name)
        .bind(role.as_str())
        .bind(password_hash)
        .execute(db)
        .await?;
        Ok(res.rows_affected())
    }

    /// Insert the bootstrap admin unless a user with that email already exists.
    pub async fn upsert_admin(db: &PgPool, new: NewUser<'_>) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (id, email, employee_id, name, role, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.email)
        .bind(new.employee_id)
        .bind(new.name)
        .bind(new.role.as_str())
        .bind(new.password_hash)
        .execute(db)
        .await
        .context("upsert seed admin")?;
        Ok(res.rows_affected() == 1)
    }
}

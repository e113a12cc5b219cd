use serde::Deserialize;

use super::repo_types::Role;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserRequest {
    pub employee_id: String,
    pub name: String,
    pub password: String,
    pub employee_type: Role,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub employee_id: String,
    pub name: String,
    pub employee_type: Role,
    #[serde(default)]
    pub password: Option<String>,
}

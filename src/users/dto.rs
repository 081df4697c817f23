use serde::{Deserialize, Serialize};

use crate::users::repo_types::{Role, User};

fn default_limit() -> i64 {
    20
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Admin-created account; unlike registration, the role is always honored.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Partial update. Deliberately has no password field: the generic update
/// path cannot change credentials.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_default_paging() {
        let params: ListParams = serde_json::from_str("{}").expect("parse");
        assert_eq!(params.limit, 20);
        assert_eq!(params.offset, 0);
    }

    #[test]
    fn update_request_ignores_a_password_field() {
        // Unknown fields are dropped at deserialization; a password can
        // never reach the update path.
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"name":"B","password":"sneaky-secret"}"#).expect("parse");
        assert_eq!(req.name.as_deref(), Some("B"));
        let json = serde_json::to_string(&serde_json::json!({
            "name": req.name, "email": req.email, "role": req.role, "is_active": req.is_active
        }))
        .unwrap();
        assert!(!json.contains("sneaky"));
    }

    #[test]
    fn create_request_defaults() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@x.com","password":"secret12"}"#,
        )
        .expect("parse");
        assert!(req.role.is_none());
        assert!(req.is_active);
    }
}

use serde::{Deserialize, Serialize};

use crate::users::repo_types::{Role, User};

/// Request body for user registration. The role field is only honored
/// under the registration role policy; see `services::register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for the self-service password change.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Response returned after register, login or a password change.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Response for GET /auth/me.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn register_request_role_defaults_to_none() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@x.com","password":"secret12"}"#,
        )
        .expect("parse");
        assert!(req.role.is_none());
    }

    #[test]
    fn register_request_accepts_an_explicit_role() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@x.com","password":"secret12","role":"admin"}"#,
        )
        .expect("parse");
        assert_eq!(req.role, Some(Role::Admin));
    }

    #[test]
    fn update_password_request_uses_camel_case_fields() {
        let req: UpdatePasswordRequest = serde_json::from_str(
            r#"{"currentPassword":"old","newPassword":"new-secret","confirmPassword":"new-secret"}"#,
        )
        .expect("parse");
        assert_eq!(req.current_password, "old");
        assert_eq!(req.new_password, "new-secret");
    }

    #[test]
    fn auth_response_json_carries_no_password() {
        let now = OffsetDateTime::now_utc();
        let response = AuthResponse {
            user: User {
                id: Uuid::new_v4(),
                name: "A".into(),
                email: "a@x.com".into(),
                role: Role::User,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
            token: "header.claims.sig".into(),
        };
        let json = serde_json::to_string(&response).expect("serialize");
        assert!(json.contains("a@x.com"));
        assert!(json.contains("token"));
        assert!(!json.contains("password"));
    }
}

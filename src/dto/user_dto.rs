use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;
use crate::utils::validation::validate_not_blank;

// Request de auto-registro de usuario
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    #[validate(custom = "validate_not_blank")]
    pub lastname: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 8, message = "La contraseña debe tener al menos 8 caracteres"))]
    pub password: String,
    #[serde(default)]
    pub role_names: Vec<String>,
}

// Response de usuario (sin password)
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub lastname: String,
    pub email: String,
    pub active: bool,
    pub roles: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            lastname: user.last_name,
            email: user.email,
            active: user.active,
            roles: user.roles,
        }
    }
}

// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub password: String,
}

// Login response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

impl LoginResponse {
    pub fn bearer(token: String, expires_in: u64, user: UserResponse) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_request_from_json() {
        let json = r#"{"name":"Ana","lastname":"López","email":"ana@example.com",
                       "password":"secreto123","roleNames":["ROLE_USER"]}"#;
        let request: UserRequest = serde_json::from_str(json).unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(request.role_names, vec!["ROLE_USER".to_string()]);
    }

    #[test]
    fn test_short_password_rejected() {
        let request = UserRequest {
            name: "Ana".to_string(),
            lastname: "López".to_string(),
            email: "ana@example.com".to_string(),
            password: "corta".to_string(),
            role_names: vec![],
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_response_hides_password() {
        let user = User {
            id: 1,
            name: "Ana".to_string(),
            last_name: "López".to_string(),
            email: "ana@example.com".to_string(),
            password: "$2b$04$hash".to_string(),
            active: true,
            roles: vec!["ROLE_USER".to_string()],
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();

        assert_eq!(json["lastname"], "López");
        assert!(json.get("password").is_none());
    }
}

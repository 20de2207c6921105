//! Servicio de autenticación
//!
//! Verifica credenciales contra el hash bcrypt del usuario y emite el JWT
//! que identifica a quien opera en el resto de la API.

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use crate::dto::{LoginRequest, LoginResponse, UserResponse};
use crate::repositories::store::Store;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

const INVALID_CREDENTIALS: &str = "Credenciales inválidas";

/// Servicio de autenticación
pub struct AuthService {
    store: Arc<dyn Store>,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, jwt: JwtConfig) -> Self {
        Self { store, jwt }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        let user = match self.store.find_user_by_email(&email).await? {
            Some(user) if user.active => user,
            Some(_) => {
                warn!("🔒 Login de usuario inactivo: {}", email);
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
            None => {
                warn!("🔒 Login de email desconocido: {}", email);
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        let valid = bcrypt::verify(&request.password, &user.password)
            .map_err(|e| AppError::Hash(format!("Error verificando password: {}", e)))?;
        if !valid {
            warn!("🔒 Password incorrecto para {}", email);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = generate_token(&user.email, &user.roles, &self.jwt)?;
        info!("🔑 Login exitoso: {}", user.email);

        Ok(LoginResponse::bearer(token, self.jwt.expiration, UserResponse::from(user)))
    }
}

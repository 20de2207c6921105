//! Servicio de usuarios
//!
//! Auto-registro y consultas de usuarios. Los passwords se guardan
//! hasheados con bcrypt.

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use crate::dto::{UserRequest, UserResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{NewUser, KNOWN_ROLES, ROLE_ADMIN, ROLE_USER};
use crate::repositories::store::Store;
use crate::utils::errors::{
    conflict_error, forbidden_error, internal_error, not_found_error, AppError, AppResult,
};

pub struct UserService {
    store: Arc<dyn Store>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    pub async fn register_user(&self, request: UserRequest) -> AppResult<UserResponse> {
        request.validate()?;

        let roles = self_assignable_roles(&request.role_names)?;
        let email = request.email.trim().to_lowercase();

        // bcrypt bloquea; se hashea fuera del runtime y antes de abrir la transacción
        let password = request.password.clone();
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| internal_error(&format!("Error hasheando password: {}", e)))?
            .map_err(|e| AppError::Hash(format!("Error hasheando password: {}", e)))?;

        let mut uow = self.store.begin().await?;
        if uow.user_exists(&email).await? {
            return Err(conflict_error("usuario", "email", &email));
        }

        let user = uow
            .insert_user(NewUser {
                name: request.name.trim().to_string(),
                last_name: request.lastname.trim().to_string(),
                email,
                password_hash,
                roles,
            })
            .await?;
        uow.commit().await?;

        info!("👤 Usuario registrado: {}", user.email);
        Ok(user.into())
    }

    /// Listado completo, sólo para administradores
    pub async fn list_users(&self, current: &AuthenticatedUser) -> AppResult<Vec<UserResponse>> {
        if !current.is_admin() {
            warn!("🚫 {} intentó listar usuarios sin {}", current.email, ROLE_ADMIN);
            return Err(forbidden_error("Sólo un administrador puede listar usuarios"));
        }

        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get_user_by_email(&self, email: &str) -> AppResult<UserResponse> {
        self.store
            .find_user_by_email(&email.trim().to_lowercase())
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| not_found_error("Usuario", &format!("email: {}", email)))
    }

    /// `true` si el email ya está registrado
    pub async fn check_repeated_email(&self, email: &str) -> AppResult<bool> {
        self.store.user_exists(&email.trim().to_lowercase()).await
    }
}

/// Roles pedidos sin `ROLE_ADMIN`; si no queda ninguno se asigna `ROLE_USER`
fn self_assignable_roles(requested: &[String]) -> AppResult<Vec<String>> {
    let mut roles: Vec<String> = Vec::new();
    for role in requested.iter().map(|r| r.trim()).filter(|r| !r.is_empty()) {
        if role == ROLE_ADMIN {
            warn!("🚫 Se ignoró {} en un auto-registro", ROLE_ADMIN);
            continue;
        }
        if !KNOWN_ROLES.contains(&role) {
            return Err(AppError::NotFound("Algunos roles no existen".to_string()));
        }
        if !roles.iter().any(|r| r == role) {
            roles.push(role.to_string());
        }
    }

    if roles.is_empty() {
        roles.push(ROLE_USER.to_string());
    }
    Ok(roles)
}

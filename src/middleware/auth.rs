//! Middleware de autenticación JWT
//!
//! Este módulo valida el token `Bearer`, verifica que el usuario siga
//! activo e inyecta el `AuthenticatedUser` en las extensions del request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{
    models::ROLE_ADMIN,
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token},
    },
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub email: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == ROLE_ADMIN)
    }
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt)?;

    // Verificar que el usuario existe y sigue activo
    let user = state
        .store
        .find_user_by_email(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado".to_string()))?;

    if !user.active {
        return Err(AppError::Unauthorized("Usuario inactivo".to_string()));
    }

    request.extensions_mut().insert(AuthenticatedUser {
        email: user.email,
        roles: user.roles,
    });

    Ok(next.run(request).await)
}

//! Modelo de User
//!
//! Usuario del sistema: dueño de los autos, clientes y ventas que registra.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Rol de administrador, no se puede asignar en el auto-registro
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const ROLE_USER: &str = "ROLE_USER";

/// Roles existentes en el sistema
pub const KNOWN_ROLES: [&str; 2] = [ROLE_USER, ROLE_ADMIN];

/// User - mapea exactamente a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub active: bool,
    pub roles: Vec<String>,
}

/// Datos para insertar un usuario; el password ya viene hasheado
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

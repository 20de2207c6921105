//! Modelo de Client

use chrono::NaiveDate;
use sqlx::FromRow;

/// Cliente junto con el email del usuario que lo registró
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub dni: String,
    pub registration_date: NaiveDate,
    pub user_id: i64,
    pub user_email: String,
}

/// Datos para insertar un cliente
#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub dni: String,
    pub registration_date: NaiveDate,
    pub user_id: i64,
}

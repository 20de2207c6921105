//! Modelo de Car
//!
//! Este módulo contiene las marcas, modelos y autos. Las vistas (`CarView`,
//! `ModelView`) son las filas que devuelven las consultas con JOIN a
//! modelo, marca y dueño.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// Estado del auto - mapea al ENUM car_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, PartialOrd, Ord)]
#[sqlx(type_name = "car_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarStatus {
    Available,
    InRepair,
    Sold,
}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Available => "AVAILABLE",
            CarStatus::InRepair => "IN_REPAIR",
            CarStatus::Sold => "SOLD",
        }
    }

    /// Un auto vendido es terminal: no puede venderse de nuevo
    pub fn is_sold(&self) -> bool {
        matches!(self, CarStatus::Sold)
    }
}

/// Marca (ej: Toyota, Fiat)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Brand {
    pub id: i64,
    pub name: String,
}

/// Modelo junto con el nombre de su marca
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct ModelView {
    pub id: i64,
    pub name: String,
    pub brand_id: i64,
    pub brand_name: String,
}

/// Auto con su modelo, marca y dueño resueltos
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct CarView {
    pub id: i64,
    pub license_plate: String,
    pub model_id: i64,
    pub model_name: String,
    pub brand_name: String,
    pub user_id: i64,
    pub user_email: String,
    pub year: i32,
    pub color: String,
    pub base_price: Decimal,
    pub mileage: Decimal,
    pub status: CarStatus,
    pub registration_date: NaiveDate,
}

/// Datos para insertar un auto
#[derive(Debug, Clone)]
pub struct NewCar {
    pub license_plate: String,
    pub model_id: i64,
    pub user_id: i64,
    pub year: i32,
    pub color: String,
    pub base_price: Decimal,
    pub mileage: Decimal,
    pub status: CarStatus,
    pub registration_date: NaiveDate,
}

/// Campos editables de un auto ya registrado
#[derive(Debug, Clone, Default)]
pub struct CarChanges {
    pub base_price: Option<Decimal>,
    pub mileage: Option<Decimal>,
    pub color: Option<String>,
}

impl CarChanges {
    pub fn is_empty(&self) -> bool {
        self.base_price.is_none() && self.mileage.is_none() && self.color.is_none()
    }
}

//! Modelo de Sale
//!
//! La consulta de ventas devuelve una fila plana (`SaleRow`) con las columnas
//! del auto y del cliente prefijadas; `SaleView` es su forma compuesta.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::FromRow;

use super::car::{CarStatus, CarView};
use super::client::Client;

/// Fila plana de la consulta de ventas con JOIN a auto, modelo, marca y cliente
#[derive(Debug, Clone, FromRow)]
pub struct SaleRow {
    pub id: i64,
    pub sale_date: NaiveDateTime,
    pub sale_price: Decimal,
    pub user_id: i64,
    pub user_email: String,

    pub car_id: i64,
    pub car_license_plate: String,
    pub car_model_id: i64,
    pub car_model_name: String,
    pub car_brand_name: String,
    pub car_user_id: i64,
    pub car_user_email: String,
    pub car_year: i32,
    pub car_color: String,
    pub car_base_price: Decimal,
    pub car_mileage: Decimal,
    pub car_status: CarStatus,
    pub car_registration_date: NaiveDate,

    pub client_id: i64,
    pub client_name: String,
    pub client_last_name: String,
    pub client_phone: Option<String>,
    pub client_dni: String,
    pub client_registration_date: NaiveDate,
    pub client_user_id: i64,
    pub client_user_email: String,
}

/// Venta con el auto y el cliente resueltos
#[derive(Debug, Clone, PartialEq)]
pub struct SaleView {
    pub id: i64,
    pub sale_date: NaiveDateTime,
    pub sale_price: Decimal,
    pub user_id: i64,
    pub user_email: String,
    pub car: CarView,
    pub client: Client,
}

impl From<SaleRow> for SaleView {
    fn from(row: SaleRow) -> Self {
        Self {
            id: row.id,
            sale_date: row.sale_date,
            sale_price: row.sale_price,
            user_id: row.user_id,
            user_email: row.user_email,
            car: CarView {
                id: row.car_id,
                license_plate: row.car_license_plate,
                model_id: row.car_model_id,
                model_name: row.car_model_name,
                brand_name: row.car_brand_name,
                user_id: row.car_user_id,
                user_email: row.car_user_email,
                year: row.car_year,
                color: row.car_color,
                base_price: row.car_base_price,
                mileage: row.car_mileage,
                status: row.car_status,
                registration_date: row.car_registration_date,
            },
            client: Client {
                id: row.client_id,
                name: row.client_name,
                last_name: row.client_last_name,
                phone: row.client_phone,
                dni: row.client_dni,
                registration_date: row.client_registration_date,
                user_id: row.client_user_id,
                user_email: row.client_user_email,
            },
        }
    }
}

/// Datos para insertar una venta
#[derive(Debug, Clone)]
pub struct NewSale {
    pub car_id: i64,
    pub client_id: i64,
    pub sale_date: NaiveDateTime,
    pub sale_price: Decimal,
    pub user_id: i64,
}

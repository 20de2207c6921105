//! Búsquedas de ventas
//!
//! El rango de fechas solo se aplica cuando llegan ambos extremos y cubre
//! los días completos: desde las 00:00:00 de `since_date` hasta el último
//! instante de `until_date`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use super::condition::{Case, Condition};
use super::fields::Field;
use crate::utils::validation::non_blank;

/// Filtros opcionales del buscador de ventas
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleFilters {
    pub since_date: Option<NaiveDate>,
    pub until_date: Option<NaiveDate>,
    pub client_query: Option<String>,
    pub car_query: Option<String>,
}

pub fn sale_search(filters: &SaleFilters, owner_email: Option<&str>) -> Condition {
    let mut condition = Condition::all();

    if let Some(email) = non_blank(owner_email) {
        condition = condition.and(Condition::text_equals(Field::SaleOwnerEmail, email));
    }

    if let (Some(since), Some(until)) = (filters.since_date, filters.until_date) {
        let (from, to) = day_range(since, until);
        condition = condition.and(Condition::between(Field::SaleDate, from, to));
    }

    if let Some(query) = non_blank(filters.client_query.as_deref()) {
        condition = condition.and(Condition::any(vec![
            Condition::contains(Field::ClientDni, query, Case::Sensitive),
            Condition::contains(Field::ClientName, query, Case::Insensitive),
            Condition::contains(Field::ClientLastName, query, Case::Insensitive),
        ]));
    }

    // patente, modelo y marca se comparan tal cual se escribieron
    if let Some(query) = non_blank(filters.car_query.as_deref()) {
        condition = condition.and(Condition::any(vec![
            Condition::contains(Field::LicensePlate, query, Case::Sensitive),
            Condition::contains(Field::ModelName, query, Case::Sensitive),
            Condition::contains(Field::BrandName, query, Case::Sensitive),
        ]));
    }

    condition
}

/// Ventas de un cliente identificado por DNI exacto
pub fn by_client_dni(dni: &str) -> Condition {
    Condition::all().and(Condition::text_equals(Field::ClientDni, dni.trim()))
}

/// Desde el inicio de `since` hasta el último microsegundo de `until`,
/// la precisión de `timestamp` en PostgreSQL
pub fn day_range(since: NaiveDate, until: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let end_of_day = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
    (since.and_time(NaiveTime::MIN), until.and_time(end_of_day))
}

pub fn sale_sort_field(property: &str) -> Option<Field> {
    match property {
        "id" => Some(Field::SaleId),
        "saleDate" => Some(Field::SaleDate),
        "salePrice" => Some(Field::SalePrice),
        "licensePlate" | "car.licensePlate" => Some(Field::LicensePlate),
        "clientName" | "client.name" => Some(Field::ClientName),
        "clientLastName" | "client.lastName" => Some(Field::ClientLastName),
        "clientDni" | "client.dni" => Some(Field::ClientDni),
        _ => None,
    }
}

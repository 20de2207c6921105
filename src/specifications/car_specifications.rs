//! Búsquedas de autos
//!
//! Este módulo arma las condiciones del buscador de autos y del listado de
//! autos disponibles. Los filtros en blanco se ignoran.

use serde::Deserialize;

use super::condition::{Case, Condition};
use super::fields::Field;
use crate::models::CarStatus;
use crate::utils::validation::{non_blank, normalize_license_plate};

/// Filtros opcionales del buscador de autos
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarFilters {
    pub license_plate: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
}

/// Patente, marca y modelo por subcadena sin distinguir mayúsculas, más el
/// dueño exacto si se indica.
pub fn car_search(filters: &CarFilters, owner_email: Option<&str>) -> Condition {
    let mut condition = Condition::all();

    if let Some(email) = non_blank(owner_email) {
        condition = condition.and(Condition::text_equals(Field::CarOwnerEmail, email));
    }
    if let Some(plate) = non_blank(filters.license_plate.as_deref()) {
        condition = condition.and(Condition::contains(
            Field::LicensePlate,
            normalize_license_plate(plate),
            Case::Insensitive,
        ));
    }
    if let Some(brand) = non_blank(filters.brand.as_deref()) {
        condition = condition.and(Condition::contains(Field::BrandName, brand, Case::Insensitive));
    }
    if let Some(model) = non_blank(filters.model.as_deref()) {
        condition = condition.and(Condition::contains(Field::ModelName, model, Case::Insensitive));
    }

    condition
}

/// Autos disponibles cuya patente, modelo o marca contienen `car_query`.
/// Sin texto devuelve todos los disponibles.
pub fn available_car_query(car_query: Option<&str>) -> Condition {
    let available = Condition::all().and(Condition::status_equals(CarStatus::Available));

    match non_blank(car_query) {
        Some(query) => available.and(Condition::any(vec![
            Condition::contains(Field::LicensePlate, query, Case::Insensitive),
            Condition::contains(Field::ModelName, query, Case::Insensitive),
            Condition::contains(Field::BrandName, query, Case::Insensitive),
        ])),
        None => available,
    }
}

/// Patente exacta, opcionalmente limitada a un dueño
pub fn by_license_plate(plate: &str, owner_email: Option<&str>) -> Condition {
    let condition = Condition::all().and(Condition::text_equals(Field::LicensePlate, plate));
    match non_blank(owner_email) {
        Some(email) => condition.and(Condition::text_equals(Field::CarOwnerEmail, email)),
        None => condition,
    }
}

/// Propiedades por las que se puede ordenar un listado de autos
pub fn car_sort_field(property: &str) -> Option<Field> {
    match property {
        "id" => Some(Field::CarId),
        "licensePlate" => Some(Field::LicensePlate),
        "model" | "modelName" => Some(Field::ModelName),
        "brand" | "brandName" => Some(Field::BrandName),
        "userEmail" => Some(Field::CarOwnerEmail),
        "year" => Some(Field::CarYear),
        "color" => Some(Field::CarColor),
        "basePrice" => Some(Field::BasePrice),
        "mileage" => Some(Field::Mileage),
        "status" => Some(Field::CarStatus),
        "registrationDate" => Some(Field::CarRegistrationDate),
        _ => None,
    }
}

//! Utilidades de validación
//!
//! Este módulo contiene las expresiones regulares y validadores
//! personalizados que usan los DTOs de entrada.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

lazy_static! {
    /// Patente: 'AB 123 CD' (formato Mercosur) o 'NVZ 087' (formato anterior), espacios opcionales
    pub static ref LICENSE_PLATE_RE: Regex =
        Regex::new(r"^([A-Za-z]{2}\s?\d{3}\s?[A-Za-z]{2}|[A-Za-z]{3}\s?\d{3})$")
            .expect("license plate regex");

    /// DNI: entre 7 y 8 dígitos
    pub static ref DNI_RE: Regex = Regex::new(r"^[0-9]{7,8}$").expect("dni regex");
}

/// Validar que un importe no sea negativo
pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.message = Some("El valor debe ser mayor o igual a 0".into());
        error.add_param("actual".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.message = Some("El valor no puede estar vacío".into());
        return Err(error);
    }
    Ok(())
}

/// Forma canónica de una patente: mayúsculas y sin espacios ('ab 123 cd' -> 'AB123CD')
pub fn normalize_license_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Devuelve el texto recortado solo si tiene contenido.
///
/// Los filtros de búsqueda tratan `None`, `""` y los espacios como ausentes.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

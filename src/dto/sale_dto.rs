use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::car_dto::CarResponse;
use super::client_dto::ClientResponse;
use crate::models::SaleView;
use crate::utils::validation::{validate_non_negative, DNI_RE};

// Request para registrar una venta a un cliente existente
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostSaleDto {
    pub car_id: i64,
    #[validate(custom = "validate_non_negative")]
    pub sale_price: Decimal,
    pub client_id: i64,
}

// Request para registrar una venta dando de alta al cliente
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostSaleWithClientDto {
    pub car_id: i64,
    #[validate(custom = "validate_non_negative")]
    pub sale_price: Decimal,
    #[validate(length(min = 1, max = 50, message = "El nombre debe tener entre 1 y 50 caracteres"))]
    pub client_name: String,
    #[validate(length(min = 1, max = 50, message = "El apellido debe tener entre 1 y 50 caracteres"))]
    pub client_last_name: String,
    pub client_phone: Option<String>,
    #[validate(regex(path = "DNI_RE", message = "El DNI debe tener 7 u 8 dígitos"))]
    pub client_dni: String,
}

// Response de venta con auto y cliente embebidos
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: i64,
    pub car: CarResponse,
    pub client: ClientResponse,
    pub sale_date: NaiveDateTime,
    pub sale_price: Decimal,
}

impl From<SaleView> for SaleResponse {
    fn from(sale: SaleView) -> Self {
        Self {
            id: sale.id,
            car: sale.car.into(),
            client: sale.client.into(),
            sale_date: sale.sale_date,
            sale_price: sale.sale_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PostSaleWithClientDto {
        PostSaleWithClientDto {
            car_id: 1,
            sale_price: Decimal::new(2_000_000, 0),
            client_name: "Juan".to_string(),
            client_last_name: "Pérez".to_string(),
            client_phone: None,
            client_dni: "12345678".to_string(),
        }
    }

    #[test]
    fn test_valid_sale_with_client() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_dni_must_have_seven_or_eight_digits() {
        for dni in ["123456", "123456789", "12a45678"] {
            let invalid = PostSaleWithClientDto {
                client_dni: dni.to_string(),
                ..request()
            };
            assert!(invalid.validate().is_err(), "DNI {} debería ser inválido", dni);
        }
        let seven = PostSaleWithClientDto {
            client_dni: "1234567".to_string(),
            ..request()
        };
        assert!(seven.validate().is_ok());
    }

    #[test]
    fn test_client_name_length() {
        let invalid = PostSaleWithClientDto {
            client_name: String::new(),
            client_last_name: "x".repeat(51),
            ..request()
        };
        let errors = invalid.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("client_name"));
        assert!(errors.field_errors().contains_key("client_last_name"));
    }

    #[test]
    fn test_negative_sale_price_rejected() {
        let sale = PostSaleDto {
            car_id: 1,
            sale_price: Decimal::new(-5, 0),
            client_id: 1,
        };
        assert!(sale.validate().is_err());
    }
}

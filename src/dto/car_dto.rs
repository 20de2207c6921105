use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{CarChanges, CarStatus, CarView, ModelView};
use crate::utils::validation::{validate_non_negative, validate_not_blank, LICENSE_PLATE_RE};

// Request para registrar un auto
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostCarDto {
    #[validate(regex(path = "LICENSE_PLATE_RE", message = "Formato de patente inválido"))]
    pub license_plate: String,
    pub model_id: i64,
    #[validate(email(message = "Email inválido"))]
    pub user_email: String,
    #[validate(range(min = 1800, max = 2100, message = "Año fuera de rango"))]
    pub year: i32,
    #[validate(custom = "validate_not_blank")]
    pub color: String,
    #[validate(custom = "validate_non_negative")]
    pub base_price: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub mileage: Decimal,
}

// Request para editar precio, kilometraje o color
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCarDto {
    pub id: i64,
    #[validate(custom = "validate_non_negative")]
    pub base_price: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub mileage: Option<Decimal>,
    #[validate(custom = "validate_not_blank")]
    pub color: Option<String>,
}

impl UpdateCarDto {
    pub fn changes(&self) -> CarChanges {
        CarChanges {
            base_price: self.base_price,
            mileage: self.mileage,
            color: self.color.as_ref().map(|c| c.trim().to_string()),
        }
    }
}

// Texto libre del listado de autos disponibles
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarQueryParams {
    pub car_query: Option<String>,
}

// Response de auto
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarResponse {
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

impl From<CarView> for CarResponse {
    fn from(car: CarView) -> Self {
        Self {
            id: car.id,
            license_plate: car.license_plate,
            model_id: car.model_id,
            model_name: car.model_name,
            brand_name: car.brand_name,
            user_id: car.user_id,
            user_email: car.user_email,
            year: car.year,
            color: car.color,
            base_price: car.base_price,
            mileage: car.mileage,
            status: car.status,
            registration_date: car.registration_date,
        }
    }
}

impl From<CarResponse> for CarView {
    fn from(car: CarResponse) -> Self {
        Self {
            id: car.id,
            license_plate: car.license_plate,
            model_id: car.model_id,
            model_name: car.model_name,
            brand_name: car.brand_name,
            user_id: car.user_id,
            user_email: car.user_email,
            year: car.year,
            color: car.color,
            base_price: car.base_price,
            mileage: car.mileage,
            status: car.status,
            registration_date: car.registration_date,
        }
    }
}

// Response de modelo con su marca
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    pub id: i64,
    pub name: String,
    pub brand_name: String,
}

impl From<ModelView> for ModelResponse {
    fn from(model: ModelView) -> Self {
        Self {
            id: model.id,
            name: model.name,
            brand_name: model.brand_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> PostCarDto {
        PostCarDto {
            license_plate: "AB 123 CD".to_string(),
            model_id: 1,
            user_email: "ana@example.com".to_string(),
            year: 2020,
            color: "Rojo".to_string(),
            base_price: Decimal::new(1_500_000, 0),
            mileage: Decimal::ZERO,
        }
    }

    #[test]
    fn test_valid_car_request() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_invalid_plate_and_negative_price() {
        let request = PostCarDto {
            license_plate: "1234".to_string(),
            base_price: Decimal::new(-1, 0),
            ..valid_request()
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("license_plate"));
        assert!(fields.contains_key("base_price"));
    }

    #[test]
    fn test_blank_color_rejected() {
        let request = PostCarDto {
            color: "  ".to_string(),
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_only_carries_given_fields() {
        let update = UpdateCarDto {
            id: 7,
            base_price: None,
            mileage: Some(Decimal::new(12_000, 0)),
            color: Some(" Azul ".to_string()),
        };
        assert!(update.validate().is_ok());

        let changes = update.changes();
        assert_eq!(changes.base_price, None);
        assert_eq!(changes.mileage, Some(Decimal::new(12_000, 0)));
        assert_eq!(changes.color.as_deref(), Some("Azul"));
    }

    #[test]
    fn test_response_deserializes_camel_case() {
        let json = r#"{
            "id": 3, "licensePlate": "AB123CD", "modelId": 2, "modelName": "Cronos",
            "brandName": "Fiat", "userId": 1, "userEmail": "ana@example.com",
            "year": 2021, "color": "Gris", "basePrice": "1800000", "mileage": 100,
            "status": "IN_REPAIR", "registrationDate": "2024-05-01"
        }"#;
        let response: CarResponse = serde_json::from_str(json).unwrap();
        let view = CarView::from(response.clone());

        assert_eq!(view.status, CarStatus::InRepair);
        assert_eq!(view.mileage, Decimal::new(100, 0));
        assert_eq!(CarResponse::from(view), response);
    }
}

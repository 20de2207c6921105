//! Servicio de autos
//!
//! Alta, edición y búsquedas de autos, más los catálogos de marcas y
//! modelos.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use validator::Validate;

use super::authorization_service::AuthorizationService;
use crate::dto::{CarResponse, ModelResponse, Page, PageRequest, PostCarDto, UpdateCarDto};
use crate::models::{Brand, CarStatus, NewCar};
use crate::repositories::store::Store;
use crate::specifications::car_specifications::{available_car_query, CarFilters};
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::validation::normalize_license_plate;

pub struct CarService {
    store: Arc<dyn Store>,
    guard: AuthorizationService,
}

impl CarService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            guard: AuthorizationService::new(),
        }
    }

    /// Registra un auto disponible a nombre de quien opera
    pub async fn create_car(&self, request: PostCarDto, acting_email: &str) -> AppResult<CarResponse> {
        request.validate()?;

        let mut uow = self.store.begin().await?;
        let (owner, model) = self
            .guard
            .authorize_car_registration(uow.as_mut(), &request, acting_email)
            .await?;

        let car = uow
            .insert_car(NewCar {
                license_plate: normalize_license_plate(&request.license_plate),
                model_id: model.id,
                user_id: owner.id,
                year: request.year,
                color: request.color.trim().to_string(),
                base_price: request.base_price,
                mileage: request.mileage,
                status: CarStatus::Available,
                registration_date: Utc::now().date_naive(),
            })
            .await?;
        uow.commit().await?;

        info!("🚗 Auto {} registrado por {}", car.license_plate, acting_email);
        Ok(car.into())
    }

    /// Cambia precio, kilometraje o color de un auto propio
    pub async fn update_car(&self, request: UpdateCarDto, acting_email: &str) -> AppResult<CarResponse> {
        request.validate()?;

        let mut uow = self.store.begin().await?;
        let car = uow
            .lock_car(request.id)
            .await?
            .ok_or_else(|| not_found_error("Auto", &format!("ID: {}", request.id)))?;
        self.guard.authorize_car_update(&car, acting_email)?;

        let updated = uow.update_car_details(car.id, &request.changes()).await?;
        uow.commit().await?;

        info!("✏️ Auto {} actualizado por {}", updated.license_plate, acting_email);
        Ok(updated.into())
    }

    /// Búsqueda paginada sobre los autos de quien opera
    pub async fn search_cars(
        &self,
        filters: &CarFilters,
        acting_email: &str,
        page: &PageRequest,
    ) -> AppResult<Page<CarResponse>> {
        let condition = self.guard.car_search_scope(filters, acting_email);
        let cars = self.store.search_cars(&condition, page).await?;
        Ok(cars.map(CarResponse::from))
    }

    /// Autos disponibles de cualquier dueño que coinciden con el texto
    pub async fn available_cars(&self, car_query: Option<&str>) -> AppResult<Vec<CarResponse>> {
        let cars = self
            .store
            .list_cars(&available_car_query(car_query), &[])
            .await?;
        Ok(cars.into_iter().map(CarResponse::from).collect())
    }

    pub async fn list_models(&self) -> AppResult<Vec<ModelResponse>> {
        let models = self.store.list_models().await?;
        Ok(models.into_iter().map(ModelResponse::from).collect())
    }

    pub async fn list_brands(&self) -> AppResult<Vec<Brand>> {
        self.store.list_brands().await
    }

    /// Indica si quien opera ya tiene un auto con esa patente
    pub async fn exists_license_plate(&self, plate: &str, acting_email: &str) -> AppResult<bool> {
        self.store
            .car_exists(&self.guard.license_plate_scope(plate, acting_email))
            .await
    }
}

//! Servicio de autorización
//!
//! Este módulo concentra las reglas de propiedad: quién puede registrar o
//! editar un auto, qué se necesita para vender, y el filtro por dueño que
//! se agrega a todas las búsquedas acotadas al usuario que opera.

use tracing::warn;

use crate::dto::PostCarDto;
use crate::models::{CarView, ModelView, User};
use crate::repositories::store::UnitOfWork;
use crate::specifications::car_specifications::{self, CarFilters};
use crate::specifications::client_specifications;
use crate::specifications::sale_specifications::{self, SaleFilters};
use crate::specifications::{Condition, Field};
use crate::utils::errors::{conflict_error, forbidden_error, not_found_error, AppError, AppResult};
use crate::utils::validation::{non_blank, normalize_license_plate};

pub const CANNOT_SAVE_CAR: &str = "No tienes permiso para guardar este vehículo";
pub const CANNOT_EDIT_CAR: &str = "No tienes permiso para editar este vehículo";
pub const CAR_ALREADY_SOLD: &str = "Auto ya vendido.";

/// Servicio de autorización para verificar propiedad y reglas de alta
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationService;

impl AuthorizationService {
    pub fn new() -> Self {
        Self
    }

    /// Verifica si el usuario que opera es el dueño indicado
    pub fn is_owner(&self, owner_email: &str, acting_email: &str) -> bool {
        owner_email == acting_email
    }

    /// Reglas de alta de un auto: el dueño del request debe ser quien opera,
    /// el modelo y el usuario deben existir y la patente no puede estar
    /// registrada por nadie.
    pub async fn authorize_car_registration(
        &self,
        uow: &mut dyn UnitOfWork,
        request: &PostCarDto,
        acting_email: &str,
    ) -> AppResult<(User, ModelView)> {
        if !self.is_owner(&request.user_email, acting_email) {
            warn!(
                "🚫 {} intentó registrar un auto a nombre de {}",
                acting_email, request.user_email
            );
            return Err(forbidden_error(CANNOT_SAVE_CAR));
        }

        let model = uow
            .find_model(request.model_id)
            .await?
            .ok_or_else(|| not_found_error("Modelo", &format!("ID: {}", request.model_id)))?;

        let owner = uow
            .find_user_by_email(&request.user_email)
            .await?
            .ok_or_else(|| not_found_error("Usuario", &format!("email: {}", request.user_email)))?;

        let plate = normalize_license_plate(&request.license_plate);
        if uow
            .car_exists(&car_specifications::by_license_plate(&plate, None))
            .await?
        {
            return Err(conflict_error("auto", "patente", &plate));
        }

        Ok((owner, model))
    }

    /// Solo el dueño puede editar un auto
    pub fn authorize_car_update(&self, car: &CarView, acting_email: &str) -> AppResult<()> {
        if !self.is_owner(&car.user_email, acting_email) {
            warn!("🚫 {} intentó editar el auto {} de otro usuario", acting_email, car.id);
            return Err(forbidden_error(CANNOT_EDIT_CAR));
        }
        Ok(())
    }

    /// Resuelve quién vende y bloquea el auto a vender, que no puede estar vendido
    pub async fn authorize_sale(
        &self,
        uow: &mut dyn UnitOfWork,
        car_id: i64,
        acting_email: &str,
    ) -> AppResult<(User, CarView)> {
        let seller = uow
            .find_user_by_email(acting_email)
            .await?
            .ok_or_else(|| not_found_error("Usuario", &format!("email: {}", acting_email)))?;

        let car = uow
            .lock_car(car_id)
            .await?
            .ok_or_else(|| not_found_error("Auto", &format!("ID: {}", car_id)))?;

        if car.status.is_sold() {
            return Err(AppError::BusinessRule(CAR_ALREADY_SOLD.to_string()));
        }

        Ok((seller, car))
    }

    /// El DNI y, si viene, el teléfono de un cliente nuevo no pueden existir
    pub async fn ensure_new_client_is_unique(
        &self,
        uow: &mut dyn UnitOfWork,
        dni: &str,
        phone: Option<&str>,
    ) -> AppResult<()> {
        if uow.client_exists(&client_specifications::by_dni(dni, None)).await? {
            return Err(conflict_error("cliente", "DNI", dni));
        }
        if let Some(phone) = non_blank(phone) {
            if uow
                .client_exists(&client_specifications::by_phone(phone, None))
                .await?
            {
                return Err(conflict_error("cliente", "teléfono", phone));
            }
        }
        Ok(())
    }

    // Búsquedas acotadas al usuario que opera

    pub fn car_search_scope(&self, filters: &CarFilters, acting_email: &str) -> Condition {
        car_specifications::car_search(filters, None).and(owner_guard(Field::CarOwnerEmail, acting_email))
    }

    pub fn sale_search_scope(&self, filters: &SaleFilters, acting_email: &str) -> Condition {
        sale_specifications::sale_search(filters, None).and(owner_guard(Field::SaleOwnerEmail, acting_email))
    }

    pub fn client_search_scope(&self, filter: Option<&str>, acting_email: &str) -> Condition {
        client_specifications::client_search(filter, None)
            .and(owner_guard(Field::ClientOwnerEmail, acting_email))
    }

    pub fn license_plate_scope(&self, plate: &str, acting_email: &str) -> Condition {
        car_specifications::by_license_plate(&normalize_license_plate(plate), None)
            .and(owner_guard(Field::CarOwnerEmail, acting_email))
    }

    pub fn client_dni_scope(&self, dni: &str, acting_email: &str) -> Condition {
        client_specifications::by_dni(dni, None).and(owner_guard(Field::ClientOwnerEmail, acting_email))
    }

    pub fn client_phone_scope(&self, phone: &str, acting_email: &str) -> Condition {
        client_specifications::by_phone(phone, None)
            .and(owner_guard(Field::ClientOwnerEmail, acting_email))
    }
}

/// Igualdad exacta con el email de quien opera; un email vacío no encuentra nada
fn owner_guard(field: Field, acting_email: &str) -> Condition {
    Condition::text_equals(field, acting_email)
}

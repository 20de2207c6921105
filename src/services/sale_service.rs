//! Servicio de ventas
//!
//! Una venta marca el auto como SOLD e inserta la venta (y el cliente nuevo,
//! si corresponde) dentro de la misma unidad de trabajo.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use validator::Validate;

use super::authorization_service::{AuthorizationService, CAR_ALREADY_SOLD};
use crate::dto::{Page, PageRequest, PostSaleDto, PostSaleWithClientDto, SaleResponse, SortDirection, SortOrder};
use crate::models::{Client, NewClient, NewSale, User};
use crate::repositories::store::{Store, UnitOfWork};
use crate::specifications::sale_specifications::{by_client_dni, SaleFilters};
use crate::specifications::Field;
use crate::utils::errors::{internal_error, not_found_error, AppError, AppResult};
use crate::utils::validation::non_blank;

pub struct SaleService {
    store: Arc<dyn Store>,
    guard: AuthorizationService,
}

impl SaleService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            guard: AuthorizationService::new(),
        }
    }

    /// Vende un auto dando de alta al cliente en la misma operación
    pub async fn save_sale_with_client(
        &self,
        request: PostSaleWithClientDto,
        acting_email: &str,
    ) -> AppResult<SaleResponse> {
        request.validate()?;

        let mut uow = self.store.begin().await?;
        let (seller, car) = self
            .guard
            .authorize_sale(uow.as_mut(), request.car_id, acting_email)
            .await?;

        let dni = request.client_dni.trim().to_string();
        let phone = non_blank(request.client_phone.as_deref()).map(str::to_string);
        self.guard
            .ensure_new_client_is_unique(uow.as_mut(), &dni, phone.as_deref())
            .await?;

        let client = uow
            .insert_client(NewClient {
                name: request.client_name.trim().to_string(),
                last_name: request.client_last_name.trim().to_string(),
                phone,
                dni,
                registration_date: Utc::now().date_naive(),
                user_id: seller.id,
            })
            .await?;

        let sale = record_sale(uow, &seller, car.id, &client, request.sale_price).await?;
        info!(
            "💰 Venta {} registrada por {} (auto {}, cliente nuevo {})",
            sale.id, acting_email, sale.car.license_plate, sale.client.dni
        );
        Ok(sale)
    }

    /// Vende un auto a un cliente ya registrado
    pub async fn save_sale(&self, request: PostSaleDto, acting_email: &str) -> AppResult<SaleResponse> {
        request.validate()?;

        let mut uow = self.store.begin().await?;
        let (seller, car) = self
            .guard
            .authorize_sale(uow.as_mut(), request.car_id, acting_email)
            .await?;

        let client = uow
            .find_client(request.client_id)
            .await?
            .ok_or_else(|| not_found_error("Cliente", &format!("ID: {}", request.client_id)))?;

        let sale = record_sale(uow, &seller, car.id, &client, request.sale_price).await?;
        info!(
            "💰 Venta {} registrada por {} (auto {}, cliente {})",
            sale.id, acting_email, sale.car.license_plate, sale.client.dni
        );
        Ok(sale)
    }

    /// Búsqueda paginada sobre las ventas de quien opera
    pub async fn search_sales(
        &self,
        filters: &SaleFilters,
        acting_email: &str,
        page: &PageRequest,
    ) -> AppResult<Page<SaleResponse>> {
        let condition = self.guard.sale_search_scope(filters, acting_email);
        let sales = self.store.search_sales(&condition, page).await?;
        Ok(sales.map(SaleResponse::from))
    }

    /// Todas las ventas del cliente con ese DNI, de cualquier vendedor, de la
    /// más reciente a la más antigua
    pub async fn sales_by_client_dni(&self, dni: &str) -> AppResult<Vec<SaleResponse>> {
        let newest_first = [SortOrder {
            field: Field::SaleDate,
            direction: SortDirection::Desc,
        }];
        let sales = self
            .store
            .list_sales(&by_client_dni(dni), &newest_first)
            .await?;
        Ok(sales.into_iter().map(SaleResponse::from).collect())
    }
}

/// Marca el auto como vendido, inserta la venta y confirma la unidad de trabajo
async fn record_sale(
    mut uow: Box<dyn UnitOfWork>,
    seller: &User,
    car_id: i64,
    client: &Client,
    sale_price: Decimal,
) -> AppResult<SaleResponse> {
    if !uow.mark_car_sold(car_id).await? {
        warn!("⚠️ El auto {} se vendió durante la operación", car_id);
        return Err(AppError::BusinessRule(CAR_ALREADY_SOLD.to_string()));
    }

    let sale_id = uow
        .insert_sale(NewSale {
            car_id,
            client_id: client.id,
            sale_date: Utc::now().naive_utc(),
            sale_price,
            user_id: seller.id,
        })
        .await?;

    let sale = uow
        .find_sale(sale_id)
        .await?
        .ok_or_else(|| internal_error("La venta recién creada no se pudo leer"))?;
    uow.commit().await?;

    Ok(sale.into())
}

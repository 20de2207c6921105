//! Store en memoria para tests
//!
//! Guarda las tablas normalizadas detrás de un `tokio::sync::Mutex`. Cada
//! `UnitOfWork` toma el lock durante toda su vida y trabaja sobre una copia
//! del estado, que solo se publica en `commit`. Aplica las mismas
//! restricciones de unicidad que el esquema SQL y evalúa las mismas
//! `Condition` que el store PostgreSQL.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::store::{Store, UnitOfWork};
use crate::dto::page_dto::{Page, PageRequest, SortDirection, SortOrder};
use crate::models::{
    Brand, CarChanges, CarStatus, CarView, Client, ModelView, NewCar, NewClient, NewSale, NewUser,
    SaleView, User,
};
use crate::specifications::{Condition, Field, Searchable};
use crate::utils::errors::{not_found_error, unique_violation_error, AppResult};

#[derive(Debug, Clone)]
struct ModelRow {
    id: i64,
    name: String,
    brand_id: i64,
}

#[derive(Debug, Clone)]
struct CarRow {
    id: i64,
    license_plate: String,
    model_id: i64,
    user_id: i64,
    year: i32,
    color: String,
    base_price: Decimal,
    mileage: Decimal,
    status: CarStatus,
    registration_date: NaiveDate,
}

#[derive(Debug, Clone)]
struct ClientRow {
    id: i64,
    name: String,
    last_name: String,
    phone: Option<String>,
    dni: String,
    registration_date: NaiveDate,
    user_id: i64,
}

#[derive(Debug, Clone)]
struct SaleRecord {
    id: i64,
    sale: NewSale,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: Vec<User>,
    brands: Vec<Brand>,
    models: Vec<ModelRow>,
    cars: Vec<CarRow>,
    clients: Vec<ClientRow>,
    sales: Vec<SaleRecord>,
    last_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn user(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users.iter().find(|u| u.email == email).cloned()
    }

    fn model_view(&self, id: i64) -> Option<ModelView> {
        let model = self.models.iter().find(|m| m.id == id)?;
        let brand = self.brands.iter().find(|b| b.id == model.brand_id)?;
        Some(ModelView {
            id: model.id,
            name: model.name.clone(),
            brand_id: brand.id,
            brand_name: brand.name.clone(),
        })
    }

    fn car_view(&self, row: &CarRow) -> Option<CarView> {
        let model = self.model_view(row.model_id)?;
        let owner = self.user(row.user_id)?;
        Some(CarView {
            id: row.id,
            license_plate: row.license_plate.clone(),
            model_id: model.id,
            model_name: model.name,
            brand_name: model.brand_name,
            user_id: owner.id,
            user_email: owner.email.clone(),
            year: row.year,
            color: row.color.clone(),
            base_price: row.base_price,
            mileage: row.mileage,
            status: row.status,
            registration_date: row.registration_date,
        })
    }

    fn find_car(&self, id: i64) -> Option<CarView> {
        self.cars
            .iter()
            .find(|c| c.id == id)
            .and_then(|row| self.car_view(row))
    }

    fn car_views(&self) -> Vec<CarView> {
        self.cars.iter().filter_map(|row| self.car_view(row)).collect()
    }

    fn client_view(&self, row: &ClientRow) -> Option<Client> {
        let owner = self.user(row.user_id)?;
        Some(Client {
            id: row.id,
            name: row.name.clone(),
            last_name: row.last_name.clone(),
            phone: row.phone.clone(),
            dni: row.dni.clone(),
            registration_date: row.registration_date,
            user_id: owner.id,
            user_email: owner.email.clone(),
        })
    }

    fn find_client(&self, id: i64) -> Option<Client> {
        self.clients
            .iter()
            .find(|c| c.id == id)
            .and_then(|row| self.client_view(row))
    }

    fn client_views(&self) -> Vec<Client> {
        self.clients
            .iter()
            .filter_map(|row| self.client_view(row))
            .collect()
    }

    fn sale_view(&self, record: &SaleRecord) -> Option<SaleView> {
        let operator = self.user(record.sale.user_id)?;
        Some(SaleView {
            id: record.id,
            sale_date: record.sale.sale_date,
            sale_price: record.sale.sale_price,
            user_id: operator.id,
            user_email: operator.email.clone(),
            car: self.find_car(record.sale.car_id)?,
            client: self.find_client(record.sale.client_id)?,
        })
    }

    fn find_sale(&self, id: i64) -> Option<SaleView> {
        self.sales
            .iter()
            .find(|s| s.id == id)
            .and_then(|record| self.sale_view(record))
    }

    fn sale_views(&self) -> Vec<SaleView> {
        self.sales
            .iter()
            .filter_map(|record| self.sale_view(record))
            .collect()
    }

    fn insert_user(&mut self, user: NewUser) -> AppResult<User> {
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(unique_violation_error(Some("users_email_key")));
        }
        let stored = User {
            id: self.next_id(),
            name: user.name,
            last_name: user.last_name,
            email: user.email,
            password: user.password_hash,
            active: true,
            roles: user.roles,
        };
        self.users.push(stored.clone());
        Ok(stored)
    }

    fn insert_car(&mut self, car: NewCar) -> AppResult<CarView> {
        if self.cars.iter().any(|c| c.license_plate == car.license_plate) {
            return Err(unique_violation_error(Some("cars_license_plate_key")));
        }
        let id = self.next_id();
        self.cars.push(CarRow {
            id,
            license_plate: car.license_plate,
            model_id: car.model_id,
            user_id: car.user_id,
            year: car.year,
            color: car.color,
            base_price: car.base_price,
            mileage: car.mileage,
            status: car.status,
            registration_date: car.registration_date,
        });
        self.find_car(id)
            .ok_or_else(|| not_found_error("Auto", &format!("ID: {}", id)))
    }

    fn insert_client(&mut self, client: NewClient) -> AppResult<Client> {
        if self.clients.iter().any(|c| c.dni == client.dni) {
            return Err(unique_violation_error(Some("clients_dni_key")));
        }
        if client.phone.is_some() && self.clients.iter().any(|c| c.phone == client.phone) {
            return Err(unique_violation_error(Some("clients_phone_key")));
        }
        let id = self.next_id();
        self.clients.push(ClientRow {
            id,
            name: client.name,
            last_name: client.last_name,
            phone: client.phone,
            dni: client.dni,
            registration_date: client.registration_date,
            user_id: client.user_id,
        });
        self.find_client(id)
            .ok_or_else(|| not_found_error("Cliente", &format!("ID: {}", id)))
    }

    fn insert_sale(&mut self, sale: NewSale) -> i64 {
        let id = self.next_id();
        self.sales.push(SaleRecord { id, sale });
        id
    }
}

/// Compara dos registros según el orden pedido y desempata por id
fn compare<R: Searchable>(a: &R, b: &R, sort: &[SortOrder], id: Field) -> Ordering {
    for order in sort {
        let ordering = a
            .value(order.field)
            .partial_cmp(&b.value(order.field))
            .unwrap_or(Ordering::Equal);
        let ordering = match order.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.value(id)
        .partial_cmp(&b.value(id))
        .unwrap_or(Ordering::Equal)
}

fn filter_sorted<R: Searchable>(records: Vec<R>, condition: &Condition, sort: &[SortOrder], id: Field) -> Vec<R> {
    let mut matching: Vec<R> = records
        .into_iter()
        .filter(|record| condition.matches(record))
        .collect();
    matching.sort_by(|a, b| compare(a, b, sort, id));
    matching
}

fn paginate<R: Searchable>(records: Vec<R>, condition: &Condition, page: &PageRequest, id: Field) -> Page<R> {
    let matching = filter_sorted(records, condition, &page.sort, id);
    let total = matching.len() as i64;
    let content = matching
        .into_iter()
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(page.size).unwrap_or(0))
        .collect();
    Page::new(content, page, total)
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store con las mismas marcas y modelos que carga la migración inicial
    pub async fn with_catalog() -> Self {
        let store = Self::new();
        let catalog = [
            ("Fiat", ["Cronos", "Argo", "Toro"]),
            ("Renault", ["Sandero", "Kangoo", "Duster"]),
            ("Toyota", ["Corolla", "Hilux", "Etios"]),
            ("Ford", ["Ranger", "Focus", "Territory"]),
            ("Volkswagen", ["Gol", "Amarok", "Taos"]),
        ];
        for (brand, models) in catalog {
            let brand_id = store.seed_brand(brand).await;
            for model in models {
                store.seed_model(model, brand_id).await;
            }
        }
        store
    }

    pub async fn seed_brand(&self, name: &str) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        state.brands.push(Brand {
            id,
            name: name.to_string(),
        });
        id
    }

    pub async fn seed_model(&self, name: &str, brand_id: i64) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        state.models.push(ModelRow {
            id,
            name: name.to_string(),
            brand_id,
        });
        id
    }

    /// Id del modelo con ese nombre, si existe
    pub async fn model_id(&self, name: &str) -> Option<i64> {
        let state = self.state.lock().await;
        state.models.iter().find(|m| m.name == name).map(|m| m.id)
    }

    pub async fn seed_user(&self, user: NewUser) -> AppResult<User> {
        self.state.lock().await.insert_user(user)
    }

    pub async fn seed_car(&self, car: NewCar) -> AppResult<CarView> {
        self.state.lock().await.insert_car(car)
    }

    pub async fn seed_client(&self, client: NewClient) -> AppResult<Client> {
        self.state.lock().await.insert_client(client)
    }

    /// Inserta una venta tal cual, sin tocar el estado del auto
    pub async fn seed_sale(&self, sale: NewSale) -> i64 {
        self.state.lock().await.insert_sale(sale)
    }

    pub async fn car_status(&self, id: i64) -> Option<CarStatus> {
        let state = self.state.lock().await;
        state.cars.iter().find(|c| c.id == id).map(|c| c.status)
    }

    pub async fn sale_count(&self) -> usize {
        self.state.lock().await.sales.len()
    }

    pub async fn client_count(&self) -> usize {
        self.state.lock().await.clients.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.find_user_by_email(email))
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.state.lock().await.users.clone())
    }

    async fn user_exists(&self, email: &str) -> AppResult<bool> {
        Ok(self.state.lock().await.users.iter().any(|u| u.email == email))
    }

    async fn find_model(&self, id: i64) -> AppResult<Option<ModelView>> {
        Ok(self.state.lock().await.model_view(id))
    }

    async fn list_models(&self) -> AppResult<Vec<ModelView>> {
        let state = self.state.lock().await;
        let mut models: Vec<ModelView> = state
            .models
            .iter()
            .filter_map(|m| state.model_view(m.id))
            .collect();
        models.sort_by(|a, b| (&a.brand_name, &a.name).cmp(&(&b.brand_name, &b.name)));
        Ok(models)
    }

    async fn list_brands(&self) -> AppResult<Vec<Brand>> {
        let mut brands = self.state.lock().await.brands.clone();
        brands.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(brands)
    }

    async fn car_exists(&self, condition: &Condition) -> AppResult<bool> {
        let cars = self.state.lock().await.car_views();
        Ok(cars.iter().any(|car| condition.matches(car)))
    }

    async fn search_cars(&self, condition: &Condition, page: &PageRequest) -> AppResult<Page<CarView>> {
        let cars = self.state.lock().await.car_views();
        Ok(paginate(cars, condition, page, Field::CarId))
    }

    async fn list_cars(&self, condition: &Condition, sort: &[SortOrder]) -> AppResult<Vec<CarView>> {
        let cars = self.state.lock().await.car_views();
        Ok(filter_sorted(cars, condition, sort, Field::CarId))
    }

    async fn client_exists(&self, condition: &Condition) -> AppResult<bool> {
        let clients = self.state.lock().await.client_views();
        Ok(clients.iter().any(|client| condition.matches(client)))
    }

    async fn search_clients(&self, condition: &Condition, page: &PageRequest) -> AppResult<Page<Client>> {
        let clients = self.state.lock().await.client_views();
        Ok(paginate(clients, condition, page, Field::ClientId))
    }

    async fn list_clients(&self, condition: &Condition, sort: &[SortOrder]) -> AppResult<Vec<Client>> {
        let clients = self.state.lock().await.client_views();
        Ok(filter_sorted(clients, condition, sort, Field::ClientId))
    }

    async fn search_sales(&self, condition: &Condition, page: &PageRequest) -> AppResult<Page<SaleView>> {
        let sales = self.state.lock().await.sale_views();
        Ok(paginate(sales, condition, page, Field::SaleId))
    }

    async fn list_sales(&self, condition: &Condition, sort: &[SortOrder]) -> AppResult<Vec<SaleView>> {
        let sales = self.state.lock().await.sale_views();
        Ok(filter_sorted(sales, condition, sort, Field::SaleId))
    }
}

/// Unidad de trabajo exclusiva sobre una copia del estado
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
        Ok(self.working.find_user_by_email(email))
    }

    async fn user_exists(&mut self, email: &str) -> AppResult<bool> {
        Ok(self.working.users.iter().any(|u| u.email == email))
    }

    async fn insert_user(&mut self, user: NewUser) -> AppResult<User> {
        self.working.insert_user(user)
    }

    async fn find_model(&mut self, id: i64) -> AppResult<Option<ModelView>> {
        Ok(self.working.model_view(id))
    }

    async fn lock_car(&mut self, id: i64) -> AppResult<Option<CarView>> {
        Ok(self.working.find_car(id))
    }

    async fn car_exists(&mut self, condition: &Condition) -> AppResult<bool> {
        Ok(self
            .working
            .car_views()
            .iter()
            .any(|car| condition.matches(car)))
    }

    async fn insert_car(&mut self, car: NewCar) -> AppResult<CarView> {
        self.working.insert_car(car)
    }

    async fn update_car_details(&mut self, id: i64, changes: &CarChanges) -> AppResult<CarView> {
        let row = self
            .working
            .cars
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found_error("Auto", &format!("ID: {}", id)))?;
        if let Some(price) = changes.base_price {
            row.base_price = price;
        }
        if let Some(mileage) = changes.mileage {
            row.mileage = mileage;
        }
        if let Some(color) = &changes.color {
            row.color = color.clone();
        }
        self.working
            .find_car(id)
            .ok_or_else(|| not_found_error("Auto", &format!("ID: {}", id)))
    }

    async fn mark_car_sold(&mut self, id: i64) -> AppResult<bool> {
        match self.working.cars.iter_mut().find(|c| c.id == id) {
            Some(row) if !row.status.is_sold() => {
                row.status = CarStatus::Sold;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_client(&mut self, id: i64) -> AppResult<Option<Client>> {
        Ok(self.working.find_client(id))
    }

    async fn client_exists(&mut self, condition: &Condition) -> AppResult<bool> {
        Ok(self
            .working
            .client_views()
            .iter()
            .any(|client| condition.matches(client)))
    }

    async fn insert_client(&mut self, client: NewClient) -> AppResult<Client> {
        self.working.insert_client(client)
    }

    async fn insert_sale(&mut self, sale: NewSale) -> AppResult<i64> {
        Ok(self.working.insert_sale(sale))
    }

    async fn find_sale(&mut self, id: i64) -> AppResult<Option<SaleView>> {
        Ok(self.working.find_sale(id))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

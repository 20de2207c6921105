//! Puerto de persistencia
//!
//! `Store` agrupa las lecturas que no necesitan transacción; todo lo que
//! escribe pasa por un `UnitOfWork`, que se confirma con `commit` o se
//! descarta al soltarlo.

use async_trait::async_trait;

use crate::dto::page_dto::{Page, PageRequest, SortOrder};
use crate::models::{
    Brand, CarChanges, CarView, Client, ModelView, NewCar, NewClient, NewSale, NewUser, SaleView,
    User,
};
use crate::specifications::Condition;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait Store: Send + Sync {
    /// Abre una unidad de trabajo transaccional
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn list_users(&self) -> AppResult<Vec<User>>;
    async fn user_exists(&self, email: &str) -> AppResult<bool>;

    async fn find_model(&self, id: i64) -> AppResult<Option<ModelView>>;
    async fn list_models(&self) -> AppResult<Vec<ModelView>>;
    async fn list_brands(&self) -> AppResult<Vec<Brand>>;

    async fn car_exists(&self, condition: &Condition) -> AppResult<bool>;
    async fn search_cars(&self, condition: &Condition, page: &PageRequest) -> AppResult<Page<CarView>>;
    async fn list_cars(&self, condition: &Condition, sort: &[SortOrder]) -> AppResult<Vec<CarView>>;

    async fn client_exists(&self, condition: &Condition) -> AppResult<bool>;
    async fn search_clients(&self, condition: &Condition, page: &PageRequest) -> AppResult<Page<Client>>;
    async fn list_clients(&self, condition: &Condition, sort: &[SortOrder]) -> AppResult<Vec<Client>>;

    async fn search_sales(&self, condition: &Condition, page: &PageRequest) -> AppResult<Page<SaleView>>;
    async fn list_sales(&self, condition: &Condition, sort: &[SortOrder]) -> AppResult<Vec<SaleView>>;
}

/// Operaciones dentro de una transacción.
///
/// Todas las escrituras de una operación de negocio se hacen con la misma
/// unidad; si no se llama a `commit` no queda nada persistido.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>>;
    async fn user_exists(&mut self, email: &str) -> AppResult<bool>;
    async fn insert_user(&mut self, user: NewUser) -> AppResult<User>;

    async fn find_model(&mut self, id: i64) -> AppResult<Option<ModelView>>;

    /// Lee el auto bloqueando su fila hasta el fin de la transacción
    async fn lock_car(&mut self, id: i64) -> AppResult<Option<CarView>>;
    async fn car_exists(&mut self, condition: &Condition) -> AppResult<bool>;
    async fn insert_car(&mut self, car: NewCar) -> AppResult<CarView>;
    async fn update_car_details(&mut self, id: i64, changes: &CarChanges) -> AppResult<CarView>;
    /// Pasa el auto a SOLD si todavía no lo estaba; `false` si otro lo vendió antes
    async fn mark_car_sold(&mut self, id: i64) -> AppResult<bool>;

    async fn find_client(&mut self, id: i64) -> AppResult<Option<Client>>;
    async fn client_exists(&mut self, condition: &Condition) -> AppResult<bool>;
    async fn insert_client(&mut self, client: NewClient) -> AppResult<Client>;

    async fn insert_sale(&mut self, sale: NewSale) -> AppResult<i64>;
    async fn find_sale(&mut self, id: i64) -> AppResult<Option<SaleView>>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}

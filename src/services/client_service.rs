//! Servicio de clientes
//!
//! Búsquedas y verificaciones de existencia, siempre sobre los clientes del
//! usuario que opera.

use std::sync::Arc;

use super::authorization_service::AuthorizationService;
use crate::dto::{ClientResponse, Page, PageRequest};
use crate::repositories::store::Store;
use crate::utils::errors::AppResult;

pub struct ClientService {
    store: Arc<dyn Store>,
    guard: AuthorizationService,
}

impl ClientService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            guard: AuthorizationService::new(),
        }
    }

    /// Página de clientes cuyo DNI, nombre o apellido contienen `filter`;
    /// sin filtro devuelve todos los clientes de quien opera
    pub async fn clients_page_by_filter(
        &self,
        filter: Option<&str>,
        acting_email: &str,
        page: &PageRequest,
    ) -> AppResult<Page<ClientResponse>> {
        let condition = self.guard.client_search_scope(filter, acting_email);
        let clients = self.store.search_clients(&condition, page).await?;
        Ok(clients.map(ClientResponse::from))
    }

    pub async fn search_clients_by_filter(&self, filter: &str, acting_email: &str) -> AppResult<Vec<ClientResponse>> {
        let condition = self.guard.client_search_scope(Some(filter), acting_email);
        let clients = self.store.list_clients(&condition, &[]).await?;
        Ok(clients.into_iter().map(ClientResponse::from).collect())
    }

    pub async fn exists_phone(&self, phone: &str, acting_email: &str) -> AppResult<bool> {
        self.store
            .client_exists(&self.guard.client_phone_scope(phone, acting_email))
            .await
    }

    pub async fn exists_dni(&self, dni: &str, acting_email: &str) -> AppResult<bool> {
        self.store
            .client_exists(&self.guard.client_dni_scope(dni, acting_email))
            .await
    }
}

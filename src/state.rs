//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::store::Store;
use crate::services::{AuthService, CarService, ClientService, SaleService, UserService};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: EnvironmentConfig,
    pub jwt: JwtConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: EnvironmentConfig) -> Self {
        let jwt = JwtConfig::from(&config);
        Self { store, config, jwt }
    }

    pub fn car_service(&self) -> CarService {
        CarService::new(self.store.clone())
    }

    pub fn sale_service(&self) -> SaleService {
        SaleService::new(self.store.clone())
    }

    pub fn client_service(&self) -> ClientService {
        ClientService::new(self.store.clone())
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(self.store.clone(), self.config.bcrypt_cost)
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.store.clone(), self.jwt.clone())
    }
}

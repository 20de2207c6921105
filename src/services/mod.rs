//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación. Los servicios
//! validan los requests, aplican las reglas de autorización y orquestan el
//! acceso al `Store`.

pub mod auth_service;
pub mod authorization_service;
pub mod car_service;
pub mod client_service;
pub mod sale_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use authorization_service::AuthorizationService;
pub use car_service::CarService;
pub use client_service::ClientService;
pub use sale_service::SaleService;
pub use user_service::UserService;

//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema PostgreSQL
//! y las vistas que devuelven las consultas con JOIN.

pub mod car;
pub mod client;
pub mod sale;
pub mod user;

pub use car::{Brand, CarChanges, CarStatus, CarView, ModelView, NewCar};
pub use client::{Client, NewClient};
pub use sale::{NewSale, SaleRow, SaleView};
pub use user::{NewUser, User, KNOWN_ROLES, ROLE_ADMIN, ROLE_USER};

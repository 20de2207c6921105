//! Repositorios de datos
//!
//! Este módulo define el contrato de persistencia (`Store` / `UnitOfWork`)
//! y sus implementaciones.

pub mod postgres;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use postgres::PgStore;
pub use store::{Store, UnitOfWork};

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;

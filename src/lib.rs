//! Backend de gestión de una concesionaria: autos, ventas y clientes.
//!
//! Cada operación se ejecuta en nombre del usuario autenticado y todas las
//! consultas quedan restringidas a los registros que le pertenecen.

pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod specifications;
pub mod state;
pub mod utils;

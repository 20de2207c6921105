//! DTOs de entrada y salida de la API
//!
//! Los requests se validan con `validator` antes de llegar a los servicios;
//! los responses se serializan en camelCase.

pub mod car_dto;
pub mod client_dto;
pub mod page_dto;
pub mod sale_dto;
pub mod user_dto;

pub use car_dto::{CarQueryParams, CarResponse, ModelResponse, PostCarDto, UpdateCarDto};
pub use client_dto::{ClientFilterParams, ClientResponse};
pub use page_dto::{Page, PageParams, PageRequest, SortDirection, SortOrder};
pub use sale_dto::{PostSaleDto, PostSaleWithClientDto, SaleResponse};
pub use user_dto::{LoginRequest, LoginResponse, UserRequest, UserResponse};

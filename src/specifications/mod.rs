//! Constructor de predicados
//!
//! Este módulo traduce los filtros de búsqueda de autos, ventas y clientes a
//! un árbol `Condition` que el repositorio renderiza como SQL.

pub mod car_specifications;
pub mod client_specifications;
pub mod condition;
pub mod fields;
pub mod sale_specifications;

pub use car_specifications::CarFilters;
pub use condition::{Case, Condition, Value};
pub use fields::{Field, FieldValue, Searchable};
pub use sale_specifications::SaleFilters;

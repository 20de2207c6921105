use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Client;

// Filtro libre del listado paginado de clientes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientFilterParams {
    pub filter: Option<String>,
}

// Response de cliente
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: i64,
    pub name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub dni: String,
    pub registration_date: NaiveDate,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            name: client.name,
            last_name: client.last_name,
            phone: client.phone,
            dni: client.dni,
            registration_date: client.registration_date,
        }
    }
}

//! Búsquedas de clientes

use super::condition::{Case, Condition};
use super::fields::Field;
use crate::utils::validation::non_blank;

/// DNI por subcadena exacta, nombre o apellido sin distinguir mayúsculas,
/// siempre dentro de los clientes del dueño indicado.
pub fn client_search(filter: Option<&str>, owner_email: Option<&str>) -> Condition {
    let mut condition = Condition::all();

    if let Some(email) = non_blank(owner_email) {
        condition = condition.and(Condition::text_equals(Field::ClientOwnerEmail, email));
    }
    if let Some(text) = non_blank(filter) {
        condition = condition.and(Condition::any(vec![
            Condition::contains(Field::ClientDni, text, Case::Sensitive),
            Condition::contains(Field::ClientName, text, Case::Insensitive),
            Condition::contains(Field::ClientLastName, text, Case::Insensitive),
        ]));
    }

    condition
}

pub fn by_dni(dni: &str, owner_email: Option<&str>) -> Condition {
    scoped(Condition::text_equals(Field::ClientDni, dni.trim()), owner_email)
}

pub fn by_phone(phone: &str, owner_email: Option<&str>) -> Condition {
    scoped(Condition::text_equals(Field::ClientPhone, phone.trim()), owner_email)
}

fn scoped(condition: Condition, owner_email: Option<&str>) -> Condition {
    let condition = Condition::all().and(condition);
    match non_blank(owner_email) {
        Some(email) => condition.and(Condition::text_equals(Field::ClientOwnerEmail, email)),
        None => condition,
    }
}

pub fn client_sort_field(property: &str) -> Option<Field> {
    match property {
        "id" => Some(Field::ClientId),
        "name" => Some(Field::ClientName),
        "lastName" => Some(Field::ClientLastName),
        "dni" => Some(Field::ClientDni),
        "phone" => Some(Field::ClientPhone),
        "registrationDate" => Some(Field::ClientRegistrationDate),
        _ => None,
    }
}

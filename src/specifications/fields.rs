//! Columnas filtrables y ordenables
//!
//! Cada `Field` conoce su expresión SQL sobre los alias fijos de las
//! consultas (`c` autos, `m` modelos, `b` marcas, `u` dueño del auto,
//! `s` ventas, `su` usuario de la venta, `cl` clientes, `cu` dueño del
//! cliente) y cómo leerse desde un registro en memoria.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::models::{CarStatus, CarView, Client, SaleView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CarId,
    LicensePlate,
    ModelName,
    BrandName,
    CarOwnerEmail,
    CarStatus,
    CarYear,
    CarColor,
    BasePrice,
    Mileage,
    CarRegistrationDate,

    ClientId,
    ClientName,
    ClientLastName,
    ClientDni,
    ClientPhone,
    ClientRegistrationDate,
    ClientOwnerEmail,

    SaleId,
    SaleDate,
    SalePrice,
    SaleOwnerEmail,
}

impl Field {
    pub fn sql(&self) -> &'static str {
        match self {
            Field::CarId => "c.id",
            Field::LicensePlate => "c.license_plate",
            Field::ModelName => "m.name",
            Field::BrandName => "b.name",
            Field::CarOwnerEmail => "u.email",
            Field::CarStatus => "c.status",
            Field::CarYear => "c.year",
            Field::CarColor => "c.color",
            Field::BasePrice => "c.base_price",
            Field::Mileage => "c.mileage",
            Field::CarRegistrationDate => "c.registration_date",

            Field::ClientId => "cl.id",
            Field::ClientName => "cl.name",
            Field::ClientLastName => "cl.last_name",
            Field::ClientDni => "cl.dni",
            Field::ClientPhone => "cl.phone",
            Field::ClientRegistrationDate => "cl.registration_date",
            Field::ClientOwnerEmail => "cu.email",

            Field::SaleId => "s.id",
            Field::SaleDate => "s.sale_date",
            Field::SalePrice => "s.sale_price",
            Field::SaleOwnerEmail => "su.email",
        }
    }
}

/// Valor de un campo leído de un registro en memoria.
///
/// Un mismo `Field` siempre produce la misma variante, así que el orden
/// derivado sirve para ordenar resultados.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum FieldValue<'a> {
    Missing,
    Int(i64),
    Text(Option<&'a str>),
    Decimal(Decimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Status(CarStatus),
}

/// Registro sobre el que se puede evaluar una `Condition`
pub trait Searchable {
    fn value(&self, field: Field) -> FieldValue<'_>;
}

impl Searchable for CarView {
    fn value(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::CarId => FieldValue::Int(self.id),
            Field::LicensePlate => FieldValue::Text(Some(&self.license_plate)),
            Field::ModelName => FieldValue::Text(Some(&self.model_name)),
            Field::BrandName => FieldValue::Text(Some(&self.brand_name)),
            Field::CarOwnerEmail => FieldValue::Text(Some(&self.user_email)),
            Field::CarStatus => FieldValue::Status(self.status),
            Field::CarYear => FieldValue::Int(i64::from(self.year)),
            Field::CarColor => FieldValue::Text(Some(&self.color)),
            Field::BasePrice => FieldValue::Decimal(self.base_price),
            Field::Mileage => FieldValue::Decimal(self.mileage),
            Field::CarRegistrationDate => FieldValue::Date(self.registration_date),
            _ => FieldValue::Missing,
        }
    }
}

impl Searchable for Client {
    fn value(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::ClientId => FieldValue::Int(self.id),
            Field::ClientName => FieldValue::Text(Some(&self.name)),
            Field::ClientLastName => FieldValue::Text(Some(&self.last_name)),
            Field::ClientDni => FieldValue::Text(Some(&self.dni)),
            Field::ClientPhone => FieldValue::Text(self.phone.as_deref()),
            Field::ClientRegistrationDate => FieldValue::Date(self.registration_date),
            Field::ClientOwnerEmail => FieldValue::Text(Some(&self.user_email)),
            _ => FieldValue::Missing,
        }
    }
}

impl Searchable for SaleView {
    fn value(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::SaleId => FieldValue::Int(self.id),
            Field::SaleDate => FieldValue::DateTime(self.sale_date),
            Field::SalePrice => FieldValue::Decimal(self.sale_price),
            Field::SaleOwnerEmail => FieldValue::Text(Some(&self.user_email)),
            Field::ClientId
            | Field::ClientName
            | Field::ClientLastName
            | Field::ClientDni
            | Field::ClientPhone
            | Field::ClientRegistrationDate
            | Field::ClientOwnerEmail => self.client.value(field),
            _ => self.car.value(field),
        }
    }
}

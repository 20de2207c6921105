//! Condiciones componibles de búsqueda
//!
//! Este módulo contiene el árbol de predicados que usan todas las búsquedas.
//! Una misma `Condition` se traduce a SQL parametrizado con
//! `QueryBuilder<Postgres>` o se evalúa contra un registro en memoria.

use chrono::NaiveDateTime;
use sqlx::{Postgres, QueryBuilder};

use super::fields::{Field, FieldValue, Searchable};
use crate::models::CarStatus;

/// Valor literal de una comparación por igualdad
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Status(CarStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Sensitive,
    Insensitive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equals(Field, Value),
    /// Subcadena en cualquier posición
    Contains {
        field: Field,
        needle: String,
        case: Case,
    },
    /// Rango cerrado en ambos extremos
    Between(Field, NaiveDateTime, NaiveDateTime),
    /// Conjunción; vacía equivale a verdadero
    All(Vec<Condition>),
    /// Disyunción; vacía equivale a falso
    Any(Vec<Condition>),
}

impl Condition {
    /// Conjunción vacía: deja pasar todo
    pub fn all() -> Self {
        Condition::All(Vec::new())
    }

    pub fn any(alternatives: Vec<Condition>) -> Self {
        Condition::Any(alternatives)
    }

    pub fn text_equals(field: Field, value: impl Into<String>) -> Self {
        Condition::Equals(field, Value::Text(value.into()))
    }

    pub fn status_equals(status: CarStatus) -> Self {
        Condition::Equals(Field::CarStatus, Value::Status(status))
    }

    pub fn contains(field: Field, needle: impl Into<String>, case: Case) -> Self {
        Condition::Contains {
            field,
            needle: needle.into(),
            case,
        }
    }

    pub fn between(field: Field, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Condition::Between(field, from, to)
    }

    /// Agrega una condición en conjunción, aplanando conjunciones anidadas
    pub fn and(self, other: Condition) -> Self {
        match self {
            Condition::All(mut parts) => {
                parts.push(other);
                Condition::All(parts)
            }
            single => Condition::All(vec![single, other]),
        }
    }

    /// Escribe la condición como SQL con parámetros enlazados
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Condition::Equals(field, Value::Text(text)) => {
                qb.push(field.sql()).push(" = ").push_bind(text.clone());
            }
            Condition::Equals(field, Value::Status(status)) => {
                qb.push(field.sql()).push(" = ").push_bind(*status);
            }
            Condition::Contains {
                field,
                needle,
                case: Case::Sensitive,
            } => {
                qb.push(field.sql())
                    .push(" LIKE ")
                    .push_bind(like_pattern(needle))
                    .push(" ESCAPE '\\'");
            }
            Condition::Contains {
                field,
                needle,
                case: Case::Insensitive,
            } => {
                qb.push("UPPER(")
                    .push(field.sql())
                    .push(") LIKE ")
                    .push_bind(like_pattern(&needle.to_uppercase()))
                    .push(" ESCAPE '\\'");
            }
            Condition::Between(field, from, to) => {
                qb.push(field.sql())
                    .push(" BETWEEN ")
                    .push_bind(*from)
                    .push(" AND ")
                    .push_bind(*to);
            }
            Condition::All(parts) => push_group(qb, parts, " AND ", "TRUE"),
            Condition::Any(parts) => push_group(qb, parts, " OR ", "FALSE"),
        }
    }

    /// Evalúa la condición contra un registro ya cargado
    pub fn matches<R: Searchable + ?Sized>(&self, record: &R) -> bool {
        match self {
            Condition::Equals(field, Value::Text(text)) => {
                record.value(*field) == FieldValue::Text(Some(text.as_str()))
            }
            Condition::Equals(field, Value::Status(status)) => {
                record.value(*field) == FieldValue::Status(*status)
            }
            Condition::Contains { field, needle, case } => match record.value(*field) {
                FieldValue::Text(Some(haystack)) => match case {
                    Case::Sensitive => haystack.contains(needle.as_str()),
                    Case::Insensitive => haystack
                        .to_uppercase()
                        .contains(needle.to_uppercase().as_str()),
                },
                _ => false,
            },
            Condition::Between(field, from, to) => match record.value(*field) {
                FieldValue::DateTime(at) => *from <= at && at <= *to,
                _ => false,
            },
            Condition::All(parts) => parts.iter().all(|part| part.matches(record)),
            Condition::Any(parts) => parts.iter().any(|part| part.matches(record)),
        }
    }
}

fn push_group(
    qb: &mut QueryBuilder<'_, Postgres>,
    parts: &[Condition],
    separator: &str,
    empty: &str,
) {
    if parts.is_empty() {
        qb.push(empty);
        return;
    }

    qb.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        part.push_sql(qb);
    }
    qb.push(")");
}

/// Patrón `%needle%` con los comodines de LIKE escapados
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

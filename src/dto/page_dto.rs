use serde::{Deserialize, Serialize};

use crate::specifications::Field;
use crate::utils::errors::{bad_request_error, validation_error, AppResult};

// Parámetros de paginación tal como llegan en la query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    /// `propiedad` o `propiedad,asc|desc`
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: Field,
    pub direction: SortDirection,
}

/// Página pedida, con el orden ya traducido a columnas conocidas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
    pub sort: Vec<SortOrder>,
}

impl PageRequest {
    pub const DEFAULT_SIZE: i64 = 20;
    pub const MAX_SIZE: i64 = 100;

    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }

    pub fn sorted_by(mut self, field: Field, direction: SortDirection) -> Self {
        self.sort.push(SortOrder { field, direction });
        self
    }

    /// Máximo número de página aceptado
    pub const MAX_PAGE: i64 = i64::MAX / Self::MAX_SIZE;

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

impl PageParams {
    /// Valida los parámetros y resuelve el orden con la lista blanca de la entidad
    pub fn resolve(&self, sort_field: fn(&str) -> Option<Field>) -> AppResult<PageRequest> {
        let page = self.page.unwrap_or(0);
        if page < 0 {
            return Err(validation_error("page", "La página no puede ser negativa"));
        }
        if page > PageRequest::MAX_PAGE {
            return Err(validation_error("page", "Número de página fuera de rango"));
        }

        let size = self.size.unwrap_or(PageRequest::DEFAULT_SIZE);
        if !(1..=PageRequest::MAX_SIZE).contains(&size) {
            return Err(validation_error("size", "El tamaño de página debe estar entre 1 y 100"));
        }

        let mut request = PageRequest::new(page, size);

        if let Some(sort) = self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let mut parts = sort.split(',').map(str::trim);
            let property = parts.next().unwrap_or_default();
            let field = sort_field(property).ok_or_else(|| {
                bad_request_error(&format!("No se puede ordenar por '{}'", property))
            })?;
            let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
                None | Some("asc") => SortDirection::Asc,
                Some("desc") => SortDirection::Desc,
                Some(other) => {
                    return Err(bad_request_error(&format!(
                        "Dirección de orden inválida: '{}'",
                        other
                    )))
                }
            };
            request = request.sorted_by(field, direction);
        }

        Ok(request)
    }
}

// Response paginada
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let total_pages = if total_elements == 0 {
            0
        } else {
            (total_elements + request.size - 1) / request.size
        };

        Self {
            content,
            number: request.page,
            size: request.size,
            total_elements,
            total_pages,
            first: request.page == 0,
            last: request.page.saturating_add(1) >= total_pages,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            first: self.first,
            last: self.last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specifications::car_specifications::car_sort_field;
    use crate::utils::errors::AppError;

    #[test]
    fn test_defaults() {
        let request = PageParams::default().resolve(car_sort_field).unwrap();
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_sort_with_direction() {
        let params = PageParams {
            page: Some(2),
            size: Some(10),
            sort: Some("basePrice,DESC".to_string()),
        };
        let request = params.resolve(car_sort_field).unwrap();

        assert_eq!(request.offset(), 20);
        assert_eq!(
            request.sort,
            vec![SortOrder {
                field: Field::BasePrice,
                direction: SortDirection::Desc
            }]
        );
    }

    #[test]
    fn test_unknown_sort_property_is_rejected() {
        let params = PageParams {
            sort: Some("password".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.resolve(car_sort_field), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_size_out_of_range() {
        let params = PageParams {
            size: Some(500),
            ..Default::default()
        };
        assert!(matches!(params.resolve(car_sort_field), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_page_out_of_range() {
        let params = PageParams {
            page: Some(i64::MAX / 10),
            size: Some(100),
            ..Default::default()
        };
        assert!(matches!(params.resolve(car_sort_field), Err(AppError::Validation(_))));

        let params = PageParams {
            page: Some(PageRequest::MAX_PAGE),
            size: Some(PageRequest::MAX_SIZE),
            ..Default::default()
        };
        let request = params.resolve(car_sort_field).unwrap();
        assert!(request.offset() > 0);

        assert_eq!(PageRequest::new(i64::MAX, 2).offset(), i64::MAX);
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec![1, 2, 3], &PageRequest::new(1, 3), 7);
        assert_eq!(page.total_pages, 3);
        assert!(!page.first);
        assert!(!page.last);

        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.content, vec![10, 20, 30]);

        let empty: Page<i32> = Page::new(vec![], &PageRequest::default(), 0);
        assert!(empty.first && empty.last);
        assert_eq!(empty.total_pages, 0);
    }
}

//! Repositorio PostgreSQL
//!
//! Implementación de `Store` y `UnitOfWork` con SQLx. Las búsquedas se arman
//! con `QueryBuilder` a partir de una `Condition`, usando siempre los mismos
//! alias de tabla que conoce `Field::sql`.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;

use super::store::{Store, UnitOfWork};
use crate::dto::page_dto::{Page, PageRequest, SortDirection, SortOrder};
use crate::models::{
    Brand, CarChanges, CarStatus, CarView, Client, ModelView, NewCar, NewClient, NewSale, NewUser,
    SaleRow, SaleView, User,
};
use crate::specifications::{Condition, Field};
use crate::utils::errors::{map_db_error, not_found_error, AppResult};

const USER_COLUMNS: &str = "id, name, last_name, email, password, active, roles";

const MODEL_SELECT: &str =
    "SELECT m.id, m.name, m.brand_id, b.name AS brand_name FROM models m JOIN brands b ON b.id = m.brand_id";

const CAR_COLUMNS: &str = "c.id, c.license_plate, c.model_id, m.name AS model_name, \
     b.name AS brand_name, c.user_id, u.email AS user_email, c.year, c.color, \
     c.base_price, c.mileage, c.status, c.registration_date";

const CAR_FROM: &str = " FROM cars c \
     JOIN models m ON m.id = c.model_id \
     JOIN brands b ON b.id = m.brand_id \
     JOIN users u ON u.id = c.user_id";

const CLIENT_COLUMNS: &str = "cl.id, cl.name, cl.last_name, cl.phone, cl.dni, \
     cl.registration_date, cl.user_id, cu.email AS user_email";

const CLIENT_FROM: &str = " FROM clients cl JOIN users cu ON cu.id = cl.user_id";

const SALE_COLUMNS: &str = "s.id, s.sale_date, s.sale_price, s.user_id, su.email AS user_email, \
     c.id AS car_id, c.license_plate AS car_license_plate, c.model_id AS car_model_id, \
     m.name AS car_model_name, b.name AS car_brand_name, c.user_id AS car_user_id, \
     u.email AS car_user_email, c.year AS car_year, c.color AS car_color, \
     c.base_price AS car_base_price, c.mileage AS car_mileage, c.status AS car_status, \
     c.registration_date AS car_registration_date, \
     cl.id AS client_id, cl.name AS client_name, cl.last_name AS client_last_name, \
     cl.phone AS client_phone, cl.dni AS client_dni, \
     cl.registration_date AS client_registration_date, cl.user_id AS client_user_id, \
     cu.email AS client_user_email";

const SALE_FROM: &str = " FROM sales s \
     JOIN users su ON su.id = s.user_id \
     JOIN cars c ON c.id = s.car_id \
     JOIN models m ON m.id = c.model_id \
     JOIN brands b ON b.id = m.brand_id \
     JOIN users u ON u.id = c.user_id \
     JOIN clients cl ON cl.id = s.client_id \
     JOIN users cu ON cu.id = cl.user_id";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> AppResult<sqlx::pool::PoolConnection<Postgres>> {
        self.pool.acquire().await.map_err(map_db_error)
    }
}

/// Unidad de trabajo sobre una transacción; se hace rollback al soltarla
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

// ---------------------------------------------------------------------------
// Consultas compartidas entre el pool y la transacción
// ---------------------------------------------------------------------------

fn push_where(qb: &mut QueryBuilder<'_, Postgres>, condition: &Condition) {
    qb.push(" WHERE ");
    condition.push_sql(qb);
}

/// ORDER BY con el orden pedido y el id como desempate
fn push_order(qb: &mut QueryBuilder<'_, Postgres>, sort: &[SortOrder], id: Field) {
    qb.push(" ORDER BY ");
    for order in sort.iter().filter(|o| o.field != id) {
        qb.push(order.field.sql())
            .push(" ")
            .push(order.direction.sql())
            .push(", ");
    }
    let id_direction = sort
        .iter()
        .find(|o| o.field == id)
        .map(|o| o.direction)
        .unwrap_or(SortDirection::Asc);
    qb.push(id.sql()).push(" ").push(id_direction.sql());
}

fn push_limit(qb: &mut QueryBuilder<'_, Postgres>, page: &PageRequest) {
    qb.push(" LIMIT ")
        .push_bind(page.size)
        .push(" OFFSET ")
        .push_bind(page.offset());
}

async fn count(conn: &mut PgConnection, count_expr: &str, from: &str, condition: &Condition) -> AppResult<i64> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
    qb.push(count_expr).push(from);
    push_where(&mut qb, condition);

    let (total,): (i64,) = qb
        .build_query_as()
        .fetch_one(conn)
        .await
        .map_err(map_db_error)?;
    Ok(total)
}

async fn exists(conn: &mut PgConnection, from: &str, condition: &Condition) -> AppResult<bool> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT EXISTS(SELECT 1");
    qb.push(from);
    push_where(&mut qb, condition);
    qb.push(")");

    let (found,): (bool,) = qb
        .build_query_as()
        .fetch_one(conn)
        .await
        .map_err(map_db_error)?;
    Ok(found)
}

async fn find_user_by_email(conn: &mut PgConnection, email: &str) -> AppResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
    sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(conn)
        .await
        .map_err(map_db_error)
}

async fn user_exists(conn: &mut PgConnection, email: &str) -> AppResult<bool> {
    let (found,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(conn)
        .await
        .map_err(map_db_error)?;
    Ok(found)
}

async fn find_model(conn: &mut PgConnection, id: i64) -> AppResult<Option<ModelView>> {
    let sql = format!("{} WHERE m.id = $1", MODEL_SELECT);
    sqlx::query_as::<_, ModelView>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(map_db_error)
}

async fn find_car(conn: &mut PgConnection, id: i64, for_update: bool) -> AppResult<Option<CarView>> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
    qb.push(CAR_COLUMNS).push(CAR_FROM);
    qb.push(" WHERE c.id = ").push_bind(id);
    if for_update {
        qb.push(" FOR UPDATE OF c");
    }

    qb.build_query_as::<CarView>()
        .fetch_optional(conn)
        .await
        .map_err(map_db_error)
}

async fn list_cars(conn: &mut PgConnection, condition: &Condition, sort: &[SortOrder]) -> AppResult<Vec<CarView>> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT DISTINCT ");
    qb.push(CAR_COLUMNS).push(CAR_FROM);
    push_where(&mut qb, condition);
    push_order(&mut qb, sort, Field::CarId);

    qb.build_query_as::<CarView>()
        .fetch_all(conn)
        .await
        .map_err(map_db_error)
}

async fn find_client(conn: &mut PgConnection, id: i64) -> AppResult<Option<Client>> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
    qb.push(CLIENT_COLUMNS).push(CLIENT_FROM);
    qb.push(" WHERE cl.id = ").push_bind(id);

    qb.build_query_as::<Client>()
        .fetch_optional(conn)
        .await
        .map_err(map_db_error)
}

async fn list_clients(conn: &mut PgConnection, condition: &Condition, sort: &[SortOrder]) -> AppResult<Vec<Client>> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
    qb.push(CLIENT_COLUMNS).push(CLIENT_FROM);
    push_where(&mut qb, condition);
    push_order(&mut qb, sort, Field::ClientId);

    qb.build_query_as::<Client>()
        .fetch_all(conn)
        .await
        .map_err(map_db_error)
}

async fn find_sale(conn: &mut PgConnection, id: i64) -> AppResult<Option<SaleView>> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
    qb.push(SALE_COLUMNS).push(SALE_FROM);
    qb.push(" WHERE s.id = ").push_bind(id);

    let row = qb
        .build_query_as::<SaleRow>()
        .fetch_optional(conn)
        .await
        .map_err(map_db_error)?;
    Ok(row.map(SaleView::from))
}

async fn list_sales(conn: &mut PgConnection, condition: &Condition, sort: &[SortOrder]) -> AppResult<Vec<SaleView>> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
    qb.push(SALE_COLUMNS).push(SALE_FROM);
    push_where(&mut qb, condition);
    push_order(&mut qb, sort, Field::SaleId);

    let rows = qb
        .build_query_as::<SaleRow>()
        .fetch_all(conn)
        .await
        .map_err(map_db_error)?;
    Ok(rows.into_iter().map(SaleView::from).collect())
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let mut conn = self.connection().await?;
        find_user_by_email(&mut conn, email).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn user_exists(&self, email: &str) -> AppResult<bool> {
        let mut conn = self.connection().await?;
        user_exists(&mut conn, email).await
    }

    async fn find_model(&self, id: i64) -> AppResult<Option<ModelView>> {
        let mut conn = self.connection().await?;
        find_model(&mut conn, id).await
    }

    async fn list_models(&self) -> AppResult<Vec<ModelView>> {
        let sql = format!("{} ORDER BY b.name, m.name", MODEL_SELECT);
        sqlx::query_as::<_, ModelView>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn list_brands(&self) -> AppResult<Vec<Brand>> {
        sqlx::query_as::<_, Brand>("SELECT id, name FROM brands ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn car_exists(&self, condition: &Condition) -> AppResult<bool> {
        let mut conn = self.connection().await?;
        exists(&mut conn, CAR_FROM, condition).await
    }

    async fn search_cars(&self, condition: &Condition, page: &PageRequest) -> AppResult<Page<CarView>> {
        let mut conn = self.connection().await?;
        let total = count(&mut conn, "COUNT(DISTINCT c.id)", CAR_FROM, condition).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT DISTINCT ");
        qb.push(CAR_COLUMNS).push(CAR_FROM);
        push_where(&mut qb, condition);
        push_order(&mut qb, &page.sort, Field::CarId);
        push_limit(&mut qb, page);
        debug!("🔍 Búsqueda de autos: {}", qb.sql());

        let cars = qb
            .build_query_as::<CarView>()
            .fetch_all(&mut *conn)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(cars, page, total))
    }

    async fn list_cars(&self, condition: &Condition, sort: &[SortOrder]) -> AppResult<Vec<CarView>> {
        let mut conn = self.connection().await?;
        list_cars(&mut conn, condition, sort).await
    }

    async fn client_exists(&self, condition: &Condition) -> AppResult<bool> {
        let mut conn = self.connection().await?;
        exists(&mut conn, CLIENT_FROM, condition).await
    }

    async fn search_clients(&self, condition: &Condition, page: &PageRequest) -> AppResult<Page<Client>> {
        let mut conn = self.connection().await?;
        let total = count(&mut conn, "COUNT(*)", CLIENT_FROM, condition).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(CLIENT_COLUMNS).push(CLIENT_FROM);
        push_where(&mut qb, condition);
        push_order(&mut qb, &page.sort, Field::ClientId);
        push_limit(&mut qb, page);

        let clients = qb
            .build_query_as::<Client>()
            .fetch_all(&mut *conn)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(clients, page, total))
    }

    async fn list_clients(&self, condition: &Condition, sort: &[SortOrder]) -> AppResult<Vec<Client>> {
        let mut conn = self.connection().await?;
        list_clients(&mut conn, condition, sort).await
    }

    async fn search_sales(&self, condition: &Condition, page: &PageRequest) -> AppResult<Page<SaleView>> {
        let mut conn = self.connection().await?;
        let total = count(&mut conn, "COUNT(*)", SALE_FROM, condition).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(SALE_COLUMNS).push(SALE_FROM);
        push_where(&mut qb, condition);
        push_order(&mut qb, &page.sort, Field::SaleId);
        push_limit(&mut qb, page);
        debug!("🔍 Búsqueda de ventas: {}", qb.sql());

        let rows = qb
            .build_query_as::<SaleRow>()
            .fetch_all(&mut *conn)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(rows.into_iter().map(SaleView::from).collect(), page, total))
    }

    async fn list_sales(&self, condition: &Condition, sort: &[SortOrder]) -> AppResult<Vec<SaleView>> {
        let mut conn = self.connection().await?;
        list_sales(&mut conn, condition, sort).await
    }
}

// ---------------------------------------------------------------------------
// UnitOfWork
// ---------------------------------------------------------------------------

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
        find_user_by_email(&mut self.tx, email).await
    }

    async fn user_exists(&mut self, email: &str) -> AppResult<bool> {
        user_exists(&mut self.tx, email).await
    }

    async fn insert_user(&mut self, user: NewUser) -> AppResult<User> {
        let sql = format!(
            "INSERT INTO users (name, last_name, email, password, active, roles) \
             VALUES ($1, $2, $3, $4, TRUE, $5) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.name)
            .bind(user.last_name)
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.roles)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_db_error)
    }

    async fn find_model(&mut self, id: i64) -> AppResult<Option<ModelView>> {
        find_model(&mut self.tx, id).await
    }

    async fn lock_car(&mut self, id: i64) -> AppResult<Option<CarView>> {
        find_car(&mut self.tx, id, true).await
    }

    async fn car_exists(&mut self, condition: &Condition) -> AppResult<bool> {
        exists(&mut self.tx, CAR_FROM, condition).await
    }

    async fn insert_car(&mut self, car: NewCar) -> AppResult<CarView> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO cars (license_plate, model_id, user_id, year, color, base_price, mileage, status, registration_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(car.license_plate)
        .bind(car.model_id)
        .bind(car.user_id)
        .bind(car.year)
        .bind(car.color)
        .bind(car.base_price)
        .bind(car.mileage)
        .bind(car.status)
        .bind(car.registration_date)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        find_car(&mut self.tx, id, false)
            .await?
            .ok_or_else(|| not_found_error("Auto", &format!("ID: {}", id)))
    }

    async fn update_car_details(&mut self, id: i64, changes: &CarChanges) -> AppResult<CarView> {
        if !changes.is_empty() {
            let mut qb = QueryBuilder::<Postgres>::new("UPDATE cars SET ");
            let mut set = qb.separated(", ");
            if let Some(price) = changes.base_price {
                set.push("base_price = ").push_bind_unseparated(price);
            }
            if let Some(mileage) = changes.mileage {
                set.push("mileage = ").push_bind_unseparated(mileage);
            }
            if let Some(color) = &changes.color {
                set.push("color = ").push_bind_unseparated(color.clone());
            }
            qb.push(" WHERE id = ").push_bind(id);

            qb.build()
                .execute(&mut *self.tx)
                .await
                .map_err(map_db_error)?;
        }

        find_car(&mut self.tx, id, false)
            .await?
            .ok_or_else(|| not_found_error("Auto", &format!("ID: {}", id)))
    }

    async fn mark_car_sold(&mut self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("UPDATE cars SET status = $1 WHERE id = $2 AND status <> $1")
            .bind(CarStatus::Sold)
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_client(&mut self, id: i64) -> AppResult<Option<Client>> {
        find_client(&mut self.tx, id).await
    }

    async fn client_exists(&mut self, condition: &Condition) -> AppResult<bool> {
        exists(&mut self.tx, CLIENT_FROM, condition).await
    }

    async fn insert_client(&mut self, client: NewClient) -> AppResult<Client> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO clients (name, last_name, phone, dni, registration_date, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(client.name)
        .bind(client.last_name)
        .bind(client.phone)
        .bind(client.dni)
        .bind(client.registration_date)
        .bind(client.user_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        find_client(&mut self.tx, id)
            .await?
            .ok_or_else(|| not_found_error("Cliente", &format!("ID: {}", id)))
    }

    async fn insert_sale(&mut self, sale: NewSale) -> AppResult<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO sales (car_id, client_id, sale_date, sale_price, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(sale.car_id)
        .bind(sale.client_id)
        .bind(sale.sale_date)
        .bind(sale.sale_price)
        .bind(sale.user_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(id)
    }

    async fn find_sale(&mut self, id: i64) -> AppResult<Option<SaleView>> {
        find_sale(&mut self.tx, id).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specifications::car_specifications::{car_search, CarFilters};

    #[test]
    fn test_order_by_appends_id_tie_break() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        let sort = [SortOrder {
            field: Field::BasePrice,
            direction: SortDirection::Desc,
        }];
        push_order(&mut qb, &sort, Field::CarId);

        assert_eq!(qb.sql(), " ORDER BY c.base_price DESC, c.id ASC");
    }

    #[test]
    fn test_order_by_id_is_not_repeated() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        let sort = [SortOrder {
            field: Field::SaleId,
            direction: SortDirection::Desc,
        }];
        push_order(&mut qb, &sort, Field::SaleId);

        assert_eq!(qb.sql(), " ORDER BY s.id DESC");
    }

    #[test]
    fn test_car_search_query_is_parameterised() {
        let filters = CarFilters {
            brand: Some("fiat'; DROP TABLE cars; --".to_string()),
            ..Default::default()
        };
        let condition = car_search(&filters, Some("ana@example.com"));

        let mut qb = QueryBuilder::<Postgres>::new("SELECT DISTINCT ");
        qb.push(CAR_COLUMNS).push(CAR_FROM);
        push_where(&mut qb, &condition);
        push_limit(&mut qb, &PageRequest::default());

        let sql = qb.sql();
        assert!(sql.contains("WHERE (u.email = $1 AND UPPER(b.name) LIKE $2 ESCAPE '\\')"));
        assert!(sql.ends_with(" LIMIT $3 OFFSET $4"));
        assert!(!sql.contains("DROP TABLE"));
    }
}

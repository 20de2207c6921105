use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use carsys::dto::{LoginRequest, PageRequest, PostCarDto, PostSaleDto, PostSaleWithClientDto, UpdateCarDto, UserRequest};
use carsys::middleware::auth::AuthenticatedUser;
use carsys::models::{
    CarStatus, CarView, Client, NewCar, NewClient, NewSale, NewUser, User, ROLE_ADMIN, ROLE_USER,
};
use carsys::repositories::{MemoryStore, Store};
use carsys::services::{AuthService, CarService, ClientService, SaleService, UserService};
use carsys::specifications::{CarFilters, SaleFilters};
use carsys::utils::errors::AppError;
use carsys::utils::jwt::{verify_token, JwtConfig};

const ANA: &str = "ana@example.com";
const BETO: &str = "beto@example.com";

async fn seed_user(store: &MemoryStore, email: &str) -> User {
    store
        .seed_user(NewUser {
            name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            roles: vec![ROLE_USER.to_string()],
        })
        .await
        .unwrap()
}

async fn seed_car(store: &MemoryStore, owner: &User, plate: &str, model: &str) -> CarView {
    let model_id = store.model_id(model).await.unwrap();
    store
        .seed_car(NewCar {
            license_plate: plate.to_string(),
            model_id,
            user_id: owner.id,
            year: 2020,
            color: "Blanco".to_string(),
            base_price: Decimal::new(1_000_000, 0),
            mileage: Decimal::new(30_000, 0),
            status: CarStatus::Available,
            registration_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        })
        .await
        .unwrap()
}

async fn seed_client(store: &MemoryStore, owner: &User, dni: &str, name: &str) -> Client {
    store
        .seed_client(NewClient {
            name: name.to_string(),
            last_name: "Gómez".to_string(),
            phone: None,
            dni: dni.to_string(),
            registration_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            user_id: owner.id,
        })
        .await
        .unwrap()
}

/// Catálogo cargado más los usuarios Ana y Beto
async fn setup() -> (MemoryStore, User, User) {
    let store = MemoryStore::with_catalog().await;
    let ana = seed_user(&store, ANA).await;
    let beto = seed_user(&store, BETO).await;
    (store, ana, beto)
}

fn post_car(model_id: i64, plate: &str, owner: &str) -> PostCarDto {
    PostCarDto {
        license_plate: plate.to_string(),
        model_id,
        user_email: owner.to_string(),
        year: 2021,
        color: "Rojo".to_string(),
        base_price: Decimal::new(1_500_000, 0),
        mileage: Decimal::ZERO,
    }
}

fn sale_with_client(car_id: i64, dni: &str) -> PostSaleWithClientDto {
    PostSaleWithClientDto {
        car_id,
        sale_price: Decimal::new(2_000_000, 0),
        client_name: "Juan".to_string(),
        client_last_name: "Pérez".to_string(),
        client_phone: Some("  ".to_string()),
        client_dni: dni.to_string(),
    }
}

#[tokio::test]
async fn test_create_car_registers_available_car() {
    let (store, ana, _) = setup().await;
    let cronos = store.model_id("Cronos").await.unwrap();
    let service = CarService::new(Arc::new(store.clone()));

    let car = service
        .create_car(post_car(cronos, "AB 123 CD", ANA), ANA)
        .await
        .unwrap();

    assert_eq!(car.status, CarStatus::Available);
    assert_eq!(car.user_id, ana.id);
    assert_eq!(car.brand_name, "Fiat");
    assert_eq!(car.registration_date, Utc::now().date_naive());
}

#[tokio::test]
async fn test_license_plate_is_stored_normalized() {
    let (store, _, _) = setup().await;
    let cronos = store.model_id("Cronos").await.unwrap();
    let service = CarService::new(Arc::new(store));

    let car = service
        .create_car(post_car(cronos, "ab 123 cd", ANA), ANA)
        .await
        .unwrap();
    assert_eq!(car.license_plate, "AB123CD");

    let again = service.create_car(post_car(cronos, "AB123CD", ANA), ANA).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    assert!(service.exists_license_plate("Ab 123 Cd", ANA).await.unwrap());
}

#[tokio::test]
async fn test_create_car_for_another_owner_is_forbidden() {
    let (store, _, _) = setup().await;
    let cronos = store.model_id("Cronos").await.unwrap();
    let service = CarService::new(Arc::new(store));

    let result = service.create_car(post_car(cronos, "AB 123 CD", BETO), ANA).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_create_car_with_unknown_model_is_not_found() {
    let (store, _, _) = setup().await;
    let service = CarService::new(Arc::new(store));

    let result = service.create_car(post_car(9_999, "AB 123 CD", ANA), ANA).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_duplicate_plate_conflicts_across_owners() {
    let (store, _, beto) = setup().await;
    let cronos = store.model_id("Cronos").await.unwrap();
    seed_car(&store, &beto, "AB123CD", "Argo").await;
    let service = CarService::new(Arc::new(store));

    let result = service.create_car(post_car(cronos, "AB123CD", ANA), ANA).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_update_car_by_non_owner_is_forbidden() {
    let (store, ana, _) = setup().await;
    let car = seed_car(&store, &ana, "AB123CD", "Cronos").await;
    let service = CarService::new(Arc::new(store));

    let update = UpdateCarDto {
        id: car.id,
        base_price: Some(Decimal::new(900_000, 0)),
        mileage: None,
        color: None,
    };
    let result = service.update_car(update, BETO).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_update_car_changes_only_given_fields() {
    let (store, ana, _) = setup().await;
    let car = seed_car(&store, &ana, "AB123CD", "Cronos").await;
    let service = CarService::new(Arc::new(store));

    let update = UpdateCarDto {
        id: car.id,
        base_price: None,
        mileage: Some(Decimal::new(45_000, 0)),
        color: Some("Negro".to_string()),
    };
    let updated = service.update_car(update, ANA).await.unwrap();
    assert_eq!(updated.mileage, Decimal::new(45_000, 0));
    assert_eq!(updated.color, "Negro");
    assert_eq!(updated.base_price, car.base_price);
}

#[tokio::test]
async fn test_update_unknown_car_is_not_found() {
    let (store, _, _) = setup().await;
    let service = CarService::new(Arc::new(store));

    let update = UpdateCarDto {
        id: 4_242,
        base_price: None,
        mileage: None,
        color: Some("Negro".to_string()),
    };
    assert!(matches!(service.update_car(update, ANA).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_car_search_only_returns_own_cars() {
    let (store, ana, beto) = setup().await;
    seed_car(&store, &ana, "AB123CD", "Cronos").await;
    seed_car(&store, &ana, "AC456EF", "Corolla").await;
    seed_car(&store, &beto, "AD789GH", "Argo").await;
    let service = CarService::new(Arc::new(store));

    let all = service
        .search_cars(&CarFilters::default(), ANA, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total_elements, 2);
    assert!(all.content.iter().all(|c| c.user_email == ANA));

    let filters = CarFilters {
        brand: Some("fiat".to_string()),
        ..CarFilters::default()
    };
    let fiat = service
        .search_cars(&filters, ANA, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(fiat.total_elements, 1);
    assert_eq!(fiat.content[0].license_plate, "AB123CD");
}

#[tokio::test]
async fn test_available_cars_spans_owners_and_skips_sold() {
    let (store, ana, beto) = setup().await;
    seed_car(&store, &ana, "AB123CD", "Cronos").await;
    seed_car(&store, &beto, "AD789GH", "Argo").await;
    let sold = seed_car(&store, &beto, "AE111AA", "Toro").await;
    let client = seed_client(&store, &beto, "30111222", "Laura").await;
    let sales = SaleService::new(Arc::new(store.clone()));
    sales
        .save_sale(
            PostSaleDto {
                car_id: sold.id,
                sale_price: Decimal::new(1, 0),
                client_id: client.id,
            },
            BETO,
        )
        .await
        .unwrap();
    let service = CarService::new(Arc::new(store));

    let fiat = service.available_cars(Some("FIAT")).await.unwrap();
    let plates: Vec<_> = fiat.iter().map(|c| c.license_plate.as_str()).collect();
    assert_eq!(fiat.len(), 2);
    assert!(!plates.contains(&"AE111AA"));

    assert_eq!(service.available_cars(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_exists_license_plate_is_scoped_to_owner() {
    let (store, ana, _) = setup().await;
    seed_car(&store, &ana, "AB123CD", "Cronos").await;
    let service = CarService::new(Arc::new(store));

    assert!(service.exists_license_plate("AB123CD", ANA).await.unwrap());
    assert!(!service.exists_license_plate("AB123CD", BETO).await.unwrap());
}

#[tokio::test]
async fn test_sale_with_new_client_marks_car_sold() {
    let (store, ana, _) = setup().await;
    let car = seed_car(&store, &ana, "AB123CD", "Cronos").await;
    let service = SaleService::new(Arc::new(store.clone()));

    let sale = service
        .save_sale_with_client(sale_with_client(car.id, "12345678"), ANA)
        .await
        .unwrap();

    assert_eq!(sale.car.status, CarStatus::Sold);
    assert_eq!(sale.client.dni, "12345678");
    assert_eq!(sale.client.phone, None);
    assert_eq!(store.car_status(car.id).await, Some(CarStatus::Sold));
    assert_eq!(store.sale_count().await, 1);
}

#[tokio::test]
async fn test_selling_sold_car_is_business_rule_error() {
    let (store, ana, _) = setup().await;
    let car = seed_car(&store, &ana, "AB123CD", "Cronos").await;
    let service = SaleService::new(Arc::new(store.clone()));

    service
        .save_sale_with_client(sale_with_client(car.id, "12345678"), ANA)
        .await
        .unwrap();
    let second = service
        .save_sale_with_client(sale_with_client(car.id, "87654321"), ANA)
        .await;

    assert!(matches!(second, Err(AppError::BusinessRule(msg)) if msg == "Auto ya vendido."));
    assert_eq!(store.sale_count().await, 1);
    assert_eq!(store.client_count().await, 1);
}

#[tokio::test]
async fn test_duplicate_dni_leaves_car_available() {
    let (store, ana, beto) = setup().await;
    seed_client(&store, &beto, "12345678", "Laura").await;
    let car = seed_car(&store, &ana, "AB123CD", "Cronos").await;
    let service = SaleService::new(Arc::new(store.clone()));

    let result = service
        .save_sale_with_client(sale_with_client(car.id, "12345678"), ANA)
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(store.car_status(car.id).await, Some(CarStatus::Available));
    assert_eq!(store.sale_count().await, 0);
    assert_eq!(store.client_count().await, 1);
}

#[tokio::test]
async fn test_duplicate_phone_leaves_car_available() {
    let (store, ana, beto) = setup().await;
    store
        .seed_client(NewClient {
            name: "Laura".to_string(),
            last_name: "Gómez".to_string(),
            phone: Some("1155550000".to_string()),
            dni: "30111222".to_string(),
            registration_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            user_id: beto.id,
        })
        .await
        .unwrap();
    let car = seed_car(&store, &ana, "AB123CD", "Cronos").await;
    let service = SaleService::new(Arc::new(store.clone()));

    let mut request = sale_with_client(car.id, "12345678");
    request.client_phone = Some(" 1155550000 ".to_string());
    let result = service.save_sale_with_client(request, ANA).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(store.car_status(car.id).await, Some(CarStatus::Available));
    assert_eq!(store.sale_count().await, 0);
    assert_eq!(store.client_count().await, 1);
}

#[tokio::test]
async fn test_sale_to_unknown_client_leaves_car_available() {
    let (store, ana, _) = setup().await;
    let car = seed_car(&store, &ana, "AB123CD", "Cronos").await;
    let service = SaleService::new(Arc::new(store.clone()));

    let result = service
        .save_sale(
            PostSaleDto {
                car_id: car.id,
                sale_price: Decimal::new(10, 0),
                client_id: 999,
            },
            ANA,
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(store.car_status(car.id).await, Some(CarStatus::Available));
    assert_eq!(store.sale_count().await, 0);
}

#[tokio::test]
async fn test_selling_car_in_repair_marks_it_sold() {
    let (store, ana, _) = setup().await;
    let cronos = store.model_id("Cronos").await.unwrap();
    let car = store
        .seed_car(NewCar {
            license_plate: "AB123CD".to_string(),
            model_id: cronos,
            user_id: ana.id,
            year: 2019,
            color: "Negro".to_string(),
            base_price: Decimal::new(900_000, 0),
            mileage: Decimal::new(80_000, 0),
            status: CarStatus::InRepair,
            registration_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        })
        .await
        .unwrap();
    let client = seed_client(&store, &ana, "12345678", "Laura").await;
    let service = SaleService::new(Arc::new(store.clone()));

    let sale = service
        .save_sale(
            PostSaleDto {
                car_id: car.id,
                sale_price: Decimal::new(850_000, 0),
                client_id: client.id,
            },
            ANA,
        )
        .await
        .unwrap();

    assert_eq!(sale.car.status, CarStatus::Sold);
    assert_eq!(store.car_status(car.id).await, Some(CarStatus::Sold));
    assert_eq!(store.sale_count().await, 1);
}

#[tokio::test]
async fn test_unique_constraints_surface_as_conflict() {
    let (store, ana, _) = setup().await;
    let existing = seed_car(&store, &ana, "AB123CD", "Cronos").await;
    seed_client(&store, &ana, "12345678", "Laura").await;

    let mut uow = store.begin().await.unwrap();
    let car = uow
        .insert_car(NewCar {
            license_plate: existing.license_plate.clone(),
            model_id: existing.model_id,
            user_id: ana.id,
            year: 2022,
            color: "Azul".to_string(),
            base_price: Decimal::new(1, 0),
            mileage: Decimal::ZERO,
            status: CarStatus::Available,
            registration_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        })
        .await;
    assert!(matches!(car, Err(AppError::Conflict(msg)) if msg == "La patente ya está registrada"));

    let client = uow
        .insert_client(NewClient {
            name: "Otra".to_string(),
            last_name: "Persona".to_string(),
            phone: None,
            dni: "12345678".to_string(),
            registration_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            user_id: ana.id,
        })
        .await;
    assert!(matches!(client, Err(AppError::Conflict(msg)) if msg == "Ya existe un cliente con ese DNI"));
    drop(uow);

    assert_eq!(store.client_count().await, 1);
}

#[tokio::test]
async fn test_sale_of_unknown_car_is_not_found() {
    let (store, ana, _) = setup().await;
    let client = seed_client(&store, &ana, "12345678", "Laura").await;
    let service = SaleService::new(Arc::new(store));

    let result = service
        .save_sale(
            PostSaleDto {
                car_id: 999,
                sale_price: Decimal::new(10, 0),
                client_id: client.id,
            },
            ANA,
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_concurrent_sales_of_same_car_only_one_succeeds() {
    let (store, ana, beto) = setup().await;
    let car = seed_car(&store, &ana, "AB123CD", "Cronos").await;
    let client_a = seed_client(&store, &ana, "11111111", "Laura").await;
    let client_b = seed_client(&store, &beto, "22222222", "Marta").await;
    let first = SaleService::new(Arc::new(store.clone()));
    let second = SaleService::new(Arc::new(store.clone()));

    let (a, b) = tokio::join!(
        first.save_sale(
            PostSaleDto {
                car_id: car.id,
                sale_price: Decimal::new(100, 0),
                client_id: client_a.id,
            },
            ANA,
        ),
        second.save_sale(
            PostSaleDto {
                car_id: car.id,
                sale_price: Decimal::new(200, 0),
                client_id: client_b.id,
            },
            BETO,
        ),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert!(matches!(a.err().or(b.err()), Some(AppError::BusinessRule(_))));
    assert_eq!(store.sale_count().await, 1);
}

#[tokio::test]
async fn test_sale_search_date_range_covers_whole_until_day() {
    let (store, ana, _) = setup().await;
    let car_a = seed_car(&store, &ana, "AB123CD", "Cronos").await;
    let car_b = seed_car(&store, &ana, "AC456EF", "Argo").await;
    let client = seed_client(&store, &ana, "12345678", "Laura").await;
    let at = |d: u32, m: u32, h: u32, s: u32| {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap().and_hms_opt(h, 0, s).unwrap()
    };
    for (car_id, sale_date) in [(car_a.id, at(31, 1, 23, 59)), (car_b.id, at(1, 2, 0, 1))] {
        store
            .seed_sale(NewSale {
                car_id,
                client_id: client.id,
                sale_date,
                sale_price: Decimal::new(100, 0),
                user_id: ana.id,
            })
            .await;
    }
    let service = SaleService::new(Arc::new(store));

    let filters = SaleFilters {
        since_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        until_date: NaiveDate::from_ymd_opt(2024, 1, 31),
        ..SaleFilters::default()
    };
    let january = service
        .search_sales(&filters, ANA, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(january.total_elements, 1);
    assert_eq!(january.content[0].car.license_plate, "AB123CD");

    // Con una sola fecha no se aplica el rango
    let only_since = SaleFilters {
        since_date: NaiveDate::from_ymd_opt(2024, 3, 1),
        ..SaleFilters::default()
    };
    let all = service
        .search_sales(&only_since, ANA, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total_elements, 2);
}

#[tokio::test]
async fn test_sale_search_is_scoped_and_sales_by_dni_is_not() {
    let (store, ana, beto) = setup().await;
    let car_a = seed_car(&store, &ana, "AB123CD", "Cronos").await;
    let car_b = seed_car(&store, &beto, "AC456EF", "Argo").await;
    let client = seed_client(&store, &ana, "12345678", "Laura").await;
    let service = SaleService::new(Arc::new(store.clone()));

    for (car_id, seller) in [(car_a.id, ANA), (car_b.id, BETO)] {
        service
            .save_sale(
                PostSaleDto {
                    car_id,
                    sale_price: Decimal::new(100, 0),
                    client_id: client.id,
                },
                seller,
            )
            .await
            .unwrap();
    }

    let own = service
        .search_sales(&SaleFilters::default(), BETO, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(own.total_elements, 1);
    assert_eq!(own.content[0].car.license_plate, "AC456EF");

    let by_dni = service.sales_by_client_dni("12345678").await.unwrap();
    assert_eq!(by_dni.len(), 2);
    assert!(by_dni[0].sale_date >= by_dni[1].sale_date);
}

#[tokio::test]
async fn test_client_searches_are_scoped_to_owner() {
    let (store, ana, beto) = setup().await;
    seed_client(&store, &ana, "12345678", "Laura").await;
    seed_client(&store, &ana, "23456789", "Lucía").await;
    seed_client(&store, &beto, "34567890", "Laureano").await;
    let service = ClientService::new(Arc::new(store));

    let page = service
        .clients_page_by_filter(Some("lau"), ANA, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].dni, "12345678");

    let everything = service
        .clients_page_by_filter(None, ANA, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(everything.total_elements, 2);

    assert!(service.exists_dni("34567890", BETO).await.unwrap());
    assert!(!service.exists_dni("34567890", ANA).await.unwrap());
    assert!(!service.exists_phone("1155550000", ANA).await.unwrap());
}

#[tokio::test]
async fn test_register_and_login() {
    let store = MemoryStore::new();
    let users = UserService::new(Arc::new(store.clone()), 4);
    let jwt = JwtConfig {
        secret: "test-secret".to_string(),
        expiration: 3_600,
    };
    let auth = AuthService::new(Arc::new(store), jwt.clone());

    let registered = users
        .register_user(UserRequest {
            name: "Ana".to_string(),
            lastname: "García".to_string(),
            email: "Ana@Example.com".to_string(),
            password: "supersecreta".to_string(),
            role_names: vec!["ROLE_ADMIN".to_string()],
        })
        .await
        .unwrap();
    assert_eq!(registered.email, ANA);
    assert_eq!(registered.roles, vec![ROLE_USER.to_string()]);
    assert!(users.check_repeated_email("ANA@example.com").await.unwrap());

    let login = auth
        .login(LoginRequest {
            email: ANA.to_string(),
            password: "supersecreta".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(login.token_type, "Bearer");
    assert_eq!(verify_token(&login.token, &jwt).unwrap().sub, ANA);

    let wrong = auth
        .login(LoginRequest {
            email: ANA.to_string(),
            password: "incorrecta".to_string(),
        })
        .await;
    assert!(matches!(wrong, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn test_list_users_requires_admin() {
    let (store, _, _) = setup().await;
    let users = UserService::new(Arc::new(store), 4);

    let regular = AuthenticatedUser {
        email: ANA.to_string(),
        roles: vec![ROLE_USER.to_string()],
    };
    let result = users.list_users(&regular).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let admin = AuthenticatedUser {
        email: BETO.to_string(),
        roles: vec![ROLE_USER.to_string(), ROLE_ADMIN.to_string()],
    };
    assert_eq!(users.list_users(&admin).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let store = MemoryStore::new();
    seed_user(&store, ANA).await;
    let users = UserService::new(Arc::new(store), 4);

    let result = users
        .register_user(UserRequest {
            name: "Ana".to_string(),
            lastname: "García".to_string(),
            email: ANA.to_string(),
            password: "supersecreta".to_string(),
            role_names: vec![],
        })
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

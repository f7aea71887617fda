//! Resource service behaviour against the in-memory store.

use minicrud::{
    AppError, Cancellation, DataGateway, FakeSeedProvider, MemoryStore, Product, ProductsService,
    RetryPolicy, User, UsersService,
};
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

struct Harness {
    store: MemoryStore,
    users: UsersService,
    products: ProductsService,
    cancel: Cancellation,
}

#[fixture]
fn harness() -> Harness {
    let store = MemoryStore::new();
    let gateway = DataGateway::new(Arc::new(store.clone()), RetryPolicy::none());
    Harness {
        users: UsersService::new(gateway.clone(), Arc::new(FakeSeedProvider)),
        products: ProductsService::new(gateway),
        store,
        cancel: Cancellation::never(),
    }
}

fn user(login: &str) -> User {
    User {
        login: login.into(),
        password_hash: "c2VjcmV0".into(),
        email: format!("{}@example.com", login),
        ..User::default()
    }
}

fn product(name: &str) -> Product {
    Product {
        name: name.into(),
        description: "A sturdy thing".into(),
        adjective: "Rustic".into(),
        material: "Wooden".into(),
        price: Decimal::new(1999, 2),
        ..Product::default()
    }
}

#[rstest]
#[tokio::test]
async fn created_user_round_trips(harness: Harness) {
    let created = harness.users.create(&harness.cancel, user("ada")).await.unwrap();
    assert_ne!(created.id, Uuid::nil());
    assert_eq!(created.login, "ada");
    assert_eq!(created.password_hash, "c2VjcmV0");
    assert_eq!(created.email, "ada@example.com");
    assert!(!created.avatar_url.is_empty(), "generated fields are backfilled");
    assert!(!created.last_known_ip.is_empty());

    let fetched = harness.users.get(&harness.cancel, created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[rstest]
#[tokio::test]
async fn client_supplied_id_is_replaced(harness: Harness) {
    let mut payload = product("Chair");
    payload.id = Uuid::new_v4();
    let created = harness.products.create(&harness.cancel, payload.clone()).await.unwrap();
    assert_ne!(created.id, payload.id);
    assert_eq!(created.price, Decimal::new(1999, 2));
    assert!(harness.products.get(&harness.cancel, payload.id).await.is_err());
}

#[rstest]
#[case::login(User { login: " ".into(), ..user("x") }, "login is required")]
#[case::password(User { password_hash: String::new(), ..user("x") }, "passwordHash is required")]
#[case::email(User { email: String::new(), ..user("x") }, "email is required")]
#[tokio::test]
async fn blank_user_fields_are_rejected(
    harness: Harness,
    #[case] payload: User,
    #[case] expected: &str,
) {
    let err = harness.users.create(&harness.cancel, payload).await.unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg == expected), "{err}");
    assert!(harness.store.users().await.is_empty());
}

#[rstest]
#[case::name(Product { name: String::new(), ..product("x") })]
#[case::description(Product { description: "\t".into(), ..product("x") })]
#[case::adjective(Product { adjective: String::new(), ..product("x") })]
#[case::material(Product { material: String::new(), ..product("x") })]
#[tokio::test]
async fn blank_product_fields_are_rejected(harness: Harness, #[case] payload: Product) {
    let err = harness.products.create(&harness.cancel, payload).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(harness.store.products().await.is_empty());
}

#[rstest]
#[tokio::test]
async fn duplicate_login_is_a_conflict(harness: Harness) {
    let first = harness.users.create(&harness.cancel, user("ada")).await.unwrap();
    let mut again = user("ada");
    again.email = "other@example.com".into();
    let err = harness.users.create(&harness.cancel, again).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = harness.store.users().await;
    assert_eq!(stored, vec![first]);
}

#[rstest]
#[tokio::test]
async fn existing_id_is_a_conflict(harness: Harness) {
    let first = harness.users.create(&harness.cancel, user("ada")).await.unwrap();
    let clash = User { id: first.id, ..user("bob") };
    let err = harness.users.create(&harness.cancel, clash).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(harness.store.users().await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn update_copies_mutable_user_fields(harness: Harness) {
    let created = harness.users.create(&harness.cancel, user("ada")).await.unwrap();
    let change = User {
        id: created.id,
        login: "ada2".into(),
        password_hash: "bmV3".into(),
        email: "ada2@example.com".into(),
        avatar_url: "ignored".into(),
        last_known_ip: "ignored".into(),
    };
    harness.users.update(&harness.cancel, change).await.unwrap();

    let stored = harness.users.get(&harness.cancel, created.id).await.unwrap();
    assert_eq!(stored.login, "ada2");
    assert_eq!(stored.password_hash, "bmV3");
    assert_eq!(stored.email, "ada2@example.com");
    assert_eq!(stored.avatar_url, created.avatar_url);
    assert_eq!(stored.last_known_ip, created.last_known_ip);
}

#[rstest]
#[tokio::test]
async fn update_rejects_login_owned_by_someone_else(harness: Harness) {
    harness.users.create(&harness.cancel, user("ada")).await.unwrap();
    let bob = harness.users.create(&harness.cancel, user("bob")).await.unwrap();
    let err = harness
        .users
        .update(&harness.cancel, User { id: bob.id, ..user("ada") })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    let stored = harness.users.get(&harness.cancel, bob.id).await.unwrap();
    assert_eq!(stored.login, "bob");
}

#[rstest]
#[tokio::test]
async fn update_of_missing_row_is_not_found(harness: Harness) {
    harness.users.create(&harness.cancel, user("ada")).await.unwrap();
    harness.products.create(&harness.cancel, product("Chair")).await.unwrap();
    let users_before = harness.store.users().await;
    let products_before = harness.store.products().await;

    let err = harness
        .users
        .update(&harness.cancel, User { id: Uuid::new_v4(), ..user("ghost") })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = harness
        .products
        .update(&harness.cancel, Product { id: Uuid::new_v4(), ..product("ghost") })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(harness.store.users().await, users_before);
    assert_eq!(harness.store.products().await, products_before);
}

#[rstest]
#[tokio::test]
async fn bad_email_is_checked_before_lookup(harness: Harness) {
    let payload = User {
        id: Uuid::new_v4(),
        email: "not-an-address".into(),
        ..user("ghost")
    };
    let err = harness.users.update(&harness.cancel, payload).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[rstest]
#[tokio::test]
async fn product_update_copies_all_mutable_fields(harness: Harness) {
    let created = harness.products.create(&harness.cancel, product("Chair")).await.unwrap();
    let change = Product {
        id: created.id,
        name: "Table".into(),
        description: "Flat".into(),
        adjective: "Sleek".into(),
        material: "Granite".into(),
        price: Decimal::new(50000, 2),
    };
    harness.products.update(&harness.cancel, change.clone()).await.unwrap();
    assert_eq!(harness.products.get(&harness.cancel, created.id).await.unwrap(), change);
}

#[rstest]
#[tokio::test]
async fn delete_twice_is_not_found_the_second_time(harness: Harness) {
    let created = harness.products.create(&harness.cancel, product("Chair")).await.unwrap();
    harness.products.delete(&harness.cancel, created.id).await.unwrap();
    let err = harness.products.delete(&harness.cancel, created.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let ada = harness.users.create(&harness.cancel, user("ada")).await.unwrap();
    harness.users.delete(&harness.cancel, ada.id).await.unwrap();
    assert!(matches!(
        harness.users.delete(&harness.cancel, ada.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[rstest]
#[tokio::test]
async fn empty_tables_list_as_not_found(harness: Harness) {
    assert!(matches!(harness.users.list(&harness.cancel).await, Err(AppError::NotFound(_))));
    assert!(matches!(harness.products.list(&harness.cancel).await, Err(AppError::NotFound(_))));

    harness.users.create(&harness.cancel, user("ada")).await.unwrap();
    assert_eq!(harness.users.list(&harness.cancel).await.unwrap().len(), 1);
}

#[rstest]
#[tokio::test]
async fn missing_id_is_not_found(harness: Harness) {
    assert!(matches!(
        harness.users.get(&harness.cancel, Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        harness.products.get(&harness.cancel, Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}

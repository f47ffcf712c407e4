//! Integration tests for the cart → checkout → settlement flow.
//!
//! All tests run against an in-memory SQLite database with migrations
//! applied, exercising the real transactions end to end.

use chrono::Utc;
use uuid::Uuid;

use store_core::{
    CoreError, OrderStatus, PaymentMethod, PaymentStatus, Product, Role, User,
};
use store_db::{Database, DbConfig, StoreError};

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn seed_user(db: &Database, username: &str) -> User {
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "argon2-hash-placeholder".to_string(),
        location: "Testville".to_string(),
        role: Role::User,
        payment_method: PaymentMethod::Card,
        is_verified: true,
        joined_at: Utc::now(),
    };
    db.users().insert(&user).await.unwrap();
    user
}

async fn seed_product(db: &Database, name: &str, price_cents: i64, stock: i64) -> Product {
    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: None,
        price_cents,
        stock,
        min_stock_level: 0,
        category_id: None,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.unwrap();
    product
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn checkout_decrements_stock_and_empties_cart() {
    let db = test_db().await;
    let user = seed_user(&db, "alice").await;
    let product = seed_product(&db, "Widget", 1099, 10).await;

    db.carts().add_item(&user.id, &product.id, 3).await.unwrap();

    let outcome = db.orders().checkout(&user.id).await.unwrap();

    assert_eq!(outcome.order.status, OrderStatus::Pending);
    assert_eq!(outcome.order.amount_cents, 3 * 1099);
    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.items[0].quantity, 3);
    assert_eq!(outcome.items[0].price_cents, 1099);

    let product = db.products().get_by_id(&product.id).await.unwrap();
    assert_eq!(product.stock, 7);

    let view = db.carts().view(&user.id).await.unwrap();
    assert!(view.lines.is_empty());
    assert_eq!(view.total_cents, 0);
}

#[tokio::test]
async fn checkout_of_empty_cart_fails() {
    let db = test_db().await;
    let user = seed_user(&db, "bob").await;

    let err = db.orders().checkout(&user.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Core(CoreError::EmptyCart)));
}

#[tokio::test]
async fn checkout_with_insufficient_stock_changes_nothing() {
    let db = test_db().await;
    let user = seed_user(&db, "carol").await;
    let plenty = seed_product(&db, "Plenty", 500, 100).await;
    let scarce = seed_product(&db, "Scarce", 900, 2).await;

    db.carts().add_item(&user.id, &plenty.id, 5).await.unwrap();
    db.carts().add_item(&user.id, &scarce.id, 3).await.unwrap();

    let err = db.orders().checkout(&user.id).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Core(CoreError::InsufficientStock {
            available: 2,
            requested: 3,
            ..
        })
    ));

    // The whole transaction rolled back: no partial stock decrement, cart
    // still intact, no order created.
    assert_eq!(db.products().get_by_id(&plenty.id).await.unwrap().stock, 100);
    assert_eq!(db.products().get_by_id(&scarce.id).await.unwrap().stock, 2);

    let view = db.carts().view(&user.id).await.unwrap();
    assert_eq!(view.lines.len(), 2);

    assert!(db.orders().list_for_user(&user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn order_amount_is_frozen_against_price_changes() {
    let db = test_db().await;
    let user = seed_user(&db, "dave").await;
    let mut product = seed_product(&db, "Gadget", 2000, 10).await;

    db.carts().add_item(&user.id, &product.id, 2).await.unwrap();
    let outcome = db.orders().checkout(&user.id).await.unwrap();

    // Catalog price doubles after the purchase.
    product.price_cents = 4000;
    product.updated_at = Utc::now();
    db.products().update(&product).await.unwrap();

    let order = db.orders().get_by_id(&outcome.order.id).await.unwrap();
    assert_eq!(order.amount_cents, 4000);

    let items = db.orders().items(&order.id).await.unwrap();
    assert_eq!(items[0].price_cents, 2000);
    assert_eq!(items[0].line_total().cents(), 4000);
}

#[tokio::test]
async fn concurrent_checkouts_never_oversell() {
    let db = test_db().await;
    let alice = seed_user(&db, "alice2").await;
    let bob = seed_user(&db, "bob2").await;
    let product = seed_product(&db, "LastOne", 1500, 1).await;

    db.carts().add_item(&alice.id, &product.id, 1).await.unwrap();
    db.carts().add_item(&bob.id, &product.id, 1).await.unwrap();

    let orders = db.orders();
    let (a, b) = tokio::join!(orders.checkout(&alice.id), orders.checkout(&bob.id));

    // Exactly one of the two checkouts wins the last unit.
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);

    let product = db.products().get_by_id(&product.id).await.unwrap();
    assert_eq!(product.stock, 0);
}

// =============================================================================
// Cart semantics
// =============================================================================

#[tokio::test]
async fn repeated_adds_merge_into_one_line() {
    let db = test_db().await;
    let user = seed_user(&db, "erin").await;
    let product = seed_product(&db, "Widget", 100, 50).await;

    db.carts().add_item(&user.id, &product.id, 2).await.unwrap();
    db.carts().add_item(&user.id, &product.id, 3).await.unwrap();

    let view = db.carts().view(&user.id).await.unwrap();
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].quantity, 5);
    assert_eq!(view.total_cents, 500);
}

#[tokio::test]
async fn add_to_cart_rejects_unknown_product() {
    let db = test_db().await;
    let user = seed_user(&db, "frank").await;

    let err = db
        .carts()
        .add_item(&user.id, "no-such-product", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Core(CoreError::ProductNotFound(_))));
}

#[tokio::test]
async fn remove_fewer_units_decrements_the_line() {
    let db = test_db().await;
    let user = seed_user(&db, "grace").await;
    let product = seed_product(&db, "Widget", 100, 50).await;

    db.carts().add_item(&user.id, &product.id, 5).await.unwrap();
    let view = db.carts().view(&user.id).await.unwrap();

    db.carts()
        .remove_item(&user.id, &view.lines[0].id, 2)
        .await
        .unwrap();

    let view = db.carts().view(&user.id).await.unwrap();
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].quantity, 3);
}

#[tokio::test]
async fn remove_exact_units_deletes_the_line() {
    let db = test_db().await;
    let user = seed_user(&db, "heidi").await;
    let product = seed_product(&db, "Widget", 100, 50).await;

    db.carts().add_item(&user.id, &product.id, 4).await.unwrap();
    let view = db.carts().view(&user.id).await.unwrap();

    db.carts()
        .remove_item(&user.id, &view.lines[0].id, 4)
        .await
        .unwrap();

    let view = db.carts().view(&user.id).await.unwrap();
    assert!(view.lines.is_empty());
}

#[tokio::test]
async fn remove_more_than_held_fails_and_leaves_line_unchanged() {
    let db = test_db().await;
    let user = seed_user(&db, "ivan").await;
    let product = seed_product(&db, "Widget", 100, 50).await;

    db.carts().add_item(&user.id, &product.id, 3).await.unwrap();
    let view = db.carts().view(&user.id).await.unwrap();

    let err = db
        .carts()
        .remove_item(&user.id, &view.lines[0].id, 5)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Core(CoreError::InsufficientQuantity {
            available: 3,
            requested: 5,
        })
    ));

    let view = db.carts().view(&user.id).await.unwrap();
    assert_eq!(view.lines[0].quantity, 3);
}

#[tokio::test]
async fn setting_quantity_below_one_deletes_the_line() {
    let db = test_db().await;
    let user = seed_user(&db, "judy").await;
    let product = seed_product(&db, "Widget", 100, 50).await;

    db.carts().add_item(&user.id, &product.id, 2).await.unwrap();
    let view = db.carts().view(&user.id).await.unwrap();

    db.carts()
        .update_item(&user.id, &view.lines[0].id, 0)
        .await
        .unwrap();

    let view = db.carts().view(&user.id).await.unwrap();
    assert!(view.lines.is_empty());
}

#[tokio::test]
async fn cart_lines_are_scoped_to_their_owner() {
    let db = test_db().await;
    let owner = seed_user(&db, "owner").await;
    let other = seed_user(&db, "other").await;
    let product = seed_product(&db, "Widget", 100, 50).await;

    db.carts().add_item(&owner.id, &product.id, 2).await.unwrap();
    let view = db.carts().view(&owner.id).await.unwrap();

    // Another user referencing the line id sees it as missing.
    let err = db
        .carts()
        .remove_item(&other.id, &view.lines[0].id, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Core(CoreError::CartItemNotFound(_))));
}

// =============================================================================
// Settlement
// =============================================================================

#[tokio::test]
async fn settlement_completes_payment_and_ships_order() {
    let db = test_db().await;
    let user = seed_user(&db, "kate").await;
    let product = seed_product(&db, "Widget", 2500, 10).await;

    db.carts().add_item(&user.id, &product.id, 2).await.unwrap();
    let outcome = db.orders().checkout(&user.id).await.unwrap();

    let settled = db
        .payments()
        .settle(&outcome.order.id, PaymentMethod::Card)
        .await
        .unwrap();

    assert!(!settled.already_settled);
    assert_eq!(settled.payment.status, PaymentStatus::Completed);
    assert_eq!(settled.payment.amount_cents, 5000);
    assert!(settled
        .payment
        .transaction_id
        .as_deref()
        .unwrap()
        .starts_with("TXN-"));
    assert_eq!(settled.invoice.amount_cents, 5000);

    let order = db.orders().get_by_id(&outcome.order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
}

#[tokio::test]
async fn settlement_is_idempotent() {
    let db = test_db().await;
    let user = seed_user(&db, "leo").await;
    let product = seed_product(&db, "Widget", 1000, 10).await;

    db.carts().add_item(&user.id, &product.id, 1).await.unwrap();
    let outcome = db.orders().checkout(&user.id).await.unwrap();

    let first = db
        .payments()
        .settle(&outcome.order.id, PaymentMethod::Card)
        .await
        .unwrap();
    let second = db
        .payments()
        .settle(&outcome.order.id, PaymentMethod::Cash)
        .await
        .unwrap();

    // Second call changed nothing: same payment, same transaction id, same
    // invoice, method not overwritten.
    assert!(second.already_settled);
    assert_eq!(second.payment.id, first.payment.id);
    assert_eq!(second.payment.transaction_id, first.payment.transaction_id);
    assert_eq!(second.payment.method, PaymentMethod::Card);
    assert_eq!(second.invoice.id, first.invoice.id);

    let order = db.orders().get_by_id(&outcome.order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
}

#[tokio::test]
async fn settlement_of_unknown_order_fails() {
    let db = test_db().await;

    let err = db
        .payments()
        .settle("no-such-order", PaymentMethod::Card)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Core(CoreError::OrderNotFound(_))));
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn product_listing_filters_and_paginates() {
    let db = test_db().await;

    let category = store_core::Category {
        id: Uuid::new_v4().to_string(),
        name: "Tools".to_string(),
        description: None,
    };
    db.categories().insert(&category).await.unwrap();

    for i in 0..15 {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: format!("Hammer {i:02}"),
            description: None,
            price_cents: 100 * (i + 1),
            stock: 5,
            min_stock_level: 0,
            category_id: Some(category.id.clone()),
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
    }
    seed_product(&db, "Uncategorized", 50, 5).await;

    let page = db
        .products()
        .list(&store_db::ProductQuery {
            category_id: Some(category.id.clone()),
            search: None,
            page: 2,
            page_size: 10,
        })
        .await
        .unwrap();

    assert_eq!(page.total, 15);
    assert_eq!(page.products.len(), 5);
    assert_eq!(page.page, 2);

    let found = db
        .products()
        .list(&store_db::ProductQuery {
            category_id: None,
            search: Some("Hammer 03".to_string()),
            page: 1,
            page_size: 10,
        })
        .await
        .unwrap();
    assert_eq!(found.total, 1);
}

#[tokio::test]
async fn duplicate_usernames_and_emails_are_rejected() {
    let db = test_db().await;
    seed_user(&db, "mallory").await;

    let dup = User {
        id: Uuid::new_v4().to_string(),
        username: "mallory".to_string(),
        email: "different@example.com".to_string(),
        password_hash: "hash".to_string(),
        location: String::new(),
        role: Role::User,
        payment_method: PaymentMethod::Card,
        is_verified: false,
        joined_at: Utc::now(),
    };

    let err = db.users().insert(&dup).await.unwrap_err();
    assert!(matches!(err, store_db::DbError::UniqueViolation { .. }));
}

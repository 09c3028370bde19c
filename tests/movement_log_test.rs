mod common;

use common::TestApp;
use sea_orm::EntityTrait;
use stocktrack_api::entities::inventory_movement::MovementType;
use stocktrack_api::services::inventory::RecordMovement;

async fn record(app: &TestApp, product_id: i64, movement_type: MovementType, quantity: i32) -> i64 {
    app.state
        .inventory_service
        .record_movement(RecordMovement {
            product_id,
            movement_type,
            quantity,
            user_id: app.user_id,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn listing_is_ordered_most_recent_first() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Keyboard", 50).await;

    record(&app, product_id, MovementType::In, 1).await;
    record(&app, product_id, MovementType::Out, 2).await;
    record(&app, product_id, MovementType::In, 3).await;

    let (entries, total) = app
        .state
        .inventory_service
        .list_movements(1, 20)
        .await
        .unwrap();

    assert_eq!(total, 3);
    assert_eq!(entries.len(), 3);
    // Insertion order reversed: the most recent entry leads.
    assert_eq!(entries[0].quantity, 3);
    assert_eq!(entries[1].quantity, 2);
    assert_eq!(entries[2].quantity, 1);
    for pair in entries.windows(2) {
        assert!((pair[0].created_at, pair[0].id) > (pair[1].created_at, pair[1].id));
    }
}

#[tokio::test]
async fn listing_enriches_rows_with_display_names() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Scanner", 5).await;

    record(&app, product_id, MovementType::In, 2).await;

    let (entries, _) = app
        .state
        .inventory_service
        .list_movements(1, 20)
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].username, "ana");
    assert_eq!(entries[0].product_name, "Scanner");
}

#[tokio::test]
async fn missing_user_degrades_to_empty_username_for_that_row_only() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Printer", 50).await;

    record(&app, product_id, MovementType::In, 1).await;

    let bob = app.seed_user("bob", "bob@example.com").await;
    app.state
        .inventory_service
        .record_movement(RecordMovement {
            product_id,
            movement_type: MovementType::Out,
            quantity: 2,
            user_id: bob,
        })
        .await
        .unwrap();

    app.delete_user_row(bob).await;

    let (entries, _) = app
        .state
        .inventory_service
        .list_movements(1, 20)
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    // Bob's movement is the most recent; its username degrades to empty.
    assert_eq!(entries[0].username, "");
    assert_eq!(entries[0].quantity, 2);
    // Ana's row is unaffected.
    assert_eq!(entries[1].username, "ana");
}

#[tokio::test]
async fn missing_product_degrades_to_empty_name_for_that_row_only() {
    let app = TestApp::new().await;
    let kept = app.seed_product("Kept", 10).await;
    let dropped = app.seed_product("Dropped", 10).await;

    record(&app, kept, MovementType::In, 1).await;
    record(&app, dropped, MovementType::In, 1).await;

    use stocktrack_api::entities::product::Entity as Products;
    Products::delete_by_id(dropped)
        .exec(app.state.db.as_ref())
        .await
        .unwrap();

    let (entries, _) = app
        .state
        .inventory_service
        .list_movements(1, 20)
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].product_name, "");
    assert_eq!(entries[1].product_name, "Kept");
}

#[tokio::test]
async fn listing_paginates() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Tablet", 50).await;

    for quantity in 1..=5 {
        record(&app, product_id, MovementType::In, quantity).await;
    }

    let (first, total) = app
        .state
        .inventory_service
        .list_movements(1, 2)
        .await
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].quantity, 5);

    let (third, _) = app
        .state
        .inventory_service
        .list_movements(3, 2)
        .await
        .unwrap();
    assert_eq!(third.len(), 1);
    assert_eq!(third[0].quantity, 1);
}

#[tokio::test]
async fn zero_page_or_limit_is_rejected() {
    let app = TestApp::new().await;

    assert!(app
        .state
        .inventory_service
        .list_movements(0, 20)
        .await
        .is_err());
    assert!(app
        .state
        .inventory_service
        .list_movements(1, 0)
        .await
        .is_err());
}

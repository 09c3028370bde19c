mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rstest::rstest;
use sea_orm::EntityTrait;
use stocktrack_api::entities::inventory_movement::{Entity as Movements, MovementType};
use stocktrack_api::errors::ServiceError;
use stocktrack_api::services::inventory::RecordMovement;
use uuid::Uuid;

fn movement(app: &TestApp, product_id: i64, movement_type: MovementType, quantity: i32) -> RecordMovement {
    RecordMovement {
        product_id,
        movement_type,
        quantity,
        user_id: app.user_id,
    }
}

#[tokio::test]
async fn out_movement_then_revert_restores_prior_quantity() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Keyboard", 10).await;

    let recorded = app
        .state
        .inventory_service
        .record_movement(movement(&app, product_id, MovementType::Out, 3))
        .await
        .unwrap();

    assert!(recorded.id > 0);
    assert_eq!(recorded.product_id, product_id);
    assert_eq!(recorded.movement_type, "out");
    assert_eq!(recorded.quantity, 3);
    assert_eq!(recorded.user_id, app.user_id);
    assert_eq!(app.stock_level(product_id).await, 7);

    app.state
        .inventory_service
        .revert_movement(recorded.id)
        .await
        .unwrap();

    assert_eq!(app.stock_level(product_id).await, 10);
    let remaining = Movements::find().all(app.state.db.as_ref()).await.unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn entry_then_revert_round_trip() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Monitor", 25).await;

    let recorded = app
        .state
        .inventory_service
        .record_movement(movement(&app, product_id, MovementType::In, 8))
        .await
        .unwrap();
    assert_eq!(app.stock_level(product_id).await, 33);

    app.state
        .inventory_service
        .revert_movement(recorded.id)
        .await
        .unwrap();
    assert_eq!(app.stock_level(product_id).await, 25);
}

#[rstest]
#[case::entry(MovementType::In, 4, 14)]
#[case::exit(MovementType::Out, 4, 6)]
#[tokio::test]
async fn movement_changes_quantity_by_exactly_the_magnitude(
    #[case] movement_type: MovementType,
    #[case] quantity: i32,
    #[case] expected: i32,
) {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Cable", 10).await;

    app.state
        .inventory_service
        .record_movement(movement(&app, product_id, movement_type, quantity))
        .await
        .unwrap();

    assert_eq!(app.stock_level(product_id).await, expected);
}

#[tokio::test]
async fn stock_is_not_clamped_at_zero() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Mouse", 10).await;

    app.state
        .inventory_service
        .record_movement(movement(&app, product_id, MovementType::Out, 15))
        .await
        .unwrap();

    assert_eq!(app.stock_level(product_id).await, -5);
}

#[tokio::test]
async fn revert_applies_the_inverse_regardless_of_current_sign() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Webcam", 10).await;

    let recorded = app
        .state
        .inventory_service
        .record_movement(movement(&app, product_id, MovementType::Out, 15))
        .await
        .unwrap();
    assert_eq!(app.stock_level(product_id).await, -5);

    // Reverting an `out` adds the stored magnitude back, even from below zero.
    app.state
        .inventory_service
        .revert_movement(recorded.id)
        .await
        .unwrap();
    assert_eq!(app.stock_level(product_id).await, 10);
}

#[tokio::test]
async fn unprovisioned_user_is_rejected() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Headset", 10).await;

    let err = app
        .state
        .inventory_service
        .record_movement(RecordMovement {
            product_id,
            movement_type: MovementType::In,
            quantity: 1,
            user_id: Uuid::new_v4(),
        })
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::UserNotFound(_));
    assert_eq!(app.stock_level(product_id).await, 10);
}

#[tokio::test]
async fn unknown_product_creates_no_movement() {
    let app = TestApp::new().await;

    let err = app
        .state
        .inventory_service
        .record_movement(movement(&app, 9999, MovementType::In, 1))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ProductNotFound(9999));
    let movements = Movements::find().all(app.state.db.as_ref()).await.unwrap();
    assert!(movements.is_empty());
}

#[rstest]
#[case::zero(0)]
#[case::negative(-3)]
#[tokio::test]
async fn non_positive_quantity_is_rejected(#[case] quantity: i32) {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Dock", 10).await;

    let err = app
        .state
        .inventory_service
        .record_movement(movement(&app, product_id, MovementType::In, quantity))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ValidationError(_));
    assert_eq!(app.stock_level(product_id).await, 10);
    let movements = Movements::find().all(app.state.db.as_ref()).await.unwrap();
    assert!(movements.is_empty());
}

#[tokio::test]
async fn reverting_twice_fails_without_double_adjusting() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Charger", 10).await;

    let recorded = app
        .state
        .inventory_service
        .record_movement(movement(&app, product_id, MovementType::Out, 3))
        .await
        .unwrap();

    app.state
        .inventory_service
        .revert_movement(recorded.id)
        .await
        .unwrap();
    assert_eq!(app.stock_level(product_id).await, 10);

    let err = app
        .state
        .inventory_service
        .revert_movement(recorded.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::MovementNotFound(_));
    assert_eq!(app.stock_level(product_id).await, 10);
}

#[tokio::test]
async fn revert_of_unknown_movement_fails() {
    let app = TestApp::new().await;

    let err = app
        .state
        .inventory_service
        .revert_movement(424242)
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::MovementNotFound(424242));
}

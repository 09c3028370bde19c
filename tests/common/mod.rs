use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use stocktrack_api::{
    auth::{AuthConfig, AuthService, RegisterRequest},
    config::AppConfig,
    events::{self, EventSender},
    migrator::Migrator,
    services::{
        categories::CategoryService,
        inventory::{InventoryService, StockWritePolicy},
        products::{CreateProduct, ProductService},
        reports::DashboardService,
    },
    AppState,
};

/// Helper harness for spinning up an application backed by an in-memory
/// SQLite database, with one registered and authenticated user.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub auth_service: Arc<AuthService>,
    pub user_id: Uuid,
    pub token: String,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a test application with the default ledger policies
    /// (atomic stock writes, negative stock permitted).
    #[allow(dead_code)]
    pub async fn new() -> Self {
        Self::with_policies(StockWritePolicy::Atomic, true).await
    }

    pub async fn with_policies(
        write_policy: StockWritePolicy,
        allow_negative_stock: bool,
    ) -> Self {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        // A single connection keeps every query on the same in-memory database.
        let mut opt = ConnectOptions::new(cfg.database_url.clone());
        opt.max_connections(1).min_connections(1);
        let pool = Database::connect(opt)
            .await
            .expect("failed to create test database");
        let db = Arc::new(pool);

        Migrator::up(db.as_ref(), None)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(1024);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_cfg = AuthConfig::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
            Duration::from_secs(cfg.jwt_expiration),
        );
        let auth_service = Arc::new(AuthService::new(auth_cfg, db.clone(), event_sender.clone()));

        let state = AppState {
            db: db.clone(),
            config: cfg,
            event_sender: event_sender.clone(),
            inventory_service: InventoryService::new(
                db.clone(),
                event_sender.clone(),
                write_policy,
                allow_negative_stock,
            ),
            product_service: ProductService::new(db.clone(), event_sender.clone()),
            category_service: CategoryService::new(db.clone(), event_sender.clone()),
            dashboard_service: DashboardService::new(db.clone()),
        };

        let router = Router::new()
            .nest("/api/v1", stocktrack_api::api_v1_routes())
            .nest(
                "/auth",
                stocktrack_api::auth::auth_routes().with_state(auth_service.clone()),
            )
            .layer(axum::middleware::from_fn_with_state(
                auth_service.clone(),
                |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
                 mut req: axum::extract::Request,
                 next: axum::middleware::Next| async move {
                    req.extensions_mut().insert(auth);
                    next.run(req).await
                },
            ))
            .with_state(state.clone());

        // One provisioned employee to act on the ledger.
        let account = auth_service
            .register(RegisterRequest {
                username: "ana".to_string(),
                employee_number: "E-100".to_string(),
                email: "ana@example.com".to_string(),
                password: "correct-horse-battery".to_string(),
            })
            .await
            .expect("failed to register test user");
        let token = auth_service
            .generate_token(&account)
            .expect("failed to issue test token")
            .access_token;

        Self {
            router,
            state,
            auth_service,
            user_id: account.id,
            token,
            _event_task: event_task,
        }
    }

    /// Issue a request against the in-process router and decode the JSON body.
    #[allow(dead_code)]
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .expect("failed to build request"),
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body was not JSON")
        };

        (status, value)
    }

    /// Authenticated request using the seeded user's token.
    #[allow(dead_code)]
    pub async fn authed(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let token = self.token.clone();
        self.request(method, uri, body, Some(&token)).await
    }

    /// Seed a product through the product service and return its id.
    #[allow(dead_code)]
    pub async fn seed_product(&self, name: &str, quantity: i32) -> i64 {
        self.seed_product_with_limits(name, quantity, 0, 100).await
    }

    #[allow(dead_code)]
    pub async fn seed_product_with_limits(
        &self,
        name: &str,
        quantity: i32,
        low_limit: i32,
        high_limit: i32,
    ) -> i64 {
        self.state
            .product_service
            .create_product(CreateProduct {
                name: name.to_string(),
                description: None,
                category_id: 1,
                quantity,
                price: rust_decimal::Decimal::new(1999, 2),
                low_limit,
                high_limit,
            })
            .await
            .expect("failed to seed product")
            .id
    }

    /// Current stock level straight from the store.
    #[allow(dead_code)]
    pub async fn stock_level(&self, product_id: i64) -> i32 {
        use sea_orm::EntityTrait;
        use stocktrack_api::entities::product::Entity as Products;

        Products::find_by_id(product_id)
            .one(self.state.db.as_ref())
            .await
            .expect("product query failed")
            .expect("product missing")
            .quantity
    }

    /// Register one more provisioned user and return its id.
    #[allow(dead_code)]
    pub async fn seed_user(&self, username: &str, email: &str) -> Uuid {
        self.auth_service
            .register(RegisterRequest {
                username: username.to_string(),
                employee_number: format!("E-{username}"),
                email: email.to_string(),
                password: "another-secret-password".to_string(),
            })
            .await
            .expect("failed to register user")
            .id
    }

    /// Remove a user's directory row, leaving any issued tokens valid but
    /// the identity unprovisioned.
    #[allow(dead_code)]
    pub async fn delete_user_row(&self, user_id: Uuid) {
        use sea_orm::EntityTrait;
        use stocktrack_api::entities::user::Entity as Users;

        Users::delete_by_id(user_id)
            .exec(self.state.db.as_ref())
            .await
            .expect("failed to delete user row");
    }
}

#[allow(dead_code)]
pub fn stock_change_body(product_id: i64, quantity: i32) -> Value {
    json!({ "product_id": product_id, "quantity": quantity })
}

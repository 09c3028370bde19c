use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "stocktrack API",
        version = "0.1.0",
        description = r#"
# stocktrack Inventory API

Backend for a barcode-driven inventory tracker.

- **Products & categories**: registry with per-product low/high stock limits
- **Inventory ledger**: stock entries and exits, each paired with one
  immutable movement record; any movement can be reverted
- **Movement log**: reverse-chronological history enriched with usernames
  and product names
- **Dashboard**: stock overview and per-product movement totals

## Authentication

All `/api/v1` endpoints except status and health require a JWT access token:

```
Authorization: Bearer <your-jwt-token>
```

Accounts are created via `/auth/register` and tokens issued via `/auth/login`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        crate::auth::register_handler,
        crate::auth::login_handler,
        crate::handlers::inventory::record_entry,
        crate::handlers::inventory::record_exit,
        crate::handlers::inventory::list_movements,
        crate::handlers::inventory::revert_movement,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::products::list_products,
        crate::handlers::categories::create_category,
        crate::handlers::categories::list_categories,
        crate::handlers::reports::get_stock_overview,
        crate::handlers::reports::get_movement_totals,
    ),
    components(schemas(
        crate::auth::RegisterRequest,
        crate::auth::LoginCredentials,
        crate::auth::RegisteredUser,
        crate::auth::TokenPair,
        crate::errors::ErrorResponse,
        crate::handlers::inventory::StockChangeRequest,
        crate::handlers::products::CreateProductRequest,
        crate::handlers::categories::CreateCategoryRequest,
        crate::services::inventory::MovementEntry,
        crate::services::reports::StockOverviewRow,
        crate::services::reports::MovementTotalsRow,
        crate::services::reports::StockStatus,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "inventory", description = "Stock movement ledger"),
        (name = "products", description = "Product registry"),
        (name = "categories", description = "Category registry"),
        (name = "dashboard", description = "Dashboard read models")
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/docs`, serving the generated document
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

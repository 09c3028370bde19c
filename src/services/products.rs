use crate::{
    db::DbPool,
    entities::product::{self, Entity as Products},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};

/// Input for creating a product
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub category_id: i64,
    pub quantity: i32,
    pub price: Decimal,
    pub low_limit: i32,
    pub high_limit: i32,
}

/// Service for the product registry. Creation seeds the initial stock level;
/// every later quantity change goes through the inventory ledger.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Creates a product after checking the creation-time invariants:
    /// non-empty name, non-negative price, `low_limit <= high_limit`.
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProduct,
    ) -> Result<product::Model, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "product name must not be empty".to_string(),
            ));
        }
        if input.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "price must not be negative".to_string(),
            ));
        }
        if input.low_limit > input.high_limit {
            return Err(ServiceError::ValidationError(format!(
                "low limit {} exceeds high limit {}",
                input.low_limit, input.high_limit
            )));
        }

        let item = product::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            category_id: Set(input.category_id),
            quantity: Set(input.quantity),
            price: Set(input.price),
            low_limit: Set(input.low_limit),
            high_limit: Set(input.high_limit),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        self.event_sender
            .send(Event::ProductCreated(item.id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(product_id = item.id, "product created");
        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> Result<product::Model, ServiceError> {
        Products::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(ServiceError::ProductNotFound(id))
    }

    /// Lists products with pagination
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        if page == 0 || limit == 0 {
            return Err(ServiceError::ValidationError(
                "page and limit must be positive".to_string(),
            ));
        }

        let paginator = Products::find()
            .order_by_asc(product::Column::Id)
            .paginate(self.db.as_ref(), limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;

        Ok((items, total))
    }
}

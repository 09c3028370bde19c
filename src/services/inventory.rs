use crate::{
    db::DbPool,
    entities::{
        inventory_movement::{self, Entity as Movements, MovementType},
        product::{self, Entity as Products},
        user::{self, Entity as Users},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// How stock quantity writes reach the store.
///
/// `Atomic` pushes the arithmetic into the store (`quantity = quantity + d`),
/// so concurrent recorders accumulate. `ReadModifyWrite` writes an absolute
/// value computed from a previously read snapshot; two concurrent writers can
/// read the same snapshot and the later write silently discards the earlier
/// delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockWritePolicy {
    Atomic,
    ReadModifyWrite,
}

/// Input for recording one stock movement
#[derive(Debug, Clone)]
pub struct RecordMovement {
    pub product_id: i64,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub user_id: Uuid,
}

/// One movement-log row enriched with display fields resolved from the user
/// and product tables.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovementEntry {
    pub id: i64,
    pub product_id: i64,
    pub movement_type: String,
    pub quantity: i32,
    pub user_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub username: String,
    pub product_name: String,
}

/// The inventory ledger: every accepted stock change is paired with exactly
/// one movement row, and reverting a movement applies its inverse.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
    event_sender: EventSender,
    write_policy: StockWritePolicy,
    allow_negative_stock: bool,
}

impl InventoryService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: EventSender,
        write_policy: StockWritePolicy,
        allow_negative_stock: bool,
    ) -> Self {
        Self {
            db,
            event_sender,
            write_policy,
            allow_negative_stock,
        }
    }

    /// Adjusts the product's stock level and appends the movement record.
    ///
    /// The acting identity must be provisioned in the user directory; holding
    /// a valid token alone is not enough. The quantity write is issued before
    /// the movement insert, and a failed insert does not roll the quantity
    /// back: the caller sees `DatabaseError` and the ledger is short one row
    /// until the operation is retried or reconciled.
    #[instrument(skip(self))]
    pub async fn record_movement(
        &self,
        command: RecordMovement,
    ) -> Result<inventory_movement::Model, ServiceError> {
        if command.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "movement quantity must be a positive integer".to_string(),
            ));
        }

        let db = self.db.as_ref();

        Users::find_by_id(command.user_id)
            .one(db)
            .await?
            .ok_or(ServiceError::UserNotFound(command.user_id))?;

        let item = Products::find_by_id(command.product_id)
            .one(db)
            .await?
            .ok_or(ServiceError::ProductNotFound(command.product_id))?;

        let delta = command.movement_type.signed(command.quantity);
        let new_quantity = item.quantity + delta;

        if !self.allow_negative_stock && new_quantity < 0 {
            return Err(ServiceError::InsufficientStock(format!(
                "product {} has {} on hand, cannot remove {}",
                item.id, item.quantity, command.quantity
            )));
        }

        self.apply_stock_delta(command.product_id, delta, item.quantity)
            .await?;

        let movement = inventory_movement::ActiveModel {
            product_id: Set(command.product_id),
            movement_type: Set(command.movement_type.as_str().to_string()),
            quantity: Set(command.quantity),
            user_id: Set(command.user_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        if new_quantity <= item.low_limit {
            warn!(
                product_id = item.id,
                quantity = new_quantity,
                low_limit = item.low_limit,
                "stock at or below low limit"
            );
        }

        self.event_sender
            .send(Event::MovementRecorded {
                movement_id: movement.id,
                product_id: movement.product_id,
                movement_type: movement.movement_type.clone(),
                quantity: movement.quantity,
                user_id: movement.user_id,
                new_quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(movement)
    }

    /// Deletes a movement and applies its inverse effect to the product.
    ///
    /// The delete happens before the quantity adjustment; an interruption in
    /// between loses the movement row while the product still reflects it.
    /// A second revert of the same id fails with `MovementNotFound` and makes
    /// no further quantity change.
    #[instrument(skip(self))]
    pub async fn revert_movement(&self, movement_id: i64) -> Result<(), ServiceError> {
        let db = self.db.as_ref();

        let movement = Movements::find_by_id(movement_id)
            .one(db)
            .await?
            .ok_or(ServiceError::MovementNotFound(movement_id))?;

        let movement_type = movement.movement_type().ok_or_else(|| {
            ServiceError::InternalError(format!(
                "movement {} has unrecognized type '{}'",
                movement.id, movement.movement_type
            ))
        })?;

        let deleted = Movements::delete_by_id(movement_id).exec(db).await?;
        if deleted.rows_affected == 0 {
            return Err(ServiceError::MovementNotFound(movement_id));
        }

        let item = Products::find_by_id(movement.product_id)
            .one(db)
            .await?
            .ok_or(ServiceError::ProductNotFound(movement.product_id))?;

        let inverse = -movement_type.signed(movement.quantity);
        self.apply_stock_delta(movement.product_id, inverse, item.quantity)
            .await?;

        self.event_sender
            .send(Event::MovementReverted {
                movement_id,
                product_id: movement.product_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }

    /// Writes a stock delta through the configured store primitive.
    ///
    /// `current` is the caller's snapshot of the stock level; only the
    /// read-modify-write policy uses it.
    async fn apply_stock_delta(
        &self,
        product_id: i64,
        delta: i32,
        current: i32,
    ) -> Result<(), ServiceError> {
        let db = self.db.as_ref();

        match self.write_policy {
            StockWritePolicy::Atomic => {
                let result = Products::update_many()
                    .col_expr(
                        product::Column::Quantity,
                        Expr::col(product::Column::Quantity).add(delta),
                    )
                    .filter(product::Column::Id.eq(product_id))
                    .exec(db)
                    .await?;

                if result.rows_affected == 0 {
                    return Err(ServiceError::ProductNotFound(product_id));
                }
            }
            StockWritePolicy::ReadModifyWrite => {
                let update = product::ActiveModel {
                    id: Set(product_id),
                    quantity: Set(current + delta),
                    ..Default::default()
                };
                update.update(db).await?;
            }
        }

        Ok(())
    }

    /// Movement log page ordered most recent first, each row enriched with
    /// the acting user's name and the product's name.
    ///
    /// The page's distinct user and product ids are resolved with one
    /// set-lookup per table; a row whose user or product cannot be resolved
    /// gets an empty string for that field instead of failing the listing.
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<MovementEntry>, u64), ServiceError> {
        if page == 0 || limit == 0 {
            return Err(ServiceError::ValidationError(
                "page and limit must be positive".to_string(),
            ));
        }

        let db = self.db.as_ref();

        let paginator = Movements::find()
            .order_by_desc(inventory_movement::Column::CreatedAt)
            .order_by_desc(inventory_movement::Column::Id)
            .paginate(db, limit);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        let mut user_ids: Vec<Uuid> = rows.iter().map(|m| m.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let mut product_ids: Vec<i64> = rows.iter().map(|m| m.product_id).collect();
        product_ids.sort_unstable();
        product_ids.dedup();

        let usernames = self.lookup_usernames(&user_ids).await;
        let product_names = self.lookup_product_names(&product_ids).await;

        let entries = rows
            .into_iter()
            .map(|m| MovementEntry {
                id: m.id,
                product_id: m.product_id,
                movement_type: m.movement_type.clone(),
                quantity: m.quantity,
                user_id: m.user_id,
                created_at: m.created_at,
                username: usernames.get(&m.user_id).cloned().unwrap_or_default(),
                product_name: product_names.get(&m.product_id).cloned().unwrap_or_default(),
            })
            .collect();

        Ok((entries, total))
    }

    async fn lookup_usernames(&self, user_ids: &[Uuid]) -> HashMap<Uuid, String> {
        if user_ids.is_empty() {
            return HashMap::new();
        }

        match Users::find()
            .filter(user::Column::Id.is_in(user_ids.iter().copied()))
            .all(self.db.as_ref())
            .await
        {
            Ok(users) => users.into_iter().map(|u| (u.id, u.username)).collect(),
            Err(e) => {
                warn!("username lookup failed, degrading to empty names: {}", e);
                HashMap::new()
            }
        }
    }

    async fn lookup_product_names(&self, product_ids: &[i64]) -> HashMap<i64, String> {
        if product_ids.is_empty() {
            return HashMap::new();
        }

        match Products::find()
            .filter(product::Column::Id.is_in(product_ids.iter().copied()))
            .all(self.db.as_ref())
            .await
        {
            Ok(items) => items.into_iter().map(|p| (p.id, p.name)).collect(),
            Err(e) => {
                warn!("product name lookup failed, degrading to empty names: {}", e);
                HashMap::new()
            }
        }
    }
}

use crate::{
    db::DbPool,
    entities::{
        inventory_movement::{Entity as Movements, MovementType},
        product::Entity as Products,
    },
    errors::ServiceError,
};
use sea_orm::EntityTrait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

/// Stock position of a product relative to its configured limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Low,
    Ok,
    High,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockOverviewRow {
    pub product_id: i64,
    pub name: String,
    pub quantity: i32,
    pub low_limit: i32,
    pub high_limit: i32,
    pub status: StockStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovementTotalsRow {
    pub product_id: i64,
    pub product_name: String,
    pub total_in: i64,
    pub total_out: i64,
}

/// Read models behind the dashboard charts
#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Per-product stock level classified against the low/high limits
    #[instrument(skip(self))]
    pub async fn stock_overview(&self) -> Result<Vec<StockOverviewRow>, ServiceError> {
        let items = Products::find().all(self.db.as_ref()).await?;

        let rows = items
            .into_iter()
            .map(|p| {
                let status = if p.quantity <= p.low_limit {
                    StockStatus::Low
                } else if p.quantity >= p.high_limit {
                    StockStatus::High
                } else {
                    StockStatus::Ok
                };
                StockOverviewRow {
                    product_id: p.id,
                    name: p.name,
                    quantity: p.quantity,
                    low_limit: p.low_limit,
                    high_limit: p.high_limit,
                    status,
                }
            })
            .collect();

        Ok(rows)
    }

    /// Total moved-in and moved-out quantity per product
    #[instrument(skip(self))]
    pub async fn movement_totals(&self) -> Result<Vec<MovementTotalsRow>, ServiceError> {
        let items = Products::find().all(self.db.as_ref()).await?;
        let movements = Movements::find().all(self.db.as_ref()).await?;

        let mut totals: HashMap<i64, (i64, i64)> = HashMap::new();
        for movement in &movements {
            let entry = totals.entry(movement.product_id).or_default();
            match movement.movement_type() {
                Some(MovementType::In) => entry.0 += i64::from(movement.quantity),
                Some(MovementType::Out) => entry.1 += i64::from(movement.quantity),
                None => {}
            }
        }

        let rows = items
            .into_iter()
            .map(|p| {
                let (total_in, total_out) = totals.get(&p.id).copied().unwrap_or_default();
                MovementTotalsRow {
                    product_id: p.id,
                    product_name: p.name,
                    total_in,
                    total_out,
                }
            })
            .collect();

        Ok(rows)
    }
}

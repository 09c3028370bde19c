use crate::{
    db::DbPool,
    entities::category::{self, Entity as Categories},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl CategoryService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        input: CreateCategory,
    ) -> Result<category::Model, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "category name must not be empty".to_string(),
            ));
        }

        let row = category::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        self.event_sender
            .send(Event::CategoryCreated(row.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(row)
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        let rows = Categories::find()
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await?;
        Ok(rows)
    }
}

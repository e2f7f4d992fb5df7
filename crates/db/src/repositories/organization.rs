//! Organization repository.

use std::sync::Arc;

use crate::entities::{Organization, organization};
use resgate_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::{Expr, Func},
};

/// Organization repository for database operations.
#[derive(Clone)]
pub struct OrganizationRepository {
    db: Arc<DatabaseConnection>,
}

impl OrganizationRepository {
    /// Create a new organization repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an organization by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<organization::Model>> {
        Organization::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an organization by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<organization::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("organization {id}")))
    }

    /// Find an organization by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<organization::Model>> {
        Organization::find()
            .filter(organization::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new organization.
    pub async fn create(&self, model: organization::ActiveModel) -> AppResult<organization::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an organization.
    pub async fn update(&self, model: organization::ActiveModel) -> AppResult<organization::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all organizations, alphabetically by name.
    pub async fn list_all(&self) -> AppResult<Vec<organization::Model>> {
        Organization::find()
            .order_by_asc(organization::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List organizations whose city matches the filter, case-insensitively
    /// and by substring (tolerates partially typed city names).
    pub async fn search_by_city(&self, city: &str) -> AppResult<Vec<organization::Model>> {
        let pattern = format!(
            "%{}%",
            city.to_lowercase().replace('%', "\\%").replace('_', "\\_")
        );

        Organization::find()
            .filter(Expr::expr(Func::lower(Expr::col(organization::Column::City))).like(pattern))
            .order_by_asc(organization::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

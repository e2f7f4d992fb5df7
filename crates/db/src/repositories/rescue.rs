//! Rescue repository.
//!
//! Mirrors the report repository: status transitions are single conditional
//! `UPDATE` statements, and the finish transition credits the claiming
//! organization's resolved-rescue counter in the same transaction.

use std::sync::Arc;

use crate::entities::{CaseStatus, Organization, Rescue, organization, rescue};
use resgate_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait, sea_query::Expr,
};

/// Rescue repository for database operations.
#[derive(Clone)]
pub struct RescueRepository {
    db: Arc<DatabaseConnection>,
}

impl RescueRepository {
    /// Create a new rescue repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a rescue by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<rescue::Model>> {
        Rescue::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a rescue by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<rescue::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("rescue {id}")))
    }

    /// Create a new rescue.
    pub async fn create(&self, model: rescue::ActiveModel) -> AppResult<rescue::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The organization queue: rescues in a city with a given status.
    pub async fn list_by_city_and_status(
        &self,
        city: &str,
        status: CaseStatus,
    ) -> AppResult<Vec<rescue::Model>> {
        Rescue::find()
            .filter(rescue::Column::City.eq(city))
            .filter(rescue::Column::Status.eq(status))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Rescues submitted by a user, newest first.
    pub async fn list_by_owner(&self, user_id: &str) -> AppResult<Vec<rescue::Model>> {
        Rescue::find()
            .filter(rescue::Column::ReporterId.eq(user_id))
            .order_by_desc(rescue::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a rescue owned by `user_id`.
    ///
    /// Returns `false` when the rescue exists but is owned by someone else
    /// (or nobody); the ownership check is part of the delete statement.
    pub async fn delete_by_owner(&self, id: &str, user_id: &str) -> AppResult<bool> {
        let result = Rescue::delete_many()
            .filter(rescue::Column::Id.eq(id))
            .filter(rescue::Column::ReporterId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Claim a pending rescue for an organization (pending -> in_progress).
    pub async fn claim(&self, id: &str, org_id: &str) -> AppResult<bool> {
        let result = Rescue::update_many()
            .col_expr(rescue::Column::Status, Expr::value(CaseStatus::InProgress))
            .col_expr(rescue::Column::AssignedOrgId, Expr::value(org_id))
            .col_expr(rescue::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(rescue::Column::Id.eq(id))
            .filter(rescue::Column::Status.eq(CaseStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Reject a pending rescue (pending -> rejected), without claiming it.
    pub async fn reject(&self, id: &str) -> AppResult<bool> {
        let result = Rescue::update_many()
            .col_expr(rescue::Column::Status, Expr::value(CaseStatus::Rejected))
            .col_expr(rescue::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(rescue::Column::Id.eq(id))
            .filter(rescue::Column::Status.eq(CaseStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Finish an in-progress rescue (in_progress -> finished) and credit the
    /// claiming organization's resolved-rescue counter.
    ///
    /// The counter moves on the specific claiming organization's row, at
    /// most once per rescue, inside the same transaction as the transition.
    pub async fn finish(&self, id: &str, org_id: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = Rescue::update_many()
            .col_expr(rescue::Column::Status, Expr::value(CaseStatus::Finished))
            .col_expr(rescue::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(rescue::Column::Id.eq(id))
            .filter(rescue::Column::Status.eq(CaseStatus::InProgress))
            .filter(rescue::Column::AssignedOrgId.eq(org_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if updated.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(false);
        }

        Organization::update_many()
            .col_expr(
                organization::Column::RescuesResolved,
                Expr::col(organization::Column::RescuesResolved).add(1),
            )
            .filter(organization::Column::Id.eq(org_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_rescue(id: &str, status: CaseStatus) -> rescue::Model {
        rescue::Model {
            id: id.to_string(),
            description: "Cat stuck on a roof".to_string(),
            author_name: "Maria".to_string(),
            city: "Campinas".to_string(),
            cep: None,
            address: None,
            number: None,
            contact_phone: Some("11988887777".to_string()),
            photo_ref: None,
            status,
            reporter_id: None,
            assigned_org_id: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_claim_pending_rescue_succeeds() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = RescueRepository::new(db);
        assert!(repo.claim("resc1", "org1").await.unwrap());
    }

    #[tokio::test]
    async fn test_reject_non_pending_rescue_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = RescueRepository::new(db);
        assert!(!repo.reject("resc1").await.unwrap());
    }

    #[tokio::test]
    async fn test_finish_credits_rescue_counter_once() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1, // status transition
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1, // counter increment
                    },
                ])
                .into_connection(),
        );

        let repo = RescueRepository::new(db);
        assert!(repo.finish("resc1", "org1").await.unwrap());
    }

    #[tokio::test]
    async fn test_finish_already_finished_rescue_fails_cleanly() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = RescueRepository::new(db);
        assert!(!repo.finish("resc1", "org1").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_by_owner() {
        let mut owned = create_test_rescue("resc1", CaseStatus::Pending);
        owned.reporter_id = Some("user1".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[owned]])
                .into_connection(),
        );

        let repo = RescueRepository::new(db);
        let result = repo.list_by_owner("user1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].reporter_id.as_deref(), Some("user1"));
    }
}

//! Report repository.
//!
//! Status transitions are single conditional `UPDATE` statements: the guard
//! and the write are one statement, so two racing callers cannot both pass
//! the guard. `rows_affected == 0` means the case was not in the expected
//! state at write time.

use std::sync::Arc;

use crate::entities::{CaseStatus, Organization, Report, organization, report};
use resgate_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait, sea_query::Expr,
};

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a report by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<report::Model>> {
        Report::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a report by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<report::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("report {id}")))
    }

    /// Create a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The organization queue: reports in a city with a given status.
    pub async fn list_by_city_and_status(
        &self,
        city: &str,
        status: CaseStatus,
    ) -> AppResult<Vec<report::Model>> {
        Report::find()
            .filter(report::Column::City.eq(city))
            .filter(report::Column::Status.eq(status))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reports submitted by a user, newest first.
    pub async fn list_by_owner(&self, user_id: &str) -> AppResult<Vec<report::Model>> {
        Report::find()
            .filter(report::Column::ReporterId.eq(user_id))
            .order_by_desc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a report owned by `user_id`.
    ///
    /// Returns `false` when the report exists but is owned by someone else
    /// (or nobody); the ownership check is part of the delete statement.
    pub async fn delete_by_owner(&self, id: &str, user_id: &str) -> AppResult<bool> {
        let result = Report::delete_many()
            .filter(report::Column::Id.eq(id))
            .filter(report::Column::ReporterId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Claim a pending report for an organization (pending -> in_progress).
    ///
    /// Returns `false` when the report was no longer pending, without any
    /// state change.
    pub async fn claim(&self, id: &str, org_id: &str) -> AppResult<bool> {
        let result = Report::update_many()
            .col_expr(report::Column::Status, Expr::value(CaseStatus::InProgress))
            .col_expr(report::Column::AssignedOrgId, Expr::value(org_id))
            .col_expr(report::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(report::Column::Id.eq(id))
            .filter(report::Column::Status.eq(CaseStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Reject a pending report (pending -> rejected), without claiming it.
    pub async fn reject(&self, id: &str) -> AppResult<bool> {
        let result = Report::update_many()
            .col_expr(report::Column::Status, Expr::value(CaseStatus::Rejected))
            .col_expr(report::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(report::Column::Id.eq(id))
            .filter(report::Column::Status.eq(CaseStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Finish an in-progress report (in_progress -> finished) and credit the
    /// claiming organization's resolved-report counter.
    ///
    /// Both writes run in one transaction: the status transition and the
    /// counter increment are applied together or not at all. The transition
    /// only matches when `org_id` is the claiming organization, so the
    /// counter moves at most once per report.
    pub async fn finish(&self, id: &str, org_id: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = Report::update_many()
            .col_expr(report::Column::Status, Expr::value(CaseStatus::Finished))
            .col_expr(report::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(report::Column::Id.eq(id))
            .filter(report::Column::Status.eq(CaseStatus::InProgress))
            .filter(report::Column::AssignedOrgId.eq(org_id))
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
                organization::Column::ReportsResolved,
                Expr::col(organization::Column::ReportsResolved).add(1),
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

    fn create_test_report(id: &str, status: CaseStatus) -> report::Model {
        report::Model {
            id: id.to_string(),
            title: "Stray dog".to_string(),
            description: "Injured dog near the park".to_string(),
            city: "Campinas".to_string(),
            address: None,
            sighted_at: Utc::now().date_naive(),
            contact_phone: "11999999999".to_string(),
            contact_email: None,
            photo_ref: None,
            status,
            reporter_id: Some("user1".to_string()),
            assigned_org_id: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_claim_pending_report_succeeds() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        assert!(repo.claim("rep1", "org1").await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_already_claimed_report_fails() {
        // The conditional update matches no row once the status left pending.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        assert!(!repo.claim("rep1", "org2").await.unwrap());
    }

    #[tokio::test]
    async fn test_finish_applies_transition_and_counter_together() {
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

        let repo = ReportRepository::new(db);
        assert!(repo.finish("rep1", "org1").await.unwrap());
    }

    #[tokio::test]
    async fn test_finish_guard_failure_skips_counter() {
        // Only one exec result is queued: when the transition matches no
        // row, the counter update must never be issued.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        assert!(!repo.finish("rep1", "org1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_owner_mismatch_returns_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        assert!(!repo.delete_by_owner("rep1", "intruder").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_by_city_and_status() {
        let reports = vec![
            create_test_report("rep1", CaseStatus::Pending),
            create_test_report("rep2", CaseStatus::Pending),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([reports])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo
            .list_by_city_and_status("Campinas", CaseStatus::Pending)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        assert!(matches!(
            repo.get_by_id("ghost").await,
            Err(AppError::NotFound(_))
        ));
    }
}

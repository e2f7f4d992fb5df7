//! Claim workflow: the state machine over case statuses.
//!
//! All transitions require an organization, and every guard reads the
//! organization row from the store; the session snapshot is display-only.
//! The decision itself is made by a conditional update in the repository,
//! so racing callers cannot both pass a guard. The pre-checks here only
//! shape the error message.

use resgate_common::{AppError, AppResult};
use resgate_db::{
    entities::CaseStatus,
    repositories::{OrganizationRepository, ReportRepository, RescueRepository},
};

/// Workflow service applying claim/reject/finish transitions.
#[derive(Clone)]
pub struct WorkflowService {
    report_repo: ReportRepository,
    rescue_repo: RescueRepository,
    org_repo: OrganizationRepository,
}

impl WorkflowService {
    /// Create a new workflow service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        rescue_repo: RescueRepository,
        org_repo: OrganizationRepository,
    ) -> Self {
        Self {
            report_repo,
            rescue_repo,
            org_repo,
        }
    }

    /// Claim a pending report: pending -> in_progress, assigning the
    /// organization. Only organizations in the case's city may claim.
    pub async fn claim_report(&self, report_id: &str, org_id: &str) -> AppResult<()> {
        let org = self.org_repo.get_by_id(org_id).await?;
        let report = self.report_repo.get_by_id(report_id).await?;

        check_city(&report.city, &org.city)?;
        check_claimable(report.status)?;

        if self.report_repo.claim(report_id, org_id).await? {
            tracing::info!(report_id, org_id, "Report claimed");
            Ok(())
        } else {
            // Lost the race: someone else moved the case first
            Err(AppError::InvalidTransition(
                "case is no longer pending".to_string(),
            ))
        }
    }

    /// Reject a pending report without claiming it. Same city guard as
    /// claiming.
    pub async fn reject_report(&self, report_id: &str, org_id: &str) -> AppResult<()> {
        let org = self.org_repo.get_by_id(org_id).await?;
        let report = self.report_repo.get_by_id(report_id).await?;

        check_city(&report.city, &org.city)?;
        check_claimable(report.status)?;

        if self.report_repo.reject(report_id).await? {
            tracing::info!(report_id, org_id, "Report rejected");
            Ok(())
        } else {
            Err(AppError::InvalidTransition(
                "case is no longer pending".to_string(),
            ))
        }
    }

    /// Finish an in-progress report. Only the claiming organization may
    /// finish, and its resolved-report counter moves exactly once, in the
    /// same transaction as the status change.
    pub async fn finish_report(&self, report_id: &str, org_id: &str) -> AppResult<()> {
        let org = self.org_repo.get_by_id(org_id).await?;
        let report = self.report_repo.get_by_id(report_id).await?;

        check_finishable(report.status, report.assigned_org_id.as_deref(), &org.id)?;

        if self.report_repo.finish(report_id, org_id).await? {
            tracing::info!(report_id, org_id, "Report finished");
            Ok(())
        } else {
            Err(AppError::InvalidTransition(
                "case is not in progress".to_string(),
            ))
        }
    }

    /// Claim a pending rescue, with the same guards as reports.
    pub async fn claim_rescue(&self, rescue_id: &str, org_id: &str) -> AppResult<()> {
        let org = self.org_repo.get_by_id(org_id).await?;
        let rescue = self.rescue_repo.get_by_id(rescue_id).await?;

        check_city(&rescue.city, &org.city)?;
        check_claimable(rescue.status)?;

        if self.rescue_repo.claim(rescue_id, org_id).await? {
            tracing::info!(rescue_id, org_id, "Rescue claimed");
            Ok(())
        } else {
            Err(AppError::InvalidTransition(
                "case is no longer pending".to_string(),
            ))
        }
    }

    /// Reject a pending rescue without claiming it.
    pub async fn reject_rescue(&self, rescue_id: &str, org_id: &str) -> AppResult<()> {
        let org = self.org_repo.get_by_id(org_id).await?;
        let rescue = self.rescue_repo.get_by_id(rescue_id).await?;

        check_city(&rescue.city, &org.city)?;
        check_claimable(rescue.status)?;

        if self.rescue_repo.reject(rescue_id).await? {
            tracing::info!(rescue_id, org_id, "Rescue rejected");
            Ok(())
        } else {
            Err(AppError::InvalidTransition(
                "case is no longer pending".to_string(),
            ))
        }
    }

    /// Finish an in-progress rescue, crediting the claiming organization's
    /// resolved-rescue counter exactly once.
    pub async fn finish_rescue(&self, rescue_id: &str, org_id: &str) -> AppResult<()> {
        let org = self.org_repo.get_by_id(org_id).await?;
        let rescue = self.rescue_repo.get_by_id(rescue_id).await?;

        check_finishable(rescue.status, rescue.assigned_org_id.as_deref(), &org.id)?;

        if self.rescue_repo.finish(rescue_id, org_id).await? {
            tracing::info!(rescue_id, org_id, "Rescue finished");
            Ok(())
        } else {
            Err(AppError::InvalidTransition(
                "case is not in progress".to_string(),
            ))
        }
    }
}

/// City guard for claim and reject. Case-insensitive on trimmed values to
/// tolerate form-entry variance.
fn check_city(case_city: &str, org_city: &str) -> AppResult<()> {
    if case_city.trim().to_lowercase() == org_city.trim().to_lowercase() {
        Ok(())
    } else {
        Err(AppError::NotAuthorized(
            "case is outside your organization's city".to_string(),
        ))
    }
}

/// Claim/reject only apply to pending cases.
fn check_claimable(status: CaseStatus) -> AppResult<()> {
    match status {
        CaseStatus::Pending => Ok(()),
        CaseStatus::InProgress => Err(AppError::InvalidTransition(
            "case is already claimed".to_string(),
        )),
        CaseStatus::Finished | CaseStatus::Rejected => Err(AppError::InvalidTransition(
            "case is already closed".to_string(),
        )),
    }
}

/// Finish only applies to in-progress cases claimed by the caller.
fn check_finishable(
    status: CaseStatus,
    assigned_org: Option<&str>,
    org_id: &str,
) -> AppResult<()> {
    match assigned_org {
        None => {
            return Err(AppError::InvalidTransition(
                "case has not been claimed".to_string(),
            ));
        }
        Some(assigned) if assigned != org_id => {
            return Err(AppError::NotAuthorized(
                "case is claimed by another organization".to_string(),
            ));
        }
        Some(_) => {}
    }

    match status {
        CaseStatus::InProgress => Ok(()),
        CaseStatus::Pending => Err(AppError::InvalidTransition(
            "case has not been claimed".to_string(),
        )),
        CaseStatus::Finished => Err(AppError::InvalidTransition(
            "case is already finished".to_string(),
        )),
        CaseStatus::Rejected => Err(AppError::InvalidTransition(
            "case was rejected".to_string(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use resgate_db::entities::{organization, report, rescue};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: Arc<DatabaseConnection>) -> WorkflowService {
        WorkflowService::new(
            ReportRepository::new(Arc::clone(&db)),
            RescueRepository::new(Arc::clone(&db)),
            OrganizationRepository::new(db),
        )
    }

    fn test_org(id: &str, city: &str) -> organization::Model {
        organization::Model {
            id: id.to_string(),
            name: "Patas Unidas".to_string(),
            email: format!("{id}@ong.example"),
            password_hash: "$argon2id$fake".to_string(),
            phone: "1933334444".to_string(),
            cpf: None,
            cep: None,
            city: city.to_string(),
            district: None,
            address: None,
            number: None,
            description: None,
            photo_ref: None,
            reports_resolved: 0,
            rescues_resolved: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_report(
        id: &str,
        city: &str,
        status: CaseStatus,
        assigned: Option<&str>,
    ) -> report::Model {
        report::Model {
            id: id.to_string(),
            title: "Stray dog".to_string(),
            description: "Injured dog near the park".to_string(),
            city: city.to_string(),
            address: None,
            sighted_at: Utc::now().date_naive(),
            contact_phone: "11999999999".to_string(),
            contact_email: None,
            photo_ref: None,
            status,
            reporter_id: None,
            assigned_org_id: assigned.map(ToString::to_string),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_rescue(
        id: &str,
        city: &str,
        status: CaseStatus,
        assigned: Option<&str>,
    ) -> rescue::Model {
        rescue::Model {
            id: id.to_string(),
            description: "Cat stuck on a roof".to_string(),
            author_name: "Maria".to_string(),
            city: city.to_string(),
            cep: None,
            address: None,
            number: None,
            contact_phone: None,
            photo_ref: None,
            status,
            reporter_id: None,
            assigned_org_id: assigned.map(ToString::to_string),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_claim_pending_report_in_same_city() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_org("org1", "Campinas")]])
                .append_query_results([[test_report(
                    "rep1",
                    "Campinas",
                    CaseStatus::Pending,
                    None,
                )]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        assert!(service(db).claim_report("rep1", "org1").await.is_ok());
    }

    #[tokio::test]
    async fn test_claim_is_scoped_by_city() {
        // No exec result queued: the guard must stop before any write.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_org("org1", "Valinhos")]])
                .append_query_results([[test_report(
                    "rep1",
                    "Campinas",
                    CaseStatus::Pending,
                    None,
                )]])
                .into_connection(),
        );

        let result = service(db).claim_report("rep1", "org1").await;
        assert!(matches!(result, Err(AppError::NotAuthorized(_))));
    }

    #[tokio::test]
    async fn test_city_guard_is_case_insensitive() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_org("org1", "  campinas ")]])
                .append_query_results([[test_report(
                    "rep1",
                    "Campinas",
                    CaseStatus::Pending,
                    None,
                )]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        assert!(service(db).claim_report("rep1", "org1").await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_claim_loser_sees_invalid_transition() {
        // Both callers pass the pre-check against a pending snapshot, but
        // the conditional update matches zero rows for the loser.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_org("org2", "Campinas")]])
                .append_query_results([[test_report(
                    "rep1",
                    "Campinas",
                    CaseStatus::Pending,
                    None,
                )]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let result = service(db).claim_report("rep1", "org2").await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_claim_missing_report_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_org("org1", "Campinas")]])
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let result = service(db).claim_report("ghost", "org1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_finish_by_claiming_org_succeeds() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_org("org1", "Campinas")]])
                .append_query_results([[test_report(
                    "rep1",
                    "Campinas",
                    CaseStatus::InProgress,
                    Some("org1"),
                )]])
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

        assert!(service(db).finish_report("rep1", "org1").await.is_ok());
    }

    #[tokio::test]
    async fn test_finish_by_other_org_is_not_authorized() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_org("org2", "Campinas")]])
                .append_query_results([[test_report(
                    "rep1",
                    "Campinas",
                    CaseStatus::InProgress,
                    Some("org1"),
                )]])
                .into_connection(),
        );

        let result = service(db).finish_report("rep1", "org2").await;
        assert!(matches!(result, Err(AppError::NotAuthorized(_))));
    }

    #[tokio::test]
    async fn test_finish_twice_fails_second_time_without_recount() {
        // Second finish: the case reads back as finished, so the service
        // stops before the transaction; no exec results are queued.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_org("org1", "Campinas")]])
                .append_query_results([[test_report(
                    "rep1",
                    "Campinas",
                    CaseStatus::Finished,
                    Some("org1"),
                )]])
                .into_connection(),
        );

        let result = service(db).finish_report("rep1", "org1").await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_finish_unclaimed_report_is_invalid() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_org("org1", "Campinas")]])
                .append_query_results([[test_report(
                    "rep1",
                    "Campinas",
                    CaseStatus::Pending,
                    None,
                )]])
                .into_connection(),
        );

        let result = service(db).finish_report("rep1", "org1").await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_reject_in_progress_rescue_is_invalid() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_org("org1", "Campinas")]])
                .append_query_results([[test_rescue(
                    "resc1",
                    "Campinas",
                    CaseStatus::InProgress,
                    Some("org1"),
                )]])
                .into_connection(),
        );

        let result = service(db).reject_rescue("resc1", "org1").await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_finish_rescue_credits_rescue_counter() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_org("org1", "Campinas")]])
                .append_query_results([[test_rescue(
                    "resc1",
                    "Campinas",
                    CaseStatus::InProgress,
                    Some("org1"),
                )]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        assert!(service(db).finish_rescue("resc1", "org1").await.is_ok());
    }

    #[tokio::test]
    async fn test_report_lifecycle_end_to_end() {
        use crate::{CaseService, Session, SubmitReportInput};
        use resgate_db::repositories::UserRepository;

        // submit -> claim -> finish -> finish again, against one connection
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // submit: insert returns the pending report
                .append_query_results([[test_report("rep1", "Campinas", CaseStatus::Pending, None)]])
                // claim: org fetch, report fetch
                .append_query_results([[test_org("org1", "Campinas")]])
                .append_query_results([[test_report("rep1", "Campinas", CaseStatus::Pending, None)]])
                // finish: org fetch, report fetch (now claimed)
                .append_query_results([[test_org("org1", "Campinas")]])
                .append_query_results([[test_report(
                    "rep1",
                    "Campinas",
                    CaseStatus::InProgress,
                    Some("org1"),
                )]])
                // second finish: org fetch, report fetch (already finished)
                .append_query_results([[test_org("org1", "Campinas")]])
                .append_query_results([[test_report(
                    "rep1",
                    "Campinas",
                    CaseStatus::Finished,
                    Some("org1"),
                )]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1, // insert
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1, // claim
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1, // finish: status transition
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1, // finish: counter increment
                    },
                ])
                .into_connection(),
        );

        let cases = CaseService::new(
            ReportRepository::new(Arc::clone(&db)),
            RescueRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            OrganizationRepository::new(Arc::clone(&db)),
        );
        let workflow = service(db);

        let input = SubmitReportInput {
            title: "Stray dog".to_string(),
            description: "Injured dog near the park".to_string(),
            city: "Campinas".to_string(),
            address: None,
            sighted_at: Utc::now().date_naive(),
            contact_phone: Some("11999999999".to_string()),
            contact_email: None,
            photo_ref: None,
        };

        let report = cases
            .submit_report(input, &Session::Anonymous)
            .await
            .unwrap();
        assert_eq!(report.status, CaseStatus::Pending);
        assert_eq!(report.reporter_id, None);

        workflow.claim_report("rep1", "org1").await.unwrap();
        workflow.finish_report("rep1", "org1").await.unwrap();

        // A second finish fails cleanly; no exec results remain queued, so
        // any further write (a double count) would error the test.
        let again = workflow.finish_report("rep1", "org1").await;
        assert!(matches!(again, Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn test_check_city() {
        assert!(check_city("Campinas", "campinas").is_ok());
        assert!(check_city(" Campinas ", "CAMPINAS").is_ok());
        assert!(check_city("São Paulo", "são paulo").is_ok());
        assert!(check_city("Campinas", "Valinhos").is_err());
    }
}

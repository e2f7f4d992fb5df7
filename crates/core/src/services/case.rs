//! Case service: submission, listing and deletion of reports and rescues.

use chrono::Utc;
use resgate_common::{AppError, AppResult, IdGenerator};
use resgate_db::{
    entities::{CaseStatus, report, rescue},
    repositories::{OrganizationRepository, ReportRepository, RescueRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::Session;

/// How far a reported sighting date may lie from today, in days.
const SIGHTING_WINDOW_DAYS: i64 = 20;

/// Case service for submitting, listing and deleting cases.
#[derive(Clone)]
pub struct CaseService {
    report_repo: ReportRepository,
    rescue_repo: RescueRepository,
    user_repo: UserRepository,
    org_repo: OrganizationRepository,
    id_gen: IdGenerator,
}

/// Input for submitting a report (sighting).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1, max = 4096))]
    pub description: String,

    #[validate(length(min = 1, max = 128))]
    pub city: String,

    #[validate(length(max = 256))]
    pub address: Option<String>,

    /// Date of the sighting, within 20 days of today either way.
    pub sighted_at: chrono::NaiveDate,

    /// Required for anonymous submissions; ignored for logged-in users,
    /// whose profile phone is used instead.
    #[validate(length(max = 32))]
    pub contact_phone: Option<String>,

    #[validate(email, length(max = 256))]
    pub contact_email: Option<String>,

    pub photo_ref: Option<String>,
}

/// Input for submitting a rescue (assistance request).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRescueInput {
    #[validate(length(min = 1, max = 4096))]
    pub description: String,

    /// Required even for anonymous submissions.
    #[validate(length(min = 1, max = 256))]
    pub author_name: String,

    #[validate(length(min = 1, max = 128))]
    pub city: String,

    #[validate(length(max = 16))]
    pub cep: Option<String>,

    #[validate(length(max = 256))]
    pub address: Option<String>,

    #[validate(length(max = 16))]
    pub number: Option<String>,

    #[validate(length(max = 32))]
    pub contact_phone: Option<String>,

    pub photo_ref: Option<String>,
}

impl CaseService {
    /// Create a new case service.
    #[must_use]
    pub fn new(
        report_repo: ReportRepository,
        rescue_repo: RescueRepository,
        user_repo: UserRepository,
        org_repo: OrganizationRepository,
    ) -> Self {
        Self {
            report_repo,
            rescue_repo,
            user_repo,
            org_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a report. Anonymous submissions must carry a contact phone;
    /// for logged-in users the profile phone is authoritative.
    pub async fn submit_report(
        &self,
        input: SubmitReportInput,
        session: &Session,
    ) -> AppResult<report::Model> {
        input.validate()?;
        validate_sighting_date(input.sighted_at)?;

        let (reporter_id, contact_phone) = match session {
            Session::User { id, .. } => {
                let user = self.user_repo.get_by_id(id).await?;
                (Some(user.id), user.phone)
            }
            Session::Anonymous => {
                let phone = input
                    .contact_phone
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| {
                        AppError::Validation(
                            "a contact phone is required for anonymous reports".to_string(),
                        )
                    })?;
                (None, phone.to_string())
            }
            Session::Org { .. } => {
                return Err(AppError::NotAuthorized(
                    "organizations cannot submit reports".to_string(),
                ));
            }
        };

        let model = report::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            description: Set(input.description),
            city: Set(input.city),
            address: Set(input.address),
            sighted_at: Set(input.sighted_at),
            contact_phone: Set(contact_phone),
            contact_email: Set(input.contact_email),
            photo_ref: Set(input.photo_ref),
            status: Set(CaseStatus::Pending),
            reporter_id: Set(reporter_id),
            assigned_org_id: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let report = self.report_repo.create(model).await?;
        tracing::info!(report_id = %report.id, city = %report.city, "Report submitted");
        Ok(report)
    }

    /// Submit a rescue. The author name is required even when anonymous.
    pub async fn submit_rescue(
        &self,
        input: SubmitRescueInput,
        session: &Session,
    ) -> AppResult<rescue::Model> {
        input.validate()?;

        if input.author_name.trim().is_empty() {
            return Err(AppError::Validation(
                "an author name is required for rescue requests".to_string(),
            ));
        }

        let reporter_id = match session {
            Session::User { id, .. } => {
                // Owner must exist; the row is the deletion-rights anchor
                Some(self.user_repo.get_by_id(id).await?.id)
            }
            Session::Anonymous => None,
            Session::Org { .. } => {
                return Err(AppError::NotAuthorized(
                    "organizations cannot submit rescue requests".to_string(),
                ));
            }
        };

        let model = rescue::ActiveModel {
            id: Set(self.id_gen.generate()),
            description: Set(input.description),
            author_name: Set(input.author_name.trim().to_string()),
            city: Set(input.city),
            cep: Set(input.cep),
            address: Set(input.address),
            number: Set(input.number),
            contact_phone: Set(input.contact_phone),
            photo_ref: Set(input.photo_ref),
            status: Set(CaseStatus::Pending),
            reporter_id: Set(reporter_id),
            assigned_org_id: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let rescue = self.rescue_repo.create(model).await?;
        tracing::info!(rescue_id = %rescue.id, city = %rescue.city, "Rescue submitted");
        Ok(rescue)
    }

    /// Get a report by ID.
    pub async fn get_report(&self, id: &str) -> AppResult<report::Model> {
        self.report_repo.get_by_id(id).await
    }

    /// Get a rescue by ID.
    pub async fn get_rescue(&self, id: &str) -> AppResult<rescue::Model> {
        self.rescue_repo.get_by_id(id).await
    }

    /// The actionable report queue for an organization. The city comes from
    /// the organization's stored row, not from any session snapshot.
    pub async fn queue_reports(
        &self,
        org_id: &str,
        status: CaseStatus,
    ) -> AppResult<Vec<report::Model>> {
        let org = self.org_repo.get_by_id(org_id).await?;
        self.report_repo
            .list_by_city_and_status(&org.city, status)
            .await
    }

    /// The actionable rescue queue for an organization.
    pub async fn queue_rescues(
        &self,
        org_id: &str,
        status: CaseStatus,
    ) -> AppResult<Vec<rescue::Model>> {
        let org = self.org_repo.get_by_id(org_id).await?;
        self.rescue_repo
            .list_by_city_and_status(&org.city, status)
            .await
    }

    /// Reports submitted by a user, newest first.
    pub async fn list_reports_by_owner(&self, user_id: &str) -> AppResult<Vec<report::Model>> {
        self.report_repo.list_by_owner(user_id).await
    }

    /// Rescues submitted by a user, newest first.
    pub async fn list_rescues_by_owner(&self, user_id: &str) -> AppResult<Vec<rescue::Model>> {
        self.rescue_repo.list_by_owner(user_id).await
    }

    /// Delete a report. Only the owning user may delete it; a missing case
    /// is `NotFound`, someone else's case is `NotAuthorized`.
    pub async fn delete_report(&self, id: &str, user_id: &str) -> AppResult<()> {
        let report = self.report_repo.get_by_id(id).await?;

        if report.reporter_id.as_deref() != Some(user_id) {
            return Err(AppError::NotAuthorized(
                "only the reporting user can delete a case".to_string(),
            ));
        }

        if self.report_repo.delete_by_owner(id, user_id).await? {
            tracing::info!(report_id = id, user_id = user_id, "Report deleted");
            Ok(())
        } else {
            // Vanished between the fetch and the delete
            Err(AppError::NotFound(format!("report {id}")))
        }
    }

    /// Delete a rescue, with the same ownership rules as reports.
    pub async fn delete_rescue(&self, id: &str, user_id: &str) -> AppResult<()> {
        let rescue = self.rescue_repo.get_by_id(id).await?;

        if rescue.reporter_id.as_deref() != Some(user_id) {
            return Err(AppError::NotAuthorized(
                "only the reporting user can delete a case".to_string(),
            ));
        }

        if self.rescue_repo.delete_by_owner(id, user_id).await? {
            tracing::info!(rescue_id = id, user_id = user_id, "Rescue deleted");
            Ok(())
        } else {
            Err(AppError::NotFound(format!("rescue {id}")))
        }
    }
}

/// Reject sighting dates implausibly far from today.
fn validate_sighting_date(sighted_at: chrono::NaiveDate) -> AppResult<()> {
    let today = Utc::now().date_naive();
    let days = sighted_at.signed_duration_since(today).num_days();

    if days.abs() > SIGHTING_WINDOW_DAYS {
        return Err(AppError::Validation(format!(
            "sighting date must be within {SIGHTING_WINDOW_DAYS} days of today"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use resgate_db::entities::user;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: Arc<DatabaseConnection>) -> CaseService {
        CaseService::new(
            ReportRepository::new(Arc::clone(&db)),
            RescueRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            OrganizationRepository::new(db),
        )
    }

    fn test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: "Ana Souza".to_string(),
            email: format!("{id}@example.com"),
            password_hash: "$argon2id$fake".to_string(),
            phone: "11999999999".to_string(),
            cep: None,
            city: "Campinas".to_string(),
            address: None,
            number: None,
            photo_ref: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_report(id: &str, reporter: Option<&str>) -> report::Model {
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
            status: CaseStatus::Pending,
            reporter_id: reporter.map(ToString::to_string),
            assigned_org_id: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn report_input() -> SubmitReportInput {
        SubmitReportInput {
            title: "Stray dog".to_string(),
            description: "Injured dog near the park".to_string(),
            city: "Campinas".to_string(),
            address: None,
            sighted_at: Utc::now().date_naive(),
            contact_phone: Some("11999999999".to_string()),
            contact_email: None,
            photo_ref: None,
        }
    }

    #[tokio::test]
    async fn test_anonymous_report_without_phone_fails() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let mut input = report_input();
        input.contact_phone = None;

        let result = service(db).submit_report(input, &Session::Anonymous).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_anonymous_report_is_pending_and_unowned() {
        let expected = test_report("rep1", None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[expected]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let report = service(db)
            .submit_report(report_input(), &Session::Anonymous)
            .await
            .unwrap();

        assert_eq!(report.status, CaseStatus::Pending);
        assert_eq!(report.reporter_id, None);
    }

    #[tokio::test]
    async fn test_logged_in_report_uses_profile_phone() {
        let user = test_user("user1");
        let mut expected = test_report("rep1", Some("user1"));
        expected.contact_phone = user.phone.clone();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .append_query_results([[expected]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let session = Session::User {
            id: "user1".to_string(),
            name: "Ana Souza".to_string(),
            city: "Campinas".to_string(),
        };

        let mut input = report_input();
        input.contact_phone = None; // profile phone takes over

        let report = service(db).submit_report(input, &session).await.unwrap();
        assert_eq!(report.reporter_id.as_deref(), Some("user1"));
        assert_eq!(report.contact_phone, "11999999999");
    }

    #[tokio::test]
    async fn test_sighting_date_outside_window_fails() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let mut input = report_input();
        input.sighted_at = Utc::now().date_naive() - Duration::days(21);

        let result = service(db).submit_report(input, &Session::Anonymous).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_org_session_cannot_submit() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let session = Session::Org {
            id: "org1".to_string(),
            name: "Patas Unidas".to_string(),
            city: "Campinas".to_string(),
        };

        let result = service(db).submit_report(report_input(), &session).await;
        assert!(matches!(result, Err(AppError::NotAuthorized(_))));
    }

    #[tokio::test]
    async fn test_rescue_requires_author_name() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = SubmitRescueInput {
            description: "Cat stuck on a roof".to_string(),
            author_name: "   ".to_string(),
            city: "Campinas".to_string(),
            cep: None,
            address: None,
            number: None,
            contact_phone: None,
            photo_ref: None,
        };

        let result = service(db).submit_rescue(input, &Session::Anonymous).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let report = test_report("rep1", Some("user1"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report]])
                .into_connection(),
        );

        let result = service(db).delete_report("rep1", "someone-else").await;
        assert!(matches!(result, Err(AppError::NotAuthorized(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_report_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let result = service(db).delete_report("ghost", "user1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_by_owner_succeeds() {
        let report = test_report("rep1", Some("user1"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        assert!(service(db).delete_report("rep1", "user1").await.is_ok());
    }
}

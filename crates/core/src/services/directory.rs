//! Organization directory: read-only listing, optionally filtered by city.

use resgate_common::AppResult;
use resgate_db::{entities::organization, repositories::OrganizationRepository};

/// Directory service over registered organizations.
#[derive(Clone)]
pub struct DirectoryService {
    org_repo: OrganizationRepository,
}

impl DirectoryService {
    /// Create a new directory service.
    #[must_use]
    pub const fn new(org_repo: OrganizationRepository) -> Self {
        Self { org_repo }
    }

    /// List organizations. A city filter matches case-insensitively and by
    /// substring; a blank filter is the same as no filter.
    pub async fn list(&self, filter_city: Option<&str>) -> AppResult<Vec<organization::Model>> {
        match filter_city.map(str::trim) {
            Some(city) if !city.is_empty() => self.org_repo.search_by_city(city).await,
            _ => self.org_repo.list_all().await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

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

    #[tokio::test]
    async fn test_list_without_filter_returns_all() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    test_org("org1", "Campinas"),
                    test_org("org2", "Valinhos"),
                ]])
                .into_connection(),
        );

        let service = DirectoryService::new(OrganizationRepository::new(db));
        let orgs = service.list(None).await.unwrap();

        assert_eq!(orgs.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_filter_is_no_filter() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![test_org("org1", "Campinas")]])
                .into_connection(),
        );

        let service = DirectoryService::new(OrganizationRepository::new(db));
        let orgs = service.list(Some("   ")).await.unwrap();

        assert_eq!(orgs.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_city_yields_empty_list() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<organization::Model>::new()])
                .into_connection(),
        );

        let service = DirectoryService::new(OrganizationRepository::new(db));
        let orgs = service.list(Some("Atlantis")).await.unwrap();

        assert!(orgs.is_empty());
    }
}

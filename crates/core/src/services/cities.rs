//! City catalog: the ordered list of valid city names used to populate
//! submission forms.
//!
//! The catalog is fetched once at process start and never participates in
//! any consistency boundary: a fetch failure logs a warning and yields an
//! empty catalog.

use resgate_common::Config;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Immutable, process-wide list of city names.
#[derive(Debug, Clone, Default)]
pub struct CityCatalog {
    cities: Arc<Vec<String>>,
}

/// Shape of one municipality entry in the provider's response.
#[derive(Debug, Deserialize)]
struct ProviderCity {
    nome: String,
}

impl CityCatalog {
    /// Build a catalog from a fixed list of names (tests, fixtures).
    #[must_use]
    pub fn from_names(mut names: Vec<String>) -> Self {
        names.sort();
        names.dedup();
        Self {
            cities: Arc::new(names),
        }
    }

    /// Fetch the catalog from the configured provider. Best effort: any
    /// failure logs a warning and produces an empty catalog.
    pub async fn load(config: &Config) -> Self {
        match Self::fetch(config).await {
            Ok(catalog) => {
                tracing::info!(count = catalog.len(), "City catalog loaded");
                catalog
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load city catalog, starting empty");
                Self::default()
            }
        }
    }

    async fn fetch(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.address.timeout_secs))
            .build()?;

        let cities: Vec<ProviderCity> = client
            .get(&config.address.cities_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Self::from_names(
            cities.into_iter().map(|c| c.nome).collect(),
        ))
    }

    /// The city names, sorted.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.cities
    }

    /// Number of known cities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// Whether the catalog is empty (provider unreachable at startup).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Case-insensitive membership check.
    #[must_use]
    pub fn contains(&self, city: &str) -> bool {
        let needle = city.trim().to_lowercase();
        self.cities.iter().any(|c| c.to_lowercase() == needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_names_sorts_and_dedups() {
        let catalog = CityCatalog::from_names(vec![
            "Valinhos".to_string(),
            "Campinas".to_string(),
            "Campinas".to_string(),
        ]);

        assert_eq!(catalog.names(), ["Campinas", "Valinhos"]);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let catalog = CityCatalog::from_names(vec!["São Paulo".to_string()]);

        assert!(catalog.contains("são paulo"));
        assert!(catalog.contains(" SÃO PAULO "));
        assert!(!catalog.contains("Sao Paulo")); // accents are significant
    }

    #[test]
    fn test_default_is_empty() {
        assert!(CityCatalog::default().is_empty());
    }
}

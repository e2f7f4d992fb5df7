//! Postal-code (CEP) lookup: a passthrough query against a
//! ViaCEP-compatible provider. No caching, no retries; lookups are form
//! convenience and never part of a consistency boundary.

use once_cell::sync::Lazy;
use regex::Regex;
use resgate_common::{AppError, AppResult, Config};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Eight digits with an optional hyphen after the fifth.
#[allow(clippy::unwrap_used)]
static CEP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}-?\d{3}$").unwrap());

/// Address fields resolved from a postal code.
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    /// Normalized postal code (digits only).
    pub cep: String,
    /// Street name.
    pub street: Option<String>,
    /// District / neighbourhood.
    pub district: Option<String>,
    /// City name.
    pub city: String,
    /// State abbreviation.
    pub state: String,
}

/// Raw provider response. `erro` is set for unknown postal codes.
#[derive(Debug, Deserialize)]
struct ProviderAddress {
    #[serde(default)]
    erro: bool,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

/// Address lookup service.
#[derive(Clone)]
pub struct AddressService {
    http: reqwest::Client,
    base_url: String,
}

impl AddressService {
    /// Create a new address service from configuration.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.address.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.address.cep_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a postal code to address fields.
    ///
    /// The CEP shape is validated before any network call; a malformed CEP
    /// never reaches the provider.
    pub async fn resolve(&self, cep: &str) -> AppResult<Address> {
        let cep = cep.trim();
        if !CEP_RE.is_match(cep) {
            return Err(AppError::Validation(
                "CEP must be 8 digits, optionally hyphenated".to_string(),
            ));
        }
        let normalized = cep.replace('-', "");

        let url = format!("{}/{}/json", self.base_url, normalized);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("CEP lookup failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::ExternalService(format!("CEP lookup failed: {e}")))?;

        let body: ProviderAddress = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("CEP lookup returned junk: {e}")))?;

        if body.erro {
            return Err(AppError::NotFound(format!("CEP {normalized}")));
        }

        Ok(Address {
            cep: normalized,
            street: non_empty(body.logradouro),
            district: non_empty(body.bairro),
            city: body.localidade,
            state: body.uf,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

//! Account service: the credential store for users and organizations.
//!
//! Users and organizations are separate identity namespaces; an email may
//! exist once in each. Password hashes never leave this module.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use once_cell::sync::Lazy;
use resgate_common::{AppError, AppResult, IdGenerator};
use resgate_db::{
    entities::{organization, session::SessionKind, user},
    repositories::{OrganizationRepository, SessionRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Verified against whenever an email lookup misses, so unknown-email and
/// wrong-password take the same amount of work and the same code path.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_password("resgate-dummy-password").unwrap_or_default());

/// Account service for registration, authentication and profile updates.
#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
    org_repo: OrganizationRepository,
    session_repo: SessionRepository,
    id_gen: IdGenerator,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(email, length(max = 256))]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 8, max = 32))]
    pub phone: String,

    #[validate(length(max = 16))]
    pub cep: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub city: String,

    #[validate(length(max = 256))]
    pub address: Option<String>,

    #[validate(length(max = 16))]
    pub number: Option<String>,

    pub photo_ref: Option<String>,
}

/// Input for registering a new organization.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOrgInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(email, length(max = 256))]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 8, max = 32))]
    pub phone: String,

    #[validate(length(max = 16))]
    pub cpf: Option<String>,

    #[validate(length(max = 16))]
    pub cep: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub city: String,

    #[validate(length(max = 128))]
    pub district: Option<String>,

    #[validate(length(max = 256))]
    pub address: Option<String>,

    #[validate(length(max = 16))]
    pub number: Option<String>,

    #[validate(length(max = 4096))]
    pub description: Option<String>,

    pub photo_ref: Option<String>,
}

/// Profile update for a user. Blank or unchanged fields are skipped.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserProfileInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cep: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub number: Option<String>,
    pub photo_ref: Option<String>,
}

/// Profile update for an organization. Blank or unchanged fields are skipped.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrgProfileInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cep: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub address: Option<String>,
    pub number: Option<String>,
    pub description: Option<String>,
    pub photo_ref: Option<String>,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        org_repo: OrganizationRepository,
        session_repo: SessionRepository,
    ) -> Self {
        Self {
            user_repo,
            org_repo,
            session_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user.
    pub async fn register_user(&self, input: RegisterUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = hash_password(&input.password)?;
        let user_id = self.id_gen.generate();

        let model = user::ActiveModel {
            id: Set(user_id),
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(password_hash),
            phone: Set(input.phone),
            cep: Set(input.cep),
            city: Set(input.city),
            address: Set(input.address),
            number: Set(input.number),
            photo_ref: Set(input.photo_ref),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Register a new organization.
    pub async fn register_org(&self, input: RegisterOrgInput) -> AppResult<organization::Model> {
        input.validate()?;

        if self.org_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = hash_password(&input.password)?;
        let org_id = self.id_gen.generate();

        let model = organization::ActiveModel {
            id: Set(org_id),
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(password_hash),
            phone: Set(input.phone),
            cpf: Set(input.cpf),
            cep: Set(input.cep),
            city: Set(input.city),
            district: Set(input.district),
            address: Set(input.address),
            number: Set(input.number),
            description: Set(input.description),
            photo_ref: Set(input.photo_ref),
            reports_resolved: Set(0),
            rescues_resolved: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let org = self.org_repo.create(model).await?;
        tracing::info!(org_id = %org.id, "Organization registered");
        Ok(org)
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get an organization by ID.
    pub async fn get_org(&self, id: &str) -> AppResult<organization::Model> {
        self.org_repo.get_by_id(id).await
    }

    /// Authenticate a user by email and password.
    ///
    /// Fails closed: an unknown email, a wrong password and an unreadable
    /// stored hash all produce the same [`AppError::InvalidCredentials`].
    pub async fn authenticate_user(&self, email: &str, password: &str) -> AppResult<user::Model> {
        match self.user_repo.find_by_email(email).await? {
            Some(user) if verify_password(password, &user.password_hash) => Ok(user),
            Some(_) => Err(AppError::InvalidCredentials),
            None => {
                let _ = verify_password(password, &DUMMY_HASH);
                Err(AppError::InvalidCredentials)
            }
        }
    }

    /// Authenticate an organization by email and password.
    pub async fn authenticate_org(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<organization::Model> {
        match self.org_repo.find_by_email(email).await? {
            Some(org) if verify_password(password, &org.password_hash) => Ok(org),
            Some(_) => Err(AppError::InvalidCredentials),
            None => {
                let _ = verify_password(password, &DUMMY_HASH);
                Err(AppError::InvalidCredentials)
            }
        }
    }

    /// Update a user profile, applying only fields that are non-blank and
    /// different from the stored value.
    ///
    /// Returns the names of the fields actually changed; an empty set is a
    /// successful no-op, not an error.
    pub async fn update_user_profile(
        &self,
        user_id: &str,
        input: UpdateUserProfileInput,
    ) -> AppResult<Vec<&'static str>> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let mut changed = Vec::new();
        let mut active: user::ActiveModel = user.clone().into();

        if let Some(email) = diff(input.email, Some(&user.email)) {
            if let Some(other) = self.user_repo.find_by_email(&email).await? {
                if other.id != user.id {
                    return Err(AppError::DuplicateEmail);
                }
            }
            active.email = Set(email);
            changed.push("email");
        }
        if let Some(name) = diff(input.name, Some(&user.name)) {
            active.name = Set(name);
            changed.push("name");
        }
        if let Some(phone) = diff(input.phone, Some(&user.phone)) {
            active.phone = Set(phone);
            changed.push("phone");
        }
        if let Some(city) = diff(input.city, Some(&user.city)) {
            active.city = Set(city);
            changed.push("city");
        }
        if let Some(cep) = diff(input.cep, user.cep.as_deref()) {
            active.cep = Set(Some(cep));
            changed.push("cep");
        }
        if let Some(address) = diff(input.address, user.address.as_deref()) {
            active.address = Set(Some(address));
            changed.push("address");
        }
        if let Some(number) = diff(input.number, user.number.as_deref()) {
            active.number = Set(Some(number));
            changed.push("number");
        }
        if let Some(photo_ref) = diff(input.photo_ref, user.photo_ref.as_deref()) {
            active.photo_ref = Set(Some(photo_ref));
            changed.push("photo_ref");
        }

        if changed.is_empty() {
            return Ok(changed);
        }

        active.updated_at = Set(Some(Utc::now().into()));
        let updated = self.user_repo.update(active).await?;

        // Keep session display snapshots in step with the store
        self.session_repo
            .refresh_snapshot(SessionKind::User, user_id, &updated.name, &updated.city)
            .await?;

        tracing::info!(user_id = user_id, fields = ?changed, "User profile updated");
        Ok(changed)
    }

    /// Update an organization profile. Same skip/no-op semantics as
    /// [`Self::update_user_profile`].
    pub async fn update_org_profile(
        &self,
        org_id: &str,
        input: UpdateOrgProfileInput,
    ) -> AppResult<Vec<&'static str>> {
        let org = self.org_repo.get_by_id(org_id).await?;
        let mut changed = Vec::new();
        let mut active: organization::ActiveModel = org.clone().into();

        if let Some(email) = diff(input.email, Some(&org.email)) {
            if let Some(other) = self.org_repo.find_by_email(&email).await? {
                if other.id != org.id {
                    return Err(AppError::DuplicateEmail);
                }
            }
            active.email = Set(email);
            changed.push("email");
        }
        if let Some(name) = diff(input.name, Some(&org.name)) {
            active.name = Set(name);
            changed.push("name");
        }
        if let Some(phone) = diff(input.phone, Some(&org.phone)) {
            active.phone = Set(phone);
            changed.push("phone");
        }
        if let Some(city) = diff(input.city, Some(&org.city)) {
            active.city = Set(city);
            changed.push("city");
        }
        if let Some(cep) = diff(input.cep, org.cep.as_deref()) {
            active.cep = Set(Some(cep));
            changed.push("cep");
        }
        if let Some(district) = diff(input.district, org.district.as_deref()) {
            active.district = Set(Some(district));
            changed.push("district");
        }
        if let Some(address) = diff(input.address, org.address.as_deref()) {
            active.address = Set(Some(address));
            changed.push("address");
        }
        if let Some(number) = diff(input.number, org.number.as_deref()) {
            active.number = Set(Some(number));
            changed.push("number");
        }
        if let Some(description) = diff(input.description, org.description.as_deref()) {
            active.description = Set(Some(description));
            changed.push("description");
        }
        if let Some(photo_ref) = diff(input.photo_ref, org.photo_ref.as_deref()) {
            active.photo_ref = Set(Some(photo_ref));
            changed.push("photo_ref");
        }

        if changed.is_empty() {
            return Ok(changed);
        }

        active.updated_at = Set(Some(Utc::now().into()));
        let updated = self.org_repo.update(active).await?;

        self.session_repo
            .refresh_snapshot(SessionKind::Org, org_id, &updated.name, &updated.city)
            .await?;

        tracing::info!(org_id = org_id, fields = ?changed, "Organization profile updated");
        Ok(changed)
    }
}

/// Returns the trimmed new value when it is non-blank and differs from the
/// current one.
fn diff(new: Option<String>, current: Option<&str>) -> Option<String> {
    let value = new?;
    let trimmed = value.trim();
    if trimmed.is_empty() || Some(trimmed) == current {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Hash a password with argon2id.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash. Any parse or verification error
/// counts as a mismatch.
fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

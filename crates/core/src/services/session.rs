//! Session service: the per-request authenticated identity.
//!
//! A client holds at most one session, and a session belongs to exactly one
//! account kind. The tagged [`Session`] enum makes "logged in as both"
//! unrepresentable.

use chrono::Utc;
use resgate_common::{AppError, AppResult, IdGenerator};
use resgate_db::{
    entities::{
        organization, session,
        session::SessionKind,
        user,
    },
    repositories::SessionRepository,
};
use sea_orm::Set;
use serde::Serialize;

use crate::AccountService;

/// The authenticated identity attached to a request.
///
/// The `name` and `city` fields are a display snapshot taken at login and
/// refreshed on profile update. Authorization guards do not read them; they
/// re-fetch the account row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Session {
    /// No valid session token presented.
    Anonymous,
    /// Logged in as a user.
    User {
        /// Account ID.
        id: String,
        /// Display snapshot.
        name: String,
        /// Display snapshot.
        city: String,
    },
    /// Logged in as an organization.
    Org {
        /// Account ID.
        id: String,
        /// Display snapshot.
        name: String,
        /// Display snapshot.
        city: String,
    },
}

impl Session {
    /// Whether no account is logged in.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// The user ID, when this is a user session.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User { id, .. } => Some(id),
            _ => None,
        }
    }

    /// The organization ID, when this is an organization session.
    #[must_use]
    pub fn org_id(&self) -> Option<&str> {
        match self {
            Self::Org { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Session service: login, logout and token resolution.
#[derive(Clone)]
pub struct SessionService {
    accounts: AccountService,
    session_repo: SessionRepository,
    id_gen: IdGenerator,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub fn new(accounts: AccountService, session_repo: SessionRepository) -> Self {
        Self {
            accounts,
            session_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve a presented token to a [`Session`]. Unknown or absent tokens
    /// resolve to [`Session::Anonymous`].
    pub async fn resolve(&self, token: Option<&str>) -> AppResult<Session> {
        let Some(token) = token else {
            return Ok(Session::Anonymous);
        };

        let Some(row) = self.session_repo.find_by_token(token).await? else {
            return Ok(Session::Anonymous);
        };

        Ok(match row.kind {
            SessionKind::User => Session::User {
                id: row.account_id,
                name: row.account_name,
                city: row.account_city,
            },
            SessionKind::Org => Session::Org {
                id: row.account_id,
                name: row.account_name,
                city: row.account_city,
            },
        })
    }

    /// Log in as a user. Returns the new session token and the account.
    ///
    /// An active organization session on the same client is rejected, not
    /// overwritten; an active user session is replaced.
    pub async fn login_user(
        &self,
        email: &str,
        password: &str,
        current_token: Option<&str>,
    ) -> AppResult<(String, user::Model)> {
        self.reject_or_replace(current_token, SessionKind::User)
            .await?;

        let user = self.accounts.authenticate_user(email, password).await?;
        let token = self
            .establish(SessionKind::User, &user.id, &user.name, &user.city)
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok((token, user))
    }

    /// Log in as an organization. Returns the new session token and the
    /// account. An active user session on the same client is rejected.
    pub async fn login_org(
        &self,
        email: &str,
        password: &str,
        current_token: Option<&str>,
    ) -> AppResult<(String, organization::Model)> {
        self.reject_or_replace(current_token, SessionKind::Org)
            .await?;

        let org = self.accounts.authenticate_org(email, password).await?;
        let token = self
            .establish(SessionKind::Org, &org.id, &org.name, &org.city)
            .await?;

        tracing::info!(org_id = %org.id, "Organization logged in");
        Ok((token, org))
    }

    /// Log out: the session row disappears in one statement. Unknown tokens
    /// are a no-op success.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.session_repo.delete_by_token(token).await
    }

    async fn reject_or_replace(
        &self,
        current_token: Option<&str>,
        wanted: SessionKind,
    ) -> AppResult<()> {
        let Some(token) = current_token else {
            return Ok(());
        };
        let Some(existing) = self.session_repo.find_by_token(token).await? else {
            return Ok(());
        };

        if existing.kind == wanted {
            // Same-kind re-login replaces the old session
            self.session_repo.delete_by_token(token).await
        } else {
            Err(AppError::NotAuthorized(
                "already signed in with a different account kind; sign out first".to_string(),
            ))
        }
    }

    async fn establish(
        &self,
        kind: SessionKind,
        account_id: &str,
        name: &str,
        city: &str,
    ) -> AppResult<String> {
        let token = self.id_gen.generate_token();

        let model = session::ActiveModel {
            token: Set(token.clone()),
            kind: Set(kind),
            account_id: Set(account_id.to_string()),
            account_name: Set(name.to_string()),
            account_city: Set(city.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.session_repo.create(model).await?;
        Ok(token)
    }
}

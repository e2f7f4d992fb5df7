//! Session repository.

use std::sync::Arc;

use crate::entities::{Session, session};
use resgate_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    sea_query::Expr,
};

/// Session repository for database operations.
#[derive(Clone)]
pub struct SessionRepository {
    db: Arc<DatabaseConnection>,
}

impl SessionRepository {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a session by token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<session::Model>> {
        Session::find_by_id(token)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new session.
    pub async fn create(&self, model: session::ActiveModel) -> AppResult<session::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a session by token. The whole session disappears in one
    /// statement; deleting an unknown token is a no-op.
    pub async fn delete_by_token(&self, token: &str) -> AppResult<()> {
        Session::delete_many()
            .filter(session::Column::Token.eq(token))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete every session held by an account (replace-on-login).
    pub async fn delete_for_account(
        &self,
        kind: session::SessionKind,
        account_id: &str,
    ) -> AppResult<()> {
        Session::delete_many()
            .filter(session::Column::Kind.eq(kind))
            .filter(session::Column::AccountId.eq(account_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Refresh the display snapshot on every session of an account.
    /// Called after a successful profile update.
    pub async fn refresh_snapshot(
        &self,
        kind: session::SessionKind,
        account_id: &str,
        name: &str,
        city: &str,
    ) -> AppResult<()> {
        Session::update_many()
            .col_expr(session::Column::AccountName, Expr::value(name))
            .col_expr(session::Column::AccountCity, Expr::value(city))
            .filter(session::Column::Kind.eq(kind))
            .filter(session::Column::AccountId.eq(account_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

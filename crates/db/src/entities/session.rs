//! Session entity.
//!
//! One row per logged-in client. The `kind` tag makes user and
//! organization sessions mutually exclusive by construction: a token
//! resolves to exactly one row, and a row carries exactly one kind.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which kind of account the session belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "org")]
    Org,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session")]
pub struct Model {
    /// Opaque random token presented by the client
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,

    pub kind: SessionKind,

    #[sea_orm(indexed)]
    pub account_id: String,

    /// Display snapshot. Refreshed on profile update; never used for
    /// authorization decisions, which re-fetch the account row.
    pub account_name: String,

    /// Display snapshot, see `account_name`.
    pub account_city: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

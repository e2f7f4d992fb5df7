//! Case status shared by reports and rescues.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a case.
///
/// `Pending` is the only initial state. `Finished` and `Rejected` are
/// terminal. Transitions are applied exclusively through the conditional
/// updates in the report/rescue repositories.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Submitted, waiting for an organization to act.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Claimed by an organization.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Resolved by the claiming organization.
    #[sea_orm(string_value = "finished")]
    Finished,
    /// Declined by an organization in the case's city.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl CaseStatus {
    /// Whether no further transition can leave this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Rejected)
    }
}

impl std::str::FromStr for CaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "finished" => Ok(Self::Finished),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown case status: {other}")),
        }
    }
}

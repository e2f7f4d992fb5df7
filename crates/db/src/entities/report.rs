//! Report (sighting) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::status::CaseStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Scopes which organizations may act on this case
    #[sea_orm(indexed)]
    pub city: String,

    #[sea_orm(nullable)]
    pub address: Option<String>,

    /// Date of the sighting as reported by the submitter
    pub sighted_at: Date,

    /// From the reporter's profile when authenticated, from the form otherwise
    pub contact_phone: String,

    #[sea_orm(nullable)]
    pub contact_email: Option<String>,

    /// Opaque photo reference; storage is external
    #[sea_orm(nullable)]
    pub photo_ref: Option<String>,

    pub status: CaseStatus,

    /// Owning user, None for anonymous submissions. Owner-only deletion.
    #[sea_orm(nullable, indexed)]
    pub reporter_id: Option<String>,

    /// Claiming organization once the case is in progress.
    /// Non-owning reference used for the finish guard.
    #[sea_orm(nullable, indexed)]
    pub assigned_org_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReporterId",
        to = "super::user::Column::Id"
    )]
    Reporter,

    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::AssignedOrgId",
        to = "super::organization::Column::Id"
    )]
    AssignedOrg,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reporter.def()
    }
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedOrg.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

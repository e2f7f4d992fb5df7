//! Rescue (assistance request) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::status::CaseStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rescue")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Required even for anonymous submissions
    pub author_name: String,

    /// Scopes which organizations may act on this case
    #[sea_orm(indexed)]
    pub city: String,

    /// Postal code (CEP)
    #[sea_orm(nullable)]
    pub cep: Option<String>,

    #[sea_orm(nullable)]
    pub address: Option<String>,

    /// Street number
    #[sea_orm(nullable)]
    pub number: Option<String>,

    #[sea_orm(nullable)]
    pub contact_phone: Option<String>,

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

//! Organization (ONG) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organization")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    /// Unique within organizations; users are a separate namespace
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 hash. Never leaves the credential store.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub phone: String,

    /// Document of the responsible person
    #[sea_orm(nullable)]
    pub cpf: Option<String>,

    /// Postal code (CEP)
    #[sea_orm(nullable)]
    pub cep: Option<String>,

    /// Scopes which cases this organization may act on
    pub city: String,

    #[sea_orm(nullable)]
    pub district: Option<String>,

    #[sea_orm(nullable)]
    pub address: Option<String>,

    /// Street number
    #[sea_orm(nullable)]
    pub number: Option<String>,

    /// Free-text description shown in the directory
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Opaque profile photo reference; storage is external
    #[sea_orm(nullable)]
    pub photo_ref: Option<String>,

    /// Finished reports, incremented only by the finish transition
    #[sea_orm(default_value = 0)]
    pub reports_resolved: i32,

    /// Finished rescues, incremented only by the finish transition
    #[sea_orm(default_value = 0)]
    pub rescues_resolved: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::report::Entity")]
    Reports,

    #[sea_orm(has_many = "super::rescue::Entity")]
    Rescues,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl Related<super::rescue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rescues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

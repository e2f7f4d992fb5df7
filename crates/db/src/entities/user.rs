//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name
    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 hash. Never leaves the credential store.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Contact phone, reused as the default contact for submitted cases
    pub phone: String,

    /// Postal code (CEP)
    #[sea_orm(nullable)]
    pub cep: Option<String>,

    pub city: String,

    #[sea_orm(nullable)]
    pub address: Option<String>,

    /// Street number
    #[sea_orm(nullable)]
    pub number: Option<String>,

    /// Opaque profile photo reference; storage is external
    #[sea_orm(nullable)]
    pub photo_ref: Option<String>,

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

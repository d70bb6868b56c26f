//! SeaORM Entity for centre_votes table
//!
//! A centre name is unique within its commune, not globally.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "centre_votes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_centre: i32,
    pub nom_centre: String,
    pub id_commune: i32,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::communes::Entity",
        from = "Column::IdCommune",
        to = "super::communes::Column::IdCommune",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Communes,
    #[sea_orm(has_many = "super::bureau_votes::Entity")]
    BureauVotes,
}

impl Related<super::communes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Communes.def()
    }
}

impl Related<super::bureau_votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BureauVotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

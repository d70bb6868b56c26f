//! SeaORM Entity for departements table

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "departements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_departement: i32,
    pub nom_departement: String,
    pub id_region: i32,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::regions::Entity",
        from = "Column::IdRegion",
        to = "super::regions::Column::IdRegion",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Regions,
    #[sea_orm(has_many = "super::communes::Entity")]
    Communes,
}

impl Related<super::regions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Regions.def()
    }
}

impl Related<super::communes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Communes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! SeaORM Entity for communes table

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "communes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_commune: i32,
    pub nom_commune: String,
    pub id_departement: i32,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departements::Entity",
        from = "Column::IdDepartement",
        to = "super::departements::Column::IdDepartement",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Departements,
    #[sea_orm(has_many = "super::centre_votes::Entity")]
    CentreVotes,
}

impl Related<super::departements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Departements.def()
    }
}

impl Related<super::centre_votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CentreVotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

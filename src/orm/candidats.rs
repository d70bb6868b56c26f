//! SeaORM Entity for candidats table

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "candidats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_candidat: i32,
    pub nom_candidat: String,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inscription_elections::Entity")]
    InscriptionElections,
    #[sea_orm(has_many = "super::resultat_votes::Entity")]
    ResultatVotes,
}

impl Related<super::inscription_elections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InscriptionElections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! SeaORM Entity for bureau_votes table
//!
//! Leaf of the geographic hierarchy. A bureau number is unique within its
//! centre.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "bureau_votes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_bureau: i32,
    pub numero_bureau: i32,
    pub implantation: String,
    pub id_centre: i32,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::centre_votes::Entity",
        from = "Column::IdCentre",
        to = "super::centre_votes::Column::IdCentre",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    CentreVotes,
    #[sea_orm(has_many = "super::participations::Entity")]
    Participations,
    #[sea_orm(has_many = "super::resultat_votes::Entity")]
    ResultatVotes,
}

impl Related<super::centre_votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CentreVotes.def()
    }
}

impl Related<super::participations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participations.def()
    }
}

impl Related<super::resultat_votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ResultatVotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

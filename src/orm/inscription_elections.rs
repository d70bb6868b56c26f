//! SeaORM Entity for inscription_elections table
//!
//! Registration of a candidate to run in an election on a given date. The
//! composite key allows the same candidate to appear on several dates of the
//! same election (multi-round ballots).

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "inscription_elections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_election: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_candidat: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub date_election: Date,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::elections::Entity",
        from = "Column::IdElection",
        to = "super::elections::Column::IdElection",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Elections,
    #[sea_orm(
        belongs_to = "super::candidats::Entity",
        from = "Column::IdCandidat",
        to = "super::candidats::Column::IdCandidat",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Candidats,
}

impl Related<super::elections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Elections.def()
    }
}

impl Related<super::candidats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candidats.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

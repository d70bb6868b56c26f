//! SeaORM Entity for resultat_votes table
//!
//! One vote tally per (election, bureau, candidat, date).

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "resultat_votes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_election: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_bureau: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_candidat: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub date_election: Date,
    pub voix: i32,
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
        belongs_to = "super::bureau_votes::Entity",
        from = "Column::IdBureau",
        to = "super::bureau_votes::Column::IdBureau",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    BureauVotes,
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

impl Related<super::bureau_votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BureauVotes.def()
    }
}

impl Related<super::candidats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candidats.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

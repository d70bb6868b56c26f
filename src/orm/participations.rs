//! SeaORM Entity for participations table
//!
//! One turnout record per (election, bureau, date). The composite primary key
//! is the uniqueness arbiter; `created_at` is set once at insert and drives
//! the temporal evolution buckets.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "participations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_election: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_bureau: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub date_election: Date,
    pub nombre_electeur: i32,
    pub nombre_votant: i32,
    pub nombre_votant_hors_bureau: i32,
    pub nombre_bulletin_null: i32,
    pub nombre_suffrage: i32,
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

impl ActiveModelBehavior for ActiveModel {}

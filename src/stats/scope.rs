//! Geographic scoping of ledger queries.
//!
//! A [`Perimetre`] names one of the six aggregation levels. The filter
//! builders translate it into the join chain walking the ledger up the
//! hierarchy (bureau → centre → commune → departement → region), so callers
//! only add their aggregate columns and grouping.

use sea_orm::{entity::*, query::*, DatabaseConnection, JoinType, Select};

use crate::error::ApiError;
use crate::orm::{
    bureau_votes, candidats, centre_votes, communes, departements, elections, participations,
    regions, resultat_votes,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perimetre {
    National,
    Region(i32),
    Departement(i32),
    Commune(i32),
    Centre(i32),
    Bureau(i32),
}

/// Participation rows restricted to the perimeter.
pub(crate) fn filtrer_participations(perimetre: Perimetre) -> Select<participations::Entity> {
    let query = participations::Entity::find();
    match perimetre {
        Perimetre::National => query,
        Perimetre::Bureau(id_bureau) => {
            query.filter(participations::Column::IdBureau.eq(id_bureau))
        }
        Perimetre::Centre(id_centre) => query
            .join(JoinType::InnerJoin, participations::Relation::BureauVotes.def())
            .filter(bureau_votes::Column::IdCentre.eq(id_centre)),
        Perimetre::Commune(id_commune) => query
            .join(JoinType::InnerJoin, participations::Relation::BureauVotes.def())
            .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def())
            .filter(centre_votes::Column::IdCommune.eq(id_commune)),
        Perimetre::Departement(id_departement) => query
            .join(JoinType::InnerJoin, participations::Relation::BureauVotes.def())
            .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def())
            .join(JoinType::InnerJoin, centre_votes::Relation::Communes.def())
            .filter(communes::Column::IdDepartement.eq(id_departement)),
        Perimetre::Region(id_region) => query
            .join(JoinType::InnerJoin, participations::Relation::BureauVotes.def())
            .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def())
            .join(JoinType::InnerJoin, centre_votes::Relation::Communes.def())
            .join(JoinType::InnerJoin, communes::Relation::Departements.def())
            .filter(departements::Column::IdRegion.eq(id_region)),
    }
}

/// Result rows restricted to the perimeter.
pub(crate) fn filtrer_resultats(perimetre: Perimetre) -> Select<resultat_votes::Entity> {
    let query = resultat_votes::Entity::find();
    match perimetre {
        Perimetre::National => query,
        Perimetre::Bureau(id_bureau) => {
            query.filter(resultat_votes::Column::IdBureau.eq(id_bureau))
        }
        Perimetre::Centre(id_centre) => query
            .join(JoinType::InnerJoin, resultat_votes::Relation::BureauVotes.def())
            .filter(bureau_votes::Column::IdCentre.eq(id_centre)),
        Perimetre::Commune(id_commune) => query
            .join(JoinType::InnerJoin, resultat_votes::Relation::BureauVotes.def())
            .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def())
            .filter(centre_votes::Column::IdCommune.eq(id_commune)),
        Perimetre::Departement(id_departement) => query
            .join(JoinType::InnerJoin, resultat_votes::Relation::BureauVotes.def())
            .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def())
            .join(JoinType::InnerJoin, centre_votes::Relation::Communes.def())
            .filter(communes::Column::IdDepartement.eq(id_departement)),
        Perimetre::Region(id_region) => query
            .join(JoinType::InnerJoin, resultat_votes::Relation::BureauVotes.def())
            .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def())
            .join(JoinType::InnerJoin, centre_votes::Relation::Communes.def())
            .join(JoinType::InnerJoin, communes::Relation::Departements.def())
            .filter(departements::Column::IdRegion.eq(id_region)),
    }
}

pub async fn charger_election(
    db: &DatabaseConnection,
    id_election: i32,
) -> Result<elections::Model, ApiError> {
    elections::Entity::find_by_id(id_election)
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("Élection avec l'ID {} introuvable", id_election))
        })
}

pub async fn charger_region(
    db: &DatabaseConnection,
    id_region: i32,
) -> Result<regions::Model, ApiError> {
    regions::Entity::find_by_id(id_region)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Région avec l'ID {} introuvable", id_region)))
}

pub async fn charger_departement(
    db: &DatabaseConnection,
    id_departement: i32,
) -> Result<departements::Model, ApiError> {
    departements::Entity::find_by_id(id_departement)
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "Département avec l'ID {} introuvable",
                id_departement
            ))
        })
}

pub async fn charger_commune(
    db: &DatabaseConnection,
    id_commune: i32,
) -> Result<communes::Model, ApiError> {
    communes::Entity::find_by_id(id_commune)
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("Commune avec l'ID {} introuvable", id_commune))
        })
}

pub async fn charger_centre(
    db: &DatabaseConnection,
    id_centre: i32,
) -> Result<centre_votes::Model, ApiError> {
    centre_votes::Entity::find_by_id(id_centre)
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "Centre de vote avec l'ID {} introuvable",
                id_centre
            ))
        })
}

pub async fn charger_bureau(
    db: &DatabaseConnection,
    id_bureau: i32,
) -> Result<bureau_votes::Model, ApiError> {
    bureau_votes::Entity::find_by_id(id_bureau)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Bureau avec l'ID {} introuvable", id_bureau)))
}

pub async fn charger_candidat(
    db: &DatabaseConnection,
    id_candidat: i32,
) -> Result<candidats::Model, ApiError> {
    candidats::Entity::find_by_id(id_candidat)
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("Candidat avec l'ID {} introuvable", id_candidat))
        })
}

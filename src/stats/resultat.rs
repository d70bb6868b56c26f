//! Result statistics: per-candidate vote totals and percentages over a
//! perimeter, and per-candidate geographic vote breakdowns.

use std::collections::BTreeMap;

use sea_orm::{entity::*, query::*, DatabaseConnection, FromQueryResult, JoinType, Order};
use serde::Serialize;

use crate::error::ApiError;
use crate::orm::{
    bureau_votes, candidats, centre_votes, communes, departements, regions, resultat_votes,
};
use crate::stats::scope::{filtrer_resultats, Perimetre};
use crate::stats::round2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatistiquesResultat {
    pub nom_candidat: String,
    pub total_voix: i64,
    pub pourcentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatistiquesResultatGlobal {
    pub total_voix_global: i64,
    pub resultats_candidats: Vec<StatistiquesResultat>,
}

/// Share of the overall vote count; 0.0 when no vote was cast in scope.
pub fn pourcentage(total_voix: i64, total_voix_global: i64) -> f64 {
    if total_voix_global == 0 {
        return 0.0;
    }
    round2(total_voix as f64 / total_voix_global as f64 * 100.0)
}

#[derive(Debug, FromQueryResult)]
struct LigneCandidat {
    nom_candidat: String,
    total_voix: Option<i64>,
}

fn en_statistiques(lignes: Vec<LigneCandidat>) -> StatistiquesResultatGlobal {
    let total_voix_global: i64 = lignes.iter().map(|l| l.total_voix.unwrap_or(0)).sum();
    let resultats_candidats = lignes
        .into_iter()
        .map(|ligne| {
            let total_voix = ligne.total_voix.unwrap_or(0);
            StatistiquesResultat {
                nom_candidat: ligne.nom_candidat,
                total_voix,
                pourcentage: pourcentage(total_voix, total_voix_global),
            }
        })
        .collect();
    StatistiquesResultatGlobal {
        total_voix_global,
        resultats_candidats,
    }
}

/// Per-candidate totals and percentages over one perimeter, candidates with
/// the most votes first. A valid scope with no rows yields an empty list and
/// a zero global total.
pub async fn statistiques(
    db: &DatabaseConnection,
    perimetre: Perimetre,
    id_election: i32,
    date_election: chrono::NaiveDate,
) -> Result<StatistiquesResultatGlobal, ApiError> {
    let lignes = filtrer_resultats(perimetre)
        .join(JoinType::InnerJoin, resultat_votes::Relation::Candidats.def())
        .select_only()
        .column_as(candidats::Column::NomCandidat, "nom_candidat")
        .column_as(resultat_votes::Column::Voix.sum(), "total_voix")
        .filter(resultat_votes::Column::IdElection.eq(id_election))
        .filter(resultat_votes::Column::DateElection.eq(date_election))
        .group_by(candidats::Column::IdCandidat)
        .group_by(candidats::Column::NomCandidat)
        .order_by(resultat_votes::Column::Voix.sum(), Order::Desc)
        .into_model::<LigneCandidat>()
        .all(db)
        .await?;
    Ok(en_statistiques(lignes))
}

#[derive(Debug, FromQueryResult)]
struct LigneVoixEnfant {
    nom: String,
    total_voix: Option<i64>,
}

fn en_carte_voix(lignes: Vec<LigneVoixEnfant>) -> BTreeMap<String, i64> {
    lignes
        .into_iter()
        .map(|ligne| (ligne.nom, ligne.total_voix.unwrap_or(0)))
        .collect()
}

/// One candidate's votes grouped by region, keyed by region name.
pub async fn votes_candidat_par_region(
    db: &DatabaseConnection,
    id_candidat: i32,
    id_election: i32,
    date_election: chrono::NaiveDate,
) -> Result<BTreeMap<String, i64>, ApiError> {
    let lignes = resultat_votes::Entity::find()
        .join(JoinType::InnerJoin, resultat_votes::Relation::BureauVotes.def())
        .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def())
        .join(JoinType::InnerJoin, centre_votes::Relation::Communes.def())
        .join(JoinType::InnerJoin, communes::Relation::Departements.def())
        .join(JoinType::InnerJoin, departements::Relation::Regions.def())
        .select_only()
        .column_as(regions::Column::NomRegion, "nom")
        .column_as(resultat_votes::Column::Voix.sum(), "total_voix")
        .filter(resultat_votes::Column::IdCandidat.eq(id_candidat))
        .filter(resultat_votes::Column::IdElection.eq(id_election))
        .filter(resultat_votes::Column::DateElection.eq(date_election))
        .group_by(regions::Column::IdRegion)
        .group_by(regions::Column::NomRegion)
        .into_model::<LigneVoixEnfant>()
        .all(db)
        .await?;
    Ok(en_carte_voix(lignes))
}

/// One candidate's votes in a region grouped by departement.
pub async fn votes_candidat_par_departement(
    db: &DatabaseConnection,
    id_candidat: i32,
    id_region: i32,
    id_election: i32,
    date_election: chrono::NaiveDate,
) -> Result<BTreeMap<String, i64>, ApiError> {
    let lignes = resultat_votes::Entity::find()
        .join(JoinType::InnerJoin, resultat_votes::Relation::BureauVotes.def())
        .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def())
        .join(JoinType::InnerJoin, centre_votes::Relation::Communes.def())
        .join(JoinType::InnerJoin, communes::Relation::Departements.def())
        .select_only()
        .column_as(departements::Column::NomDepartement, "nom")
        .column_as(resultat_votes::Column::Voix.sum(), "total_voix")
        .filter(departements::Column::IdRegion.eq(id_region))
        .filter(resultat_votes::Column::IdCandidat.eq(id_candidat))
        .filter(resultat_votes::Column::IdElection.eq(id_election))
        .filter(resultat_votes::Column::DateElection.eq(date_election))
        .group_by(departements::Column::IdDepartement)
        .group_by(departements::Column::NomDepartement)
        .into_model::<LigneVoixEnfant>()
        .all(db)
        .await?;
    Ok(en_carte_voix(lignes))
}

/// One candidate's votes in a departement grouped by commune.
pub async fn votes_candidat_par_commune(
    db: &DatabaseConnection,
    id_candidat: i32,
    id_departement: i32,
    id_election: i32,
    date_election: chrono::NaiveDate,
) -> Result<BTreeMap<String, i64>, ApiError> {
    let lignes = resultat_votes::Entity::find()
        .join(JoinType::InnerJoin, resultat_votes::Relation::BureauVotes.def())
        .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def())
        .join(JoinType::InnerJoin, centre_votes::Relation::Communes.def())
        .select_only()
        .column_as(communes::Column::NomCommune, "nom")
        .column_as(resultat_votes::Column::Voix.sum(), "total_voix")
        .filter(communes::Column::IdDepartement.eq(id_departement))
        .filter(resultat_votes::Column::IdCandidat.eq(id_candidat))
        .filter(resultat_votes::Column::IdElection.eq(id_election))
        .filter(resultat_votes::Column::DateElection.eq(date_election))
        .group_by(communes::Column::IdCommune)
        .group_by(communes::Column::NomCommune)
        .into_model::<LigneVoixEnfant>()
        .all(db)
        .await?;
    Ok(en_carte_voix(lignes))
}

/// One candidate's votes in a commune grouped by centre.
pub async fn votes_candidat_par_centre(
    db: &DatabaseConnection,
    id_candidat: i32,
    id_commune: i32,
    id_election: i32,
    date_election: chrono::NaiveDate,
) -> Result<BTreeMap<String, i64>, ApiError> {
    let lignes = resultat_votes::Entity::find()
        .join(JoinType::InnerJoin, resultat_votes::Relation::BureauVotes.def())
        .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def())
        .select_only()
        .column_as(centre_votes::Column::NomCentre, "nom")
        .column_as(resultat_votes::Column::Voix.sum(), "total_voix")
        .filter(centre_votes::Column::IdCommune.eq(id_commune))
        .filter(resultat_votes::Column::IdCandidat.eq(id_candidat))
        .filter(resultat_votes::Column::IdElection.eq(id_election))
        .filter(resultat_votes::Column::DateElection.eq(date_election))
        .group_by(centre_votes::Column::IdCentre)
        .group_by(centre_votes::Column::NomCentre)
        .into_model::<LigneVoixEnfant>()
        .all(db)
        .await?;
    Ok(en_carte_voix(lignes))
}

#[derive(Debug, FromQueryResult)]
struct LigneVoixBureau {
    numero_bureau: i32,
    total_voix: Option<i64>,
}

/// One candidate's votes in a centre per bureau, keyed by `"Bureau {numero}"`.
pub async fn votes_candidat_par_bureau(
    db: &DatabaseConnection,
    id_candidat: i32,
    id_centre: i32,
    id_election: i32,
    date_election: chrono::NaiveDate,
) -> Result<BTreeMap<String, i64>, ApiError> {
    let lignes = resultat_votes::Entity::find()
        .join(JoinType::InnerJoin, resultat_votes::Relation::BureauVotes.def())
        .select_only()
        .column_as(bureau_votes::Column::NumeroBureau, "numero_bureau")
        .column_as(resultat_votes::Column::Voix.sum(), "total_voix")
        .filter(bureau_votes::Column::IdCentre.eq(id_centre))
        .filter(resultat_votes::Column::IdCandidat.eq(id_candidat))
        .filter(resultat_votes::Column::IdElection.eq(id_election))
        .filter(resultat_votes::Column::DateElection.eq(date_election))
        .group_by(bureau_votes::Column::IdBureau)
        .group_by(bureau_votes::Column::NumeroBureau)
        .into_model::<LigneVoixBureau>()
        .all(db)
        .await?;
    Ok(lignes
        .into_iter()
        .map(|ligne| {
            (
                format!("Bureau {}", ligne.numero_bureau),
                ligne.total_voix.unwrap_or(0),
            )
        })
        .collect())
}

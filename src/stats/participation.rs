//! Turnout statistics: sums of the five raw counts over a perimeter plus the
//! derived participation and valid-suffrage rates, and the per-child
//! geographic breakdowns.

use std::collections::BTreeMap;

use sea_orm::{entity::*, query::*, DatabaseConnection, FromQueryResult, JoinType, Select};
use serde::Serialize;

use crate::error::ApiError;
use crate::orm::{
    bureau_votes, centre_votes, communes, departements, participations, regions,
};
use crate::stats::scope::{filtrer_participations, Perimetre};
use crate::stats::round2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatistiquesParticipation {
    pub total_electeurs: i64,
    pub total_votants: i64,
    pub total_votants_hors_bureau: i64,
    pub total_bulletins_nuls: i64,
    pub total_suffrages: i64,
    pub taux_participation: f64,
    pub taux_suffrages_valides: f64,
}

/// Percentage of registered electors who voted; 0.0 on an empty roll.
pub fn taux_participation(total_votants: i64, total_electeurs: i64) -> f64 {
    if total_electeurs == 0 {
        return 0.0;
    }
    round2(total_votants as f64 / total_electeurs as f64 * 100.0)
}

/// Percentage of voters whose ballot counted as a valid suffrage; 0.0 when
/// nobody voted.
pub fn taux_suffrages_valides(total_suffrages: i64, total_votants: i64) -> f64 {
    if total_votants == 0 {
        return 0.0;
    }
    round2(total_suffrages as f64 / total_votants as f64 * 100.0)
}

/// SUM() over an empty set is NULL, hence the Option fields.
#[derive(Debug, Default, FromQueryResult)]
struct TotauxParticipation {
    total_electeurs: Option<i64>,
    total_votants: Option<i64>,
    total_votants_hors_bureau: Option<i64>,
    total_bulletins_nuls: Option<i64>,
    total_suffrages: Option<i64>,
}

impl From<TotauxParticipation> for StatistiquesParticipation {
    fn from(totaux: TotauxParticipation) -> Self {
        let total_electeurs = totaux.total_electeurs.unwrap_or(0);
        let total_votants = totaux.total_votants.unwrap_or(0);
        let total_suffrages = totaux.total_suffrages.unwrap_or(0);
        Self {
            total_electeurs,
            total_votants,
            total_votants_hors_bureau: totaux.total_votants_hors_bureau.unwrap_or(0),
            total_bulletins_nuls: totaux.total_bulletins_nuls.unwrap_or(0),
            total_suffrages,
            taux_participation: taux_participation(total_votants, total_electeurs),
            taux_suffrages_valides: taux_suffrages_valides(total_suffrages, total_votants),
        }
    }
}

fn colonnes_sommes(query: Select<participations::Entity>) -> Select<participations::Entity> {
    query
        .select_only()
        .column_as(
            participations::Column::NombreElecteur.sum(),
            "total_electeurs",
        )
        .column_as(participations::Column::NombreVotant.sum(), "total_votants")
        .column_as(
            participations::Column::NombreVotantHorsBureau.sum(),
            "total_votants_hors_bureau",
        )
        .column_as(
            participations::Column::NombreBulletinNull.sum(),
            "total_bulletins_nuls",
        )
        .column_as(
            participations::Column::NombreSuffrage.sum(),
            "total_suffrages",
        )
}

/// Aggregate turnout over one perimeter for an (election, date) pair.
///
/// The caller is responsible for having verified that the election and the
/// scoped entity exist; a valid scope with no matching rows yields zeroed
/// totals and 0.0 rates.
pub async fn statistiques(
    db: &DatabaseConnection,
    perimetre: Perimetre,
    id_election: i32,
    date_election: chrono::NaiveDate,
) -> Result<StatistiquesParticipation, ApiError> {
    let totaux = colonnes_sommes(filtrer_participations(perimetre))
        .filter(participations::Column::IdElection.eq(id_election))
        .filter(participations::Column::DateElection.eq(date_election))
        .into_model::<TotauxParticipation>()
        .one(db)
        .await?
        .unwrap_or_default();
    Ok(totaux.into())
}

#[derive(Debug, FromQueryResult)]
struct LigneRepartition {
    nom: String,
    total_electeurs: Option<i64>,
    total_votants: Option<i64>,
    total_votants_hors_bureau: Option<i64>,
    total_bulletins_nuls: Option<i64>,
    total_suffrages: Option<i64>,
}

impl From<LigneRepartition> for StatistiquesParticipation {
    fn from(ligne: LigneRepartition) -> Self {
        TotauxParticipation {
            total_electeurs: ligne.total_electeurs,
            total_votants: ligne.total_votants,
            total_votants_hors_bureau: ligne.total_votants_hors_bureau,
            total_bulletins_nuls: ligne.total_bulletins_nuls,
            total_suffrages: ligne.total_suffrages,
        }
        .into()
    }
}

fn en_carte(lignes: Vec<LigneRepartition>) -> BTreeMap<String, StatistiquesParticipation> {
    lignes
        .into_iter()
        .map(|ligne| {
            let nom = ligne.nom.clone();
            (nom, ligne.into())
        })
        .collect()
}

/// National turnout grouped by region, keyed by region name. Regions with no
/// matching rows are absent from the map.
pub async fn repartition_regions(
    db: &DatabaseConnection,
    id_election: i32,
    date_election: chrono::NaiveDate,
) -> Result<BTreeMap<String, StatistiquesParticipation>, ApiError> {
    let lignes = colonnes_sommes(
        participations::Entity::find()
            .join(JoinType::InnerJoin, participations::Relation::BureauVotes.def())
            .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def())
            .join(JoinType::InnerJoin, centre_votes::Relation::Communes.def())
            .join(JoinType::InnerJoin, communes::Relation::Departements.def())
            .join(JoinType::InnerJoin, departements::Relation::Regions.def()),
    )
    .column_as(regions::Column::NomRegion, "nom")
    .filter(participations::Column::IdElection.eq(id_election))
    .filter(participations::Column::DateElection.eq(date_election))
    .group_by(regions::Column::IdRegion)
    .group_by(regions::Column::NomRegion)
    .into_model::<LigneRepartition>()
    .all(db)
    .await?;
    Ok(en_carte(lignes))
}

/// A region's turnout grouped by departement, keyed by departement name.
pub async fn repartition_departements(
    db: &DatabaseConnection,
    id_region: i32,
    id_election: i32,
    date_election: chrono::NaiveDate,
) -> Result<BTreeMap<String, StatistiquesParticipation>, ApiError> {
    let lignes = colonnes_sommes(
        participations::Entity::find()
            .join(JoinType::InnerJoin, participations::Relation::BureauVotes.def())
            .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def())
            .join(JoinType::InnerJoin, centre_votes::Relation::Communes.def())
            .join(JoinType::InnerJoin, communes::Relation::Departements.def()),
    )
    .column_as(departements::Column::NomDepartement, "nom")
    .filter(departements::Column::IdRegion.eq(id_region))
    .filter(participations::Column::IdElection.eq(id_election))
    .filter(participations::Column::DateElection.eq(date_election))
    .group_by(departements::Column::IdDepartement)
    .group_by(departements::Column::NomDepartement)
    .into_model::<LigneRepartition>()
    .all(db)
    .await?;
    Ok(en_carte(lignes))
}

/// A departement's turnout grouped by commune, keyed by commune name.
pub async fn repartition_communes(
    db: &DatabaseConnection,
    id_departement: i32,
    id_election: i32,
    date_election: chrono::NaiveDate,
) -> Result<BTreeMap<String, StatistiquesParticipation>, ApiError> {
    let lignes = colonnes_sommes(
        participations::Entity::find()
            .join(JoinType::InnerJoin, participations::Relation::BureauVotes.def())
            .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def())
            .join(JoinType::InnerJoin, centre_votes::Relation::Communes.def()),
    )
    .column_as(communes::Column::NomCommune, "nom")
    .filter(communes::Column::IdDepartement.eq(id_departement))
    .filter(participations::Column::IdElection.eq(id_election))
    .filter(participations::Column::DateElection.eq(date_election))
    .group_by(communes::Column::IdCommune)
    .group_by(communes::Column::NomCommune)
    .into_model::<LigneRepartition>()
    .all(db)
    .await?;
    Ok(en_carte(lignes))
}

/// A commune's turnout grouped by centre, keyed by centre name.
pub async fn repartition_centres(
    db: &DatabaseConnection,
    id_commune: i32,
    id_election: i32,
    date_election: chrono::NaiveDate,
) -> Result<BTreeMap<String, StatistiquesParticipation>, ApiError> {
    let lignes = colonnes_sommes(
        participations::Entity::find()
            .join(JoinType::InnerJoin, participations::Relation::BureauVotes.def())
            .join(JoinType::InnerJoin, bureau_votes::Relation::CentreVotes.def()),
    )
    .column_as(centre_votes::Column::NomCentre, "nom")
    .filter(centre_votes::Column::IdCommune.eq(id_commune))
    .filter(participations::Column::IdElection.eq(id_election))
    .filter(participations::Column::DateElection.eq(date_election))
    .group_by(centre_votes::Column::IdCentre)
    .group_by(centre_votes::Column::NomCentre)
    .into_model::<LigneRepartition>()
    .all(db)
    .await?;
    Ok(en_carte(lignes))
}

#[derive(Debug, FromQueryResult)]
struct LigneBureau {
    numero_bureau: i32,
    total_electeurs: Option<i64>,
    total_votants: Option<i64>,
    total_votants_hors_bureau: Option<i64>,
    total_bulletins_nuls: Option<i64>,
    total_suffrages: Option<i64>,
}

/// A centre's turnout per bureau, keyed by `"Bureau {numero}"`.
pub async fn repartition_bureaux(
    db: &DatabaseConnection,
    id_centre: i32,
    id_election: i32,
    date_election: chrono::NaiveDate,
) -> Result<BTreeMap<String, StatistiquesParticipation>, ApiError> {
    let lignes = colonnes_sommes(
        participations::Entity::find()
            .join(JoinType::InnerJoin, participations::Relation::BureauVotes.def()),
    )
    .column_as(bureau_votes::Column::NumeroBureau, "numero_bureau")
    .filter(bureau_votes::Column::IdCentre.eq(id_centre))
    .filter(participations::Column::IdElection.eq(id_election))
    .filter(participations::Column::DateElection.eq(date_election))
    .group_by(bureau_votes::Column::IdBureau)
    .group_by(bureau_votes::Column::NumeroBureau)
    .into_model::<LigneBureau>()
    .all(db)
    .await?;
    Ok(lignes
        .into_iter()
        .map(|ligne| {
            let nom = format!("Bureau {}", ligne.numero_bureau);
            let stat: StatistiquesParticipation = TotauxParticipation {
                total_electeurs: ligne.total_electeurs,
                total_votants: ligne.total_votants,
                total_votants_hors_bureau: ligne.total_votants_hors_bureau,
                total_bulletins_nuls: ligne.total_bulletins_nuls,
                total_suffrages: ligne.total_suffrages,
            }
            .into();
            (nom, stat)
        })
        .collect())
}

//! Resolution of human-supplied identifiers into hierarchy rows.
//!
//! Turnout and result sheets identify a polling station as
//! (election type, commune name, centre name fragment, bureau number). The
//! centre fragment is matched as a case-insensitive substring against the
//! commune's centres in `id_centre` order; the first hit wins. When several
//! centres contain the fragment, the match is flagged ambiguous and logged,
//! but the first one is still used.

use sea_orm::{entity::*, query::*, DatabaseConnection};

use crate::error::ApiError;
use crate::normalize;
use crate::orm::{bureau_votes, candidats, centre_votes, communes, elections};

/// Outcome of resolving an (election, commune, centre fragment, bureau
/// number) quadruple.
#[derive(Debug)]
pub struct BureauResolu {
    pub election: elections::Model,
    pub centre: centre_votes::Model,
    pub bureau: bureau_votes::Model,
    /// More than one centre of the commune contained the fragment.
    pub centre_ambigu: bool,
}

/// Centres of the commune whose name contains the fragment, in stored order.
fn centres_correspondants<'a>(
    centres: &'a [centre_votes::Model],
    fragment: &str,
) -> Vec<&'a centre_votes::Model> {
    let fragment = normalize::upper(fragment);
    centres
        .iter()
        .filter(|centre| centre.nom_centre.to_uppercase().contains(&fragment))
        .collect()
}

pub async fn resolve_election(
    db: &DatabaseConnection,
    type_election: &str,
) -> Result<elections::Model, ApiError> {
    elections::Entity::find()
        .filter(elections::Column::TypeElection.eq(normalize::upper(type_election)))
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "Élection de type '{}' introuvable",
                type_election
            ))
        })
}

pub async fn resolve_candidat(
    db: &DatabaseConnection,
    nom_candidat: &str,
) -> Result<candidats::Model, ApiError> {
    candidats::Entity::find()
        .filter(candidats::Column::NomCandidat.eq(normalize::upper(nom_candidat)))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Candidat '{}' introuvable", nom_candidat)))
}

pub async fn resolve_bureau(
    db: &DatabaseConnection,
    type_election: &str,
    commune: &str,
    centre_fragment: &str,
    numero_bureau: i32,
) -> Result<BureauResolu, ApiError> {
    let election = resolve_election(db, type_election).await?;

    let commune_row = communes::Entity::find()
        .filter(communes::Column::NomCommune.eq(normalize::capitalize(commune)))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Commune '{}' introuvable", commune)))?;

    // Ordering by id pins the "first in stored order" policy.
    let centres = centre_votes::Entity::find()
        .filter(centre_votes::Column::IdCommune.eq(commune_row.id_commune))
        .order_by_asc(centre_votes::Column::IdCentre)
        .all(db)
        .await?;

    let correspondants = centres_correspondants(&centres, centre_fragment);
    let centre_ambigu = correspondants.len() > 1;
    let centre = correspondants.first().copied().cloned().ok_or_else(|| {
        ApiError::not_found(format!("Centre contenant '{}' introuvable", centre_fragment))
    })?;
    if centre_ambigu {
        log::warn!(
            "Fragment de centre '{}' ambigu dans la commune '{}': {} correspondances, '{}' retenu",
            centre_fragment,
            commune_row.nom_commune,
            correspondants.len(),
            centre.nom_centre
        );
    }

    let bureau = bureau_votes::Entity::find()
        .filter(bureau_votes::Column::IdCentre.eq(centre.id_centre))
        .filter(bureau_votes::Column::NumeroBureau.eq(numero_bureau))
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "Bureau numéro '{}' introuvable dans le centre '{}'",
                numero_bureau, centre.nom_centre
            ))
        })?;

    Ok(BureauResolu {
        election,
        centre,
        bureau,
        centre_ambigu,
    })
}

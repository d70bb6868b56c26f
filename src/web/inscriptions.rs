//! Candidate registration endpoints.
//!
//! The bulk create is best-effort: unknown candidates and already-registered
//! pairs are skipped, and the call only fails when nothing at all could be
//! created. This deliberately contrasts with the all-or-nothing bulk of the
//! result ledger: registration lists tolerate typos, tally sheets do not.

use actix_web::web::Data;
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::orm::{candidats, inscription_elections};
use crate::resolver;
use crate::stats::scope::charger_election;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(creer_inscription)
        .service(creer_inscriptions_bulk)
        .service(lister_inscriptions)
        .service(supprimer_inscription);
}

async fn inscription_existante(
    db: &DatabaseConnection,
    id_election: i32,
    id_candidat: i32,
    date_election: NaiveDate,
) -> Result<bool, ApiError> {
    let inscription = inscription_elections::Entity::find()
        .filter(inscription_elections::Column::IdElection.eq(id_election))
        .filter(inscription_elections::Column::IdCandidat.eq(id_candidat))
        .filter(inscription_elections::Column::DateElection.eq(date_election))
        .one(db)
        .await?;
    Ok(inscription.is_some())
}

#[derive(Debug, Deserialize)]
pub struct InscriptionForm {
    pub id_election: i32,
    pub nom_candidat: String,
    pub date_election: NaiveDate,
}

#[post("/elections/inscriptions-elections/")]
pub async fn creer_inscription(
    db: Data<DatabaseConnection>,
    form: web::Json<InscriptionForm>,
) -> Result<impl Responder, ApiError> {
    let db = db.get_ref();

    let election = charger_election(db, form.id_election).await?;
    let candidat = resolver::resolve_candidat(db, &form.nom_candidat).await?;

    if inscription_existante(db, election.id_election, candidat.id_candidat, form.date_election)
        .await?
    {
        return Err(ApiError::conflict(
            "Une inscription existe déjà pour ce candidat, cette élection et cette date",
        ));
    }

    let inscription = inscription_elections::ActiveModel {
        id_election: Set(election.id_election),
        id_candidat: Set(candidat.id_candidat),
        date_election: Set(form.date_election),
        created_at: Set(Utc::now().naive_utc()),
    };
    let inscription = inscription.insert(db).await.map_err(|err| {
        ApiError::insertion(
            err,
            "Une inscription existe déjà pour ce candidat, cette élection et cette date",
        )
    })?;

    log::info!(
        "Inscription créée pour élection {}, candidat {}",
        inscription.id_election,
        inscription.id_candidat
    );
    Ok(HttpResponse::Created().json(inscription))
}

#[derive(Debug, Deserialize)]
pub struct InscriptionItem {
    pub id_candidat: i32,
}

#[derive(Debug, Deserialize)]
pub struct InscriptionBulkForm {
    pub id_election: i32,
    pub date_election: NaiveDate,
    pub candidats: Vec<InscriptionItem>,
}

/// Registers a list of candidates in one call, skipping unknown candidates
/// and existing registrations. Fails only when not a single registration
/// could be created.
#[post("/elections/inscriptions-elections/bulk")]
pub async fn creer_inscriptions_bulk(
    db: Data<DatabaseConnection>,
    form: web::Json<InscriptionBulkForm>,
) -> Result<impl Responder, ApiError> {
    let db = db.get_ref();

    let election = charger_election(db, form.id_election).await?;

    let mut a_creer = Vec::new();
    for item in &form.candidats {
        let candidat = candidats::Entity::find_by_id(item.id_candidat).one(db).await?;
        let candidat = match candidat {
            Some(candidat) => candidat,
            None => {
                log::warn!("Candidat '{}' introuvable, ignoré", item.id_candidat);
                continue;
            }
        };

        if inscription_existante(
            db,
            election.id_election,
            candidat.id_candidat,
            form.date_election,
        )
        .await?
        {
            log::warn!(
                "Inscription existante pour candidat {}, ignorée",
                candidat.nom_candidat
            );
            continue;
        }

        a_creer.push(inscription_elections::ActiveModel {
            id_election: Set(election.id_election),
            id_candidat: Set(candidat.id_candidat),
            date_election: Set(form.date_election),
            created_at: Set(Utc::now().naive_utc()),
        });
    }

    if a_creer.is_empty() {
        return Err(ApiError::validation(
            "Aucune inscription n'a pu être créée. Vérifiez les candidats et les inscriptions existantes.",
        ));
    }

    let txn = db.begin().await?;
    let mut creees = Vec::with_capacity(a_creer.len());
    for inscription in a_creer {
        creees.push(inscription.insert(&txn).await?);
    }
    txn.commit().await?;

    log::info!(
        "{} inscriptions créées en masse pour l'élection {}",
        creees.len(),
        election.id_election
    );
    Ok(HttpResponse::Created().json(creees))
}

#[get("/elections/inscriptions-elections/")]
pub async fn lister_inscriptions(
    db: Data<DatabaseConnection>,
) -> Result<impl Responder, ApiError> {
    let inscriptions = inscription_elections::Entity::find()
        .order_by_asc(inscription_elections::Column::CreatedAt)
        .all(db.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(inscriptions))
}

#[delete("/elections/inscriptions-elections/{id_election}/{nom_candidat}/{date_election}")]
pub async fn supprimer_inscription(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, String, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_election, nom_candidat, date_election) = path.into_inner();
    let db = db.get_ref();

    let election = charger_election(db, id_election).await?;
    let candidat = resolver::resolve_candidat(db, &nom_candidat).await?;

    let inscription = inscription_elections::Entity::find()
        .filter(inscription_elections::Column::IdElection.eq(election.id_election))
        .filter(inscription_elections::Column::IdCandidat.eq(candidat.id_candidat))
        .filter(inscription_elections::Column::DateElection.eq(date_election))
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found("Inscription introuvable pour ce candidat à cette élection et date")
        })?;
    let inscription: inscription_elections::ActiveModel = inscription.into();
    inscription.delete(db).await?;

    log::info!(
        "Inscription supprimée pour élection {}, candidat {}",
        election.id_election,
        candidat.id_candidat
    );
    Ok(HttpResponse::Ok().json(json!({ "message": "Inscription supprimée avec succès" })))
}

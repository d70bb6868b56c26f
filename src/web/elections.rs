//! CRUD for elections plus the known election dates.

use actix_web::web::Data;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, FromQueryResult};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::ApiError;
use crate::normalize;
use crate::orm::{elections, inscription_elections};
use crate::stats::scope::charger_election;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(creer_election)
        .service(lister_elections)
        .service(lister_toutes_dates)
        .service(obtenir_election)
        .service(dates_election)
        .service(modifier_election)
        .service(supprimer_election);
}

#[derive(Debug, Deserialize, Validate)]
pub struct ElectionForm {
    #[validate(length(min = 2, max = 50))]
    pub type_election: String,
}

#[post("/elections/")]
pub async fn creer_election(
    db: Data<DatabaseConnection>,
    form: web::Json<ElectionForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let db = db.get_ref();
    let type_election = normalize::upper(&form.type_election);

    let existante = elections::Entity::find()
        .filter(elections::Column::TypeElection.eq(type_election.clone()))
        .one(db)
        .await?;
    if existante.is_some() {
        return Err(ApiError::validation(format!(
            "Une élection de type '{}' existe déjà",
            type_election
        )));
    }

    let maintenant = Utc::now().naive_utc();
    let election = elections::ActiveModel {
        type_election: Set(type_election),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    };
    let election = election.insert(db).await?;

    log::info!(
        "Élection créée: {} (ID: {})",
        election.type_election,
        election.id_election
    );
    Ok(HttpResponse::Created().json(election))
}

#[get("/elections/")]
pub async fn lister_elections(db: Data<DatabaseConnection>) -> Result<impl Responder, ApiError> {
    let elections = elections::Entity::find()
        .order_by_asc(elections::Column::IdElection)
        .all(db.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(elections))
}

#[derive(Debug, FromQueryResult)]
struct LigneDate {
    date_election: chrono::NaiveDate,
}

/// Distinct dates on which any election is registered.
#[get("/elections/dates/all")]
pub async fn lister_toutes_dates(
    db: Data<DatabaseConnection>,
) -> Result<impl Responder, ApiError> {
    let dates = inscription_elections::Entity::find()
        .select_only()
        .column(inscription_elections::Column::DateElection)
        .group_by(inscription_elections::Column::DateElection)
        .order_by_asc(inscription_elections::Column::DateElection)
        .into_model::<LigneDate>()
        .all(db.get_ref())
        .await?;
    let dates: Vec<chrono::NaiveDate> = dates.into_iter().map(|d| d.date_election).collect();
    Ok(HttpResponse::Ok().json(dates))
}

#[get("/elections/{id_election}")]
pub async fn obtenir_election(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let election = charger_election(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(election))
}

/// Distinct registration dates for one election.
#[get("/elections/{id_election}/dates")]
pub async fn dates_election(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let id_election = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;

    let dates = inscription_elections::Entity::find()
        .select_only()
        .column(inscription_elections::Column::DateElection)
        .filter(inscription_elections::Column::IdElection.eq(id_election))
        .group_by(inscription_elections::Column::DateElection)
        .order_by_asc(inscription_elections::Column::DateElection)
        .into_model::<LigneDate>()
        .all(db)
        .await?;
    let dates: Vec<chrono::NaiveDate> = dates.into_iter().map(|d| d.date_election).collect();
    Ok(HttpResponse::Ok().json(dates))
}

#[put("/elections/{id_election}")]
pub async fn modifier_election(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<ElectionForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let id_election = path.into_inner();
    let db = db.get_ref();
    let type_election = normalize::upper(&form.type_election);

    let election = charger_election(db, id_election).await?;

    let collision = elections::Entity::find()
        .filter(elections::Column::TypeElection.eq(type_election.clone()))
        .filter(elections::Column::IdElection.ne(id_election))
        .one(db)
        .await?;
    if collision.is_some() {
        return Err(ApiError::validation("Type d'élection déjà utilisé"));
    }

    let mut election: elections::ActiveModel = election.into();
    election.type_election = Set(type_election);
    election.updated_at = Set(Utc::now().naive_utc());
    let election = election.update(db).await?;

    Ok(HttpResponse::Ok().json(election))
}

#[delete("/elections/{id_election}")]
pub async fn supprimer_election(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let id_election = path.into_inner();
    let db = db.get_ref();

    let election = charger_election(db, id_election).await?;
    let type_election = election.type_election.clone();
    let election: elections::ActiveModel = election.into();
    election.delete(db).await?;

    log::info!("Élection supprimée: {} (ID: {})", type_election, id_election);
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Élection '{}' supprimée avec succès", type_election)
    })))
}

//! CRUD for candidates.

use actix_web::web::Data;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::ApiError;
use crate::normalize;
use crate::orm::candidats;
use crate::pagination::{Page, PageQuery};
use crate::stats::scope::charger_candidat;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(creer_candidat)
        .service(lister_candidats)
        .service(lister_tous_candidats)
        .service(obtenir_candidat)
        .service(modifier_candidat)
        .service(supprimer_candidat);
}

#[derive(Debug, Deserialize, Validate)]
pub struct CandidatForm {
    #[validate(length(min = 2, max = 150))]
    pub nom_candidat: String,
}

#[post("/candidats/")]
pub async fn creer_candidat(
    db: Data<DatabaseConnection>,
    form: web::Json<CandidatForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let db = db.get_ref();
    let nom_candidat = normalize::upper(&form.nom_candidat);

    let existant = candidats::Entity::find()
        .filter(candidats::Column::NomCandidat.eq(nom_candidat.clone()))
        .one(db)
        .await?;
    if existant.is_some() {
        return Err(ApiError::validation(format!(
            "Le candidat '{}' existe déjà",
            nom_candidat
        )));
    }

    let maintenant = Utc::now().naive_utc();
    let candidat = candidats::ActiveModel {
        nom_candidat: Set(nom_candidat),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    };
    let candidat = candidat.insert(db).await?;

    log::info!(
        "Candidat créé: {} (ID: {})",
        candidat.nom_candidat,
        candidat.id_candidat
    );
    Ok(HttpResponse::Created().json(candidat))
}

#[get("/candidats/")]
pub async fn lister_candidats(
    db: Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    let db = db.get_ref();
    let offset = query.offset()?;

    let data = candidats::Entity::find()
        .order_by_asc(candidats::Column::IdCandidat)
        .offset(offset)
        .limit(query.limit)
        .all(db)
        .await?;
    let total = candidats::Entity::find()
        .paginate(db, query.limit as usize)
        .num_items()
        .await? as u64;

    Ok(HttpResponse::Ok().json(Page { data, total }))
}

#[get("/candidats/all")]
pub async fn lister_tous_candidats(
    db: Data<DatabaseConnection>,
) -> Result<impl Responder, ApiError> {
    let candidats = candidats::Entity::find()
        .order_by_asc(candidats::Column::NomCandidat)
        .all(db.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(candidats))
}

#[get("/candidats/{id_candidat}")]
pub async fn obtenir_candidat(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let candidat = charger_candidat(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(candidat))
}

#[put("/candidats/{id_candidat}")]
pub async fn modifier_candidat(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<CandidatForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let id_candidat = path.into_inner();
    let db = db.get_ref();
    let nom_candidat = normalize::upper(&form.nom_candidat);

    let candidat = charger_candidat(db, id_candidat).await?;

    let collision = candidats::Entity::find()
        .filter(candidats::Column::NomCandidat.eq(nom_candidat.clone()))
        .filter(candidats::Column::IdCandidat.ne(id_candidat))
        .one(db)
        .await?;
    if collision.is_some() {
        return Err(ApiError::validation("Nom du candidat déjà utilisé"));
    }

    let mut candidat: candidats::ActiveModel = candidat.into();
    candidat.nom_candidat = Set(nom_candidat);
    candidat.updated_at = Set(Utc::now().naive_utc());
    let candidat = candidat.update(db).await?;

    Ok(HttpResponse::Ok().json(candidat))
}

#[delete("/candidats/{id_candidat}")]
pub async fn supprimer_candidat(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let id_candidat = path.into_inner();
    let db = db.get_ref();

    let candidat = charger_candidat(db, id_candidat).await?;
    let nom_candidat = candidat.nom_candidat.clone();
    let candidat: candidats::ActiveModel = candidat.into();
    candidat.delete(db).await?;

    log::info!("Candidat supprimé: {} (ID: {})", nom_candidat, id_candidat);
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Candidat '{}' supprimé avec succès", nom_candidat)
    })))
}

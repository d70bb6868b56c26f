//! CRUD for communes.
//!
//! Deleting a commune cascades to its centres and bureaux at the store level;
//! there is no service-level child guard here, unlike regions, departements
//! and centres.

use actix_web::web::Data;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::ApiError;
use crate::normalize;
use crate::orm::{centre_votes, communes};
use crate::pagination::{Page, PageQuery};
use crate::stats::scope::{charger_commune, charger_departement};

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(creer_commune)
        .service(lister_communes)
        .service(lister_toutes_communes)
        .service(obtenir_commune)
        .service(modifier_commune)
        .service(supprimer_commune)
        .service(centres_de_commune);
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommuneForm {
    #[validate(length(min = 2, max = 100))]
    pub nom_commune: String,
    pub id_departement: i32,
}

#[post("/communes/")]
pub async fn creer_commune(
    db: Data<DatabaseConnection>,
    form: web::Json<CommuneForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let db = db.get_ref();
    let nom_commune = normalize::capitalize(&form.nom_commune);

    charger_departement(db, form.id_departement).await?;

    let existante = communes::Entity::find()
        .filter(communes::Column::NomCommune.eq(nom_commune.clone()))
        .one(db)
        .await?;
    if existante.is_some() {
        return Err(ApiError::validation("Nom de la commune déjà utilisé"));
    }

    let maintenant = Utc::now().naive_utc();
    let commune = communes::ActiveModel {
        nom_commune: Set(nom_commune),
        id_departement: Set(form.id_departement),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    };
    let commune = commune.insert(db).await?;

    log::info!(
        "Commune créée: {} (ID: {})",
        commune.nom_commune,
        commune.id_commune
    );
    Ok(HttpResponse::Created().json(commune))
}

#[get("/communes/")]
pub async fn lister_communes(
    db: Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    let db = db.get_ref();
    let offset = query.offset()?;

    let data = communes::Entity::find()
        .order_by_asc(communes::Column::IdCommune)
        .offset(offset)
        .limit(query.limit)
        .all(db)
        .await?;
    let total = communes::Entity::find()
        .paginate(db, query.limit as usize)
        .num_items()
        .await? as u64;

    Ok(HttpResponse::Ok().json(Page { data, total }))
}

#[get("/communes/all")]
pub async fn lister_toutes_communes(
    db: Data<DatabaseConnection>,
) -> Result<impl Responder, ApiError> {
    let communes = communes::Entity::find()
        .order_by_asc(communes::Column::NomCommune)
        .all(db.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(communes))
}

#[get("/communes/{id_commune}")]
pub async fn obtenir_commune(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let commune = charger_commune(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(commune))
}

#[put("/communes/{id_commune}")]
pub async fn modifier_commune(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<CommuneForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let id_commune = path.into_inner();
    let db = db.get_ref();
    let nom_commune = normalize::capitalize(&form.nom_commune);

    let commune = charger_commune(db, id_commune).await?;
    charger_departement(db, form.id_departement).await?;

    let collision = communes::Entity::find()
        .filter(communes::Column::NomCommune.eq(nom_commune.clone()))
        .filter(communes::Column::IdCommune.ne(id_commune))
        .one(db)
        .await?;
    if collision.is_some() {
        return Err(ApiError::validation("Nom de la commune déjà utilisé"));
    }

    let mut commune: communes::ActiveModel = commune.into();
    commune.nom_commune = Set(nom_commune);
    commune.id_departement = Set(form.id_departement);
    commune.updated_at = Set(Utc::now().naive_utc());
    let commune = commune.update(db).await?;

    Ok(HttpResponse::Ok().json(commune))
}

#[delete("/communes/{id_commune}")]
pub async fn supprimer_commune(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let id_commune = path.into_inner();
    let db = db.get_ref();

    let commune = charger_commune(db, id_commune).await?;
    let nom_commune = commune.nom_commune.clone();
    let commune: communes::ActiveModel = commune.into();
    commune.delete(db).await?;

    log::info!("Commune supprimée: {} (ID: {})", nom_commune, id_commune);
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Commune '{}' supprimée avec succès", nom_commune)
    })))
}

#[get("/communes/{id_commune}/centres")]
pub async fn centres_de_commune(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let id_commune = path.into_inner();
    let db = db.get_ref();
    charger_commune(db, id_commune).await?;

    let centres = centre_votes::Entity::find()
        .filter(centre_votes::Column::IdCommune.eq(id_commune))
        .order_by_asc(centre_votes::Column::IdCentre)
        .all(db)
        .await?;
    Ok(HttpResponse::Ok().json(centres))
}

//! CRUD for departements.

use actix_web::web::Data;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::ApiError;
use crate::normalize;
use crate::orm::{communes, departements};
use crate::pagination::{Page, PageQuery};
use crate::stats::scope::{charger_departement, charger_region};

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(creer_departement)
        .service(lister_departements)
        .service(lister_tous_departements)
        .service(obtenir_departement)
        .service(modifier_departement)
        .service(supprimer_departement)
        .service(communes_de_departement);
}

#[derive(Debug, Deserialize, Validate)]
pub struct DepartementForm {
    #[validate(length(min = 2, max = 100))]
    pub nom_departement: String,
    pub id_region: i32,
}

#[post("/departements/")]
pub async fn creer_departement(
    db: Data<DatabaseConnection>,
    form: web::Json<DepartementForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let db = db.get_ref();
    let nom_departement = normalize::upper(&form.nom_departement);

    charger_region(db, form.id_region).await?;

    let existant = departements::Entity::find()
        .filter(departements::Column::NomDepartement.eq(nom_departement.clone()))
        .one(db)
        .await?;
    if existant.is_some() {
        return Err(ApiError::validation("Nom du département déjà utilisé"));
    }

    let maintenant = Utc::now().naive_utc();
    let departement = departements::ActiveModel {
        nom_departement: Set(nom_departement),
        id_region: Set(form.id_region),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    };
    let departement = departement.insert(db).await?;

    log::info!(
        "Département créé: {} (ID: {})",
        departement.nom_departement,
        departement.id_departement
    );
    Ok(HttpResponse::Created().json(departement))
}

#[get("/departements/")]
pub async fn lister_departements(
    db: Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    let db = db.get_ref();
    let offset = query.offset()?;

    let data = departements::Entity::find()
        .order_by_asc(departements::Column::IdDepartement)
        .offset(offset)
        .limit(query.limit)
        .all(db)
        .await?;
    let total = departements::Entity::find()
        .paginate(db, query.limit as usize)
        .num_items()
        .await? as u64;

    Ok(HttpResponse::Ok().json(Page { data, total }))
}

#[get("/departements/all")]
pub async fn lister_tous_departements(
    db: Data<DatabaseConnection>,
) -> Result<impl Responder, ApiError> {
    let departements = departements::Entity::find()
        .order_by_asc(departements::Column::NomDepartement)
        .all(db.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(departements))
}

#[get("/departements/{id_departement}")]
pub async fn obtenir_departement(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let departement = charger_departement(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(departement))
}

#[put("/departements/{id_departement}")]
pub async fn modifier_departement(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<DepartementForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let id_departement = path.into_inner();
    let db = db.get_ref();
    let nom_departement = normalize::upper(&form.nom_departement);

    let departement = charger_departement(db, id_departement).await?;
    charger_region(db, form.id_region).await?;

    let collision = departements::Entity::find()
        .filter(departements::Column::NomDepartement.eq(nom_departement.clone()))
        .filter(departements::Column::IdDepartement.ne(id_departement))
        .one(db)
        .await?;
    if collision.is_some() {
        return Err(ApiError::validation("Nom du département déjà utilisé"));
    }

    let mut departement: departements::ActiveModel = departement.into();
    departement.nom_departement = Set(nom_departement);
    departement.id_region = Set(form.id_region);
    departement.updated_at = Set(Utc::now().naive_utc());
    let departement = departement.update(db).await?;

    Ok(HttpResponse::Ok().json(departement))
}

#[delete("/departements/{id_departement}")]
pub async fn supprimer_departement(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let id_departement = path.into_inner();
    let db = db.get_ref();

    let departement = charger_departement(db, id_departement).await?;

    let nombre_communes = communes::Entity::find()
        .filter(communes::Column::IdDepartement.eq(id_departement))
        .paginate(db, 1)
        .num_items()
        .await?;
    if nombre_communes > 0 {
        return Err(ApiError::conflict(format!(
            "Impossible de supprimer le département. Il contient {} commune(s)",
            nombre_communes
        )));
    }

    let nom_departement = departement.nom_departement.clone();
    let departement: departements::ActiveModel = departement.into();
    departement.delete(db).await?;

    log::info!(
        "Département supprimé: {} (ID: {})",
        nom_departement,
        id_departement
    );
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Département '{}' supprimé avec succès", nom_departement)
    })))
}

#[get("/departements/{id_departement}/communes")]
pub async fn communes_de_departement(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let id_departement = path.into_inner();
    let db = db.get_ref();
    charger_departement(db, id_departement).await?;

    let communes = communes::Entity::find()
        .filter(communes::Column::IdDepartement.eq(id_departement))
        .order_by_asc(communes::Column::NomCommune)
        .all(db)
        .await?;
    Ok(HttpResponse::Ok().json(communes))
}

//! CRUD for regions, the root of the geographic hierarchy.

use actix_web::web::Data;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::ApiError;
use crate::normalize;
use crate::orm::{departements, regions};
use crate::pagination::{Page, PageQuery};
use crate::stats::scope::charger_region;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(creer_region)
        .service(lister_regions)
        .service(lister_toutes_regions)
        .service(obtenir_region)
        .service(modifier_region)
        .service(supprimer_region)
        .service(departements_de_region);
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegionForm {
    #[validate(length(min = 2, max = 100))]
    pub nom_region: String,
}

#[post("/regions/")]
pub async fn creer_region(
    db: Data<DatabaseConnection>,
    form: web::Json<RegionForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let db = db.get_ref();
    let nom_region = normalize::upper(&form.nom_region);

    let existante = regions::Entity::find()
        .filter(regions::Column::NomRegion.eq(nom_region.clone()))
        .one(db)
        .await?;
    if existante.is_some() {
        return Err(ApiError::validation(format!(
            "La région '{}' existe déjà",
            nom_region
        )));
    }

    let maintenant = Utc::now().naive_utc();
    let region = regions::ActiveModel {
        nom_region: Set(nom_region),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    };
    let region = region.insert(db).await?;

    log::info!("Région créée: {} (ID: {})", region.nom_region, region.id_region);
    Ok(HttpResponse::Created().json(region))
}

#[get("/regions/")]
pub async fn lister_regions(
    db: Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    let db = db.get_ref();
    let offset = query.offset()?;

    let data = regions::Entity::find()
        .order_by_asc(regions::Column::IdRegion)
        .offset(offset)
        .limit(query.limit)
        .all(db)
        .await?;
    let total = regions::Entity::find()
        .paginate(db, query.limit as usize)
        .num_items()
        .await? as u64;

    Ok(HttpResponse::Ok().json(Page { data, total }))
}

#[get("/regions/all")]
pub async fn lister_toutes_regions(
    db: Data<DatabaseConnection>,
) -> Result<impl Responder, ApiError> {
    let regions = regions::Entity::find()
        .order_by_asc(regions::Column::NomRegion)
        .all(db.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(regions))
}

#[get("/regions/{id_region}")]
pub async fn obtenir_region(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let region = charger_region(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(region))
}

#[put("/regions/{id_region}")]
pub async fn modifier_region(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<RegionForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let id_region = path.into_inner();
    let db = db.get_ref();
    let nom_region = normalize::upper(&form.nom_region);

    let region = charger_region(db, id_region).await?;

    let collision = regions::Entity::find()
        .filter(regions::Column::NomRegion.eq(nom_region.clone()))
        .filter(regions::Column::IdRegion.ne(id_region))
        .one(db)
        .await?;
    if collision.is_some() {
        return Err(ApiError::validation("Nom de la région déjà utilisé"));
    }

    let mut region: regions::ActiveModel = region.into();
    region.nom_region = Set(nom_region);
    region.updated_at = Set(Utc::now().naive_utc());
    let region = region.update(db).await?;

    Ok(HttpResponse::Ok().json(region))
}

#[delete("/regions/{id_region}")]
pub async fn supprimer_region(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let id_region = path.into_inner();
    let db = db.get_ref();

    let region = charger_region(db, id_region).await?;

    let nombre_departements = departements::Entity::find()
        .filter(departements::Column::IdRegion.eq(id_region))
        .paginate(db, 1)
        .num_items()
        .await?;
    if nombre_departements > 0 {
        log::warn!(
            "Tentative de suppression d'une région avec {} départements",
            nombre_departements
        );
        return Err(ApiError::conflict(format!(
            "Impossible de supprimer la région. Elle contient {} département(s)",
            nombre_departements
        )));
    }

    let nom_region = region.nom_region.clone();
    let region: regions::ActiveModel = region.into();
    region.delete(db).await?;

    log::info!("Région supprimée: {} (ID: {})", nom_region, id_region);
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Région '{}' supprimée avec succès", nom_region)
    })))
}

#[get("/regions/{id_region}/departements")]
pub async fn departements_de_region(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let id_region = path.into_inner();
    let db = db.get_ref();
    charger_region(db, id_region).await?;

    let departements = departements::Entity::find()
        .filter(departements::Column::IdRegion.eq(id_region))
        .order_by_asc(departements::Column::NomDepartement)
        .all(db)
        .await?;
    Ok(HttpResponse::Ok().json(departements))
}

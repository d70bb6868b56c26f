//! CRUD for voting centres.
//!
//! A centre still owning bureaux cannot be deleted; the service refuses with
//! a conflict rather than cascading.

use actix_web::web::Data;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::ApiError;
use crate::normalize;
use crate::orm::{bureau_votes, centre_votes};
use crate::pagination::{Page, PageQuery};
use crate::stats::scope::{charger_centre, charger_commune};

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(creer_centre)
        .service(lister_centres)
        .service(lister_tous_centres)
        .service(obtenir_centre)
        .service(modifier_centre)
        .service(supprimer_centre)
        .service(bureaux_de_centre);
}

#[derive(Debug, Deserialize, Validate)]
pub struct CentreForm {
    #[validate(length(min = 2, max = 150))]
    pub nom_centre: String,
    pub id_commune: i32,
}

#[post("/centres-votes/")]
pub async fn creer_centre(
    db: Data<DatabaseConnection>,
    form: web::Json<CentreForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let db = db.get_ref();
    let nom_centre = normalize::upper(&form.nom_centre);

    charger_commune(db, form.id_commune).await?;

    let existant = centre_votes::Entity::find()
        .filter(centre_votes::Column::NomCentre.eq(nom_centre.clone()))
        .filter(centre_votes::Column::IdCommune.eq(form.id_commune))
        .one(db)
        .await?;
    if existant.is_some() {
        return Err(ApiError::validation(format!(
            "Le centre '{}' existe déjà dans cette commune",
            nom_centre
        )));
    }

    let maintenant = Utc::now().naive_utc();
    let centre = centre_votes::ActiveModel {
        nom_centre: Set(nom_centre),
        id_commune: Set(form.id_commune),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    };
    let centre = centre.insert(db).await?;

    log::info!(
        "Centre créé: {} (ID: {})",
        centre.nom_centre,
        centre.id_centre
    );
    Ok(HttpResponse::Created().json(centre))
}

#[get("/centres-votes/")]
pub async fn lister_centres(
    db: Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    let db = db.get_ref();
    let offset = query.offset()?;

    let data = centre_votes::Entity::find()
        .order_by_asc(centre_votes::Column::IdCentre)
        .offset(offset)
        .limit(query.limit)
        .all(db)
        .await?;
    let total = centre_votes::Entity::find()
        .paginate(db, query.limit as usize)
        .num_items()
        .await? as u64;

    Ok(HttpResponse::Ok().json(Page { data, total }))
}

#[get("/centres-votes/all")]
pub async fn lister_tous_centres(
    db: Data<DatabaseConnection>,
) -> Result<impl Responder, ApiError> {
    let centres = centre_votes::Entity::find()
        .order_by_asc(centre_votes::Column::IdCentre)
        .all(db.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(centres))
}

#[get("/centres-votes/{id_centre}")]
pub async fn obtenir_centre(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let centre = charger_centre(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(centre))
}

#[put("/centres-votes/{id_centre}")]
pub async fn modifier_centre(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<CentreForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let id_centre = path.into_inner();
    let db = db.get_ref();
    let nom_centre = normalize::upper(&form.nom_centre);

    let centre = charger_centre(db, id_centre).await?;
    charger_commune(db, form.id_commune).await?;

    let collision = centre_votes::Entity::find()
        .filter(centre_votes::Column::NomCentre.eq(nom_centre.clone()))
        .filter(centre_votes::Column::IdCommune.eq(form.id_commune))
        .filter(centre_votes::Column::IdCentre.ne(id_centre))
        .one(db)
        .await?;
    if collision.is_some() {
        return Err(ApiError::validation(
            "Un centre avec ce nom existe déjà dans cette commune",
        ));
    }

    let mut centre: centre_votes::ActiveModel = centre.into();
    centre.nom_centre = Set(nom_centre);
    centre.id_commune = Set(form.id_commune);
    centre.updated_at = Set(Utc::now().naive_utc());
    let centre = centre.update(db).await?;

    Ok(HttpResponse::Ok().json(centre))
}

#[delete("/centres-votes/{id_centre}")]
pub async fn supprimer_centre(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let id_centre = path.into_inner();
    let db = db.get_ref();

    let centre = charger_centre(db, id_centre).await?;

    let nombre_bureaux = bureau_votes::Entity::find()
        .filter(bureau_votes::Column::IdCentre.eq(id_centre))
        .paginate(db, 1)
        .num_items()
        .await?;
    if nombre_bureaux > 0 {
        return Err(ApiError::conflict(format!(
            "Impossible de supprimer le centre. Il contient {} bureau(x)",
            nombre_bureaux
        )));
    }

    let nom_centre = centre.nom_centre.clone();
    let centre: centre_votes::ActiveModel = centre.into();
    centre.delete(db).await?;

    log::info!("Centre supprimé: {} (ID: {})", nom_centre, id_centre);
    Ok(HttpResponse::Ok().json(json!({ "message": "Centre supprimé avec succès" })))
}

#[get("/centres-votes/{id_centre}/bureaux")]
pub async fn bureaux_de_centre(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let id_centre = path.into_inner();
    let db = db.get_ref();
    charger_centre(db, id_centre).await?;

    let bureaux = bureau_votes::Entity::find()
        .filter(bureau_votes::Column::IdCentre.eq(id_centre))
        .order_by_asc(bureau_votes::Column::NumeroBureau)
        .all(db)
        .await?;
    Ok(HttpResponse::Ok().json(bureaux))
}

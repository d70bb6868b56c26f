//! CRUD for polling stations (bureaux de vote).

use actix_web::web::Data;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::ApiError;
use crate::orm::bureau_votes;
use crate::pagination::{Page, PageQuery};
use crate::stats::scope::{charger_bureau, charger_centre};

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(creer_bureau)
        .service(lister_bureaux)
        .service(obtenir_bureau)
        .service(modifier_bureau)
        .service(supprimer_bureau);
}

#[derive(Debug, Deserialize, Validate)]
pub struct BureauForm {
    #[validate(range(min = 1))]
    pub numero_bureau: i32,
    #[validate(length(min = 2, max = 200))]
    pub implantation: String,
    pub id_centre: i32,
}

#[post("/bureaux-votes/")]
pub async fn creer_bureau(
    db: Data<DatabaseConnection>,
    form: web::Json<BureauForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let db = db.get_ref();

    charger_centre(db, form.id_centre).await?;

    let existant = bureau_votes::Entity::find()
        .filter(bureau_votes::Column::NumeroBureau.eq(form.numero_bureau))
        .filter(bureau_votes::Column::IdCentre.eq(form.id_centre))
        .one(db)
        .await?;
    if existant.is_some() {
        return Err(ApiError::validation(format!(
            "Le bureau numéro {} existe déjà dans ce centre",
            form.numero_bureau
        )));
    }

    let maintenant = Utc::now().naive_utc();
    let bureau = bureau_votes::ActiveModel {
        numero_bureau: Set(form.numero_bureau),
        implantation: Set(form.implantation.trim().to_string()),
        id_centre: Set(form.id_centre),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    };
    let bureau = bureau.insert(db).await?;

    log::info!(
        "Bureau créé: numéro {} (ID: {})",
        bureau.numero_bureau,
        bureau.id_bureau
    );
    Ok(HttpResponse::Created().json(bureau))
}

#[get("/bureaux-votes/")]
pub async fn lister_bureaux(
    db: Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    let db = db.get_ref();
    let offset = query.offset()?;

    let data = bureau_votes::Entity::find()
        .order_by_asc(bureau_votes::Column::IdBureau)
        .offset(offset)
        .limit(query.limit)
        .all(db)
        .await?;
    let total = bureau_votes::Entity::find()
        .paginate(db, query.limit as usize)
        .num_items()
        .await? as u64;

    Ok(HttpResponse::Ok().json(Page { data, total }))
}

#[get("/bureaux-votes/{id_bureau}")]
pub async fn obtenir_bureau(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let bureau = charger_bureau(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(bureau))
}

#[put("/bureaux-votes/{id_bureau}")]
pub async fn modifier_bureau(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<BureauForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let id_bureau = path.into_inner();
    let db = db.get_ref();

    let bureau = charger_bureau(db, id_bureau).await?;
    charger_centre(db, form.id_centre).await?;

    let collision = bureau_votes::Entity::find()
        .filter(bureau_votes::Column::NumeroBureau.eq(form.numero_bureau))
        .filter(bureau_votes::Column::IdCentre.eq(form.id_centre))
        .filter(bureau_votes::Column::IdBureau.ne(id_bureau))
        .one(db)
        .await?;
    if collision.is_some() {
        return Err(ApiError::validation(
            "Un bureau avec ce numéro existe déjà dans ce centre",
        ));
    }

    let mut bureau: bureau_votes::ActiveModel = bureau.into();
    bureau.numero_bureau = Set(form.numero_bureau);
    bureau.implantation = Set(form.implantation.trim().to_string());
    bureau.id_centre = Set(form.id_centre);
    bureau.updated_at = Set(Utc::now().naive_utc());
    let bureau = bureau.update(db).await?;

    Ok(HttpResponse::Ok().json(bureau))
}

#[delete("/bureaux-votes/{id_bureau}")]
pub async fn supprimer_bureau(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let id_bureau = path.into_inner();
    let db = db.get_ref();

    let bureau = charger_bureau(db, id_bureau).await?;
    let bureau: bureau_votes::ActiveModel = bureau.into();
    bureau.delete(db).await?;

    log::info!("Bureau supprimé (ID: {})", id_bureau);
    Ok(HttpResponse::Ok().json(json!({ "message": "Bureau supprimé avec succès" })))
}

//! Turnout ledger endpoints: one record per (election, bureau, date), plus
//! the turnout statistics, geographic breakdowns and temporal evolution.

use actix_web::web::Data;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::ApiError;
use crate::orm::participations;
use crate::pagination::{Page, PageQuery};
use crate::resolver;
use crate::stats::evolution::{self, valider_intervalle};
use crate::stats::{participation, Perimetre};
use crate::stats::scope::{
    charger_bureau, charger_centre, charger_commune, charger_departement, charger_election,
    charger_region,
};

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(creer_participation)
        .service(lister_participations)
        .service(modifier_participation)
        .service(supprimer_participation)
        .service(statistiques_nationales)
        .service(statistiques_region)
        .service(statistiques_departement)
        .service(statistiques_commune)
        .service(statistiques_centre)
        .service(statistiques_bureau)
        .service(repartition_regions)
        .service(repartition_departements)
        .service(repartition_communes)
        .service(repartition_centres)
        .service(repartition_bureaux)
        .service(evolution_votants)
        .service(evolution_votants_region)
        .service(evolution_votants_departement)
        .service(evolution_votants_commune)
        .service(evolution_votants_centre);
}

#[derive(Debug, Deserialize, Validate)]
pub struct ParticipationForm {
    pub type_election: String,
    pub commune: String,
    pub centre: String,
    pub bureau: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub nombre_electeur: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub nombre_votant: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub nombre_votant_hors_bureau: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub nombre_bulletin_null: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub nombre_suffrage: i32,
    pub date_election: NaiveDate,
}

#[post("/elections/participations/")]
pub async fn creer_participation(
    db: Data<DatabaseConnection>,
    form: web::Json<ParticipationForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let db = db.get_ref();

    let resolu = resolver::resolve_bureau(
        db,
        &form.type_election,
        &form.commune,
        &form.centre,
        form.bureau,
    )
    .await?;

    let existante = participations::Entity::find()
        .filter(participations::Column::IdElection.eq(resolu.election.id_election))
        .filter(participations::Column::IdBureau.eq(resolu.bureau.id_bureau))
        .filter(participations::Column::DateElection.eq(form.date_election))
        .one(db)
        .await?;
    if existante.is_some() {
        log::warn!(
            "Participation déjà enregistrée pour élection {}, bureau {}, date {}",
            resolu.election.id_election,
            resolu.bureau.id_bureau,
            form.date_election
        );
        return Err(ApiError::conflict(
            "Une participation existe déjà pour cette élection, bureau et date",
        ));
    }

    let participation = participations::ActiveModel {
        id_election: Set(resolu.election.id_election),
        id_bureau: Set(resolu.bureau.id_bureau),
        date_election: Set(form.date_election),
        nombre_electeur: Set(form.nombre_electeur),
        nombre_votant: Set(form.nombre_votant),
        nombre_votant_hors_bureau: Set(form.nombre_votant_hors_bureau),
        nombre_bulletin_null: Set(form.nombre_bulletin_null),
        nombre_suffrage: Set(form.nombre_suffrage),
        created_at: Set(Utc::now().naive_utc()),
    };
    let participation = participation.insert(db).await.map_err(|err| {
        ApiError::insertion(
            err,
            "Une participation existe déjà pour cette élection, bureau et date",
        )
    })?;

    log::info!(
        "Participation créée pour élection {}, bureau {}",
        participation.id_election,
        participation.id_bureau
    );
    Ok(HttpResponse::Created().json(participation))
}

#[get("/elections/participations/")]
pub async fn lister_participations(
    db: Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    let db = db.get_ref();
    let offset = query.offset()?;

    let data = participations::Entity::find()
        .order_by_asc(participations::Column::CreatedAt)
        .offset(offset)
        .limit(query.limit)
        .all(db)
        .await?;
    let total = participations::Entity::find()
        .paginate(db, query.limit as usize)
        .num_items()
        .await? as u64;

    Ok(HttpResponse::Ok().json(Page { data, total }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompteursForm {
    #[validate(range(min = 0))]
    pub nombre_electeur: i32,
    #[validate(range(min = 0))]
    pub nombre_votant: i32,
    #[validate(range(min = 0))]
    pub nombre_votant_hors_bureau: i32,
    #[validate(range(min = 0))]
    pub nombre_bulletin_null: i32,
    #[validate(range(min = 0))]
    pub nombre_suffrage: i32,
}

async fn charger_participation(
    db: &DatabaseConnection,
    id_election: i32,
    id_bureau: i32,
    date_election: NaiveDate,
) -> Result<participations::Model, ApiError> {
    charger_election(db, id_election).await?;
    charger_bureau(db, id_bureau).await?;
    participations::Entity::find()
        .filter(participations::Column::IdElection.eq(id_election))
        .filter(participations::Column::IdBureau.eq(id_bureau))
        .filter(participations::Column::DateElection.eq(date_election))
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found("Participation introuvable pour cette élection, bureau et date")
        })
}

/// Overwrites the count fields only; the key never changes.
#[put("/elections/participations/{id_election}/{id_bureau}/{date_election}")]
pub async fn modifier_participation(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
    form: web::Json<CompteursForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    let (id_election, id_bureau, date_election) = path.into_inner();
    let db = db.get_ref();

    let participation = charger_participation(db, id_election, id_bureau, date_election).await?;
    let mut participation: participations::ActiveModel = participation.into();
    participation.nombre_electeur = Set(form.nombre_electeur);
    participation.nombre_votant = Set(form.nombre_votant);
    participation.nombre_votant_hors_bureau = Set(form.nombre_votant_hors_bureau);
    participation.nombre_bulletin_null = Set(form.nombre_bulletin_null);
    participation.nombre_suffrage = Set(form.nombre_suffrage);
    let participation = participation.update(db).await?;

    log::info!(
        "Participation mise à jour pour élection {}, bureau {}",
        id_election,
        id_bureau
    );
    Ok(HttpResponse::Ok().json(participation))
}

#[delete("/elections/participations/{id_election}/{id_bureau}/{date_election}")]
pub async fn supprimer_participation(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_election, id_bureau, date_election) = path.into_inner();
    let db = db.get_ref();

    let participation = charger_participation(db, id_election, id_bureau, date_election).await?;
    let participation: participations::ActiveModel = participation.into();
    participation.delete(db).await?;

    log::info!(
        "Participation supprimée pour élection {}, bureau {}",
        id_election,
        id_bureau
    );
    Ok(HttpResponse::Ok().json(json!({ "message": "Participation supprimée avec succès" })))
}

#[get("/elections/participations/statistiques/national/{id_election}/{date_election}")]
pub async fn statistiques_nationales(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    let stat = participation::statistiques(db, Perimetre::National, id_election, date_election)
        .await?;
    Ok(HttpResponse::Ok().json(stat))
}

#[get("/elections/participations/statistiques/region/{id_region}/{id_election}/{date_election}")]
pub async fn statistiques_region(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_region, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_region(db, id_region).await?;
    let stat =
        participation::statistiques(db, Perimetre::Region(id_region), id_election, date_election)
            .await?;
    Ok(HttpResponse::Ok().json(stat))
}

#[get("/elections/participations/statistiques/departement/{id_departement}/{id_election}/{date_election}")]
pub async fn statistiques_departement(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_departement, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_departement(db, id_departement).await?;
    let stat = participation::statistiques(
        db,
        Perimetre::Departement(id_departement),
        id_election,
        date_election,
    )
    .await?;
    Ok(HttpResponse::Ok().json(stat))
}

#[get("/elections/participations/statistiques/commune/{id_commune}/{id_election}/{date_election}")]
pub async fn statistiques_commune(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_commune, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_commune(db, id_commune).await?;
    let stat = participation::statistiques(
        db,
        Perimetre::Commune(id_commune),
        id_election,
        date_election,
    )
    .await?;
    Ok(HttpResponse::Ok().json(stat))
}

#[get("/elections/participations/statistiques/centre/{id_centre}/{id_election}/{date_election}")]
pub async fn statistiques_centre(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_centre, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_centre(db, id_centre).await?;
    let stat =
        participation::statistiques(db, Perimetre::Centre(id_centre), id_election, date_election)
            .await?;
    Ok(HttpResponse::Ok().json(stat))
}

#[get("/elections/participations/statistiques/bureau/{id_bureau}/{id_election}/{date_election}")]
pub async fn statistiques_bureau(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_bureau, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_bureau(db, id_bureau).await?;
    let stat =
        participation::statistiques(db, Perimetre::Bureau(id_bureau), id_election, date_election)
            .await?;
    Ok(HttpResponse::Ok().json(stat))
}

#[get("/elections/participations/statistiques/repartition-regions/{id_election}/{date_election}")]
pub async fn repartition_regions(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    let carte = participation::repartition_regions(db, id_election, date_election).await?;
    Ok(HttpResponse::Ok().json(carte))
}

#[get("/elections/participations/statistiques/repartition-departements/{id_region}/{id_election}/{date_election}")]
pub async fn repartition_departements(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_region, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_region(db, id_region).await?;
    let carte =
        participation::repartition_departements(db, id_region, id_election, date_election).await?;
    Ok(HttpResponse::Ok().json(carte))
}

#[get("/elections/participations/statistiques/repartition-communes/{id_departement}/{id_election}/{date_election}")]
pub async fn repartition_communes(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_departement, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_departement(db, id_departement).await?;
    let carte =
        participation::repartition_communes(db, id_departement, id_election, date_election)
            .await?;
    Ok(HttpResponse::Ok().json(carte))
}

#[get("/elections/participations/statistiques/repartition-centres/{id_commune}/{id_election}/{date_election}")]
pub async fn repartition_centres(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_commune, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_commune(db, id_commune).await?;
    let carte =
        participation::repartition_centres(db, id_commune, id_election, date_election).await?;
    Ok(HttpResponse::Ok().json(carte))
}

#[get("/elections/participations/statistiques/repartition-bureaux/{id_centre}/{id_election}/{date_election}")]
pub async fn repartition_bureaux(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_centre, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_centre(db, id_centre).await?;
    let carte =
        participation::repartition_bureaux(db, id_centre, id_election, date_election).await?;
    Ok(HttpResponse::Ok().json(carte))
}

fn intervalle_par_defaut() -> i64 {
    15
}

#[derive(Debug, Deserialize)]
pub struct IntervalleQuery {
    #[serde(default = "intervalle_par_defaut")]
    pub interval_minutes: i64,
}

#[get("/elections/participations/statistiques/evolution-votants-temporelle/{id_election}/{date_election}")]
pub async fn evolution_votants(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, NaiveDate)>,
    query: web::Query<IntervalleQuery>,
) -> Result<impl Responder, ApiError> {
    let (id_election, date_election) = path.into_inner();
    let interval_minutes = valider_intervalle(query.interval_minutes)?;
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    let (evolution, total_votants) = evolution::evolution_votants(
        db,
        Perimetre::National,
        id_election,
        date_election,
        interval_minutes,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({
        "id_election": id_election,
        "date_election": date_election,
        "interval_minutes": interval_minutes,
        "total_votants": total_votants,
        "nombre_intervalles": evolution.len(),
        "evolution": evolution,
    })))
}

#[get("/elections/participations/statistiques/evolution-votants-temporelle-region/{id_region}/{id_election}/{date_election}")]
pub async fn evolution_votants_region(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
    query: web::Query<IntervalleQuery>,
) -> Result<impl Responder, ApiError> {
    let (id_region, id_election, date_election) = path.into_inner();
    let interval_minutes = valider_intervalle(query.interval_minutes)?;
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    let region = charger_region(db, id_region).await?;
    let (evolution, total_votants) = evolution::evolution_votants(
        db,
        Perimetre::Region(id_region),
        id_election,
        date_election,
        interval_minutes,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({
        "id_region": id_region,
        "nom_region": region.nom_region,
        "id_election": id_election,
        "date_election": date_election,
        "interval_minutes": interval_minutes,
        "total_votants": total_votants,
        "nombre_intervalles": evolution.len(),
        "evolution": evolution,
    })))
}

#[get("/elections/participations/statistiques/evolution-votants-temporelle-departement/{id_departement}/{id_election}/{date_election}")]
pub async fn evolution_votants_departement(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
    query: web::Query<IntervalleQuery>,
) -> Result<impl Responder, ApiError> {
    let (id_departement, id_election, date_election) = path.into_inner();
    let interval_minutes = valider_intervalle(query.interval_minutes)?;
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    let departement = charger_departement(db, id_departement).await?;
    let (evolution, total_votants) = evolution::evolution_votants(
        db,
        Perimetre::Departement(id_departement),
        id_election,
        date_election,
        interval_minutes,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({
        "id_departement": id_departement,
        "nom_departement": departement.nom_departement,
        "id_election": id_election,
        "date_election": date_election,
        "interval_minutes": interval_minutes,
        "total_votants": total_votants,
        "nombre_intervalles": evolution.len(),
        "evolution": evolution,
    })))
}

#[get("/elections/participations/statistiques/evolution-votants-temporelle-commune/{id_commune}/{id_election}/{date_election}")]
pub async fn evolution_votants_commune(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
    query: web::Query<IntervalleQuery>,
) -> Result<impl Responder, ApiError> {
    let (id_commune, id_election, date_election) = path.into_inner();
    let interval_minutes = valider_intervalle(query.interval_minutes)?;
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    let commune = charger_commune(db, id_commune).await?;
    let (evolution, total_votants) = evolution::evolution_votants(
        db,
        Perimetre::Commune(id_commune),
        id_election,
        date_election,
        interval_minutes,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({
        "id_commune": id_commune,
        "nom_commune": commune.nom_commune,
        "id_election": id_election,
        "date_election": date_election,
        "interval_minutes": interval_minutes,
        "total_votants": total_votants,
        "nombre_intervalles": evolution.len(),
        "evolution": evolution,
    })))
}

#[get("/elections/participations/statistiques/evolution-votants-temporelle-centre/{id_centre}/{id_election}/{date_election}")]
pub async fn evolution_votants_centre(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
    query: web::Query<IntervalleQuery>,
) -> Result<impl Responder, ApiError> {
    let (id_centre, id_election, date_election) = path.into_inner();
    let interval_minutes = valider_intervalle(query.interval_minutes)?;
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    let centre = charger_centre(db, id_centre).await?;
    let (evolution, total_votants) = evolution::evolution_votants(
        db,
        Perimetre::Centre(id_centre),
        id_election,
        date_election,
        interval_minutes,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({
        "id_centre": id_centre,
        "nom_centre": centre.nom_centre,
        "id_election": id_election,
        "date_election": date_election,
        "interval_minutes": interval_minutes,
        "total_votants": total_votants,
        "nombre_intervalles": evolution.len(),
        "evolution": evolution,
    })))
}

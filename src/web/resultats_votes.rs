//! Result ledger endpoints: one vote tally per (election, bureau, candidat,
//! date), the per-candidate statistics families and the per-candidate
//! geographic vote breakdowns.
//!
//! The bulk create is all-or-nothing: a whole tally sheet is either recorded
//! completely or not at all. An unknown candidate or an already-recorded
//! bureau aborts the call and nothing is kept.

use actix_web::web::Data;
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::ApiError;
use crate::orm::resultat_votes;
use crate::pagination::{Page, PageQuery};
use crate::resolver;
use crate::stats::scope::{
    charger_bureau, charger_candidat, charger_centre, charger_commune, charger_departement,
    charger_election, charger_region,
};
use crate::stats::{resultat, Perimetre};

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(creer_resultat)
        .service(creer_resultats_bulk)
        .service(lister_resultats)
        .service(resultats_par_bureau)
        .service(supprimer_resultat)
        .service(statistiques_nationales)
        .service(statistiques_region)
        .service(statistiques_departement)
        .service(statistiques_commune)
        .service(statistiques_centre)
        .service(statistiques_bureau)
        .service(votes_candidat_par_region)
        .service(votes_candidat_par_departement)
        .service(votes_candidat_par_commune)
        .service(votes_candidat_par_centre)
        .service(votes_candidat_par_bureau);
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResultatForm {
    pub type_election: String,
    pub commune: String,
    pub centre: String,
    pub bureau: i32,
    pub nom_candidat: String,
    pub date_election: NaiveDate,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub voix: i32,
}

#[post("/elections/resultats-votes/")]
pub async fn creer_resultat(
    db: Data<DatabaseConnection>,
    form: web::Json<ResultatForm>,
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
    let candidat = resolver::resolve_candidat(db, &form.nom_candidat).await?;

    let existant = resultat_votes::Entity::find()
        .filter(resultat_votes::Column::IdElection.eq(resolu.election.id_election))
        .filter(resultat_votes::Column::IdBureau.eq(resolu.bureau.id_bureau))
        .filter(resultat_votes::Column::IdCandidat.eq(candidat.id_candidat))
        .filter(resultat_votes::Column::DateElection.eq(form.date_election))
        .one(db)
        .await?;
    if existant.is_some() {
        return Err(ApiError::conflict(
            "Un résultat existe déjà pour cette élection, bureau, candidat et date",
        ));
    }

    let resultat = resultat_votes::ActiveModel {
        id_election: Set(resolu.election.id_election),
        id_bureau: Set(resolu.bureau.id_bureau),
        id_candidat: Set(candidat.id_candidat),
        date_election: Set(form.date_election),
        voix: Set(form.voix),
        created_at: Set(Utc::now().naive_utc()),
    };
    let resultat = resultat.insert(db).await.map_err(|err| {
        ApiError::insertion(
            err,
            "Un résultat existe déjà pour cette élection, bureau, candidat et date",
        )
    })?;

    log::info!(
        "Résultat créé pour élection {}, bureau {}, candidat {}",
        resultat.id_election,
        resultat.id_bureau,
        resultat.id_candidat
    );
    Ok(HttpResponse::Created().json(resultat))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResultatItem {
    pub nom_candidat: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub voix: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResultatBulkForm {
    pub type_election: String,
    pub commune: String,
    pub centre: String,
    pub bureau: i32,
    pub date_election: NaiveDate,
    #[validate]
    pub resultats: Vec<ResultatItem>,
}

/// Records a whole bureau tally sheet in one transaction. Any unresolved
/// candidate aborts with 404; any already-recorded key aborts with 409; on
/// success every row is committed together.
#[post("/elections/resultats-votes/bulk")]
pub async fn creer_resultats_bulk(
    db: Data<DatabaseConnection>,
    form: web::Json<ResultatBulkForm>,
) -> Result<impl Responder, ApiError> {
    form.validate()?;
    if form.resultats.is_empty() {
        return Err(ApiError::validation(
            "La liste des résultats ne peut pas être vide",
        ));
    }
    let db = db.get_ref();

    let resolu = resolver::resolve_bureau(
        db,
        &form.type_election,
        &form.commune,
        &form.centre,
        form.bureau,
    )
    .await?;

    let txn = db.begin().await?;
    let mut crees = Vec::with_capacity(form.resultats.len());
    for item in &form.resultats {
        let candidat = resolver::resolve_candidat(db, &item.nom_candidat).await?;

        let existant = resultat_votes::Entity::find()
            .filter(resultat_votes::Column::IdElection.eq(resolu.election.id_election))
            .filter(resultat_votes::Column::IdBureau.eq(resolu.bureau.id_bureau))
            .filter(resultat_votes::Column::IdCandidat.eq(candidat.id_candidat))
            .filter(resultat_votes::Column::DateElection.eq(form.date_election))
            .one(db)
            .await?;
        if existant.is_some() {
            log::warn!(
                "Résultat existant pour le candidat {}, enregistrement en masse abandonné",
                candidat.nom_candidat
            );
            return Err(ApiError::conflict("Le bureau a déjà été enregistré"));
        }

        let resultat = resultat_votes::ActiveModel {
            id_election: Set(resolu.election.id_election),
            id_bureau: Set(resolu.bureau.id_bureau),
            id_candidat: Set(candidat.id_candidat),
            date_election: Set(form.date_election),
            voix: Set(item.voix),
            created_at: Set(Utc::now().naive_utc()),
        };
        // Dropping the transaction on any error path rolls everything back.
        let resultat = resultat
            .insert(&txn)
            .await
            .map_err(|err| ApiError::insertion(err, "Le bureau a déjà été enregistré"))?;
        crees.push(resultat);
    }
    txn.commit().await?;

    log::info!("{} résultats créés en masse", crees.len());
    Ok(HttpResponse::Created().json(crees))
}

#[get("/elections/resultats-votes/")]
pub async fn lister_resultats(
    db: Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    let db = db.get_ref();
    let offset = query.offset()?;

    let data = resultat_votes::Entity::find()
        .order_by_asc(resultat_votes::Column::CreatedAt)
        .offset(offset)
        .limit(query.limit)
        .all(db)
        .await?;
    let total = resultat_votes::Entity::find()
        .paginate(db, query.limit as usize)
        .num_items()
        .await? as u64;

    Ok(HttpResponse::Ok().json(Page { data, total }))
}

#[get("/elections/resultats-votes/bureau/{id_bureau}")]
pub async fn resultats_par_bureau(
    db: Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, ApiError> {
    let id_bureau = path.into_inner();
    let db = db.get_ref();
    charger_bureau(db, id_bureau).await?;

    let resultats = resultat_votes::Entity::find()
        .filter(resultat_votes::Column::IdBureau.eq(id_bureau))
        .order_by_asc(resultat_votes::Column::IdCandidat)
        .all(db)
        .await?;
    Ok(HttpResponse::Ok().json(resultats))
}

#[delete("/elections/resultats-votes/{id_election}/{id_bureau}/{id_candidat}/{date_election}")]
pub async fn supprimer_resultat(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_election, id_bureau, id_candidat, date_election) = path.into_inner();
    let db = db.get_ref();

    let resultat = resultat_votes::Entity::find()
        .filter(resultat_votes::Column::IdElection.eq(id_election))
        .filter(resultat_votes::Column::IdBureau.eq(id_bureau))
        .filter(resultat_votes::Column::IdCandidat.eq(id_candidat))
        .filter(resultat_votes::Column::DateElection.eq(date_election))
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(
                "Résultat introuvable pour cette élection, bureau, candidat et date",
            )
        })?;
    let resultat: resultat_votes::ActiveModel = resultat.into();
    resultat.delete(db).await?;

    log::info!(
        "Résultat supprimé pour élection {}, bureau {}, candidat {}",
        id_election,
        id_bureau,
        id_candidat
    );
    Ok(HttpResponse::Ok().json(json!({ "message": "Résultat supprimé avec succès" })))
}

#[get("/elections/resultats-votes/statistiques/national/{id_election}/{date_election}")]
pub async fn statistiques_nationales(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    let stat =
        resultat::statistiques(db, Perimetre::National, id_election, date_election).await?;
    Ok(HttpResponse::Ok().json(stat))
}

#[get("/elections/resultats-votes/statistiques/region/{id_region}/{id_election}/{date_election}")]
pub async fn statistiques_region(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_region, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_region(db, id_region).await?;
    let stat =
        resultat::statistiques(db, Perimetre::Region(id_region), id_election, date_election)
            .await?;
    Ok(HttpResponse::Ok().json(stat))
}

#[get("/elections/resultats-votes/statistiques/departement/{id_departement}/{id_election}/{date_election}")]
pub async fn statistiques_departement(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_departement, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_departement(db, id_departement).await?;
    let stat = resultat::statistiques(
        db,
        Perimetre::Departement(id_departement),
        id_election,
        date_election,
    )
    .await?;
    Ok(HttpResponse::Ok().json(stat))
}

#[get("/elections/resultats-votes/statistiques/commune/{id_commune}/{id_election}/{date_election}")]
pub async fn statistiques_commune(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_commune, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_commune(db, id_commune).await?;
    let stat =
        resultat::statistiques(db, Perimetre::Commune(id_commune), id_election, date_election)
            .await?;
    Ok(HttpResponse::Ok().json(stat))
}

#[get("/elections/resultats-votes/statistiques/centre/{id_centre}/{id_election}/{date_election}")]
pub async fn statistiques_centre(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_centre, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_centre(db, id_centre).await?;
    let stat =
        resultat::statistiques(db, Perimetre::Centre(id_centre), id_election, date_election)
            .await?;
    Ok(HttpResponse::Ok().json(stat))
}

#[get("/elections/resultats-votes/statistiques/bureau/{id_bureau}/{id_election}/{date_election}")]
pub async fn statistiques_bureau(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_bureau, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_bureau(db, id_bureau).await?;
    let stat =
        resultat::statistiques(db, Perimetre::Bureau(id_bureau), id_election, date_election)
            .await?;
    Ok(HttpResponse::Ok().json(stat))
}

#[get("/elections/resultats-votes/votes-candidat-par-region/{id_candidat}/{id_election}/{date_election}")]
pub async fn votes_candidat_par_region(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_candidat, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_candidat(db, id_candidat).await?;
    let carte =
        resultat::votes_candidat_par_region(db, id_candidat, id_election, date_election).await?;
    Ok(HttpResponse::Ok().json(carte))
}

#[get("/elections/resultats-votes/votes-candidat-par-departement/{id_candidat}/{id_region}/{id_election}/{date_election}")]
pub async fn votes_candidat_par_departement(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_candidat, id_region, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_candidat(db, id_candidat).await?;
    charger_region(db, id_region).await?;
    let carte = resultat::votes_candidat_par_departement(
        db,
        id_candidat,
        id_region,
        id_election,
        date_election,
    )
    .await?;
    Ok(HttpResponse::Ok().json(carte))
}

#[get("/elections/resultats-votes/votes-candidat-par-commune/{id_candidat}/{id_departement}/{id_election}/{date_election}")]
pub async fn votes_candidat_par_commune(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_candidat, id_departement, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_candidat(db, id_candidat).await?;
    charger_departement(db, id_departement).await?;
    let carte = resultat::votes_candidat_par_commune(
        db,
        id_candidat,
        id_departement,
        id_election,
        date_election,
    )
    .await?;
    Ok(HttpResponse::Ok().json(carte))
}

#[get("/elections/resultats-votes/votes-candidat-par-centre/{id_candidat}/{id_commune}/{id_election}/{date_election}")]
pub async fn votes_candidat_par_centre(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_candidat, id_commune, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_candidat(db, id_candidat).await?;
    charger_commune(db, id_commune).await?;
    let carte = resultat::votes_candidat_par_centre(
        db,
        id_candidat,
        id_commune,
        id_election,
        date_election,
    )
    .await?;
    Ok(HttpResponse::Ok().json(carte))
}

#[get("/elections/resultats-votes/votes-candidat-par-bureau/{id_candidat}/{id_centre}/{id_election}/{date_election}")]
pub async fn votes_candidat_par_bureau(
    db: Data<DatabaseConnection>,
    path: web::Path<(i32, i32, i32, NaiveDate)>,
) -> Result<impl Responder, ApiError> {
    let (id_candidat, id_centre, id_election, date_election) = path.into_inner();
    let db = db.get_ref();
    charger_election(db, id_election).await?;
    charger_candidat(db, id_candidat).await?;
    charger_centre(db, id_centre).await?;
    let carte = resultat::votes_candidat_par_bureau(
        db,
        id_candidat,
        id_centre,
        id_election,
        date_election,
    )
    .await?;
    Ok(HttpResponse::Ok().json(carte))
}

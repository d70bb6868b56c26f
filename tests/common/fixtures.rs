//! Test fixtures for creating test data
#![allow(dead_code)]

use chrono::Utc;
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};

use scrutin::orm::{
    bureau_votes, candidats, centre_votes, communes, departements, elections, participations,
    regions,
};

pub async fn create_region(db: &DatabaseConnection, nom: &str) -> Result<regions::Model, DbErr> {
    let maintenant = Utc::now().naive_utc();
    regions::ActiveModel {
        nom_region: Set(nom.to_string()),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_departement(
    db: &DatabaseConnection,
    nom: &str,
    id_region: i32,
) -> Result<departements::Model, DbErr> {
    let maintenant = Utc::now().naive_utc();
    departements::ActiveModel {
        nom_departement: Set(nom.to_string()),
        id_region: Set(id_region),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_commune(
    db: &DatabaseConnection,
    nom: &str,
    id_departement: i32,
) -> Result<communes::Model, DbErr> {
    let maintenant = Utc::now().naive_utc();
    communes::ActiveModel {
        nom_commune: Set(nom.to_string()),
        id_departement: Set(id_departement),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_centre(
    db: &DatabaseConnection,
    nom: &str,
    id_commune: i32,
) -> Result<centre_votes::Model, DbErr> {
    let maintenant = Utc::now().naive_utc();
    centre_votes::ActiveModel {
        nom_centre: Set(nom.to_string()),
        id_commune: Set(id_commune),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_bureau(
    db: &DatabaseConnection,
    numero: i32,
    id_centre: i32,
) -> Result<bureau_votes::Model, DbErr> {
    let maintenant = Utc::now().naive_utc();
    bureau_votes::ActiveModel {
        numero_bureau: Set(numero),
        implantation: Set(format!("Salle {}", numero)),
        id_centre: Set(id_centre),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_election(
    db: &DatabaseConnection,
    type_election: &str,
) -> Result<elections::Model, DbErr> {
    let maintenant = Utc::now().naive_utc();
    elections::ActiveModel {
        type_election: Set(type_election.to_string()),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_candidat(
    db: &DatabaseConnection,
    nom: &str,
) -> Result<candidats::Model, DbErr> {
    let maintenant = Utc::now().naive_utc();
    candidats::ActiveModel {
        nom_candidat: Set(nom.to_string()),
        is_deleted: Set(false),
        created_at: Set(maintenant),
        updated_at: Set(maintenant),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Insert a participation row directly, bypassing the API, with a chosen
/// created_at. Used by the aggregation tests to control temporal buckets.
pub async fn insert_participation(
    db: &DatabaseConnection,
    id_election: i32,
    id_bureau: i32,
    date_election: chrono::NaiveDate,
    electeurs: i32,
    votants: i32,
    suffrages: i32,
    created_at: chrono::NaiveDateTime,
) -> Result<participations::Model, DbErr> {
    participations::ActiveModel {
        id_election: Set(id_election),
        id_bureau: Set(id_bureau),
        date_election: Set(date_election),
        nombre_electeur: Set(electeurs),
        nombre_votant: Set(votants),
        nombre_votant_hors_bureau: Set(0),
        nombre_bulletin_null: Set(votants - suffrages),
        nombre_suffrage: Set(suffrages),
        created_at: Set(created_at),
    }
    .insert(db)
    .await
}

/// Insert a result row directly, bypassing the API.
pub async fn insert_resultat(
    db: &DatabaseConnection,
    id_election: i32,
    id_bureau: i32,
    id_candidat: i32,
    date_election: chrono::NaiveDate,
    voix: i32,
) -> Result<scrutin::orm::resultat_votes::Model, DbErr> {
    scrutin::orm::resultat_votes::ActiveModel {
        id_election: Set(id_election),
        id_bureau: Set(id_bureau),
        id_candidat: Set(id_candidat),
        date_election: Set(date_election),
        voix: Set(voix),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
}

/// A minimal hierarchy: one region, departement and commune, one centre with
/// two bureaux (numbered 1 and 2), one election.
pub struct TestHierarchy {
    pub region: regions::Model,
    pub departement: departements::Model,
    pub commune: communes::Model,
    pub centre: centre_votes::Model,
    pub bureau1: bureau_votes::Model,
    pub bureau2: bureau_votes::Model,
    pub election: elections::Model,
}

pub async fn create_test_hierarchy(db: &DatabaseConnection) -> Result<TestHierarchy, DbErr> {
    let region = create_region(db, "DAKAR").await?;
    let departement = create_departement(db, "RUFISQUE", region.id_region).await?;
    let commune = create_commune(db, "Rufisque", departement.id_departement).await?;
    let centre = create_centre(db, "ECOLE PRIMAIRE CENTRALE", commune.id_commune).await?;
    let bureau1 = create_bureau(db, 1, centre.id_centre).await?;
    let bureau2 = create_bureau(db, 2, centre.id_centre).await?;
    let election = create_election(db, "PRESIDENTIELLE").await?;
    Ok(TestHierarchy {
        region,
        departement,
        commune,
        centre,
        bureau1,
        bureau2,
        election,
    })
}

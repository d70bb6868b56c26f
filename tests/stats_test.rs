//! Integration tests for the aggregation engine: multi-level turnout sums and
//! rates, geographic breakdowns, per-candidate vote maps and the temporal
//! evolution buckets.

mod common;

use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{test, App};
use common::{database::*, fixtures::*};
use serial_test::serial;

const DATE: &str = "2024-03-24";

fn date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2024, 3, 24).unwrap()
}

/// Two regions, each with one departement/commune/centre and one bureau.
struct TwoRegions {
    election: scrutin::orm::elections::Model,
    region1: scrutin::orm::regions::Model,
    region2: scrutin::orm::regions::Model,
    departement1: scrutin::orm::departements::Model,
    bureau1: scrutin::orm::bureau_votes::Model,
    bureau2: scrutin::orm::bureau_votes::Model,
}

async fn create_two_regions(db: &sea_orm::DatabaseConnection) -> TwoRegions {
    let region1 = create_region(db, "DAKAR").await.unwrap();
    let departement1 = create_departement(db, "DAKAR", region1.id_region).await.unwrap();
    let commune1 = create_commune(db, "Dakar", departement1.id_departement).await.unwrap();
    let centre1 = create_centre(db, "ECOLE A", commune1.id_commune).await.unwrap();
    let bureau1 = create_bureau(db, 1, centre1.id_centre).await.unwrap();

    let region2 = create_region(db, "THIES").await.unwrap();
    let departement2 = create_departement(db, "THIES", region2.id_region).await.unwrap();
    let commune2 = create_commune(db, "Thies", departement2.id_departement).await.unwrap();
    let centre2 = create_centre(db, "LYCEE B", commune2.id_commune).await.unwrap();
    let bureau2 = create_bureau(db, 1, centre2.id_centre).await.unwrap();

    let election = create_election(db, "PRESIDENTIELLE").await.unwrap();
    TwoRegions {
        election,
        region1,
        region2,
        departement1,
        bureau1,
        bureau2,
    }
}

#[actix_rt::test]
#[serial]
async fn test_turnout_sums_and_rates_per_level() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let deux = create_two_regions(&db).await;
    let base = date().and_hms_opt(9, 0, 0).unwrap();
    insert_participation(&db, deux.election.id_election, deux.bureau1.id_bureau, date(), 100, 50, 45, base)
        .await
        .unwrap();
    insert_participation(&db, deux.election.id_election, deux.bureau2.id_bureau, date(), 200, 150, 140, base)
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(scrutin::web::configure),
    )
    .await;

    // National: 200 voters out of 300 electors.
    let uri = format!(
        "/elections/participations/statistiques/national/{}/{}",
        deux.election.id_election, DATE
    );
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total_electeurs"].as_i64().unwrap(), 300);
    assert_eq!(body["total_votants"].as_i64().unwrap(), 200);
    assert_eq!(body["taux_participation"].as_f64().unwrap(), 66.67);
    assert_eq!(body["taux_suffrages_valides"].as_f64().unwrap(), 92.5);

    // Scoped to region 1 only its bureau counts.
    let uri = format!(
        "/elections/participations/statistiques/region/{}/{}/{}",
        deux.region1.id_region, deux.election.id_election, DATE
    );
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total_electeurs"].as_i64().unwrap(), 100);
    assert_eq!(body["taux_participation"].as_f64().unwrap(), 50.0);

    // Unknown election is a 404, not an empty aggregate.
    let uri = format!("/elections/participations/statistiques/national/9999/{}", DATE);
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_valid_scope_without_rows_is_zeroed() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let deux = create_two_regions(&db).await;
    // No participation rows at all.

    let app = test::init_service(
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(scrutin::web::configure),
    )
    .await;

    let uri = format!(
        "/elections/participations/statistiques/region/{}/{}/{}",
        deux.region2.id_region, deux.election.id_election, DATE
    );
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total_electeurs"].as_i64().unwrap(), 0);
    assert_eq!(body["taux_participation"].as_f64().unwrap(), 0.0);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_repartition_omits_children_without_rows() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let deux = create_two_regions(&db).await;
    let base = date().and_hms_opt(9, 0, 0).unwrap();
    insert_participation(&db, deux.election.id_election, deux.bureau1.id_bureau, date(), 100, 50, 45, base)
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(scrutin::web::configure),
    )
    .await;

    // Only DAKAR has rows; THIES must be absent, not zero-valued.
    let uri = format!(
        "/elections/participations/statistiques/repartition-regions/{}/{}",
        deux.election.id_election, DATE
    );
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let carte = body.as_object().unwrap();
    assert_eq!(carte.len(), 1);
    assert_eq!(carte["DAKAR"]["total_votants"].as_i64().unwrap(), 50);

    // Breakdown of region 1 by departement, keyed by departement name.
    let uri = format!(
        "/elections/participations/statistiques/repartition-departements/{}/{}/{}",
        deux.region1.id_region, deux.election.id_election, DATE
    );
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let carte = body.as_object().unwrap();
    assert_eq!(carte.len(), 1);
    assert!(carte.contains_key(&deux.departement1.nom_departement));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_votes_candidat_par_region_map() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let deux = create_two_regions(&db).await;
    let candidat = create_candidat(&db, "JEAN DUPONT").await.unwrap();
    insert_resultat(
        &db,
        deux.election.id_election,
        deux.bureau1.id_bureau,
        candidat.id_candidat,
        date(),
        15000,
    )
    .await
    .unwrap();
    insert_resultat(
        &db,
        deux.election.id_election,
        deux.bureau2.id_bureau,
        candidat.id_candidat,
        date(),
        8500,
    )
    .await
    .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(scrutin::web::configure),
    )
    .await;

    let uri = format!(
        "/elections/resultats-votes/votes-candidat-par-region/{}/{}/{}",
        candidat.id_candidat, deux.election.id_election, DATE
    );
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["DAKAR"].as_i64().unwrap(), 15000);
    assert_eq!(body["THIES"].as_i64().unwrap(), 8500);

    // Unknown candidate: 404.
    let uri = format!(
        "/elections/resultats-votes/votes-candidat-par-region/9999/{}/{}",
        deux.election.id_election, DATE
    );
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_evolution_buckets_and_cumulative_sum() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let hierarchy = create_test_hierarchy(&db)
        .await
        .expect("Failed to create hierarchy");
    let bureau3 = create_bureau(&db, 3, hierarchy.centre.id_centre).await.unwrap();

    // 08:03 and 08:09 fall in the 08:00 bucket, 08:22 in the 08:15 bucket.
    for (bureau, minute, votants) in [
        (hierarchy.bureau1.id_bureau, 3, 120),
        (hierarchy.bureau2.id_bureau, 9, 80),
        (bureau3.id_bureau, 22, 50),
    ] {
        insert_participation(
            &db,
            hierarchy.election.id_election,
            bureau,
            date(),
            1000,
            votants,
            votants,
            date().and_hms_opt(8, minute, 0).unwrap(),
        )
        .await
        .unwrap();
    }

    let app = test::init_service(
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(scrutin::web::configure),
    )
    .await;

    let uri = format!(
        "/elections/participations/statistiques/evolution-votants-temporelle/{}/{}?interval_minutes=15",
        hierarchy.election.id_election, DATE
    );
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["interval_minutes"].as_i64().unwrap(), 15);
    assert_eq!(body["total_votants"].as_i64().unwrap(), 250);
    assert_eq!(body["nombre_intervalles"].as_i64().unwrap(), 2);
    let evolution = body["evolution"].as_array().unwrap();
    assert_eq!(evolution[0]["nouveaux_votants"].as_i64().unwrap(), 200);
    assert_eq!(evolution[0]["cumul_votants"].as_i64().unwrap(), 200);
    assert_eq!(evolution[1]["nouveaux_votants"].as_i64().unwrap(), 50);
    assert_eq!(evolution[1]["cumul_votants"].as_i64().unwrap(), 250);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_evolution_invalid_interval_rejected() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let hierarchy = create_test_hierarchy(&db)
        .await
        .expect("Failed to create hierarchy");

    let app = test::init_service(
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(scrutin::web::configure),
    )
    .await;

    let uri = format!(
        "/elections/participations/statistiques/evolution-votants-temporelle/{}/{}?interval_minutes=45",
        hierarchy.election.id_election, DATE
    );
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("Intervalle non valide"));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

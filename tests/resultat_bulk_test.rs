//! Integration tests for the result ledger, in particular the all-or-nothing
//! guarantee of the bulk tally-sheet endpoint.

mod common;

use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{test, App};
use common::{database::*, fixtures::*};
use sea_orm::{entity::*, query::*};
use serde_json::json;
use serial_test::serial;

use scrutin::orm::resultat_votes;

fn bulk_body(resultats: serde_json::Value) -> serde_json::Value {
    json!({
        "type_election": "PRESIDENTIELLE",
        "commune": "Rufisque",
        "centre": "ECOLE PRIMAIRE",
        "bureau": 1,
        "date_election": "2024-03-24",
        "resultats": resultats
    })
}

async fn count_rows(db: &sea_orm::DatabaseConnection, id_bureau: i32) -> usize {
    resultat_votes::Entity::find()
        .filter(resultat_votes::Column::IdBureau.eq(id_bureau))
        .all(db)
        .await
        .expect("Failed to fetch resultats")
        .len()
}

#[actix_rt::test]
#[serial]
async fn test_bulk_unknown_candidate_rolls_back_everything() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let hierarchy = create_test_hierarchy(&db)
        .await
        .expect("Failed to create hierarchy");
    create_candidat(&db, "JEAN DUPONT").await.unwrap();
    create_candidat(&db, "MARIE MARTIN").await.unwrap();

    let app = test::init_service(
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(scrutin::web::configure),
    )
    .await;

    // Item 2 of 3 references an unknown candidate; nothing may be kept.
    let req = test::TestRequest::post()
        .uri("/elections/resultats-votes/bulk")
        .set_json(bulk_body(json!([
            { "nom_candidat": "JEAN DUPONT", "voix": 500 },
            { "nom_candidat": "CANDIDAT FANTOME", "voix": 10 },
            { "nom_candidat": "MARIE MARTIN", "voix": 350 }
        ])))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert_eq!(count_rows(&db, hierarchy.bureau1.id_bureau).await, 0);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_bulk_duplicate_key_aborts_whole_call() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let hierarchy = create_test_hierarchy(&db)
        .await
        .expect("Failed to create hierarchy");
    create_candidat(&db, "JEAN DUPONT").await.unwrap();
    let marie = create_candidat(&db, "MARIE MARTIN").await.unwrap();

    // MARIE MARTIN is already recorded for this bureau and date.
    insert_resultat(
        &db,
        hierarchy.election.id_election,
        hierarchy.bureau1.id_bureau,
        marie.id_candidat,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 24).unwrap(),
        100,
    )
    .await
    .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(scrutin::web::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/elections/resultats-votes/bulk")
        .set_json(bulk_body(json!([
            { "nom_candidat": "JEAN DUPONT", "voix": 500 },
            { "nom_candidat": "MARIE MARTIN", "voix": 350 }
        ])))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("déjà été enregistré"));

    // Only the pre-existing row remains; JEAN DUPONT was rolled back.
    assert_eq!(count_rows(&db, hierarchy.bureau1.id_bureau).await, 1);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_bulk_success_then_candidate_percentages() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let hierarchy = create_test_hierarchy(&db)
        .await
        .expect("Failed to create hierarchy");
    create_candidat(&db, "JEAN DUPONT").await.unwrap();
    create_candidat(&db, "MARIE MARTIN").await.unwrap();

    let app = test::init_service(
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(scrutin::web::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/elections/resultats-votes/bulk")
        .set_json(bulk_body(json!([
            { "nom_candidat": "JEAN DUPONT", "voix": 500 },
            { "nom_candidat": "MARIE MARTIN", "voix": 350 }
        ])))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let uri = format!(
        "/elections/resultats-votes/statistiques/bureau/{}/{}/2024-03-24",
        hierarchy.bureau1.id_bureau, hierarchy.election.id_election
    );
    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total_voix_global"].as_i64().unwrap(), 850);
    let candidats = body["resultats_candidats"].as_array().unwrap();
    assert_eq!(candidats.len(), 2);
    // Most votes first.
    assert_eq!(candidats[0]["nom_candidat"].as_str().unwrap(), "JEAN DUPONT");
    assert_eq!(candidats[0]["pourcentage"].as_f64().unwrap(), 58.82);
    assert_eq!(candidats[1]["pourcentage"].as_f64().unwrap(), 41.18);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_delete_resultat_by_key() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let hierarchy = create_test_hierarchy(&db)
        .await
        .expect("Failed to create hierarchy");
    let candidat = create_candidat(&db, "JEAN DUPONT").await.unwrap();
    insert_resultat(
        &db,
        hierarchy.election.id_election,
        hierarchy.bureau1.id_bureau,
        candidat.id_candidat,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 24).unwrap(),
        500,
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
        "/elections/resultats-votes/{}/{}/{}/2024-03-24",
        hierarchy.election.id_election, hierarchy.bureau1.id_bureau, candidat.id_candidat
    );
    let req = test::TestRequest::delete().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

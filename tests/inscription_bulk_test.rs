//! Integration tests for candidate registration, in particular the
//! best-effort semantics of the bulk endpoint: unknown candidates and
//! existing registrations are skipped, and only an entirely fruitless batch
//! fails.

mod common;

use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{test, App};
use common::{database::*, fixtures::*};
use sea_orm::{entity::*, query::*};
use serde_json::json;
use serial_test::serial;

use scrutin::orm::inscription_elections;

#[actix_rt::test]
#[serial]
async fn test_bulk_inscription_partial_success() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let election = create_election(&db, "PRESIDENTIELLE").await.unwrap();
    let deja_inscrit = create_candidat(&db, "JEAN DUPONT").await.unwrap();
    let nouveau = create_candidat(&db, "MARIE MARTIN").await.unwrap();
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 24).unwrap();

    inscription_elections::ActiveModel {
        id_election: Set(election.id_election),
        id_candidat: Set(deja_inscrit.id_candidat),
        date_election: Set(date),
        created_at: Set(chrono::Utc::now().naive_utc()),
    }
    .insert(&db)
    .await
    .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(scrutin::web::configure),
    )
    .await;

    // One already registered, one unknown id, one fresh: exactly one created.
    let req = test::TestRequest::post()
        .uri("/elections/inscriptions-elections/bulk")
        .set_json(json!({
            "id_election": election.id_election,
            "date_election": "2024-03-24",
            "candidats": [
                { "id_candidat": deja_inscrit.id_candidat },
                { "id_candidat": 9999 },
                { "id_candidat": nouveau.id_candidat }
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let creees = body.as_array().unwrap();
    assert_eq!(creees.len(), 1);
    assert_eq!(
        creees[0]["id_candidat"].as_i64().unwrap(),
        nouveau.id_candidat as i64
    );

    let total = inscription_elections::Entity::find()
        .all(&db)
        .await
        .unwrap()
        .len();
    assert_eq!(total, 2);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_bulk_inscription_nothing_created_fails() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let election = create_election(&db, "PRESIDENTIELLE").await.unwrap();
    let deja_inscrit = create_candidat(&db, "JEAN DUPONT").await.unwrap();
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 24).unwrap();

    inscription_elections::ActiveModel {
        id_election: Set(election.id_election),
        id_candidat: Set(deja_inscrit.id_candidat),
        date_election: Set(date),
        created_at: Set(chrono::Utc::now().naive_utc()),
    }
    .insert(&db)
    .await
    .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(scrutin::web::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/elections/inscriptions-elections/bulk")
        .set_json(json!({
            "id_election": election.id_election,
            "date_election": "2024-03-24",
            "candidats": [
                { "id_candidat": deja_inscrit.id_candidat },
                { "id_candidat": 9999 }
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Aucune inscription"));

    let total = inscription_elections::Entity::find()
        .all(&db)
        .await
        .unwrap()
        .len();
    assert_eq!(total, 1);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_single_inscription_and_duplicate() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let election = create_election(&db, "PRESIDENTIELLE").await.unwrap();
    create_candidat(&db, "JEAN DUPONT").await.unwrap();

    let app = test::init_service(
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(scrutin::web::configure),
    )
    .await;

    let body = json!({
        "id_election": election.id_election,
        "nom_candidat": "Jean Dupont",
        "date_election": "2024-03-24"
    });
    let req = test::TestRequest::post()
        .uri("/elections/inscriptions-elections/")
        .set_json(body.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Same candidate, election and date: refused. The name lookup is
    // case-insensitive, so the lowercase spelling hits the same row.
    let req = test::TestRequest::post()
        .uri("/elections/inscriptions-elections/")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // A second round on another date is a distinct registration.
    let req = test::TestRequest::post()
        .uri("/elections/inscriptions-elections/")
        .set_json(json!({
            "id_election": election.id_election,
            "nom_candidat": "JEAN DUPONT",
            "date_election": "2024-04-07"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_delete_inscription_by_candidate_name() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let election = create_election(&db, "PRESIDENTIELLE").await.unwrap();
    let candidat = create_candidat(&db, "JEAN DUPONT").await.unwrap();
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 24).unwrap();
    inscription_elections::ActiveModel {
        id_election: Set(election.id_election),
        id_candidat: Set(candidat.id_candidat),
        date_election: Set(date),
        created_at: Set(chrono::Utc::now().naive_utc()),
    }
    .insert(&db)
    .await
    .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(scrutin::web::configure),
    )
    .await;

    let uri = format!(
        "/elections/inscriptions-elections/{}/JEAN%20DUPONT/2024-03-24",
        election.id_election
    );
    let req = test::TestRequest::delete().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

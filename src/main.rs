use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;

use scrutin::config::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::new().default_filter_or("info"));

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    });
    if config.database_url.is_empty() {
        panic!("SCRUTIN_DATABASE_URL must be set.");
    }

    let db = scrutin::db::connect(&config)
        .await
        .expect("Failed to connect to the database");
    log::info!(
        "Listening on {}:{}",
        config.bind_address,
        config.port
    );

    let bind = (config.bind_address.clone(), config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(db.clone()))
            .wrap(Logger::default())
            .configure(scrutin::web::configure)
    })
    .bind(bind)?
    .run()
    .await
}

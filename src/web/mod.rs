pub mod bureaux;
pub mod candidats;
pub mod centres;
pub mod communes;
pub mod departements;
pub mod elections;
pub mod inscriptions;
pub mod participations;
pub mod regions;
pub mod resultats_votes;

/// Configures the web app by adding services from each web file.
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    bureaux::configure(conf);
    candidats::configure(conf);
    centres::configure(conf);
    communes::configure(conf);
    departements::configure(conf);
    elections::configure(conf);
    inscriptions::configure(conf);
    participations::configure(conf);
    regions::configure(conf);
    resultats_votes::configure(conf);
}

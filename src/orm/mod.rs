pub mod bureau_votes;
pub mod candidats;
pub mod centre_votes;
pub mod communes;
pub mod departements;
pub mod elections;
pub mod inscription_elections;
pub mod participations;
pub mod regions;
pub mod resultat_votes;

//! Read-only statistics aggregation over the turnout and result ledgers.
//!
//! Every computation here operates on a snapshot of ledger rows joined
//! through the geographic hierarchy; nothing is persisted. Scope validation
//! (does the election / region / … exist) happens before any aggregate query
//! so that an unknown entity is a 404 while a valid scope with no rows is a
//! zeroed result.

pub mod evolution;
pub mod participation;
pub mod resultat;
pub mod scope;

pub use scope::Perimetre;

/// Round to two decimals, the precision of every rate and percentage.
pub(crate) fn round2(valeur: f64) -> f64 {
    (valeur * 100.0).round() / 100.0
}

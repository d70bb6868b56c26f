//! Time-bucketed cumulative evolution of voter turnout.
//!
//! Participation rows are bucketed by `created_at` into fixed-width windows
//! aligned to the hour: bucket start = hour floor +
//! floor(seconds-since-hour / interval) × interval. Only populated buckets
//! are emitted, in chronological order, each carrying the new and cumulative
//! voter counts.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime, Timelike};
use sea_orm::{entity::*, query::*, DatabaseConnection, FromQueryResult};
use serde::Serialize;

use crate::error::ApiError;
use crate::orm::participations;
use crate::stats::scope::{filtrer_participations, Perimetre};

/// Allowed bucket widths, in minutes.
pub const INTERVALLES_VALIDES: [i64; 4] = [15, 30, 60, 120];

/// Reject any interval outside the four allowed widths, before querying.
pub fn valider_intervalle(interval_minutes: i64) -> Result<i64, ApiError> {
    if INTERVALLES_VALIDES.contains(&interval_minutes) {
        Ok(interval_minutes)
    } else {
        Err(ApiError::validation(
            "Intervalle non valide. Choisissez parmi: 15, 30, 60, 120 minutes.",
        ))
    }
}

/// Start of the bucket owning `instant` for the given width.
pub fn debut_tranche(instant: NaiveDateTime, interval_minutes: i64) -> NaiveDateTime {
    let secondes_depuis_heure =
        i64::from(instant.minute()) * 60 + i64::from(instant.second());
    let pas = interval_minutes * 60;
    let decalage = secondes_depuis_heure % pas;
    instant
        - Duration::seconds(decalage)
        - Duration::nanoseconds(i64::from(instant.nanosecond()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrancheVotants {
    pub intervalle: NaiveDateTime,
    pub nouveaux_votants: i64,
    pub cumul_votants: i64,
}

/// Group (created_at, voters) pairs into buckets and accumulate the running
/// total. Empty buckets are omitted.
pub fn construire_evolution(
    lignes: impl IntoIterator<Item = (NaiveDateTime, i64)>,
    interval_minutes: i64,
) -> Vec<TrancheVotants> {
    let mut par_tranche: BTreeMap<NaiveDateTime, i64> = BTreeMap::new();
    for (created_at, votants) in lignes {
        *par_tranche
            .entry(debut_tranche(created_at, interval_minutes))
            .or_insert(0) += votants;
    }

    let mut cumul = 0;
    par_tranche
        .into_iter()
        .map(|(intervalle, nouveaux_votants)| {
            cumul += nouveaux_votants;
            TrancheVotants {
                intervalle,
                nouveaux_votants,
                cumul_votants: cumul,
            }
        })
        .collect()
}

#[derive(Debug, FromQueryResult)]
struct LigneVotant {
    created_at: NaiveDateTime,
    nombre_votant: i32,
}

/// Fetch the (created_at, voters) snapshot for the perimeter and bucket it.
/// Returns the buckets plus the overall voter total. The interval is
/// validated before any query runs.
pub async fn evolution_votants(
    db: &DatabaseConnection,
    perimetre: Perimetre,
    id_election: i32,
    date_election: chrono::NaiveDate,
    interval_minutes: i64,
) -> Result<(Vec<TrancheVotants>, i64), ApiError> {
    let interval_minutes = valider_intervalle(interval_minutes)?;
    let lignes = filtrer_participations(perimetre)
        .select_only()
        .column(participations::Column::CreatedAt)
        .column(participations::Column::NombreVotant)
        .filter(participations::Column::IdElection.eq(id_election))
        .filter(participations::Column::DateElection.eq(date_election))
        .into_model::<LigneVotant>()
        .all(db)
        .await?;
    let evolution = construire_evolution(
        lignes
            .into_iter()
            .map(|l| (l.created_at, i64::from(l.nombre_votant))),
        interval_minutes,
    );
    let total_votants = evolution.last().map(|t| t.cumul_votants).unwrap_or(0);
    Ok((evolution, total_votants))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn a(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 24)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn intervalle_invalide_rejete() {
        assert!(valider_intervalle(45).is_err());
        assert!(valider_intervalle(0).is_err());
        for valide in INTERVALLES_VALIDES {
            assert_eq!(valider_intervalle(valide).unwrap(), valide);
        }
    }

    #[test]
    fn tranche_alignee_sur_l_heure() {
        assert_eq!(debut_tranche(a(8, 3, 12), 15), a(8, 0, 0));
        assert_eq!(debut_tranche(a(8, 22, 59), 15), a(8, 15, 0));
        assert_eq!(debut_tranche(a(8, 59, 59), 30), a(8, 30, 0));
        assert_eq!(debut_tranche(a(8, 59, 59), 60), a(8, 0, 0));
        // Widths above an hour still floor to each row's own hour.
        assert_eq!(debut_tranche(a(9, 30, 0), 120), a(9, 0, 0));
    }

    #[test]
    fn cumul_sur_tranches_consecutives() {
        let lignes = vec![
            (a(8, 3, 0), 120),
            (a(8, 9, 0), 80),
            (a(8, 22, 0), 50),
        ];
        let evolution = construire_evolution(lignes, 15);
        assert_eq!(evolution.len(), 2);
        assert_eq!(evolution[0].intervalle, a(8, 0, 0));
        assert_eq!(evolution[0].nouveaux_votants, 200);
        assert_eq!(evolution[0].cumul_votants, 200);
        assert_eq!(evolution[1].intervalle, a(8, 15, 0));
        assert_eq!(evolution[1].nouveaux_votants, 50);
        assert_eq!(evolution[1].cumul_votants, 250);
    }

    #[test]
    fn tranches_vides_omises() {
        let lignes = vec![(a(8, 0, 0), 10), (a(11, 50, 0), 5)];
        let evolution = construire_evolution(lignes, 30);
        assert_eq!(evolution.len(), 2);
        assert_eq!(evolution[1].intervalle, a(11, 30, 0));
        assert_eq!(evolution[1].cumul_votants, 15);
    }

    #[test]
    fn aucune_ligne_aucune_tranche() {
        assert!(construire_evolution(Vec::new(), 15).is_empty());
    }
}

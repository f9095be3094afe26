use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::leave_type::LeaveType;

/// Ledger actions. Rows are append-only; the current reservation state of a
/// request is derived by folding its rows, never by rewriting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
pub enum LedgerAction {
    #[strum(serialize = "HOLD")]
    #[serde(rename = "HOLD")]
    Hold,
    #[strum(serialize = "RELEASE")]
    #[serde(rename = "RELEASE")]
    Release,
    #[strum(serialize = "COMMIT")]
    #[serde(rename = "COMMIT")]
    Commit,
}

/// One ledger row. Quantities are business days and may be fractional.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LedgerEntry {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub qty: f64,
    pub action: LedgerAction,
    pub request_id: u64,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Whether a ledger operation wrote a row or found nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum LedgerOutcome {
    Applied,
    Noop,
}

impl LedgerOutcome {
    pub fn mutated(&self) -> bool {
        matches!(self, LedgerOutcome::Applied)
    }
}

/// Live reservation state of a single request, folded from its ledger rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reservation {
    None,
    Held(f64),
    Committed(f64),
    Released,
}

impl Reservation {
    /// Advance the state by one ledger row. HOLD opens a reservation,
    /// COMMIT finalizes it, RELEASE closes it out from either state.
    pub fn apply(self, action: LedgerAction, qty: f64) -> Reservation {
        match action {
            LedgerAction::Hold => Reservation::Held(qty),
            LedgerAction::Commit => Reservation::Committed(qty),
            LedgerAction::Release => Reservation::Released,
        }
    }

    /// Fold entries (in insertion order) into the live state.
    pub fn fold<'a, I: IntoIterator<Item = &'a LedgerEntry>>(entries: I) -> Reservation {
        entries
            .into_iter()
            .fold(Reservation::None, |state, e| state.apply(e.action, e.qty))
    }

    /// RELEASE applies only while something is live.
    pub fn can_release(&self) -> bool {
        matches!(self, Reservation::Held(_) | Reservation::Committed(_))
    }

    /// COMMIT is a no-op once the reservation is already committed.
    pub fn needs_commit(&self) -> bool {
        !matches!(self, Reservation::Committed(_))
    }
}

/// Aggregated live amounts for one employee + leave type.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LedgerTotals {
    pub held: f64,
    pub committed: f64,
}

/// Sum live per-request reservations. Entries must all belong to one
/// employee + leave type and be ordered by insertion.
pub fn totals_from_entries(entries: &[LedgerEntry]) -> LedgerTotals {
    let mut by_request: BTreeMap<u64, Reservation> = BTreeMap::new();
    for e in entries {
        let state = by_request.entry(e.request_id).or_insert(Reservation::None);
        *state = state.apply(e.action, e.qty);
    }

    let mut totals = LedgerTotals::default();
    for state in by_request.values() {
        match state {
            Reservation::Held(qty) => totals.held += qty,
            Reservation::Committed(qty) => totals.committed += qty,
            Reservation::None | Reservation::Released => {}
        }
    }
    totals.held = totals.held.max(0.0);
    totals
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;

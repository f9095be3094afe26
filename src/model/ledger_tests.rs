use super::*;
use chrono::Utc;

fn entry(request_id: u64, action: LedgerAction, qty: f64) -> LedgerEntry {
    LedgerEntry {
        id: 0,
        employee_id: 12199,
        leave_type: LeaveType::Casual,
        qty,
        action,
        request_id,
        created_at: Utc::now(),
    }
}

#[test]
fn hold_opens_a_reservation() {
    let state = Reservation::None.apply(LedgerAction::Hold, 3.0);
    assert_eq!(state, Reservation::Held(3.0));
    assert!(state.can_release());
    assert!(state.needs_commit());
}

#[test]
fn commit_finalizes_and_release_closes() {
    let committed = Reservation::Held(2.0).apply(LedgerAction::Commit, 2.0);
    assert_eq!(committed, Reservation::Committed(2.0));
    assert!(!committed.needs_commit());
    assert!(committed.can_release());

    let released = committed.apply(LedgerAction::Release, 2.0);
    assert_eq!(released, Reservation::Released);
    assert!(!released.can_release());
}

#[test]
fn fold_follows_insertion_order() {
    let entries = vec![
        entry(1, LedgerAction::Hold, 3.0),
        entry(1, LedgerAction::Release, 3.0),
        entry(1, LedgerAction::Commit, 3.0),
    ];
    assert_eq!(Reservation::fold(&entries), Reservation::Committed(3.0));
}

#[test]
fn empty_fold_is_none() {
    assert_eq!(Reservation::fold(&[]), Reservation::None);
    assert!(!Reservation::None.can_release());
    assert!(Reservation::None.needs_commit());
}

#[test]
fn totals_sum_live_states_per_request() {
    let entries = vec![
        // request 1: held 3
        entry(1, LedgerAction::Hold, 3.0),
        // request 2: held then committed 2
        entry(2, LedgerAction::Hold, 2.0),
        entry(2, LedgerAction::Commit, 2.0),
        // request 3: held then released, contributes nothing
        entry(3, LedgerAction::Hold, 5.0),
        entry(3, LedgerAction::Release, 5.0),
    ];
    let totals = totals_from_entries(&entries);
    assert_eq!(totals.held, 3.0);
    assert_eq!(totals.committed, 2.0);
}

#[test]
fn release_after_commit_zeroes_the_request() {
    let entries = vec![
        entry(7, LedgerAction::Hold, 4.0),
        entry(7, LedgerAction::Commit, 4.0),
        entry(7, LedgerAction::Release, 4.0),
    ];
    assert_eq!(totals_from_entries(&entries), LedgerTotals::default());
}

#[test]
fn fractional_quantities_survive_the_fold() {
    let entries = vec![
        entry(1, LedgerAction::Hold, 0.5),
        entry(2, LedgerAction::Hold, 1.5),
        entry(2, LedgerAction::Commit, 1.5),
    ];
    let totals = totals_from_entries(&entries);
    assert_eq!(totals.held, 0.5);
    assert_eq!(totals.committed, 1.5);
}

#[test]
fn outcome_mutated_flag() {
    assert!(LedgerOutcome::Applied.mutated());
    assert!(!LedgerOutcome::Noop.mutated());
}

#[test]
fn action_wire_names_are_uppercase() {
    assert_eq!(LedgerAction::Hold.to_string(), "HOLD");
    assert_eq!(LedgerAction::Release.to_string(), "RELEASE");
    assert_eq!(LedgerAction::Commit.to_string(), "COMMIT");
    assert_eq!("COMMIT".parse::<LedgerAction>().unwrap(), LedgerAction::Commit);
}

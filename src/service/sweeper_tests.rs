use super::*;
use crate::error::AppError;
use crate::model::leave_request::{LeaveStatus, RemarkAction};
use crate::model::leave_type::LeaveType;
use crate::model::ledger::{LedgerEntry, LedgerOutcome, LedgerTotals, Reservation};
use crate::store::memory::MemoryStore;
use crate::store::{NewLeaveRequest, RemarkDraft};
use async_trait::async_trait;
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

async fn seed_pending(store: &MemoryStore, employee_id: u64, from: NaiveDate) -> u64 {
    store
        .create_request(NewLeaveRequest {
            employee_id,
            leave_type: LeaveType::Casual,
            from_date: from,
            to_date: from + chrono::Duration::days(2),
            reason: "trip".to_string(),
            l1_id: 500,
            l2_id: Some(600),
            applied_date: from - chrono::Duration::days(10),
            hold_qty: 3.0,
            remark: RemarkDraft {
                actor_id: employee_id,
                actor_name: "Emp".to_string(),
                action: RemarkAction::Submitted,
                text: "trip".to_string(),
            },
        })
        .await
        .unwrap()
        .id
}

#[actix_web::test]
async fn sweep_cancels_stale_requests_and_releases_holds() {
    let store = Arc::new(MemoryStore::new());
    let start = d(2026, 9, 7);
    let a = seed_pending(&store, 1, start).await;
    let b = seed_pending(&store, 2, start).await;
    // Starts the day after; must survive the sweep.
    let later = seed_pending(&store, 3, d(2026, 9, 8)).await;

    let sweeper = Sweeper::new(store.clone(), store.clone());
    let summary = sweeper.sweep(start).await.unwrap();

    assert_eq!(summary.examined, 2);
    assert_eq!(summary.cancelled, 2);
    assert_eq!(summary.failed, 0);
    assert!(summary.errors.is_empty());

    for id in [a, b] {
        let req = store.request(id).await.unwrap().unwrap();
        assert_eq!(req.status, LeaveStatus::Cancelled);
        let entries = store.entries_for_request(id).await.unwrap();
        assert_eq!(Reservation::fold(&entries), Reservation::Released);

        let remarks = store.remarks(id).await.unwrap();
        let last = remarks.last().unwrap();
        assert_eq!(last.action, RemarkAction::AutoCancelled);
        assert_eq!(last.actor_name, "System");
    }

    let untouched = store.request(later).await.unwrap().unwrap();
    assert_eq!(untouched.status, LeaveStatus::Pending);
}

#[actix_web::test]
async fn sweep_of_a_quiet_day_is_empty() {
    let store = Arc::new(MemoryStore::new());
    let sweeper = Sweeper::new(store.clone(), store);
    let summary = sweeper.sweep(d(2026, 9, 7)).await.unwrap();
    assert_eq!(summary.examined, 0);
    assert_eq!(summary.cancelled, 0);
}

/// Ledger that refuses every release, to exercise failure isolation.
struct BrokenLedger;

#[async_trait]
impl LedgerStore for BrokenLedger {
    async fn hold(
        &self,
        _employee_id: u64,
        _leave_type: LeaveType,
        _qty: f64,
        _request_id: u64,
    ) -> crate::error::AppResult<LedgerEntry> {
        Err(AppError::database("ledger offline"))
    }

    async fn release(
        &self,
        _employee_id: u64,
        _leave_type: LeaveType,
        _qty: f64,
        _request_id: u64,
    ) -> crate::error::AppResult<LedgerOutcome> {
        Err(AppError::database("ledger offline"))
    }

    async fn commit(
        &self,
        _employee_id: u64,
        _leave_type: LeaveType,
        _qty: f64,
        _request_id: u64,
    ) -> crate::error::AppResult<LedgerOutcome> {
        Err(AppError::database("ledger offline"))
    }

    async fn entries_for_request(
        &self,
        _request_id: u64,
    ) -> crate::error::AppResult<Vec<LedgerEntry>> {
        Ok(Vec::new())
    }

    async fn totals(
        &self,
        _employee_id: u64,
        _leave_type: LeaveType,
    ) -> crate::error::AppResult<LedgerTotals> {
        Ok(LedgerTotals::default())
    }
}

#[actix_web::test]
async fn release_failure_keeps_the_cancellation() {
    let store = Arc::new(MemoryStore::new());
    let start = d(2026, 9, 7);
    let id = seed_pending(&store, 1, start).await;

    let sweeper = Sweeper::new(store.clone(), Arc::new(BrokenLedger));
    let summary = sweeper.sweep(start).await.unwrap();

    assert_eq!(summary.cancelled, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains("release failed"));

    // Cancelled sticks even though the hold is still live.
    let req = store.request(id).await.unwrap().unwrap();
    assert_eq!(req.status, LeaveStatus::Cancelled);
    let entries = store.entries_for_request(id).await.unwrap();
    assert_eq!(Reservation::fold(&entries), Reservation::Held(3.0));
}

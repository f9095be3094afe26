use super::*;
use crate::model::leave_request::RemarkAction;
use crate::store::{LedgerDirective, NewLeaveRequest, RemarkDraft, TransitionChange};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn draft(employee_id: u64, from: NaiveDate, to: NaiveDate, qty: f64) -> NewLeaveRequest {
    NewLeaveRequest {
        employee_id,
        leave_type: LeaveType::Casual,
        from_date: from,
        to_date: to,
        reason: "family event".to_string(),
        l1_id: 500,
        l2_id: Some(600),
        applied_date: d(2026, 8, 20),
        hold_qty: qty,
        remark: RemarkDraft {
            actor_id: employee_id,
            actor_name: "A. Rahman".to_string(),
            action: RemarkAction::Submitted,
            text: "family event".to_string(),
        },
    }
}

#[actix_web::test]
async fn create_request_writes_hold_and_remark() {
    let store = MemoryStore::new();
    let req = store
        .create_request(draft(12199, d(2026, 9, 7), d(2026, 9, 9), 3.0))
        .await
        .unwrap();

    assert_eq!(req.status, LeaveStatus::Pending);
    assert_eq!(req.l1_status, LevelStatus::Pending);
    assert_eq!(req.sync_status, SyncStatus::Pending);

    let entries = store.entries_for_request(req.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, LedgerAction::Hold);
    assert_eq!(entries[0].qty, 3.0);

    let remarks = store.remarks(req.id).await.unwrap();
    assert_eq!(remarks.len(), 1);
    assert_eq!(remarks[0].action, RemarkAction::Submitted);
    assert_eq!(
        remarks[0].render(),
        "(12199) A. Rahman (Submitted) - \"family event\""
    );
}

#[actix_web::test]
async fn transition_patches_status_and_applies_directive() {
    let store = MemoryStore::new();
    let req = store
        .create_request(draft(12199, d(2026, 9, 7), d(2026, 9, 9), 3.0))
        .await
        .unwrap();

    let change = TransitionChange {
        expected_status: LeaveStatus::Pending,
        status: LeaveStatus::Rejected,
        l1_status: Some(LevelStatus::Rejected),
        l2_status: None,
        ledger: Some(LedgerDirective::Release(3.0)),
        remark: RemarkDraft {
            actor_id: 500,
            actor_name: "Manager".to_string(),
            action: RemarkAction::Rejected,
            text: "coverage gap".to_string(),
        },
    };
    let updated = store.apply_transition(req.id, &change).await.unwrap();

    assert_eq!(updated.status, LeaveStatus::Rejected);
    assert_eq!(updated.l1_status, LevelStatus::Rejected);
    assert_eq!(updated.l2_status, LevelStatus::Pending);

    let totals = store.totals(12199, LeaveType::Casual).await.unwrap();
    assert_eq!(totals, LedgerTotals::default());
    assert_eq!(store.remarks(req.id).await.unwrap().len(), 2);
}

#[actix_web::test]
async fn transition_planned_from_a_stale_read_is_rejected() {
    let store = MemoryStore::new();
    let req = store
        .create_request(draft(12199, d(2026, 9, 7), d(2026, 9, 9), 3.0))
        .await
        .unwrap();

    let cancel = TransitionChange {
        expected_status: LeaveStatus::Pending,
        status: LeaveStatus::Cancelled,
        l1_status: Some(LevelStatus::Cancelled),
        l2_status: Some(LevelStatus::Cancelled),
        ledger: Some(LedgerDirective::Release(3.0)),
        remark: RemarkDraft {
            actor_id: 0,
            actor_name: "System".to_string(),
            action: RemarkAction::AutoCancelled,
            text: "Leave not approved before start date".to_string(),
        },
    };
    store.apply_transition(req.id, &cancel).await.unwrap();

    // An approval planned before the cancellation landed must not win.
    let stale_approve = TransitionChange {
        expected_status: LeaveStatus::Pending,
        status: LeaveStatus::Approved,
        l1_status: Some(LevelStatus::Approved),
        l2_status: Some(LevelStatus::Approved),
        ledger: Some(LedgerDirective::ReleaseThenCommit(3.0)),
        remark: RemarkDraft {
            actor_id: 500,
            actor_name: "Manager".to_string(),
            action: RemarkAction::Approved,
            text: "Approved".to_string(),
        },
    };
    let err = store.apply_transition(req.id, &stale_approve).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let current = store.request(req.id).await.unwrap().unwrap();
    assert_eq!(current.status, LeaveStatus::Cancelled);
    // Neither the remark nor the ledger saw the stale approval.
    assert_eq!(store.remarks(req.id).await.unwrap().len(), 2);
    assert_eq!(store.entries_for_request(req.id).await.unwrap().len(), 2);
}

#[actix_web::test]
async fn transition_on_missing_request_is_not_found() {
    let store = MemoryStore::new();
    let change = TransitionChange {
        expected_status: LeaveStatus::Pending,
        status: LeaveStatus::Cancelled,
        l1_status: None,
        l2_status: None,
        ledger: None,
        remark: RemarkDraft {
            actor_id: 1,
            actor_name: "x".to_string(),
            action: RemarkAction::Cancelled,
            text: "x".to_string(),
        },
    };
    let err = store.apply_transition(99, &change).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[actix_web::test]
async fn release_is_idempotent_through_the_fold() {
    let store = MemoryStore::new();
    store.hold(1, LeaveType::Earned, 2.0, 10).await.unwrap();

    let first = store.release(1, LeaveType::Earned, 2.0, 10).await.unwrap();
    let second = store.release(1, LeaveType::Earned, 2.0, 10).await.unwrap();
    assert!(first.mutated());
    assert!(!second.mutated());

    // Only one RELEASE row was appended.
    let entries = store.entries_for_request(10).await.unwrap();
    assert_eq!(entries.len(), 2);
}

#[actix_web::test]
async fn commit_is_idempotent_but_stands_alone_without_hold() {
    let store = MemoryStore::new();
    store.hold(1, LeaveType::Earned, 2.0, 10).await.unwrap();

    assert!(store.commit(1, LeaveType::Earned, 2.0, 10).await.unwrap().mutated());
    assert!(!store.commit(1, LeaveType::Earned, 2.0, 10).await.unwrap().mutated());

    // Commit with no prior hold still writes a row.
    assert!(store.commit(1, LeaveType::Earned, 1.0, 11).await.unwrap().mutated());
    let totals = store.totals(1, LeaveType::Earned).await.unwrap();
    assert_eq!(totals.committed, 3.0);
}

#[actix_web::test]
async fn overlap_filter_sees_only_active_intersecting_requests() {
    let store = MemoryStore::new();
    let a = store
        .create_request(draft(12199, d(2026, 9, 7), d(2026, 9, 9), 3.0))
        .await
        .unwrap();
    store
        .create_request(draft(12199, d(2026, 9, 21), d(2026, 9, 22), 2.0))
        .await
        .unwrap();

    let hits = store
        .active_overlapping(12199, d(2026, 9, 9), d(2026, 9, 10))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, a.id);

    // A cancelled request no longer blocks the window.
    let change = TransitionChange {
        expected_status: LeaveStatus::Pending,
        status: LeaveStatus::Cancelled,
        l1_status: Some(LevelStatus::Cancelled),
        l2_status: Some(LevelStatus::Cancelled),
        ledger: Some(LedgerDirective::Release(3.0)),
        remark: RemarkDraft {
            actor_id: 12199,
            actor_name: "A. Rahman".to_string(),
            action: RemarkAction::Cancelled,
            text: "plans changed".to_string(),
        },
    };
    store.apply_transition(a.id, &change).await.unwrap();
    let hits = store
        .active_overlapping(12199, d(2026, 9, 9), d(2026, 9, 10))
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[actix_web::test]
async fn pending_starting_on_matches_exact_date_only() {
    let store = MemoryStore::new();
    let a = store
        .create_request(draft(1, d(2026, 9, 7), d(2026, 9, 9), 3.0))
        .await
        .unwrap();
    store
        .create_request(draft(2, d(2026, 9, 8), d(2026, 9, 9), 2.0))
        .await
        .unwrap();

    let stale = store.pending_starting_on(d(2026, 9, 7)).await.unwrap();
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].id, a.id);
}

#[actix_web::test]
async fn mark_synced_flips_once() {
    let store = MemoryStore::new();
    let req = store
        .create_request(draft(1, d(2026, 9, 7), d(2026, 9, 9), 3.0))
        .await
        .unwrap();

    assert!(store.mark_synced(req.id).await.unwrap());
    assert!(!store.mark_synced(req.id).await.unwrap());

    let stored = store.request(req.id).await.unwrap().unwrap();
    assert_eq!(stored.sync_status, SyncStatus::Synced);
    assert!(stored.sync_at.is_some());

    let err = store.mark_synced(999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

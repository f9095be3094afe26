//! In-memory store implementations, used by the test suite the way the
//! MySQL implementations are used in production. A single mutex per store
//! makes every composite operation trivially atomic.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::model::leave_request::{
    LeaveRequest, LeaveStatus, LevelStatus, RemarkEntry, SyncStatus,
};
use crate::model::leave_type::LeaveType;
use crate::model::ledger::{
    LedgerAction, LedgerEntry, LedgerOutcome, LedgerTotals, Reservation, totals_from_entries,
};
use crate::store::{
    AllocationSource, EmployeeDirectory, EmployeeProfile, LeaveStore, LedgerDirective,
    LedgerStore, NewLeaveRequest, RemarkDraft, TransitionChange,
};

#[derive(Default)]
struct Inner {
    requests: HashMap<u64, LeaveRequest>,
    ledger: Vec<LedgerEntry>,
    remarks: Vec<RemarkEntry>,
    next_request_id: u64,
    next_ledger_id: u64,
    next_remark_id: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn append_ledger(
        &mut self,
        employee_id: u64,
        leave_type: LeaveType,
        qty: f64,
        action: LedgerAction,
        request_id: u64,
    ) -> LedgerEntry {
        self.next_ledger_id += 1;
        let entry = LedgerEntry {
            id: self.next_ledger_id,
            employee_id,
            leave_type,
            qty,
            action,
            request_id,
            created_at: Utc::now(),
        };
        self.ledger.push(entry.clone());
        entry
    }

    fn append_remark(&mut self, request_id: u64, draft: &RemarkDraft) {
        self.next_remark_id += 1;
        self.remarks.push(RemarkEntry {
            id: self.next_remark_id,
            request_id,
            actor_id: draft.actor_id,
            actor_name: draft.actor_name.clone(),
            action: draft.action,
            text: draft.text.clone(),
            created_at: Utc::now(),
        });
    }

    fn reservation_of(&self, request_id: u64) -> Reservation {
        Reservation::fold(self.ledger.iter().filter(|e| e.request_id == request_id))
    }

    fn release(
        &mut self,
        employee_id: u64,
        leave_type: LeaveType,
        qty: f64,
        request_id: u64,
    ) -> LedgerOutcome {
        if !self.reservation_of(request_id).can_release() {
            return LedgerOutcome::Noop;
        }
        self.append_ledger(employee_id, leave_type, qty, LedgerAction::Release, request_id);
        LedgerOutcome::Applied
    }

    fn commit(
        &mut self,
        employee_id: u64,
        leave_type: LeaveType,
        qty: f64,
        request_id: u64,
    ) -> LedgerOutcome {
        if !self.reservation_of(request_id).needs_commit() {
            return LedgerOutcome::Noop;
        }
        self.append_ledger(employee_id, leave_type, qty, LedgerAction::Commit, request_id);
        LedgerOutcome::Applied
    }

    fn apply_directive(&mut self, req: &LeaveRequest, directive: LedgerDirective) {
        match directive {
            LedgerDirective::Release(qty) => {
                self.release(req.employee_id, req.leave_type, qty, req.id);
            }
            LedgerDirective::Commit(qty) => {
                self.commit(req.employee_id, req.leave_type, qty, req.id);
            }
            LedgerDirective::ReleaseThenCommit(qty) => {
                self.release(req.employee_id, req.leave_type, qty, req.id);
                self.commit(req.employee_id, req.leave_type, qty, req.id);
            }
        }
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn create_request(&self, draft: NewLeaveRequest) -> AppResult<LeaveRequest> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_request_id += 1;
        let id = inner.next_request_id;
        let request = LeaveRequest {
            id,
            employee_id: draft.employee_id,
            leave_type: draft.leave_type,
            from_date: draft.from_date,
            to_date: draft.to_date,
            reason: draft.reason,
            status: LeaveStatus::Pending,
            l1_id: draft.l1_id,
            l1_status: LevelStatus::Pending,
            l2_id: draft.l2_id,
            l2_status: LevelStatus::Pending,
            applied_date: draft.applied_date,
            sync_status: SyncStatus::Pending,
            sync_at: None,
            created_at: Utc::now(),
        };
        inner.requests.insert(id, request.clone());
        inner.append_ledger(
            draft.employee_id,
            draft.leave_type,
            draft.hold_qty,
            LedgerAction::Hold,
            id,
        );
        inner.append_remark(id, &draft.remark);
        Ok(request)
    }

    async fn request(&self, id: u64) -> AppResult<Option<LeaveRequest>> {
        Ok(self.inner.lock().unwrap().requests.get(&id).cloned())
    }

    async fn requests_for_employee(&self, employee_id: u64) -> AppResult<Vec<LeaveRequest>> {
        let inner = self.inner.lock().unwrap();
        let mut list: Vec<_> = inner
            .requests
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        list.sort_by_key(|r| std::cmp::Reverse(r.id));
        Ok(list)
    }

    async fn requests_for_approver(&self, approver_id: u64) -> AppResult<Vec<LeaveRequest>> {
        let inner = self.inner.lock().unwrap();
        let mut list: Vec<_> = inner
            .requests
            .values()
            .filter(|r| r.l1_id == approver_id || r.l2_id == Some(approver_id))
            .cloned()
            .collect();
        list.sort_by_key(|r| std::cmp::Reverse(r.id));
        Ok(list)
    }

    async fn active_overlapping(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .requests
            .values()
            .filter(|r| {
                r.employee_id == employee_id
                    && r.is_active()
                    && r.from_date <= to
                    && r.to_date >= from
            })
            .cloned()
            .collect())
    }

    async fn apply_transition(
        &self,
        request_id: u64,
        change: &TransitionChange,
    ) -> AppResult<LeaveRequest> {
        let mut inner = self.inner.lock().unwrap();
        let mut req = inner
            .requests
            .get(&request_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Leave request {request_id} not found")))?;

        if req.status != change.expected_status {
            return Err(AppError::validation(format!(
                "Request was {} when planned but is now {}",
                change.expected_status, req.status
            )));
        }

        req.status = change.status;
        if let Some(l1) = change.l1_status {
            req.l1_status = l1;
        }
        if let Some(l2) = change.l2_status {
            req.l2_status = l2;
        }
        inner.requests.insert(request_id, req.clone());
        inner.append_remark(request_id, &change.remark);
        if let Some(directive) = change.ledger {
            inner.apply_directive(&req, directive);
        }
        Ok(req)
    }

    async fn pending_starting_on(&self, date: NaiveDate) -> AppResult<Vec<LeaveRequest>> {
        let inner = self.inner.lock().unwrap();
        let mut list: Vec<_> = inner
            .requests
            .values()
            .filter(|r| r.status == LeaveStatus::Pending && r.from_date == date)
            .cloned()
            .collect();
        list.sort_by_key(|r| r.id);
        Ok(list)
    }

    async fn approved_unsynced(&self, date: NaiveDate) -> AppResult<Vec<LeaveRequest>> {
        let inner = self.inner.lock().unwrap();
        let mut list: Vec<_> = inner
            .requests
            .values()
            .filter(|r| {
                r.status == LeaveStatus::Approved
                    && r.sync_status == SyncStatus::Pending
                    && r.from_date == date
            })
            .cloned()
            .collect();
        list.sort_by_key(|r| r.id);
        Ok(list)
    }

    async fn mark_synced(&self, request_id: u64) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let req = inner
            .requests
            .get_mut(&request_id)
            .ok_or_else(|| AppError::not_found(format!("Leave request {request_id} not found")))?;
        if req.sync_status == SyncStatus::Synced {
            return Ok(false);
        }
        req.sync_status = SyncStatus::Synced;
        req.sync_at = Some(Utc::now());
        Ok(true)
    }

    async fn remarks(&self, request_id: u64) -> AppResult<Vec<RemarkEntry>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .remarks
            .iter()
            .filter(|r| r.request_id == request_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn hold(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        qty: f64,
        request_id: u64,
    ) -> AppResult<LedgerEntry> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.append_ledger(employee_id, leave_type, qty, LedgerAction::Hold, request_id))
    }

    async fn release(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        qty: f64,
        request_id: u64,
    ) -> AppResult<LedgerOutcome> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.release(employee_id, leave_type, qty, request_id))
    }

    async fn commit(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        qty: f64,
        request_id: u64,
    ) -> AppResult<LedgerOutcome> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.commit(employee_id, leave_type, qty, request_id))
    }

    async fn entries_for_request(&self, request_id: u64) -> AppResult<Vec<LedgerEntry>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .ledger
            .iter()
            .filter(|e| e.request_id == request_id)
            .cloned()
            .collect())
    }

    async fn totals(&self, employee_id: u64, leave_type: LeaveType) -> AppResult<LedgerTotals> {
        let inner = self.inner.lock().unwrap();
        let entries: Vec<_> = inner
            .ledger
            .iter()
            .filter(|e| e.employee_id == employee_id && e.leave_type == leave_type)
            .cloned()
            .collect();
        Ok(totals_from_entries(&entries))
    }
}

/// Fixed directory keyed by employee id.
#[derive(Default)]
pub struct MemoryDirectory {
    profiles: Mutex<HashMap<u64, EmployeeProfile>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: EmployeeProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.employee_id, profile);
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryDirectory {
    async fn profile(&self, employee_id: u64) -> AppResult<Option<EmployeeProfile>> {
        Ok(self.profiles.lock().unwrap().get(&employee_id).cloned())
    }
}

/// Fixed allocation table keyed by (employee, leave type).
#[derive(Default)]
pub struct MemoryAllocations {
    allocated: Mutex<HashMap<(u64, LeaveType), f64>>,
}

impl MemoryAllocations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, employee_id: u64, leave_type: LeaveType, days: f64) {
        self.allocated
            .lock()
            .unwrap()
            .insert((employee_id, leave_type), days);
    }
}

#[async_trait]
impl AllocationSource for MemoryAllocations {
    async fn allocated(&self, employee_id: u64, leave_type: LeaveType) -> AppResult<f64> {
        Ok(self
            .allocated
            .lock()
            .unwrap()
            .get(&(employee_id, leave_type))
            .copied()
            .unwrap_or(0.0))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

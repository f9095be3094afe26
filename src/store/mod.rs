pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AppResult;
use crate::model::leave_request::{LeaveRequest, LevelStatus, LeaveStatus, RemarkAction, RemarkEntry};
use crate::model::leave_type::LeaveType;
use crate::model::ledger::{LedgerEntry, LedgerOutcome, LedgerTotals};

/// Insert payload for a new request. The store creates the row
/// Pending/Pending/Pending, appends the HOLD entry and the submission
/// remark in one transaction.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: String,
    pub l1_id: u64,
    pub l2_id: Option<u64>,
    pub applied_date: NaiveDate,
    pub hold_qty: f64,
    pub remark: RemarkDraft,
}

/// Remark to append alongside a transition.
#[derive(Debug, Clone)]
pub struct RemarkDraft {
    pub actor_id: u64,
    pub actor_name: String,
    pub action: RemarkAction,
    pub text: String,
}

/// Ledger side effect of a transition. Quantities are the request's
/// business-day count; idempotency is still decided against the folded
/// reservation state at apply time.
#[derive(Debug, Clone, Copy)]
pub enum LedgerDirective {
    Release(f64),
    Commit(f64),
    /// Single-level final approval: release the hold, then commit.
    ReleaseThenCommit(f64),
}

/// Status mutation plus its paired ledger effect and audit remark. Stores
/// must apply all parts atomically, or fail without applying any.
#[derive(Debug, Clone)]
pub struct TransitionChange {
    /// Overall status the plan was derived from. Applying against a row
    /// that has since moved on fails with a validation error.
    pub expected_status: LeaveStatus,
    pub status: LeaveStatus,
    pub l1_status: Option<LevelStatus>,
    pub l2_status: Option<LevelStatus>,
    pub ledger: Option<LedgerDirective>,
    pub remark: RemarkDraft,
}

/// Persistence for leave requests and their remark timeline.
#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn create_request(&self, draft: NewLeaveRequest) -> AppResult<LeaveRequest>;

    async fn request(&self, id: u64) -> AppResult<Option<LeaveRequest>>;

    async fn requests_for_employee(&self, employee_id: u64) -> AppResult<Vec<LeaveRequest>>;

    /// Requests on which the given employee is the L1 or L2 approver.
    async fn requests_for_approver(&self, approver_id: u64) -> AppResult<Vec<LeaveRequest>>;

    /// Active (Pending / L1 Approved / Approved) requests of the employee
    /// whose date range intersects `[from, to]`.
    async fn active_overlapping(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>>;

    /// Apply a planned transition atomically and return the updated row.
    async fn apply_transition(&self, request_id: u64, change: &TransitionChange)
        -> AppResult<LeaveRequest>;

    /// Requests still Pending whose leave starts on `date` (sweeper input).
    async fn pending_starting_on(&self, date: NaiveDate) -> AppResult<Vec<LeaveRequest>>;

    /// Approved, not-yet-synced requests starting on `date`.
    async fn approved_unsynced(&self, date: NaiveDate) -> AppResult<Vec<LeaveRequest>>;

    /// Stamp the persisted sync marker. Returns false when already synced.
    async fn mark_synced(&self, request_id: u64) -> AppResult<bool>;

    async fn remarks(&self, request_id: u64) -> AppResult<Vec<RemarkEntry>>;
}

/// The entitlement ledger. Rows are append-only; all idempotency checks
/// fold the existing rows of the reference request.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Record a reservation. Callers check availability first; this does not.
    async fn hold(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        qty: f64,
        request_id: u64,
    ) -> AppResult<LedgerEntry>;

    /// Return held or committed days to the pool. No-op when nothing is live.
    async fn release(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        qty: f64,
        request_id: u64,
    ) -> AppResult<LedgerOutcome>;

    /// Finalize a reservation. No-op when already committed; appends a
    /// fresh COMMIT when no hold exists.
    async fn commit(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        qty: f64,
        request_id: u64,
    ) -> AppResult<LedgerOutcome>;

    async fn entries_for_request(&self, request_id: u64) -> AppResult<Vec<LedgerEntry>>;

    /// Live held/committed totals for one employee + leave type.
    async fn totals(&self, employee_id: u64, leave_type: LeaveType) -> AppResult<LedgerTotals>;
}

/// Read-only employee directory (external collaborator).
#[derive(Debug, Clone)]
pub struct EmployeeProfile {
    pub employee_id: u64,
    pub name: String,
    pub l1_id: Option<u64>,
    pub l2_id: Option<u64>,
}

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn profile(&self, employee_id: u64) -> AppResult<Option<EmployeeProfile>>;
}

/// Read-only entitlement allocation table (external collaborator).
#[async_trait]
pub trait AllocationSource: Send + Sync {
    /// Allocated days for the year; zero when no row exists.
    async fn allocated(&self, employee_id: u64, leave_type: LeaveType) -> AppResult<f64>;
}

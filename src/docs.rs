use crate::model::balance::BalanceSnapshot;
use crate::model::leave_request::{
    LeaveRequest, LeaveStatus, LevelStatus, RemarkAction, RemarkEntry, SyncStatus,
};
use crate::model::leave_type::LeaveType;
use crate::model::ledger::{LedgerAction, LedgerEntry};
use crate::service::balance::{EmployeeBalances, TypedBalance};
use crate::service::leave::{CancelLeave, DecideLeave, LeaveRequestDetail, LeaveRequestView, SubmitLeave};
use crate::service::sweeper::SweepSummary;
use crate::service::sync::{SyncAck, SyncBatch};
use crate::service::transition::{ApprovalLevel, DecisionAction};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LeaveDesk API",
        version = "1.0.0",
        description = r#"
## Employee Leave Entitlement & Approval Service

This API manages leave entitlements as an append-only ledger and routes
every request through a two-level (L1/L2) approval chain.

### Key Features
- **Leave Requests**
  - Submit with balance/overlap/backdate validation, cancel future-dated requests
- **Two-Level Approval**
  - L1 then L2 decisions; requests with a single manager finalize at L1
- **Entitlement Ledger**
  - HOLD on submission, COMMIT on final approval, RELEASE on rejection or cancellation
- **Balance Snapshots**
  - Derived read-time from allocations and the ledger, per leave type
- **Payroll Sync**
  - Pull approved requests and acknowledge them exactly once

### Response Format
- JSON-based RESTful responses
- Errors carry a `message` field

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::submit_leave,
        crate::api::leave::decide_leave,
        crate::api::leave::cancel_leave,
        crate::api::leave::get_leave,
        crate::api::leave::employee_leaves,
        crate::api::leave::approver_inbox,

        crate::api::balance::all_balances,
        crate::api::balance::one_balance,

        crate::api::sync::pending_sync,
        crate::api::sync::ack_sync,

        crate::api::sweeper::run_sweep
    ),
    components(
        schemas(
            LeaveType,
            LeaveStatus,
            LevelStatus,
            SyncStatus,
            LeaveRequest,
            RemarkAction,
            RemarkEntry,
            LedgerAction,
            LedgerEntry,
            BalanceSnapshot,
            TypedBalance,
            EmployeeBalances,
            SubmitLeave,
            DecideLeave,
            CancelLeave,
            DecisionAction,
            ApprovalLevel,
            LeaveRequestView,
            LeaveRequestDetail,
            SyncBatch,
            SyncAck,
            SweepSummary
        )
    ),
    tags(
        (name = "Leave", description = "Leave request and approval APIs"),
        (name = "Balance", description = "Derived balance snapshot APIs"),
        (name = "Sync", description = "Payroll synchronization APIs"),
        (name = "Sweep", description = "Auto-cancellation sweep APIs"),
    )
)]
pub struct ApiDoc;

//! Pure transition planning for the approval state machine. Planners look
//! at a request and an actor and produce the status patch, ledger
//! directive and audit remark for the store to apply atomically; they
//! never touch storage themselves.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::model::leave_request::{
    LeaveRequest, LeaveStatus, LevelStatus, RemarkAction, overall_from_levels,
};
use crate::store::{LedgerDirective, RemarkDraft, TransitionChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Approve,
    Reject,
}

/// Which approval level an actor holds on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, ToSchema)]
pub enum ApprovalLevel {
    L1,
    L2,
}

/// Resolve the level at which `actor_id` may decide right now, or explain
/// why it may not.
pub fn actionable_level(req: &LeaveRequest, actor_id: u64) -> AppResult<ApprovalLevel> {
    if req.l1_id == actor_id {
        if req.l1_status != LevelStatus::Pending {
            return Err(AppError::validation(format!(
                "Request already processed by L1 (status: {})",
                req.l1_status
            )));
        }
        return Ok(ApprovalLevel::L1);
    }
    if req.l2_id == Some(actor_id) {
        if req.l1_status != LevelStatus::Approved {
            return Err(AppError::validation(
                "L1 approval is required before the L2 decision",
            ));
        }
        if req.l2_status != LevelStatus::Pending {
            return Err(AppError::validation(format!(
                "Request already processed by L2 (status: {})",
                req.l2_status
            )));
        }
        return Ok(ApprovalLevel::L2);
    }
    Err(AppError::authorization(
        "Not the designated approver for this request",
    ))
}

/// Same check without an error payload, for list annotations.
pub fn can_act(req: &LeaveRequest, actor_id: u64) -> Option<ApprovalLevel> {
    actionable_level(req, actor_id).ok()
}

fn remark(
    actor_id: u64,
    actor_name: &str,
    action: RemarkAction,
    text: Option<&str>,
    default_text: &str,
) -> RemarkDraft {
    let text = text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(default_text);
    RemarkDraft {
        actor_id,
        actor_name: actor_name.to_string(),
        action,
        text: text.to_string(),
    }
}

/// Plan an approve/reject decision. `qty` is the request's business-day
/// count, used for whichever ledger write the transition requires.
pub fn plan_decision(
    req: &LeaveRequest,
    actor_id: u64,
    actor_name: &str,
    action: DecisionAction,
    remark_text: Option<&str>,
    qty: f64,
) -> AppResult<TransitionChange> {
    let level = actionable_level(req, actor_id)?;

    let (l1, l2, ledger) = match (level, action) {
        (ApprovalLevel::L1, DecisionAction::Approve) if req.single_level() => (
            LevelStatus::Approved,
            LevelStatus::Approved,
            // Single-level finalization: swap the hold for a commit.
            Some(LedgerDirective::ReleaseThenCommit(qty)),
        ),
        (ApprovalLevel::L1, DecisionAction::Approve) => {
            (LevelStatus::Approved, req.l2_status, None)
        }
        (ApprovalLevel::L1, DecisionAction::Reject) => (
            LevelStatus::Rejected,
            req.l2_status,
            Some(LedgerDirective::Release(qty)),
        ),
        (ApprovalLevel::L2, DecisionAction::Approve) => (
            req.l1_status,
            LevelStatus::Approved,
            Some(LedgerDirective::Commit(qty)),
        ),
        (ApprovalLevel::L2, DecisionAction::Reject) => (
            req.l1_status,
            LevelStatus::Rejected,
            Some(LedgerDirective::Release(qty)),
        ),
    };

    let (verb, fallback) = match action {
        DecisionAction::Approve => (RemarkAction::Approved, "Approved"),
        DecisionAction::Reject => (RemarkAction::Rejected, "Rejected"),
    };

    Ok(TransitionChange {
        expected_status: req.status,
        status: overall_from_levels(l1, l2),
        l1_status: Some(l1),
        l2_status: Some(l2),
        ledger,
        remark: remark(actor_id, actor_name, verb, remark_text, fallback),
    })
}

fn ensure_cancellable(req: &LeaveRequest, today: chrono::NaiveDate) -> AppResult<()> {
    if matches!(
        req.status,
        LeaveStatus::Rejected
            | LeaveStatus::Cancelled
    ) {
        return Err(AppError::validation(format!(
            "Cannot cancel request with status: {}",
            req.status
        )));
    }
    if req.from_date <= today {
        return Err(AppError::validation(
            "Cannot cancel a leave that has already started or starts today",
        ));
    }
    Ok(())
}

/// Plan a cancellation. The owner cancels outright; an approver's
/// cancellation lands as a rejection at their level.
pub fn plan_cancel(
    req: &LeaveRequest,
    actor_id: u64,
    actor_name: &str,
    reason: Option<&str>,
    today: chrono::NaiveDate,
    qty: f64,
) -> AppResult<TransitionChange> {
    ensure_cancellable(req, today)?;

    let (l1, l2) = if req.employee_id == actor_id {
        // Undecided levels collapse to Cancelled; decided ones keep their
        // record for the audit trail.
        let fold = |s: LevelStatus| {
            if s == LevelStatus::Pending {
                LevelStatus::Cancelled
            } else {
                s
            }
        };
        (fold(req.l1_status), fold(req.l2_status))
    } else if req.l1_id == actor_id {
        (LevelStatus::Rejected, req.l2_status)
    } else if req.l2_id == Some(actor_id) {
        (req.l1_status, LevelStatus::Rejected)
    } else {
        return Err(AppError::authorization(
            "Only the requesting employee or a designated approver can cancel this request",
        ));
    };

    let status = if req.employee_id == actor_id {
        LeaveStatus::Cancelled
    } else {
        overall_from_levels(l1, l2)
    };

    Ok(TransitionChange {
        expected_status: req.status,
        status,
        l1_status: Some(l1),
        l2_status: Some(l2),
        ledger: Some(LedgerDirective::Release(qty)),
        remark: remark(
            actor_id,
            actor_name,
            RemarkAction::Cancelled,
            reason,
            "Cancelled",
        ),
    })
}

/// Plan the sweeper's force-cancellation of a stale Pending request.
/// Deliberately carries no ledger directive: the sweeper releases in a
/// separate step so a release failure cannot undo the cancellation.
pub fn plan_sweep(req: &LeaveRequest) -> TransitionChange {
    debug_assert_eq!(req.status, LeaveStatus::Pending);
    TransitionChange {
        expected_status: req.status,
        status: LeaveStatus::Cancelled,
        l1_status: Some(LevelStatus::Cancelled),
        l2_status: Some(LevelStatus::Cancelled),
        ledger: None,
        remark: RemarkDraft {
            actor_id: 0,
            actor_name: "System".to_string(),
            action: RemarkAction::AutoCancelled,
            text: "Leave not approved before start date".to_string(),
        },
    }
}

#[cfg(test)]
#[path = "transition_tests.rs"]
mod tests;

//! Leave request workflow: submission with its validation chain,
//! approver decisions, cancellation, and the read views.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::model::leave_request::{LeaveRequest, RemarkAction, RemarkEntry};
use crate::model::leave_type::LeaveType;
use crate::model::ledger::LedgerEntry;
use crate::model::policy::policy_for;
use crate::service::balance::BalanceCalculator;
use crate::service::transition::{self, ApprovalLevel, DecisionAction};
use crate::store::{EmployeeDirectory, LeaveStore, LedgerStore, NewLeaveRequest, RemarkDraft};
use crate::utils::business_days::business_days_inclusive;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitLeave {
    pub employee_id: u64,
    pub leave_type: LeaveType,
    #[schema(value_type = String, format = "date")]
    pub from_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub to_date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DecideLeave {
    pub approver_id: u64,
    pub action: DecisionAction,
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CancelLeave {
    pub actor_id: u64,
    pub reason: Option<String>,
}

/// A request as listed for clients, annotated with the caller's window
/// for action on it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaveRequestView {
    #[serde(flatten)]
    pub request: LeaveRequest,
    pub employee_name: String,
    pub requested_days: f64,
    pub can_act: bool,
    pub action_level: Option<ApprovalLevel>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaveRequestDetail {
    #[serde(flatten)]
    pub view: LeaveRequestView,
    pub remarks: Vec<RemarkEntry>,
    pub ledger: Vec<LedgerEntry>,
}

pub struct LeaveService {
    requests: Arc<dyn LeaveStore>,
    ledger: Arc<dyn LedgerStore>,
    directory: Arc<dyn EmployeeDirectory>,
    balances: Arc<BalanceCalculator>,
}

impl LeaveService {
    pub fn new(
        requests: Arc<dyn LeaveStore>,
        ledger: Arc<dyn LedgerStore>,
        directory: Arc<dyn EmployeeDirectory>,
        balances: Arc<BalanceCalculator>,
    ) -> Self {
        Self { requests, ledger, directory, balances }
    }

    async fn named_profile(&self, employee_id: u64) -> AppResult<crate::store::EmployeeProfile> {
        self.directory
            .profile(employee_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Employee {employee_id} not found")))
    }

    async fn actor_name(&self, actor_id: u64) -> AppResult<String> {
        Ok(self.named_profile(actor_id).await?.name)
    }

    /// Submit a new request. Validations run in a fixed order so clients
    /// see the most fundamental failure first.
    pub async fn submit(&self, input: SubmitLeave) -> AppResult<LeaveRequest> {
        let profile = self.named_profile(input.employee_id).await?;

        if input.to_date < input.from_date {
            return Err(AppError::validation("to_date must not be before from_date"));
        }

        let today = Local::now().date_naive();
        let policy = policy_for(input.leave_type);
        if !policy.allow_backdated && input.from_date < today {
            return Err(AppError::validation(format!(
                "{} cannot start in the past",
                input.leave_type
            )));
        }

        let qty = business_days_inclusive(input.from_date, input.to_date);
        if qty <= 0.0 {
            return Err(AppError::validation(
                "Requested range contains no working days",
            ));
        }

        let overlapping = self
            .requests
            .active_overlapping(input.employee_id, input.from_date, input.to_date)
            .await?;
        if let Some(clash) = overlapping.first() {
            return Err(AppError::validation(format!(
                "Overlaps an existing {} request ({} to {})",
                clash.status, clash.from_date, clash.to_date
            )));
        }

        if !policy.balance_exempt {
            let snapshot = self
                .balances
                .snapshot(input.employee_id, input.leave_type)
                .await?;
            if snapshot.available < qty {
                return Err(AppError::validation(format!(
                    "Insufficient balance: {} day(s) available, {} requested",
                    snapshot.available, qty
                )));
            }
        }

        let l1_id = profile.l1_id.ok_or_else(|| {
            AppError::validation("No reporting manager configured for this employee")
        })?;

        let created = self
            .requests
            .create_request(NewLeaveRequest {
                employee_id: input.employee_id,
                leave_type: input.leave_type,
                from_date: input.from_date,
                to_date: input.to_date,
                reason: input.reason.clone(),
                l1_id,
                l2_id: profile.l2_id,
                applied_date: today,
                hold_qty: qty,
                remark: RemarkDraft {
                    actor_id: input.employee_id,
                    actor_name: profile.name,
                    action: RemarkAction::Submitted,
                    text: input.reason,
                },
            })
            .await?;

        info!(
            request_id = created.id,
            employee_id = created.employee_id,
            leave_type = %created.leave_type,
            days = qty,
            "leave request submitted"
        );
        Ok(created)
    }

    async fn must_get(&self, request_id: u64) -> AppResult<LeaveRequest> {
        self.requests
            .request(request_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Leave request {request_id} not found")))
    }

    /// Approve or reject at the caller's level.
    pub async fn decide(&self, request_id: u64, input: DecideLeave) -> AppResult<LeaveRequest> {
        let req = self.must_get(request_id).await?;
        let actor_name = self.actor_name(input.approver_id).await?;

        let change = transition::plan_decision(
            &req,
            input.approver_id,
            &actor_name,
            input.action,
            input.remark.as_deref(),
            req.requested_days(),
        )?;
        let updated = self.requests.apply_transition(request_id, &change).await?;

        info!(
            request_id,
            approver_id = input.approver_id,
            status = %updated.status,
            "leave request decided"
        );
        Ok(updated)
    }

    /// Cancel a future-dated request, by its owner or an approver.
    pub async fn cancel(&self, request_id: u64, input: CancelLeave) -> AppResult<LeaveRequest> {
        let req = self.must_get(request_id).await?;
        let actor_name = self.actor_name(input.actor_id).await?;

        let change = transition::plan_cancel(
            &req,
            input.actor_id,
            &actor_name,
            input.reason.as_deref(),
            Local::now().date_naive(),
            req.requested_days(),
        )?;
        let updated = self.requests.apply_transition(request_id, &change).await?;

        info!(request_id, actor_id = input.actor_id, "leave request cancelled");
        Ok(updated)
    }

    async fn view_for(&self, req: LeaveRequest, viewer_id: u64) -> AppResult<LeaveRequestView> {
        let employee_name = self
            .directory
            .profile(req.employee_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_default();
        let action_level = transition::can_act(&req, viewer_id);
        Ok(LeaveRequestView {
            requested_days: req.requested_days(),
            employee_name,
            can_act: action_level.is_some(),
            action_level,
            request: req,
        })
    }

    /// Requests the employee has submitted, newest first.
    pub async fn requests_of(
        &self,
        employee_id: u64,
        viewer_id: u64,
    ) -> AppResult<Vec<LeaveRequestView>> {
        let rows = self.requests.requests_for_employee(employee_id).await?;
        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            views.push(self.view_for(row, viewer_id).await?);
        }
        Ok(views)
    }

    /// Requests awaiting or past the given approver, annotated with
    /// whether they can act now.
    pub async fn approvals_for(&self, approver_id: u64) -> AppResult<Vec<LeaveRequestView>> {
        let rows = self.requests.requests_for_approver(approver_id).await?;
        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            views.push(self.view_for(row, approver_id).await?);
        }
        Ok(views)
    }

    /// One request with its full remark timeline and ledger trail.
    pub async fn detail(&self, request_id: u64, viewer_id: u64) -> AppResult<LeaveRequestDetail> {
        let req = self.must_get(request_id).await?;
        let remarks = self.requests.remarks(request_id).await?;
        let ledger = self.ledger.entries_for_request(request_id).await?;
        Ok(LeaveRequestDetail {
            view: self.view_for(req, viewer_id).await?,
            remarks,
            ledger,
        })
    }
}

#[cfg(test)]
#[path = "leave_tests.rs"]
mod tests;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::leave_type::LeaveType;
use crate::utils::business_days::business_days_inclusive;

/// Overall request status. `L1Approved` is the intermediate state of a
/// two-level request; `Approved`, `Rejected` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
pub enum LeaveStatus {
    Pending,
    #[strum(serialize = "L1 Approved")]
    #[serde(rename = "L1 Approved")]
    L1Approved,
    Approved,
    Rejected,
    Cancelled,
}

/// Status of one approval level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
pub enum LevelStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// Outbound payroll-sync marker, persisted on the request row so the sync
/// collaborator's dedup survives process restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
pub enum SyncStatus {
    #[strum(serialize = "PENDING")]
    #[serde(rename = "PENDING")]
    Pending,
    #[strum(serialize = "SYNCED")]
    #[serde(rename = "SYNCED")]
    Synced,
}

/// Overall status as a function of the two level statuses. This is the
/// single source of truth for the transition table's status column.
pub fn overall_from_levels(l1: LevelStatus, l2: LevelStatus) -> LeaveStatus {
    if l1 == LevelStatus::Cancelled || l2 == LevelStatus::Cancelled {
        return LeaveStatus::Cancelled;
    }
    if l1 == LevelStatus::Rejected || l2 == LevelStatus::Rejected {
        return LeaveStatus::Rejected;
    }
    match (l1, l2) {
        (LevelStatus::Approved, LevelStatus::Approved) => LeaveStatus::Approved,
        (LevelStatus::Approved, LevelStatus::Pending) => LeaveStatus::L1Approved,
        _ => LeaveStatus::Pending,
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type: LeaveType,
    #[schema(value_type = String, format = "date")]
    pub from_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub to_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub l1_id: u64,
    pub l1_status: LevelStatus,
    pub l2_id: Option<u64>,
    pub l2_status: LevelStatus,
    #[schema(value_type = String, format = "date")]
    pub applied_date: NaiveDate,
    pub sync_status: SyncStatus,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub sync_at: Option<DateTime<Utc>>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// A request collapses to a single approval level when no distinct L2
    /// manager exists.
    pub fn single_level(&self) -> bool {
        match self.l2_id {
            None => true,
            Some(l2) => l2 == self.l1_id,
        }
    }

    /// Requests that still tie up balance or could still be approved.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            LeaveStatus::Pending | LeaveStatus::L1Approved | LeaveStatus::Approved
        )
    }

    /// Business days (Mon-Fri) covered by the request, inclusive.
    pub fn requested_days(&self) -> f64 {
        business_days_inclusive(self.from_date, self.to_date)
    }
}

/// Action verbs recorded on the remark timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
pub enum RemarkAction {
    Submitted,
    Approved,
    Rejected,
    Cancelled,
    #[strum(serialize = "Auto-Cancelled")]
    #[serde(rename = "Auto-Cancelled")]
    AutoCancelled,
}

/// One line of the per-request audit timeline, stored as its own row
/// rather than concatenated into a text blob.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RemarkEntry {
    pub id: u64,
    pub request_id: u64,
    pub actor_id: u64,
    pub actor_name: String,
    pub action: RemarkAction,
    pub text: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl RemarkEntry {
    /// Display form used by clients: `(12199) A. Rahman (Approved) - "ok"`.
    pub fn render(&self) -> String {
        format!(
            "({}) {} ({}) - \"{}\"",
            self.actor_id, self.actor_name, self.action, self.text
        )
    }
}

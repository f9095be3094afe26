//! Outbound feed for the payroll system: approved requests starting on a
//! given date, deduplicated through the persisted sync marker on each
//! request row.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::model::leave_request::LeaveRequest;
use crate::store::LeaveStore;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncBatch {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub requests: Vec<LeaveRequest>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncAck {
    pub request_id: u64,
    /// False when the request had already been acknowledged.
    pub marked: bool,
}

pub struct SyncGateway {
    requests: Arc<dyn LeaveStore>,
}

impl SyncGateway {
    pub fn new(requests: Arc<dyn LeaveStore>) -> Self {
        Self { requests }
    }

    /// Approved, not-yet-synced requests starting on `date`.
    pub async fn pending_batch(&self, date: NaiveDate) -> AppResult<SyncBatch> {
        let requests = self.requests.approved_unsynced(date).await?;
        Ok(SyncBatch { date, requests })
    }

    /// Record the downstream acknowledgement. Idempotent: a second ack for
    /// the same request reports `marked: false` and changes nothing.
    pub async fn acknowledge(&self, request_id: u64) -> AppResult<SyncAck> {
        let marked = self.requests.mark_synced(request_id).await?;
        if marked {
            info!(request_id, "request marked synced");
        }
        Ok(SyncAck { request_id, marked })
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;

//! Auto-cancellation of requests still Pending on their start date. Runs
//! once per day shortly after midnight; each stale request is flipped to
//! Cancelled first and its hold released in a separate step, so a failed
//! release never resurrects a cancelled request.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::service::transition::plan_sweep;
use crate::store::{LeaveStore, LedgerStore};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SweepSummary {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub examined: usize,
    pub cancelled: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

pub struct Sweeper {
    requests: Arc<dyn LeaveStore>,
    ledger: Arc<dyn LedgerStore>,
}

impl Sweeper {
    pub fn new(requests: Arc<dyn LeaveStore>, ledger: Arc<dyn LedgerStore>) -> Self {
        Self { requests, ledger }
    }

    /// Cancel every request still Pending whose leave starts on `date`.
    /// Failures are isolated per request; the sweep always finishes.
    pub async fn sweep(&self, date: NaiveDate) -> AppResult<SweepSummary> {
        let stale = self.requests.pending_starting_on(date).await?;
        let mut summary = SweepSummary {
            date,
            examined: stale.len(),
            cancelled: 0,
            failed: 0,
            errors: Vec::new(),
        };

        for req in stale {
            let change = plan_sweep(&req);
            match self.requests.apply_transition(req.id, &change).await {
                Ok(_) => {
                    summary.cancelled += 1;
                    if let Err(e) = self
                        .ledger
                        .release(req.employee_id, req.leave_type, req.requested_days(), req.id)
                        .await
                    {
                        // The request stays cancelled; the orphaned hold is
                        // visible in the ledger trail for manual release.
                        warn!(request_id = req.id, error = %e, "auto-cancel release failed");
                        summary.errors.push(format!("request {}: release failed: {e}", req.id));
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(request_id = req.id, error = %e, "auto-cancel failed");
                    summary.errors.push(format!("request {}: {e}", req.id));
                }
            }
        }

        info!(
            date = %summary.date,
            examined = summary.examined,
            cancelled = summary.cancelled,
            failed = summary.failed,
            "sweep finished"
        );
        Ok(summary)
    }
}

/// Sleep until the next `at` wall-clock time, sweep, repeat. Spawned once
/// at startup.
pub async fn run_daily(sweeper: Arc<Sweeper>, at: NaiveTime) {
    loop {
        let now = Local::now();
        let mut next = now.date_naive().and_time(at);
        if next <= now.naive_local() {
            next += chrono::Duration::days(1);
        }
        let wait = (next - now.naive_local())
            .to_std()
            .unwrap_or(Duration::from_secs(60));
        actix_web::rt::time::sleep(wait).await;

        let date = Local::now().date_naive();
        if let Err(e) = sweeper.sweep(date).await {
            error!(error = %e, "daily sweep aborted");
        }
    }
}

#[cfg(test)]
#[path = "sweeper_tests.rs"]
mod tests;

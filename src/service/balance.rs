//! Read-time balance derivation. Nothing here writes; snapshots are
//! folded from the allocation total and the ledger on every call.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use strum::IntoEnumIterator;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::model::balance::BalanceSnapshot;
use crate::model::leave_type::LeaveType;
use crate::model::policy::policy_for;
use crate::store::{AllocationSource, LedgerStore};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TypedBalance {
    pub leave_type: LeaveType,
    #[serde(flatten)]
    pub snapshot: BalanceSnapshot,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeBalances {
    pub employee_id: u64,
    pub balances: Vec<TypedBalance>,
}

pub struct BalanceCalculator {
    ledger: Arc<dyn LedgerStore>,
    allocations: Arc<dyn AllocationSource>,
}

impl BalanceCalculator {
    pub fn new(ledger: Arc<dyn LedgerStore>, allocations: Arc<dyn AllocationSource>) -> Self {
        Self { ledger, allocations }
    }

    /// Snapshot for one employee and leave type, overlay applied.
    pub async fn snapshot(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
    ) -> AppResult<BalanceSnapshot> {
        let accrued = self.allocations.allocated(employee_id, leave_type).await?;
        let totals = self.ledger.totals(employee_id, leave_type).await?;
        let snapshot = BalanceSnapshot::derive(accrued, totals.held, totals.committed);

        match &policy_for(leave_type).overlay {
            Some(overlay) => {
                let source = self.ledger.totals(employee_id, overlay.source).await?;
                let debit = (source.held + source.committed) * overlay.factor;
                Ok(snapshot.with_overlay_debit(debit))
            }
            None => Ok(snapshot),
        }
    }

    /// Snapshots across every leave type, in enum declaration order.
    pub async fn snapshot_all(&self, employee_id: u64) -> AppResult<EmployeeBalances> {
        // Totals are fetched once per type so the Half Pay overlay reuses
        // the Commuted numbers instead of re-querying the ledger.
        let mut totals = HashMap::new();
        for leave_type in LeaveType::iter() {
            totals.insert(leave_type, self.ledger.totals(employee_id, leave_type).await?);
        }

        let mut balances = Vec::new();
        for leave_type in LeaveType::iter() {
            let accrued = self.allocations.allocated(employee_id, leave_type).await?;
            let t = &totals[&leave_type];
            let mut snapshot = BalanceSnapshot::derive(accrued, t.held, t.committed);
            if let Some(overlay) = &policy_for(leave_type).overlay {
                let source = &totals[&overlay.source];
                snapshot =
                    snapshot.with_overlay_debit((source.held + source.committed) * overlay.factor);
            }
            balances.push(TypedBalance { leave_type, snapshot });
        }

        Ok(EmployeeBalances { employee_id, balances })
    }
}

#[cfg(test)]
#[path = "balance_tests.rs"]
mod tests;

use serde::Serialize;
use utoipa::ToSchema;

/// Point-in-time balance for one employee + leave type. Derived on demand,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct BalanceSnapshot {
    #[schema(example = 12.0)]
    pub accrued: f64,
    #[schema(example = 3.0)]
    pub held: f64,
    #[schema(example = 0.0)]
    pub committed: f64,
    #[schema(example = 9.0)]
    pub available: f64,
}

impl BalanceSnapshot {
    pub fn derive(accrued: f64, held: f64, committed: f64) -> Self {
        let held = held.max(0.0);
        let committed = committed.max(0.0);
        let available = (accrued - committed - held).max(0.0);
        BalanceSnapshot {
            accrued: round2(accrued),
            held: round2(held),
            committed: round2(committed),
            available: round2(available),
        }
    }

    /// Reduce `available` by a read-time policy debit, floored at zero.
    pub fn with_overlay_debit(mut self, debit: f64) -> Self {
        self.available = round2((self.available - debit.max(0.0)).max(0.0));
        self
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::model::leave_type::LeaveType;

/// Cross-type read-time debit: when reporting a snapshot, `available` is
/// reduced by `factor * (held + committed)` of `source`. Never written to
/// the ledger.
#[derive(Debug, Clone, Copy)]
pub struct OverlayDebit {
    pub source: LeaveType,
    pub factor: f64,
}

/// Per-type workflow policy. Submission rules branch on these flags, not
/// on the leave type name.
#[derive(Debug, Clone, Copy)]
pub struct LeaveTypePolicy {
    pub leave_type: LeaveType,
    /// Skip the availability check at submission.
    pub balance_exempt: bool,
    /// Permit a from-date in the past.
    pub allow_backdated: bool,
    pub overlay: Option<OverlayDebit>,
}

impl LeaveTypePolicy {
    const fn plain(leave_type: LeaveType) -> Self {
        LeaveTypePolicy {
            leave_type,
            balance_exempt: false,
            allow_backdated: false,
            overlay: None,
        }
    }
}

static POLICIES: Lazy<HashMap<LeaveType, LeaveTypePolicy>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for policy in [
        LeaveTypePolicy::plain(LeaveType::Casual),
        LeaveTypePolicy::plain(LeaveType::Earned),
        LeaveTypePolicy {
            leave_type: LeaveType::HalfPay,
            balance_exempt: false,
            allow_backdated: false,
            // Half-pay entitlement is consumed double by commuted leave.
            overlay: Some(OverlayDebit {
                source: LeaveType::Commuted,
                factor: 2.0,
            }),
        },
        LeaveTypePolicy::plain(LeaveType::Commuted),
        LeaveTypePolicy {
            leave_type: LeaveType::Medical,
            balance_exempt: true,
            allow_backdated: true,
            overlay: None,
        },
        LeaveTypePolicy::plain(LeaveType::Special),
        LeaveTypePolicy::plain(LeaveType::ChildCare),
        LeaveTypePolicy::plain(LeaveType::Parental),
    ] {
        map.insert(policy.leave_type, policy);
    }
    map
});

pub fn policy_for(leave_type: LeaveType) -> &'static LeaveTypePolicy {
    // Every variant is seeded above.
    &POLICIES[&leave_type]
}

use super::*;
use crate::store::memory::{MemoryAllocations, MemoryStore};

fn calculator() -> (Arc<MemoryStore>, Arc<MemoryAllocations>, BalanceCalculator) {
    let store = Arc::new(MemoryStore::new());
    let allocations = Arc::new(MemoryAllocations::new());
    let calc = BalanceCalculator::new(store.clone(), allocations.clone());
    (store, allocations, calc)
}

#[actix_web::test]
async fn snapshot_subtracts_held_and_committed() {
    let (store, allocations, calc) = calculator();
    allocations.set(1, LeaveType::Casual, 12.0);
    store.hold(1, LeaveType::Casual, 3.0, 100).await.unwrap();
    store.hold(1, LeaveType::Casual, 2.0, 101).await.unwrap();
    store.commit(1, LeaveType::Casual, 2.0, 101).await.unwrap();

    let snap = calc.snapshot(1, LeaveType::Casual).await.unwrap();
    assert_eq!(snap.accrued, 12.0);
    assert_eq!(snap.held, 3.0);
    assert_eq!(snap.committed, 2.0);
    assert_eq!(snap.available, 7.0);
}

#[actix_web::test]
async fn unallocated_type_reads_as_zero() {
    let (_, _, calc) = calculator();
    let snap = calc.snapshot(1, LeaveType::Special).await.unwrap();
    assert_eq!(snap.accrued, 0.0);
    assert_eq!(snap.available, 0.0);
}

#[actix_web::test]
async fn released_days_return_to_the_pool() {
    let (store, allocations, calc) = calculator();
    allocations.set(1, LeaveType::Earned, 10.0);
    store.hold(1, LeaveType::Earned, 4.0, 100).await.unwrap();
    store.release(1, LeaveType::Earned, 4.0, 100).await.unwrap();

    let snap = calc.snapshot(1, LeaveType::Earned).await.unwrap();
    assert_eq!(snap.held, 0.0);
    assert_eq!(snap.available, 10.0);
}

#[actix_web::test]
async fn half_pay_availability_is_debited_by_commuted_usage() {
    let (store, allocations, calc) = calculator();
    allocations.set(1, LeaveType::HalfPay, 20.0);
    allocations.set(1, LeaveType::Commuted, 10.0);

    // 3 commuted days held debits half pay by 6.
    store.hold(1, LeaveType::Commuted, 3.0, 100).await.unwrap();

    let half_pay = calc.snapshot(1, LeaveType::HalfPay).await.unwrap();
    assert_eq!(half_pay.held, 0.0);
    assert_eq!(half_pay.available, 14.0);

    // The commuted pool itself is only debited 1x.
    let commuted = calc.snapshot(1, LeaveType::Commuted).await.unwrap();
    assert_eq!(commuted.available, 7.0);
}

#[actix_web::test]
async fn overlay_debit_floors_at_zero() {
    let (store, allocations, calc) = calculator();
    allocations.set(1, LeaveType::HalfPay, 4.0);
    store.hold(1, LeaveType::Commuted, 5.0, 100).await.unwrap();
    store.commit(1, LeaveType::Commuted, 5.0, 100).await.unwrap();

    let snap = calc.snapshot(1, LeaveType::HalfPay).await.unwrap();
    assert_eq!(snap.available, 0.0);
}

#[actix_web::test]
async fn snapshot_all_covers_every_type_in_order() {
    let (_, allocations, calc) = calculator();
    allocations.set(1, LeaveType::Casual, 10.0);

    let all = calc.snapshot_all(1).await.unwrap();
    assert_eq!(all.employee_id, 1);
    assert_eq!(all.balances.len(), LeaveType::iter().count());
    assert_eq!(all.balances[0].leave_type, LeaveType::Casual);
    assert_eq!(all.balances[0].snapshot.available, 10.0);
}

use actix_web::{HttpResponse, Responder, web};

use crate::error::AppResult;
use crate::model::leave_type::LeaveType;
use crate::service::balance::BalanceCalculator;

/// Balance snapshots across every leave type
#[utoipa::path(
    get,
    path = "/api/balance/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee whose balances to derive")
    ),
    responses(
        (status = 200, description = "Per-type snapshots", body = crate::service::balance::EmployeeBalances)
    ),
    tag = "Balance"
)]
pub async fn all_balances(
    calculator: web::Data<BalanceCalculator>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    let balances = calculator.snapshot_all(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(balances))
}

/// Snapshot for one leave type
#[utoipa::path(
    get,
    path = "/api/balance/{employee_id}/{leave_type}",
    params(
        ("employee_id" = u64, Path, description = "Employee whose balance to derive"),
        ("leave_type" = LeaveType, Path, description = "Leave type, e.g. \"Casual Leave\"")
    ),
    responses(
        (status = 200, description = "Balance snapshot", body = crate::model::balance::BalanceSnapshot)
    ),
    tag = "Balance"
)]
pub async fn one_balance(
    calculator: web::Data<BalanceCalculator>,
    path: web::Path<(u64, LeaveType)>,
) -> AppResult<impl Responder> {
    let (employee_id, leave_type) = path.into_inner();
    let snapshot = calculator.snapshot(employee_id, leave_type).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

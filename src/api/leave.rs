use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppResult;
use crate::service::leave::{CancelLeave, DecideLeave, LeaveService, SubmitLeave};

#[derive(Deserialize, IntoParams)]
pub struct ViewerQuery {
    #[param(example = 12199)]
    /// Employee id of the caller, used to annotate actionability
    pub viewer_id: Option<u64>,
}

/* =========================
Submit leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = SubmitLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "message": "Insufficient balance: 2 day(s) available, 3 requested"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Leave"
)]
pub async fn submit_leave(
    service: web::Data<LeaveService>,
    payload: web::Json<SubmitLeave>,
) -> AppResult<impl Responder> {
    let created = service.submit(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(created))
}

/* =========================
Approve / reject at the caller's level
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/decision",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to decide")
    ),
    request_body(content = DecideLeave, content_type = "application/json"),
    responses(
        (status = 200, description = "Decision applied", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Request already processed at this level"),
        (status = 403, description = "Caller is not a designated approver"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn decide_leave(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    payload: web::Json<DecideLeave>,
) -> AppResult<impl Responder> {
    let updated = service.decide(path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/* =========================
Cancel a future-dated request
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/cancel",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    request_body(content = CancelLeave, content_type = "application/json"),
    responses(
        (status = 200, description = "Request cancelled", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Request already terminal or leave already started"),
        (status = 403, description = "Caller may not cancel this request"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    payload: web::Json<CancelLeave>,
) -> AppResult<impl Responder> {
    let updated = service.cancel(path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Request detail with remark timeline and ledger trail
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch"),
        ViewerQuery
    ),
    responses(
        (status = 200, description = "Leave request found", body = crate::service::leave::LeaveRequestDetail),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request 42 not found"
        }))
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    query: web::Query<ViewerQuery>,
) -> AppResult<impl Responder> {
    let detail = service
        .detail(path.into_inner(), query.viewer_id.unwrap_or(0))
        .await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// One employee's requests, newest first
#[utoipa::path(
    get,
    path = "/api/leave/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee whose requests to list"),
        ViewerQuery
    ),
    responses(
        (status = 200, description = "Request list", body = Vec<crate::service::leave::LeaveRequestView>)
    ),
    tag = "Leave"
)]
pub async fn employee_leaves(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    query: web::Query<ViewerQuery>,
) -> AppResult<impl Responder> {
    let employee_id = path.into_inner();
    let viewer = query.viewer_id.unwrap_or(employee_id);
    let views = service.requests_of(employee_id, viewer).await?;
    Ok(HttpResponse::Ok().json(views))
}

/// Approver inbox: requests on which the caller is L1 or L2
#[utoipa::path(
    get,
    path = "/api/leave/approvals/{approver_id}",
    params(
        ("approver_id" = u64, Path, description = "Approver employee id")
    ),
    responses(
        (status = 200, description = "Request list annotated with can_act", body = Vec<crate::service::leave::LeaveRequestView>)
    ),
    tag = "Leave"
)]
pub async fn approver_inbox(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    let views = service.approvals_for(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(views))
}

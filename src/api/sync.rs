use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppResult;
use crate::service::sync::SyncGateway;

#[derive(Deserialize, IntoParams)]
pub struct SyncDateQuery {
    #[param(example = "2026-09-01", value_type = Option<String>, format = "date")]
    /// Leave start date to collect; defaults to today
    pub date: Option<NaiveDate>,
}

/// Approved requests not yet pushed to payroll
#[utoipa::path(
    get,
    path = "/api/sync/pending",
    params(SyncDateQuery),
    responses(
        (status = 200, description = "Unsynced approved requests", body = crate::service::sync::SyncBatch)
    ),
    tag = "Sync"
)]
pub async fn pending_sync(
    gateway: web::Data<SyncGateway>,
    query: web::Query<SyncDateQuery>,
) -> AppResult<impl Responder> {
    let date = query
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let batch = gateway.pending_batch(date).await?;
    Ok(HttpResponse::Ok().json(batch))
}

/// Acknowledge a downstream sync of one request
#[utoipa::path(
    put,
    path = "/api/sync/{leave_id}/ack",
    params(
        ("leave_id" = u64, Path, description = "ID of the synced leave request")
    ),
    responses(
        (status = 200, description = "Marker stamped (marked=false when already synced)", body = crate::service::sync::SyncAck),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Sync"
)]
pub async fn ack_sync(
    gateway: web::Data<SyncGateway>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    let ack = gateway.acknowledge(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ack))
}

use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppResult;
use crate::service::sweeper::Sweeper;

#[derive(Deserialize, IntoParams)]
pub struct SweepQuery {
    #[param(example = "2026-09-01", value_type = Option<String>, format = "date")]
    /// Start date to sweep; defaults to today
    pub date: Option<NaiveDate>,
}

/// Manually trigger the auto-cancel sweep (normally runs daily at 00:01)
#[utoipa::path(
    post,
    path = "/api/sweep",
    params(SweepQuery),
    responses(
        (status = 200, description = "Sweep summary", body = crate::service::sweeper::SweepSummary)
    ),
    tag = "Sweep"
)]
pub async fn run_sweep(
    sweeper: web::Data<Sweeper>,
    query: web::Query<SweepQuery>,
) -> AppResult<impl Responder> {
    let date = query
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let summary = sweeper.sweep(date).await?;
    Ok(HttpResponse::Ok().json(summary))
}

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use chrono::NaiveTime;
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::service::balance::BalanceCalculator;
use crate::service::leave::LeaveService;
use crate::service::sweeper::{self, Sweeper};
use crate::service::sync::SyncGateway;
use crate::store::mysql::MysqlStore;
use crate::store::{AllocationSource, EmployeeDirectory, LeaveStore, LedgerStore};
use crate::utils::profile_cache;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "LeaveDesk"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let mysql = Arc::new(MysqlStore::new(pool.clone()));
    let requests: Arc<dyn LeaveStore> = mysql.clone();
    let ledger: Arc<dyn LedgerStore> = mysql.clone();
    let allocations: Arc<dyn AllocationSource> = mysql.clone();
    let directory: Arc<dyn EmployeeDirectory> =
        Arc::new(profile_cache::CachedDirectory::new(mysql.clone()));

    let balances = Arc::new(BalanceCalculator::new(ledger.clone(), allocations));
    let leave_service = Arc::new(LeaveService::new(
        requests.clone(),
        ledger.clone(),
        directory,
        balances.clone(),
    ));
    let sweeper_svc = Arc::new(Sweeper::new(requests.clone(), ledger));
    let sync_gateway = Arc::new(SyncGateway::new(requests));

    let pool_for_cache_warmup = pool.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = profile_cache::warmup_profile_cache(&pool_for_cache_warmup, 250).await {
            eprintln!("Failed to warmup profile cache: {:?}", e);
        }
    });

    // Daily auto-cancel pass, default 00:01
    let sweep_at = NaiveTime::from_hms_opt(config.sweep_hour, config.sweep_minute, 0)
        .expect("SWEEP_HOUR/SWEEP_MINUTE out of range");
    actix_web::rt::spawn(sweeper::run_daily(sweeper_svc.clone(), sweep_at));

    let server_addr = config.server_addr.clone();
    let api_prefix = config.api_prefix.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::from(leave_service.clone()))
            .app_data(Data::from(balances.clone()))
            .app_data(Data::from(sweeper_svc.clone()))
            .app_data(Data::from(sync_gateway.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, &api_prefix))
    })
    .bind(server_addr)?
    .run()
    .await
}

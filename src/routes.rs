use crate::api::{balance, leave, sweeper, sync};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str) {
    cfg.service(
        web::scope(api_prefix)
            .service(
                web::scope("/leave")
                    // /leave
                    .service(web::resource("").route(web::post().to(leave::submit_leave)))
                    // /leave/employee/{employee_id}
                    .service(
                        web::resource("/employee/{employee_id}")
                            .route(web::get().to(leave::employee_leaves)),
                    )
                    // /leave/approvals/{approver_id}
                    .service(
                        web::resource("/approvals/{approver_id}")
                            .route(web::get().to(leave::approver_inbox)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave::get_leave)))
                    // /leave/{id}/decision
                    .service(
                        web::resource("/{id}/decision")
                            .route(web::put().to(leave::decide_leave)),
                    )
                    // /leave/{id}/cancel
                    .service(
                        web::resource("/{id}/cancel").route(web::put().to(leave::cancel_leave)),
                    ),
            )
            .service(
                web::scope("/balance")
                    // /balance/{employee_id}
                    .service(
                        web::resource("/{employee_id}").route(web::get().to(balance::all_balances)),
                    )
                    // /balance/{employee_id}/{leave_type}
                    .service(
                        web::resource("/{employee_id}/{leave_type}")
                            .route(web::get().to(balance::one_balance)),
                    ),
            )
            .service(
                web::scope("/sync")
                    .service(web::resource("/pending").route(web::get().to(sync::pending_sync)))
                    .service(web::resource("/{id}/ack").route(web::put().to(sync::ack_sync))),
            )
            .service(web::resource("/sweep").route(web::post().to(sweeper::run_sweep))),
    );
}

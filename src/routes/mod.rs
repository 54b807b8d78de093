// Route exports
pub mod blacklist;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthz", web::get().to(blacklist::health_check))
        .route("/metrics", web::get().to(blacklist::metrics))
        .service(
            web::scope("/api/v1")
                .configure(blacklist::configure),
        );
}

use crate::handlers;
use actix_web::{http::Method, web, Scope};

pub fn config() -> Scope {
    web::scope("/api")
        .route("/health", web::get().to(handlers::health_check))
        .route("/ask", web::post().to(handlers::ask))
        .route("/ask", web::method(Method::OPTIONS).to(handlers::ask))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(config())
        .route("/invoke", web::post().to(handlers::invoke));
}

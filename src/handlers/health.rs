use actix_web::{web, HttpResponse, Result};

use crate::models::{ErrorResponse, HealthResponse, SourceKind};
use crate::AppState;

pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let retriever = state.answer_service.retriever();

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        web_search: retriever.has_provider(SourceKind::Web),
        news_search: retriever.has_provider(SourceKind::News),
        model: state.answer_service.model_id(),
    }))
}

pub async fn not_found() -> Result<HttpResponse> {
    Ok(HttpResponse::NotFound().json(ErrorResponse::new(
        "Endpoint not found"
    )))
}

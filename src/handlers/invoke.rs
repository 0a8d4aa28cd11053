use actix_web::{web, HttpResponse, Result};
use serde_json::Value;

use crate::models::{ApiEvent, ErrorResponse};
use crate::AppState;

/// Returns the gateway envelope itself rather than an HTTP rendering of it.
pub async fn invoke(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse> {
    let event = match serde_json::from_slice::<Value>(&body) {
        Ok(value) if value.is_object() => ApiEvent::from_gateway(&value),
        Ok(_) => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(
                "Event must be a JSON object",
            )))
        }
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::with_details(
                "Invalid event",
                e.to_string(),
            )))
        }
    };

    let response = state.answer_service.handle(&event).await;
    Ok(HttpResponse::Ok().json(response))
}

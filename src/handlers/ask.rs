use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, Result};

use crate::models::{ApiEvent, ApiResponse};
use crate::AppState;

pub async fn ask(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let event = event_from_request(&http_req, &body);
    let response = state.answer_service.handle(&event).await;
    Ok(into_http_response(response))
}

pub fn event_from_request(http_req: &HttpRequest, body: &[u8]) -> ApiEvent {
    let mut event = ApiEvent::new(http_req.method().as_str());
    for (name, value) in http_req.headers() {
        if let Ok(value) = value.to_str() {
            event = event.with_header(name.as_str(), value);
        }
    }
    if !body.is_empty() {
        event = event.with_body(String::from_utf8_lossy(body));
    }
    event
}

pub fn into_http_response(response: ApiResponse) -> HttpResponse {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = HttpResponse::build(status);
    for (name, value) in &response.headers {
        builder.insert_header((name.as_str(), value.as_str()));
    }
    builder.body(response.body)
}

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::AppState;

pub async fn health_check(data: web::Data<AppState>) -> HttpResponse {
    let uptime_seconds = data.start_time.elapsed().as_secs();

    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

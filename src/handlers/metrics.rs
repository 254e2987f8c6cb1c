use actix_web::HttpResponse;

use crate::services::metrics::get_metrics;

pub async fn metrics_handler() -> HttpResponse {
    match get_metrics().await {
        Some(metrics) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4; charset=utf-8")
            .body(metrics.render().await),
        None => HttpResponse::ServiceUnavailable()
            .body("Metrics not initialized"),
    }
}

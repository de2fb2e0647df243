use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use log::error;
use serde_json::json;

use crate::store::Store;

/// Health check endpoint
///
/// Reports whether the store answers, with the current timestamp.
/// Returns 503 when it does not.
#[get("/health")]
pub async fn health(store: web::Data<dyn Store>) -> HttpResponse {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "store": "up",
            "timestamp": Utc::now()
        })),
        Err(e) => {
            error!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unavailable",
                "store": "down",
                "timestamp": Utc::now()
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use actix_web::test;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_health_endpoint() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let app = test::init_service(
            actix_web::App::new()
                .app_data(web::Data::from(store))
                .service(health),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["store"], "up");
        assert!(json["timestamp"].is_string());
    }
}

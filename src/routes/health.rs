use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

/// Health check endpoint
///
/// Reports the API version and whether the store answers. A failing store
/// turns the response into a 503 so load balancers take the instance out.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let (status, database) = match state.store.ping().await {
        Ok(()) => ("ok", "connected"),
        Err(err) => {
            log::error!("health check failed: {}", err);
            ("degraded", "unavailable")
        }
    };
    let body = json!({
        "status": status,
        "message": "Task API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "timestamp": Utc::now()
    });
    if status == "ok" {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenService;
    use crate::store::MemoryStore;
    use actix_web::test;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_health_endpoint() {
        let tokens = TokenService::new("secret", chrono::Duration::hours(1), "iss", "aud");
        let state = AppState::new(Arc::new(MemoryStore::new()), tokens, 4);
        let app = test::init_service(
            actix_web::App::new()
                .app_data(web::Data::new(state))
                .service(health),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"], "connected");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert!(json["timestamp"].is_string());
    }
}

//! HTTP adapters - REST API implementations.
//!
//! Each area has its own router; `api_router` merges them behind the bearer
//! token authentication layer.

pub mod codes;
pub mod deals;
pub mod error;
pub mod middleware;
pub mod reporting;
pub mod state;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

pub use codes::codes_router;
pub use deals::deals_router;
pub use error::ErrorResponse;
pub use reporting::reporting_router;
pub use state::AppState;

/// GET /health - Liveness probe
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the full API router with state applied.
pub fn api_router(state: AppState) -> Router {
    let auth_state = middleware::AuthState {
        sessions: state.sessions.clone(),
        salons: state.salons.clone(),
    };
    let auth_layer =
        axum::middleware::from_fn_with_state(auth_state, middleware::salon_auth_middleware);

    Router::new()
        .merge(codes_router())
        .merge(deals_router())
        .merge(reporting_router())
        .layer(auth_layer)
        .route("/health", get(health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::state::test_support::{test_app, TestApp};
    use crate::domain::foundation::SalonId;
    use crate::domain::salon::Salon;
    use crate::ports::SalonRepository;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    struct Caller {
        app: TestApp,
        owner: String,
        admin: String,
    }

    async fn caller() -> Caller {
        let app = test_app();
        let owner = Salon::new_partner(SalonId::new(), "Klippet", "hej@klippet.se");
        let admin = Salon::new_admin(SalonId::new(), "Admin", "admin@example.se");
        SalonRepository::save(app.store.as_ref(), &owner).await.unwrap();
        SalonRepository::save(app.store.as_ref(), &admin).await.unwrap();
        let (owner, admin) = (app.bearer_for(owner.id), app.bearer_for(admin.id));
        Caller { app, owner, admin }
    }

    fn request(method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(bearer) = bearer {
            builder = builder.header(header::AUTHORIZATION, bearer);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn call(app: &TestApp, request: Request<Body>) -> (StatusCode, String) {
        let response = api_router(app.state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn deal_body(title: &str) -> Value {
        json!({
            "title": title,
            "description": "Klippning och styling",
            "original_price": 800,
            "discounted_price": 400,
            "category": "har",
            "city": "Stockholm",
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let c = caller().await;

        let (status, body) = call(&c.app, request("GET", "/health", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ok"));
    }

    #[tokio::test]
    async fn deal_lifecycle_from_creation_to_redemption() {
        let c = caller().await;

        // Create, pending review
        let (status, body) = call(
            &c.app,
            request("POST", "/api/deals", Some(c.owner.as_str()), Some(deal_body("Klippning"))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let deal: Value = serde_json::from_str(&body).unwrap();
        let id = deal["id"].as_str().unwrap().to_string();
        assert_eq!(deal["approval"], "pending");

        // Unpublished deals are hidden from the public
        let (status, _) = call(&c.app, request("GET", &format!("/api/deals/{}", id), None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Only admins review
        let review = json!({ "decision": "approve" });
        let uri = format!("/api/admin/deals/{}/review", id);
        let (status, _) = call(&c.app, request("POST", &uri, Some(c.owner.as_str()), Some(review.clone()))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(&c.app, request("POST", &uri, Some(c.admin.as_str()), Some(review))).await;
        assert_eq!(status, StatusCode::OK);

        // Fill the pool and redeem
        let (status, body) = call(
            &c.app,
            request(
                "POST",
                &format!("/api/deals/{}/codes", id),
                Some(c.owner.as_str()),
                Some(json!({ "quantity": 3 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.contains("\"generated\":3"));

        let (status, body) = call(
            &c.app,
            request(
                "POST",
                &format!("/api/deals/{}/redeem", id),
                None,
                Some(json!({ "name": "Anna", "email": "anna@example.se", "phone": "0701234567" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.contains("\"code\""));

        // Stats reflect the redemption
        let (status, body) = call(
            &c.app,
            request("GET", &format!("/api/deals/{}/codes/stats", id), Some(c.owner.as_str()), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let stats: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(stats["total"], 3);
        assert_eq!(stats["used"], 1);
        assert_eq!(stats["unused"], 2);

        // Deals with codes cannot be deleted
        let (status, _) = call(
            &c.app,
            request("DELETE", &format!("/api/deals/{}", id), Some(c.owner.as_str()), None),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn token_for_unknown_salon_is_unauthorized() {
        let c = caller().await;
        let stranger = c.app.bearer_for(SalonId::new());

        let (status, _) = call(
            &c.app,
            request("GET", "/api/salons/me/deals", Some(stranger.as_str()), None),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn salon_id_header_grants_nothing() {
        let c = caller().await;
        let salon = Salon::new_partner(SalonId::new(), "Klippet 2", "x@example.se");
        SalonRepository::save(c.app.store.as_ref(), &salon).await.unwrap();

        let forged = Request::builder()
            .method("GET")
            .uri("/api/salons/me/deals")
            .header("X-Salon-Id", salon.id.to_string())
            .body(Body::empty())
            .unwrap();
        let (status, _) = call(&c.app, forged).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn concurrent_generation_conflicts_while_the_job_is_held() {
        use crate::domain::codes::GENERATION_LEASE_SECS;
        use crate::domain::deal::test_support::approved_deal;
        use crate::domain::foundation::Timestamp;
        use crate::ports::{DealRepository, DiscountCodeRepository};

        let c = caller().await;
        let owner = Salon::new_partner(SalonId::new(), "Fransar", "hej@fransar.se");
        SalonRepository::save(c.app.store.as_ref(), &owner).await.unwrap();
        let deal = approved_deal(owner.id);
        DealRepository::save(c.app.store.as_ref(), &deal).await.unwrap();
        let now = Timestamp::now();
        c.app
            .store
            .start_generation(&deal.id, 5, now, now.plus_secs(GENERATION_LEASE_SECS))
            .await
            .unwrap();

        let bearer = c.app.bearer_for(owner.id);
        let (status, body) = call(
            &c.app,
            request(
                "POST",
                &format!("/api/deals/{}/codes", deal.id),
                Some(bearer.as_str()),
                Some(json!({ "quantity": 5 })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("GENERATION_IN_PROGRESS"));
    }

    #[tokio::test]
    async fn collaboration_export_is_admin_only_csv() {
        let c = caller().await;
        let uri = "/api/admin/collaborations/export?date=2024-03-05";

        let (forbidden, _) = call(&c.app, request("GET", uri, Some(c.owner.as_str()), None)).await;
        assert_eq!(forbidden, StatusCode::FORBIDDEN);

        let response = api_router(c.app.state.clone())
            .oneshot(request("GET", uri, Some(c.admin.as_str()), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"aktiva-samarbeten-2024-03-05.csv\""
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8(bytes.to_vec())
            .unwrap()
            .starts_with("ID,Rabattkod,Skapad"));
    }
}

//! Salon authentication middleware and extractors for axum.
//!
//! This module provides:
//! - `salon_auth_middleware` - Layer that turns a bearer token into a `Salon`
//! - `RequireSalon` - Extractor that requires a resolved salon
//! - `OptionalSalon` - Extractor for public routes that behave differently for owners
//!
//! ```text
//! Request → salon_auth_middleware → SessionValidator → SalonRepository
//!                  ↓
//!          injects Salon into extensions
//!                  ↓
//!          Handler → RequireSalon extractor reads from extensions
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::domain::foundation::AuthError;
use crate::domain::salon::Salon;
use crate::ports::{SalonRepository, SessionValidator};

/// Auth middleware state.
#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionValidator>,
    pub salons: Arc<dyn SalonRepository>,
}

/// Resolves the caller from the `Authorization: Bearer` header.
///
/// 1. No header: continue anonymously (storefront routes)
/// 2. Malformed, forged or expired token, or a subject that is not a known salon: 401
/// 3. Validator or salon lookup failure: 503
/// 4. Otherwise: inject `Salon` into request extensions
pub async fn salon_auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Ok(Some(token)) => token.to_string(),
        Ok(None) => return next.run(request).await,
        Err(rejection) => return rejection.into_response(),
    };

    let user = match auth.sessions.validate(&token).await {
        Ok(user) => user,
        Err(AuthError::TokenExpired) => return AuthRejection::TokenExpired.into_response(),
        Err(AuthError::InvalidToken) => return AuthRejection::InvalidToken.into_response(),
        Err(AuthError::ServiceUnavailable(reason)) => {
            tracing::error!(reason = %reason, "Token validation unavailable");
            return AuthRejection::Unavailable.into_response();
        }
    };

    let Ok(salon_id) = user.salon_id() else {
        tracing::warn!(subject = %user.subject, "Token subject is not a salon id");
        return AuthRejection::InvalidToken.into_response();
    };

    match auth.salons.find_by_id(&salon_id).await {
        Ok(Some(salon)) => {
            request.extensions_mut().insert(salon);
            next.run(request).await
        }
        Ok(None) => {
            tracing::warn!(salon_id = %salon_id, "Valid token for unknown salon");
            AuthRejection::InvalidToken.into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Salon lookup failed");
            AuthRejection::Unavailable.into_response()
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header, if any.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthRejection> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthRejection::InvalidToken)?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(Some(token.trim()))
        }
        _ => Err(AuthRejection::InvalidToken),
    }
}

/// Extractor that requires an identified salon.
#[derive(Debug, Clone)]
pub struct RequireSalon(pub Salon);

#[async_trait]
impl<S> FromRequestParts<S> for RequireSalon
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Salon>()
            .cloned()
            .map(RequireSalon)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Extractor for optional identification.
#[derive(Debug, Clone)]
pub struct OptionalSalon(pub Option<Salon>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalSalon
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalSalon(parts.extensions.get::<Salon>().cloned()))
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// No bearer token was sent.
    Unauthenticated,
    /// Token malformed, forged, or not for a known salon.
    InvalidToken,
    /// Token expired; the dashboard should refresh it.
    TokenExpired,
    /// Token validation or salon lookup failed.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required",
            ),
            AuthRejection::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Invalid access token")
            }
            AuthRejection::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", "Access token expired")
            }
            AuthRejection::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "INTERNAL_ERROR",
                "Authentication unavailable",
            ),
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::foundation::{AuthenticatedUser, SalonId};
    use axum::body::Body;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    async fn whoami(OptionalSalon(salon): OptionalSalon) -> String {
        salon.map(|s| s.name).unwrap_or_else(|| "anonymous".to_string())
    }

    struct Setup {
        router: Router,
        sessions: MockSessionValidator,
        salon: Salon,
    }

    async fn app() -> Setup {
        let store = Arc::new(InMemoryStore::new());
        let salon = Salon::new_partner(SalonId::new(), "Klipp & Form", "info@klipp.se");
        SalonRepository::save(store.as_ref(), &salon).await.unwrap();
        let sessions = MockSessionValidator::new();

        let state = AuthState {
            sessions: Arc::new(sessions.clone()),
            salons: store,
        };
        let router = Router::new()
            .route("/whoami", get(whoami))
            .layer(axum::middleware::from_fn_with_state(state, salon_auth_middleware));
        Setup {
            router,
            sessions,
            salon,
        }
    }

    fn request(authorization: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn valid_token_injects_its_salon() {
        let s = app().await;
        let token = s.sessions.token_for_salon(s.salon.id);

        let response = s
            .router
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Klipp & Form");
    }

    #[tokio::test]
    async fn missing_header_continues_anonymously() {
        let s = app().await;

        let response = s.router.oneshot(request(None)).await.unwrap();

        assert_eq!(body_text(response).await, "anonymous");
    }

    #[tokio::test]
    async fn bare_salon_id_is_not_an_identity() {
        let s = app().await;

        let as_bearer = s
            .router
            .clone()
            .oneshot(request(Some(&format!("Bearer {}", s.salon.id))))
            .await
            .unwrap();
        let forged_header = s
            .router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/whoami")
                    .header("X-Salon-Id", s.salon.id.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(as_bearer.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(forged_header).await, "anonymous");
    }

    #[tokio::test]
    async fn malformed_authorization_is_rejected() {
        let s = app().await;

        for value in ["Basic abc", "Bearer", "Bearer   "] {
            let response = s.router.clone().oneshot(request(Some(value))).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", value);
        }
    }

    #[tokio::test]
    async fn token_for_unknown_salon_is_rejected() {
        let s = app().await;
        let token = s.sessions.token_for_salon(SalonId::new());

        let response = s
            .router
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_salon_subject_is_rejected() {
        let s = app().await;
        s.sessions
            .add_token("t", AuthenticatedUser::new("user-123", None));

        let response = s.router.oneshot(request(Some("Bearer t"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_token_has_its_own_code() {
        let s = app().await;
        s.sessions.fail_with(AuthError::TokenExpired);

        let response = s.router.oneshot(request(Some("Bearer t"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("TOKEN_EXPIRED"));
    }

    #[tokio::test]
    async fn validator_outage_is_unavailable() {
        let s = app().await;
        s.sessions
            .fail_with(AuthError::service_unavailable("key store down"));

        let response = s.router.oneshot(request(Some("Bearer t"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn require_salon_fails_without_salon() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts();

        let result = RequireSalon::from_request_parts(&mut parts, &()).await;

        assert_eq!(result.unwrap_err(), AuthRejection::Unauthenticated);
    }

    #[test]
    fn auth_rejection_returns_401() {
        let response = AuthRejection::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

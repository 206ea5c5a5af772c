//! Router assembly: probe routes, account routes and the shared middleware stack

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::auth;
use super::health;
use super::middleware::{logging_middleware, security_headers_middleware, MAX_BODY_SIZE};
use super::state::AppState;
use super::user;

/// Probe-only router without state; `/ready` needs the full router
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .layer(TraceLayer::new_for_http())
}

/// Full application router
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/auth", auth::create_auth_router())
        .nest("/user", user::create_user_router())
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::domain::mail::{EmailMessage, Mailer};
    use crate::domain::DomainError;
    use crate::infrastructure::password_reset::InMemoryPasswordResetTokenRepository;
    use crate::infrastructure::user::{Argon2Hasher, InMemoryUserRepository};

    #[derive(Debug, Default)]
    struct CapturingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for CapturingMailer {
        async fn send_email(&self, message: &EmailMessage) -> Result<(), DomainError> {
            if self.fail {
                return Err(DomainError::delivery("relay unavailable"));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    impl CapturingMailer {
        /// Token from the most recent reset link
        fn last_token(&self) -> String {
            let sent = self.sent.lock().unwrap();
            let body = &sent.last().expect("a mail was sent").html_body;
            let start = body.find("?token=").unwrap() + "?token=".len();
            let end = body[start..].find('"').unwrap() + start;
            body[start..end].to_string()
        }
    }

    fn app_with(mailer: Arc<CapturingMailer>) -> Router {
        let state = crate::build_app_state(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPasswordResetTokenRepository::new()),
            Arc::new(Argon2Hasher::with_params(8, 1, 1).unwrap()),
            mailer,
            &AppConfig::default(),
        );
        create_router_with_state(state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        send_with_auth(app, method, uri, body, None).await
    }

    async fn send_with_auth(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
        bearer: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn signup_alice(app: &Router) {
        let response = send(
            app,
            "POST",
            "/user/signup",
            Some(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password1": "oldpass1",
                "password2": "oldpass1"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    async fn login(app: &Router, password: &str) -> Response {
        send(
            app,
            "POST",
            "/auth/login",
            Some(json!({ "username": "alice", "password": password })),
        )
        .await
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = app_with(Arc::default());

        assert_eq!(send(&app, "GET", "/health", None).await.status(), StatusCode::OK);
        assert_eq!(send(&app, "GET", "/live", None).await.status(), StatusCode::OK);

        let ready = send(&app, "GET", "/ready", None).await;
        assert_eq!(ready.status(), StatusCode::OK);
        assert_eq!(body_json(ready).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_probe_router_without_state() {
        let app = create_router();

        assert_eq!(send(&app, "GET", "/live", None).await.status(), StatusCode::OK);
        assert_eq!(send(&app, "GET", "/ready", None).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_response_carries_request_id_and_security_headers() {
        let app = app_with(Arc::default());

        let response = send(&app, "GET", "/health", None).await;

        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn test_signup_returns_user_without_hash() {
        let app = app_with(Arc::default());

        let response = send(
            &app,
            "POST",
            "/user/signup",
            Some(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password1": "oldpass1",
                "password2": "oldpass1"
            })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["username"], "alice");
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_signup_duplicate_conflicts() {
        let app = app_with(Arc::default());
        signup_alice(&app).await;

        let response = send(
            &app,
            "POST",
            "/user/signup",
            Some(json!({
                "username": "alice",
                "email": "other@example.com",
                "password1": "oldpass1",
                "password2": "oldpass1"
            })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_signup_missing_field_names_param() {
        let app = app_with(Arc::default());

        let response = send(
            &app,
            "POST",
            "/user/signup",
            Some(json!({
                "username": "",
                "email": "alice@example.com",
                "password1": "oldpass1",
                "password2": "oldpass1"
            })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["param"], "username");
    }

    #[tokio::test]
    async fn test_login_and_profile() {
        let app = app_with(Arc::default());
        signup_alice(&app).await;

        let response = login(&app, "oldpass1").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let token = body["token"].as_str().unwrap().to_string();
        assert!(body["expires_at"].is_string());

        let profile = send_with_auth(&app, "GET", "/user/profile", None, Some(&token)).await;
        assert_eq!(profile.status(), StatusCode::OK);
        assert_eq!(body_json(profile).await["email"], "alice@example.com");

        let logout = send_with_auth(&app, "POST", "/auth/logout", None, Some(&token)).await;
        assert_eq!(logout.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let app = app_with(Arc::default());
        signup_alice(&app).await;

        assert_eq!(login(&app, "wrong-pass").await.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_requires_session() {
        let app = app_with(Arc::default());

        let anonymous = send(&app, "GET", "/user/profile", None).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let forged = send_with_auth(&app, "GET", "/user/profile", None, Some("not.a.jwt")).await;
        assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let mailer = Arc::new(CapturingMailer::default());
        let app = app_with(Arc::clone(&mailer));
        signup_alice(&app).await;

        let requested = send(
            &app,
            "POST",
            "/user/reset_password",
            Some(json!({ "email": "alice@example.com" })),
        )
        .await;
        assert_eq!(requested.status(), StatusCode::ACCEPTED);
        let token = mailer.last_token();

        let confirmed = send(
            &app,
            "POST",
            "/user/reset_password_confirm",
            Some(json!({ "token": token, "password1": "newpass1", "password2": "newpass1" })),
        )
        .await;
        assert_eq!(confirmed.status(), StatusCode::OK);

        assert_eq!(login(&app, "oldpass1").await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(login(&app, "newpass1").await.status(), StatusCode::OK);

        let replayed = send(
            &app,
            "POST",
            "/user/reset_password_confirm",
            Some(json!({ "token": token, "password1": "newpass2", "password2": "newpass2" })),
        )
        .await;
        assert_eq!(replayed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(replayed).await["error"]["code"], "invalid_token");
    }

    #[tokio::test]
    async fn test_reset_confirm_mismatch_keeps_token() {
        let mailer = Arc::new(CapturingMailer::default());
        let app = app_with(Arc::clone(&mailer));
        signup_alice(&app).await;
        send(
            &app,
            "POST",
            "/user/reset_password",
            Some(json!({ "email": "alice@example.com" })),
        )
        .await;
        let token = mailer.last_token();

        let mismatch = send(
            &app,
            "POST",
            "/user/reset_password_confirm",
            Some(json!({ "token": token, "password1": "newpass1", "password2": "newpass2" })),
        )
        .await;
        assert_eq!(mismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(mismatch).await["error"]["code"], "validation_error");

        let retried = send(
            &app,
            "POST",
            "/user/reset_password_confirm",
            Some(json!({ "token": token, "password1": "newpass1", "password2": "newpass1" })),
        )
        .await;
        assert_eq!(retried.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reset_unknown_email_not_found() {
        let app = app_with(Arc::default());

        let response = send(
            &app,
            "POST",
            "/user/reset_password",
            Some(json!({ "email": "ghost@example.com" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "email_not_found");
    }

    #[tokio::test]
    async fn test_reset_delivery_failure_is_bad_gateway() {
        let mailer = Arc::new(CapturingMailer {
            sent: Mutex::new(Vec::new()),
            fail: true,
        });
        let app = app_with(mailer);
        signup_alice(&app).await;

        let response = send(
            &app,
            "POST",
            "/user/reset_password",
            Some(json!({ "email": "alice@example.com" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let app = app_with(Arc::default());

        let request = Request::builder()
            .method("POST")
            .uri("/user/reset_password")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "json_parse_error");
    }
}

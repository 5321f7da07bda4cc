use std::net::SocketAddr;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::response::{render, Outcome, Rendering};
use crate::state::AppState;
use crate::{courses, customers, forms, stats};

fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

/// Anything no handler claimed. The method decides first: only `GET` and
/// `POST` are served, so any other verb is 405 whatever the path, while a
/// served verb on a path that does not take it is an unknown endpoint.
/// `OPTIONS` is always answered.
pub async fn unmatched_request(method: Method) -> Response {
    let outcome = match method {
        Method::OPTIONS => Outcome::empty(StatusCode::OK),
        Method::GET | Method::POST => AppError::NotFound.into_outcome(false),
        _ => AppError::MethodNotAllowed.into_outcome(false),
    };
    render(outcome, Rendering::Json)
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(stats::router())
        .merge(courses::router())
        .merge(customers::router())
        .merge(forms::router())
        .route("/health", get(|| async { "ok" }).fallback(unmatched_request))
        .fallback(unmatched_request)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let request_id = req
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-")
                        .to_string();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        request_id = %request_id,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
        .layer(PropagateRequestIdLayer::new(request_id_header()))
        .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {},
                    _ = tokio::signal::ctrl_c() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable; waiting for ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("shutting down gracefully");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customers::repo_types::{Gender, NewUser, UserStatus};
    use crate::memory::MemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, String) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_of(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    fn ann() -> Value {
        json!({ "name": "Ann Lee", "email": "ann@x.com", "gender": "female", "phone": "555-1" })
    }

    #[tokio::test]
    async fn end_to_end_scenario() {
        let app = build_app(AppState::fake());

        let (status, body) = call(&app, post_json("/register", ann())).await;
        assert_eq!(status, StatusCode::CREATED);
        let created = json_of(&body);
        assert!(created["user_id"].as_i64().unwrap() > 0);
        assert_eq!(created["message"], "User registered successfully");
        assert_eq!(created["name"], "Ann Lee");
        assert_eq!(created["email"], "ann@x.com");

        let (status, body) = call(&app, post_json("/register", ann())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json_of(&body)["error"], "Email already registered");

        let (status, body) = call(&app, get("/courses")).await;
        assert_eq!(status, StatusCode::OK);
        let courses = json_of(&body);
        assert_eq!(courses["total_courses"], 3);
        assert_eq!(courses["courses"].as_array().unwrap().len(), 3);

        let (status, body) = call(&app, post_json("/login", json!({ "name": "Ann Lee" }))).await;
        assert_eq!(status, StatusCode::OK);
        let logged_in = json_of(&body);
        assert_eq!(logged_in["message"], "Login successful");
        assert_eq!(logged_in["user"]["email"], "ann@x.com");
        assert_eq!(logged_in["user"]["id"], created["user_id"]);
        assert!(logged_in["user"]["created_at"].is_string());

        let (status, body) = call(&app, post_json("/login", json!({ "name": "Nobody" }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json_of(&body)["error"], "User not found");
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_without_store_calls() {
        let store = MemoryStore::default();
        let app = build_app(AppState::fake_with(store.clone()));
        for field in ["name", "email", "gender", "phone"] {
            let mut body = ann();
            body.as_object_mut().unwrap().remove(field);
            let (status, resp) = call(&app, post_json("/register", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json_of(&resp)["error"], format!("{field} is required"));
        }
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = build_app(AppState::fake());
        let req = Request::builder()
            .method(Method::POST)
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = call(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_of(&body)["error"].is_string());
    }

    #[tokio::test]
    async fn login_rejects_short_names_and_inactive_users() {
        let store = MemoryStore::default();
        store.push_user(
            NewUser {
                name: "Gone User".into(),
                gender: Gender::Male,
                email: "gone@x.com".into(),
                phone: "1".into(),
            },
            UserStatus::Inactive,
        );
        let app = build_app(AppState::fake_with(store));

        let (status, _) = call(&app, post_json("/login", json!({ "name": "A" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, post_json("/login", json!({ "name": "Gone User" }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn stats_reports_counts_and_platform() {
        let store = MemoryStore::default().with_progress(&[50.0, 75.0]);
        let app = build_app(AppState::fake_with(store));
        call(&app, post_json("/register", ann())).await;

        let (status, body) = call(&app, get("/stats")).await;
        assert_eq!(status, StatusCode::OK);
        let stats = json_of(&body);
        assert_eq!(stats["total_users"], 1);
        assert_eq!(stats["total_enrollments"], 2);
        assert_eq!(stats["average_progress"], 62.5);
        assert_eq!(stats["platform"], "Aviz Academy");
        assert_eq!(stats["instructor"], "Avinash Reddy Thipparthi");
    }

    #[tokio::test]
    async fn stats_store_failure_is_generic_500() {
        let app = build_app(AppState::fake_with(MemoryStore::default().failing()));
        let (status, body) = call(&app, get("/stats")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_of(&body)["error"], "Failed to fetch stats");
    }

    #[tokio::test]
    async fn unknown_path_is_404_json() {
        let app = build_app(AppState::fake());
        let (status, body) = call(&app, get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_of(&body)["error"], "Endpoint not found");
    }

    #[tokio::test]
    async fn unserved_methods_are_405_anywhere() {
        let app = build_app(AppState::fake());
        for (method, uri) in [
            (Method::DELETE, "/nope"),
            (Method::PUT, "/nope"),
            (Method::DELETE, "/stats"),
            (Method::PATCH, "/register"),
        ] {
            let req = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, body) = call(&app, req).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{uri}");
            assert_eq!(json_of(&body)["error"], "Method not allowed");
        }
    }

    #[tokio::test]
    async fn served_method_on_other_verbs_path_is_404() {
        let app = build_app(AppState::fake());
        let (status, body) = call(&app, get("/register")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_of(&body)["error"], "Endpoint not found");

        let req = Request::builder()
            .method(Method::POST)
            .uri("/stats")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_of(&body)["error"], "Endpoint not found");
    }

    #[tokio::test]
    async fn options_is_always_ok_and_empty() {
        let app = build_app(AppState::fake());
        for uri in ["/register", "/anything"] {
            let req = Request::builder()
                .method(Method::OPTIONS)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, body) = call(&app, req).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = build_app(AppState::fake());
        let res = app.oneshot(get("/courses")).await.unwrap();
        assert!(res.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn form_registration_renders_html() {
        let store = MemoryStore::default();
        let app = build_app(AppState::fake_with(store.clone()));
        let form = "name=Ann+Lee&gender=female&email=ann%40x.com&phone=555-1";

        let (status, body) = call(&app, post_form("/forms/register", form)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.contains("Thank you for registering, Ann Lee!"));

        let (status, body) = call(&app, post_form("/forms/register", form)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("Email already registered"));
        assert!(body.contains("validation.html"));

        // shared store: the JSON API sees the form registration
        let (status, _) = call(&app, post_json("/login", json!({ "name": "Ann Lee" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn form_login_uses_capitalized_field() {
        let app = build_app(AppState::fake());
        call(&app, post_json("/register", ann())).await;

        let (status, body) = call(&app, post_form("/forms/login", "Name=Ann+Lee")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Welcome back, Ann Lee!"));

        let (status, body) = call(&app, post_form("/forms/login", "Name=Nobody")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("newuser.html"));

        let (status, body) = call(&app, post_form("/forms/login", "Name=")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("name is required"));
    }
}

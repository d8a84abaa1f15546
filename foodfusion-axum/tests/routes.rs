//! HTTP behaviour of the FoodFusion routes against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{DateTime, Duration};
use foodfusion::{FoodFusionBuilder, JwtConfig, ManualClock};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::ServiceExt;

const PASSWORD: &str = "Tiramisu42";

struct Harness {
    router: Router,
    clock: Arc<ManualClock>,
    pool: SqlitePool,
}

/// Routes that identify clients by `Client-IP`, as they would behind a proxy.
async fn harness() -> Harness {
    harness_with(true).await
}

async fn harness_with(trust_proxy_headers: bool) -> Harness {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    let clock = Arc::new(ManualClock::new(
        DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
    ));
    let app = FoodFusionBuilder::new()
        .with_sqlite_pool(pool.clone())
        .with_jwt(JwtConfig::new_hs256(b"axum_integration_test_secret".to_vec()))
        .with_clock(clock.clone())
        .apply_migrations(true)
        .build()
        .await
        .unwrap();

    Harness {
        router: foodfusion_axum::routes(Arc::new(app))
            .trust_proxy_headers(trust_proxy_headers)
            .build(),
        clock,
        pool,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn json_request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
}

fn post_json(uri: &str, body: Value, client_ip: &str) -> Request<Body> {
    json_request("POST", uri)
        .header("Client-IP", client_ip)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn login_request(email: &str, password: &str, client_ip: &str) -> Request<Body> {
    post_json(
        "/login",
        json!({ "email": email, "password": password }),
        client_ip,
    )
}

fn status_request(client_ip: &str) -> Request<Body> {
    Request::builder()
        .uri("/check-block-status")
        .header("Client-IP", client_ip)
        .body(Body::empty())
        .unwrap()
}

async fn signup(router: &Router, email: &str) -> String {
    let (status, body) = send(
        router,
        post_json(
            "/signup",
            json!({
                "firstName": "Massimo",
                "lastName": "Bottura",
                "email": email,
                "password": PASSWORD,
                "confirmPassword": PASSWORD,
            }),
            "127.0.0.1",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let Harness { router, .. } = harness().await;

    let (status, body) = send(
        &router,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_signup_and_login() {
    let Harness { router, .. } = harness().await;
    signup(&router, "massimo@example.com").await;

    let (status, body) = send(
        &router,
        login_request("massimo@example.com", PASSWORD, "1.2.3.4"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "Login successful! Welcome back to FoodFusion!"
    );
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["user"]["email"], "massimo@example.com");
}

#[tokio::test]
async fn test_signup_rejections() {
    let Harness { router, .. } = harness().await;
    signup(&router, "massimo@example.com").await;

    let (status, body) = send(
        &router,
        post_json(
            "/signup",
            json!({
                "firstName": "Other",
                "lastName": "Cook",
                "email": "massimo@example.com",
                "password": PASSWORD,
            }),
            "127.0.0.1",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &router,
        post_json(
            "/signup",
            json!({
                "firstName": "Lidia",
                "lastName": "Bastianich",
                "email": "lidia@example.com",
                "password": PASSWORD,
                "confirmPassword": "something else",
            }),
            "127.0.0.1",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Passwords do not match");

    let (status, _) = send(
        &router,
        post_json(
            "/signup",
            json!({ "email": "lidia@example.com", "password": PASSWORD }),
            "127.0.0.1",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_validation_and_bad_json() {
    let Harness { router, .. } = harness().await;

    let (status, body) = send(
        &router,
        post_json("/login", json!({ "password": PASSWORD }), "1.2.3.4"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email is required");

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid JSON data");
}

#[tokio::test]
async fn test_login_blocked_after_three_failures() {
    let Harness { router, clock, .. } = harness().await;
    signup(&router, "massimo@example.com").await;

    for _ in 0..2 {
        let (status, body) = send(
            &router,
            login_request("massimo@example.com", "wrong-password", "1.2.3.4"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid email or password");
    }

    let (status, body) = send(
        &router,
        login_request("massimo@example.com", "wrong-password", "1.2.3.4"),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["blocked"], true);
    assert_eq!(body["data"]["remaining_seconds"], 60);

    // The correct password is refused while blocked
    let (status, _) = send(
        &router,
        login_request("massimo@example.com", PASSWORD, "1.2.3.4"),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Other clients are unaffected
    let (status, _) = send(
        &router,
        login_request("massimo@example.com", PASSWORD, "5.6.7.8"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::seconds(61));
    let (status, _) = send(
        &router,
        login_request("massimo@example.com", PASSWORD, "1.2.3.4"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_check_block_status() {
    let Harness { router, clock, .. } = harness().await;
    signup(&router, "massimo@example.com").await;

    let (status, body) = send(&router, status_request("1.2.3.4")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["blocked"], false);
    assert_eq!(
        body["data"]["message"],
        "Account is not blocked. You can attempt to login."
    );
    assert!(body["data"].get("remaining_seconds").is_none());

    for _ in 0..3 {
        send(
            &router,
            login_request("massimo@example.com", "wrong-password", "1.2.3.4"),
        )
        .await;
    }

    let (status, body) = send(&router, status_request("1.2.3.4")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["blocked"], true);
    assert_eq!(body["data"]["remaining_seconds"], 60);
    assert_eq!(
        body["message"],
        "Account is temporarily locked. Please wait 1 minute before trying again."
    );

    clock.advance(Duration::seconds(31));
    let (_, body) = send(&router, status_request("1.2.3.4")).await;
    assert_eq!(body["data"]["remaining_seconds"], 29);
    assert_eq!(
        body["data"]["message"],
        "Account is temporarily locked. Please wait 29 seconds before trying again."
    );
}

#[tokio::test]
async fn test_forwarded_for_uses_first_entry() {
    let Harness { router, .. } = harness().await;
    signup(&router, "massimo@example.com").await;

    for _ in 0..3 {
        let request = json_request("POST", "/login")
            .header("X-Forwarded-For", "9.9.9.9, 10.0.0.1")
            .body(Body::from(
                json!({ "email": "massimo@example.com", "password": "nope" }).to_string(),
            ))
            .unwrap();
        send(&router, request).await;
    }

    let (_, body) = send(&router, status_request("9.9.9.9")).await;
    assert_eq!(body["data"]["blocked"], true);

    let (_, body) = send(&router, status_request("10.0.0.1")).await;
    assert_eq!(body["data"]["blocked"], false);
}

#[tokio::test]
async fn test_proxy_headers_ignored_by_default() {
    let Harness { router, .. } = harness_with(false).await;
    signup(&router, "massimo@example.com").await;

    // Rotating the header does not escape the count
    for ip in ["1.1.1.1", "2.2.2.2", "3.3.3.3"] {
        let request = json_request("POST", "/login")
            .header("Client-IP", ip)
            .header("X-Forwarded-For", ip)
            .body(Body::from(
                json!({ "email": "massimo@example.com", "password": "nope" }).to_string(),
            ))
            .unwrap();
        send(&router, request).await;
    }

    let (status, body) = send(
        &router,
        login_request("massimo@example.com", PASSWORD, "4.4.4.4"),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["data"]["blocked"], true);
}

#[tokio::test]
async fn test_storage_failure_while_authorizing_is_500() {
    let Harness { router, pool, .. } = harness().await;
    let token = signup(&router, "massimo@example.com").await;

    sqlx::query("DROP TABLE users")
        .execute(&pool)
        .await
        .unwrap();

    let request = json_request("POST", "/resources/culinary")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(
            json!({ "title": "Stocks", "link": "https://example.com" }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], foodfusion_axum::GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_refresh() {
    let Harness { router, .. } = harness().await;
    let token = signup(&router, "massimo@example.com").await;

    let (status, body) = send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/refresh")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing Authorization header");

    let (status, body) = send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/refresh")
            .header(header::AUTHORIZATION, "Bearer not.a.token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");

    let (status, body) = send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/refresh")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Token refreshed");
    assert!(body["data"]["token"].is_string());
}

#[tokio::test]
async fn test_resources() {
    let Harness { router, .. } = harness().await;
    let owner = signup(&router, "massimo@example.com").await;
    let other = signup(&router, "lidia@example.com").await;

    let create = |token: Option<&str>, kind: &str| {
        let mut builder = json_request("POST", &format!("/resources/{kind}"));
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder
            .body(Body::from(
                json!({
                    "title": "Fresh pasta",
                    "description": "Egg dough by hand",
                    "link": "https://example.com/pasta",
                })
                .to_string(),
            ))
            .unwrap()
    };

    let (status, body) = send(&router, create(None, "culinary")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized access");

    let (status, _) = send(&router, create(Some(owner.as_str()), "recipes")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&router, create(Some(owner.as_str()), "culinary")).await;
    assert_eq!(status, StatusCode::CREATED);
    let resource_id = body["data"]["resource_id"].as_i64().unwrap();

    let (status, body) = send(
        &router,
        Request::builder()
            .uri("/resources/culinary")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["resources"].as_array().unwrap().len(), 1);

    let (_, body) = send(
        &router,
        Request::builder()
            .uri("/resources/educational")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert!(body["data"]["resources"].as_array().unwrap().is_empty());

    let edit = |token: &str, body: Value| {
        json_request("PUT", "/edit-resource")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let (status, body) = send(&router, edit(owner.as_str(), json!({ "resource_id": resource_id }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Resource ID, type, and title are required");

    let update = json!({
        "resource_id": resource_id,
        "type": "culinary",
        "title": "Fresh pasta, revised",
    });

    let (status, body) = send(&router, edit(other.as_str(), update.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Resource not found or access denied");

    let (status, body) = send(&router, edit(owner.as_str(), update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Resource updated successfully");
    assert_eq!(body["data"]["title"], "Fresh pasta, revised");
}

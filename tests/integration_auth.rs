mod common;

use axum::http::StatusCode;
use batchwise::store::Store;
use common::setup_test_app;
use serde_json::json;

#[tokio::test]
async fn login_success_returns_token_and_user() {
    let app = setup_test_app();
    app.seed_role("teacher").await;
    let role = app.store.find_role_by_name(batchwise_core::RoleName::Teacher).await.unwrap().unwrap();
    app.seed_user("t@school.test", "password123", role.id).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "t@school.test", "password": "password123"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["access_token"].is_string());
    assert_eq!(body["data"]["user"]["email"], "t@school.test");
    // Staff accounts are provisioned with forced rotation.
    assert_eq!(body["data"]["must_change_password"], true);
    // The password never appears in any serialized form.
    assert!(body["data"]["user"].get("password").is_none());
}

#[tokio::test]
async fn login_failure_is_uniform() {
    let app = setup_test_app();
    let role = app.seed_role("teacher").await;
    app.seed_user("t@school.test", "password123", role.id).await;

    let (status_unknown, body_unknown) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "ghost@school.test", "password": "password123"})),
        )
        .await;
    let (status_wrong, body_wrong) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "t@school.test", "password": "not-it"})),
        )
        .await;

    assert_eq!(status_unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(status_wrong, StatusCode::UNAUTHORIZED);
    assert_eq!(body_unknown["error"]["message"], body_wrong["error"]["message"]);
    assert_eq!(body_wrong["error"]["message"], "Invalid email or password");
}

#[tokio::test]
async fn student_role_cannot_login() {
    let app = setup_test_app();
    let role = app.seed_role("student").await;
    app.seed_user("s@school.test", "password123", role.id).await;

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "s@school.test", "password": "password123"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn change_password_requires_token_and_clears_rotation() {
    let app = setup_test_app();
    let (user, token) = app.seed_user_with_token("t@school.test", "teacher").await;

    // Without a token the guard rejects before anything else.
    let (status, _) = app
        .request(
            "POST",
            "/api/auth/change-password",
            None,
            Some(json!({
                "current_password": "password123",
                "new_password": "fresh-password",
                "confirm_password": "fresh-password"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/change-password",
            Some(&token),
            Some(json!({
                "current_password": "password123",
                "new_password": "fresh-password",
                "confirm_password": "fresh-password"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let stored = app.store.find_user_by_id(user.id).await.unwrap().unwrap();
    assert!(!stored.must_change_password);

    // Old password no longer works; new one does.
    let (status, _) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "t@school.test", "password": "password123"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "t@school.test", "password": "fresh-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["must_change_password"], false);
}

#[tokio::test]
async fn forgot_then_reset_password_round_trip() {
    let app = setup_test_app();
    let role = app.seed_role("teacher").await;
    app.seed_user("t@school.test", "password123", role.id).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({"email": "t@school.test"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().contains("If an account exists"));

    // Unknown email gets the same neutral answer.
    let (status, other) = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({"email": "ghost@school.test"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(other["message"], body["message"]);

    let raw_token = app.mailer.last_token();
    let (status, _) = app
        .request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({"token": raw_token, "new_password": "reset-password-1"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "t@school.test", "password": "reset-password-1"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The token is single use.
    let (status, _) = app
        .request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({"token": app.mailer.last_token(), "new_password": "reset-password-2"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_password_rejects_garbage_token() {
    let app = setup_test_app();
    let (status, body) = app
        .request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({"token": "not-a-real-token", "new_password": "whatever-pass"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid or expired token");
}

#[tokio::test]
async fn email_verification_round_trip() {
    let app = setup_test_app();
    let (user, token) = app.seed_user_with_token("t@school.test", "teacher").await;

    let (status, _) = app
        .request("POST", "/api/auth/send-verification", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let raw_token = app.mailer.last_token();
    let (status, _) = app
        .request(
            "GET",
            &format!("/api/auth/verify-email/{raw_token}"),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let stored = app.store.find_user_by_id(user.id).await.unwrap().unwrap();
    assert!(stored.is_email_verified);

    // Already verified: re-request is rejected.
    let (status, _) = app
        .request("POST", "/api/auth/send-verification", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_validation_errors_are_bad_request() {
    let app = setup_test_app();
    let (status, _) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "not-an-email", "password": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request("POST", "/api/auth/login", None, Some(json!({"email": "a@b.test"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

mod common;

use axum::http::StatusCode;
use batchwise::store::Store;
use common::setup_test_app;
use serde_json::json;

#[tokio::test]
async fn create_role_requires_admin() {
    let app = setup_test_app();
    let (_, teacher_token) = app.seed_user_with_token("t@school.test", "teacher").await;

    // No token: 401 before any role check.
    let (status, _) = app
        .request("POST", "/api/roles", None, Some(json!({"name": "student"})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Teacher token: authenticated but wrong role.
    let (status, _) = app
        .request(
            "POST",
            "/api/roles",
            Some(&teacher_token),
            Some(json!({"name": "student"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_creates_role_with_default_template() {
    let app = setup_test_app();
    let (_, admin_token) = app.seed_user_with_token("admin@school.test", "admin").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/roles",
            Some(&admin_token),
            Some(json!({"name": "principal", "description": "School principal"})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "principal");
    assert_eq!(body["data"]["can_login"], true);
    assert_eq!(body["data"]["is_system_role"], false);
    // Default principal template includes batch create but not batch delete.
    assert_eq!(body["data"]["permissions"]["batch"]["create"], true);
    assert!(body["data"]["permissions"]["batch"].get("delete").is_none());
}

#[tokio::test]
async fn create_role_rejects_unknown_name() {
    let app = setup_test_app();
    let (_, admin_token) = app.seed_user_with_token("admin@school.test", "admin").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/roles",
            Some(&admin_token),
            Some(json!({"name": "superuser"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("must be one of")
    );
}

#[tokio::test]
async fn duplicate_role_name_conflicts() {
    let app = setup_test_app();
    let (_, admin_token) = app.seed_user_with_token("admin@school.test", "admin").await;

    let (status, _) = app
        .request(
            "POST",
            "/api/roles",
            Some(&admin_token),
            Some(json!({"name": "teacher"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request(
            "POST",
            "/api/roles",
            Some(&admin_token),
            Some(json!({"name": "teacher"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_and_get_roles() {
    let app = setup_test_app();
    let (_, admin_token) = app.seed_user_with_token("admin@school.test", "admin").await;
    let teacher_role = app.seed_role("teacher").await;

    let (status, body) = app
        .request("GET", "/api/roles", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    // Seeded admin role plus teacher.
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .request(
            "GET",
            &format!("/api/roles/{}", teacher_role.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "teacher");

    let (status, _) = app
        .request(
            "GET",
            &format!("/api/roles/{}", uuid::Uuid::new_v4()),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn system_roles_cannot_be_deleted() {
    let app = setup_test_app();
    let (_, admin_token) = app.seed_user_with_token("admin@school.test", "admin").await;
    let admin_role = app
        .store
        .find_role_by_name(batchwise_core::RoleName::Admin)
        .await
        .unwrap()
        .unwrap();
    let teacher_role = app.seed_role("teacher").await;

    let (status, body) = app
        .request(
            "DELETE",
            &format!("/api/roles/{}", admin_role.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "System roles cannot be deleted");

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/roles/{}", teacher_role.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

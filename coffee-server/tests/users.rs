mod common;

use coffee_server::auth::LinkPurpose;
use coffee_server::db::models::DEFAULT_AVATAR;
use http::StatusCode;
use serde_json::{Value, json};
use shared::models::Role;
use shared::task::{QueueName, SEND_PASSWORD_RESET_EMAIL, SEND_VERIFICATION_EMAIL};
use shared::util::{expiry_millis, now_millis};

use common::{PASSWORD, Part, TestApp, empty_request, json_request, multipart_request, png_bytes};

fn signup_body(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": PASSWORD,
        "confirmPassword": PASSWORD,
        "phoneNumber": "+254700000000"
    })
}

async fn login(app: &TestApp, email: &str, password: &str) -> (StatusCode, Value) {
    app.send(json_request(
        "POST",
        "/login",
        None,
        json!({"email": email, "password": password}),
    ))
    .await
}

#[tokio::test]
async fn test_signup_creates_user_and_queues_verification() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/signup",
            None,
            signup_body("barista", "Barista@Coffee.Shop"),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let user = &body["data"];
    assert_eq!(user["username"], "barista");
    assert_eq!(user["email"], "barista@coffee.shop");
    assert_eq!(user["role"], "user");
    assert_eq!(user["avatar"], DEFAULT_AVATAR);
    assert_eq!(user["verified"], false);
    assert!(user.get("password").is_none());

    let tasks = app.queued_tasks().await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_type, SEND_VERIFICATION_EMAIL);
    assert_eq!(tasks[0].queue, QueueName::Critical);
    assert_eq!(tasks[0].max_retry, 3);
    assert_eq!(tasks[0].payload["email"], "barista@coffee.shop");
    assert_eq!(tasks[0].process_at, tasks[0].created_at + 3_000);
}

#[tokio::test]
async fn test_signup_rejects_duplicates() {
    let app = TestApp::new().await;
    app.create_user("taken", Role::User).await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/signup",
            None,
            signup_body("other", "taken@coffee.shop"),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 8003);

    let (status, body) = app
        .send(json_request(
            "POST",
            "/signup",
            None,
            signup_body("taken", "fresh@coffee.shop"),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 8002);
    assert!(app.queued_tasks().await.is_empty());
}

#[tokio::test]
async fn test_signup_is_undone_when_the_queue_rejects_the_mail() {
    let app = TestApp::new().await;
    app.reject_tasks().await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/signup",
            None,
            signup_body("barista", "barista@coffee.shop"),
        ))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["code"], 5001);
    assert_eq!(body["error"], "Task queue unavailable");
    assert!(body.get("token").is_none());
    assert!(!body.to_string().contains("task_type"));

    assert!(app.state.users().find_all().await.unwrap().is_empty());
    assert!(app.queued_tasks().await.is_empty());
}

#[tokio::test]
async fn test_signup_validation() {
    let app = TestApp::new().await;

    let mut body = signup_body("barista", "barista@coffee.shop");
    body["confirmPassword"] = json!("something-else");
    let (status, resp) = app.send(json_request("POST", "/signup", None, body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["code"], 2);

    let (status, resp) = app
        .send(json_request(
            "POST",
            "/signup",
            None,
            signup_body("barista", "not-an-email"),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["code"], 2);
    assert!(app.state.users().find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_does_not_reveal_which_part_was_wrong() {
    let app = TestApp::new().await;
    let user = app.create_user("regular", Role::User).await;

    let (status, unknown) = login(&app, "nobody@coffee.shop", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown["code"], 1002);

    let (status, wrong) = login(&app, &user.email, "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["code"], 1002);
    assert_eq!(unknown["error"], wrong["error"]);

    let (status, body) = login(&app, "REGULAR@coffee.shop", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn test_verify_link() {
    let app = TestApp::new().await;
    let user = app.create_user("newbie", Role::User).await;
    assert!(!user.verified);

    let code = app.issue_link(&user, LinkPurpose::Verify, expiry_millis(60)).await;
    let (status, body) = app
        .send(empty_request("GET", &format!("/verify?token={code}"), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["verified"], true);
    assert_eq!(body["data"]["id"], user.id_string());

    // Used up
    let uri = format!("/verify?token={code}&timestamp={}", expiry_millis(60));
    let (status, body) = app.send(empty_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1007);

    // The stored expiry counts, not the one in the query
    let stale = app
        .issue_link(&user, LinkPurpose::Verify, now_millis() - 1_000)
        .await;
    let uri = format!("/verify?token={stale}&timestamp={}", expiry_millis(60));
    let (status, body) = app.send(empty_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1005);
}

#[tokio::test]
async fn test_links_cannot_be_forged_from_public_ids() {
    let app = TestApp::new().await;
    let admin = app.create_user("admin", Role::Admin).await;
    let key = admin.id.as_ref().unwrap().key().to_string();
    let far_future = expiry_millis(60 * 24 * 365);

    for token in [key.clone(), admin.id_string(), String::new()] {
        let uri = format!("/verify?token={token}&timestamp={far_future}");
        let (status, body) = app.send(empty_request("GET", &uri, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "token {token:?}");
        assert_eq!(body["code"], 1007);

        let uri = format!("/resetpassword?token={token}&timestamp={far_future}");
        let (status, body) = app
            .send(json_request(
                "PUT",
                &uri,
                None,
                json!({"password": "attacker-pass", "confirmPassword": "attacker-pass"}),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "token {token:?}");
        assert_eq!(body["code"], 1007);
    }

    let (status, _) = login(&app, &admin.email, PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    let admin = app.state.users().find_by_id(&key).await.unwrap().unwrap();
    assert!(!admin.verified);
}

#[tokio::test]
async fn test_link_codes_are_bound_to_their_purpose() {
    let app = TestApp::new().await;
    let user = app.create_user("careful", Role::User).await;
    let verify = app.issue_link(&user, LinkPurpose::Verify, expiry_millis(60)).await;

    let uri = format!("/resetpassword?token={verify}");
    let (status, body) = app
        .send(json_request(
            "PUT",
            &uri,
            None,
            json!({"password": "brand-new-pass", "confirmPassword": "brand-new-pass"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1007);

    // A newer code replaces the outstanding one
    let newer = app.issue_link(&user, LinkPurpose::Verify, expiry_millis(60)).await;
    let (status, _) = app
        .send(empty_request("GET", &format!("/verify?token={verify}"), None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .send(empty_request("GET", &format!("/verify?token={newer}"), None))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_password() {
    let app = TestApp::new().await;
    let user = app.create_user("forgetful", Role::User).await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/forgotpassword",
            None,
            json!({"email": "nobody@coffee.shop"}),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 8001);
    assert!(app.queued_tasks().await.is_empty());

    let (status, _) = app
        .send(json_request(
            "POST",
            "/forgotpassword",
            None,
            json!({"email": user.email}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let tasks = app.queued_tasks().await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_type, SEND_PASSWORD_RESET_EMAIL);
    assert_eq!(tasks[0].queue, QueueName::Critical);
    assert_eq!(tasks[0].max_retry, 10);
}

#[tokio::test]
async fn test_forgot_password_when_the_queue_rejects_the_mail() {
    let app = TestApp::new().await;
    let user = app.create_user("forgetful", Role::User).await;
    app.reject_tasks().await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/forgotpassword",
            None,
            json!({"email": user.email}),
        ))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 5001);
    assert_eq!(body["error"], "Task queue unavailable");
    assert!(body.get("details").is_none());
    assert!(app.queued_tasks().await.is_empty());
}

#[tokio::test]
async fn test_reset_password() {
    let app = TestApp::new().await;
    let user = app.create_user("forgetful", Role::User).await;
    let code = app
        .issue_link(&user, LinkPurpose::ResetPassword, expiry_millis(60))
        .await;
    let link = format!("/resetpassword?token={code}&timestamp={}", expiry_millis(60));

    // A mismatch leaves the code usable
    let (status, body) = app
        .send(json_request(
            "PUT",
            &link,
            None,
            json!({"password": "brand-new-pass", "confirmPassword": "different-pass"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1006);

    let (status, _) = app
        .send(json_request(
            "PUT",
            &link,
            None,
            json!({"password": "brand-new-pass", "confirmPassword": "brand-new-pass"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = login(&app, &user.email, PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, &user.email, "brand-new-pass").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(json_request(
            "PUT",
            &link,
            None,
            json!({"password": "another-pass-1", "confirmPassword": "another-pass-1"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1007);

    let expired = app
        .issue_link(&user, LinkPurpose::ResetPassword, now_millis() - 1)
        .await;
    let (status, body) = app
        .send(json_request(
            "PUT",
            &format!("/resetpassword?token={expired}"),
            None,
            json!({"password": "another-pass-1", "confirmPassword": "another-pass-1"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1005);
}

#[tokio::test]
async fn test_update_profile_with_avatar() {
    let app = TestApp::new().await;
    let user = app.create_user("regular", Role::User).await;
    let token = app.token_for(&user);
    let uri = format!("/users/{}", user.id_string());

    let (status, body) = app
        .send(multipart_request(
            "PUT",
            &uri,
            Some(&token),
            vec![
                Part::Text("username", "regular2"),
                Part::Text("phoneNumber", "+254711111111"),
                Part::File("avatar", "me.png", png_bytes()),
            ],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "regular2");
    assert_eq!(body["data"]["phone_number"], "+254711111111");

    let avatar = body["data"]["avatar"].as_str().unwrap().to_string();
    assert!(avatar.starts_with("images/avatars/"));
    assert!(avatar.ends_with(".png"));

    // Default avatar is never deleted, so only the upload is queued
    let tasks = app.queued_tasks().await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].payload["objectKey"], avatar.as_str());

    // Replacing a custom avatar queues the old one for deletion
    let (status, _) = app
        .send(multipart_request(
            "PUT",
            &uri,
            Some(&token),
            vec![Part::File("avatar", "me2.jpg", png_bytes())],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let tasks = app.queued_tasks().await;
    assert_eq!(tasks.len(), 3);
    assert!(tasks.iter().any(|t| t.payload == json!([avatar.clone()])));
}

#[tokio::test]
async fn test_update_rejects_other_accounts_and_empty_forms() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", Role::User).await;
    let bob = app.create_user("bob", Role::User).await;
    let token = app.token_for(&alice);

    let (status, _) = app
        .send(multipart_request(
            "PUT",
            &format!("/users/{}", bob.id_string()),
            Some(&token),
            vec![Part::Text("username", "mallory")],
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(multipart_request(
            "PUT",
            &format!("/users/{}", alice.id_string()),
            Some(&token),
            vec![Part::Text("username", "  ")],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5);

    let (status, body) = app
        .send(multipart_request(
            "PUT",
            &format!("/users/{}", alice.id_string()),
            Some(&token),
            vec![Part::Text("username", "bob")],
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 8002);
}

#[tokio::test]
async fn test_delete_own_account() {
    let app = TestApp::new().await;
    let user = app.create_user("leaving", Role::User).await;
    let token = app.token_for(&user);
    let uri = format!("/users/{}", user.id_string());

    let (status, body) = app.send(empty_request("DELETE", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
    assert!(app.state.users().find_by_id(&user.id_string()).await.unwrap().is_none());

    // Default avatar, nothing to delete from storage
    assert!(app.queued_tasks().await.is_empty());
}

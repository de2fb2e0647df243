mod common;

use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{init_app, register, send, with_token};
use postboard::auth::Permission;
use postboard::serializers::LoginResponse;

#[test_log::test(actix_rt::test)]
async fn test_register_issues_token_and_persists_user() {
    let app = init_app(Permission::AllowAny).await;

    let registered = register(&app, "integration_user", "Password123!").await;
    assert!(!registered.token.is_empty(), "Token should be a non-empty string");
    assert_eq!(registered.user.username, "integration_user");
    assert_eq!(registered.message, "Registration completed successfully.");

    let req = with_token(
        test::TestRequest::get().uri(&format!("/users/{}/", registered.user.id)),
        &registered.token,
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "integration_user");
}

#[actix_rt::test]
async fn test_register_response_never_exposes_password() {
    let app = init_app(Permission::AllowAny).await;

    let req = test::TestRequest::post().uri("/users/register/").set_json(json!({
        "username": "secretive",
        "email": "secretive@example.com",
        "password": "Password123!"
    }));
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::CREATED);
    let user = body["user"].as_object().unwrap();
    assert_eq!(user["email"], "secretive@example.com");
    assert!(!user.contains_key("password"));
    assert!(!user.contains_key("password_hash"));
}

#[actix_rt::test]
async fn test_duplicate_registration_fails_validation() {
    let app = init_app(Permission::AllowAny).await;
    register(&app, "twice", "Password123!").await;

    let req = test::TestRequest::post()
        .uri("/users/register/")
        .set_json(json!({ "username": "twice", "password": "Another123!" }));
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "username": ["A user with that username already exists."] })
    );
}

#[actix_rt::test]
async fn test_invalid_registration_inputs() {
    let app = init_app(Permission::AllowAny).await;

    let test_cases = vec![
        (json!({ "password": "Password123!" }), "username", "missing username"),
        (json!({ "username": "someone" }), "password", "missing password"),
        (
            json!({ "username": "user name!", "password": "Password123!" }),
            "username",
            "username with invalid chars",
        ),
        (
            json!({ "username": "a".repeat(151), "password": "Password123!" }),
            "username",
            "username too long",
        ),
        (
            json!({ "username": "someone", "email": "invalid-email", "password": "Password123!" }),
            "email",
            "invalid email format",
        ),
        (
            json!({ "username": "someone", "password": "123" }),
            "password",
            "password too short",
        ),
    ];

    for (payload, field, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/users/register/")
            .set_json(&payload);
        let (status, body) = send(&app, req).await;

        assert_eq!(
            status,
            StatusCode::BAD_REQUEST,
            "Test case failed: {}. Body: {}",
            description,
            body
        );
        assert!(
            body[field].is_array(),
            "Test case failed: {}. Expected an error on {}, got {}",
            description,
            field,
            body
        );
    }

    // None of the rejected payloads created anyone.
    let registered = register(&app, "someone", "Password123!").await;
    assert_eq!(registered.user.id, 1);
}

#[actix_rt::test]
async fn test_malformed_json_is_a_bad_request() {
    let app = init_app(Permission::AllowAny).await;

    let req = test::TestRequest::post()
        .uri("/users/register/")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json");
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[test_log::test(actix_rt::test)]
async fn test_repeated_logins_return_the_same_token() {
    let app = init_app(Permission::AllowAny).await;
    let registered = register(&app, "repeat_login", "Password123!").await;

    let mut tokens = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/users/login/")
            .set_json(json!({ "username": "repeat_login", "password": "Password123!" }));
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK, "Login failed. Body: {}", body);

        let login: LoginResponse = serde_json::from_value(body).unwrap();
        assert_eq!(login.user.id, registered.user.id);
        assert_eq!(login.message, "Login successful.");
        tokens.push(login.token);
    }

    assert_eq!(tokens[0], tokens[1]);
    assert_eq!(tokens[0], registered.token);
}

#[actix_rt::test]
async fn test_login_failures_are_generic() {
    let app = init_app(Permission::AllowAny).await;
    register(&app, "login_test_user", "Password123!").await;

    let wrong_password = test::TestRequest::post()
        .uri("/users/login/")
        .set_json(json!({ "username": "login_test_user", "password": "WrongPassword123!" }));
    let (status, wrong_password_body) = send(&app, wrong_password).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password_body,
        json!({ "error": "Invalid username or password." })
    );

    let unknown_user = test::TestRequest::post()
        .uri("/users/login/")
        .set_json(json!({ "username": "nobody", "password": "Password123!" }));
    let (status, unknown_user_body) = send(&app, unknown_user).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user_body, wrong_password_body);
}

#[actix_rt::test]
async fn test_login_with_missing_fields_is_a_bad_request() {
    let app = init_app(Permission::AllowAny).await;

    let test_cases = vec![
        (json!({ "username": "nobody" }), "missing password"),
        (json!({ "password": "Password123!" }), "missing username"),
        (json!({}), "empty body"),
    ];

    for (payload, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/users/login/")
            .set_json(&payload);
        let (status, body) = send(&app, req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "Test case failed: {}", description);
        assert_eq!(
            body,
            json!({ "error": "Please provide both username and password." })
        );
    }
}

#[actix_rt::test]
async fn test_user_endpoints_require_authentication() {
    let app = init_app(Permission::AllowAny).await;
    let registered = register(&app, "owner", "Password123!").await;
    let member = format!("/users/{}/", registered.user.id);

    let requests = vec![
        test::TestRequest::get().uri("/users/"),
        test::TestRequest::post()
            .uri("/users/")
            .set_json(json!({ "username": "sneaky", "password": "Password123!" })),
        test::TestRequest::get().uri(&member),
        test::TestRequest::patch()
            .uri(&member)
            .set_json(json!({ "email": "x@example.com" })),
        test::TestRequest::delete().uri(&member),
    ];

    for req in requests {
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({ "error": "Authentication credentials were not provided." })
        );
    }
}

#[actix_rt::test]
async fn test_unknown_token_is_rejected() {
    let app = init_app(Permission::AllowAny).await;

    let req = with_token(test::TestRequest::get().uri("/users/"), "deadbeef");
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid token." }));
}

#[actix_rt::test]
async fn test_bearer_scheme_is_accepted() {
    let app = init_app(Permission::AllowAny).await;
    let registered = register(&app, "bearer_user", "Password123!").await;

    let req = test::TestRequest::get()
        .uri("/users/")
        .insert_header(("Authorization", format!("Bearer {}", registered.token)));
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[actix_rt::test]
async fn test_user_crud_flow() {
    let app = init_app(Permission::AllowAny).await;
    let admin = register(&app, "crud_admin", "Password123!").await;

    // Create
    let req = with_token(
        test::TestRequest::post().uri("/users/").set_json(json!({
            "username": "crud_user",
            "email": "crud@example.com",
            "password": "PasswordCrud123!"
        })),
        &admin.token,
    );
    let (status, created) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    let member = format!("/users/{}/", created["id"]);

    // Partial update leaves other fields alone
    let req = with_token(
        test::TestRequest::patch()
            .uri(&member)
            .set_json(json!({ "first_name": "Crud" })),
        &admin.token,
    );
    let (status, patched) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["first_name"], "Crud");
    assert_eq!(patched["email"], "crud@example.com");

    // Full update needs a password
    let req = with_token(
        test::TestRequest::put()
            .uri(&member)
            .set_json(json!({ "username": "crud_user_renamed" })),
        &admin.token,
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["password"].is_array());

    let req = with_token(
        test::TestRequest::put().uri(&member).set_json(json!({
            "username": "crud_user_renamed",
            "password": "NewPassword123!"
        })),
        &admin.token,
    );
    let (status, replaced) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["username"], "crud_user_renamed");

    // The new password works
    let req = test::TestRequest::post().uri("/users/login/").set_json(json!({
        "username": "crud_user_renamed",
        "password": "NewPassword123!"
    }));
    let (status, login) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let user_token = login["token"].as_str().unwrap().to_string();

    // Renaming onto a taken username fails
    let req = with_token(
        test::TestRequest::patch()
            .uri(&member)
            .set_json(json!({ "username": "crud_admin" })),
        &admin.token,
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["username"].is_array());

    // Delete, after which the user's token stops working
    let req = with_token(test::TestRequest::delete().uri(&member), &admin.token);
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let req = with_token(test::TestRequest::get().uri(&member), &admin.token);
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = with_token(test::TestRequest::get().uri("/users/"), &user_token);
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

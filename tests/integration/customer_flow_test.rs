// Integration tests for the customer lifecycle over HTTP
//
// Flow: create -> read -> list/search -> update -> delete

#[macro_use]
#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::http::StatusCode;
use serde_json::json;

use helpers::*;

#[actix_web::test]
async fn test_customer_crud_flow() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let id = create_customer!(app, "flow@abccorp.com");

    let (status, body) = call!(app, get, &format!("/api/customers/{}", id));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "ABC Corporation");
    assert_eq!(body["city"], "New York");

    let mut update = customer_payload("flow@abccorp.com");
    update["name"] = json!("ABC Holdings");
    let (status, body) = send_json!(app, put, &format!("/api/customers/{}", id), update);
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["name"], "ABC Holdings");

    let req = actix_web::test::TestRequest::delete()
        .uri(&format!("/api/customers/{}", id))
        .to_request();
    let resp = actix_web::test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let (status, _) = call!(app, get, &format!("/api/customers/{}", id));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_duplicate_email_rejected() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    create_customer!(app, "dup@abccorp.com");
    let (status, body) = send_json!(app, post, "/api/customers", customer_payload("DUP@abccorp.com"));

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"]["fields"]["email"][0],
        "The email has already been taken."
    );
}

#[actix_web::test]
async fn test_update_keeping_own_email_is_allowed() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let id = create_customer!(app, "same@abccorp.com");
    let (status, _) = send_json!(
        app,
        put,
        &format!("/api/customers/{}", id),
        customer_payload("same@abccorp.com")
    );
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_missing_fields_reported() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let (status, body) = send_json!(app, post, "/api/customers", json!({ "email": "bad" }));
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let fields = body["error"]["fields"].as_object().unwrap();
    for field in ["name", "contact_person", "email", "phone", "address"] {
        assert!(fields.contains_key(field), "{} should be reported", field);
    }
}

#[actix_web::test]
async fn test_list_and_search() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    create_customer!(app, "alpha@example.com");
    let mut other = customer_payload("beta@example.com");
    other["name"] = json!("Sakura Travel");
    let (status, _) = send_json!(app, post, "/api/customers", other);
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = call!(app, get, "/api/customers");
    assert_eq!(body["total"], 2);
    // Newest first
    assert_eq!(body["data"][0]["email"], "beta@example.com");

    let (_, body) = call!(app, get, "/api/customers?search=sakura");
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Sakura Travel");
}

#[actix_web::test]
async fn test_unknown_customer_is_not_found() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let (status, _) = send_json!(app, put, "/api/customers/42", customer_payload("x@abccorp.com"));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call!(app, delete, "/api/customers/42");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

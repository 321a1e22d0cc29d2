// Integration tests for the PDF endpoints
//
// POST /api/generate-quotation-pdf renders a client payload;
// GET /api/quotations/{id}/pdf renders a stored quotation. Both share one
// rate limit budget per client address.

#[macro_use]
#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use lopdf::Document;
use serde_json::json;

use helpers::*;
use quotely::config::PdfConfig;

#[actix_web::test]
async fn test_generate_pdf_from_payload() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let mut payload = pdf_payload();
    payload["filename"] = json!("ABC quote");
    let req = test::TestRequest::post()
        .uri("/api/generate-quotation-pdf")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment;"));
    assert!(disposition.contains(".pdf\""));

    let bytes = test::read_body(resp).await;
    assert!(bytes.starts_with(b"%PDF-"));
    let pdf = Document::load_mem(&bytes).unwrap();
    assert_eq!(pdf.get_pages().len(), 1);
}

#[actix_web::test]
async fn test_generate_pdf_default_filename() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/generate-quotation-pdf")
        .set_json(pdf_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"quotation.pdf\""
    );
}

#[actix_web::test]
async fn test_invalid_payload_rejected() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let mut payload = pdf_payload();
    payload["customer"] = json!({});
    payload["items"] = json!([{ "description": "Tour", "quantity": 0, "unit_price": 10 }]);

    let (status, body) = send_json!(app, post, "/api/generate-quotation-pdf", payload);
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let fields = body["error"]["fields"].as_object().unwrap();
    assert!(fields.contains_key("customer.company_name"));
    assert!(fields.contains_key("items.0.quantity"));
}

#[actix_web::test]
async fn test_empty_items_rejected() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let mut payload = pdf_payload();
    payload["items"] = json!([]);

    let (status, body) = send_json!(app, post, "/api/generate-quotation-pdf", payload);
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["fields"]["items"].is_array());
}

#[actix_web::test]
async fn test_stored_quotation_pdf() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let customer_id = create_customer!(app, "pdf@abccorp.com");
    let (_, created) = send_json!(app, post, "/api/quotations", quotation_payload(customer_id));
    let id = created["id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/quotations/{}/pdf", id))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap(),
        format!("attachment; filename=\"quotation-{}.pdf\"", id)
    );
    let bytes = test::read_body(resp).await;
    assert!(Document::load_mem(&bytes).is_ok());
}

#[actix_web::test]
async fn test_stored_quotation_pdf_not_found() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let (status, body) = call!(app, get, "/api/quotations/404/pdf");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 404);
}

#[actix_web::test]
async fn test_pdf_rate_limit_shared_across_endpoints() {
    let ctx = TestContext::with_pdf_config(PdfConfig {
        rate_limit_max: 2,
        ..PdfConfig::default()
    });
    let app = init_app!(ctx);

    let (status, _) = send_json!(app, post, "/api/generate-quotation-pdf", pdf_payload());
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call!(app, get, "/api/quotations/1/pdf");
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json!(app, post, "/api/generate-quotation-pdf", pdf_payload());
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], 429);

    // Other endpoints are not limited
    let (status, _) = call!(app, get, "/api/quotations");
    assert_eq!(status, StatusCode::OK);

    // Each client address has its own budget
    let generate = |peer: &str| {
        test::TestRequest::post()
            .uri("/api/generate-quotation-pdf")
            .peer_addr(peer.parse().unwrap())
            .set_json(pdf_payload())
            .to_request()
    };
    let stored = |peer: &str| {
        test::TestRequest::get()
            .uri("/api/quotations/1/pdf")
            .peer_addr(peer.parse().unwrap())
            .to_request()
    };

    let resp = test::call_service(&app, generate("10.0.0.1:5000")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = test::call_service(&app, stored("10.0.0.1:5001")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = test::call_service(&app, generate("10.0.0.1:5002")).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let resp = test::call_service(&app, generate("10.0.0.2:5000")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

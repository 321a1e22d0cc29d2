// Shared test support
//
// In-memory repositories behind the same traits the MySQL implementations
// satisfy, so HTTP flows can run without a database. Data builders produce
// payloads dated today, which passes the "not in the past" rule.
//
// Usage (from a test file):
//   #[macro_use]
//   #[path = "../helpers/mod.rs"]
//   mod helpers;

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use quotely::config::PdfConfig;
use quotely::core::{AppError, PageRequest, Result};
use quotely::customers::{Customer, CustomerRepository, CustomerRequest};
use quotely::modules::health::ReadinessProbe;
use quotely::quotations::models::{QuotationFilter, QuotationItem};
use quotely::quotations::{Quotation, QuotationDraft, QuotationRepository, QuotationStatus};
use quotely::AppState;

/// Customers kept in a vector; ids are assigned sequentially
#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: Mutex<Vec<Customer>>,
}

impl InMemoryCustomerRepository {
    fn build(id: i64, request: &CustomerRequest) -> Customer {
        let now = Utc::now();
        Customer {
            id,
            name: request.name.clone(),
            contact_person: request.contact_person.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            address: request.address.clone(),
            address2: request.address2.clone(),
            city: request.city.clone(),
            state: request.state.clone(),
            postal_code: request.postal_code.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn create(&self, request: &CustomerRequest) -> Result<Customer> {
        let mut customers = self.customers.lock().unwrap();
        if customers.iter().any(|c| c.email == request.email) {
            return Err(AppError::field("email", "The email has already been taken."));
        }
        let id = customers.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let customer = Self::build(id, request);
        customers.push(customer.clone());
        Ok(customer)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>> {
        let customers = self.customers.lock().unwrap();
        Ok(customers.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Customer>> {
        let customers = self.customers.lock().unwrap();
        Ok(customers
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let customers = self.customers.lock().unwrap();
        Ok(customers
            .iter()
            .find(|c| c.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self, search: Option<&str>, page: PageRequest) -> Result<(Vec<Customer>, i64)> {
        let customers = self.customers.lock().unwrap();
        let needle = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());

        let mut matching: Vec<Customer> = customers
            .iter()
            .filter(|c| match &needle {
                Some(needle) => [&c.name, &c.contact_person, &c.email]
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle.as_str())),
                None => true,
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));

        let total = matching.len() as i64;
        let data = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((data, total))
    }

    async fn update(&self, id: i64, request: &CustomerRequest) -> Result<Option<Customer>> {
        let mut customers = self.customers.lock().unwrap();
        let Some(slot) = customers.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        let created_at = slot.created_at;
        *slot = Self::build(id, request);
        slot.created_at = created_at;
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut customers = self.customers.lock().unwrap();
        let before = customers.len();
        customers.retain(|c| c.id != id);
        Ok(customers.len() != before)
    }
}

/// Quotations kept in a vector. `fail_next_write` makes the next
/// `create`/`replace` fail without touching stored state.
#[derive(Default)]
pub struct InMemoryQuotationRepository {
    quotations: Mutex<Vec<Quotation>>,
    next_item_id: Mutex<i64>,
    fail_next_write: AtomicBool,
}

impl InMemoryQuotationRepository {
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    pub fn stored(&self, id: i64) -> Option<Quotation> {
        let quotations = self.quotations.lock().unwrap();
        quotations.iter().find(|q| q.id == id).cloned()
    }

    fn check_failure(&self) -> Result<()> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(AppError::internal("simulated write failure"));
        }
        Ok(())
    }

    fn items(&self, quotation_id: i64, draft: &QuotationDraft) -> Vec<QuotationItem> {
        let mut next = self.next_item_id.lock().unwrap();
        draft
            .items
            .iter()
            .map(|item| {
                *next += 1;
                QuotationItem::new(
                    *next,
                    quotation_id,
                    item.description.clone(),
                    item.quantity,
                    item.unit_price,
                )
            })
            .collect()
    }

    fn apply(quotation: &mut Quotation, draft: &QuotationDraft, items: Vec<QuotationItem>) {
        quotation.customer_id = draft.customer_id;
        quotation.quotation_date = draft.quotation_date;
        quotation.status = draft.status;
        quotation.currency = draft.currency;
        quotation.conversion_rate = draft.conversion_rate;
        quotation.payment_terms = draft.payment_terms.clone();
        quotation.valid_until = draft.valid_until;
        quotation.notes = draft.notes.clone();
        quotation.total_amount = draft.total_amount();
        quotation.items = items;
        quotation.updated_at = Utc::now();
    }
}

#[async_trait]
impl QuotationRepository for InMemoryQuotationRepository {
    async fn create(&self, draft: &QuotationDraft) -> Result<Quotation> {
        self.check_failure()?;

        let id = {
            let quotations = self.quotations.lock().unwrap();
            quotations.iter().map(|q| q.id).max().unwrap_or(0) + 1
        };
        let items = self.items(id, draft);
        let now = Utc::now();

        let mut quotation = Quotation {
            id,
            customer_id: draft.customer_id,
            quotation_date: draft.quotation_date,
            status: draft.status,
            currency: draft.currency,
            conversion_rate: draft.conversion_rate,
            payment_terms: draft.payment_terms.clone(),
            valid_until: draft.valid_until,
            notes: Vec::new(),
            total_amount: Decimal::ZERO,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            items: Vec::new(),
        };
        Self::apply(&mut quotation, draft, items);

        self.quotations.lock().unwrap().push(quotation.clone());
        Ok(quotation)
    }

    async fn replace(&self, id: i64, draft: &QuotationDraft) -> Result<Option<Quotation>> {
        self.check_failure()?;

        let items = self.items(id, draft);
        let mut quotations = self.quotations.lock().unwrap();
        let Some(slot) = quotations.iter_mut().find(|q| q.id == id && !q.is_deleted()) else {
            return Ok(None);
        };
        Self::apply(slot, draft, items);
        Ok(Some(slot.clone()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Quotation>> {
        Ok(self.stored(id))
    }

    async fn list(&self, filter: &QuotationFilter, page: PageRequest) -> Result<(Vec<Quotation>, i64)> {
        let quotations = self.quotations.lock().unwrap();
        let mut matching: Vec<Quotation> =
            quotations.iter().filter(|q| filter.matches(q)).cloned().collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));

        let total = matching.len() as i64;
        let data = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((data, total))
    }

    async fn update_status(&self, id: i64, status: QuotationStatus) -> Result<bool> {
        let mut quotations = self.quotations.lock().unwrap();
        match quotations.iter_mut().find(|q| q.id == id && !q.is_deleted()) {
            Some(quotation) => {
                quotation.status = status;
                quotation.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, id: i64) -> Result<bool> {
        let mut quotations = self.quotations.lock().unwrap();
        match quotations.iter_mut().find(|q| q.id == id && !q.is_deleted()) {
            Some(quotation) => {
                quotation.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Readiness probe with a fixed answer
pub struct StaticProbe(pub bool);

#[async_trait]
impl ReadinessProbe for StaticProbe {
    async fn ping(&self) -> Result<()> {
        if self.0 {
            Ok(())
        } else {
            Err(AppError::internal("database unreachable"))
        }
    }
}

/// Application state wired to in-memory repositories
pub struct TestContext {
    pub state: AppState,
    pub customers: Arc<InMemoryCustomerRepository>,
    pub quotations: Arc<InMemoryQuotationRepository>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_pdf_config(PdfConfig::default())
    }

    pub fn with_pdf_config(pdf: PdfConfig) -> Self {
        let customers = Arc::new(InMemoryCustomerRepository::default());
        let quotations = Arc::new(InMemoryQuotationRepository::default());
        let state = AppState::new(
            customers.clone(),
            quotations.clone(),
            Arc::new(StaticProbe(true)),
            &pdf,
        );

        Self {
            state,
            customers,
            quotations,
        }
    }
}

/// Build an initialized test service from a `TestContext`
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new().configure(|cfg| $ctx.state.configure(cfg)),
        )
        .await
    };
}

/// POST a JSON body and return the status with the parsed response body
macro_rules! send_json {
    ($app:expr, $method:ident, $uri:expr, $body:expr) => {{
        let req = actix_web::test::TestRequest::$method()
            .uri($uri)
            .set_json($body)
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        let status = resp.status();
        let bytes = actix_web::test::read_body(resp).await;
        let body: serde_json::Value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }};
}

/// GET (or DELETE) a path and return the status with the parsed body
macro_rules! call {
    ($app:expr, $method:ident, $uri:expr) => {{
        let req = actix_web::test::TestRequest::$method().uri($uri).to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        let status = resp.status();
        let bytes = actix_web::test::read_body(resp).await;
        let body: serde_json::Value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }};
}

/// Create a customer through the API and return its id
macro_rules! create_customer {
    ($app:expr, $email:expr) => {{
        let (status, body) = send_json!(
            $app,
            post,
            "/api/customers",
            $crate::helpers::customer_payload($email)
        );
        assert_eq!(status, actix_web::http::StatusCode::CREATED, "{}", body);
        body["id"].as_i64().unwrap()
    }};
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a decimal serialized either as a JSON string or number
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.to_string().parse().unwrap(),
        other => panic!("expected a decimal, got {}", other),
    }
}

pub fn customer_payload(email: &str) -> Value {
    json!({
        "name": "ABC Corporation",
        "contact_person": "Mr. John Smith",
        "email": email,
        "phone": "000-0000-0000",
        "address": "123 Business Avenue",
        "city": "New York",
        "state": "NY",
        "postal_code": "10001"
    })
}

pub fn quotation_payload(customer_id: i64) -> Value {
    json!({
        "customer_id": customer_id,
        "quotation_date": today().to_string(),
        "items": [
            { "description": "Tokyo city tour", "quantity": 2, "unit_price": "1500.00" },
            { "description": "Airport transfer", "quantity": "1.5", "unit_price": 80 }
        ]
    })
}

pub fn pdf_payload() -> Value {
    json!({
        "quotation": {
            "id": 1001,
            "quotation_date": "2025-07-21",
            "valid_until": "2025-08-20",
            "payment_terms": "Net 30 Days",
            "currency": "MYR",
            "conversion_rate": 1,
            "notes": ["Prices include guide fees"]
        },
        "customer": {
            "company_name": "ABC Corporation",
            "contact_person": "Mr. John Smith",
            "email": "contact@abccorp.com",
            "address": "123 Business Avenue"
        },
        "items": [
            { "description": "Tokyo city tour", "quantity": 2, "unit_price": 1500 }
        ]
    })
}

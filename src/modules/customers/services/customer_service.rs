use std::sync::Arc;

use serde::Deserialize;
use validator::Validate;

use crate::core::{AppError, FieldErrors, Page, PageRequest, Result};
use crate::modules::customers::models::{Customer, CustomerRequest};
use crate::modules::customers::repositories::CustomerRepository;

/// Query parameters for listing customers
#[derive(Debug, Default, Deserialize)]
pub struct CustomerListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    pub search: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    crate::core::pagination::DEFAULT_PER_PAGE
}

impl CustomerListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

/// Service for customer business logic
pub struct CustomerService {
    customer_repo: Arc<dyn CustomerRepository>,
}

impl CustomerService {
    pub fn new(customer_repo: Arc<dyn CustomerRepository>) -> Self {
        Self { customer_repo }
    }

    /// Create a customer after validating fields and email uniqueness
    pub async fn create_customer(&self, request: CustomerRequest) -> Result<Customer> {
        let request = request.normalized();
        self.validate(&request, None).await?;

        let customer = self.customer_repo.create(&request).await?;
        tracing::info!(customer_id = customer.id, "Customer created");

        Ok(customer)
    }

    /// Get customer by ID
    pub async fn get_customer(&self, id: i64) -> Result<Customer> {
        self.customer_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Customer {} not found", id)))
    }

    /// Paginated customer listing
    pub async fn list_customers(&self, query: &CustomerListQuery) -> Result<Page<Customer>> {
        let page = query.page_request();
        let (customers, total) = self
            .customer_repo
            .list(query.search.as_deref(), page)
            .await?;

        Ok(Page::new(customers, page, total))
    }

    /// Replace a customer's details
    pub async fn update_customer(&self, id: i64, request: CustomerRequest) -> Result<Customer> {
        // Unknown ids fail with 404 before field validation
        self.get_customer(id).await?;

        let request = request.normalized();
        self.validate(&request, Some(id)).await?;

        let customer = self
            .customer_repo
            .update(id, &request)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Customer {} not found", id)))?;

        tracing::info!(customer_id = id, "Customer updated");
        Ok(customer)
    }

    /// Delete a customer together with its quotations
    pub async fn delete_customer(&self, id: i64) -> Result<()> {
        if !self.customer_repo.delete(id).await? {
            return Err(AppError::not_found(format!("Customer {} not found", id)));
        }

        tracing::info!(customer_id = id, "Customer deleted");
        Ok(())
    }

    async fn validate(&self, request: &CustomerRequest, current_id: Option<i64>) -> Result<()> {
        let mut errors = FieldErrors::new();
        if let Err(validation) = request.validate() {
            errors.merge_validator(&validation, None);
        }

        if !errors.contains("email") {
            if let Some(existing) = self.customer_repo.find_by_email(&request.email).await? {
                if Some(existing.id) != current_id {
                    errors.add("email", "The email has already been taken.");
                }
            }
        }

        errors.into_result()
    }
}

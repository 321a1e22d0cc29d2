use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::core::pagination::DEFAULT_PER_PAGE;
use crate::core::{AppError, Page, PageRequest, Result};
use crate::modules::customers::repositories::CustomerRepository;
use crate::modules::quotations::models::{
    Quotation, QuotationFilter, QuotationRequest, QuotationResponse, QuotationStatus,
    StatusUpdateRequest,
};
use crate::modules::quotations::repositories::QuotationRepository;

/// Query parameters for listing quotations
#[derive(Debug, Clone, Deserialize)]
pub struct QuotationListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    pub status: Option<String>,
    pub customer_id: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub with_deleted: bool,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for QuotationListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
            status: None,
            customer_id: None,
            date_from: None,
            date_to: None,
            with_deleted: false,
        }
    }
}

impl QuotationListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }

    /// Parse the filter part; an unknown status is a 422 on `status`
    pub fn filter(&self) -> Result<QuotationFilter> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<QuotationStatus>()
                    .map_err(|_| AppError::field("status", QuotationStatus::invalid_message()))?,
            ),
        };

        Ok(QuotationFilter {
            status,
            customer_id: self.customer_id,
            date_from: self.date_from,
            date_to: self.date_to,
            with_deleted: self.with_deleted,
        })
    }
}

/// Service for quotation business logic
///
/// Handles:
/// - Field validation and customer existence checks
/// - Total recomputation (through `QuotationDraft`)
/// - Hydrating responses with the owning customer
pub struct QuotationService {
    quotation_repo: Arc<dyn QuotationRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
}

impl QuotationService {
    pub fn new(
        quotation_repo: Arc<dyn QuotationRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
    ) -> Self {
        Self {
            quotation_repo,
            customer_repo,
        }
    }

    /// Create a quotation with its items
    pub async fn create_quotation(&self, request: QuotationRequest) -> Result<QuotationResponse> {
        self.validate(&request, None).await?;
        let draft = request.into_draft(None)?;

        let quotation = self.quotation_repo.create(&draft).await?;

        tracing::info!(
            quotation_id = quotation.id,
            customer_id = quotation.customer_id,
            total_amount = %quotation.total_amount,
            "Quotation created"
        );

        self.hydrate(quotation).await
    }

    /// Get quotation by ID, soft-deleted ones included
    pub async fn get_quotation(&self, id: i64) -> Result<QuotationResponse> {
        let quotation = self.find(id).await?;
        self.hydrate(quotation).await
    }

    /// Paginated listing with customers attached
    pub async fn list_quotations(&self, query: &QuotationListQuery) -> Result<Page<QuotationResponse>> {
        let filter = query.filter()?;
        let page = query.page_request();

        let (quotations, total) = self.quotation_repo.list(&filter, page).await?;

        let mut customer_ids: Vec<i64> = quotations.iter().map(|q| q.customer_id).collect();
        customer_ids.sort_unstable();
        customer_ids.dedup();

        let customers: HashMap<i64, _> = self
            .customer_repo
            .find_by_ids(&customer_ids)
            .await?
            .into_iter()
            .map(|customer| (customer.id, customer))
            .collect();

        let data = quotations
            .into_iter()
            .map(|quotation| {
                let customer = customers.get(&quotation.customer_id).cloned();
                QuotationResponse::new(quotation, customer)
            })
            .collect();

        Ok(Page::new(data, page, total))
    }

    /// Replace header and items; the total is recomputed from the new items
    pub async fn update_quotation(
        &self,
        id: i64,
        request: QuotationRequest,
    ) -> Result<QuotationResponse> {
        let existing = self.find_live(id).await?;

        self.validate(&request, Some(&existing)).await?;
        let draft = request.into_draft(Some(&existing))?;

        let quotation = self
            .quotation_repo
            .replace(id, &draft)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        tracing::info!(
            quotation_id = id,
            items = quotation.items.len(),
            total_amount = %quotation.total_amount,
            "Quotation updated"
        );

        self.hydrate(quotation).await
    }

    /// Set any status value; no transition rules are enforced
    pub async fn update_status(
        &self,
        id: i64,
        request: &StatusUpdateRequest,
    ) -> Result<QuotationResponse> {
        let existing = self.find_live(id).await?;
        let status = request.parse()?;

        if !self.quotation_repo.update_status(id, status).await? {
            return Err(Self::not_found(id));
        }

        tracing::info!(
            quotation_id = id,
            from = %existing.status,
            to = %status,
            "Quotation status changed"
        );

        self.get_quotation(id).await
    }

    /// Soft delete; a second delete reports 404
    pub async fn delete_quotation(&self, id: i64) -> Result<()> {
        if !self.quotation_repo.soft_delete(id).await? {
            return Err(Self::not_found(id));
        }

        tracing::info!(quotation_id = id, "Quotation soft-deleted");
        Ok(())
    }

    async fn validate(&self, request: &QuotationRequest, existing: Option<&Quotation>) -> Result<()> {
        let today = Utc::now().date_naive();
        let mut errors = request.check(today, existing);

        if let Some(customer_id) = request.customer_id {
            if self.customer_repo.find_by_id(customer_id).await?.is_none() {
                errors.add("customer_id", "The selected customer id is invalid.");
            }
        }

        errors.into_result()
    }

    async fn find(&self, id: i64) -> Result<Quotation> {
        self.quotation_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Like `find`, but soft-deleted quotations count as missing
    async fn find_live(&self, id: i64) -> Result<Quotation> {
        let quotation = self.find(id).await?;
        if quotation.is_deleted() {
            return Err(Self::not_found(id));
        }
        Ok(quotation)
    }

    async fn hydrate(&self, quotation: Quotation) -> Result<QuotationResponse> {
        let customer = self.customer_repo.find_by_id(quotation.customer_id).await?;
        Ok(QuotationResponse::new(quotation, customer))
    }

    fn not_found(id: i64) -> AppError {
        AppError::not_found(format!("Quotation {} not found", id))
    }
}

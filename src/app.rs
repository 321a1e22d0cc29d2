// Application wiring: services, shared PDF renderer and route table

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use sqlx::MySqlPool;

use crate::config::PdfConfig;
use crate::middleware::{json_config, query_config, RateLimiter};
use crate::modules::customers::{
    self, CustomerRepository, CustomerService, MySqlCustomerRepository,
};
use crate::modules::health::{self, ReadinessProbe};
use crate::modules::pdf::{self, PdfRenderer};
use crate::modules::quotations::{
    self, MySqlQuotationRepository, QuotationRepository, QuotationService,
};

/// Everything a worker needs; cloned into each worker
#[derive(Clone)]
pub struct AppState {
    pub customers: Arc<CustomerService>,
    pub quotations: Arc<QuotationService>,
    pub renderer: Arc<PdfRenderer>,
    pub pdf_limiter: RateLimiter,
    pub probe: Arc<dyn ReadinessProbe>,
}

impl AppState {
    pub fn new(
        customer_repo: Arc<dyn CustomerRepository>,
        quotation_repo: Arc<dyn QuotationRepository>,
        probe: Arc<dyn ReadinessProbe>,
        pdf: &PdfConfig,
    ) -> Self {
        Self {
            customers: Arc::new(CustomerService::new(customer_repo.clone())),
            quotations: Arc::new(QuotationService::new(quotation_repo, customer_repo)),
            renderer: Arc::new(PdfRenderer::new(pdf)),
            pdf_limiter: RateLimiter::per_window(
                pdf.rate_limit_max,
                Duration::from_secs(pdf.rate_limit_window_secs),
            ),
            probe,
        }
    }

    /// State backed by MySQL repositories
    pub fn from_pool(pool: MySqlPool, pdf: &PdfConfig) -> Self {
        Self::new(
            Arc::new(MySqlCustomerRepository::new(pool.clone())),
            Arc::new(MySqlQuotationRepository::new(pool.clone())),
            Arc::new(pool),
            pdf,
        )
    }

    /// Register shared data and every route
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(json_config())
            .app_data(query_config())
            .app_data(web::Data::new(self.customers.clone()))
            .app_data(web::Data::new(self.quotations.clone()))
            .app_data(web::Data::new(self.renderer.clone()))
            .app_data(web::Data::new(self.probe.clone()))
            .configure(health::controllers::configure)
            .service(
                web::scope("/api")
                    .configure(|api| pdf::controllers::configure(api, &self.pdf_limiter))
                    .configure(customers::controllers::configure)
                    .configure(quotations::controllers::configure),
            );
    }
}

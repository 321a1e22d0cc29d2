use std::sync::Arc;

use actix_web::{http::header, web, HttpResponse};

use crate::core::error::AppError;
use crate::middleware::RateLimiter;
use crate::modules::pdf::models::PdfRequest;
use crate::modules::pdf::services::PdfRenderer;
use crate::modules::quotations::QuotationService;

/// Render a quotation sent by the client
/// POST /generate-quotation-pdf
pub async fn generate_quotation_pdf(
    renderer: web::Data<Arc<PdfRenderer>>,
    request: web::Json<PdfRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let filename = request.filename();
    let bytes = render(renderer.get_ref().clone(), request).await?;

    Ok(pdf_response(bytes, &filename))
}

/// Render a stored quotation
/// GET /quotations/{id}/pdf
pub async fn stored_quotation_pdf(
    renderer: web::Data<Arc<PdfRenderer>>,
    quotations: web::Data<Arc<QuotationService>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let response = quotations.get_quotation(id).await?;
    let customer = response
        .customer
        .as_ref()
        .ok_or_else(|| AppError::not_found(format!("Customer for quotation {} not found", id)))?;

    let request = PdfRequest::from_stored(&response.quotation, customer);
    let filename = request.filename();
    let bytes = render(renderer.get_ref().clone(), request).await?;

    Ok(pdf_response(bytes, &filename))
}

async fn render(renderer: Arc<PdfRenderer>, request: PdfRequest) -> Result<Vec<u8>, AppError> {
    web::block(move || renderer.render_request(&request))
        .await
        .map_err(|e| AppError::internal(format!("PDF worker failed: {}", e)))?
}

fn pdf_response(bytes: Vec<u8>, filename: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(bytes)
}

/// Configure PDF routes; both share one per-client rate limit budget.
///
/// Register before the quotations scope so `/quotations/{id}/pdf` is matched here.
pub fn configure(cfg: &mut web::ServiceConfig, limiter: &RateLimiter) {
    cfg.service(
        web::resource("/generate-quotation-pdf")
            .wrap(limiter.clone())
            .route(web::post().to(generate_quotation_pdf)),
    )
    .service(
        web::resource("/quotations/{id}/pdf")
            .wrap(limiter.clone())
            .route(web::get().to(stored_quotation_pdf)),
    );
}

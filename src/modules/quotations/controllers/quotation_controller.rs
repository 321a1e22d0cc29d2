use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::quotations::models::{QuotationRequest, StatusUpdateRequest};
use crate::modules::quotations::services::{QuotationListQuery, QuotationService};

/// List quotations
/// GET /quotations?page=&per_page=&status=&customer_id=&date_from=&date_to=&with_deleted=
pub async fn list_quotations(
    service: web::Data<Arc<QuotationService>>,
    query: web::Query<QuotationListQuery>,
) -> Result<HttpResponse, AppError> {
    let page = service.list_quotations(&query).await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Create a quotation with items
/// POST /quotations
pub async fn create_quotation(
    service: web::Data<Arc<QuotationService>>,
    request: web::Json<QuotationRequest>,
) -> Result<HttpResponse, AppError> {
    let quotation = service.create_quotation(request.into_inner()).await?;

    Ok(HttpResponse::Created().json(quotation))
}

/// Get quotation by ID
/// GET /quotations/{id}
pub async fn get_quotation(
    service: web::Data<Arc<QuotationService>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let quotation = service.get_quotation(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(quotation))
}

/// Update a quotation, replacing its items
/// PUT /quotations/{id}
pub async fn update_quotation(
    service: web::Data<Arc<QuotationService>>,
    path: web::Path<i64>,
    request: web::Json<QuotationRequest>,
) -> Result<HttpResponse, AppError> {
    let quotation = service
        .update_quotation(path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(quotation))
}

/// Change quotation status
/// POST /quotations/{id}/status
pub async fn update_status(
    service: web::Data<Arc<QuotationService>>,
    path: web::Path<i64>,
    request: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let quotation = service.update_status(path.into_inner(), &request).await?;

    Ok(HttpResponse::Ok().json(quotation))
}

/// Soft-delete a quotation
/// DELETE /quotations/{id}
pub async fn delete_quotation(
    service: web::Data<Arc<QuotationService>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    service.delete_quotation(path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure quotation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/quotations")
            .route("", web::get().to(list_quotations))
            .route("", web::post().to(create_quotation))
            .route("/{id}", web::get().to(get_quotation))
            .route("/{id}", web::put().to(update_quotation))
            .route("/{id}", web::delete().to(delete_quotation))
            .route("/{id}/status", web::post().to(update_status)),
    );
}

use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::customers::models::CustomerRequest;
use crate::modules::customers::services::{CustomerListQuery, CustomerService};

/// List customers
/// GET /customers
pub async fn list_customers(
    service: web::Data<Arc<CustomerService>>,
    query: web::Query<CustomerListQuery>,
) -> Result<HttpResponse, AppError> {
    let page = service.list_customers(&query).await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Create a customer
/// POST /customers
pub async fn create_customer(
    service: web::Data<Arc<CustomerService>>,
    request: web::Json<CustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let customer = service.create_customer(request.into_inner()).await?;

    Ok(HttpResponse::Created().json(customer))
}

/// Get customer by ID
/// GET /customers/{id}
pub async fn get_customer(
    service: web::Data<Arc<CustomerService>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let customer = service.get_customer(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(customer))
}

/// Update a customer
/// PUT /customers/{id}
pub async fn update_customer(
    service: web::Data<Arc<CustomerService>>,
    path: web::Path<i64>,
    request: web::Json<CustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let customer = service
        .update_customer(path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(customer))
}

/// Delete a customer (cascades to its quotations)
/// DELETE /customers/{id}
pub async fn delete_customer(
    service: web::Data<Arc<CustomerService>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    service.delete_customer(path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure customer routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/customers")
            .route("", web::get().to(list_customers))
            .route("", web::post().to(create_customer))
            .route("/{id}", web::get().to(get_customer))
            .route("/{id}", web::put().to(update_customer))
            .route("/{id}", web::delete().to(delete_customer)),
    );
}

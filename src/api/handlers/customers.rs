use crate::api::models::CustomerPayload;
use crate::core::error::{ApiError, Result};
use crate::core::filter::Filter;
use crate::db::models::{display_number, parse_number};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use super::AppState;

/// Handler for GET /customers - List all customers
pub async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let customers = state
        .store
        .get_customers()
        .await
        .map_err(ApiError::into_internal)?;

    Ok(Json(customers))
}

/// Handler for GET /customers/:id - Get customer by customer number
pub async fn get_customer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_number(&raw_id)
        .ok_or_else(|| ApiError::NotFound(format!("customer {} not found", raw_id)))?;

    let customer = state
        .store
        .get_customer_by_id(id)
        .await
        .map_err(ApiError::into_internal)?
        .ok_or_else(|| ApiError::NotFound(format!("customer {} not found", display_number(id))))?;

    Ok(Json(customer))
}

/// Handler for GET /customers/find?name=value - Single-field search
pub async fn find_customers(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse> {
    let filter = Filter::from_query(pairs)?;

    let customers = state
        .store
        .get_customers_by_filter(&filter)
        .await
        .map_err(ApiError::into_internal)?;

    if customers.is_empty() {
        return Err(ApiError::NotFound(
            "no matching customer documents found".to_string(),
        ));
    }

    Ok(Json(customers))
}

/// Handler for POST /customers - Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    CustomerPayload(candidate): CustomerPayload,
) -> Result<impl IntoResponse> {
    let created = state.customer_service.create(candidate).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for PUT /customers/:id - Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    CustomerPayload(changes): CustomerPayload,
) -> Result<impl IntoResponse> {
    let id = parse_number(&raw_id)
        .ok_or_else(|| ApiError::BadRequest("id must be a number".to_string()))?;

    let message = state.customer_service.update(id, changes).await?;

    Ok(message)
}

/// Handler for DELETE /customers/:id - Delete a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_number(&raw_id)
        .ok_or_else(|| ApiError::NotFound(format!("customer {} not found", raw_id)))?;

    let deleted = state
        .store
        .delete_customer_by_id(id)
        .await
        .map_err(ApiError::into_internal)?;

    if !deleted {
        return Err(ApiError::NotFound(format!(
            "customer {} not found",
            display_number(id)
        )));
    }

    tracing::info!(id = %display_number(id), "Customer deleted");
    Ok(format!("customer {} deleted", display_number(id)))
}

/// Handler for GET /reset - Restore the seed customers
pub async fn reset_customers(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let inserted = state
        .store
        .reset_customers()
        .await
        .map_err(ApiError::into_internal)?;

    tracing::info!(inserted, "Customer data reset");
    Ok(format!("data was reset. {} customers inserted", inserted))
}

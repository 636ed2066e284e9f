//! API routes

use crate::api::handlers::{
    create_customer, delete_customer, find_customers, get_customer, list_customers,
    reset_customers, update_customer, AppState,
};
use crate::api::middleware::{api_key_middleware, ApiKey};
use axum::{middleware, routing::get, Router};

/// Build the customer routes, every one of them behind the API key check
///
/// `/customers/find` is a static segment, so it is matched ahead of `/customers/:id`.
pub fn build_api_routes(state: AppState, api_key: ApiKey) -> Router {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/find", get(find_customers))
        .route(
            "/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/reset", get(reset_customers))
        .route_layer(middleware::from_fn_with_state(api_key, api_key_middleware))
        .with_state(state)
}

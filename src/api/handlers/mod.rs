pub mod customers;
pub mod system;

pub use customers::*;
pub use system::*;

use crate::core::services::CustomerService;
use crate::db::repository::CustomerStore;
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CustomerStore>,
    pub customer_service: Arc<CustomerService>,
}

impl AppState {
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        let customer_service = Arc::new(CustomerService::new(store.clone()));
        Self {
            store,
            customer_service,
        }
    }
}

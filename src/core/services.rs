//! Business logic services
//!
//! Validation that has to happen between the HTTP layer and the customer
//! store: duplicate detection before inserts and payload sanitising before
//! updates.

use crate::core::error::{ApiError, Result};
use crate::core::filter::Filter;
use crate::db::models::{display_number, number_value, Customer, IDENTIFIER_FIELD};
use crate::db::repository::CustomerStore;
use std::sync::Arc;

/// Customer service for create/update rules
pub struct CustomerService {
    store: Arc<dyn CustomerStore>,
}

impl CustomerService {
    /// Create a new CustomerService
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self { store }
    }

    /// Insert a new customer unless its id or email is already taken.
    ///
    /// Returns the stored record with its assigned `_id`. Every failure is a
    /// bad request, including errors reported by the store.
    pub async fn create(&self, mut candidate: Customer) -> Result<Customer> {
        candidate.remove(IDENTIFIER_FIELD);
        if candidate.is_empty() {
            return Err(missing_body());
        }

        let id = candidate
            .number()
            .ok_or_else(|| ApiError::BadRequest("id must be a number".to_string()))?;
        let email = candidate
            .email()
            .ok_or_else(|| ApiError::BadRequest("email must be a string".to_string()))?
            .to_string();

        let duplicates = self
            .store
            .get_customers_by_filter(&Filter::duplicate_of(id, email))
            .await
            .map_err(ApiError::into_bad_request)?;

        if !duplicates.is_empty() {
            tracing::info!(
                id = %display_number(id),
                matches = duplicates.len(),
                "Rejected customer with duplicate id or email"
            );
            return Err(ApiError::BadRequest(
                "duplicate id or email not allowed".to_string(),
            ));
        }

        candidate.insert("id", number_value(id));

        let identifier = self
            .store
            .add_customer(candidate.clone())
            .await
            .map_err(ApiError::into_bad_request)?;

        tracing::info!(id = %display_number(id), identifier = %identifier, "Customer created");

        Ok(candidate.with_identifier(identifier))
    }

    /// Apply a change set to the customer with number `id`.
    ///
    /// `_id` is stripped from the payload so the stored identifier can never be
    /// rewritten, and a payload `id` must agree with the path.
    pub async fn update(&self, id: f64, mut changes: Customer) -> Result<String> {
        changes.remove(IDENTIFIER_FIELD);
        if changes.is_empty() {
            return Err(missing_body());
        }

        if changes.get("id").is_some() {
            match changes.number() {
                Some(body_id) if body_id == id => {
                    changes.insert("id", number_value(id));
                }
                Some(_) => {
                    return Err(ApiError::BadRequest(
                        "id in request body does not match the customer being updated".to_string(),
                    ));
                }
                None => {
                    return Err(ApiError::BadRequest("id must be a number".to_string()));
                }
            }
        }

        let updated = self
            .store
            .update_customer(id, changes)
            .await
            .map_err(ApiError::into_bad_request)?;

        if !updated {
            return Err(ApiError::BadRequest(format!(
                "customer {} not found",
                display_number(id)
            )));
        }

        Ok(format!("customer {} updated", display_number(id)))
    }
}

fn missing_body() -> ApiError {
    ApiError::BadRequest("missing request body".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::manager::DatabaseManager;
    use crate::db::repository::SqliteCustomerStore;
    use serde_json::json;

    fn setup() -> (CustomerService, Arc<SqliteCustomerStore>) {
        let db = Arc::new(DatabaseManager::new_in_memory().unwrap());
        let store = Arc::new(SqliteCustomerStore::new(db));
        (CustomerService::new(store.clone()), store)
    }

    fn customer(value: serde_json::Value) -> Customer {
        serde_json::from_value(value).unwrap()
    }

    async fn count(store: &SqliteCustomerStore) -> usize {
        store.get_customers().await.unwrap().len()
    }

    #[tokio::test]
    async fn test_create_novel_customer() {
        let (service, store) = setup();

        let created = service
            .create(customer(json!({"id": 10, "email": "new@abc.com", "name": "New"})))
            .await
            .unwrap();

        assert!(created.identifier().is_some());
        assert_eq!(created.get("name"), Some(&json!("New")));
        assert_eq!(count(&store).await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected_without_insert() {
        let (service, store) = setup();
        store.reset_customers().await.unwrap();

        let err = service
            .create(customer(json!({"id": 1, "email": "fresh@abc.com"})))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "duplicate id or email not allowed");
        assert_eq!(count(&store).await, 3);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_without_insert() {
        let (service, store) = setup();
        store.reset_customers().await.unwrap();

        let err = service
            .create(customer(json!({"id": 77, "email": "maryj@abc.com"})))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "duplicate id or email not allowed");
        assert_eq!(count(&store).await, 3);
    }

    #[tokio::test]
    async fn test_string_id_matches_numeric_duplicate() {
        let (service, store) = setup();
        store.reset_customers().await.unwrap();

        let err = service
            .create(customer(json!({"id": "2", "email": "other@abc.com"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_requires_numeric_id_and_email() {
        let (service, _store) = setup();

        let err = service
            .create(customer(json!({"id": "abc", "email": "a@b.com"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "id must be a number");

        let err = service
            .create(customer(json!({"id": 4})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "email must be a string");
    }

    #[tokio::test]
    async fn test_create_only_identifier_is_missing_body() {
        let (service, _store) = setup();

        let err = service
            .create(customer(json!({"_id": "abc"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "missing request body");
    }

    #[tokio::test]
    async fn test_update_strips_identifier() {
        let (service, store) = setup();
        store.reset_customers().await.unwrap();
        let before = store.get_customer_by_id(0.0).await.unwrap().unwrap();

        let message = service
            .update(0.0, customer(json!({"_id": "forged", "name": "Mary J."})))
            .await
            .unwrap();
        assert_eq!(message, "customer 0 updated");

        let after = store.get_customer_by_id(0.0).await.unwrap().unwrap();
        assert_eq!(after.identifier(), before.identifier());
        assert_eq!(after.get("name"), Some(&json!("Mary J.")));
    }

    #[tokio::test]
    async fn test_update_with_only_identifier_is_missing_body() {
        let (service, _store) = setup();

        let err = service
            .update(0.0, customer(json!({"_id": "forged"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "missing request body");
    }

    #[tokio::test]
    async fn test_update_rejects_mismatched_id() {
        let (service, store) = setup();
        store.reset_customers().await.unwrap();

        let err = service
            .update(0.0, customer(json!({"id": 5, "name": "X"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        assert!(store.get_customer_by_id(5.0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_unknown_customer() {
        let (service, _store) = setup();

        let err = service
            .update(42.0, customer(json!({"name": "Ghost"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "customer 42 not found");
    }
}

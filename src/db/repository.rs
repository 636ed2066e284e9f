//! Data access layer for customer records
//!
//! Handlers talk to storage only through [`CustomerStore`], so any backend
//! that honours its contract can sit behind the API.

use crate::core::error::{ApiError, Result};
use crate::core::filter::{Criterion, Filter};
use crate::db::manager::DatabaseManager;
use crate::db::models::{display_number, number_value, seed_customers, Customer, IDENTIFIER_FIELD};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::sync::Arc;
use uuid::Uuid;

/// Persistence operations the customer routes depend on
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Every customer, ordered by customer number
    async fn get_customers(&self) -> Result<Vec<Customer>>;

    /// The customer with the given customer number, if any
    async fn get_customer_by_id(&self, id: f64) -> Result<Option<Customer>>;

    /// Every customer matching the filter
    async fn get_customers_by_filter(&self, filter: &Filter) -> Result<Vec<Customer>>;

    /// Insert a new customer and return the identifier assigned to it
    async fn add_customer(&self, customer: Customer) -> Result<String>;

    /// Merge `changes` into the stored customer; `false` if no such customer
    async fn update_customer(&self, id: f64, changes: Customer) -> Result<bool>;

    /// Remove a customer; `false` if no such customer
    async fn delete_customer_by_id(&self, id: f64) -> Result<bool>;

    /// Replace all customers with the seed set; returns how many were inserted
    async fn reset_customers(&self) -> Result<usize>;
}

/// SQLite-backed customer store
pub struct SqliteCustomerStore {
    db: Arc<DatabaseManager>,
}

impl SqliteCustomerStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

const SELECT_DOCUMENTS: &str = "SELECT _id, document FROM customers";

fn row_to_customer(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get(0)?, row.get(1)?))
}

fn decode(identifier: String, document: String) -> Result<Customer> {
    let customer: Customer = serde_json::from_str(&document)?;
    Ok(customer.with_identifier(identifier))
}

fn query_customers(conn: &Connection, sql: &str, args: &[&dyn ToSql]) -> Result<Vec<Customer>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(args, row_to_customer)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(identifier, document)| decode(identifier, document))
        .collect()
}

/// Pull the indexed columns out of a customer document
///
/// The stored document never contains `_id`; it lives in its own column.
fn indexed_columns(customer: &Customer) -> Result<(f64, String, Option<String>, String)> {
    let id = customer
        .number()
        .ok_or_else(|| ApiError::BadRequest("id must be a number".to_string()))?;
    let email = customer
        .email()
        .ok_or_else(|| ApiError::BadRequest("email must be a string".to_string()))?
        .to_string();
    let password = customer.password();

    let mut document = customer.clone();
    document.remove(IDENTIFIER_FIELD);
    document.insert("id", number_value(id));

    Ok((id, email, password, serde_json::to_string(&document)?))
}

fn insert_customer(conn: &Connection, identifier: &str, customer: &Customer) -> Result<()> {
    let (id, email, password, document) = indexed_columns(customer)?;
    conn.execute(
        "INSERT INTO customers (_id, id, email, password, document) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![identifier, id, email, password, document],
    )
    .map_err(|e| constraint_message(e, id))?;
    Ok(())
}

/// Turn UNIQUE violations into a readable rejection
fn constraint_message(err: rusqlite::Error, id: f64) -> ApiError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            ApiError::BadRequest(format!(
                "customer {} conflicts with an existing id or email",
                display_number(id)
            ))
        }
        _ => ApiError::Database(err),
    }
}

#[async_trait]
impl CustomerStore for SqliteCustomerStore {
    async fn get_customers(&self) -> Result<Vec<Customer>> {
        self.db
            .execute(|conn| {
                query_customers(conn, &format!("{} ORDER BY id", SELECT_DOCUMENTS), params![])
            })
            .await
    }

    async fn get_customer_by_id(&self, id: f64) -> Result<Option<Customer>> {
        self.db
            .execute(move |conn| {
                conn.query_row(
                    &format!("{} WHERE id = ?1", SELECT_DOCUMENTS),
                    params![id],
                    row_to_customer,
                )
                .optional()?
                .map(|(identifier, document)| decode(identifier, document))
                .transpose()
            })
            .await
    }

    async fn get_customers_by_filter(&self, filter: &Filter) -> Result<Vec<Customer>> {
        let filter = filter.clone();
        self.db
            .execute(move |conn| match &filter {
                Filter::Match(criterion) => {
                    let sql = format!(
                        "{} WHERE {} = ?1 ORDER BY id",
                        SELECT_DOCUMENTS,
                        criterion.field()
                    );
                    match criterion {
                        Criterion::Id(id) => query_customers(conn, &sql, params![id]),
                        Criterion::Email(value) | Criterion::Password(value) => {
                            query_customers(conn, &sql, params![value])
                        }
                    }
                }
                Filter::IdOrEmail { id, email } => query_customers(
                    conn,
                    &format!("{} WHERE id = ?1 OR email = ?2 ORDER BY id", SELECT_DOCUMENTS),
                    params![id, email],
                ),
            })
            .await
    }

    async fn add_customer(&self, customer: Customer) -> Result<String> {
        let identifier = Uuid::new_v4().to_string();
        let assigned = identifier.clone();

        self.db
            .execute(move |conn| insert_customer(conn, &identifier, &customer))
            .await?;

        tracing::debug!(identifier = %assigned, "Customer inserted");
        Ok(assigned)
    }

    async fn update_customer(&self, id: f64, mut changes: Customer) -> Result<bool> {
        changes.remove(IDENTIFIER_FIELD);

        self.db
            .transaction(move |tx| {
                let stored: Option<String> = tx
                    .query_row(
                        "SELECT document FROM customers WHERE id = ?1",
                        params![id],
                        |row| row.get(0),
                    )
                    .optional()?;

                let Some(document) = stored else {
                    return Ok(false);
                };

                let mut customer: Customer = serde_json::from_str(&document)?;
                customer.merge(changes);

                let (new_id, email, password, document) = indexed_columns(&customer)?;
                tx.execute(
                    "UPDATE customers SET id = ?1, email = ?2, password = ?3, document = ?4, \
                     updated_at = CURRENT_TIMESTAMP WHERE id = ?5",
                    params![new_id, email, password, document, id],
                )
                .map_err(|e| constraint_message(e, new_id))?;

                Ok(true)
            })
            .await
    }

    async fn delete_customer_by_id(&self, id: f64) -> Result<bool> {
        self.db
            .execute(move |conn| {
                let removed = conn.execute("DELETE FROM customers WHERE id = ?1", params![id])?;
                Ok(removed > 0)
            })
            .await
    }

    async fn reset_customers(&self) -> Result<usize> {
        self.db
            .transaction(|tx| {
                tx.execute("DELETE FROM customers", [])?;

                let seeds = seed_customers();
                for customer in &seeds {
                    insert_customer(tx, &Uuid::new_v4().to_string(), customer)?;
                }

                Ok(seeds.len())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> SqliteCustomerStore {
        SqliteCustomerStore::new(Arc::new(DatabaseManager::new_in_memory().unwrap()))
    }

    fn customer(value: serde_json::Value) -> Customer {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_add_and_get_by_id() {
        let store = store();
        let identifier = store
            .add_customer(customer(json!({"id": 7, "email": "g@h.com", "name": "Gail"})))
            .await
            .unwrap();

        let found = store.get_customer_by_id(7.0).await.unwrap().unwrap();
        assert_eq!(found.identifier(), Some(identifier.as_str()));
        assert_eq!(found.get("name"), Some(&json!("Gail")));
        assert_eq!(found.get("id"), Some(&json!(7)));
    }

    #[tokio::test]
    async fn test_get_missing_customer() {
        assert!(store().get_customer_by_id(99.0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_string_id_is_stored_as_number() {
        let store = store();
        store
            .add_customer(customer(json!({"id": "12", "email": "s@t.com"})))
            .await
            .unwrap();

        let found = store.get_customer_by_id(12.0).await.unwrap().unwrap();
        assert_eq!(found.get("id"), Some(&json!(12)));
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected_by_store() {
        let store = store();
        store
            .add_customer(customer(json!({"id": 1, "email": "a@b.com"})))
            .await
            .unwrap();

        let err = store
            .add_customer(customer(json!({"id": 2, "email": "a@b.com"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_filter_by_each_field() {
        let store = store();
        store.reset_customers().await.unwrap();

        let by_id = store
            .get_customers_by_filter(&Filter::Match(Criterion::Id(1.0)))
            .await
            .unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].email(), Some("karena@abc.com"));

        let by_email = store
            .get_customers_by_filter(&Filter::Match(Criterion::Email("scottr@abc.com".into())))
            .await
            .unwrap();
        assert_eq!(by_email[0].number(), Some(2.0));

        let by_password = store
            .get_customers_by_filter(&Filter::Match(Criterion::Password("maryj".into())))
            .await
            .unwrap();
        assert_eq!(by_password[0].number(), Some(0.0));

        let none = store
            .get_customers_by_filter(&Filter::Match(Criterion::Email("nobody@abc.com".into())))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_id_or_email_filter_is_disjunctive() {
        let store = store();
        store.reset_customers().await.unwrap();

        let matches = store
            .get_customers_by_filter(&Filter::duplicate_of(0.0, "karena@abc.com"))
            .await
            .unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_identifier() {
        let store = store();
        let identifier = store
            .add_customer(customer(json!({"id": 3, "email": "c@d.com", "name": "Cy"})))
            .await
            .unwrap();

        let updated = store
            .update_customer(3.0, customer(json!({"_id": "forged", "name": "Cyrus"})))
            .await
            .unwrap();
        assert!(updated);

        let found = store.get_customer_by_id(3.0).await.unwrap().unwrap();
        assert_eq!(found.identifier(), Some(identifier.as_str()));
        assert_eq!(found.get("name"), Some(&json!("Cyrus")));
        assert_eq!(found.email(), Some("c@d.com"));
    }

    #[tokio::test]
    async fn test_update_missing_customer() {
        let updated = store()
            .update_customer(5.0, customer(json!({"name": "Nobody"})))
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_update_to_taken_email_rejected() {
        let store = store();
        store.reset_customers().await.unwrap();

        let err = store
            .update_customer(0.0, customer(json!({"email": "karena@abc.com"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store();
        store.reset_customers().await.unwrap();

        assert!(store.delete_customer_by_id(1.0).await.unwrap());
        assert!(!store.delete_customer_by_id(1.0).await.unwrap());
        assert_eq!(store.get_customers().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_replaces_everything() {
        let store = store();
        store
            .add_customer(customer(json!({"id": 50, "email": "extra@abc.com"})))
            .await
            .unwrap();

        assert_eq!(store.reset_customers().await.unwrap(), 3);

        let all = store.get_customers().await.unwrap();
        let ids: Vec<_> = all.iter().filter_map(Customer::number).collect();
        assert_eq!(ids, vec![0.0, 1.0, 2.0]);
        assert!(all.iter().all(|c| c.identifier().is_some()));
    }

    #[tokio::test]
    async fn test_numeric_password_is_searchable() {
        let store = store();
        store
            .add_customer(customer(json!({"id": 3, "email": "n@p.com", "password": 123})))
            .await
            .unwrap();

        let found = store
            .get_customers_by_filter(&Filter::Match(Criterion::Password("123".into())))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("password"), Some(&json!(123)));
    }
}

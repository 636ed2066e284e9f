//! Customer lookup filters
//!
//! A search accepts exactly one `name=value` pair from the query string and
//! turns it into a [`Filter`]. Duplicate detection builds the two-field
//! disjunctive form directly.

use crate::core::error::{ApiError, Result};
use crate::db::models::parse_number;

/// Query parameter that may carry the API key; never treated as a filter field
pub const API_KEY_QUERY_PARAM: &str = "apikey";

/// Fields a search may match on
pub const SEARCHABLE_FIELDS: [&str; 3] = ["id", "email", "password"];

/// One field constraint
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Id(f64),
    Email(String),
    Password(String),
}

impl Criterion {
    /// Column the criterion matches against
    pub fn field(&self) -> &'static str {
        match self {
            Criterion::Id(_) => "id",
            Criterion::Email(_) => "email",
            Criterion::Password(_) => "password",
        }
    }
}

/// Match criteria handed to the customer store
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Exactly one field must match
    Match(Criterion),
    /// Either the customer number or the email matches
    IdOrEmail { id: f64, email: String },
}

impl Filter {
    /// Build a search filter from raw query-string pairs.
    ///
    /// The `apikey` parameter is dropped first; what remains must be a single
    /// recognised `name=value` pair.
    pub fn from_query<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut remaining = pairs
            .into_iter()
            .filter(|(name, _)| name.as_ref() != API_KEY_QUERY_PARAM);

        let (name, value) = match (remaining.next(), remaining.next()) {
            (None, _) => {
                return Err(ApiError::BadRequest("query string required".to_string()));
            }
            (Some(_), Some(_)) => {
                return Err(ApiError::BadRequest(
                    "only one name/value pair is allowed".to_string(),
                ));
            }
            (Some(pair), None) => pair,
        };

        let value = value.as_ref();
        let criterion = match name.as_ref() {
            "id" => {
                let id = parse_number(value)
                    .ok_or_else(|| ApiError::BadRequest("id must be a number".to_string()))?;
                Criterion::Id(id)
            }
            "email" => Criterion::Email(value.to_string()),
            "password" => Criterion::Password(value.to_string()),
            _ => {
                return Err(ApiError::BadRequest(format!(
                    "name must be one of the following ({})",
                    SEARCHABLE_FIELDS.join(", ")
                )));
            }
        };

        Ok(Filter::Match(criterion))
    }

    /// Filter that finds any record sharing the given customer number or email
    pub fn duplicate_of(id: f64, email: impl Into<String>) -> Self {
        Filter::IdOrEmail {
            id,
            email: email.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn build(pairs: &[(&str, &str)]) -> Result<Filter> {
        Filter::from_query(pairs.iter().copied())
    }

    fn bad_request_message(result: Result<Filter>) -> String {
        match result {
            Err(err) => {
                assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
                err.to_string()
            }
            Ok(filter) => panic!("expected a bad request, got {:?}", filter),
        }
    }

    #[test]
    fn test_empty_query_rejected() {
        assert_eq!(bad_request_message(build(&[])), "query string required");
    }

    #[test]
    fn test_only_api_key_counts_as_empty() {
        assert_eq!(
            bad_request_message(build(&[("apikey", "secret")])),
            "query string required"
        );
    }

    #[test]
    fn test_two_pairs_rejected() {
        assert_eq!(
            bad_request_message(build(&[("id", "3"), ("email", "a@b.com")])),
            "only one name/value pair is allowed"
        );
    }

    #[test]
    fn test_repeated_name_counts_as_two_pairs() {
        assert_eq!(
            bad_request_message(build(&[("id", "3"), ("id", "4")])),
            "only one name/value pair is allowed"
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert_eq!(
            bad_request_message(build(&[("foo", "bar")])),
            "name must be one of the following (id, email, password)"
        );
    }

    #[test]
    fn test_non_numeric_id_rejected() {
        assert_eq!(bad_request_message(build(&[("id", "abc")])), "id must be a number");
        assert_eq!(bad_request_message(build(&[("id", "")])), "id must be a number");
    }

    #[test]
    fn test_id_filter_is_numeric() {
        assert_eq!(build(&[("id", "42")]).unwrap(), Filter::Match(Criterion::Id(42.0)));
    }

    #[test]
    fn test_email_filter_keeps_raw_value() {
        assert_eq!(
            build(&[("email", "x@y.com")]).unwrap(),
            Filter::Match(Criterion::Email("x@y.com".to_string()))
        );
    }

    #[test]
    fn test_password_filter() {
        assert_eq!(
            build(&[("password", "")]).unwrap(),
            Filter::Match(Criterion::Password(String::new()))
        );
    }

    #[test]
    fn test_api_key_ignored_alongside_field() {
        assert_eq!(
            build(&[("apikey", "secret"), ("email", "x@y.com")]).unwrap(),
            Filter::Match(Criterion::Email("x@y.com".to_string()))
        );
    }

    #[test]
    fn test_duplicate_filter() {
        assert_eq!(
            Filter::duplicate_of(1.0, "a@b.com"),
            Filter::IdOrEmail { id: 1.0, email: "a@b.com".to_string() }
        );
    }

    #[test]
    fn test_criterion_fields() {
        assert_eq!(Criterion::Id(1.0).field(), "id");
        assert_eq!(Criterion::Email(String::new()).field(), "email");
        assert_eq!(Criterion::Password(String::new()).field(), "password");
    }
}

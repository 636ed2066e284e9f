use crate::core::error::ApiError;
use crate::db::models::Customer;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;

/// JSON object request body for create and update.
///
/// Parsed regardless of `Content-Type`. An absent body, `{}`, or a JSON
/// `null` all count as a missing body.
#[derive(Debug)]
pub struct CustomerPayload(pub Customer);

impl CustomerPayload {
    pub fn parse(bytes: &[u8]) -> Result<Self, ApiError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(missing_body());
        }

        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e)))?;

        match value {
            Value::Object(fields) if !fields.is_empty() => Ok(Self(Customer::new(fields))),
            Value::Object(_) | Value::Null => Err(missing_body()),
            _ => Err(ApiError::BadRequest(
                "request body must be a JSON object".to_string(),
            )),
        }
    }
}

fn missing_body() -> ApiError {
    ApiError::BadRequest("missing request body".to_string())
}

#[async_trait]
impl<S> FromRequest<S> for CustomerPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Self::parse(&bytes)
    }
}

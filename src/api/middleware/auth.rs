use crate::core::error::ApiError;
use crate::core::filter::API_KEY_QUERY_PARAM;
use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

/// HTTP header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Where a presented credential was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Header,
    Query,
}

impl CredentialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Header => "header",
            CredentialSource::Query => "query",
        }
    }
}

/// The shared secret protected routes are checked against
///
/// Cloned into the middleware state; never mutated after startup.
#[derive(Clone, Debug)]
pub struct ApiKey {
    expected: Option<SecretString>,
}

impl ApiKey {
    /// An empty secret is treated as no secret at all
    pub fn new(expected: Option<SecretString>) -> Self {
        let expected = expected.filter(|key| !key.expose_secret().is_empty());
        Self { expected }
    }

    /// Whether any request can ever pass this check
    pub fn is_configured(&self) -> bool {
        self.expected.is_some()
    }

    /// Check a presented credential.
    ///
    /// Missing credential is 401; anything that is not an exact match is 403,
    /// including every credential when no key is configured.
    pub fn verify(&self, candidate: Option<&str>) -> Result<(), ApiError> {
        let candidate = candidate
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("API Key is missing".to_string()))?;

        let matches = self.expected.as_ref().is_some_and(|expected| {
            bool::from(candidate.as_bytes().ct_eq(expected.expose_secret().as_bytes()))
        });

        if matches {
            Ok(())
        } else {
            Err(ApiError::Forbidden("API Key is invalid".to_string()))
        }
    }
}

/// Pull the credential from the `x-api-key` header, falling back to `?apikey=`
pub fn extract_credential(request: &Request) -> Option<(String, CredentialSource)> {
    let from_header = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .map(|h| (h.to_string(), CredentialSource::Header));

    from_header.or_else(|| {
        Query::<Vec<(String, String)>>::try_from_uri(request.uri())
            .ok()?
            .0
            .into_iter()
            .find(|(name, value)| name == API_KEY_QUERY_PARAM && !value.is_empty())
            .map(|(_, value)| (value, CredentialSource::Query))
    })
}

/// API key middleware guarding every customer route
///
/// Only the credential source and outcome are logged, never the values.
pub async fn api_key_middleware(
    State(api_key): State<ApiKey>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = extract_credential(&request);
    let source = credential.as_ref().map(|(_, source)| source.as_str());

    match api_key.verify(credential.as_ref().map(|(key, _)| key.as_str())) {
        Ok(()) => {
            tracing::debug!(source, "API key accepted");
            Ok(next.run(request).await)
        }
        Err(err) => {
            tracing::debug!(source, status = %err.status_code(), "API key rejected");
            Err(err)
        }
    }
}

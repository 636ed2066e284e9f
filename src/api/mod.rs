//! REST API module
//!
//! This module provides the HTTP server and REST API endpoints including:
//! - Customer routing and request handling
//! - API key middleware
//! - Request id tagging for log correlation

pub mod server;
pub mod routes;
pub mod middleware;
pub mod handlers;
pub mod models;

pub use server::{build_router, ApiServer};
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};

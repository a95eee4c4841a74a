//! # service-request
//!
//! service-request is a small fluent layer for writing API tests. Services are described once in
//! a configuration file, and each test builds a request against one of them by piling up headers,
//! parameters and a body before handing it to an HTTP client.
//!
//! ## Configuration
//!
//! The services file is YAML or JSON. Its location is read from the `SERVICE_CONFIG` environment
//! variable and falls back to `service-config.yaml` in the working directory.
//!
//! **service-config.yaml**
//! ```text,no_run
//! services:
//!   users:
//!     end_point: http://localhost
//!     port: 8080
//!     end_point_suffix: /api/v1
//!     headers:
//!       Accept: application/json
//! ```
//!
//! ## Building a request
//!
//! ```rust,no_run
//! use http::Method;
//! use service_request::http_client::reqwest::ReqwestHttpClient;
//! use service_request::{config, ServiceRequest};
//!
//! # fn main() -> service_request::Result<()> {
//! let settings = config::shared()?;
//! let client = ReqwestHttpClient::default();
//!
//! let response = ServiceRequest::new(settings, "users", "/users/{id}")?
//!     .with_header("X-Auth-Token", "SuperSecretToken")
//!     .with_path_parameter("id", 42)
//!     .with_query_parameter("verbose", true)
//!     .execute(&client, Method::GET, true)?;
//!
//! assert_eq!(response.status().as_u16(), 200);
//! # Ok(())
//! # }
//! ```
//!
//! ## Request types
//!
//! Requests that always carry the same shape of payload implement [`BuildRequest`] and read the
//! caller's input from typed [`Field`]s:
//!
//! ```rust,no_run
//! use serde_json::json;
//! use service_request::{BuildRequest, Field, Result, ServiceRequest};
//!
//! const TITLE: Field<String> = Field::new("title");
//!
//! struct CreatePost;
//!
//! impl BuildRequest for CreatePost {
//!     fn build_request<'a>(&self, request: ServiceRequest<'a>) -> Result<ServiceRequest<'a>> {
//!         let title = request.value(&TITLE).cloned().unwrap_or_default();
//!         Ok(request.with_request(json!({ "title": title })))
//!     }
//! }
//! ```
//!
//! ## Expectations
//!
//! `execute` takes a `should_work` flag. When it is `true` any non-2xx response is an error; when
//! it is `false` a 2xx response is the error. Either way the failure is a [`ServiceError`] that can
//! be recovered with `downcast_ref`.

use http::StatusCode;

pub mod config;
pub mod http_client;
pub mod model;
pub mod request;

pub use crate::config::{ServiceSetting, ServicesSetting};
pub use crate::model::{Call, Params, Response, ResponseExt};
pub use crate::request::{BuildRequest, Field, ServiceRequest};

pub type Result<T> = anyhow::Result<T>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Service '{0}' is not defined in the services configuration")]
    UnknownService(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),

    #[error("Path parameter '{0}' was not provided for the resource path")]
    UnresolvedPathParameter(String),

    #[error("A request body and form parameters cannot be sent together")]
    BodyConflict,

    #[error("Expected {method} {url} to succeed but it returned {status}")]
    UnexpectedStatus {
        method: http::Method,
        url: String,
        status: StatusCode,
    },

    #[error("Expected {method} {url} to fail but it returned {status}")]
    UnexpectedSuccess {
        method: http::Method,
        url: String,
        status: StatusCode,
    },
}

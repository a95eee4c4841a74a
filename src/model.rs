use std::collections::BTreeMap;

use anyhow::Context;
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ServiceSetting;
use crate::Result;

pub type Params = BTreeMap<String, Value>;

pub type Response = http::Response<Option<String>>;

/// Everything a request builder accumulated, handed over to an
/// [`HttpClient`](crate::http_client::HttpClient) in one piece.
#[derive(Debug, Clone, PartialEq)]
pub struct Call<'a> {
    pub setting: &'a ServiceSetting,
    pub resource_path: String,
    pub method: Method,
    pub should_work: bool,
    pub body: Option<Value>,
    pub headers: Params,
    pub params: Params,
    pub path_params: Params,
    pub query_params: Params,
    pub form_params: Params,
}

/// Renders a parameter value the way it goes on the wire.
pub fn param_to_string(value: &Value) -> String {
    match value {
        Value::String(value) => value.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub trait ResponseExt {
    fn text(&self) -> &str;

    fn json<T: DeserializeOwned>(&self) -> Result<T>;

    fn header_str(&self, name: &str) -> Option<&str>;
}

impl ResponseExt for Response {
    fn text(&self) -> &str {
        self.body().as_deref().unwrap_or_default()
    }

    fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match self.body() {
            Some(body) => serde_json::from_str(body)
                .with_context(|| format!("Failed parsing response body: {}", body)),
            None => serde_json::from_value(Value::Null).context("Response has no body"),
        }
    }

    fn header_str(&self, name: &str) -> Option<&str> {
        self.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
    }
}

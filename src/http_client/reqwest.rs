use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;

use crate::http_client::{check_expectation, ClientConfig, HttpClient};
use crate::model::{param_to_string, Call, Params, Response};
use crate::{Result, ServiceError};

pub struct ReqwestHttpClient {
    client: Client,
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        ReqwestHttpClient {
            client: Client::new(),
        }
    }
}

impl ReqwestHttpClient {
    pub fn create(config: ClientConfig) -> Result<ReqwestHttpClient> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!config.ssl_check)
            .build()
            .context("Failed building HTTP client")?;

        Ok(ReqwestHttpClient { client })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, call: Call<'_>) -> Result<Response> {
        let url = target_url(&call)?;
        let form = form_params(&call)?;

        let mut request_builder = self
            .client
            .request(call.method.clone(), url.clone())
            .headers(headers(&call)?);
        if let Some(body) = &call.body {
            request_builder = request_builder.json(body);
        }
        if !form.is_empty() {
            request_builder = request_builder.form(&form);
        }
        if let Some(secs) = call.setting.timeout_secs {
            request_builder = request_builder.timeout(Duration::from_secs(secs));
        }

        log::debug!("{} {}", call.method, url);
        let response = send(request_builder)
            .with_context(|| format!("Error executing {} {}", call.method, url))?;
        log::info!("{} {} returned {}", call.method, url, response.status());

        check_expectation(&call, url.as_str(), &response)?;
        Ok(response)
    }
}

fn send(request_builder: RequestBuilder) -> Result<Response> {
    let response = request_builder.send()?;

    let mut response_builder = http::Response::builder()
        .version(response.version())
        .status(response.status());

    for (name, value) in response.headers() {
        response_builder = response_builder.header(name, value);
    }

    let body = response.text()?;
    let response = if !body.is_empty() {
        response_builder.body(Some(body))?
    } else {
        response_builder.body(None)?
    };

    Ok(response)
}

fn target_url(call: &Call<'_>) -> Result<Url> {
    let path = resolve_path(&call.resource_path, &call.path_params)?;
    let mut url = Url::parse(&format!("{}{}", call.setting.end_point, path))
        .with_context(|| format!("Invalid URL for service end point: {}", call.setting.end_point))?;

    if let Some(port) = call.setting.port {
        url.set_port(Some(port))
            .map_err(|_| anyhow!("Cannot set port {} on {}", port, url))?;
    }

    let query = query_params(call);
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in query {
            pairs.append_pair(name, &value);
        }
    }

    Ok(url)
}

/// Replaces every `{name}` in the resource path with its path parameter.
pub(crate) fn resolve_path(resource_path: &str, path_params: &Params) -> Result<String> {
    let mut resolved = String::with_capacity(resource_path.len());
    let mut rest = resource_path;
    let mut used = BTreeSet::new();

    while let Some(start) = rest.find('{') {
        let end = match rest[start..].find('}') {
            Some(end) => start + end,
            None => break,
        };
        let name = &rest[start + 1..end];
        let value = path_params
            .get(name)
            .ok_or_else(|| ServiceError::UnresolvedPathParameter(name.to_string()))?;
        resolved.push_str(&rest[..start]);
        resolved.push_str(&urlencoding::encode(&param_to_string(value)));
        used.insert(name);
        rest = &rest[end + 1..];
    }
    resolved.push_str(rest);

    let unused: Vec<&String> = path_params
        .keys()
        .filter(|name| !used.contains(name.as_str()))
        .collect();
    if !unused.is_empty() {
        log::warn!("Path parameters not used by {}: {:?}", resource_path, unused);
    }
    Ok(resolved)
}

/// GET has no body, so generic and form parameters both land in the query string there.
/// Later collections override earlier ones: generic, then form, then query.
fn query_params<'c>(call: &'c Call<'_>) -> BTreeMap<&'c str, String> {
    let mut query = BTreeMap::new();
    if call.method == http::Method::GET {
        merge_params(&mut query, &call.params);
        merge_params(&mut query, &call.form_params);
    }
    merge_params(&mut query, &call.query_params);
    query
}

fn form_params<'c>(call: &'c Call<'_>) -> Result<BTreeMap<&'c str, String>> {
    let mut form = BTreeMap::new();
    if call.method != http::Method::GET {
        merge_params(&mut form, &call.params);
        merge_params(&mut form, &call.form_params);
    }

    if call.body.is_some() && !form.is_empty() {
        return Err(ServiceError::BodyConflict.into());
    }
    Ok(form)
}

fn merge_params<'c>(merged: &mut BTreeMap<&'c str, String>, params: &'c Params) {
    for (name, value) in params {
        merged.insert(name.as_str(), param_to_string(value));
    }
}

fn headers(call: &Call<'_>) -> Result<HeaderMap> {
    let defaults = call
        .setting
        .headers
        .iter()
        .map(|(name, value)| (name.as_str(), value.clone()));
    let overrides = call
        .headers
        .iter()
        .map(|(name, value)| (name.as_str(), param_to_string(value)));

    let mut headers = HeaderMap::new();
    for (name, value) in defaults.chain(overrides) {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| anyhow!("Invalid header name '{}': {}", name, e))?;
        let header_value = HeaderValue::from_str(&value)
            .map_err(|e| anyhow!("Invalid header value '{}': {}", value, e))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

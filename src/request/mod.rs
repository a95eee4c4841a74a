use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use anyhow::Context;
use http::Method;
use serde::Serialize;
use serde_json::Value;

use crate::config::{ServiceSetting, ServicesSetting};
use crate::http_client::HttpClient;
use crate::model::{Call, Params, Response};
use crate::Result;


/// Hook for request types that know how to fill in their own payload.
///
/// Implementors read whatever the caller stored with [`ServiceRequest::with_value`] and return
/// the request with its body and parameters set.
pub trait BuildRequest {
    fn build_request<'a>(&self, request: ServiceRequest<'a>) -> Result<ServiceRequest<'a>>;
}

/// A typed key into the value store of a [`ServiceRequest`].
pub struct Field<T> {
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> Field<T> {
    pub const fn new(name: &'static str) -> Self {
        Field {
            name,
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

#[derive(Default)]
struct Values(HashMap<&'static str, Box<dyn Any>>);

impl fmt::Debug for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// Accumulates everything needed to call one resource of a configured service.
#[derive(Debug)]
pub struct ServiceRequest<'a> {
    setting: &'a ServiceSetting,
    resource_path: String,
    request: Option<Value>,
    headers: Params,
    params: Params,
    path_params: Params,
    query_params: Params,
    form_params: Params,
    values: Values,
}

impl<'a> ServiceRequest<'a> {
    pub fn new(settings: &'a ServicesSetting, service_name: &str, path: &str) -> Result<Self> {
        let setting = settings.service(service_name)?;
        Ok(Self::for_setting(setting, path))
    }

    pub fn for_setting(setting: &'a ServiceSetting, path: &str) -> Self {
        ServiceRequest {
            setting,
            resource_path: format!("{}{}", setting.end_point_suffix, path),
            request: None,
            headers: Params::new(),
            params: Params::new(),
            path_params: Params::new(),
            query_params: Params::new(),
            form_params: Params::new(),
            values: Values::default(),
        }
    }

    /// Header names are case-insensitive, so a later write replaces any spelling of the same name.
    pub fn with_header<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.into());
        self
    }

    /// Generic parameters go out as query parameters on GET and as form parameters otherwise. A
    /// query or form parameter of the same name takes precedence.
    pub fn with_parameter<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn with_path_parameter<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.path_params.insert(name.to_string(), value.into());
        self
    }

    pub fn with_query_parameter<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.query_params.insert(name.to_string(), value.into());
        self
    }

    pub fn with_form_parameter<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.form_params.insert(name.to_string(), value.into());
        self
    }

    /// Sets the payload. It is ignored when the request is executed as GET.
    pub fn with_request<V: Into<Value>>(mut self, body: V) -> Self {
        self.request = Some(body.into());
        self
    }

    pub fn with_json_request<T: Serialize>(self, body: &T) -> Result<Self> {
        let body = serde_json::to_value(body).context("Failed serializing request body")?;
        Ok(self.with_request(body))
    }

    pub fn with_value<T: 'static>(mut self, field: &Field<T>, value: T) -> Self {
        self.values.0.insert(field.name, Box::new(value));
        self
    }

    pub fn value<T: 'static>(&self, field: &Field<T>) -> Option<&T> {
        self.values
            .0
            .get(field.name)
            .and_then(|value| value.downcast_ref::<T>())
    }

    pub fn build<B: BuildRequest + ?Sized>(self, builder: &B) -> Result<Self> {
        builder.build_request(self)
    }

    pub fn setting(&self) -> &'a ServiceSetting {
        self.setting
    }

    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    pub fn body(&self) -> Option<&Value> {
        self.request.as_ref()
    }

    pub fn headers(&self) -> &Params {
        &self.headers
    }

    pub fn parameters(&self) -> &Params {
        &self.params
    }

    pub fn path_parameters(&self) -> &Params {
        &self.path_params
    }

    pub fn query_parameters(&self) -> &Params {
        &self.query_params
    }

    pub fn form_parameters(&self) -> &Params {
        &self.form_params
    }

    /// The body is left out for GET.
    pub fn into_call(self, method: Method, should_work: bool) -> Call<'a> {
        let body = if method == Method::GET {
            None
        } else {
            self.request
        };
        Call {
            setting: self.setting,
            resource_path: self.resource_path,
            method,
            should_work,
            body,
            headers: self.headers,
            params: self.params,
            path_params: self.path_params,
            query_params: self.query_params,
            form_params: self.form_params,
        }
    }

    pub fn execute<C: HttpClient + ?Sized>(
        self,
        client: &C,
        method: Method,
        should_work: bool,
    ) -> Result<Response> {
        let call = self.into_call(method, should_work);
        log::debug!(
            "Dispatching {} {} (should work: {})",
            call.method,
            call.resource_path,
            call.should_work
        );
        client.execute(call)
    }
}

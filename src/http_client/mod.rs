use crate::model::{Call, Response};
use crate::{Result, ServiceError};


pub mod reqwest;

pub struct ClientConfig {
    pub ssl_check: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { ssl_check: true }
    }
}

impl ClientConfig {
    pub fn new(ssl_check: bool) -> Self {
        Self { ssl_check }
    }
}

pub trait HttpClient {
    fn execute(&self, call: Call<'_>) -> Result<Response>;
}

/// Fails when the response status disagrees with what the caller expected.
pub fn check_expectation(call: &Call<'_>, url: &str, response: &Response) -> Result<()> {
    let status = response.status();
    let method = call.method.clone();
    let url = url.to_string();
    match (call.should_work, status.is_success()) {
        (true, false) => {
            log::error!("{} {} was expected to succeed, got {}", method, url, status);
            Err(ServiceError::UnexpectedStatus {
                method,
                url,
                status,
            }
            .into())
        }
        (false, true) => {
            log::error!("{} {} was expected to fail, got {}", method, url, status);
            Err(ServiceError::UnexpectedSuccess {
                method,
                url,
                status,
            }
            .into())
        }
        _ => Ok(()),
    }
}

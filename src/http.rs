//! Shared HTTP client construction for the upstream APIs

use std::borrow::Cow;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::{PlannerError, Result, VERSION};

static KEY_PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"key=[^&\s)]+").unwrap());

/// Build a client with a request timeout and retries on transient failures
pub fn build_client(timeout_seconds: u32, max_retries: u32) -> Result<ClientWithMiddleware> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(format!("itinerary-planner/{VERSION}"))
        .build()
        .map_err(|e| PlannerError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Mask every `key=` query value so URLs and error texts can be logged
#[must_use]
pub fn redact_key(text: &str) -> Cow<'_, str> {
    KEY_PARAM.replace_all(text, "key=REDACTED")
}

/// Describe a failed send without the request URL
#[must_use]
pub fn send_error(error: reqwest_middleware::Error) -> String {
    match error {
        reqwest_middleware::Error::Reqwest(e) => read_error(e),
        reqwest_middleware::Error::Middleware(e) => redact_key(&format!("{e:#}")).into_owned(),
    }
}

/// Describe a failed body read or decode without the request URL
#[must_use]
pub fn read_error(error: reqwest::Error) -> String {
    redact_key(&error.without_url().to_string()).into_owned()
}

// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::ApiConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &ApiConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Strip the anti-hijacking sentinel from a response body.
pub fn strip_prefix<'a>(body: &'a str, prefix: &str) -> Result<&'a str> {
    body.strip_prefix(prefix).ok_or_else(|| {
        let start: String = body.chars().take(16).collect();
        AppError::protocol(format!("response does not start with sentinel: {start:?}"))
    })
}

/// Strip the sentinel and parse the rest of `body` as JSON.
pub fn decode_body<T: DeserializeOwned>(body: &str, prefix: &str) -> Result<T> {
    let json = strip_prefix(body, prefix)?;
    Ok(serde_json::from_str(json)?)
}

/// Server-provided failure message, falling back to the raw body.
pub fn error_message(body: &str, prefix: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        #[serde(alias = "error")]
        message: String,
    }

    let json = body.strip_prefix(prefix).unwrap_or(body);
    match serde_json::from_str::<ErrorBody>(json) {
        Ok(parsed) => parsed.message,
        Err(_) => json.trim().to_string(),
    }
}

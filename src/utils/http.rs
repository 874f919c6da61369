use std::time::Duration;

use reqwest::{Client, StatusCode};

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT: u64 = 15;

/// Makes an HTTP GET request to the specified URL
///
/// # Arguments
/// * `url` - The URL to request
/// * `user_agent` - User agent header value
///
/// # Returns
/// * `Ok(String)` - The response body as a string
/// * `Err(String)` - Error message if the request failed
pub async fn web_get(url: &str, user_agent: &str) -> Result<String, String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT))
        .user_agent(user_agent.to_string())
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    if response.status() != StatusCode::OK {
        return Err(format!("HTTP error: {}", response.status()));
    }

    response
        .text()
        .await
        .map_err(|e| format!("Failed to read response body: {}", e))
}

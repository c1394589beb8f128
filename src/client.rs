use std::env;
use std::time::{Duration, Instant};

use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::sse::{SseEvent, process_sse};
use crate::types::{GenerationChunk, GenerationRequest};

const DEFAULT_API_URL: &str = "https://dashscope.aliyuncs.com/api/v1/";
const GENERATION_PATH: &str = "services/aigc/text-generation/generation";
// The service can take a long time before the first token on the larger
// models; this matches the read timeout the web console advertises.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// Client for the DashScope text-generation API.
#[derive(Debug, Clone)]
pub struct DashScope {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl DashScope {
    /// Create a new DashScope client.
    ///
    /// The API key can be provided directly or read from the
    /// DASHSCOPE_API_KEY environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var("DASHSCOPE_API_KEY").map_err(|_| {
                Error::authentication(
                    "API key not provided and DASHSCOPE_API_KEY environment variable not set",
                )
            })?,
        };

        let base_url = match base_url {
            Some(base_url) => {
                url::Url::parse(&base_url)?;
                base_url
            }
            None => DEFAULT_API_URL.to_string(),
        };

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
        })
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .expect("API key should be valid"),
        );
        headers
    }

    /// Translate a reqwest failure into our error type.
    fn request_error(&self, e: reqwest::Error) -> Error {
        CLIENT_REQUEST_ERRORS.click();
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {e}"),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
        }
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        CLIENT_REQUEST_ERRORS.click();
        let status = response.status();
        let status_code = status.as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        // DashScope error bodies carry a code, a message, and the
        // request id inline rather than in headers.
        #[derive(Deserialize)]
        struct ErrorResponse {
            code: Option<String>,
            message: Option<String>,
            request_id: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };

        let parsed_error = serde_json::from_str::<ErrorResponse>(&error_body).ok();
        let error_code = parsed_error.as_ref().and_then(|e| e.code.clone());
        let error_message = parsed_error
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| error_body.clone());
        let request_id = parsed_error.as_ref().and_then(|e| e.request_id.clone());

        match status_code {
            400 => Error::bad_request(error_message, error_code),
            401 => Error::authentication(error_message),
            403 => Error::permission(error_message),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message, request_id),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, error_code, error_message, request_id),
        }
    }

    /// Send a generation request and get the complete response.
    pub async fn send(&self, request: GenerationRequest) -> Result<GenerationChunk> {
        let url = format!("{}{}", self.base_url, GENERATION_PATH);

        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .headers(self.default_headers())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<GenerationChunk>().await.map_err(|e| {
            Error::serialization(format!("Failed to parse response: {e}"), Some(Box::new(e)))
        })
    }

    /// Send a generation request and get a streaming response.
    ///
    /// Returns the raw stream of server-sent events; feed it to
    /// [`crate::streaming::accumulate`] to render deltas and recover the
    /// final chunk.
    pub async fn stream(
        &self,
        request: GenerationRequest,
    ) -> Result<impl Stream<Item = Result<SseEvent>>> {
        let url = format!("{}{}", self.base_url, GENERATION_PATH);

        let mut headers = self.default_headers();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        CLIENT_REQUESTS.click();
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        Ok(process_sse(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        // Test with explicit API key
        let client = DashScope::new(Some("test-key".to_string())).unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, DEFAULT_API_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        // Test with custom options
        let client = DashScope::with_options(
            Some("test-key".to_string()),
            Some("https://custom-api.example.com/".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, "https://custom-api.example.com/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn client_rejects_invalid_base_url() {
        let result = DashScope::with_options(
            Some("test-key".to_string()),
            Some("not a url".to_string()),
            None,
        );
        assert!(matches!(result, Err(Error::Url { .. })));
    }
}

use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUESTS, CLIENT_REQUEST_ERRORS};
use crate::sse::process_sse;
use crate::types::{ChatCompletion, ChatCompletionChunk, ChatCompletionParams, Message, Model};

/// The default base URL for the hosted API.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A backend that can complete a conversation with one assistant message.
///
/// The REPL and the topic namer talk to the completion API through this
/// trait so that tests can substitute a canned or failing backend.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Complete the given ordered messages with one assistant message.
    async fn complete(&self, model: &Model, messages: &[Message]) -> Result<Message>;
}

/// Client for the OpenAI chat-completion API.
#[derive(Debug, Clone)]
pub struct OpenAi {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl OpenAi {
    /// Create a new client.
    ///
    /// The API key can be provided directly or read from the
    /// OPENAI_API_KEY environment variable.
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
            None => env::var("OPENAI_API_KEY").map_err(|_| {
                Error::authentication(
                    "API key not provided and OPENAI_API_KEY environment variable not set",
                )
            })?,
        };

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout,
        })
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| Error::authentication("API key contains invalid header characters"))?;
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        // Headers we might need for error processing
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|val| val.to_str().ok())
            .map(String::from);

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        // Try to parse error response body
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            #[serde(rename = "type")]
            error_type: Option<String>,
            message: Option<String>,
            param: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let parsed_error = serde_json::from_str::<ErrorResponse>(&error_body).ok();
        let error_type = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.error_type.clone());
        let error_message = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| error_body.clone());
        let error_param = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.param.clone());

        // Map HTTP status code to appropriate error type
        match status_code {
            400 => Error::bad_request(error_message, error_param),
            401 => Error::authentication(error_message),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message, request_id),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, error_type, error_message, request_id),
        }
    }

    /// Classify reqwest transport failures.
    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Send a conversation to the API and get a non-streaming completion.
    pub async fn chat(&self, mut params: ChatCompletionParams) -> Result<ChatCompletion> {
        params.stream = false;
        let url = format!("{}chat/completions", self.base_url);

        CLIENT_REQUESTS.click();
        let response = self
            .client
            .post(&url)
            .headers(self.default_headers()?)
            .json(&params)
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                self.transport_error(e)
            })?;

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        response.json::<ChatCompletion>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Send a conversation to the API and get a streaming completion.
    ///
    /// Returns a stream of ChatCompletionChunk objects that can be
    /// processed incrementally.
    pub async fn chat_stream(
        &self,
        mut params: ChatCompletionParams,
    ) -> Result<impl Stream<Item = Result<ChatCompletionChunk>>> {
        params.stream = true;
        let url = format!("{}chat/completions", self.base_url);

        let mut headers = self.default_headers()?;
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        CLIENT_REQUESTS.click();
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&params)
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                self.transport_error(e)
            })?;

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        Ok(process_sse(response.bytes_stream()))
    }

    /// Single-shot instruction+input completion returning plain text.
    ///
    /// This is the history-off call shape: the standing instructions and
    /// one user input, no accumulated transcript.
    pub async fn respond(&self, model: &Model, instructions: &str, input: &str) -> Result<String> {
        let messages = vec![Message::developer(instructions), Message::user(input)];
        let completion = self
            .chat(ChatCompletionParams::new(model.clone(), messages))
            .await?;
        completion
            .content()
            .map(String::from)
            .ok_or_else(|| Error::streaming("response contained no choices", None))
    }
}

#[async_trait::async_trait]
impl CompletionBackend for OpenAi {
    async fn complete(&self, model: &Model, messages: &[Message]) -> Result<Message> {
        let completion = self
            .chat(ChatCompletionParams::new(model.clone(), messages.to_vec()))
            .await?;
        completion
            .message()
            .cloned()
            .ok_or_else(|| Error::streaming("response contained no choices", None))
    }
}

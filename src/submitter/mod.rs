//! Delivery of workflow payloads to the prompt endpoint.

mod models;

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use serde_json::Value;

use crate::{EndpointConfig, PromptBatchError, Result};

pub use models::*;

/// Sends one payload and reports whether the endpoint accepted it.
pub trait Submitter {
    /// Submits `payload` as the request body.
    ///
    /// # Returns
    ///
    /// `Ok(())` for a success status. Transport failures and non-success
    /// statuses are returned as [`PromptBatchError::Http`].
    fn submit(
        &self,
        payload: &Value,
    ) -> Result<()>;
}

/// Blocking HTTP submitter: one JSON POST per payload, response body ignored.
pub struct HttpSubmitter {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpSubmitter {
    pub fn new(endpoint: &EndpointConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        apply_auth_headers(&endpoint.auth, &mut headers)?;

        for (key, value) in &endpoint.headers {
            headers.insert(
                key.parse::<HeaderName>().map_err(|err| PromptBatchError::Config(err.to_string()))?,
                value.parse().map_err(|err: InvalidHeaderValue| PromptBatchError::Config(err.to_string()))?,
            );
        }

        // reqwest's blocking client times out after 30s unless told otherwise
        let timeout = (endpoint.timeout > 0).then(|| Duration::from_millis(endpoint.timeout));

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| PromptBatchError::Config(format!("failed to build http client: {}", err)))?;

        Ok(Self {
            client,
            url: endpoint.url.clone(),
        })
    }
}

impl Submitter for HttpSubmitter {
    fn submit(
        &self,
        payload: &Value,
    ) -> Result<()> {
        let res = self.client.post(&self.url).json(payload).send().map_err(|err| PromptBatchError::Http(format!("Http error: {}", error_chain(&err))))?;
        res.error_for_status().map_err(|err| PromptBatchError::Http(err.to_string()))?;
        Ok(())
    }
}

/// The error message followed by every underlying cause, `: `-separated.
///
/// reqwest's own message leaves out why a request failed (refused connection,
/// DNS failure, timeout); that lives further down the `source()` chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.ends_with(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

/// Apply authorization headers based on auth config
fn apply_auth_headers(
    auth: &AuthorizationConfig,
    headers: &mut HeaderMap,
) -> Result<()> {
    match &auth.auth_type {
        AuthorizationType::NoAuth => {}
        AuthorizationType::ApiKey(api_key_type) => {
            let api_key = auth.api_key.as_ref().ok_or_else(|| PromptBatchError::Config("api_key is required for api-key authorization".to_string()))?;

            // Default header name is "Authorization"
            let header_name = auth.header.as_deref().unwrap_or("Authorization");
            let header_key: HeaderName = header_name.parse().map_err(|err: reqwest::header::InvalidHeaderName| PromptBatchError::Config(err.to_string()))?;

            let header_value = match api_key_type {
                ApiKeyType::Bearer => format!("Bearer {}", api_key),
                ApiKeyType::Basic => {
                    let encoded = if api_key.contains(':') {
                        STANDARD.encode(api_key.as_bytes())
                    } else {
                        api_key.clone()
                    };
                    format!("Basic {}", encoded)
                }
                ApiKeyType::Custom => api_key.clone(),
            };

            headers.insert(
                header_key,
                header_value.parse().map_err(|err: InvalidHeaderValue| PromptBatchError::Config(err.to_string()))?,
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use mockito::Matcher;
    use serde_json::json;

    use super::{ApiKeyType, AuthorizationConfig, AuthorizationType, HttpSubmitter, Submitter};
    use crate::{EndpointConfig, PromptBatchError};

    fn endpoint(url: String) -> EndpointConfig {
        EndpointConfig {
            url,
            ..EndpointConfig::default()
        }
    }

    fn api_key_auth(
        api_key_type: ApiKeyType,
        api_key: &str,
        header: Option<&str>,
    ) -> AuthorizationConfig {
        AuthorizationConfig {
            auth_type: AuthorizationType::ApiKey(api_key_type),
            api_key: Some(api_key.to_string()),
            header: header.map(str::to_string),
        }
    }

    #[test]
    fn test_submit_posts_json_body() {
        let mut server = mockito::Server::new();
        let payload = json!({"prompt": {"6": {"class_type": "CLIPTextEncode", "inputs": {"text": "a cat"}}}});
        let mock = server
            .mock("POST", "/prompt")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(payload.clone()))
            .with_status(200)
            .with_body(r#"{"prompt_id": "a1b2", "number": 0, "node_errors": {}}"#)
            .create();

        let submitter = HttpSubmitter::new(&endpoint(format!("{}/prompt", server.url()))).unwrap();
        submitter.submit(&payload).unwrap();

        mock.assert();
    }

    #[test]
    fn test_submit_error_status() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/prompt").with_status(400).with_body(r#"{"error": "invalid prompt"}"#).create();

        let submitter = HttpSubmitter::new(&endpoint(format!("{}/prompt", server.url()))).unwrap();
        let err = submitter.submit(&json!({"prompt": {}})).unwrap_err();

        assert!(matches!(err, PromptBatchError::Http(_)));
        assert!(err.to_string().contains("400"));
        mock.assert();
    }

    #[test]
    fn test_submit_connection_refused() {
        let submitter = HttpSubmitter::new(&endpoint("http://127.0.0.1:1/prompt".to_string())).unwrap();
        let err = submitter.submit(&json!({"prompt": {}})).unwrap_err().to_string();
        assert!(err.starts_with("Http error: error sending request"));
        assert!(err.to_lowercase().contains("connection refused"), "cause missing from: {}", err);
    }

    #[test]
    fn test_error_chain_appends_causes() {
        let root = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused (os error 111)");
        let err = PromptBatchError::Config("wrapped".to_string());
        assert_eq!(super::error_chain(&err), "wrapped");

        #[derive(Debug, thiserror::Error)]
        #[error("error sending request")]
        struct SendError(#[source] std::io::Error);

        assert_eq!(super::error_chain(&SendError(root)), "error sending request: Connection refused (os error 111)");
    }

    #[test]
    fn test_bearer_auth_and_extra_headers() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/prompt")
            .match_header("authorization", "Bearer secret")
            .match_header("x-trace", "on")
            .with_status(200)
            .create();

        let mut endpoint = endpoint(format!("{}/prompt", server.url()));
        endpoint.auth = api_key_auth(ApiKeyType::Bearer, "secret", None);
        endpoint.headers = HashMap::from([("X-Trace".to_string(), "on".to_string())]);

        HttpSubmitter::new(&endpoint).unwrap().submit(&json!({"prompt": {}})).unwrap();
        mock.assert();
    }

    #[test]
    fn test_basic_auth_encodes_credentials() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/prompt").match_header("authorization", "Basic dXNlcjpwYXNz").with_status(200).create();

        let mut endpoint = endpoint(format!("{}/prompt", server.url()));
        endpoint.auth = api_key_auth(ApiKeyType::Basic, "user:pass", None);

        HttpSubmitter::new(&endpoint).unwrap().submit(&json!({"prompt": {}})).unwrap();
        mock.assert();
    }

    #[test]
    fn test_basic_auth_passes_encoded_key_through() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/prompt").match_header("authorization", "Basic dXNlcjpwYXNz").with_status(200).create();

        let mut endpoint = endpoint(format!("{}/prompt", server.url()));
        endpoint.auth = api_key_auth(ApiKeyType::Basic, "dXNlcjpwYXNz", None);

        HttpSubmitter::new(&endpoint).unwrap().submit(&json!({"prompt": {}})).unwrap();
        mock.assert();
    }

    #[test]
    fn test_custom_auth_header() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/prompt").match_header("x-api-key", "k-123").with_status(200).create();

        let mut endpoint = endpoint(format!("{}/prompt", server.url()));
        endpoint.auth = api_key_auth(ApiKeyType::Custom, "k-123", Some("X-API-Key"));

        HttpSubmitter::new(&endpoint).unwrap().submit(&json!({"prompt": {}})).unwrap();
        mock.assert();
    }

    #[test]
    fn test_api_key_required() {
        let mut endpoint = endpoint("http://127.0.0.1:8188/prompt".to_string());
        endpoint.auth.auth_type = AuthorizationType::ApiKey(ApiKeyType::Bearer);

        let err = HttpSubmitter::new(&endpoint).err().unwrap();
        assert!(err.to_string().contains("api_key is required"));
    }
}

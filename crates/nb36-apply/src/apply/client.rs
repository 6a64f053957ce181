use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Raw result of one decisioning call: HTTP status plus the parsed JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionExchange {
    pub status: u16,
    pub body: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum DecisionClientError {
    #[error("{0}")]
    Transport(String),
    #[error("invalid JSON response (HTTP {status}): {message}")]
    Decode { status: u16, message: String },
    #[error("unable to encode request body: {0}")]
    Encode(String),
}

/// Outbound boundary to the decisioning backend.
#[async_trait]
pub trait DecisionClient: Send + Sync {
    fn endpoint(&self) -> &str;

    /// POST the applicant body once. Any HTTP status is returned as-is so long
    /// as the body parses as JSON.
    async fn submit(&self, body: &Value) -> Result<DecisionExchange, DecisionClientError>;
}

/// `reqwest`-backed client. No timeout is configured: a hanging backend stalls
/// the apply run.
#[derive(Debug, Clone)]
pub struct HttpDecisionClient {
    http: Client,
    endpoint: String,
}

impl HttpDecisionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl DecisionClient for HttpDecisionClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn submit(&self, body: &Value) -> Result<DecisionExchange, DecisionClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|err| DecisionClientError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .json::<Value>()
            .await
            .map_err(|err| DecisionClientError::Decode {
                status,
                message: err.to_string(),
            })?;

        Ok(DecisionExchange { status, body })
    }
}

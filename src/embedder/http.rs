use crate::config::EmbeddingConfig;
use crate::embedder::{EmbedError, EmbedResult, EmbeddingProvider};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Embedding client for OpenAI-compatible `/embeddings` endpoints.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimension: usize,
    max_retries: usize,
}

impl HttpEmbedder {
    /// Builds an embedding client from configuration and an API key.
    ///
    /// # Arguments
    ///
    /// * `config` - The embedding section of the configuration
    /// * `api_key` - Bearer token for the endpoint
    /// * `timeout` - Per-request timeout
    pub fn new(
        config: &EmbeddingConfig,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", api_key.trim())) {
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let endpoint = format!("{}/embeddings", config.endpoint.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            dimension: config.dimension,
            max_retries: config.max_retries.max(1),
        })
    }

    async fn request_embedding(&self, text: &str) -> EmbedResult<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::MalformedResponse(e.to_string()))?;

        let vector = payload
            .data
            .into_iter()
            .next()
            .map(|entry| entry.embedding)
            .ok_or_else(|| EmbedError::MalformedResponse("empty data array".to_string()))?;

        if vector.len() != self.dimension {
            return Err(EmbedError::Dimension {
                expected: self.dimension,
                got: vector.len(),
            });
        }

        Ok(vector)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    /// Embeds one chunk, retrying transient failures with backoff.
    ///
    /// Rate limiting (429), server errors, and transport errors are retried
    /// up to the configured attempt count; anything else fails immediately.
    async fn embed(&self, text: &str) -> EmbedResult<Vec<f32>> {
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            match self.request_embedding(text).await {
                Ok(vector) => return Ok(vector),
                Err(err) if attempt < self.max_retries && is_retryable(&err) => {
                    tracing::warn!(
                        "Embedding attempt {} of {} failed: {}",
                        attempt,
                        self.max_retries,
                        err
                    );
                    tokio::time::sleep(retry_backoff(attempt)).await;
                }
                Err(err) if attempt >= self.max_retries && is_retryable(&err) => {
                    return Err(EmbedError::Exhausted {
                        attempts: attempt,
                        last_error: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn is_retryable(err: &EmbedError) -> bool {
    match err {
        EmbedError::Api { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
        }
        EmbedError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        _ => false,
    }
}

fn retry_backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(250 * (1 << capped))
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

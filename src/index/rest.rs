use crate::config::IndexConfig;
use crate::index::{EmbeddingRecord, IndexEntry, IndexError, IndexResult, ListPage, VectorIndex};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// REST client for the vector index.
///
/// Targets the store's HTTP surface: `/describe_index_stats`,
/// `/vectors/upsert`, `/vectors/list`, `/vectors/fetch`, and
/// `/vectors/delete`, authenticated with an `Api-Key` header.
pub struct RestIndex {
    client: Client,
    base: String,
}

impl RestIndex {
    /// Builds a new index client from configuration and an API key.
    pub fn new(
        config: &IndexConfig,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(api_key.trim()) {
            headers.insert("Api-Key", value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn check(response: Response) -> IndexResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        Err(IndexError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl VectorIndex for RestIndex {
    async fn dimension(&self) -> IndexResult<usize> {
        let response = self
            .client
            .get(self.url("/describe_index_stats"))
            .send()
            .await?;
        let stats: IndexStats = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| IndexError::MalformedResponse(e.to_string()))?;
        Ok(stats.dimension)
    }

    async fn upsert(&self, records: &[EmbeddingRecord]) -> IndexResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let body = UpsertRequest { vectors: records };
        let response = self
            .client
            .post(self.url("/vectors/upsert"))
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_page(&self, cursor: Option<&str>, limit: usize) -> IndexResult<ListPage> {
        let mut request = self
            .client
            .get(self.url("/vectors/list"))
            .query(&[("limit", limit.to_string())]);
        if let Some(token) = cursor {
            request = request.query(&[("paginationToken", token)]);
        }

        let response = request.send().await?;
        let page: ListResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| IndexError::MalformedResponse(e.to_string()))?;

        Ok(ListPage {
            ids: page.vectors.into_iter().map(|v| v.id).collect(),
            next: page.pagination.and_then(|p| p.next),
        })
    }

    async fn fetch(&self, ids: &[String]) -> IndexResult<Vec<IndexEntry>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let pairs: Vec<(&str, &str)> = ids.iter().map(|id| ("ids", id.as_str())).collect();
        let response = self
            .client
            .get(self.url("/vectors/fetch"))
            .query(&pairs)
            .send()
            .await?;
        let fetched: FetchResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| IndexError::MalformedResponse(e.to_string()))?;
        Ok(fetched.vectors.into_values().collect())
    }

    async fn delete(&self, ids: &[String]) -> IndexResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let body = DeleteRequest { ids };
        let response = self
            .client
            .post(self.url("/vectors/delete"))
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct IndexStats {
    dimension: usize,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [EmbeddingRecord],
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    vectors: Vec<ListedVector>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct ListedVector {
    id: String,
}

#[derive(Deserialize)]
struct Pagination {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Deserialize)]
struct FetchResponse {
    #[serde(default)]
    vectors: HashMap<String, IndexEntry>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [String],
}

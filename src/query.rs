use crate::cache::{CacheTrait, InmemoryCache};
use crate::config::Config;
use crate::gql::{self, DetailData, GqlResponse, ListData};
use crate::list_state::ListQuery;
use crate::pokemon::{CardData, Entry, TypeEfficacyRow};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upstream responded with status {0}")]
    Status(u16),
    #[error("GraphQL errors: {0}")]
    Graphql(String),
    #[error("response carried no data")]
    MissingData,
    #[error("failed to parse response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub entries: Vec<CardData>,
    pub total_count: u64,
}

impl ListPage {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            total_count: 0,
        }
    }
}

/// An entry plus the global efficacy table fetched alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDetail {
    pub entry: Entry,
    pub efficacy: Vec<TypeEfficacyRow>,
}

#[async_trait]
pub trait PokedexSource: Send + Sync {
    async fn list_entries(&self, query: &ListQuery) -> Result<ListPage, QueryError>;

    /// `Ok(None)` when no entry has this id.
    async fn entry_detail(&self, id: u32) -> Result<Option<EntryDetail>, QueryError>;
}

pub struct GraphqlSource {
    client: reqwest::Client,
    endpoint: String,
}

impl GraphqlSource {
    pub fn new(config: &Config) -> Result<Self, QueryError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("pokedex/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.pokemon.api_url.clone(),
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Value,
    ) -> Result<T, QueryError> {
        tracing::debug!("POST {} variables={}", self.endpoint, variables);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": document, "variables": variables }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach {}: {}", self.endpoint, e);
                QueryError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("GraphQL request failed with status: {}", status);
            return Err(QueryError::Status(status.as_u16()));
        }

        let body = response.json::<GqlResponse<T>>().await.map_err(|e| {
            tracing::error!("Failed to parse GraphQL response: {}", e);
            QueryError::Parse(e.to_string())
        })?;

        if !body.errors.is_empty() {
            let messages = body
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            tracing::error!("GraphQL errors: {}", messages);
            return Err(QueryError::Graphql(messages));
        }

        body.data.ok_or(QueryError::MissingData)
    }
}

#[async_trait]
impl PokedexSource for GraphqlSource {
    async fn list_entries(&self, query: &ListQuery) -> Result<ListPage, QueryError> {
        let data: ListData = self
            .execute(gql::LIST_QUERY, gql::list_variables(query))
            .await?;
        let entries: Vec<CardData> = data.pokemon_v2_pokemon.iter().map(gql::to_card_data).collect();
        tracing::debug!(
            "Fetched {} list entries of {}",
            entries.len(),
            data.pokemon_v2_pokemon_aggregate.aggregate.count
        );
        Ok(ListPage {
            entries,
            total_count: data.pokemon_v2_pokemon_aggregate.aggregate.count,
        })
    }

    async fn entry_detail(&self, id: u32) -> Result<Option<EntryDetail>, QueryError> {
        let data: DetailData = self
            .execute(gql::DETAIL_QUERY, gql::detail_variables(id))
            .await?;
        Ok(entry_detail_from(&data, id))
    }
}

/// A record the catalog model cannot represent (no types, an unknown type
/// name) is reported as absent rather than as an upstream failure.
fn entry_detail_from(data: &DetailData, id: u32) -> Option<EntryDetail> {
    let Some(raw) = data.pokemon_v2_pokemon.first() else {
        tracing::debug!("No entry with id {}", id);
        return None;
    };
    match gql::to_entry(raw) {
        Ok(entry) => {
            tracing::debug!("Fetched entry: {} (ID: {})", entry.name, entry.id);
            Some(EntryDetail {
                entry,
                efficacy: gql::to_efficacy_rows(&data.pokemon_v2_typeefficacy),
            })
        }
        Err(e) => {
            tracing::warn!("Skipping malformed entry {}: {}", id, e);
            None
        }
    }
}

/// Caches successful responses of another source. Misses and failures are
/// never cached.
pub struct CachedSource {
    inner: Arc<dyn PokedexSource>,
    lists: Arc<dyn CacheTrait<ListPage>>,
    details: Arc<dyn CacheTrait<EntryDetail>>,
}

impl CachedSource {
    pub fn new(inner: Arc<dyn PokedexSource>, config: &Config) -> Self {
        Self {
            inner,
            lists: Arc::new(InmemoryCache::<ListPage>::new(&config.cache)),
            details: Arc::new(InmemoryCache::<EntryDetail>::new(&config.cache)),
        }
    }

    pub fn cleanup_expired(&self) -> usize {
        let removed = self.lists.cleanup_expired() + self.details.cleanup_expired();
        tracing::debug!(
            "Cache holds {} list pages (hit rate {:.2}) and {} entries (hit rate {:.2})",
            self.lists.size(),
            self.lists.hit_rate(),
            self.details.size(),
            self.details.hit_rate()
        );
        removed
    }
}

#[async_trait]
impl PokedexSource for CachedSource {
    async fn list_entries(&self, query: &ListQuery) -> Result<ListPage, QueryError> {
        let key = query.cache_key();
        if let Some(page) = self.lists.get(&key) {
            return Ok(page);
        }
        let page = self.inner.list_entries(query).await?;
        if let Err(e) = self.lists.insert(key, page.clone()) {
            tracing::warn!("Failed to cache list page: {}", e);
        }
        Ok(page)
    }

    async fn entry_detail(&self, id: u32) -> Result<Option<EntryDetail>, QueryError> {
        let key = format!("detail:{id}");
        if let Some(detail) = self.details.get(&key) {
            return Ok(Some(detail));
        }
        let detail = self.inner.entry_detail(id).await?;
        if let Some(found) = &detail {
            if let Err(e) = self.details.insert(key, found.clone()) {
                tracing::warn!("Failed to cache entry {}: {}", id, e);
            }
        }
        Ok(detail)
    }
}

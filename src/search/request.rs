use crate::config::{DEFAULT_RRF_K, SearchConfig};

/// Parameters of one hybrid search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,

    /// Maximum number of results. Clamped to `[1, max_limit]` by the engine.
    pub limit: usize,

    /// RRF smoothing constant.
    pub rrf_k: f64,

    /// Candidates fetched per modality before fusion.
    pub top_k_candidates: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: 20,
            rrf_k: DEFAULT_RRF_K,
            top_k_candidates: 100,
        }
    }

    /// Request with the defaults taken from `config`.
    pub fn with_config(query: impl Into<String>, config: &SearchConfig) -> Self {
        Self {
            query: query.into(),
            limit: config.default_limit,
            rrf_k: config.rrf_k,
            top_k_candidates: config.top_k_candidates,
        }
    }

    pub fn builder(query: impl Into<String>) -> SearchRequestBuilder {
        SearchRequestBuilder::new(query)
    }
}

pub struct SearchRequestBuilder {
    request: SearchRequest,
}

impl SearchRequestBuilder {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            request: SearchRequest::new(query),
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.request.limit = limit;
        self
    }

    pub fn rrf_k(mut self, k: f64) -> Self {
        self.request.rrf_k = k;
        self
    }

    pub fn top_k_candidates(mut self, top_k: usize) -> Self {
        self.request.top_k_candidates = top_k;
        self
    }

    pub fn build(self) -> SearchRequest {
        self.request
    }
}

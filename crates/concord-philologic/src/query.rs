//! Thin HTTP layer over the PhiloLogic concordance endpoint.
//!
//! One request shape, two calls per run: a discovery probe (`start=0,end=0`)
//! that only reads `results_length`, then a single full fetch. Any transport,
//! status, or decode failure is terminal; there are no retries.

use concord_core::{
    ConcordanceQuery, ConcordanceResponse, ConcordanceSource, Corpus, Error, Result,
};
use url::Url;

const DEFAULT_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, Clone)]
pub struct PhilologicClient {
    http: reqwest::Client,
    corpus: Corpus,
    timeout_ms: u64,
}

impl PhilologicClient {
    pub fn new(http: reqwest::Client, corpus: Corpus) -> Self {
        Self {
            http,
            corpus,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms.clamp(1_000, 300_000);
        self
    }

    fn request_url(&self, query: &ConcordanceQuery, start: u64, end: u64) -> Url {
        let q = query
            .lemmas
            .iter()
            .map(|l| format!("lemma:{}", l.trim()))
            .collect::<Vec<_>>()
            .join(" | ");

        let mut url = self.corpus.query_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("report", "concordance")
                .append_pair("method", "proxy")
                .append_pair("colloc_filter_choice", "frequency")
                .append_pair("q", &q)
                .append_pair("start", &start.to_string())
                .append_pair("end", &end.to_string())
                .append_pair("direction", "")
                .append_pair("metadata_sorting_field", "")
                .append_pair("format", "json");
            if let Some(author) = query.author.as_deref().filter(|s| !s.trim().is_empty()) {
                pairs.append_pair("author", author);
            }
            if let Some(title) = query.title.as_deref().filter(|s| !s.trim().is_empty()) {
                pairs.append_pair("title", title);
            }
        }
        url
    }
}

#[async_trait::async_trait]
impl ConcordanceSource for PhilologicClient {
    async fn fetch(
        &self,
        query: &ConcordanceQuery,
        start: u64,
        end: u64,
    ) -> Result<ConcordanceResponse> {
        let url = self.request_url(query, start, end);
        let resp = self
            .http
            .get(url.clone())
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Protocol(format!("HTTP {status} from {url}")));
        }

        resp.json::<ConcordanceResponse>()
            .await
            .map_err(|e| Error::Format(format!("{url}: {e}")))
    }
}

/// Discovery probe, then one full fetch of `1..=results_length`.
///
/// Zero discovered results short-circuits without a second request.
pub async fn fetch_all(
    source: &dyn ConcordanceSource,
    query: &ConcordanceQuery,
) -> Result<ConcordanceResponse> {
    let discovery = source.fetch(query, 0, 0).await?;
    if discovery.results_length == 0 {
        return Ok(ConcordanceResponse::default());
    }
    source.fetch(query, 1, discovery.results_length).await
}

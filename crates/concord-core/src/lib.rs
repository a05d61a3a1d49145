use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("malformed response: {0}")]
    Format(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Corpus language; selects the PhiloLogic endpoint pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Latin,
    Greek,
}

impl Language {
    pub fn label(&self) -> &'static str {
        match self {
            Language::Latin => "Latin",
            Language::Greek => "Greek",
        }
    }

    fn default_base(&self) -> &'static str {
        match self {
            Language::Latin => "https://artflsrv03.uchicago.edu/philologic4/Latin/",
            Language::Greek => "https://artflsrv03.uchicago.edu/philologic4/Greek/",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latin" => Ok(Language::Latin),
            "greek" => Ok(Language::Greek),
            _ => Err(Error::NotConfigured(format!(
                "unsupported language {:?} (expected Latin or Greek)",
                s.trim()
            ))),
        }
    }
}

/// Resolved endpoint configuration for one corpus.
///
/// Threaded explicitly into the query layer and the passage URL builder; there
/// is no process-global base URL.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub language: Language,
    /// The concordance query endpoint (`<base>/query`).
    pub query_url: url::Url,
    /// Base for resolving relative citation links into navigable URLs.
    pub nav_url: url::Url,
}

impl Corpus {
    pub fn for_language(language: Language) -> Result<Self> {
        Self::with_base(language, language.default_base())
    }

    /// Build from an explicit corpus root, e.g. `https://host/philologic4/Latin/`.
    pub fn with_base(language: Language, base: &str) -> Result<Self> {
        let mut base = base.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let nav_url = url::Url::parse(&base)
            .map_err(|e| Error::InvalidUrl(format!("{base}: {e}")))?;
        let query_url = nav_url
            .join("query")
            .map_err(|e| Error::InvalidUrl(format!("{base}query: {e}")))?;
        Ok(Self {
            language,
            query_url,
            nav_url,
        })
    }
}

/// One concordance search: one or more lemmas (OR-combined by the server)
/// plus optional bibliographic filters.
#[derive(Debug, Clone, Default)]
pub struct ConcordanceQuery {
    pub lemmas: Vec<String>,
    pub author: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConcordanceResponse {
    #[serde(default)]
    pub results_length: u64,
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// One matched passage as returned by the PhiloLogic JSON API.
///
/// Every field is optional on the wire; absent fields degrade to empty values
/// rather than failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    /// HTML fragment with zero or more highlighted spans.
    #[serde(default, deserialize_with = "null_default")]
    pub context: String,
    #[serde(default, deserialize_with = "null_default")]
    pub metadata_fields: HitMetadata,
    /// Positional document identifier; its first element backs up a missing
    /// `philo_doc_id`. The wire type varies, so anything that is not an array
    /// degrades to empty.
    #[serde(default, deserialize_with = "array_or_empty")]
    pub philo_id: Vec<serde_json::Value>,
    /// Hierarchical citation, outermost level first.
    #[serde(default, deserialize_with = "null_default")]
    pub citation: Vec<CitationNode>,
    #[serde(default, deserialize_with = "null_default")]
    pub citation_links: CitationLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HitMetadata {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// The API is inconsistent about this field's JSON type (string or
    /// number); it is normalized to a string on deserialization.
    #[serde(default, deserialize_with = "string_or_number")]
    pub philo_doc_id: Option<String>,
}

/// One level of a hierarchical bibliographic citation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CitationNode {
    /// Level tag: "doc", "div1", "div2", "div3", ...
    #[serde(default)]
    pub object_type: Option<String>,
    /// Human-readable citation label (may be empty).
    #[serde(default)]
    pub label: Option<String>,
    /// Relative URL fragment, possibly carrying a `byte=<digits>` offset.
    #[serde(default)]
    pub href: Option<String>,
}

/// Per-level deep links for one hit; any subset may be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CitationLinks {
    #[serde(default)]
    pub para: Option<String>,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
}

/// One flat output record. All rows derived from the same hit are identical
/// except for `token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "TOKEN")]
    pub token: String,
    #[serde(rename = "LEMMA")]
    pub lemma: String,
    #[serde(rename = "SENTENCE")]
    pub sentence: String,
    pub author: String,
    pub title: String,
    pub language: String,
    pub passage: String,
}

impl OutputRow {
    /// Column order of the CSV surface. Written even for zero rows.
    pub const HEADER: [&'static str; 8] = [
        "ID", "TOKEN", "LEMMA", "SENTENCE", "author", "title", "language", "passage",
    ];
}

fn string_or_number<'de, D>(d: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(d)?;
    Ok(v.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// JSON `null` degrades to the field's default instead of failing the hit.
fn null_default<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn array_or_empty<'de, D>(d: D) -> std::result::Result<Vec<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match v {
        Some(serde_json::Value::Array(items)) => items,
        _ => Vec::new(),
    })
}

#[async_trait::async_trait]
pub trait ConcordanceSource: Send + Sync {
    /// Fetch one result window. `start=0,end=0` is the discovery probe that
    /// only needs `results_length` to be meaningful.
    async fn fetch(
        &self,
        query: &ConcordanceQuery,
        start: u64,
        end: u64,
    ) -> Result<ConcordanceResponse>;
}

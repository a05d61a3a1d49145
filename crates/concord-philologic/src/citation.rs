//! Passage identifiers and deep links from PhiloLogic citation metadata.
//!
//! The identifier scheme is the hierarchical one:
//!
//! ```text
//! <doc_id>.<div1>.<div2>.<div3>.<byte>_<DocLabel>
//! ```
//!
//! e.g. `77.5.14.2.636137_Caes.Gal.`. Every component is optional; whatever is
//! missing is omitted without leaving an empty placeholder, so the ID degrades
//! all the way down to the empty string when a hit carries no usable citation
//! metadata at all.

use concord_core::{CitationLinks, SearchHit};
use url::Url;

/// Digits of the first `byte=<digits>` parameter in a URL fragment, if any.
fn byte_offset(href: &str) -> Option<&str> {
    let mut rest = href;
    while let Some(i) = rest.find("byte=") {
        let tail = &rest[i + "byte=".len()..];
        let end = tail
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(tail.len());
        if end > 0 {
            return Some(&tail[..end]);
        }
        rest = tail;
    }
    None
}

/// First byte offset found in the per-level links, most specific level first.
fn links_byte_offset(links: &CitationLinks) -> Option<&str> {
    [
        links.para.as_deref(),
        links.line.as_deref(),
        links.doc.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find_map(byte_offset)
}

fn scalar_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Derive the passage identifier for one hit.
///
/// Deterministic and total: a single ordered scan of the citation sequence
/// collects the first "doc" label, up to three "div*" labels, and the first
/// byte offset seen in a citation href (`citation_links` serve as the byte
/// fallback, in para > line > doc order). The document id prefers
/// `philo_doc_id` and falls back to the first `philo_id` element.
pub fn passage_id(hit: &SearchHit) -> String {
    let mut doc_id = hit
        .metadata_fields
        .philo_doc_id
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string();
    if doc_id.is_empty() {
        if let Some(first) = hit.philo_id.first() {
            doc_id = scalar_string(first);
        }
    }

    let mut doc_label = "";
    let mut div_labels: Vec<&str> = Vec::new();
    let mut byte = "";
    for node in &hit.citation {
        let object_type = node.object_type.as_deref().unwrap_or("");
        let label = node.label.as_deref().unwrap_or("").trim();

        if doc_label.is_empty() && object_type.eq_ignore_ascii_case("doc") && !label.is_empty() {
            doc_label = label;
        }
        // Only the first three structural levels contribute (e.g. 5.14.2).
        if div_labels.len() < 3
            && object_type.to_ascii_lowercase().starts_with("div")
            && !label.is_empty()
        {
            div_labels.push(label);
        }
        if byte.is_empty() {
            if let Some(b) = node.href.as_deref().and_then(byte_offset) {
                byte = b;
            }
        }
    }

    let byte = if byte.is_empty() {
        links_byte_offset(&hit.citation_links).unwrap_or("")
    } else {
        byte
    };

    let mut parts: Vec<&str> = Vec::new();
    if !doc_id.is_empty() {
        parts.push(doc_id.as_str());
    }
    parts.extend(div_labels);
    if !byte.is_empty() {
        parts.push(byte);
    }
    let base = parts.join(".");

    if doc_label.is_empty() {
        return base;
    }
    // "Caes. Gal." -> "Caes.Gal."
    let label: String = doc_label.split_whitespace().collect();
    if base.is_empty() {
        label
    } else {
        format!("{base}_{label}")
    }
}

/// Build a clickable passage URL from the per-level citation links.
///
/// Picks the most specific available level (para > line > doc), reshapes a
/// query-bearing fragment into `<path>/?<query>`, and resolves it against the
/// corpus navigation base. Returns the empty string when no link is present
/// or the fragment does not resolve.
pub fn passage_url(links: &CitationLinks, nav_url: &Url) -> String {
    fn nonempty(s: &Option<String>) -> Option<&str> {
        s.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
    let raw = nonempty(&links.para)
        .or_else(|| nonempty(&links.line))
        .or_else(|| nonempty(&links.doc));
    let Some(raw) = raw else {
        return String::new();
    };

    let reshaped = match raw.split_once('?') {
        Some((path, query)) => {
            if path.ends_with('/') {
                format!("{path}?{query}")
            } else {
                format!("{path}/?{query}")
            }
        }
        None => raw.to_string(),
    };

    match nav_url.join(&reshaped) {
        Ok(u) => u.to_string(),
        Err(_) => String::new(),
    }
}

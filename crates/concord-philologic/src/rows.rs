//! Flattening search hits into output records.

use concord_core::{Corpus, OutputRow, SearchHit};
use url::Url;

use crate::citation::{passage_id, passage_url};
use crate::context::{clean_context, highlight_tokens};

/// The LEMMA column value for a run: the lemma itself for a single-lemma
/// search, otherwise the whole searched set joined with `;`. The API does not
/// report which lemma matched a given token, so the ambiguity is preserved
/// verbatim instead of guessed.
pub fn lemma_label(lemmas: &[String]) -> String {
    if lemmas.len() == 1 {
        lemmas[0].clone()
    } else {
        lemmas.join(";")
    }
}

/// Rows for one hit: one per highlighted token, or a single empty-token row
/// when the context carries no highlight. Everything except TOKEN is shared
/// across the hit's rows.
pub fn rows_for_hit(hit: &SearchHit, lemma: &str, language: &str, nav_url: &Url) -> Vec<OutputRow> {
    let sentence = clean_context(&hit.context);
    let mut tokens = highlight_tokens(&hit.context);
    if tokens.is_empty() {
        tokens.push(String::new());
    }

    let id = passage_id(hit);
    let passage = passage_url(&hit.citation_links, nav_url);
    let author = hit
        .metadata_fields
        .author
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string();
    let title = hit
        .metadata_fields
        .title
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string();

    tokens
        .into_iter()
        .map(|token| OutputRow {
            id: id.clone(),
            token,
            lemma: lemma.to_string(),
            sentence: sentence.clone(),
            author: author.clone(),
            title: title.clone(),
            language: language.to_string(),
            passage: passage.clone(),
        })
        .collect()
}

/// Rows for a whole response, in API result order then token order.
pub fn assemble_rows(hits: &[SearchHit], lemma: &str, corpus: &Corpus) -> Vec<OutputRow> {
    hits.iter()
        .flat_map(|hit| rows_for_hit(hit, lemma, corpus.language.label(), &corpus.nav_url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_core::{CitationLinks, HitMetadata};

    fn nav() -> Url {
        Url::parse("https://host/philologic4/Latin/").unwrap()
    }

    fn hit_with_two_tokens() -> SearchHit {
        SearchHit {
            context: concat!(
                "Gallia est <span class=\"highlight\">omnis</span> divisa , ",
                "quarum unam incolunt <span class=\"highlight\">Belgae</span> ."
            )
            .to_string(),
            metadata_fields: HitMetadata {
                author: Some(" Julius Caesar ".to_string()),
                title: Some("De bello Gallico".to_string()),
                philo_doc_id: Some("77".to_string()),
            },
            citation_links: CitationLinks {
                para: Some("navigate/77/5/14/2?byte=636137".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn one_row_per_token_sharing_everything_but_the_token() {
        let rows = rows_for_hit(&hit_with_two_tokens(), "omnis", "Latin", &nav());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].token, "omnis");
        assert_eq!(rows[1].token, "Belgae");

        let mut a = rows[0].clone();
        let mut b = rows[1].clone();
        a.token.clear();
        b.token.clear();
        assert_eq!(a, b);

        assert_eq!(
            rows[0].sentence,
            "Gallia est omnis divisa, quarum unam incolunt Belgae."
        );
        assert_eq!(rows[0].author, "Julius Caesar");
        assert_eq!(
            rows[0].passage,
            "https://host/philologic4/Latin/navigate/77/5/14/2/?byte=636137"
        );
    }

    #[test]
    fn hit_without_highlight_still_emits_one_row() {
        let hit = SearchHit {
            context: "no highlight here".to_string(),
            ..Default::default()
        };
        let rows = rows_for_hit(&hit, "aspicio", "Latin", &nav());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].token, "");
        assert_eq!(rows[0].sentence, "no highlight here");
        assert_eq!(rows[0].author, "");
        assert_eq!(rows[0].passage, "");
    }

    #[test]
    fn lemma_label_joins_multiple_lemmas_with_semicolons() {
        assert_eq!(lemma_label(&["aspicio".to_string()]), "aspicio");
        assert_eq!(
            lemma_label(&["inspicio".to_string(), "invideo".to_string()]),
            "inspicio;invideo"
        );
    }

    #[test]
    fn assemble_preserves_result_order() {
        let corpus =
            concord_core::Corpus::with_base(concord_core::Language::Latin, nav().as_str()).unwrap();
        let hits = vec![
            hit_with_two_tokens(),
            SearchHit {
                context: "plain".to_string(),
                ..Default::default()
            },
        ];
        let rows = assemble_rows(&hits, "omnis", &corpus);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].token, "omnis");
        assert_eq!(rows[1].token, "Belgae");
        assert_eq!(rows[2].token, "");
        assert!(rows.iter().all(|r| r.language == "Latin"));
    }
}

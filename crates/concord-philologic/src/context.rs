//! Cleaning and highlight extraction for concordance context fragments.
//!
//! PhiloLogic context snippets are small HTML fragments; the matched surface
//! forms are wrapped in `<span class="...highlight...">`. Fragments are parsed
//! with a real HTML tokenizer rather than tag-stripping patterns, so malformed
//! or nested markup degrades gracefully.

/// Punctuation that must not be preceded by a space in cleaned text.
const NO_SPACE_BEFORE: [char; 6] = [',', '.', ';', ':', '?', '!'];

/// Opening curly double quote; no space is allowed after it.
const OPENING_QUOTE: char = '\u{201C}';

/// Strip markup from a context fragment and normalize it into readable
/// sentence text.
///
/// Tags act as word separators (so `vi<b>r</b>` does not join into one run of
/// letters), entities are decoded by the parser, whitespace runs collapse to a
/// single space, and spacing around punctuation and opening quotes is tidied.
/// Idempotent on already-cleaned text.
pub fn clean_context(html: &str) -> String {
    let fragment = html_scraper::Html::parse_fragment(html);
    let joined = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    tidy(&joined)
}

/// Ordered surface forms of every highlighted span in a context fragment.
///
/// A span counts as highlighted when its `class` attribute contains
/// `highlight` (ASCII case-insensitive); extra classes, extra attributes, and
/// nested markup inside the span are all tolerated. Inner texts are cleaned
/// like [`clean_context`]; spans that clean to nothing are dropped. An empty
/// result means the hit carries no highlighted token.
pub fn highlight_tokens(html: &str) -> Vec<String> {
    let fragment = html_scraper::Html::parse_fragment(html);
    let sel = match html_scraper::Selector::parse("span[class]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut out = Vec::new();
    for el in fragment.select(&sel) {
        let class = el.value().attr("class").unwrap_or("");
        if !class.to_ascii_lowercase().contains("highlight") {
            continue;
        }
        let text = tidy(&el.text().collect::<Vec<_>>().join(" "));
        if !text.is_empty() {
            out.push(text);
        }
    }
    out
}

/// Whitespace/punctuation normalization shared by the cleaner and the
/// extractor: collapse whitespace runs, trim, drop spaces before closing
/// punctuation and after an opening curly quote.
fn tidy(s: &str) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let mut chars = collapsed.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == ' ' {
            if out.ends_with(OPENING_QUOTE) {
                continue;
            }
            if let Some(next) = chars.peek() {
                if NO_SPACE_BEFORE.contains(next) {
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out
}

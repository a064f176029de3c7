use std::collections::BTreeSet;
use std::sync::LazyLock;

use scraper::Selector;

use super::PageDocument;

/// Title recorded for pages without a usable `<title>`.
pub const MISSING_TITLE: &str = "N/T";

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector"));
static META_NAMED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[name]").expect("static selector"));

/// Title and descriptive meta tags of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    /// Content of every `<meta name="description">`, in document order.
    pub description: Vec<String>,
    /// Content of every `<meta name="keywords">`, in document order.
    pub keywords: Vec<String>,
}

pub fn harvest(doc: &PageDocument) -> PageMetadata {
    let html = doc.html();

    let title = html
        .select(&TITLE)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| MISSING_TITLE.to_string());

    let mut description = Vec::new();
    let mut keywords = Vec::new();
    for meta in html.select(&META_NAMED) {
        let el = meta.value();
        let (Some(name), Some(content)) = (el.attr("name"), el.attr("content")) else {
            continue;
        };
        if name.eq_ignore_ascii_case("description") {
            description.push(content.to_string());
        } else if name.eq_ignore_ascii_case("keywords") {
            keywords.push(content.to_string());
        }
    }

    PageMetadata {
        title,
        description,
        keywords,
    }
}

/// Words from the page's keywords and description that belong to `vocabulary`.
///
/// Only the first entry of each list is used. Keywords are comma-separated
/// with whitespace ignored; the description is split on whitespace.
/// Keyword hits come first and repeats are kept.
pub fn derive_offers(
    keywords: &[String],
    description: &[String],
    vocabulary: &BTreeSet<String>,
) -> Vec<String> {
    let mut offers = Vec::new();

    if let Some(first) = keywords.first().filter(|k| !k.trim().is_empty()) {
        let compact: String = first.chars().filter(|c| !c.is_whitespace()).collect();
        offers.extend(
            compact
                .split(',')
                .filter(|word| vocabulary.contains(*word))
                .map(str::to_string),
        );
    }

    if let Some(first) = description.first() {
        offers.extend(
            first
                .split_whitespace()
                .filter(|word| vocabulary.contains(*word))
                .map(str::to_string),
        );
    }

    offers
}

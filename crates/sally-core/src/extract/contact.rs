//! Email and phone recovery.
//!
//! Each configured element type is scanned in priority order. The scan text
//! of an element is its text content plus the `mailto:` and `tel:` link
//! targets under it, so those are found even when the visible text says
//! "Write to us". Other attributes (asset URLs, cache-busting query values)
//! are never scanned.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::PageDocument;
use crate::error::AppError;

const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "ico"];

const CONTACT_SCHEMES: [&str; 2] = ["mailto:", "tel:"];

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    // The TLD must end on a word boundary within six letters, so a sentence
    // glued after the final dot is left out.
    Regex::new(r"(?i)[a-z0-9._%+\-]+@[a-z0-9\-]+(?:\.[a-z0-9\-]+)*\.[a-z]{2,6}\b")
        .expect("static regex")
});

/// A digit-grouping pattern and the digit count a valid match must have.
///
/// The trailing `(\d*)` group swallows any digits glued to the match so that
/// a longer run fails the length check instead of yielding a fragment.
struct PhonePattern {
    name: &'static str,
    regex: Regex,
    code_len: usize,
}

impl PhonePattern {
    fn new(name: &'static str, pattern: &str, code_len: usize) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("static regex"),
            code_len,
        }
    }
}

static PHONE_PATTERNS: LazyLock<[PhonePattern; 4]> = LazyLock::new(|| {
    [
        // North American: (555) 123-4567
        PhonePattern::new(
            "3-3-4",
            r"\b(\d{3})\W{0,3}(\d{3})\W{0,3}(\d{4})(\d*)",
            10,
        ),
        // Two-digit area code: 55 1234 5678
        PhonePattern::new("2-4-4", r"\b(\d{2})\W{0,3}(\d{4})\W{0,3}(\d{4})(\d*)", 10),
        PhonePattern::new("2-8", r"\b(\d{2})\W{0,3}(\d{8})(\d*)", 10),
        PhonePattern::new("10", r"\b(\d{10})(\d*)", 10),
    ]
});

/// Email and phone extractor bound to a validated list of element types.
#[derive(Debug, Clone)]
pub struct ContactExtractor {
    selectors: Vec<Selector>,
}

impl ContactExtractor {
    pub fn new<S: AsRef<str>>(elements: &[S]) -> Result<Self, AppError> {
        let selectors = elements
            .iter()
            .map(|e| {
                Selector::parse(e.as_ref()).map_err(|err| {
                    AppError::ConfigError(format!(
                        "Invalid contact element '{}': {err:?}",
                        e.as_ref()
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { selectors })
    }

    /// Emails found in any configured element, lowercased.
    pub fn emails(&self, doc: &PageDocument) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        for text in scan_texts(doc, &self.selectors) {
            found.extend(emails_in(&text));
        }
        found
    }

    /// Phone candidates in encounter order, deduplicated on their digits.
    pub fn phones(&self, doc: &PageDocument) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut phones = Vec::new();
        for text in scan_texts(doc, &self.selectors) {
            for phone in phones_in(&text) {
                if seen.insert(digits(&phone)) {
                    phones.push(phone);
                }
            }
        }
        phones
    }
}

/// Emails under the given element types. Unparseable element names are skipped.
pub fn extract_emails<S: AsRef<str>>(doc: &PageDocument, element_tags: &[S]) -> BTreeSet<String> {
    ContactExtractor::lenient(element_tags).emails(doc)
}

/// Phone candidates under the given element types. Unparseable element names are skipped.
pub fn extract_phones<S: AsRef<str>>(doc: &PageDocument, element_tags: &[S]) -> Vec<String> {
    ContactExtractor::lenient(element_tags).phones(doc)
}

impl ContactExtractor {
    fn lenient<S: AsRef<str>>(elements: &[S]) -> Self {
        let selectors = elements
            .iter()
            .filter_map(|e| match Selector::parse(e.as_ref()) {
                Ok(selector) => Some(selector),
                Err(err) => {
                    tracing::debug!(element = e.as_ref(), error = ?err, "Skipping element type");
                    None
                }
            })
            .collect();
        Self { selectors }
    }
}

fn scan_texts<'a>(
    doc: &'a PageDocument,
    selectors: &'a [Selector],
) -> impl Iterator<Item = String> + 'a {
    selectors
        .iter()
        .flat_map(move |selector| doc.html().select(selector))
        .map(scan_text)
}

fn scan_text(element: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = element.text().collect();
    for node in element.descendants().filter_map(ElementRef::wrap) {
        parts.extend(node.value().attr("href").and_then(contact_target));
    }
    parts.join(" ")
}

/// The address part of a `mailto:` or `tel:` link. Other hrefs carry no contact data.
fn contact_target(href: &str) -> Option<&str> {
    let href = href.trim();
    CONTACT_SCHEMES.iter().find_map(|scheme| {
        href.get(..scheme.len())
            .filter(|head| head.eq_ignore_ascii_case(scheme))
            .map(|_| &href[scheme.len()..])
    })
}

fn emails_in(text: &str) -> impl Iterator<Item = String> + '_ {
    EMAIL
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|email| !has_image_extension(email))
}

fn has_image_extension(candidate: &str) -> bool {
    candidate
        .rsplit('.')
        .next()
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn followed_by_image_extension(text: &str, end: usize) -> bool {
    let rest = &text[end..];
    rest.strip_prefix('.').is_some_and(|rest| {
        IMAGE_EXTENSIONS.iter().any(|ext| {
            rest.get(..ext.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(ext))
        })
    })
}

/// Every accepted phone candidate in `text`, patterns applied in order.
fn phones_in(text: &str) -> Vec<String> {
    let mut phones = Vec::new();
    for pattern in PHONE_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if followed_by_image_extension(text, whole.end()) {
                continue;
            }
            let candidate = caps
                .iter()
                .skip(1)
                .flatten()
                .map(|g| g.as_str())
                .filter(|g| !g.is_empty())
                .collect::<Vec<_>>()
                .join("-");
            if digits(&candidate).len() == pattern.code_len {
                phones.push(candidate);
            } else {
                tracing::trace!(pattern = pattern.name, %candidate, "Rejected phone capture");
            }
        }
    }
    phones
}

fn digits(candidate: &str) -> String {
    candidate.chars().filter(char::is_ascii_digit).collect()
}

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A seed admitted by the URL filter, ready to fetch.
///
/// Always carries a scheme. Ordering is lexical so target sets iterate
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrawlTarget(String);

impl CrawlTarget {
    /// Normalize a raw seed line into a target URL.
    ///
    /// Surrounding whitespace is dropped, `http://` is prefixed when the seed
    /// has no scheme, and scheme and host are lowercased. The path is kept
    /// as written. Returns `None` for blank lines.
    pub fn from_seed(seed: &str) -> Option<Self> {
        let seed = seed.trim();
        if seed.is_empty() {
            return None;
        }
        let (scheme, rest) = match seed.split_once("://") {
            Some((scheme, rest)) => (scheme.to_lowercase(), rest),
            None => ("http".to_string(), seed),
        };
        let (host, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
        Some(Self(format!("{scheme}://{}{path}", host.to_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host portion of the target, lowercased. `None` if the URL does not parse.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.0)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
    }
}

impl fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw page handed back by the fetch collaborator.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects.
    pub final_url: String,
    pub html: String,
}

/// Detected e-commerce software.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTag {
    Shopify,
    WooCommerce,
    Shoperti,
    Magento,
    #[default]
    None,
}

impl PlatformTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformTag::Shopify => "shopify",
            PlatformTag::WooCommerce => "woocommerce",
            PlatformTag::Shoperti => "shoperti",
            PlatformTag::Magento => "magento",
            PlatformTag::None => "none",
        }
    }

    pub fn is_detected(&self) -> bool {
        *self != PlatformTag::None
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlatformTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shopify" => Ok(PlatformTag::Shopify),
            "woocommerce" => Ok(PlatformTag::WooCommerce),
            "shoperti" => Ok(PlatformTag::Shoperti),
            "magento" => Ok(PlatformTag::Magento),
            "none" => Ok(PlatformTag::None),
            _ => Err(format!("Unknown platform tag: {}", s)),
        }
    }
}

/// Everything the extraction engine recovered from one page.
///
/// Set-typed fields hold no duplicate normalized values: emails are
/// lowercased, phones are deduplicated on their digits.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignalSet {
    /// Final URL of the page.
    pub url: String,
    /// Network location (host) of the page, lowercased.
    pub host: String,
    /// True when the page was served over https.
    pub secure: bool,
    pub title: String,
    pub emails: BTreeSet<String>,
    /// Formatted phone candidates in encounter order.
    pub phones: Vec<String>,
    pub social_links: BTreeSet<String>,
    pub platform: PlatformTag,
    pub cart_markers: BTreeSet<String>,
    pub payment_links: BTreeSet<String>,
    /// Every anchor target on the page, as encountered.
    pub links: Vec<String>,
    pub description: Vec<String>,
    pub keywords: Vec<String>,
    pub offers: Vec<String>,
    /// Web pages carry no engagement count; kept for scorer uniformity.
    pub engagement: Option<u64>,
}

/// Flat payload returned by the social-profile collaborator.
///
/// Every field is optional: the graph API omits fields a page never filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub engagement: Option<Engagement>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub emails: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl SocialProfile {
    pub fn engagement_count(&self) -> Option<u64> {
        self.engagement.as_ref().and_then(|e| e.count)
    }

    pub fn has_emails(&self) -> bool {
        self.emails.as_ref().is_some_and(|e| !e.is_empty())
    }

    pub fn has_phone(&self) -> bool {
        self.phone.as_ref().is_some_and(|p| !p.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

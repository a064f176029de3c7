//! Web-page extraction and classification.
//!
//! Every extractor is a pure function of an immutable [`PageDocument`]:
//! running one twice yields the same result and no state is shared between
//! documents. A missing element is never an error; it resolves to an empty
//! set, an empty list, or a sentinel value.

pub mod contact;
pub mod metadata;
pub mod platform;
pub mod social;

use std::sync::Arc;

use scraper::{Html, Selector};
use url::Url;

use crate::config::ScoringConfig;
use crate::error::AppError;
use crate::models::{FetchedPage, SignalSet};

pub use contact::{ContactExtractor, extract_emails, extract_phones};
pub use metadata::{MISSING_TITLE, PageMetadata, derive_offers, harvest};
pub use platform::{cart_markers, fingerprint, payment_links};
pub use social::{extract_social_links, site_identity};

/// A fetched page with a queryable DOM.
///
/// Holds a parsed `scraper::Html`, which is neither `Send` nor `Sync`: build
/// it, extract, and drop it inside one synchronous section.
pub struct PageDocument {
    url: String,
    host: String,
    secure: bool,
    html: Html,
}

impl PageDocument {
    pub fn parse(url: &str, html: &str) -> Self {
        let parsed = Url::parse(url).ok();
        let host = parsed
            .as_ref()
            .and_then(|u| u.host_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let secure = parsed.as_ref().is_some_and(|u| u.scheme() == "https");

        Self {
            url: url.to_string(),
            host,
            secure,
            html: Html::parse_document(html),
        }
    }

    pub fn from_fetched(page: &FetchedPage) -> Self {
        Self::parse(&page.final_url, &page.html)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Lowercased host, empty when the URL did not parse.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Every `href` of every anchor, in document order.
    pub fn anchor_targets(&self) -> Vec<String> {
        self.html
            .select(&ANCHOR_HREF)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty())
            .collect()
    }
}

static ANCHOR_HREF: std::sync::LazyLock<Selector> =
    std::sync::LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// Runs every extractor over a page and assembles the [`SignalSet`].
///
/// Holds the run's immutable settings; cheap to clone.
#[derive(Clone)]
pub struct LeadExtractor {
    config: Arc<ScoringConfig>,
    contacts: ContactExtractor,
}

impl LeadExtractor {
    pub fn new(config: Arc<ScoringConfig>) -> Result<Self, AppError> {
        let contacts = ContactExtractor::new(&config.contact_elements)?;
        Ok(Self { config, contacts })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Parse `html` and extract its signals. The DOM is dropped before returning.
    pub fn extract_html(&self, final_url: &str, html: &str) -> SignalSet {
        let doc = PageDocument::parse(final_url, html);
        self.extract(&doc)
    }

    pub fn extract(&self, doc: &PageDocument) -> SignalSet {
        let metadata = harvest(doc);
        let identity = site_identity(doc.host());
        let offers = derive_offers(
            &metadata.keywords,
            &metadata.description,
            &self.config.allowed_keywords,
        );

        let signals = SignalSet {
            url: doc.url().to_string(),
            host: doc.host().to_string(),
            secure: doc.is_secure(),
            title: metadata.title,
            emails: self.contacts.emails(doc),
            phones: self.contacts.phones(doc),
            social_links: extract_social_links(doc, &identity, &self.config.social_networks),
            platform: fingerprint(doc),
            cart_markers: cart_markers(doc),
            payment_links: payment_links(doc),
            links: doc.anchor_targets(),
            description: metadata.description,
            keywords: metadata.keywords,
            offers,
            engagement: None,
        };

        tracing::debug!(
            url = %signals.url,
            emails = signals.emails.len(),
            phones = signals.phones.len(),
            social = signals.social_links.len(),
            platform = %signals.platform,
            "Extracted page signals"
        );

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoreWeights;
    use crate::models::PlatformTag;

    const STOREFRONT: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>  Zapatería Luna | Calzado artesanal </title>
  <meta name="description" content="zapatos y bolsas hechos a mano">
  <meta name="keywords" content="zapatos, bolsas , cinturones">
  <script src="https://cdn.shopify.com/s/files/1/theme.js"></script>
</head>
<body>
  <header><div class="site-cart cart-icon"><i class="fa fa-shopping-cart"></i></div></header>
  <div class="contact">
    <p>Escríbenos: ventas@zapaterialuna.mx</p>
    <p>Tel. (55) 1234 5678</p>
    <span>USA: (555) 123-4567</span>
  </div>
  <ul>
    <li><a href="https://www.facebook.com/zapaterialuna">Facebook</a></li>
    <li><a href="https://instagram.com/zap_luna_oficial">Instagram</a></li>
    <li><a href="https://twitter.com/otra_marca">Twitter</a></li>
    <li><a href="https://paypal.me/zapaterialuna">Paga aquí</a></li>
  </ul>
  <img src="/assets/logo@2x.png">
</body>
</html>"#;

    fn extractor() -> LeadExtractor {
        let config = ScoringConfig::new(ScoreWeights {
            email: 2,
            telephone: 2,
            engagement: 1,
        })
        .with_allowed_keywords(["zapatos", "bolsas", "cinturones"]);
        LeadExtractor::new(Arc::new(config)).unwrap()
    }

    #[test]
    fn test_full_storefront_extraction() {
        let signals = extractor().extract_html("https://www.zapaterialuna.mx/", STOREFRONT);

        assert_eq!(signals.host, "www.zapaterialuna.mx");
        assert!(signals.secure);
        assert_eq!(signals.title, "Zapatería Luna | Calzado artesanal");
        assert_eq!(
            signals.emails.iter().collect::<Vec<_>>(),
            vec!["ventas@zapaterialuna.mx"]
        );
        assert_eq!(signals.phones, vec!["555-123-4567", "55-1234-5678"]);
        assert_eq!(signals.platform, PlatformTag::Shopify);
        assert!(signals.cart_markers.contains("site-cart cart-icon"));
        assert!(signals.cart_markers.contains("fa fa-shopping-cart"));
        assert!(
            signals
                .social_links
                .contains("https://www.facebook.com/zapaterialuna")
        );
        assert!(
            signals
                .social_links
                .contains("https://instagram.com/zap_luna_oficial")
        );
        assert!(!signals.social_links.contains("https://twitter.com/otra_marca"));
        assert!(signals.payment_links.contains("https://paypal.me/zapaterialuna"));
        assert_eq!(signals.links.len(), 4);
        assert_eq!(
            signals.offers,
            vec!["zapatos", "bolsas", "cinturones", "zapatos", "bolsas"]
        );
        assert_eq!(signals.engagement, None);
    }

    #[test]
    fn test_empty_document_resolves_to_empty_signals() {
        let signals = extractor().extract_html("not a url", "");

        assert_eq!(signals.host, "");
        assert!(!signals.secure);
        assert_eq!(signals.title, MISSING_TITLE);
        assert!(signals.emails.is_empty());
        assert!(signals.phones.is_empty());
        assert!(signals.social_links.is_empty());
        assert_eq!(signals.platform, PlatformTag::None);
        assert!(signals.offers.is_empty());
    }
}

//! E-commerce platform detection and storefront markers.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use scraper::Selector;

use super::PageDocument;
use crate::models::PlatformTag;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static SCRIPT_SRC: LazyLock<Selector> = LazyLock::new(|| selector("script[src]"));
static META_NAMED: LazyLock<Selector> = LazyLock::new(|| selector("meta[name]"));
static IMG_SRC: LazyLock<Selector> = LazyLock::new(|| selector("img[src]"));
static PAGE_CHROME: LazyLock<Selector> = LazyLock::new(|| selector("head, header, footer"));
static CLASSED: LazyLock<Selector> =
    LazyLock::new(|| selector("div[class], a[class], i[class]"));
static ANCHOR_HREF: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// Classify the storefront software behind a page.
///
/// Checks run in a fixed order and the first hit wins.
pub fn fingerprint(doc: &PageDocument) -> PlatformTag {
    let html = doc.html();

    if html
        .select(&SCRIPT_SRC)
        .filter_map(|s| s.value().attr("src"))
        .any(|src| src.contains("cdn.shopify.com"))
    {
        return PlatformTag::Shopify;
    }

    if html.select(&META_NAMED).any(|meta| {
        let el = meta.value();
        el.attr("name")
            .is_some_and(|name| name.eq_ignore_ascii_case("generator"))
            && el
                .attr("content")
                .is_some_and(|content| content.to_lowercase().contains("woocommerce"))
    }) {
        return PlatformTag::WooCommerce;
    }

    if html
        .select(&IMG_SRC)
        .filter_map(|img| img.value().attr("src"))
        .any(|src| src.contains("cdn-shoperti.global"))
    {
        return PlatformTag::Shoperti;
    }

    if html
        .select(&PAGE_CHROME)
        .any(|el| el.html().to_lowercase().contains("magento"))
    {
        return PlatformTag::Magento;
    }

    PlatformTag::None
}

/// Class attributes hinting at a shopping cart.
pub fn cart_markers(doc: &PageDocument) -> BTreeSet<String> {
    doc.html()
        .select(&CLASSED)
        .filter_map(|el| el.value().attr("class"))
        .filter(|class| class.contains("cart"))
        .map(str::to_string)
        .collect()
}

/// PayPal.me links found on the page.
pub fn payment_links(doc: &PageDocument) -> BTreeSet<String> {
    doc.html()
        .select(&ANCHOR_HREF)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| href.to_lowercase().contains("paypal.me/"))
        .map(str::to_string)
        .collect()
}

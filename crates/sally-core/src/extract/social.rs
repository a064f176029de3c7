use std::collections::BTreeSet;

use super::PageDocument;

/// Short name of a site, used to tell its own social profiles apart from
/// unrelated ones linked on the page.
///
/// `www.zapaterialuna.mx` yields `zapaterialuna`. An empty host yields an
/// empty identity.
pub fn site_identity(host: &str) -> String {
    let host = host.trim().to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    host.split('.').next().unwrap_or_default().to_string()
}

/// Anchors pointing at one of `networks` whose path mentions the site.
///
/// A link qualifies when its path contains the full identity or its first
/// three characters. Links are returned trimmed but otherwise as written.
pub fn extract_social_links<S: AsRef<str>>(
    doc: &PageDocument,
    identity: &str,
    networks: &[S],
) -> BTreeSet<String> {
    let identity = identity.to_lowercase();
    if identity.is_empty() {
        return BTreeSet::new();
    }
    let prefix: String = identity.chars().take(3).collect();

    doc.anchor_targets()
        .into_iter()
        .filter(|href| {
            let lowered = href.to_lowercase();
            networks.iter().any(|network| {
                profile_path(&lowered, &network.as_ref().to_lowercase())
                    .is_some_and(|path| path.contains(&identity) || path.contains(&prefix))
            })
        })
        .collect()
}

/// The part of `href` after the network domain, if the link is on that network.
fn profile_path<'a>(href: &'a str, network: &str) -> Option<&'a str> {
    if network.is_empty() {
        return None;
    }
    href.match_indices(network).find_map(|(at, _)| {
        let on_boundary = at == 0 || matches!(href.as_bytes()[at - 1], b'.' | b'/');
        let rest = &href[at + network.len()..];
        (on_boundary && rest.starts_with('/')).then_some(rest)
    })
}

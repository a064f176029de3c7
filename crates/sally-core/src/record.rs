//! The uniform lead record produced by both pipelines.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extract::MISSING_TITLE;
use crate::models::{PlatformTag, SignalSet, SocialProfile};

/// Column titles of the tabular export, matching [`LeadRecord::to_row`].
pub const EXPORT_HEADER: [&str; 11] = [
    "SCORE",
    "WEB SITE",
    "ABOUT",
    "CATEGORY",
    "LIKES",
    "TELEPHONE",
    "EMAIL",
    "ADDRESS",
    "CITY",
    "COUNTRY",
    "CRAWL DATE",
];

/// Crawl date format used in exported rows (`10162026`).
pub const CRAWL_DATE_FORMAT: &str = "%m%d%Y";

const PROFILE_URL_PREFIX: &str = "https://www.facebook.com/";

/// Which pipeline produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Web,
    SocialProfile,
}

impl LeadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::Web => "web",
            LeadSource::SocialProfile => "social_profile",
        }
    }
}

impl fmt::Display for LeadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LeadSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(LeadSource::Web),
            "social_profile" => Ok(LeadSource::SocialProfile),
            _ => Err(format!("Unknown lead source: {}", s)),
        }
    }
}

/// Storefront facts of a crawled page, kept with web leads.
///
/// Persisted alongside the record but not part of the tabular export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageFacts {
    pub platform: PlatformTag,
    /// Served over https.
    pub secure: bool,
    #[serde(default)]
    pub cart_markers: BTreeSet<String>,
    #[serde(default)]
    pub payment_links: BTreeSet<String>,
    #[serde(default)]
    pub social_links: BTreeSet<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub offers: Vec<String>,
}

impl From<&SignalSet> for PageFacts {
    fn from(signals: &SignalSet) -> Self {
        Self {
            platform: signals.platform,
            secure: signals.secure,
            cart_markers: signals.cart_markers.clone(),
            payment_links: signals.payment_links.clone(),
            social_links: signals.social_links.clone(),
            links: signals.links.clone(),
            keywords: signals.keywords.clone(),
            offers: signals.offers.clone(),
        }
    }
}

/// One prospect, whichever pipeline found it.
///
/// Every descriptive field is explicitly `None` when the source had nothing
/// for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub source: LeadSource,
    pub name: Option<String>,
    pub score: i64,
    pub website: Option<String>,
    pub about: Option<String>,
    pub category: Option<String>,
    pub engagement: Option<u64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub crawl_date: DateTime<Utc>,
    /// Set for web leads only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageFacts>,
}

impl LeadRecord {
    /// Build a record from the signals of a crawled page.
    ///
    /// `source_url` stands in for the website when the page carries no URL.
    pub fn from_signals(
        signals: &SignalSet,
        score: i64,
        source_url: &str,
        crawled_at: DateTime<Utc>,
    ) -> Self {
        let website = non_empty(&signals.url).or_else(|| non_empty(source_url));
        let name = non_empty(&signals.title).filter(|title| title != MISSING_TITLE);
        let about = signals.description.iter().find_map(|d| non_empty(d));
        let category = (!signals.offers.is_empty()).then(|| signals.offers.join(", "));

        Self {
            source: LeadSource::Web,
            name,
            score,
            website,
            about,
            category,
            engagement: signals.engagement,
            phone: join_non_empty(signals.phones.iter()),
            email: join_non_empty(signals.emails.iter()),
            address: None,
            city: None,
            country: None,
            crawl_date: crawled_at,
            page: Some(PageFacts::from(signals)),
        }
    }

    /// Build a record from a social-profile payload.
    ///
    /// A profile without a website points at its own profile page.
    pub fn from_profile(profile: &SocialProfile, score: i64, crawled_at: DateTime<Utc>) -> Self {
        let website = profile
            .website
            .as_deref()
            .and_then(non_empty)
            .or_else(|| {
                profile
                    .id
                    .as_deref()
                    .and_then(non_empty)
                    .map(|id| format!("{PROFILE_URL_PREFIX}{id}"))
            });
        let location = profile.location.as_ref();
        let address = location.and_then(|l| {
            join_non_empty_with([l.street.as_deref(), l.zip.as_deref()].into_iter().flatten(), ", ")
        });

        Self {
            source: LeadSource::SocialProfile,
            name: profile.name.as_deref().and_then(non_empty),
            score,
            website,
            about: profile.about.as_deref().and_then(non_empty),
            category: profile.category.as_deref().and_then(non_empty),
            engagement: profile.engagement_count(),
            phone: profile.phone.as_deref().and_then(non_empty),
            email: profile
                .emails
                .as_ref()
                .and_then(|emails| join_non_empty(emails.iter())),
            address,
            city: location.and_then(|l| l.city.as_deref()).and_then(non_empty),
            country: location.and_then(|l| l.country.as_deref()).and_then(non_empty),
            crawl_date: crawled_at,
            page: None,
        }
    }

    /// The record as an export row, in [`EXPORT_HEADER`] order. `None` becomes "".
    pub fn to_row(&self) -> [String; 11] {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        [
            self.score.to_string(),
            text(&self.website),
            text(&self.about),
            text(&self.category),
            self.engagement.map(|e| e.to_string()).unwrap_or_default(),
            text(&self.phone),
            text(&self.email),
            text(&self.address),
            text(&self.city),
            text(&self.country),
            self.crawl_date.format(CRAWL_DATE_FORMAT).to_string(),
        ]
    }
}

/// A record as persisted by a [`crate::traits::LeadStore`].
#[derive(Debug, Clone, Serialize)]
pub struct StoredLead {
    pub id: Uuid,
    pub record: LeadRecord,
    pub created_at: DateTime<Utc>,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn join_non_empty<'a>(values: impl Iterator<Item = &'a String>) -> Option<String> {
    join_non_empty_with(values.map(String::as_str), ",")
}

fn join_non_empty_with<'a>(values: impl Iterator<Item = &'a str>, sep: &str) -> Option<String> {
    let parts: Vec<&str> = values.map(str::trim).filter(|v| !v.is_empty()).collect();
    (!parts.is_empty()).then(|| parts.join(sep))
}

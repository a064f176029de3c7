use chrono::{TimeZone, Utc};
use sally_core::models::PlatformTag;
use sally_core::record::{LeadRecord, LeadSource, PageFacts};
use sally_core::traits::LeadStore;
use sally_db::LeadRepository;

use crate::integration::common::setup_test_db;

fn web_lead(website: &str, score: i64) -> LeadRecord {
    LeadRecord {
        source: LeadSource::Web,
        name: Some("Zapatería Luna".into()),
        score,
        website: Some(website.into()),
        about: Some("Calzado artesanal".into()),
        category: Some("zapatos, bolsas".into()),
        engagement: None,
        phone: Some("555-123-4567".into()),
        email: Some("ventas@zapaterialuna.mx".into()),
        address: None,
        city: None,
        country: None,
        crawl_date: Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap(),
        page: Some(PageFacts {
            platform: PlatformTag::Shopify,
            secure: true,
            cart_markers: ["site-cart cart-icon".to_string()].into(),
            payment_links: ["https://paypal.me/zapaterialuna".to_string()].into(),
            social_links: ["https://www.facebook.com/zapaterialuna".to_string()].into(),
            links: vec![
                "/catalogo".into(),
                "https://www.facebook.com/zapaterialuna".into(),
                "https://paypal.me/zapaterialuna".into(),
            ],
            keywords: vec!["zapatos, bolsas".into()],
            offers: vec!["zapatos".into(), "bolsas".into()],
        }),
    }
}

#[tokio::test]
async fn save_and_read_back_lead() {
    let (pool, _container) = setup_test_db().await;
    let repo = LeadRepository::new(pool);

    let record = web_lead("https://www.zapaterialuna.mx/", 2);
    let id = repo.save(&record).await.unwrap();
    assert!(!id.is_nil());

    let recent = repo.recent(10).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, id);
    assert_eq!(recent[0].record, record);
}

#[tokio::test]
async fn page_facts_round_trip() {
    let (pool, _container) = setup_test_db().await;
    let repo = LeadRepository::new(pool.clone());

    repo.save(&web_lead("https://www.zapaterialuna.mx/", 2))
        .await
        .unwrap();

    let stored = repo
        .history("https://www.zapaterialuna.mx/", 1)
        .await
        .unwrap();
    let page = stored[0].record.page.as_ref().unwrap();
    assert_eq!(page.platform, PlatformTag::Shopify);
    assert!(page.secure);
    assert!(page.cart_markers.contains("site-cart cart-icon"));
    assert!(page.payment_links.contains("https://paypal.me/zapaterialuna"));
    assert_eq!(page.links.len(), 3);
    assert_eq!(page.offers, vec!["zapatos", "bolsas"]);

    let platform: Option<String> =
        sqlx::query_scalar("SELECT page_facts->>'platform' FROM leads")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(platform.as_deref(), Some("shopify"));
}

#[tokio::test]
async fn profile_lead_keeps_nulls_and_engagement() {
    let (pool, _container) = setup_test_db().await;
    let repo = LeadRepository::new(pool);

    let record = LeadRecord {
        source: LeadSource::SocialProfile,
        name: None,
        score: 6,
        website: Some("https://www.facebook.com/tacosdonpepe".into()),
        about: None,
        category: None,
        engagement: Some(2400),
        phone: None,
        email: None,
        address: Some("Av. Juárez 10, 06000".into()),
        city: Some("Ciudad de México".into()),
        country: None,
        crawl_date: Utc.with_ymd_and_hms(2026, 3, 8, 9, 30, 0).unwrap(),
        page: None,
    };
    repo.save(&record).await.unwrap();

    let history = repo
        .history("https://www.facebook.com/tacosdonpepe", 5)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].record, record);
}

#[tokio::test]
async fn history_is_per_website_newest_first() {
    let (pool, _container) = setup_test_db().await;
    let repo = LeadRepository::new(pool);

    repo.save(&web_lead("https://a.mx/", 6)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    repo.save(&web_lead("https://b.mx/", 4)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    repo.save(&web_lead("https://a.mx/", 2)).await.unwrap();

    let history = repo.history("https://a.mx/", 10).await.unwrap();
    let scores: Vec<i64> = history.iter().map(|l| l.record.score).collect();
    assert_eq!(scores, vec![2, 6]);

    let limited = repo.history("https://a.mx/", 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].record.score, 2);

    assert!(repo.history("https://c.mx/", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn recent_respects_limit() {
    let (pool, _container) = setup_test_db().await;
    let repo = LeadRepository::new(pool);

    for i in 0..5 {
        repo.save(&web_lead(&format!("https://{i}.mx/"), 1)).await.unwrap();
    }

    assert_eq!(repo.recent(3).await.unwrap().len(), 3);
}

#[tokio::test]
async fn works_through_lead_store_trait() {
    let (pool, _container) = setup_test_db().await;

    async fn save_via_trait<S: LeadStore>(store: &S, record: &LeadRecord) -> uuid::Uuid {
        store.save(record).await.unwrap()
    }

    let repo = LeadRepository::new(pool);
    let id = save_via_trait(&repo, &web_lead("https://t.mx/", 3)).await;
    assert!(!id.is_nil());
    repo.health_check().await.unwrap();
}

use chrono::{DateTime, Utc};
use sally_core::error::AppError;
use sally_core::record::{LeadRecord, LeadSource, PageFacts, StoredLead};
use sqlx::types::Json;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

const LEAD_COLUMNS: &str = "id, source, name, score, website, about, category, engagement, \
     phone, email, address, city, country, crawl_date, page_facts, created_at";

/// Repository for lead persistence in PostgreSQL.
#[derive(Clone)]
pub struct LeadRepository {
    pool: Pool<Postgres>,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Save a lead record. Returns the generated UUID.
    pub async fn save(&self, record: &LeadRecord) -> Result<Uuid, AppError> {
        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO leads (source, name, score, website, about, category, engagement,
                               phone, email, address, city, country, crawl_date, page_facts)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(record.source.as_str())
        .bind(&record.name)
        .bind(record.score)
        .bind(&record.website)
        .bind(&record.about)
        .bind(&record.category)
        .bind(record.engagement.map(|e| i64::try_from(e).unwrap_or(i64::MAX)))
        .bind(&record.phone)
        .bind(&record.email)
        .bind(&record.address)
        .bind(&record.city)
        .bind(&record.country)
        .bind(record.crawl_date)
        .bind(record.page.as_ref().map(Json))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.0)
    }

    /// Most recently saved leads, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<StoredLead>, AppError> {
        let rows = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Lead history for a website, newest first.
    pub async fn history(&self, website: &str, limit: usize) -> Result<Vec<StoredLead>, AppError> {
        let rows = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE website = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(website)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct LeadRow {
    id: Uuid,
    source: String,
    name: Option<String>,
    score: i64,
    website: Option<String>,
    about: Option<String>,
    category: Option<String>,
    engagement: Option<i64>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    city: Option<String>,
    country: Option<String>,
    crawl_date: DateTime<Utc>,
    page_facts: Option<Json<PageFacts>>,
    created_at: DateTime<Utc>,
}

impl From<LeadRow> for StoredLead {
    fn from(row: LeadRow) -> Self {
        StoredLead {
            id: row.id,
            record: LeadRecord {
                source: row.source.parse().unwrap_or(LeadSource::Web),
                name: row.name,
                score: row.score,
                website: row.website,
                about: row.about,
                category: row.category,
                engagement: row.engagement.and_then(|e| u64::try_from(e).ok()),
                phone: row.phone,
                email: row.email,
                address: row.address,
                city: row.city,
                country: row.country,
                crawl_date: row.crawl_date,
                page: row.page_facts.map(|Json(page)| page),
            },
            created_at: row.created_at,
        }
    }
}

// -- Trait implementation --

impl sally_core::traits::LeadStore for LeadRepository {
    async fn save(&self, record: &LeadRecord) -> Result<Uuid, AppError> {
        LeadRepository::save(self, record).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredLead>, AppError> {
        LeadRepository::recent(self, limit).await
    }

    async fn history(&self, website: &str, limit: usize) -> Result<Vec<StoredLead>, AppError> {
        LeadRepository::history(self, website, limit).await
    }
}

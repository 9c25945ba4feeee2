//! Database operations for `scraped_products` and `scraped_reviews`.

use chrono::{DateTime, Utc};
use kurate_core::{ReviewScrapeResult, ScrapeResult};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `scraped_products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapedProductRow {
    pub id: Uuid,
    /// Adapter name, e.g. `"aliexpress"`.
    pub source: String,
    pub external_id: Option<String>,
    pub source_url: String,
    pub name: String,
    pub description: Option<String>,
    pub price_text: Option<String>,
    /// JSON array of image URLs.
    pub images: Value,
    pub category: Option<String>,
    pub metadata: Option<Value>,
    pub scraped_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `scraped_reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapedReviewRow {
    pub id: i64,
    pub scraped_product_id: Uuid,
    pub text: String,
    /// `1..=5` (CHECK constraint).
    pub rating: i16,
    pub author_name: Option<String>,
    pub author_country: Option<String>,
    pub review_date: Option<String>,
    pub images: Value,
    pub original_language: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ScrapedReviewRow> for ReviewScrapeResult {
    type Error = DbError;

    fn try_from(row: ScrapedReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating)
            .map_err(|_| DbError::InvalidValue(format!("rating {}", row.rating)))?;
        let images: Vec<String> = serde_json::from_value(row.images)?;
        Ok(ReviewScrapeResult {
            text: row.text,
            rating,
            author_name: row.author_name,
            author_country: row.author_country,
            review_date: row.review_date,
            images,
            original_language: row.original_language,
        })
    }
}

/// Upserts a scraped product.
///
/// Conflicts on `(source, external_id)` refresh every scraped column and
/// `updated_at` in place, keeping the original `id`. Results without an
/// external id always insert a new row.
///
/// Returns the `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn insert_scraped_product(
    pool: &PgPool,
    source: &str,
    source_url: &str,
    result: &ScrapeResult,
) -> Result<Uuid, DbError> {
    let images = serde_json::to_value(&result.images)?;

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO scraped_products \
             (id, source, external_id, source_url, name, description, price_text, \
              images, category, metadata) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (source, external_id) DO UPDATE SET \
             source_url  = EXCLUDED.source_url, \
             name        = EXCLUDED.name, \
             description = EXCLUDED.description, \
             price_text  = EXCLUDED.price_text, \
             images      = EXCLUDED.images, \
             category    = EXCLUDED.category, \
             metadata    = EXCLUDED.metadata, \
             updated_at  = NOW() \
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(source)
    .bind(&result.external_id)
    .bind(source_url)
    .bind(&result.name)
    .bind(&result.description)
    .bind(&result.price_text)
    .bind(images)
    .bind(&result.category)
    .bind(&result.metadata)
    .fetch_one(pool)
    .await?;

    tracing::debug!(%id, source, external_id = ?result.external_id, "scraped product stored");
    Ok(id)
}

/// Finds the scraped product a URL was stored under, matching the URL as
/// given or the canonical/source URL recorded in its metadata.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_scraped_product_by_url(
    pool: &PgPool,
    url: &str,
) -> Result<Option<ScrapedProductRow>, DbError> {
    let row = sqlx::query_as::<_, ScrapedProductRow>(
        "SELECT id, source, external_id, source_url, name, description, price_text, \
                images, category, metadata, scraped_at, updated_at \
         FROM scraped_products \
         WHERE source_url = $1 \
            OR metadata->>'canonicalUrl' = $1 \
            OR metadata->>'sourceUrl' = $1 \
         ORDER BY updated_at DESC \
         LIMIT 1",
    )
    .bind(url)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Inserts `reviews` for one scraped product in a single transaction.
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails (including an unknown
/// `scraped_product_id`); nothing is written in that case.
pub async fn insert_scraped_reviews(
    pool: &PgPool,
    scraped_product_id: Uuid,
    reviews: &[ReviewScrapeResult],
) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    for review in reviews {
        sqlx::query(
            "INSERT INTO scraped_reviews \
                 (scraped_product_id, text, rating, author_name, author_country, \
                  review_date, images, original_language) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(scraped_product_id)
        .bind(&review.text)
        .bind(i16::from(review.rating))
        .bind(&review.author_name)
        .bind(&review.author_country)
        .bind(&review.review_date)
        .bind(serde_json::to_value(&review.images)?)
        .bind(&review.original_language)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(reviews.len())
}

/// Lists reviews for a scraped product in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scraped_reviews(
    pool: &PgPool,
    scraped_product_id: Uuid,
) -> Result<Vec<ScrapedReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, ScrapedReviewRow>(
        "SELECT id, scraped_product_id, text, rating, author_name, author_country, \
                review_date, images, original_language, created_at \
         FROM scraped_reviews \
         WHERE scraped_product_id = $1 \
         ORDER BY id ASC",
    )
    .bind(scraped_product_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn review_row(rating: i16, images: Value) -> ScrapedReviewRow {
        ScrapedReviewRow {
            id: 1,
            scraped_product_id: Uuid::new_v4(),
            text: "Arrived quickly".to_string(),
            rating,
            author_name: Some("Verified Buyer".to_string()),
            author_country: Some("US".to_string()),
            review_date: Some("12 Mar 2026".to_string()),
            images,
            original_language: Some("en".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn review_row_converts_back() {
        let review =
            ReviewScrapeResult::try_from(review_row(4, json!(["https://x/a.jpg"]))).unwrap();
        assert_eq!(review.rating, 4);
        assert_eq!(review.images, vec!["https://x/a.jpg".to_string()]);
        assert_eq!(review.author_name.as_deref(), Some("Verified Buyer"));
    }

    #[test]
    fn negative_rating_is_invalid() {
        let err = ReviewScrapeResult::try_from(review_row(-1, json!([]))).unwrap_err();
        assert!(matches!(err, DbError::InvalidValue(_)));
    }

    #[test]
    fn non_array_images_fail_to_decode() {
        let err = ReviewScrapeResult::try_from(review_row(5, json!({"a": 1}))).unwrap_err();
        assert!(matches!(err, DbError::Encode(_)));
    }
}

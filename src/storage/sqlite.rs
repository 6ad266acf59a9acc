//! SQLite implementation of [`RangeStore`].

use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::error_handling::DatabaseError;
use crate::models::{
    AsnRecord, CityRecord, CountryRecord, DatasetKind, Generation, IpFamily, IpRangeRecord,
    PublishedGeneration,
};

use super::store::RangeStore;

/// Range tables stored in one SQLite database.
#[derive(Clone)]
pub struct SqliteRangeStore {
    pool: SqlitePool,
}

impl SqliteRangeStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn insert_country(
    tx: &mut Transaction<'_, Sqlite>,
    record: &CountryRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO ip_country (ip_start, ip_end, country_code, ip_version, generation)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&record.range.start)
    .bind(&record.range.end)
    .bind(&record.country_code)
    .bind(record.range.family.as_i64())
    .bind(record.range.generation.as_i64())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_asn(tx: &mut Transaction<'_, Sqlite>, record: &AsnRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO ip_asn (ip_start, ip_end, asn_number, asn_organization, ip_version, generation)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.range.start)
    .bind(&record.range.end)
    .bind(record.asn_number)
    .bind(&record.asn_organization)
    .bind(record.range.family.as_i64())
    .bind(record.range.generation.as_i64())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_city(
    tx: &mut Transaction<'_, Sqlite>,
    record: &CityRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO ip_city (
            ip_start, ip_end, country_code, country_name, region_name, city_name,
            postal_code, latitude, longitude, timezone, ip_version, generation
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.range.start)
    .bind(&record.range.end)
    .bind(&record.country_code)
    .bind(&record.country_name)
    .bind(&record.region_name)
    .bind(&record.city_name)
    .bind(&record.postal_code)
    .bind(record.latitude)
    .bind(record.longitude)
    .bind(&record.timezone)
    .bind(record.range.family.as_i64())
    .bind(record.range.generation.as_i64())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn delete_below(
    conn: &mut SqliteConnection,
    kind: DatasetKind,
    family: IpFamily,
    generation: Generation,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE ip_version = ? AND generation < ?",
        kind.table()
    ))
    .bind(family.as_i64())
    .bind(generation.as_i64())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

async fn upsert_published(
    conn: &mut SqliteConnection,
    kind: DatasetKind,
    family: IpFamily,
    generation: Generation,
    row_count: u64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO dataset_generations (dataset, ip_version, generation, row_count, published_at_ms)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(dataset, ip_version) DO UPDATE SET
             generation=excluded.generation,
             row_count=excluded.row_count,
             published_at_ms=excluded.published_at_ms",
    )
    .bind(kind.to_string())
    .bind(family.as_i64())
    .bind(generation.as_i64())
    .bind(i64::try_from(row_count).unwrap_or(i64::MAX))
    .bind(chrono::Utc::now().timestamp_millis())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

impl RangeStore for SqliteRangeStore {
    async fn max_generation(
        &self,
        kind: DatasetKind,
        family: IpFamily,
    ) -> Result<Option<Generation>, DatabaseError> {
        let max: Option<i64> = sqlx::query_scalar(&format!(
            "SELECT MAX(generation) FROM {} WHERE ip_version = ?",
            kind.table()
        ))
        .bind(family.as_i64())
        .fetch_one(&self.pool)
        .await?;
        Ok(max.map(Generation::from_i64))
    }

    async fn save_batch(
        &self,
        kind: DatasetKind,
        records: &[IpRangeRecord],
    ) -> Result<(), DatabaseError> {
        if let Some(other) = records.iter().find(|r| r.kind() != kind) {
            return Err(DatabaseError::KindMismatch {
                expected: kind,
                found: other.kind(),
            });
        }

        // Dropping the transaction on an early return rolls the batch back
        let mut tx = self.pool.begin().await?;
        for record in records {
            match record {
                IpRangeRecord::Country(r) => insert_country(&mut tx, r).await?,
                IpRangeRecord::Asn(r) => insert_asn(&mut tx, r).await?,
                IpRangeRecord::City(r) => insert_city(&mut tx, r).await?,
            }
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_generations_below(
        &self,
        kind: DatasetKind,
        family: IpFamily,
        generation: Generation,
    ) -> Result<u64, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        Ok(delete_below(&mut *conn, kind, family, generation).await?)
    }

    async fn publish_generation(
        &self,
        kind: DatasetKind,
        family: IpFamily,
        generation: Generation,
        row_count: u64,
    ) -> Result<(), DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        upsert_published(&mut *conn, kind, family, generation, row_count).await?;
        Ok(())
    }

    async fn retire_and_publish(
        &self,
        kind: DatasetKind,
        family: IpFamily,
        generation: Generation,
        row_count: u64,
    ) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let deleted = delete_below(&mut *tx, kind, family, generation).await?;
        upsert_published(&mut *tx, kind, family, generation, row_count).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn published_generation(
        &self,
        kind: DatasetKind,
        family: IpFamily,
    ) -> Result<Option<PublishedGeneration>, DatabaseError> {
        let row = sqlx::query(
            "SELECT generation, row_count, published_at_ms
             FROM dataset_generations
             WHERE dataset = ? AND ip_version = ?",
        )
        .bind(kind.to_string())
        .bind(family.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| PublishedGeneration {
            kind,
            family,
            generation: Generation::from_i64(row.get("generation")),
            row_count: u64::try_from(row.get::<i64, _>("row_count")).unwrap_or(0),
            published_at_ms: row.get("published_at_ms"),
        }))
    }

    async fn count_rows(
        &self,
        kind: DatasetKind,
        family: IpFamily,
        generation: Option<Generation>,
    ) -> Result<u64, DatabaseError> {
        let count: i64 = match generation {
            Some(generation) => {
                sqlx::query_scalar(&format!(
                    "SELECT COUNT(*) FROM {} WHERE ip_version = ? AND generation = ?",
                    kind.table()
                ))
                .bind(family.as_i64())
                .bind(generation.as_i64())
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar(&format!(
                    "SELECT COUNT(*) FROM {} WHERE ip_version = ?",
                    kind.table()
                ))
                .bind(family.as_i64())
                .fetch_one(&self.pool)
                .await?
            }
        };
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

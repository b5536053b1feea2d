use std::collections::BTreeMap;
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDateTime};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::warn;

use crate::error::{FishtrackError, Result};
use crate::merger::{merge_sorted_intervals, MergeResult};
use crate::model::{zero_padded_unix, Interval};

pub type DbPool = PgPool;

/// Establish a new Postgres connection pool for the intervals store.
pub async fn connect(database_url: &str) -> Result<DbPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(StdDuration::from_secs(10))
        .connect(database_url)
        .await
        .map_err(FishtrackError::Sqlx)
}

/// Run the embedded `intervals` schema migration.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(FishtrackError::Migrate)
}

fn decode_key(transmitter_id: &str, key: &str) -> Result<NaiveDateTime> {
    let secs: i64 = key.parse().map_err(|_| FishtrackError::PersistenceFailed {
        transmitter: transmitter_id.to_string(),
        message: format!("malformed range key '{key}'"),
    })?;
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| FishtrackError::PersistenceFailed {
            transmitter: transmitter_id.to_string(),
            message: format!("range key '{key}' out of range"),
        })
}

/// All intervals persisted for one transmitter, ordered by `start`.
pub async fn by_transmitter(pool: &PgPool, transmitter_id: &str) -> Result<Vec<Interval>> {
    let rows: Vec<(String, String, String, String)> = sqlx::query_as(
        "SELECT transmitter, start_key, stop_key, station_name \
         FROM intervals WHERE transmitter = $1 ORDER BY start_key ASC",
    )
    .bind(transmitter_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(transmitter, start_key, stop_key, station_name)| {
            Ok(Interval::new(
                transmitter,
                station_name,
                decode_key(transmitter_id, &start_key)?,
                decode_key(transmitter_id, &stop_key)?,
            ))
        })
        .collect()
}

/// The unique set of transmitters with at least one persisted interval.
pub async fn transmitter_ids(pool: &PgPool) -> Result<Vec<String>> {
    let ids: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT transmitter FROM intervals")
        .fetch_all(pool)
        .await?;
    Ok(ids.into_iter().map(|(id,)| id).collect())
}

async fn apply_merge(pool: &PgPool, transmitter_id: &str, result: MergeResult) -> Result<()> {
    let mut tx = pool.begin().await?;

    let wrap = |e: sqlx::Error| FishtrackError::PersistenceFailed {
        transmitter: transmitter_id.to_string(),
        message: e.to_string(),
    };

    // deletes before inserts: a merged interval may reuse an absorbed
    // existing row's start as its own start.
    if !result.elements_to_delete.is_empty() {
        let delete_keys: Vec<String> = result
            .elements_to_delete
            .iter()
            .map(|ts| zero_padded_unix(*ts))
            .collect();
        sqlx::query("DELETE FROM intervals WHERE transmitter = $1 AND start_key = ANY($2)")
            .bind(transmitter_id)
            .bind(&delete_keys)
            .execute(&mut *tx)
            .await
            .map_err(wrap)?;
    }

    if !result.new_elements.is_empty() {
        let transmitters: Vec<&str> = result.new_elements.iter().map(|_| transmitter_id).collect();
        let starts: Vec<String> = result.new_elements.iter().map(|iv| zero_padded_unix(iv.start)).collect();
        let stops: Vec<String> = result.new_elements.iter().map(|iv| zero_padded_unix(iv.stop)).collect();
        let stations: Vec<&str> = result
            .new_elements
            .iter()
            .map(|iv| iv.station_name.as_str())
            .collect();

        sqlx::query(
            "INSERT INTO intervals (transmitter, start_key, stop_key, station_name) \
             SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[])",
        )
        .bind(&transmitters)
        .bind(&starts)
        .bind(&stops)
        .bind(&stations)
        .execute(&mut *tx)
        .await
        .map_err(wrap)?;
    }

    tx.commit().await.map_err(wrap)
}

/// Groups a freshly aggregated batch by transmitter, merges each group
/// against its persisted rows, and applies the resulting write plan.
/// A single transmitter's failure is scoped to that transmitter; the rest
/// of the batch is still attempted.
pub async fn save_intervals(
    pool: &PgPool,
    fresh: &[Interval],
    gap_minutes: i64,
) -> Vec<(String, Result<()>)> {
    let bridge = Duration::minutes(gap_minutes);

    let mut grouped: BTreeMap<String, Vec<Interval>> = BTreeMap::new();
    for interval in fresh {
        grouped
            .entry(interval.transmitter_id.clone())
            .or_default()
            .push(interval.clone());
    }

    let mut outcomes = Vec::with_capacity(grouped.len());
    for (transmitter_id, mut group) in grouped {
        group.sort_by_key(|iv| iv.start);
        let outcome = save_one_transmitter(pool, &transmitter_id, &group, bridge).await;
        if let Err(err) = &outcome {
            warn!(transmitter = %transmitter_id, error = %err, "store: transmitter batch failed");
        }
        outcomes.push((transmitter_id, outcome));
    }
    outcomes
}

async fn save_one_transmitter(
    pool: &PgPool,
    transmitter_id: &str,
    fresh: &[Interval],
    bridge: Duration,
) -> Result<()> {
    let existing = by_transmitter(pool, transmitter_id).await?;
    let result = merge_sorted_intervals(fresh, &existing, bridge);
    apply_merge(pool, transmitter_id, result).await
}

use std::env;

use chrono::DateTime;
use fishtrack_core::model::Interval;
use fishtrack_core::store;

fn ts(secs: i64) -> chrono::NaiveDateTime {
    DateTime::from_timestamp(secs, 0).unwrap().naive_utc()
}

/// S6 — round trip through store: two saves 30 minutes apart (gap=30, bridge
/// 1800s) should settle into a single merged interval.
#[tokio::test]
async fn s6_round_trip_through_store() -> anyhow::Result<()> {
    let database_url = match env::var("FISHTRACK_TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping s6_round_trip_through_store because FISHTRACK_TEST_DATABASE_URL is not set");
            return Ok(());
        }
    };

    let pool = store::connect(&database_url).await?;
    store::run_migrations(&pool).await?;
    sqlx::query("DELETE FROM intervals WHERE transmitter = 'transm1'")
        .execute(&pool)
        .await?;

    let first = vec![Interval::new(
        "transm1",
        "station1",
        ts(1435129182),
        ts(1435129642),
    )];
    let outcomes = store::save_intervals(&pool, &first, 30).await;
    assert!(outcomes.iter().all(|(_, r)| r.is_ok()));

    let second = vec![Interval::new(
        "transm1",
        "station1",
        ts(1435129842),
        ts(1435129900),
    )];
    let outcomes = store::save_intervals(&pool, &second, 30).await;
    assert!(outcomes.iter().all(|(_, r)| r.is_ok()));

    let survivors = store::by_transmitter(&pool, "transm1").await?;
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].start, ts(1435129182));
    assert_eq!(survivors[0].stop, ts(1435129900));
    assert_eq!(survivors[0].station_name, "station1");

    Ok(())
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;

use crate::model::availability::AvailabilityWindow;

/// Active windows per interviewer id. Empty vec means "none configured".
pub static AVAILABILITY_CACHE: Lazy<Cache<u64, Arc<Vec<AvailabilityWindow>>>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(50_000)
        .time_to_live(Duration::from_secs(600)) // 10 min TTL
        .build()
});

const ACTIVE_WINDOWS_SQL: &str = r#"
    SELECT id, interviewer_id, day_of_week, start_time, end_time, is_active
    FROM interviewer_availability
    WHERE interviewer_id = ? AND is_active = TRUE
    ORDER BY day_of_week, start_time
"#;

/// Cached active windows, loading from the database on a miss.
///
/// Concurrent misses for one interviewer share a single query. A load that
/// races an `invalidate` can still store the old rows; the TTL bounds that.
pub async fn windows_for(
    pool: &MySqlPool,
    interviewer_id: u64,
) -> Result<Arc<Vec<AvailabilityWindow>>, Arc<sqlx::Error>> {
    AVAILABILITY_CACHE
        .try_get_with(interviewer_id, async {
            let windows = sqlx::query_as::<_, AvailabilityWindow>(ACTIVE_WINDOWS_SQL)
                .bind(interviewer_id)
                .fetch_all(pool)
                .await?;
            Ok::<_, sqlx::Error>(Arc::new(windows))
        })
        .await
}

/// Drop an interviewer's entry after their windows change.
pub async fn invalidate(interviewer_id: u64) {
    AVAILABILITY_CACHE.invalidate(&interviewer_id).await;
}

async fn batch_store(batch: HashMap<u64, Vec<AvailabilityWindow>>) {
    let futures: Vec<_> = batch
        .into_iter()
        .map(|(id, windows)| AVAILABILITY_CACHE.insert(id, Arc::new(windows)))
        .collect();

    futures::future::join_all(futures).await;
}

/// Stream every active window into the cache, `batch_size` interviewers at a time.
pub async fn warmup_availability_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, AvailabilityWindow>(
        r#"
        SELECT id, interviewer_id, day_of_week, start_time, end_time, is_active
        FROM interviewer_availability
        WHERE is_active = TRUE
        ORDER BY interviewer_id, day_of_week, start_time
        "#,
    )
    .fetch(pool);

    let mut batch: HashMap<u64, Vec<AvailabilityWindow>> = HashMap::new();
    let mut current: Option<u64> = None;
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let window = row?;
        total += 1;

        // rows arrive grouped by interviewer; flush only on a group boundary
        if current != Some(window.interviewer_id) && batch.len() >= batch_size {
            batch_store(std::mem::take(&mut batch)).await;
        }
        current = Some(window.interviewer_id);
        batch.entry(window.interviewer_id).or_default().push(window);
    }

    if !batch.is_empty() {
        batch_store(batch).await;
    }

    tracing::info!(windows = total, "Availability cache warmup complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[actix_web::test]
    async fn invalidate_removes_cached_windows() {
        let id = 9_000_001;
        let window = AvailabilityWindow {
            id: 1,
            interviewer_id: id,
            day_of_week: 2,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            is_active: true,
        };
        batch_store(HashMap::from([(id, vec![window])])).await;
        assert_eq!(AVAILABILITY_CACHE.get(&id).await.map(|w| w.len()), Some(1));

        invalidate(id).await;
        assert!(AVAILABILITY_CACHE.get(&id).await.is_none());
    }

    #[actix_web::test]
    async fn cached_windows_are_served_without_a_query() {
        let id = 9_000_002;
        AVAILABILITY_CACHE.insert(id, Arc::new(Vec::new())).await;

        // lazy pool never connects, so a miss would surface as an error
        let pool = crate::api::test_support::lazy_pool();
        let windows = windows_for(&pool, id).await.unwrap();
        assert!(windows.is_empty());
        invalidate(id).await;
    }
}

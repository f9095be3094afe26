use anyhow::Result;
use async_trait::async_trait;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;

use crate::error::AppResult;
use crate::store::{EmployeeDirectory, EmployeeProfile};

/// Employee profiles keyed by id. Directory rows change rarely, so a
/// short TTL keeps manager reassignments visible without hammering the
/// employee table on every list view.
pub static PROFILE_CACHE: Lazy<Cache<u64, EmployeeProfile>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(900)) // 15 min TTL
        .build()
});

/// Directory decorator that answers from PROFILE_CACHE and falls through
/// to the wrapped source on a miss.
pub struct CachedDirectory {
    inner: Arc<dyn EmployeeDirectory>,
}

impl CachedDirectory {
    pub fn new(inner: Arc<dyn EmployeeDirectory>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl EmployeeDirectory for CachedDirectory {
    async fn profile(&self, employee_id: u64) -> AppResult<Option<EmployeeProfile>> {
        if let Some(hit) = PROFILE_CACHE.get(&employee_id).await {
            return Ok(Some(hit));
        }
        let fetched = self.inner.profile(employee_id).await?;
        if let Some(profile) = &fetched {
            PROFILE_CACHE.insert(employee_id, profile.clone()).await;
        }
        Ok(fetched)
    }
}

async fn batch_insert(profiles: &[EmployeeProfile]) {
    let futures: Vec<_> = profiles
        .iter()
        .map(|p| PROFILE_CACHE.insert(p.employee_id, p.clone()))
        .collect();

    futures::future::join_all(futures).await;
}

/// Preload the whole directory in batches at startup.
pub async fn warmup_profile_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64, String, Option<u64>, Option<u64>)>(
        r#"
        SELECT emp_id, emp_name, emp_l1, emp_l2
        FROM employee_tbl
        ORDER BY emp_id
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (employee_id, name, l1_id, l2_id) = row?;
        batch.push(EmployeeProfile { employee_id, name, l1_id, l2_id });
        total_count += 1;

        if batch.len() >= batch_size {
            batch_insert(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_insert(&batch).await;
    }

    tracing::info!("Profile cache warmup complete: {} employees", total_count);

    Ok(())
}

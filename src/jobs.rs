// src/jobs.rs

use std::time::Duration;

use sqlx::PgPool;
use tokio::time::MissedTickBehavior;

/// Spawns the periodic top-creator recompute.
///
/// Runs once at startup and then on every interval tick. The recompute is
/// awaited inline on the ticker task and missed ticks are skipped, so runs
/// never overlap even if the cadence is shortened. A failed run logs and
/// waits for the next tick.
pub fn spawn_top_creator_job(pool: PgPool, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match recompute_top_creators(&pool).await {
                Ok(changed) => {
                    tracing::info!("Top-creator recompute done, {} users changed", changed);
                }
                Err(e) => {
                    tracing::error!("Top-creator recompute failed, retrying next tick: {:?}", e);
                }
            }
        }
    });
}

/// Sets top_creator = true for exactly the uploaders of the current global
/// top-10 films, and false for everyone else. One statement, so a crashed
/// run can never leave a half-applied flag set; demotion is part of the
/// recompute, not a separate pass.
pub async fn recompute_top_creators(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        WITH top_uploaders AS (
            SELECT DISTINCT user_id FROM (
                SELECT user_id
                FROM films
                WHERE rank IS NOT NULL AND visibility = 'public'
                ORDER BY rank DESC, created_at DESC
                LIMIT 10
            ) top10
        )
        UPDATE users
        SET top_creator = (users.id IN (SELECT user_id FROM top_uploaders))
        WHERE users.top_creator <> (users.id IN (SELECT user_id FROM top_uploaders))
        "#,
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

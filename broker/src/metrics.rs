//! Process-wide Prometheus metrics, composed the same way the reference
//! service's `collect_metrics` composes a resource read with a db call —
//! here, periodic store stats instead of an on-chain wallet balance.

use crate::db;
use anyhow::Result;
use diesel::r2d2::ConnectionManager;
use diesel::r2d2::PooledConnection;
use diesel::PgConnection;
use time::OffsetDateTime;

/// Samples `IntentStore::stats` over the trailing hour and logs a
/// structured summary. `autometrics` (wired on every `db`/`claimer`
/// function) already exports request-level counters and histograms to
/// the `/metrics` endpoint; this is the periodic business-level snapshot
/// the reference service's own `collect_metrics` plays the equivalent
/// role for.
pub fn collect_metrics(mut conn: PooledConnection<ConnectionManager<PgConnection>>) -> Result<()> {
    let since = OffsetDateTime::now_utc() - time::Duration::hours(1);
    let stats = db::intent_store::stats(&mut conn, since)?;

    for entry in stats {
        tracing::info!(
            status = ?entry.status,
            count = entry.count,
            total_amount_sat = entry.total_amount_sat,
            tip_amount_sat = entry.tip_amount_sat,
            "hourly intent stats"
        );
    }

    Ok(())
}

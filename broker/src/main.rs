use anyhow::Context;
use anyhow::Result;
use broker::adapters::HmacSha256WebhookVerifier;
use broker::adapters::InvoiceIssuer;
use broker::adapters::LnurlResolver;
use broker::adapters::NwcClient;
use broker::adapters::PaymentProviderAdapter;
use broker::adapters::PayoutReceipt;
use broker::adapters::UsernameResolver;
use broker::cli::Opts;
use broker::clock::SystemClock;
use broker::config::Settings;
use broker::janitor::Janitor;
use broker::logger;
use broker::routes::router;
use broker::routes::AppState;
use broker::run_migration;
use diesel::r2d2;
use diesel::r2d2::ConnectionManager;
use diesel::PgConnection;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::metadata::LevelFilter;

/// Real HTTP/Nostr wiring against the Lightning provider, LNURL servers
/// and NWC relays is out of scope (`spec.md` §1 excludes the external
/// systems themselves) — the binary needs something behind each
/// `adapters` trait to boot, so these stubs fail loudly instead of
/// silently no-op'ing. Swapping in a real client means implementing the
/// same trait and constructing it here.
struct UnwiredAdapter(&'static str);

#[async_trait::async_trait]
impl PaymentProviderAdapter for UnwiredAdapter {
    async fn pay_invoice(&self, _bolt11: &str, _max_fee_sat: i64) -> Result<PayoutReceipt> {
        anyhow::bail!("{} is not wired up in this deployment", self.0)
    }
}

#[async_trait::async_trait]
impl InvoiceIssuer for UnwiredAdapter {
    async fn issue_invoice(&self, _wallet_id: &str, _amount_sat: i64, _memo: &str) -> Result<String> {
        anyhow::bail!("{} is not wired up in this deployment", self.0)
    }

    async fn issue_invoice_for_username(&self, _username: &str, _amount_sat: i64, _memo: &str) -> Result<String> {
        anyhow::bail!("{} is not wired up in this deployment", self.0)
    }
}

#[async_trait::async_trait]
impl UsernameResolver for UnwiredAdapter {
    async fn resolve_wallet_id(&self, _username: &str) -> Result<String> {
        anyhow::bail!("{} is not wired up in this deployment", self.0)
    }
}

#[async_trait::async_trait]
impl LnurlResolver for UnwiredAdapter {
    async fn resolve(&self, _handle: &str, _amount_sat: i64, _memo: &str) -> Result<String> {
        anyhow::bail!("{} is not wired up in this deployment", self.0)
    }
}

#[async_trait::async_trait]
impl NwcClient for UnwiredAdapter {
    async fn request_invoice(&self, _connection_uri: &str, _amount_sat: i64, _memo: &str) -> Result<String> {
        anyhow::bail!("{} is not wired up in this deployment", self.0)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::read();
    let data_dir = opts.data_dir()?;
    broker::cli::ensure_data_dir(&data_dir)?;

    logger::init_tracing(
        if opts.json {
            LevelFilter::INFO
        } else {
            LevelFilter::DEBUG
        },
        opts.json,
    )?;

    let settings = Arc::new(Settings::new(&data_dir).await);

    let manager = ConnectionManager::<PgConnection>::new(opts.database.clone());
    let pool = r2d2::Pool::builder()
        .build(manager)
        .context("failed to create database connection pool")?;

    let mut conn = pool.get().context("failed to get a connection for migrations")?;
    run_migration(&mut conn);
    drop(conn);

    let cache = Arc::new(broker::hot_cache::HotCache::new());

    let state = Arc::new(AppState {
        pool: pool.clone(),
        cache: cache.clone(),
        settings: settings.clone(),
        clock: Arc::new(SystemClock),
        webhook_verifier: Arc::new(HmacSha256WebhookVerifier),
        payment_provider: Arc::new(UnwiredAdapter("the Lightning provider's outbound-payment RPC")),
        invoice_issuer: Arc::new(UnwiredAdapter("the Lightning provider's invoice-issuance RPC")),
        lnurl_resolver: Arc::new(UnwiredAdapter("the LNURL/Lightning-Address resolver")),
        nwc_client: Arc::new(UnwiredAdapter("the NWC client")),
        username_resolver: Arc::new(UnwiredAdapter("the Lightning provider's username lookup RPC")),
    });

    let shutdown = CancellationToken::new();
    let janitor = Janitor {
        pool: pool.clone(),
        cache,
        interval: settings.janitor_interval(),
        clock: Arc::new(SystemClock),
    };
    let janitor_handle = janitor.spawn(shutdown.clone());

    let metrics_pool = pool.clone();
    let metrics_shutdown = shutdown.clone();
    let metrics_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            tokio::select! {
                _ = metrics_shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    match metrics_pool.get() {
                        Ok(conn) => {
                            if let Err(e) = broker::metrics::collect_metrics(conn) {
                                tracing::error!(error = %e, "failed to collect hourly intent stats");
                            }
                        }
                        Err(e) => tracing::error!(error = %e, "failed to get db connection for metrics"),
                    }
                }
            }
        }
    });

    let app = router(state);

    let addr = SocketAddr::from((opts.http_address.ip(), opts.http_address.port()));
    tracing::debug!("listening on http://{addr}");

    let server = axum::Server::bind(&addr).serve(app.into_make_service());

    tokio::select! {
        result = server => {
            result.context("server error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    shutdown.cancel();
    let _ = janitor_handle.await;
    let _ = metrics_handle.await;

    Ok(())
}

//! Command handlers and collaborator wiring.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Local, Timelike};
use dealhour_core::{load_categories, load_niches, AppConfig, DocumentStore, Niche};
use dealhour_ebay::{EbayClient, EbayClientConfig};
use dealhour_enrich::{Batcher, GeminiClient};
use dealhour_pipeline::{
    random_strategy, AffiliateLinker, DailyGenerator, QueueSender, SenderConfig, TelegramChannel,
};
use sqlx::SqlitePool;

use crate::scheduler;

fn load_catalog(config: &AppConfig) -> anyhow::Result<Vec<Niche>> {
    let file = load_niches(&config.niches_path)
        .with_context(|| format!("loading niches from {}", config.niches_path.display()))?;
    Ok(file.niches)
}

fn ebay_client(config: &AppConfig, store: Arc<dyn DocumentStore>) -> anyhow::Result<EbayClient> {
    Ok(EbayClient::new(
        EbayClientConfig::from_app_config(config),
        store,
    )?)
}

fn batcher(config: &AppConfig) -> anyhow::Result<Batcher> {
    let backend = match config.gemini_api_key.as_deref() {
        Some(key) => Some(GeminiClient::with_base_url(
            key,
            &config.gemini_model,
            config.request_timeout_secs,
            &config.gemini_api_base_url,
        )?),
        None => {
            tracing::warn!("GEMINI_API_KEY not set; marketing copy will use the template");
            None
        }
    };
    Ok(Batcher::new(backend, config.channel_promo_url.clone()))
}

async fn ledger_pool(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let pool = dealhour_db::connect_pool(&config.database_url, dealhour_db::PoolConfig::default())
        .await
        .context("connecting to the sent-deal ledger")?;
    let applied = dealhour_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "ledger migrations applied");
    }
    Ok(pool)
}

pub(crate) fn build_generator(
    config: &AppConfig,
    store: Arc<dyn DocumentStore>,
) -> anyhow::Result<DailyGenerator> {
    let niches = load_catalog(config)?;
    let source = Arc::new(ebay_client(config, Arc::clone(&store))?);
    let enricher = Arc::new(batcher(config)?);
    let linker = AffiliateLinker::new(config.epn_campaign_id.as_deref(), Arc::clone(&store));
    Ok(DailyGenerator::new(source, enricher, linker, store, niches))
}

pub(crate) async fn build_sender(
    config: &AppConfig,
    store: Arc<dyn DocumentStore>,
) -> anyhow::Result<QueueSender> {
    let channel = Arc::new(TelegramChannel::from_app_config(config)?);
    let ledger = Arc::new(ledger_pool(config).await?);
    Ok(QueueSender::new(
        channel,
        ledger,
        store,
        SenderConfig::new(config.channel_promo_url.clone()),
    ))
}

pub(crate) async fn run_generate(
    config: &AppConfig,
    store: Arc<dyn DocumentStore>,
) -> anyhow::Result<()> {
    let generator = build_generator(config, store)?;
    let count = generator.try_run().await.context("generating the deal queue")?;
    if count == 0 {
        anyhow::bail!("generation produced no deals; see the log for upstream errors");
    }
    println!("deal queue generated with {count} deal(s)");
    Ok(())
}

pub(crate) async fn run_send(
    config: &AppConfig,
    store: Arc<dyn DocumentStore>,
    hour: Option<u32>,
) -> anyhow::Result<()> {
    let sender = build_sender(config, store).await?;
    let hour = hour.unwrap_or_else(|| Local::now().hour());
    let posted = sender
        .try_drain_at(hour)
        .await
        .context("draining the deal queue")?;
    println!("posted {posted} deal(s)");
    Ok(())
}

pub(crate) async fn run_categories(
    config: &AppConfig,
    store: Arc<dyn DocumentStore>,
    refresh: bool,
) -> anyhow::Result<()> {
    let categories = if refresh {
        ebay_client(config, Arc::clone(&store))?
            .fetch_categories()
            .await
            .context("refreshing the category snapshot")?
    } else {
        load_categories(store.as_ref())?
    };

    if categories.is_empty() {
        println!("category snapshot is empty; run with --refresh");
        return Ok(());
    }
    for category in &categories {
        println!("{}\t{}", category.id, category.path);
    }
    println!("{} categories", categories.len());
    Ok(())
}

pub(crate) fn run_strategy(config: &AppConfig, store: &dyn DocumentStore) -> anyhow::Result<()> {
    let niches = load_catalog(config)?;
    let categories = load_categories(store)?;
    let strategy = random_strategy(&niches, &categories, &mut rand::rng());
    println!("{}", serde_json::to_string_pretty(&strategy)?);
    Ok(())
}

pub(crate) async fn run_serve(
    config: Arc<AppConfig>,
    store: Arc<dyn DocumentStore>,
) -> anyhow::Result<()> {
    let jobs = Arc::new(scheduler::Jobs {
        generator: build_generator(&config, Arc::clone(&store))?,
        sender: build_sender(&config, Arc::clone(&store)).await?,
        store,
        generate_lock: tokio::sync::Mutex::new(()),
        send_lock: tokio::sync::Mutex::new(()),
    });

    let mut sched = scheduler::build_scheduler(Arc::clone(&jobs), &config).await?;
    scheduler::startup_check(&jobs).await;

    shutdown_signal().await?;
    sched.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    tracing::info!("received shutdown signal, stopping scheduler");
    Ok(())
}

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use skinwatch::api::SkinportClient;
use skinwatch::config::Config;
use skinwatch::events::{coalesce, Event};
use skinwatch::feeds::{console, ticker};
use skinwatch::matching::MatchSummary;
use skinwatch::reconcile::{Reconciler, RunOutcome};
use skinwatch::state::{format_price, CatalogCache};
use skinwatch::store::JsonFileStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::load("config.toml")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.general.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let client = SkinportClient::new(cfg.catalog.clone(), cfg.credentials.clone())?;
    info!(
        authenticated = client.is_authenticated(),
        relay = cfg.catalog.relay_url.as_deref().unwrap_or("none"),
        "catalog client ready"
    );

    let cache = CatalogCache::with_ttl(client, cfg.catalog.ttl());
    info!(ttl_secs = cache.ttl().as_secs(), "catalog cache ready");
    let store = JsonFileStore::new(&cfg.tracker.store_path);
    info!(path = %store.path().display(), "using tracked item store");
    let reconciler = Reconciler::new(cache, store);

    // Create the event channel
    let (tx, mut rx) = mpsc::channel::<Event>(16);

    // Start trigger feeds
    ticker::spawn(cfg.tracker.refresh_period(), tx.clone());
    console::spawn(tx.clone());
    console::spawn_ctrl_c(tx);

    info!(
        every_secs = cfg.tracker.refresh_period().as_secs(),
        "tracking started (type 'refresh' or 'quit')"
    );
    run_once(&reconciler, Event::Tick).await;

    // Main event loop. Anything that queued up during a run is folded into
    // one follow-up run.
    while let Some(first) = rx.recv().await {
        let mut queued = vec![first];
        while let Ok(more) = rx.try_recv() {
            queued.push(more);
        }

        match coalesce(queued) {
            Some(trigger) if trigger.is_trigger() => run_once(&reconciler, trigger).await,
            _ => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn run_once<S, T>(reconciler: &Reconciler<S, T>, trigger: Event)
where
    S: skinwatch::api::CatalogSource,
    T: skinwatch::store::TrackedStore,
{
    let outcome = match trigger {
        Event::Refresh => reconciler.refresh().await,
        _ => reconciler.run().await,
    };

    let report = match outcome {
        Ok(RunOutcome::Completed(report)) => report,
        Ok(RunOutcome::Coalesced) => return,
        Err(e) => {
            // Previous statuses stay as they were
            error!("reconciliation run failed: {}", e);
            return;
        }
    };

    for id in &report.newly_found {
        info!(%id, "new match for tracked item");
    }

    let mut ids: Vec<&String> = report.matches.keys().collect();
    ids.sort();
    for id in ids {
        let listings = &report.matches[id];
        let Some(summary) = MatchSummary::from_listings(listings) else {
            continue;
        };
        let best = &listings[0];
        info!(
            %id,
            count = summary.count,
            cheapest = %format_price(Some(summary.cheapest)),
            average = %summary.average_major(),
            best = %best.name,
            url = %best.url(),
            "current matches"
        );
    }

    info!(
        total = report.counts.total,
        tracking = report.counts.tracking,
        found = report.counts.found,
        cancelled = report.counts.cancelled,
        "status"
    );
}

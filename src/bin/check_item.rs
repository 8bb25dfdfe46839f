use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Instant;

use skinwatch::api::SkinportClient;
use skinwatch::config::Config;
use skinwatch::matching::{find_matches, search, MatchSummary};
use skinwatch::state::{format_price, CatalogCache, StatTrak, TrackedItem, WearFilter};

const USAGE: &str = "usage: check_item <weapon> <skin> [stattrak: any|required|none] [wear: any|fn|mw|ft|ww|bs] [max_price]";

/// One-shot check of a weapon/skin pair against the live catalog.
#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        return Err(anyhow!(USAGE));
    }

    let mut criteria = TrackedItem::new("check", &args[0], &args[1]);
    if let Some(st) = args.get(2) {
        criteria.stattrak = StatTrak::from_str(st).map_err(|e| anyhow!(e))?;
    }
    if let Some(wear) = args.get(3).filter(|w| !w.eq_ignore_ascii_case("any")) {
        criteria.wear = WearFilter::Preset(Some(wear.parse().map_err(|e: String| anyhow!(e))?));
    }
    if let Some(max) = args.get(4) {
        criteria.max_price = Some(Decimal::from_str(max)?);
    }

    let cfg = Config::load("config.toml")?;
    let client = SkinportClient::new(cfg.catalog.clone(), cfg.credentials.clone())?;
    println!("Fetching catalog (authenticated: {})...", client.is_authenticated());

    let cache = CatalogCache::with_ttl(client, cfg.catalog.ttl());
    let start = Instant::now();
    let catalog = cache.get().await?;
    println!("Catalog: {} listings in {}ms\n", catalog.len(), start.elapsed().as_millis());

    // Name-only hits, to see what the stricter filters removed
    let query = format!("{} | {}", criteria.weapon_name, criteria.skin_name);
    let by_name = search(&catalog, &query);
    println!("Listings named like \"{}\": {}", query, by_name.len());

    let matches = find_matches(&cache, &criteria).await?;
    println!("Matching all criteria: {}\n", matches.len());

    for listing in &matches {
        let discount = listing.discount_percent();
        println!(
            "  {:<55} {:>10} {}{}",
            listing.name,
            format_price(listing.effective_price_cents()),
            if discount > 0 { format!("-{}% ", discount) } else { String::new() },
            listing.url()
        );
    }

    if let Some(summary) = MatchSummary::from_listings(&matches) {
        println!(
            "\nCheapest: {} | Average: {} | Most expensive: {} | Total: {}",
            format_price(Some(summary.cheapest)),
            format_price(Some(summary.average)),
            format_price(Some(summary.most_expensive)),
            summary.count
        );
    }

    Ok(())
}

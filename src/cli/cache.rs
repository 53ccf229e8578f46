use super::ui;
use crate::core::{CachedRate, FRESHNESS_WINDOW_SECS, RateCache};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;

pub async fn list(cache: &RateCache) -> Result<()> {
    let mut rates = cache.list_all().await;
    rates.sort_by(|a, b| a.pair.key().cmp(&b.pair.key()));
    println!("{}", render_cached_rates(&rates, Utc::now()));
    Ok(())
}

pub async fn clear(cache: &RateCache) -> Result<()> {
    cache.clear().await;
    tracing::info!("Cleared cached rates");
    println!("Cache cleared");
    Ok(())
}

pub fn render_cached_rates(rates: &[CachedRate], now: DateTime<Utc>) -> String {
    if rates.is_empty() {
        return ui::style_text("No cached rates", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell("Rate"),
        ui::header_cell("Fetched At"),
        ui::header_cell("Status"),
    ]);

    for entry in rates {
        let age = (now - entry.fetched_at).num_seconds();
        let status = if age < FRESHNESS_WINDOW_SECS {
            Cell::new(format!("fresh ({}m old)", age / 60))
        } else {
            ui::error_cell("stale")
        };
        table.add_row(vec![
            Cell::new(entry.pair.to_string()),
            ui::rate_cell(entry.rate),
            Cell::new(entry.fetched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            status,
        ]);
    }

    table.to_string()
}

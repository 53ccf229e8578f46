use super::ui;
use crate::core::{ExchangeError, RateProvider, RateResolver};
use anyhow::{Result, bail};
use comfy_table::Cell;

/// Resolves `from` against every target and prints one row per pair.
pub async fn run<P: RateProvider>(
    resolver: &RateResolver<P>,
    from: &str,
    targets: &[String],
) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Fetching rates for {}", from.to_uppercase()));
    let results = resolver.resolve_many(from, targets).await;
    spinner.finish_and_clear();

    println!("{}", render_rates(from, &results));

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        bail!("{failed} of {} rates could not be resolved", results.len());
    }
    Ok(())
}

pub fn render_rates(from: &str, results: &[(String, Result<f64, ExchangeError>)]) -> String {
    let from = from.trim().to_uppercase();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell("Rate"),
        ui::header_cell("Inverse"),
    ]);

    for (to, result) in results {
        let pair = format!("{}/{}", from, to.trim().to_uppercase());
        match result {
            Ok(rate) => table.add_row(vec![
                Cell::new(pair),
                ui::rate_cell(*rate),
                ui::rate_cell(1.0 / rate),
            ]),
            Err(e) => table.add_row(vec![
                Cell::new(pair),
                ui::error_cell(&e.user_message()),
                Cell::new(""),
            ]),
        };
    }

    format!(
        "Exchange rates: {}\n\n{}",
        ui::style_text(&from, ui::StyleType::Title),
        table
    )
}

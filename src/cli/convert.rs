use super::ui;
use crate::core::{Conversion, ExchangeError, RateProvider, RateResolver};
use anyhow::{Result, anyhow};

/// Parses user-typed amounts such as `1,234.56`. Empty, negative, non-numeric
/// and non-finite input is rejected.
pub fn parse_amount(text: &str) -> Option<f64> {
    let clean = text.replace(',', "");
    let clean = clean.trim();
    if clean.is_empty() {
        return None;
    }
    clean
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
}

pub async fn run<P: RateProvider>(
    resolver: &RateResolver<P>,
    amount: &str,
    from: &str,
    to: &str,
) -> Result<()> {
    let amount =
        parse_amount(amount).ok_or_else(|| anyhow!(ExchangeError::InvalidAmount.user_message()))?;

    let spinner = ui::new_spinner(&format!(
        "Converting {} to {}",
        from.to_uppercase(),
        to.to_uppercase()
    ));
    let result = resolver.convert(from, to, amount).await;
    spinner.finish_and_clear();

    let conversion = result.map_err(|e| anyhow!(e.user_message()))?;
    println!("{}", render_conversion(&conversion));
    Ok(())
}

pub fn render_conversion(conversion: &Conversion) -> String {
    let Conversion {
        pair,
        amount,
        rate,
        converted,
    } = conversion;
    format!(
        "{} {} = {} {}\n{}",
        ui::format_amount(*amount),
        pair.from,
        ui::style_text(&ui::format_amount(*converted), ui::StyleType::Value),
        pair.to,
        ui::style_text(
            &format!("1 {} = {rate:.6} {}", pair.from, pair.to),
            ui::StyleType::Subtle
        )
    )
}

use super::ui;
use crate::core::{Currency, search_currencies};
use anyhow::Result;
use comfy_table::Cell;

pub fn run(query: Option<&str>) -> Result<()> {
    let matches = search_currencies(query.unwrap_or_default());
    println!("{}", render_currencies(&matches, query));
    Ok(())
}

pub fn render_currencies(currencies: &[&Currency], query: Option<&str>) -> String {
    if currencies.is_empty() {
        return ui::style_text(
            &format!("No currencies match '{}'", query.unwrap_or_default().trim()),
            ui::StyleType::Subtle,
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Name"),
        ui::header_cell("Flag"),
    ]);
    for currency in currencies {
        table.add_row(vec![
            Cell::new(currency.code),
            Cell::new(currency.name),
            Cell::new(currency.flag),
        ]);
    }
    table.to_string()
}

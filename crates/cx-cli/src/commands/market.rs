use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use cx_core::resource::ResourceKind;
use cx_economy::PriceModifiers;
use cx_economy::market::{MARKET_SELL_FEE, buy_price, regional_modifier, sell_price};

use super::amount;

pub fn run(region: &str) -> Result<(), String> {
    let region = super::parse_region(region)?;
    let mods = PriceModifiers::default();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Resource", "Buy", "Sell", "Regional"]);

    for kind in ResourceKind::ALL {
        let (Ok(buy), Ok(sell)) = (buy_price(kind, region, mods), sell_price(kind, region, mods))
        else {
            continue;
        };
        let modifier = regional_modifier(kind, region);
        let regional = format!("x{modifier:.2}");
        let regional = if modifier < 1.0 {
            regional.green()
        } else if modifier > 1.0 {
            regional.red()
        } else {
            regional.normal()
        };
        table.add_row(vec![
            kind.to_string(),
            amount(buy),
            amount(sell),
            regional.to_string(),
        ]);
    }

    println!(
        "  {} {} {}",
        "Market".bold(),
        region.info().name,
        format!("(sell fee {:.0}%)", MARKET_SELL_FEE * 100.0).dimmed()
    );
    println!("{table}");
    Ok(())
}

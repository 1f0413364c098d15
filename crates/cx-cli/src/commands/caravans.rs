use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use cx_economy::CaravanTier;
use cx_economy::caravan::loss_chance;

use super::{amount, duration};
use super::regions::zone;

pub fn run(from: Option<&str>, to: Option<&str>) -> Result<(), String> {
    match (from, to) {
        (Some(from), Some(to)) => route(from, to),
        _ => {
            tiers();
            Ok(())
        }
    }
}

fn tiers() {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Tier", "Name", "Capacity", "Trip", "Green", "Yellow", "Red", "Unlock",
    ]);
    for tier in CaravanTier::ALL {
        let spec = tier.spec();
        let unlock = match spec.unlock_cost {
            Some(cost) => format!("{} rubies", amount(cost)),
            None => "quest".to_string(),
        };
        table.add_row(vec![
            tier.to_string(),
            spec.name.to_string(),
            amount(spec.capacity),
            duration(spec.travel_ms),
            percent(spec.risk[0]),
            percent(spec.risk[1]),
            percent(spec.risk[2]),
            unlock,
        ]);
    }
    println!("  {}", "Caravan Tiers".bold());
    println!("{table}");
}

fn route(from: &str, to: &str) -> Result<(), String> {
    let from = super::parse_region(from)?;
    let to = super::parse_region(to)?;
    if from == to {
        return Err(format!("a caravan route needs two regions, got {from} twice"));
    }
    let (from_zone, to_zone) = (from.info().base_zone, to.info().base_zone);

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Tier", "Trip", "Loss", "Insured"]);
    for tier in CaravanTier::ALL {
        table.add_row(vec![
            tier.to_string(),
            duration(tier.spec().travel_ms),
            percent(loss_chance(tier, from_zone, to_zone, false)),
            percent(loss_chance(tier, from_zone, to_zone, true)),
        ]);
    }
    println!(
        "  {} {from} ({}) -> {to} ({})",
        "Route".bold(),
        zone(from_zone),
        zone(to_zone)
    );
    println!("{table}");
    Ok(())
}

fn percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

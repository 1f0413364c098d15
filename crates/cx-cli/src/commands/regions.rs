use colored::{ColoredString, Colorize};
use comfy_table::{ContentArrangement, Table};
use cx_core::region::{REGIONS, ZoneColor, calculate_distance, region_color, travel_time_ms};

use super::duration;

pub fn run(level: u32, from: &str) -> Result<(), String> {
    let origin = super::parse_region(from)?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Region",
        "Id",
        "Level",
        "Zone",
        "Distance",
        "Travel",
        "Bonuses",
    ]);

    for region in &REGIONS {
        let bonuses: Vec<String> = region
            .resource_bonuses
            .iter()
            .map(|(kind, mult)| format!("{kind} x{mult}"))
            .collect();
        let travel = if region.id == origin {
            "here".to_string()
        } else {
            duration(travel_time_ms(origin, region.id))
        };
        table.add_row(vec![
            region.name.to_string(),
            region.id.to_string(),
            region.recommended_level.to_string(),
            zone(region_color(level, region.id)).to_string(),
            calculate_distance(origin, region.id).to_string(),
            travel,
            bonuses.join(", "),
        ]);
    }

    println!(
        "  {} {}",
        "Regions".bold(),
        format!("(level {level}, from {origin})").dimmed()
    );
    println!("{table}");
    Ok(())
}

pub(super) fn zone(color: ZoneColor) -> ColoredString {
    match color {
        ZoneColor::Green => "green".green(),
        ZoneColor::Yellow => "yellow".yellow(),
        ZoneColor::Red => "red".red(),
    }
}

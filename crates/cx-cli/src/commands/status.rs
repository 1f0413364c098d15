use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use cx_core::drill::DrillSlot;
use cx_core::faction::FactionId;
use cx_core::region::region_color;
use cx_economy::BaseStatus;
use cx_simulation::GameState;

use super::{amount, bar, duration};

pub fn run(file: &Path) -> Result<(), String> {
    let sim = super::load_simulation(file)?;
    let state = sim.state();
    let now_ms = sim.clock().now_ms();

    println!(
        "  {} {} {}",
        "Excavator".bold(),
        state.region.info().name,
        format!("(tick {}, seed={})", sim.current_tick(), sim.seed()).dimmed()
    );
    println!(
        "  Depth {:.0} m (max {:.0} m), level {} ({:.0} xp)",
        state.depth, state.max_depth, state.level, state.xp
    );
    println!("  Drill: {}", activity(state));
    println!();

    print_vitals(state);
    print_drill(state);
    print_resources(state);
    print_bases(state, now_ms);
    print_caravans(state, now_ms);
    print_expeditions(state, now_ms);
    print_standing(state);

    if !state.effects.is_empty() {
        println!("  {}", "Active Effects".bold().underline());
        for effect in &state.effects {
            println!("  {} {}", effect.name, format!("({} ticks)", effect.duration).dimmed());
        }
        println!();
    }

    if !state.inventory.is_empty() {
        println!("  {}", "Artifacts".bold().underline());
        for item in state.inventory.iter() {
            let id = item.instance_id.simple().to_string();
            let mut flags = Vec::new();
            if !item.identified {
                flags.push("unidentified");
            }
            if item.equipped {
                flags.push("equipped");
            }
            println!("  {} {} {}", &id[..8], item.def_id, flags.join(", ").dimmed());
        }
        println!();
    }

    Ok(())
}

fn activity(state: &GameState) -> String {
    if let Some(boss) = &state.boss {
        let fight = format!("fighting {} ({:.0}/{:.0} hp)", boss.name, boss.hp, boss.max_hp);
        return fight.red().bold().to_string();
    }
    if let Some(event) = state.pending_event() {
        return format!("waiting on {}", event.title).yellow().to_string();
    }
    if let Some(travel) = &state.travel {
        return format!("travelling {} -> {}", travel.from, travel.to).blue().to_string();
    }
    if state.vitals.overheated {
        return "overheated".red().to_string();
    }
    if state.drilling {
        "drilling".green().to_string()
    } else {
        "parked".dimmed().to_string()
    }
}

fn print_vitals(state: &GameState) {
    let max = state.max_integrity();
    let heat = format!("{} {:>5.1}", bar(state.vitals.heat, 100.0), state.vitals.heat);
    let heat = if state.vitals.heat >= 80.0 { heat.red() } else { heat.normal() };
    println!("  Heat      {heat}");
    println!(
        "  Integrity {} {:>5.0}/{:.0}",
        bar(state.vitals.integrity, max),
        state.vitals.integrity,
        max
    );
    println!("  Shield    {} {:>5.1}", bar(state.shield_charge, 100.0), state.shield_charge);
    println!();
}

fn print_drill(state: &GameState) {
    let stats = state.stats();
    println!("  {}", "Drill".bold().underline());
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Slot", "Part", "Tier"]);
    for slot in DrillSlot::ALL {
        let part = state.drill.part(slot);
        table.add_row(vec![slot.to_string(), part.name, part.tier.to_string()]);
    }
    println!("{table}");
    println!(
        "  {:.1} m/s, {:.1} dmg/s, {:.1} cooling/s, energy {:.0}%",
        stats.total_speed,
        stats.total_damage,
        stats.total_cooling,
        stats.energy_efficiency * 100.0
    );
    println!(
        "  crit {:.0}%, evasion {:.0}%, prediction {:.1}s, click x{:.1}",
        stats.crit_chance * 100.0,
        stats.evasion * 100.0,
        stats.prediction_time,
        stats.click_mult
    );
    println!();
}

fn print_resources(state: &GameState) {
    let held: Vec<_> = state.resources.iter().filter(|(_, v)| *v > 0.0).collect();
    println!("  {}", "Resources".bold().underline());
    if held.is_empty() {
        println!("  {}", "(empty)".dimmed());
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Resource", "Amount"]);
        for (kind, value) in held {
            table.add_row(vec![kind.to_string(), amount(value)]);
        }
        println!("{table}");
    }
    println!();
}

fn print_bases(state: &GameState, now_ms: u64) {
    if state.bases.is_empty() {
        return;
    }
    println!("  {}", "Bases".bold().underline());
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Region", "Type", "Status", "Storage", "Facilities"]);
    for base in state.bases.iter() {
        let status = match base.status {
            BaseStatus::Active => "active".to_string(),
            BaseStatus::Building => {
                format!("building ({})", duration(base.completion_ms.saturating_sub(now_ms)))
            }
        };
        let facilities: Vec<String> = base.facilities.iter().map(ToString::to_string).collect();
        table.add_row(vec![
            base.short_id(),
            base.region.to_string(),
            base.base_type.to_string(),
            status,
            format!("{}/{}", amount(base.stored_weight()), amount(base.storage_capacity)),
            facilities.join(", "),
        ]);
    }
    println!("{table}");
    println!();
}

fn print_caravans(state: &GameState, now_ms: u64) {
    if state.caravans.is_empty() {
        return;
    }
    println!("  {}", "Caravans".bold().underline());
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Tier", "Route", "Cargo", "Status"]);
    for caravan in &state.caravans {
        let status = if caravan.in_transit() {
            format!("eta {}", duration(caravan.eta(now_ms).remaining_ms))
        } else {
            format!("{:?}", caravan.status).to_lowercase()
        };
        table.add_row(vec![
            caravan.short_id(),
            caravan.tier.to_string(),
            format!("{} -> {}", caravan.from_region, caravan.to_region),
            amount(caravan.cargo_weight),
            status,
        ]);
    }
    println!("{table}");
    println!();
}

fn print_expeditions(state: &GameState, now_ms: u64) {
    if state.expeditions.is_empty() {
        return;
    }
    println!("  {}", "Expeditions".bold().underline());
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Difficulty", "Drones", "Target", "Status"]);
    for expedition in &state.expeditions {
        let status = if expedition.is_active() {
            format!("back in {}", duration(expedition.remaining_ms(now_ms)))
        } else {
            format!("{:?}", expedition.status).to_lowercase()
        };
        table.add_row(vec![
            expedition.short_id(),
            expedition.difficulty.to_string(),
            expedition.drone_count.to_string(),
            expedition.resource_target.to_string(),
            status,
        ]);
    }
    println!("{table}");
    println!();
}

fn print_standing(state: &GameState) {
    println!("  {}", "Standing".bold().underline());
    let tier = state.licenses.tier();
    println!(
        "  Global reputation {} (license tier {})",
        state.licenses.global_reputation, tier.tier
    );
    for faction in FactionId::ALL {
        println!(
            "  {:<12} {:>6} (level {})",
            faction.to_string(),
            state.reputation.get(faction),
            state.reputation.level(faction)
        );
    }
    let zone = region_color(state.level, state.region);
    let permit = if state.licenses.permits.contains_key(&state.region) {
        "permit held".green()
    } else {
        "no permit".red()
    };
    println!("  {} is a {zone} zone for you, {permit}", state.region.info().name);
    println!();
}

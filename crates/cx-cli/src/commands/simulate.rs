use std::collections::BTreeMap;
use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use cx_core::resource::ResourceKind;
use cx_simulation::{GameState, PlayerAction, SimConfig, SimEventKind, Simulation};
use tracing::debug;

use super::{amount, bar, duration};

pub struct Options {
    pub save: Option<PathBuf>,
    pub ticks: u64,
    pub seed: u64,
    pub drill: bool,
    pub auto: bool,
    pub verbose: bool,
    pub out: Option<PathBuf>,
}

pub fn run(opts: Options) -> Result<(), String> {
    let mut sim = match &opts.save {
        Some(path) => super::load_simulation(path)?,
        None => Simulation::with_default_systems(
            GameState::new(),
            SimConfig::default().with_seed(opts.seed),
        ),
    };
    let start_tick = sim.current_tick();
    let start_depth = sim.state().depth;
    let start_rubies = sim.state().resources.get(ResourceKind::Rubies);

    if opts.drill && !sim.state().drilling {
        sim.act(&PlayerAction::StartDrilling)
            .map_err(|e| format!("cannot start drilling: {e}"))?;
    }

    for _ in 0..opts.ticks {
        sim.tick().map_err(|e| format!("simulation error: {e}"))?;
        if opts.auto {
            autopilot(&mut sim);
        }
    }

    let state = sim.state();
    println!(
        "  {} {} {}",
        "Simulation".bold(),
        duration(opts.ticks * sim.clock().ms_per_tick()),
        format!(
            "({} ticks from {start_tick}, seed={})",
            opts.ticks,
            sim.seed()
        )
        .dimmed()
    );
    println!(
        "  Depth {:.0} m ({:+.0} m), rubies {} ({:+.0}), level {}",
        state.depth,
        state.depth - start_depth,
        amount(state.resources.get(ResourceKind::Rubies)),
        state.resources.get(ResourceKind::Rubies) - start_rubies,
        state.level
    );
    println!(
        "  Heat {} {:.0}  Integrity {} {:.0}/{:.0}",
        bar(state.vitals.heat, 100.0),
        state.vitals.heat,
        bar(state.vitals.integrity, state.max_integrity()),
        state.vitals.integrity,
        state.max_integrity()
    );
    println!();

    let new_events: Vec<_> = sim
        .events()
        .events()
        .iter()
        .filter(|e| e.tick > start_tick)
        .collect();

    if opts.verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in &new_events {
            let tick_label = format!("[tick {:>6}]", event.tick).dimmed();
            println!("  {tick_label} {}", colorize_event(&event.kind, &event.description));
        }
        if new_events.is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    } else {
        let notable: Vec<_> = new_events.iter().filter(|e| is_notable(&e.kind)).collect();
        if !notable.is_empty() {
            println!("  {}", "Notable Events".bold().underline());
            for event in notable {
                println!("  {}", colorize_event(&event.kind, &event.description));
            }
            println!();
        }
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for event in &new_events {
        *counts.entry(event.kind.label()).or_default() += 1;
    }
    if !counts.is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Event", "Count"]);
        for (label, count) in counts {
            table.add_row(vec![label.to_string(), count.to_string()]);
        }
        println!("{table}");
        println!();
    }

    if let Some(path) = &opts.out {
        super::write_save(path, &sim)?;
        println!("  Saved to {}", path.display());
    }

    Ok(())
}

/// Answer whatever the game is waiting on: win minigames, dismiss notices,
/// and take the first choice that succeeds.
fn autopilot(sim: &mut Simulation) {
    if sim.state().minigame.is_some()
        && let Err(e) = sim.act(&PlayerAction::Minigame { success: true })
    {
        debug!(error = %e, "autopilot minigame failed");
    }
    let Some(event) = sim.state().pending_event() else {
        return;
    };
    if !event.is_choice() {
        if let Err(e) = sim.act(&PlayerAction::Dismiss) {
            debug!(event = event.id, error = %e, "autopilot dismiss failed");
        }
        return;
    }
    for option in event.options {
        match sim.act(&PlayerAction::Choose {
            action: option.action,
        }) {
            Ok(_) => return,
            Err(e) => debug!(event = event.id, option = %option.action, error = %e, "autopilot option failed"),
        }
    }
}

fn is_notable(kind: &SimEventKind) -> bool {
    matches!(
        kind,
        SimEventKind::LevelUp { .. }
            | SimEventKind::Broken
            | SimEventKind::BossSpawned { .. }
            | SimEventKind::BossDefeated { .. }
            | SimEventKind::ArtifactFound { .. }
            | SimEventKind::EventTriggered { .. }
            | SimEventKind::CaravanLost { .. }
            | SimEventKind::BaseRaided { .. }
    )
}

fn colorize_event(kind: &SimEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SimEventKind::Broken | SimEventKind::CaravanLost { .. } => description.red().bold(),
        SimEventKind::Overheated | SimEventKind::Hazard { .. } | SimEventKind::BaseRaided { .. } => {
            description.red()
        }
        SimEventKind::BossSpawned { .. } => description.magenta().bold(),
        SimEventKind::LevelUp { .. } | SimEventKind::BossDefeated { .. } => description.green().bold(),
        SimEventKind::ArtifactFound { .. } | SimEventKind::QuestReady { .. } => description.yellow(),
        SimEventKind::Departed { .. } | SimEventKind::Arrived { .. } => description.blue(),
        SimEventKind::EventTriggered { .. } | SimEventKind::EventResolved { .. } => description.cyan(),
        _ => description.normal(),
    }
}

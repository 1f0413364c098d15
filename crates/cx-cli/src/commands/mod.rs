pub mod act;
pub mod caravans;
pub mod events;
pub mod export;
pub mod import;
pub mod market;
pub mod new;
pub mod quests;
pub mod regions;
pub mod simulate;
pub mod status;

use std::fs;
use std::path::Path;

use cx_core::region::RegionId;
use cx_simulation::{SaveGame, SimConfig, Simulation, import_save};

/// Read and decode a save file.
fn load_save(path: &Path) -> Result<SaveGame, String> {
    let blob =
        fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    import_save(&blob).map_err(|e| format!("{}: {e}", path.display()))
}

/// Resume the game stored in a save file.
fn load_simulation(path: &Path) -> Result<Simulation, String> {
    let save = load_save(path)?;
    let config = SimConfig::default().with_seed(save.seed);
    Ok(Simulation::resume(save.state, config, save.tick))
}

/// Write the simulation's current game to a save file.
fn write_save(path: &Path, sim: &Simulation) -> Result<(), String> {
    let blob = sim.export().map_err(|e| e.to_string())?;
    fs::write(path, format!("{blob}\n"))
        .map_err(|e| format!("cannot write {}: {e}", path.display()))
}

fn parse_region(s: &str) -> Result<RegionId, String> {
    s.parse::<RegionId>().map_err(|e| e.to_string())
}

/// Compact number formatting for tables.
fn amount(value: f64) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value.abs() >= 10_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else if value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// `1h 05m`, `3m 20s` or `45s`.
fn duration(ms: u64) -> String {
    let secs = ms / 1000;
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

fn bar(value: f64, max: f64) -> String {
    let ratio = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
    let filled = (ratio * 10.0).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(10 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_amounts() {
        assert_eq!(amount(42.0), "42");
        assert_eq!(amount(1.5), "1.50");
        assert_eq!(amount(25_000.0), "25.0k");
        assert_eq!(amount(3_400_000.0), "3.40M");
    }

    #[test]
    fn formats_durations() {
        assert_eq!(duration(45_000), "45s");
        assert_eq!(duration(200_000), "3m 20s");
        assert_eq!(duration(3_900_000), "1h 05m");
    }

    #[test]
    fn bars_are_clamped() {
        assert_eq!(bar(50.0, 100.0), "[#####-----]");
        assert_eq!(bar(150.0, 100.0), "[##########]");
        assert_eq!(bar(1.0, 0.0), "[----------]");
    }
}

use std::path::Path;

use colored::Colorize;
use cx_simulation::{GameState, SimConfig, Simulation};

pub fn run(file: &Path, seed: u64) -> Result<(), String> {
    if file.exists() {
        return Err(format!("{} already exists", file.display()));
    }
    let sim = Simulation::new(GameState::new(), SimConfig::default().with_seed(seed));
    super::write_save(file, &sim)?;
    println!(
        "  {} new game in {} {}",
        "Created".green().bold(),
        file.display(),
        format!("(seed={seed})").dimmed()
    );
    Ok(())
}

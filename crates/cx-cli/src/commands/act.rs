use std::path::Path;

use colored::Colorize;

pub fn run(file: &Path, command: &str) -> Result<(), String> {
    let mut sim = super::load_simulation(file)?;
    let message = sim.command(command).map_err(|e| e.to_string())?;
    super::write_save(file, &sim)?;
    println!("  {} {message}", "OK".green().bold());
    Ok(())
}

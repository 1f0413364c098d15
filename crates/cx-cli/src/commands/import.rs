use std::fs;
use std::path::Path;

use colored::Colorize;
use cx_simulation::import_save;

pub fn run(blob: &str, out: &Path) -> Result<(), String> {
    let save = import_save(blob).map_err(|e| e.to_string())?;
    fs::write(out, format!("{}\n", blob.trim()))
        .map_err(|e| format!("cannot write {}: {e}", out.display()))?;
    println!(
        "  {} save from {} (tick {}, depth {:.0} m) to {}",
        "Imported".green().bold(),
        save.saved_at.format("%Y-%m-%d %H:%M"),
        save.tick,
        save.state.depth,
        out.display()
    );
    Ok(())
}

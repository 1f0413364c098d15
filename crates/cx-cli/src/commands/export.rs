use std::path::Path;

use cx_simulation::export_save;

pub fn run(file: &Path) -> Result<(), String> {
    let save = super::load_save(file)?;
    let blob = export_save(&save.state, save.seed, save.tick).map_err(|e| e.to_string())?;
    println!("{blob}");
    Ok(())
}

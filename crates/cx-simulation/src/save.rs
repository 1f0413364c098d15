//! Save export and import as Base64-wrapped JSON.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::state::GameState;

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

/// Everything needed to resume a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: u32,
    /// Seed of the run.
    pub seed: u64,
    /// Tick the game was saved at.
    pub tick: u64,
    pub saved_at: DateTime<Utc>,
    pub state: GameState,
}

impl SaveGame {
    pub fn new(state: GameState, seed: u64, tick: u64) -> Self {
        Self {
            version: SAVE_VERSION,
            seed,
            tick,
            saved_at: Utc::now(),
            state,
        }
    }
}

/// Encode a save as Base64.
pub fn export_save(state: &GameState, seed: u64, tick: u64) -> SimResult<String> {
    let save = SaveGame::new(state.clone(), seed, tick);
    let json = serde_json::to_string(&save)?;
    debug!(bytes = json.len(), tick, "save exported");
    Ok(STANDARD.encode(json))
}

/// Decode a Base64 save, check its version and reject out-of-range values.
pub fn import_save(blob: &str) -> SimResult<SaveGame> {
    let bytes = STANDARD.decode(blob.trim())?;
    let save: SaveGame = serde_json::from_slice(&bytes)?;
    if save.version != SAVE_VERSION {
        return Err(SimError::SaveVersion {
            found: save.version,
            expected: SAVE_VERSION,
        });
    }
    if let Some(problem) = save.state.impossible_value() {
        return Err(SimError::SaveInvalid(problem));
    }
    debug!(tick = save.tick, "save imported");
    Ok(save)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_core::artifact::ARTIFACTS;
    use cx_core::resource::ResourceKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn exported_save_reimports() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut state = GameState::new();
        state.depth = 1234.5;
        state.resources.add(ResourceKind::Iron, 0.1 + 0.2);
        state.grant_artifact(&mut rng, &ARTIFACTS[3], 77);
        state.event_queue.push_back("GAS_POCKET".into());

        let blob = export_save(&state, 42, 900).unwrap();
        let save = import_save(&blob).unwrap();
        assert_eq!(save.state, state);
        assert_eq!(save.seed, 42);
        assert_eq!(save.tick, 900);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(import_save("not base64!!"), Err(SimError::SaveEncoding(_))));
        let blob = STANDARD.encode("{\"version\": 1}");
        assert!(matches!(import_save(&blob), Err(SimError::SaveFormat(_))));
    }

    fn tampered(edit: impl FnOnce(&mut serde_json::Value)) -> String {
        let save = SaveGame::new(GameState::new(), 1, 0);
        let mut json = serde_json::to_value(&save).unwrap();
        edit(&mut json);
        STANDARD.encode(json.to_string())
    }

    #[test]
    fn rejects_negative_resources() {
        let blob = tampered(|json| json["state"]["resources"]["clay"] = (-500.0).into());
        match import_save(&blob) {
            Err(SimError::SaveInvalid(msg)) => assert!(msg.contains("clay")),
            other => panic!("expected invalid save, got {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_vitals() {
        let blob = tampered(|json| json["state"]["vitals"]["heat"] = 900.0.into());
        assert!(matches!(import_save(&blob), Err(SimError::SaveInvalid(_))));
        let blob = tampered(|json| json["state"]["shield_charge"] = (-1.0).into());
        assert!(matches!(import_save(&blob), Err(SimError::SaveInvalid(_))));
        let blob = tampered(|json| json["state"]["vitals"]["integrity"] = 1e9.into());
        assert!(matches!(import_save(&blob), Err(SimError::SaveInvalid(_))));
    }

    #[test]
    fn fresh_and_played_states_are_possible() {
        assert_eq!(GameState::new().impossible_value(), None);
        let blob = tampered(|_| {});
        assert!(import_save(&blob).is_ok());
    }

    #[test]
    fn rejects_other_versions() {
        let mut save = SaveGame::new(GameState::new(), 1, 0);
        save.version = 99;
        let blob = STANDARD.encode(serde_json::to_string(&save).unwrap());
        assert!(matches!(
            import_save(&blob),
            Err(SimError::SaveVersion { found: 99, .. })
        ));
    }
}

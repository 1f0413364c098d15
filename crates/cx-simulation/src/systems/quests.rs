use std::any::Any;
use std::collections::BTreeSet;

use cx_economy::ProgressSnapshot;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// Tracks objective progress and announces quests ready to hand in.
#[derive(Debug, Default)]
pub struct QuestSystem {
    announced: BTreeSet<String>,
}

impl QuestSystem {
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for QuestSystem {
    fn name(&self) -> &str {
        "quests"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let state = &mut *ctx.state;
        if state.quests.active.is_empty() {
            self.announced.clear();
            return Ok(());
        }
        let snap = ProgressSnapshot {
            wallet: &state.resources,
            bases: &state.bases,
            depth: state.depth,
            artifacts_found: state.artifacts_found,
            bosses_defeated: state.bosses_defeated,
            regions_visited: state.visited_regions.len(),
        };
        state.quests.update(&snap);

        let active = &state.quests.active;
        self.announced.retain(|id| active.contains_key(id));
        let ready: Vec<(String, String)> = active
            .values()
            .filter(|q| q.is_complete() && !self.announced.contains(&q.id))
            .map(|q| (q.id.clone(), q.title.clone()))
            .collect();
        for (id, title) in ready {
            self.announced.insert(id.clone());
            ctx.emit(SimEventKind::QuestReady { id }, format!("{title} can be handed in"));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameState;
    use crate::systems::testing::run_system;

    #[test]
    fn ready_quest_is_announced_once() {
        let mut state = GameState::new();
        let before = state.clone();
        state
            .quests
            .accept("QUEST_ANCIENT_RUINS", &before.progress_snapshot())
            .unwrap();

        let mut system = QuestSystem::new();
        let log = run_system(&mut system, &mut state, 5).unwrap();
        assert!(log.is_empty());

        state.artifacts_found = 5;
        let log = run_system(&mut system, &mut state, 1).unwrap();
        assert_eq!(log.with_label("quest_ready").len(), 1);
        let log = run_system(&mut system, &mut state, 5).unwrap();
        assert!(log.is_empty());
        assert!(state.quests.active["QUEST_ANCIENT_RUINS"].is_complete());
    }

    #[test]
    fn no_quests_no_events() {
        let mut state = GameState::new();
        let log = run_system(&mut QuestSystem::new(), &mut state, 5).unwrap();
        assert!(log.is_empty());
    }
}

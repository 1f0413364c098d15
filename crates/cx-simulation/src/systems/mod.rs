//! The built-in tick systems, one concern each.

pub mod abilities;
pub mod analyzer;
pub mod bases;
pub mod caravans;
pub mod combat;
pub mod drilling;
pub mod drones;
pub mod effects;
pub mod events;
pub mod expeditions;
pub mod hazards;
pub mod quests;
pub mod shield;
pub mod travel;

pub use abilities::AbilitySystem;
pub use analyzer::AnalyzerSystem;
pub use bases::BaseSystem;
pub use caravans::CaravanSystem;
pub use combat::CombatSystem;
pub use drilling::DrillingSystem;
pub use drones::DroneSystem;
pub use effects::EffectSystem;
pub use events::EventSystem;
pub use expeditions::ExpeditionSystem;
pub use hazards::HazardSystem;
pub use quests::QuestSystem;
pub use shield::ShieldSystem;
pub use travel::TravelSystem;

use crate::system::System;

/// Every built-in system in tick order.
pub fn default_systems() -> Vec<Box<dyn System>> {
    vec![
        Box::new(AbilitySystem::new()),
        Box::new(EffectSystem::new()),
        Box::new(DrillingSystem::new()),
        Box::new(DroneSystem::new()),
        Box::new(ShieldSystem::new()),
        Box::new(HazardSystem::new()),
        Box::new(EventSystem::new()),
        Box::new(CombatSystem::new()),
        Box::new(TravelSystem::new()),
        Box::new(AnalyzerSystem::new()),
        Box::new(BaseSystem::new()),
        Box::new(CaravanSystem::new()),
        Box::new(ExpeditionSystem::new()),
        Box::new(QuestSystem::new()),
    ]
}

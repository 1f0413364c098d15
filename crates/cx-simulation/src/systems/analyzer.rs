use std::any::Any;

use cx_core::faction::Perk;
use tracing::info;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// Analysis speed with a research lab in the current region.
pub const LAB_SPEED: f64 = 2.0;

/// Works through the artifact in the analyzer.
#[derive(Debug, Default)]
pub struct AnalyzerSystem;

impl AnalyzerSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for AnalyzerSystem {
    fn name(&self) -> &str {
        "analyzer"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let Some(mut analysis) = ctx.state.analysis else {
            return Ok(());
        };
        let state = &mut *ctx.state;
        let mut speed = if state.bases.has_research_lab_in(state.region) {
            LAB_SPEED
        } else {
            1.0
        };
        if state.has_perk(Perk::AutoAnalysis) {
            speed *= 1.0 + Perk::AutoAnalysis.value();
        }
        analysis.time_left -= speed * ctx.clock.dt_secs();
        if analysis.time_left > 0.0 {
            state.analysis = Some(analysis);
            return Ok(());
        }

        state.analysis = None;
        let Some(item) = state.inventory.get_mut(&analysis.item) else {
            return Ok(());
        };
        item.identified = true;
        let def_id = item.def_id.clone();
        state.discovered_artifacts.insert(def_id.clone());
        info!(artifact = %def_id, "artifact identified");
        ctx.emit(
            SimEventKind::ArtifactIdentified {
                def_id: def_id.clone(),
            },
            format!("{def_id} identified"),
        );
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

use std::any::Any;

use crate::context::SimContext;
use crate::error::SimResult;

/// One concern of the game loop: drilling, heat, events, caravans and so on.
///
/// The simulation ticks its systems in a fixed order, handing each the same
/// [`SimContext`]. A system keeps only bookkeeping of its own; anything that
/// must survive a save lives in [`crate::state::GameState`].
pub trait System: std::fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Advance this concern by one tick.
    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()>;

    /// Runs once, before the first tick.
    fn init(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
        Ok(())
    }

    /// Downcast support for [`crate::Simulation::get_system`].
    fn as_any(&self) -> &dyn Any;

    /// Downcast support for [`crate::Simulation::get_system_mut`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Tracks simulation time: a monotonic tick counter and the game clock in ms.
#[derive(Debug, Clone)]
pub struct SimClock {
    tick: u64,
    start_ms: u64,
    ms_per_tick: u64,
}

impl SimClock {
    /// Create a new clock at tick 0.
    pub fn new(start_ms: u64, ms_per_tick: u64) -> Self {
        Self {
            tick: 0,
            start_ms,
            ms_per_tick: ms_per_tick.max(1),
        }
    }

    /// Resume a clock at `tick`, e.g. after loading a save.
    pub fn resume(start_ms: u64, ms_per_tick: u64, tick: u64) -> Self {
        Self {
            tick,
            ..Self::new(start_ms, ms_per_tick)
        }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Current game time in ms.
    pub fn now_ms(&self) -> u64 {
        self.start_ms + self.elapsed_ms()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.tick * self.ms_per_tick
    }

    pub fn ms_per_tick(&self) -> u64 {
        self.ms_per_tick
    }

    /// Length of one tick in seconds.
    pub fn dt_secs(&self) -> f64 {
        self.ms_per_tick as f64 / 1000.0
    }

    /// Ticks that make up one game second, at least 1.
    pub fn ticks_per_second(&self) -> u64 {
        (1000 / self.ms_per_tick).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_initial_state() {
        let clock = SimClock::new(1_000, 100);
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.now_ms(), 1_000);
        assert_eq!(clock.ticks_per_second(), 10);
    }

    #[test]
    fn clock_advance_increments() {
        let mut clock = SimClock::new(0, 100);
        clock.advance();
        clock.advance();
        clock.advance();
        assert_eq!(clock.tick(), 3);
        assert_eq!(clock.now_ms(), 300);
        assert!((clock.dt_secs() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn resumed_clock_keeps_time() {
        let clock = SimClock::resume(0, 100, 50);
        assert_eq!(clock.tick(), 50);
        assert_eq!(clock.now_ms(), 5_000);
    }

    #[test]
    fn long_ticks_still_fire_per_second_work() {
        let clock = SimClock::new(0, 5_000);
        assert_eq!(clock.ticks_per_second(), 1);
    }
}

use bevy_ecs::prelude::*;

/// Monotonic simulation clock. Ticks are unitless; one tick is one full
/// pass of the staged schedule.
#[derive(Debug, Default, Clone, Copy, Resource)]
pub struct TickClock {
    now: u64,
}

impl TickClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn advance(&mut self) {
        self.now += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_one_tick_at_a_time() {
        let mut clock = TickClock::default();
        assert_eq!(clock.now(), 0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.now(), 2);
    }
}

//! Simulated-annealing cooling schedule.
//!
//! The temperature starts hot (1.0) on session start or reheat, stays there
//! until `cooling_delay_ms` has passed without an interaction, then decays
//! geometrically by `annealing_rate` per tick down to `min_temperature`.
//!
//! The phase is implied by the state:
//! - **Hot**: cooling has not started yet
//! - **Cooling**: decaying, still above the floor
//! - **Cold**: clamped at the floor, the only phase in which a session may stop
//!
//! Every other part of the engine reads the temperature through [`Thermal`],
//! which turns it into multipliers: hot means loose, exploratory motion;
//! cold means stronger damping, finer thresholds and grid conformity.

use super::config::LayoutConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnealingPhase {
    Hot,
    Cooling,
    Cold,
}

#[derive(Debug, Clone)]
pub struct AnnealingScheduler {
    temperature: f32,
    last_interaction_ms: f64,
    cooling_start_ms: Option<f64>,
}

impl AnnealingScheduler {
    pub fn new(now_ms: f64) -> Self {
        Self {
            temperature: 1.0,
            last_interaction_ms: now_ms,
            cooling_start_ms: None,
        }
    }

    /// Back to hot: temperature 1.0, cooling timestamp cleared.
    pub fn reheat(&mut self, now_ms: f64) {
        self.temperature = 1.0;
        self.last_interaction_ms = now_ms;
        self.cooling_start_ms = None;
    }

    /// Push back the start of cooling without raising the temperature.
    pub fn note_interaction(&mut self, now_ms: f64) {
        self.last_interaction_ms = now_ms;
    }

    /// Advance the schedule by one tick and return the new temperature.
    pub fn tick(&mut self, now_ms: f64, config: &LayoutConfig) -> f32 {
        let floor = config.min_temperature;

        if self.cooling_start_ms.is_none() {
            if now_ms - self.last_interaction_ms < config.cooling_delay_ms {
                return self.temperature;
            }
            self.cooling_start_ms = Some(now_ms);
        }

        // min() keeps a floor raised mid-session from heating the simulation back up.
        self.temperature = (self.temperature * config.annealing_rate)
            .max(floor)
            .min(self.temperature);
        self.temperature
    }

    #[inline]
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn cooling_start_ms(&self) -> Option<f64> {
        self.cooling_start_ms
    }

    pub fn last_interaction_ms(&self) -> f64 {
        self.last_interaction_ms
    }

    pub fn phase(&self, config: &LayoutConfig) -> AnnealingPhase {
        if self.is_cold(config) {
            AnnealingPhase::Cold
        } else if self.cooling_start_ms.is_some() {
            AnnealingPhase::Cooling
        } else {
            AnnealingPhase::Hot
        }
    }

    #[inline]
    pub fn is_cold(&self, config: &LayoutConfig) -> bool {
        self.temperature <= config.min_temperature
    }

    pub fn thermal(&self) -> Thermal {
        Thermal::new(self.temperature)
    }
}

// Fraction of each quantity left at temperature 0; full value at temperature 1.
const COLD_FORCE_RATIO: f32 = 0.5;
const COLD_MAX_FORCE_RATIO: f32 = 0.25;
const COLD_DAMPING_RATIO: f32 = 0.6;
const COLD_THRESHOLD_RATIO: f32 = 0.5;

/// Temperature-derived multipliers for one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thermal {
    pub temperature: f32,
}

impl Thermal {
    pub fn new(temperature: f32) -> Self {
        Self { temperature }
    }

    #[inline]
    fn towards_cold(self, cold_ratio: f32) -> f32 {
        cold_ratio + (1.0 - cold_ratio) * self.temperature
    }

    /// Repulsion, spring, alignment and centre magnitudes.
    #[inline]
    pub fn force(self) -> f32 {
        self.towards_cold(COLD_FORCE_RATIO)
    }

    #[inline]
    pub fn max_force(self) -> f32 {
        self.towards_cold(COLD_MAX_FORCE_RATIO)
    }

    /// Multiplies the configured damping; smaller means stronger damping.
    #[inline]
    pub fn damping(self) -> f32 {
        self.towards_cold(COLD_DAMPING_RATIO)
    }

    /// Movement and stop thresholds.
    #[inline]
    pub fn threshold(self) -> f32 {
        self.towards_cold(COLD_THRESHOLD_RATIO)
    }

    /// Grid attraction grows as the simulation cools.
    #[inline]
    pub fn grid(self) -> f32 {
        1.0 - self.temperature
    }

    /// Snap tolerance; nothing snaps while fully hot.
    #[inline]
    pub fn snap(self) -> f32 {
        1.0 - self.temperature
    }

    #[inline]
    pub fn jitter(self) -> f32 {
        self.temperature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LayoutConfig {
        LayoutConfig {
            cooling_delay_ms: 1000.0,
            annealing_rate: 0.5,
            min_temperature: 0.1,
            ..Default::default()
        }
    }

    #[test]
    fn test_stays_hot_during_cooling_delay() {
        let config = config();
        let mut scheduler = AnnealingScheduler::new(0.0);

        for now in [0.0, 100.0, 500.0, 999.0] {
            assert_eq!(scheduler.tick(now, &config), 1.0);
        }
        assert_eq!(scheduler.phase(&config), AnnealingPhase::Hot);
        assert_eq!(scheduler.cooling_start_ms(), None);
    }

    #[test]
    fn test_cools_after_delay_and_clamps_at_floor() {
        let config = config();
        let mut scheduler = AnnealingScheduler::new(0.0);

        assert_eq!(scheduler.tick(1000.0, &config), 0.5);
        assert_eq!(scheduler.cooling_start_ms(), Some(1000.0));
        assert_eq!(scheduler.phase(&config), AnnealingPhase::Cooling);

        assert_eq!(scheduler.tick(1016.0, &config), 0.25);
        assert_eq!(scheduler.tick(1032.0, &config), 0.125);
        assert_eq!(scheduler.tick(1048.0, &config), 0.1);
        assert_eq!(scheduler.tick(1064.0, &config), 0.1);
        assert_eq!(scheduler.phase(&config), AnnealingPhase::Cold);
    }

    #[test]
    fn test_temperature_is_monotonic_and_floored() {
        let config = LayoutConfig {
            cooling_delay_ms: 0.0,
            annealing_rate: 0.9,
            min_temperature: 0.2,
            ..Default::default()
        };
        let mut scheduler = AnnealingScheduler::new(0.0);

        let mut previous = scheduler.temperature();
        for i in 0..500 {
            let t = scheduler.tick(i as f64 * 16.0, &config);
            assert!(t <= previous);
            assert!(t >= config.min_temperature);
            previous = t;
        }
        assert_eq!(previous, config.min_temperature);
    }

    #[test]
    fn test_interaction_postpones_cooling() {
        let config = config();
        let mut scheduler = AnnealingScheduler::new(0.0);

        scheduler.note_interaction(900.0);
        assert_eq!(scheduler.tick(1500.0, &config), 1.0);
        assert_eq!(scheduler.tick(1900.0, &config), 0.5);
    }

    #[test]
    fn test_reheat_resets_to_hot() {
        let config = config();
        let mut scheduler = AnnealingScheduler::new(0.0);
        scheduler.tick(1000.0, &config);
        scheduler.tick(1016.0, &config);
        assert!(scheduler.temperature() < 1.0);

        scheduler.reheat(2000.0);
        assert_eq!(scheduler.temperature(), 1.0);
        assert_eq!(scheduler.cooling_start_ms(), None);
        assert_eq!(scheduler.last_interaction_ms(), 2000.0);
        assert_eq!(scheduler.phase(&config), AnnealingPhase::Hot);
    }

    #[test]
    fn test_thermal_multipliers() {
        let hot = Thermal::new(1.0);
        assert_eq!(hot.force(), 1.0);
        assert_eq!(hot.damping(), 1.0);
        assert_eq!(hot.grid(), 0.0);
        assert_eq!(hot.snap(), 0.0);

        let cold = Thermal::new(0.0);
        assert_eq!(cold.force(), COLD_FORCE_RATIO);
        assert_eq!(cold.max_force(), COLD_MAX_FORCE_RATIO);
        assert_eq!(cold.damping(), COLD_DAMPING_RATIO);
        assert_eq!(cold.threshold(), COLD_THRESHOLD_RATIO);
        assert_eq!(cold.grid(), 1.0);
        assert_eq!(cold.jitter(), 0.0);
    }
}

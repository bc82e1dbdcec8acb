//! Cool-off: a gate around bet execution that enforces a mandatory waiting
//! period between bets. Time is read through an injectable [`Clock`] so
//! tests can advance virtual time instead of sleeping real wall-clock time.

use crate::error::Error;
use crate::span::Span;

/// Reads the current time in seconds. The evaluator never calls
/// [`std::time::SystemTime`] directly — only through this trait — so tests
/// can substitute a [`VirtualClock`].
pub trait Clock: std::fmt::Debug {
    fn now_seconds(&self) -> f64;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> f64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}

/// A clock whose value is advanced explicitly, for deterministic tests.
#[derive(Debug)]
pub struct VirtualClock(std::cell::Cell<f64>);

impl VirtualClock {
    pub fn new(start_seconds: f64) -> Self {
        VirtualClock(std::cell::Cell::new(start_seconds))
    }

    pub fn advance(&self, delta_seconds: f64) {
        self.0.set(self.0.get() + delta_seconds);
    }
}

impl Clock for VirtualClock {
    fn now_seconds(&self) -> f64 {
        self.0.get()
    }
}

/// Cool-off tunables, sourced from `BETLANG_COOLOFF_SECONDS` plus the
/// adaptive-mode and self-exclusion parameters from the design notes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoolOffConfig {
    pub base_period_seconds: f64,
    /// When true, the period multiplies 2x/4x once the bet rate over the
    /// trailing minute exceeds 5 or 10 bets/minute respectively.
    pub adaptive: bool,
    pub self_exclusion_seconds: f64,
}

impl Default for CoolOffConfig {
    fn default() -> Self {
        CoolOffConfig {
            base_period_seconds: 5.0,
            adaptive: true,
            self_exclusion_seconds: 24.0 * 60.0 * 60.0,
        }
    }
}

/// Idle (no bet recent) or Cooling(until) (now < until).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoolOffStatus {
    Idle,
    Cooling { until: f64 },
}

/// Mutable cool-off state: the one component of the runtime with
/// observable, time-dependent mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct CoolOffState {
    pub enabled: bool,
    pub last_bet_time: Option<f64>,
    pub cooling_until: Option<f64>,
    pub self_excluded_until: Option<f64>,
    pub violation_counter: u64,
    pub bet_time_history: Vec<f64>,
}

impl Default for CoolOffState {
    fn default() -> Self {
        CoolOffState {
            enabled: true,
            last_bet_time: None,
            cooling_until: None,
            self_excluded_until: None,
            violation_counter: 0,
            bet_time_history: Vec::new(),
        }
    }
}

impl CoolOffState {
    pub fn new() -> Self {
        CoolOffState::default()
    }

    /// Self-exclusion is checked before the enabled flag: it is a longer,
    /// non-bypassable cooling window, so disabling the gate only short-
    /// circuits the ordinary cool-off window, not an active self-exclusion.
    pub fn status(&self, now: f64) -> CoolOffStatus {
        if let Some(until) = self.self_excluded_until {
            if now < until {
                return CoolOffStatus::Cooling { until };
            }
        }
        if !self.enabled {
            return CoolOffStatus::Idle;
        }
        match self.cooling_until {
            Some(until) if now < until => CoolOffStatus::Cooling { until },
            _ => CoolOffStatus::Idle,
        }
    }

    fn bets_per_minute(&self, now: f64) -> usize {
        self.bet_time_history
            .iter()
            .filter(|&&t| now - t <= 60.0)
            .count()
    }

    fn effective_period(&self, now: f64, config: &CoolOffConfig) -> f64 {
        if !config.adaptive {
            return config.base_period_seconds;
        }
        let bpm = self.bets_per_minute(now);
        let multiplier = if bpm > 10 {
            4.0
        } else if bpm > 5 {
            2.0
        } else {
            1.0
        };
        config.base_period_seconds * multiplier
    }

    /// Attempts a bet at time `now`. On success, transitions to
    /// `Cooling(now + period)`. On a blocked attempt, the cooling window is
    /// left unchanged, the violation counter increments, and a
    /// `CoolOff.Active{remaining}` error is raised.
    pub fn try_bet(&mut self, now: f64, config: &CoolOffConfig, span: Span) -> Result<(), Error> {
        match self.status(now) {
            CoolOffStatus::Cooling { until } => {
                self.violation_counter += 1;
                Err(Error::CoolOffActive {
                    remaining: until - now,
                    span,
                })
            }
            CoolOffStatus::Idle => {
                self.bet_time_history.push(now);
                let period = self.effective_period(now, config);
                self.cooling_until = Some(now + period);
                self.last_bet_time = Some(now);
                Ok(())
            }
        }
    }

    /// A longer, non-bypassable cooling window: the enabled flag cannot
    /// short-circuit it because `status` checks `self_excluded_until`
    /// before falling back to the plain cooling window.
    pub fn self_exclude(&mut self, now: f64, config: &CoolOffConfig) {
        self.self_excluded_until = Some(now + config.self_exclusion_seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_bet_succeeds_from_idle() {
        let mut state = CoolOffState::new();
        let config = CoolOffConfig::default();
        assert!(state.try_bet(0.0, &config, Span::dummy()).is_ok());
    }

    #[test]
    fn second_bet_within_period_is_blocked_and_counts_a_violation() {
        let mut state = CoolOffState::new();
        let config = CoolOffConfig {
            base_period_seconds: 5.0,
            adaptive: false,
            ..CoolOffConfig::default()
        };
        state.try_bet(0.0, &config, Span::dummy()).unwrap();
        let err = state.try_bet(1.0, &config, Span::dummy()).unwrap_err();
        match err {
            Error::CoolOffActive { remaining, .. } => {
                assert!((remaining - 4.0).abs() < 1e-9);
            }
            other => panic!("expected CoolOffActive, got {:?}", other),
        }
        assert_eq!(state.violation_counter, 1);
    }

    #[test]
    fn bet_after_period_elapses_succeeds() {
        let mut state = CoolOffState::new();
        let config = CoolOffConfig {
            base_period_seconds: 5.0,
            adaptive: false,
            ..CoolOffConfig::default()
        };
        state.try_bet(0.0, &config, Span::dummy()).unwrap();
        assert!(state.try_bet(5.1, &config, Span::dummy()).is_ok());
    }

    #[test]
    fn disabled_flag_short_circuits_to_idle() {
        let mut state = CoolOffState::new();
        state.enabled = false;
        let config = CoolOffConfig::default();
        state.try_bet(0.0, &config, Span::dummy()).unwrap();
        assert!(state.try_bet(0.1, &config, Span::dummy()).is_ok());
    }

    #[test]
    fn adaptive_mode_doubles_period_past_five_bets_per_minute() {
        let mut state = CoolOffState::new();
        let config = CoolOffConfig {
            base_period_seconds: 1.0,
            adaptive: true,
            ..CoolOffConfig::default()
        };
        // Six bets inside a minute, spaced past each cooling window.
        let mut t = 0.0;
        for _ in 0..6 {
            state.try_bet(t, &config, Span::dummy()).unwrap();
            t += 1.5;
        }
        let status = state.status(t - 0.1);
        assert!(matches!(status, CoolOffStatus::Cooling { .. }));
    }

    #[test]
    fn self_exclusion_is_not_bypassed_by_disabling() {
        let mut state = CoolOffState::new();
        let config = CoolOffConfig::default();
        state.self_exclude(0.0, &config);
        state.enabled = false;
        match state.status(10.0) {
            CoolOffStatus::Cooling { .. } => {}
            CoolOffStatus::Idle => panic!("self-exclusion must not be bypassable"),
        }
    }
}

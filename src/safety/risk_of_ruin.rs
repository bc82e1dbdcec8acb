//! Risk-of-ruin: the probability a betting strategy's wealth hits a ruin
//! threshold before reaching a target, estimated analytically for the
//! symmetric fair-game case and by Monte Carlo otherwise.

use crate::prng::PrngState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuinParams {
    /// Win probability per bet.
    pub p: f64,
    /// Net odds: profit per unit staked on a win.
    pub b: f64,
    pub initial_wealth: f64,
    pub target: f64,
    pub ruin_threshold: f64,
    pub max_trajectories: usize,
    pub max_bets: usize,
}

impl Default for RuinParams {
    fn default() -> Self {
        RuinParams {
            p: 0.5,
            b: 1.0,
            initial_wealth: 0.0,
            target: 1.0,
            ruin_threshold: 0.0,
            max_trajectories: 10_000,
            max_bets: 1_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    Analytic,
    MonteCarlo,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuinEstimate {
    pub ruin_probability: f64,
    pub method: Method,
    /// Trajectories actually simulated (0 for the analytic path).
    pub trajectories: usize,
}

/// Estimates risk of ruin. Exactly `p = 0.5` (symmetric fair game) uses the
/// closed-form gambler's-ruin formula `(T - W0) / T`; any other `p` falls
/// back to simulating up to `max_trajectories` independent wealth paths of
/// up to `max_bets` steps each, counting the fraction that hit
/// `ruin_threshold` before `target` or before the step budget runs out.
pub fn risk_of_ruin(params: &RuinParams, prng: PrngState) -> (RuinEstimate, PrngState) {
    if params.p == 0.5 {
        let ror = if params.target > 0.0 {
            ((params.target - params.initial_wealth) / params.target).clamp(0.0, 1.0)
        } else {
            0.0
        };
        return (
            RuinEstimate {
                ruin_probability: ror,
                method: Method::Analytic,
                trajectories: 0,
            },
            prng,
        );
    }

    let mut state = prng;
    let mut ruined = 0usize;
    for _ in 0..params.max_trajectories {
        let mut wealth = params.initial_wealth;
        for _ in 0..params.max_bets {
            let (u, next) = state.next_f64();
            state = next;
            if u < params.p {
                wealth += params.b;
            } else {
                wealth -= 1.0;
            }
            if wealth <= params.ruin_threshold {
                ruined += 1;
                break;
            }
            if wealth >= params.target {
                break;
            }
        }
    }
    let ruin_probability = ruined as f64 / params.max_trajectories as f64;
    (
        RuinEstimate {
            ruin_probability,
            method: Method::MonteCarlo,
            trajectories: params.max_trajectories,
        },
        state,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analytic_path_matches_closed_form() {
        let params = RuinParams {
            p: 0.5,
            initial_wealth: 40.0,
            target: 100.0,
            ..RuinParams::default()
        };
        let (estimate, _) = risk_of_ruin(&params, PrngState::seed(1));
        assert_eq!(estimate.method, Method::Analytic);
        assert!((estimate.ruin_probability - 0.6).abs() < 1e-12);
    }

    #[test]
    fn monte_carlo_path_is_deterministic_under_a_seed() {
        let params = RuinParams {
            p: 0.45,
            b: 1.0,
            initial_wealth: 10.0,
            target: 30.0,
            ruin_threshold: 0.0,
            max_trajectories: 200,
            max_bets: 100,
        };
        let (a, _) = risk_of_ruin(&params, PrngState::seed(7));
        let (b, _) = risk_of_ruin(&params, PrngState::seed(7));
        assert_eq!(a.ruin_probability, b.ruin_probability);
        assert_eq!(a.method, Method::MonteCarlo);
    }

    #[test]
    fn losing_edge_ruins_more_often_than_winning_edge() {
        let losing = RuinParams {
            p: 0.3,
            b: 1.0,
            initial_wealth: 10.0,
            target: 50.0,
            ruin_threshold: 0.0,
            max_trajectories: 500,
            max_bets: 200,
        };
        let winning = RuinParams { p: 0.7, ..losing };
        let (lose_estimate, _) = risk_of_ruin(&losing, PrngState::seed(3));
        let (win_estimate, _) = risk_of_ruin(&winning, PrngState::seed(3));
        assert!(lose_estimate.ruin_probability > win_estimate.ruin_probability);
    }
}

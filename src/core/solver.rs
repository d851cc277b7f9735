use log::debug;
use serde::Serialize;

use super::debt::{
    DebtAccount, DebtPayoffResult, DebtStrategy, calculate_debt_payoff, total_balance,
    total_minimum_payment,
};
use super::timevalue::round_whole;

pub const MAX_BISECTION_ITERATIONS: u32 = 30;
/// Bracket width (currency units) at which the search stops.
pub const PAYMENT_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_payment: f64,
    pub months: u32,
    pub meets_target: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSolveResult {
    pub target_months: u32,
    pub required_payment: f64,
    pub result: DebtPayoffResult,
    pub iterations: Vec<TimelineIteration>,
    /// False when the iteration cap stopped the search before the bracket
    /// closed to within [`PAYMENT_TOLERANCE`].
    pub converged: bool,
}

/// Smallest monthly payment (before `extra_payment`) that clears `debts`
/// within `target_months`, found by bisection over full simulations.
///
/// The search brackets `[Σ minimums, Σ balances]`. Returns `None` for an
/// empty debt list, a zero target, or when no probed payment met the target.
pub fn calculate_debt_payoff_by_timeline(
    debts: &[DebtAccount],
    target_months: u32,
    strategy: DebtStrategy,
    extra_payment: f64,
) -> Option<TimelineSolveResult> {
    if debts.is_empty() || target_months == 0 {
        return None;
    }

    let mut lo = total_minimum_payment(debts);
    let mut hi = total_balance(debts);
    let mut best: Option<(f64, DebtPayoffResult)> = None;
    let mut iterations = Vec::with_capacity(MAX_BISECTION_ITERATIONS as usize);
    let mut converged = false;

    for iteration in 1..=MAX_BISECTION_ITERATIONS {
        let mid = (lo + hi) * 0.5;
        let probe = calculate_debt_payoff(debts, strategy, mid, extra_payment);
        let meets_target = probe.total_months <= target_months;
        debug!(
            "timeline probe {iteration}: payment {mid:.2} -> {} months (target {target_months})",
            probe.total_months
        );
        iterations.push(TimelineIteration {
            iteration,
            lower_bound: lo,
            upper_bound: hi,
            candidate_payment: mid,
            months: probe.total_months,
            meets_target,
        });

        if meets_target {
            hi = mid;
            best = Some((mid, probe));
        } else {
            lo = mid;
        }

        if (hi - lo).abs() < PAYMENT_TOLERANCE {
            converged = true;
            break;
        }
    }

    let (payment, result) = best?;
    Some(TimelineSolveResult {
        target_months,
        required_payment: round_whole(payment),
        result,
        iterations,
        converged,
    })
}

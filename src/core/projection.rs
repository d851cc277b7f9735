use super::timevalue::round_whole;
use super::types::ProjectionPoint;

/// Longest series derived from a time-to-goal.
pub const DERIVED_PROJECTION_CAP: u32 = 50;
/// Longest series any caller may request explicitly.
pub const MAX_PROJECTION_YEARS: u32 = 60;

/// Yearly snapshots from today (`index 0`) through `num_years`.
///
/// Each year compounds the previous unrounded nominal balance and then adds
/// one contribution. The inflation-adjusted value discounts the nominal
/// balance of that year directly rather than compounding a real series.
pub fn generate_projections(
    current_age: u32,
    current_savings: f64,
    annual_contribution: f64,
    nominal_return: f64,
    inflation_rate: f64,
    num_years: u32,
    start_year: i32,
) -> Vec<ProjectionPoint> {
    let mut projections = Vec::with_capacity(num_years as usize + 1);
    let mut portfolio = current_savings;
    let mut total_contributions = current_savings;

    for i in 0..=num_years {
        let inflation_adjusted = portfolio / (1.0 + inflation_rate).powi(i as i32);
        projections.push(ProjectionPoint {
            age: current_age + i,
            year: start_year + i as i32,
            portfolio: round_whole(portfolio),
            contributions: if i == 0 {
                current_savings
            } else {
                annual_contribution
            },
            total_contributions: round_whole(total_contributions),
            inflation_adjusted: round_whole(inflation_adjusted),
        });

        portfolio = portfolio * (1.0 + nominal_return) + annual_contribution;
        total_contributions += annual_contribution;
    }

    projections
}

/// Ten years past the goal, never more than [`DERIVED_PROJECTION_CAP`].
/// An unreachable goal gets the full cap.
pub fn projection_horizon(years_to_goal: f64) -> u32 {
    if !years_to_goal.is_finite() {
        return DERIVED_PROJECTION_CAP;
    }
    let years = years_to_goal.max(0.0).ceil() as u32;
    (years + 10).min(DERIVED_PROJECTION_CAP)
}

/// `years + 10`, bounded by [`MAX_PROJECTION_YEARS`].
pub fn padded_horizon(years: u32) -> u32 {
    (years + 10).min(MAX_PROJECTION_YEARS)
}

use serde::Serialize;

use super::timevalue::{MAX_YEARS_TO_TARGET, round_whole};

pub const SENSITIVITY_RATES: [f64; 5] = [0.03, 0.035, 0.04, 0.045, 0.05];
/// Longest retirement horizon simulated; longer requests are clamped.
pub const MAX_RETIREMENT_YEARS: u32 = MAX_YEARS_TO_TARGET;
/// Longest run of the sensitivity simulation.
pub const SENSITIVITY_YEAR_CAP: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalPoint {
    pub year: u32,
    pub balance: f64,
    pub withdrawal: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSensitivity {
    pub rate: f64,
    pub years: u32,
    pub end_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalResult {
    pub portfolio_longevity: u32,
    pub success_rate: f64,
    pub annual_withdrawal: f64,
    pub monthly_withdrawal: f64,
    pub ending_balance: f64,
    pub withdrawal_projections: Vec<WithdrawalPoint>,
    pub rate_analysis: Vec<RateSensitivity>,
}

/// Decumulation run: the portfolio grows at the nominal return while the
/// first-year withdrawal (`portfolio · rate`) rises with inflation.
///
/// `portfolio_longevity` counts the years the balance stayed positive within
/// `retirement_years`; `success_rate` is that count over the horizon, 1.0 once
/// the horizon is covered. The horizon is clamped to [`MAX_RETIREMENT_YEARS`].
pub fn calculate_withdrawal(
    portfolio_value: f64,
    withdrawal_rate: f64,
    expected_return: f64,
    inflation_rate: f64,
    retirement_years: u32,
) -> WithdrawalResult {
    let retirement_years = retirement_years.min(MAX_RETIREMENT_YEARS);
    let annual_withdrawal = portfolio_value * withdrawal_rate;

    let mut balance = portfolio_value;
    let mut withdrawal = annual_withdrawal;
    let mut year = 0u32;
    let mut withdrawal_projections = Vec::new();
    while balance > 0.0 && year <= retirement_years {
        withdrawal_projections.push(WithdrawalPoint {
            year,
            balance: round_whole(balance),
            withdrawal: round_whole(withdrawal),
        });
        balance = balance * (1.0 + expected_return) - withdrawal;
        withdrawal *= 1.0 + inflation_rate;
        year += 1;
    }

    let portfolio_longevity = year.saturating_sub(1);
    let success_rate = if portfolio_longevity >= retirement_years {
        1.0
    } else {
        portfolio_longevity as f64 / retirement_years as f64
    };
    let ending_balance = withdrawal_projections
        .last()
        .map_or(0.0, |point| point.balance.max(0.0));

    let rate_analysis = SENSITIVITY_RATES
        .iter()
        .map(|&rate| rate_sensitivity(portfolio_value, rate, expected_return, inflation_rate))
        .collect();

    WithdrawalResult {
        portfolio_longevity,
        success_rate,
        annual_withdrawal: round_whole(annual_withdrawal),
        monthly_withdrawal: round_whole(annual_withdrawal / 12.0),
        ending_balance,
        withdrawal_projections,
        rate_analysis,
    }
}

fn rate_sensitivity(
    portfolio_value: f64,
    rate: f64,
    expected_return: f64,
    inflation_rate: f64,
) -> RateSensitivity {
    let mut balance = portfolio_value;
    let mut withdrawal = portfolio_value * rate;
    let mut years = 0;
    while balance > 0.0 && years < SENSITIVITY_YEAR_CAP {
        balance = balance * (1.0 + expected_return) - withdrawal;
        withdrawal *= 1.0 + inflation_rate;
        years += 1;
    }
    RateSensitivity {
        rate,
        years,
        end_balance: round_whole(balance).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    #[test]
    fn four_percent_rule_survives_thirty_years() {
        let result = calculate_withdrawal(1_000_000.0, 0.04, 0.07, 0.03, 30);
        assert!(result.portfolio_longevity >= 30);
        assert_eq!(result.success_rate, 1.0);
        assert_eq!(result.annual_withdrawal, 40_000.0);
        assert_eq!(result.monthly_withdrawal, 3_333.0);
        assert_eq!(result.withdrawal_projections.len(), 31);
        assert!(result.ending_balance > 0.0);
    }

    #[test]
    fn first_projection_is_the_starting_point() {
        let result = calculate_withdrawal(500_000.0, 0.05, 0.06, 0.02, 10);
        let first = result.withdrawal_projections[0];
        assert_eq!(first.year, 0);
        assert_eq!(first.balance, 500_000.0);
        assert_eq!(first.withdrawal, 25_000.0);
        assert_eq!(result.withdrawal_projections[1].withdrawal, 25_500.0);
    }

    #[test]
    fn aggressive_rate_runs_out_before_horizon() {
        let result = calculate_withdrawal(1_000_000.0, 0.10, 0.0, 0.0, 30);
        // 100k a year from 1M with no growth: positive through year 9.
        assert_eq!(result.portfolio_longevity, 9);
        assert!((result.success_rate - 9.0 / 30.0).abs() < 1e-12);
        assert_eq!(result.ending_balance, 100_000.0);
    }

    #[test]
    fn empty_portfolio_never_underflows() {
        let result = calculate_withdrawal(0.0, 0.04, 0.07, 0.03, 30);
        assert_eq!(result.portfolio_longevity, 0);
        assert_eq!(result.success_rate, 0.0);
        assert_eq!(result.ending_balance, 0.0);
        assert!(result.withdrawal_projections.is_empty());
    }

    #[test]
    fn sensitivity_table_covers_standard_rates() {
        let result = calculate_withdrawal(1_000_000.0, 0.04, 0.07, 0.03, 30);
        let rates: Vec<f64> = result.rate_analysis.iter().map(|row| row.rate).collect();
        assert_eq!(rates, SENSITIVITY_RATES.to_vec());
        assert!(result.rate_analysis.iter().all(|row| row.years <= 50));
        assert!(result.rate_analysis.iter().all(|row| row.end_balance >= 0.0));
    }

    #[test]
    fn horizon_is_clamped_when_balance_never_runs_out() {
        let result = calculate_withdrawal(1_000_000.0, 0.04, 0.07, 0.0, 2_000_000);
        assert_eq!(result.portfolio_longevity, MAX_RETIREMENT_YEARS);
        assert_eq!(
            result.withdrawal_projections.len(),
            MAX_RETIREMENT_YEARS as usize + 1
        );
        assert_eq!(result.success_rate, 1.0);

        let result = calculate_withdrawal(1_000_000.0, 0.04, 0.07, 0.0, u32::MAX);
        assert_eq!(result.portfolio_longevity, MAX_RETIREMENT_YEARS);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_higher_rate_never_lasts_longer(
            portfolio in 10_000.0f64..5_000_000.0,
            nominal in -0.05f64..0.12,
            inflation in 0.0f64..0.08,
        ) {
            let result = calculate_withdrawal(portfolio, 0.04, nominal, inflation, 30);
            for pair in result.rate_analysis.windows(2) {
                prop_assert!(pair[1].years <= pair[0].years);
            }
            prop_assert!(result.success_rate >= 0.0 && result.success_rate <= 1.0);
            prop_assert!(result.portfolio_longevity <= 30);
        }
    }
}

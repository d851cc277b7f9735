use super::projection::{
    MAX_PROJECTION_YEARS, generate_projections, padded_horizon, projection_horizon,
};
use super::timevalue::{
    present_value, real_return, round_tenth, round_whole, simulate_years_to_target,
    years_to_target,
};
use super::types::{
    BaristaFireResult, CoastFireResult, FAT_FIRE_THRESHOLD, FatFireResult, LEAN_FIRE_THRESHOLD,
    LeanFireResult, ReverseFireResult, SavingsBand, SavingsRateParams, SavingsRateResult,
    SavingsSource, ScenarioInputs, StandardFireResult,
};

/// Classic FIRE: `expenses / withdrawal_rate`, reached with real-return growth.
pub fn calculate_standard_fire(inputs: &ScenarioInputs) -> StandardFireResult {
    let fire_number = inputs.fire_number();
    let real = inputs.real_return();

    let years_to_fire = years_to_target(
        inputs.current_savings,
        inputs.annual_contribution,
        real,
        fire_number,
    );
    let fire_age = inputs.current_age as f64 + years_to_fire;
    let coast_fire_number = present_value(fire_number, real, inputs.years_to_retirement() as f64);

    // Income is approximated as what is saved plus what is spent.
    let estimated_income = inputs.annual_contribution + inputs.annual_expenses;
    let savings_rate = if estimated_income > 0.0 {
        inputs.annual_contribution / estimated_income
    } else {
        0.0
    };

    let projections = generate_projections(
        inputs.current_age,
        inputs.current_savings,
        inputs.annual_contribution,
        inputs.expected_return,
        inputs.inflation_rate,
        projection_horizon(years_to_fire),
        inputs.start_year,
    );

    StandardFireResult {
        fire_number: round_whole(fire_number),
        years_to_fire: round_tenth(years_to_fire),
        fire_age: round_tenth(fire_age),
        projections,
        savings_rate,
        monthly_contribution: inputs.annual_contribution / 12.0,
        coast_fire_number: round_whole(coast_fire_number),
    }
}

/// Savings needed today to reach the FIRE number by retirement age with no
/// further contributions.
pub fn calculate_coast_fire(inputs: &ScenarioInputs) -> CoastFireResult {
    let fire_number = inputs.fire_number();
    let years_to_retirement = inputs.years_to_retirement();
    let real = inputs.real_return();

    let coast_number = present_value(fire_number, real, years_to_retirement as f64);
    let already_coasting = inputs.current_savings >= coast_number;
    let years_to_coast = if already_coasting {
        0.0
    } else {
        years_to_target(
            inputs.current_savings,
            inputs.annual_contribution,
            real,
            coast_number,
        )
    };

    let horizon = padded_horizon(years_to_retirement);
    let projections = generate_projections(
        inputs.current_age,
        inputs.current_savings,
        0.0,
        inputs.expected_return,
        inputs.inflation_rate,
        horizon,
        inputs.start_year,
    );
    let projections_with_contributions = generate_projections(
        inputs.current_age,
        inputs.current_savings,
        inputs.annual_contribution,
        inputs.expected_return,
        inputs.inflation_rate,
        horizon,
        inputs.start_year,
    );

    CoastFireResult {
        coast_number: round_whole(coast_number),
        years_to_coast: round_tenth(years_to_coast),
        already_coasting,
        fire_number: round_whole(fire_number),
        projections,
        projections_with_contributions,
    }
}

pub fn calculate_lean_fire(inputs: &ScenarioInputs) -> LeanFireResult {
    LeanFireResult {
        standard: calculate_standard_fire(inputs),
        is_lean: inputs.annual_expenses <= LEAN_FIRE_THRESHOLD,
        lean_threshold: LEAN_FIRE_THRESHOLD,
    }
}

pub fn calculate_fat_fire(inputs: &ScenarioInputs) -> FatFireResult {
    FatFireResult {
        standard: calculate_standard_fire(inputs),
        is_fat: inputs.annual_expenses >= FAT_FIRE_THRESHOLD,
        fat_threshold: FAT_FIRE_THRESHOLD,
    }
}

/// FIRE number for the expenses left over once part-time income is counted.
pub fn calculate_barista_fire(inputs: &ScenarioInputs, part_time_income: f64) -> BaristaFireResult {
    let full_fire_number = inputs.fire_number();
    let portfolio_expenses = (inputs.annual_expenses - part_time_income).max(0.0);
    let barista_number = portfolio_expenses / inputs.withdrawal_rate;
    let real = inputs.real_return();

    let years_to_barista_fire = years_to_target(
        inputs.current_savings,
        inputs.annual_contribution,
        real,
        barista_number,
    );
    let savings_from_part_time = full_fire_number - barista_number;
    let portfolio_reduction_percent = if full_fire_number > 0.0 {
        savings_from_part_time / full_fire_number * 100.0
    } else {
        0.0
    };

    let projections = generate_projections(
        inputs.current_age,
        inputs.current_savings,
        inputs.annual_contribution,
        inputs.expected_return,
        inputs.inflation_rate,
        projection_horizon(years_to_barista_fire),
        inputs.start_year,
    );

    BaristaFireResult {
        barista_number: round_whole(barista_number),
        full_fire_number: round_whole(full_fire_number),
        years_to_barista_fire: round_tenth(years_to_barista_fire),
        part_time_income,
        savings_from_part_time: round_whole(savings_from_part_time),
        portfolio_reduction_percent,
        projections,
    }
}

/// Solves for the constant yearly contribution that reaches the FIRE number
/// at the target retirement age.
pub fn calculate_reverse_fire(inputs: &ScenarioInputs) -> ReverseFireResult {
    let years_to_fire = inputs.years_to_retirement().max(1);
    let years = years_to_fire as f64;
    let fire_number = inputs.fire_number();
    let real = inputs.real_return();

    let compound = (1.0 + real).powf(years);
    let current_will_grow_to = inputs.current_savings * compound;
    let already_achievable = current_will_grow_to >= fire_number;

    let required_annual_savings = if already_achievable {
        0.0
    } else if real == 0.0 {
        (fire_number - inputs.current_savings) / years
    } else {
        (fire_number - current_will_grow_to) * real / (compound - 1.0)
    }
    .max(0.0);

    let projections = generate_projections(
        inputs.current_age,
        inputs.current_savings,
        required_annual_savings,
        inputs.expected_return,
        inputs.inflation_rate,
        padded_horizon(years_to_fire),
        inputs.start_year,
    );

    ReverseFireResult {
        fire_number,
        years_to_fire,
        required_annual_savings,
        required_monthly_savings: required_annual_savings / 12.0,
        already_achievable,
        current_will_grow_to: round_whole(current_will_grow_to),
        projections,
    }
}

pub fn calculate_savings_rate(params: &SavingsRateParams) -> SavingsRateResult {
    let annual_savings = match params.savings {
        SavingsSource::IncomeMinusExpenses => params.annual_income - params.annual_expenses,
        SavingsSource::Explicit { amount, frequency } => amount * frequency.periods_per_year(),
    };
    let savings_rate = if params.annual_income > 0.0 {
        annual_savings / params.annual_income
    } else {
        0.0
    };

    let fire_number = params.annual_expenses / params.withdrawal_rate;
    let real = real_return(params.expected_return, params.inflation_rate);
    let years_to_fire =
        simulate_years_to_target(params.current_savings, annual_savings, real, fire_number);

    let horizon = match params.horizon_years {
        Some(years) => years.min(MAX_PROJECTION_YEARS),
        None => projection_horizon(years_to_fire),
    };
    let projections = generate_projections(
        params.current_age,
        params.current_savings,
        annual_savings,
        params.expected_return,
        params.inflation_rate,
        horizon,
        params.start_year,
    );
    let (final_nominal_value, final_inflation_adjusted_value) = projections
        .last()
        .map(|p| (p.portfolio, p.inflation_adjusted))
        .unwrap_or((params.current_savings, params.current_savings));

    let band = SavingsBand::classify(savings_rate);
    SavingsRateResult {
        savings_rate,
        annual_savings,
        monthly_savings: annual_savings / 12.0,
        fire_number,
        years_to_fire,
        band,
        band_label: band.label(),
        final_nominal_value,
        final_inflation_adjusted_value,
        projections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timevalue::future_value;
    use crate::core::types::ContributionFrequency;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_inputs() -> ScenarioInputs {
        ScenarioInputs {
            current_age: 30,
            retirement_age: 55,
            current_savings: 100_000.0,
            annual_contribution: 24_000.0,
            expected_return: 0.07,
            inflation_rate: 0.03,
            withdrawal_rate: 0.04,
            annual_expenses: 48_000.0,
            start_year: 2025,
        }
    }

    fn savings_params() -> SavingsRateParams {
        SavingsRateParams {
            current_age: 30,
            annual_income: 80_000.0,
            annual_expenses: 48_000.0,
            current_savings: 100_000.0,
            expected_return: 0.07,
            inflation_rate: 0.03,
            withdrawal_rate: 0.04,
            savings: SavingsSource::IncomeMinusExpenses,
            horizon_years: None,
            start_year: 2025,
        }
    }

    #[test]
    fn standard_fire_reference_case() {
        let result = calculate_standard_fire(&sample_inputs());
        assert_eq!(result.fire_number, 1_200_000.0);
        assert_eq!(result.years_to_fire, 24.4);
        assert_eq!(result.fire_age, 54.4);
        assert_eq!(result.coast_fire_number, 462_932.0);
        assert_approx_tol(result.savings_rate, 24_000.0 / 72_000.0, 1e-12);
        assert_eq!(result.monthly_contribution, 2_000.0);
        assert_eq!(
            result.projections.len(),
            projection_horizon(result.years_to_fire) as usize + 1
        );
    }

    #[test]
    fn standard_fire_unreachable_goal_stays_infinite() {
        let mut inputs = sample_inputs();
        inputs.current_savings = 0.0;
        inputs.annual_contribution = 0.0;
        let result = calculate_standard_fire(&inputs);
        assert_eq!(result.years_to_fire, f64::INFINITY);
        assert_eq!(result.fire_age, f64::INFINITY);
        assert_eq!(result.projections.len(), 51);
    }

    #[test]
    fn coast_fire_reports_already_coasting_with_zero_years() {
        let mut inputs = sample_inputs();
        inputs.current_savings = 500_000.0;
        let result = calculate_coast_fire(&inputs);
        assert!(result.already_coasting);
        assert_eq!(result.years_to_coast, 0.0);
        assert_eq!(result.coast_number, 462_932.0);
        assert_eq!(result.fire_number, 1_200_000.0);
    }

    #[test]
    fn coast_fire_builds_two_parallel_series() {
        let result = calculate_coast_fire(&sample_inputs());
        assert!(!result.already_coasting);
        assert!(result.years_to_coast > 0.0 && result.years_to_coast.is_finite());
        assert_eq!(result.projections.len(), 36);
        assert_eq!(result.projections_with_contributions.len(), 36);
        assert!(result.projections.iter().skip(1).all(|p| p.contributions == 0.0));
        assert!(
            result.projections_with_contributions[10].portfolio > result.projections[10].portfolio
        );
    }

    #[test]
    fn coast_fire_series_length_is_capped() {
        let mut inputs = sample_inputs();
        inputs.current_age = 20;
        inputs.retirement_age = 90;
        let result = calculate_coast_fire(&inputs);
        assert_eq!(result.projections.len(), MAX_PROJECTION_YEARS as usize + 1);
    }

    #[test]
    fn lean_and_fat_only_add_classification() {
        let mut inputs = sample_inputs();
        inputs.annual_expenses = 35_000.0;
        let lean = calculate_lean_fire(&inputs);
        let standard = calculate_standard_fire(&inputs);
        assert!(lean.is_lean);
        assert_eq!(lean.lean_threshold, 40_000.0);
        assert_eq!(lean.standard.fire_number, standard.fire_number);
        assert_eq!(lean.standard.years_to_fire, standard.years_to_fire);

        inputs.annual_expenses = 120_000.0;
        let fat = calculate_fat_fire(&inputs);
        assert!(fat.is_fat);
        assert_eq!(fat.standard.fire_number, 3_000_000.0);
        assert!(!calculate_lean_fire(&inputs).is_lean);
    }

    #[test]
    fn barista_fire_reduces_target_by_part_time_income() {
        let result = calculate_barista_fire(&sample_inputs(), 20_000.0);
        assert_eq!(result.full_fire_number, 1_200_000.0);
        assert_eq!(result.barista_number, 700_000.0);
        assert_eq!(result.savings_from_part_time, 500_000.0);
        assert_approx_tol(result.portfolio_reduction_percent, 500_000.0 / 1_200_000.0 * 100.0, 1e-9);
        let standard = calculate_standard_fire(&sample_inputs());
        assert!(result.years_to_barista_fire < standard.years_to_fire);
    }

    #[test]
    fn barista_fire_income_above_expenses_needs_nothing() {
        let result = calculate_barista_fire(&sample_inputs(), 60_000.0);
        assert_eq!(result.barista_number, 0.0);
        assert_eq!(result.years_to_barista_fire, 0.0);
        assert_eq!(result.portfolio_reduction_percent, 100.0);
    }

    #[test]
    fn reverse_fire_contribution_closes_the_gap() {
        let inputs = sample_inputs();
        let result = calculate_reverse_fire(&inputs);
        assert_eq!(result.years_to_fire, 25);
        assert!(!result.already_achievable);
        let reached = future_value(
            inputs.current_savings,
            result.required_annual_savings,
            inputs.real_return(),
            25.0,
        );
        assert_approx_tol(reached, 1_200_000.0, 1e-6);
        assert_approx_tol(
            result.required_monthly_savings * 12.0,
            result.required_annual_savings,
            1e-9,
        );
    }

    #[test]
    fn reverse_fire_already_achievable_zeroes_contribution() {
        let mut inputs = sample_inputs();
        inputs.current_savings = 900_000.0;
        let result = calculate_reverse_fire(&inputs);
        assert!(result.already_achievable);
        assert_eq!(result.required_annual_savings, 0.0);
        assert_eq!(result.required_monthly_savings, 0.0);
        assert!(result.current_will_grow_to >= 1_200_000.0);
    }

    #[test]
    fn reverse_fire_zero_real_return_is_linear() {
        let mut inputs = sample_inputs();
        inputs.expected_return = 0.03;
        inputs.inflation_rate = 0.03;
        inputs.current_savings = 200_000.0;
        let result = calculate_reverse_fire(&inputs);
        assert_approx_tol(result.required_annual_savings, 1_000_000.0 / 25.0, 1e-9);
    }

    #[test]
    fn reverse_fire_uses_at_least_one_year() {
        let mut inputs = sample_inputs();
        inputs.retirement_age = 30;
        let result = calculate_reverse_fire(&inputs);
        assert_eq!(result.years_to_fire, 1);
        assert_eq!(result.projections.len(), 12);
    }

    #[test]
    fn savings_rate_from_income_and_expenses() {
        let result = calculate_savings_rate(&savings_params());
        assert_eq!(result.annual_savings, 32_000.0);
        assert_approx_tol(result.savings_rate, 0.4, 1e-12);
        assert_eq!(result.band, SavingsBand::Aggressive);
        assert_eq!(result.band_label, "Aggressive Saver");
        assert_eq!(result.fire_number, 1_200_000.0);
        assert_eq!(result.years_to_fire.fract(), 0.0);
        assert_eq!(
            result.projections.len(),
            projection_horizon(result.years_to_fire) as usize + 1
        );
    }

    #[test]
    fn savings_rate_explicit_contribution_and_horizon() {
        let mut params = savings_params();
        params.savings = SavingsSource::Explicit {
            amount: 1_000.0,
            frequency: ContributionFrequency::Monthly,
        };
        params.horizon_years = Some(20);
        let result = calculate_savings_rate(&params);
        assert_eq!(result.annual_savings, 12_000.0);
        assert_approx_tol(result.savings_rate, 0.15, 1e-12);
        assert_eq!(result.band, SavingsBand::Average);
        assert_eq!(result.projections.len(), 21);
        assert_eq!(result.final_nominal_value, result.projections[20].portfolio);
        assert!(result.final_inflation_adjusted_value < result.final_nominal_value);
    }

    #[test]
    fn savings_rate_negative_savings_never_reach_fire() {
        let mut params = savings_params();
        params.annual_income = 40_000.0;
        params.current_savings = 0.0;
        let result = calculate_savings_rate(&params);
        assert!(result.annual_savings < 0.0);
        assert_eq!(result.years_to_fire, f64::INFINITY);
        assert_eq!(result.band, SavingsBand::BelowAverage);
    }

    #[test]
    fn savings_rate_with_zero_income_is_zero() {
        let mut params = savings_params();
        params.annual_income = 0.0;
        assert_eq!(calculate_savings_rate(&params).savings_rate, 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_more_part_time_income_never_raises_barista_target(
            expenses in 0.0f64..150_000.0,
            income in 0.0f64..100_000.0,
            extra in 0.0f64..50_000.0,
        ) {
            let mut inputs = sample_inputs();
            inputs.annual_expenses = expenses;
            let base = calculate_barista_fire(&inputs, income);
            let more = calculate_barista_fire(&inputs, income + extra);
            prop_assert!(more.barista_number <= base.barista_number);
            prop_assert!(more.barista_number <= more.full_fire_number);
        }

        #[test]
        fn prop_reverse_contribution_is_never_negative(
            savings in 0.0f64..3_000_000.0,
            expenses in 0.0f64..150_000.0,
            nominal in -0.02f64..0.12,
            retirement_age in 31u32..80,
        ) {
            let mut inputs = sample_inputs();
            inputs.current_savings = savings;
            inputs.annual_expenses = expenses;
            inputs.expected_return = nominal;
            inputs.retirement_age = retirement_age;
            let result = calculate_reverse_fire(&inputs);
            prop_assert!(result.required_annual_savings >= 0.0);
            prop_assert!(result.projections.len() <= MAX_PROJECTION_YEARS as usize + 1);
        }
    }
}

mod debt;
mod format;
mod healthcare;
mod projection;
mod quiz;
mod request;
mod scenarios;
mod solver;
mod timevalue;
mod types;
mod withdrawal;

pub use debt::{
    DebtAccount, DebtMilestone, DebtPayoffMonth, DebtPayoffResult, DebtStrategy,
    ExtraPaymentSavings, LedgerState, MAX_PAYOFF_MONTHS, RemainingDebt, StrategyComparison,
    calculate_avalanche_payoff, calculate_debt_payoff, calculate_snowball_payoff,
    compare_strategies, extra_payment_savings, step_month, total_minimum_payment,
    validate_budget, validate_debts,
};
pub use format::{format_currency, format_months, format_percent, format_years};
pub use healthcare::{
    DEFAULT_ANNUAL_DEDUCTIBLE, DEFAULT_ANNUAL_OUT_OF_POCKET, DEFAULT_MEDICARE_AGE,
    DEFAULT_MONTHLY_PREMIUM, HealthcareGapResult, HealthcareParams, HealthcareYear, MAX_GAP_YEARS,
    calculate_healthcare_gap, estimated_subsidy,
};
pub use projection::{MAX_PROJECTION_YEARS, generate_projections, projection_horizon};
pub use quiz::{
    Calculator, Lifestyle, PrimaryGoal, QuizAnswers, Recommendation, WorkPreference,
    recommend_path,
};
pub use request::{
    DebtOutcome, DebtPlan, ScenarioOutcome, ScenarioRequest, TimelinePlan, WithdrawalParams,
    run_scenario,
};
pub use scenarios::{
    calculate_barista_fire, calculate_coast_fire, calculate_fat_fire, calculate_lean_fire,
    calculate_reverse_fire, calculate_savings_rate, calculate_standard_fire,
};
pub use solver::{TimelineIteration, TimelineSolveResult, calculate_debt_payoff_by_timeline};
pub use timevalue::{
    MAX_YEARS_TO_TARGET, future_value, present_value, real_return, years_to_target,
};
pub use types::{
    BaristaFireResult, CoastFireResult, ContributionFrequency, ExpenseTier,
    FAT_FIRE_THRESHOLD, FatFireResult, InputError, LEAN_FIRE_THRESHOLD, LeanFireResult,
    ProjectionPoint, ReverseFireResult, SavingsBand, SavingsRateParams, SavingsRateResult,
    SavingsSource, ScenarioInputs, StandardFireResult,
};
pub use withdrawal::{
    MAX_RETIREMENT_YEARS, RateSensitivity, WithdrawalPoint, WithdrawalResult,
    calculate_withdrawal,
};
